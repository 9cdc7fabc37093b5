use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::loader;
use crate::mapping::MappingTable;
use crate::transform::{FileError, process_batch};

/// Download name of the zipped results.
pub const ARCHIVE_NAME: &str = "updated_files.zip";
/// Cookie carrying the browser's session id.
pub const SESSION_COOKIE: &str = "session";

/// Where the server listens and how much it accepts per request.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub max_upload_bytes: usize,
}

/// State of one browser session: its mapping and its last batch result.
#[derive(Default)]
pub struct Session {
    mapping: Option<MappingTable>,
    archive: Option<Vec<u8>>,
}

/// Sessions keyed by the id stored in the session cookie.
pub struct AppState {
    sessions: RwLock<HashMap<String, Session>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    // a panic mid-request leaves the sessions usable
    fn sessions(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn sessions_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Mapping loaded by the session behind `jar`, if any.
    fn mapping(&self, jar: &CookieJar) -> Option<MappingTable> {
        let id = session_id(jar)?;
        self.sessions().get(id).and_then(|s| s.mapping.clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}

fn session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value())
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .into()
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct MappingResponse {
    status: String,
    message: Option<String>,
    entries: usize,
}

#[derive(Serialize)]
struct ProcessResponse {
    status: String,
    processed: Vec<String>,
    errors: Vec<FileError>,
}

fn status_response(code: StatusCode, status: &str, message: impl Into<String>) -> Response {
    (
        code,
        Json(StatusResponse {
            status: status.to_string(),
            message: Some(message.into()),
        }),
    )
        .into_response()
}

pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(serve_landing))
        .route("/api/mapping", post(upload_mapping))
        .route("/api/process", post(process_files))
        .route("/api/download", get(download_archive))
        .route("/api/reset", post(reset_session))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app_state = Arc::new(AppState::new());
    let app = router(app_state, config.max_upload_bytes);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_landing() -> Html<&'static str> {
    Html(include_str!("./static/landing.html"))
}

/// Collect every file sent under `field_name` as (file name, bytes).
async fn read_files(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Vec<(String, Vec<u8>)>, MultipartError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unknown").to_string();
        let data = field.bytes().await?;
        files.push((file_name, data.to_vec()));
    }

    Ok(files)
}

async fn upload_mapping(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let files = match read_files(&mut multipart, "mapping").await {
        Ok(files) => files,
        Err(e) => return status_response(StatusCode::BAD_REQUEST, "error", e.to_string()),
    };

    let (file_name, data) = match files.into_iter().next() {
        Some(file) => file,
        None => {
            return status_response(StatusCode::BAD_REQUEST, "error", "No file data received");
        }
    };

    let mapping = match loader::load_mapping(&data) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!("Error loading mapping file {}: {}", file_name, e);
            return status_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "error",
                format!("Error loading mapping file: {}", e),
            );
        }
    };

    let id = match session_id(&jar) {
        Some(id) => id.to_string(),
        None => Uuid::new_v4().to_string(),
    };

    let entries = {
        let mut sessions = state.sessions_mut();
        let session = sessions.entry(id.clone()).or_default();
        match session.mapping.as_mut() {
            Some(current) => {
                current.merge(mapping);
                current.len()
            }
            None => {
                let entries = mapping.len();
                session.mapping = Some(mapping);
                entries
            }
        }
    };
    info!("Mapping loaded: {} ({} entries)", file_name, entries);

    (
        jar.add(session_cookie(id)),
        Json(MappingResponse {
            status: "ok".to_string(),
            message: Some(format!("Mapping loaded: {}", file_name)),
            entries,
        }),
    )
        .into_response()
}

async fn process_files(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let mapping = match state.mapping(&jar) {
        Some(mapping) => mapping,
        None => {
            return status_response(StatusCode::CONFLICT, "error", "Upload a mapping file first");
        }
    };

    let files = match read_files(&mut multipart, "files").await {
        Ok(files) => files,
        Err(e) => return status_response(StatusCode::BAD_REQUEST, "error", e.to_string()),
    };
    if files.is_empty() {
        return status_response(StatusCode::BAD_REQUEST, "error", "No files received");
    }

    let result = tokio::task::spawn_blocking(move || {
        let batch = files
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()));
        process_batch(batch, &mapping)
    })
    .await;

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            return status_response(StatusCode::INTERNAL_SERVER_ERROR, "error", e.to_string());
        }
        Err(e) => {
            return status_response(StatusCode::INTERNAL_SERVER_ERROR, "error", e.to_string());
        }
    };

    // the session may have been reset while the batch ran
    if let Some(id) = session_id(&jar) {
        if let Some(session) = state.sessions_mut().get_mut(id) {
            session.archive = Some(report.archive);
        }
    }

    let status = if report.errors.is_empty() { "ok" } else { "partial" };
    Json(ProcessResponse {
        status: status.to_string(),
        processed: report.processed,
        errors: report.errors,
    })
    .into_response()
}

async fn download_archive(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let archive = session_id(&jar)
        .and_then(|id| state.sessions().get(id).and_then(|s| s.archive.clone()));
    let archive = match archive {
        Some(archive) => archive,
        None => return status_response(StatusCode::NOT_FOUND, "error", "No processed files yet"),
    };

    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ARCHIVE_NAME),
            ),
        ],
        archive,
    )
        .into_response()
}

async fn reset_session(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(id) = session_id(&jar) {
        state.sessions_mut().remove(id);
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(StatusResponse {
            status: "ok".to_string(),
            message: None,
        }),
    )
        .into_response()
}
