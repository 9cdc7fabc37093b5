use thiserror::Error;

/// Errors raised while loading mappings or transforming batch files.
///
/// None of these is fatal to a session: mapping errors keep the batch stage
/// gated, batch errors are reported against the offending file.
#[derive(Debug, Error)]
pub enum RemapError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("ViddlerMediaId or GasparMediaId missing in given Excel file")]
    MappingIncomplete,
    #[error("workbook has no sheets")]
    EmptyWorkbook,
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

pub type Result<T, E = RemapError> = std::result::Result<T, E>;
