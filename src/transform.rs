use std::path::Path;

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde::Serialize;

use crate::columns::{
    EMBED_COLUMN, EMBED_UPDATED_COLUMN, GASPAR_ID_COLUMN, MEDIA_ID_COLUMN,
    MEDIA_ID_UPDATED_COLUMN, find_id_column,
};
use crate::downloader::{ArchiveBuilder, to_xlsx};
use crate::error::{RemapError, Result};
use crate::loader::first_sheet;
use crate::mapping::{MappingTable, NOT_FOUND};
use crate::table::Table;

lazy_static! {
    static ref EMBEDDED_ID_REGEX: Regex = Regex::new(r"_viddler_([a-z0-9]+)_").unwrap();
}

const EMBED_PREFIX: &str = "<iframe frameborder='0' style='width:640px; height:480px;' src='https://media.gaspar.mheducation.com/GASPARPlayer/play.html?id=";
const EMBED_SUFFIX: &str = "' allowfullscreen></iframe>";

/// Suffix appended to the original file name of every archive entry.
pub const OUTPUT_SUFFIX: &str = "_updated.xlsx";

/// Player embed markup for a resolved Gaspar id.
///
/// The sentinel passes through unchanged so a missing id never produces a
/// half-filled template.
pub fn embed_code(gaspar_id: &str) -> String {
    if gaspar_id == NOT_FOUND {
        return NOT_FOUND.to_string();
    }
    format!("{}{}{}", EMBED_PREFIX, gaspar_id, EMBED_SUFFIX)
}

/// Rewrite a composite media name such as `course_viddler_ab12_intro`.
///
/// The id inside the first `_viddler_<id>_` match is swapped for its Gaspar
/// id, then every `viddler` becomes `gaspar`. Yields the sentinel when the
/// pattern is absent or the id is unmapped.
pub fn rewrite_media_id(media_id: &str, mapping: &MappingTable) -> String {
    let token = match EMBEDDED_ID_REGEX.captures(media_id).and_then(|caps| caps.get(1)) {
        Some(token) => token,
        None => return NOT_FOUND.to_string(),
    };
    let gaspar_id = match mapping.get(token.as_str()) {
        Some(id) => id,
        None => return NOT_FOUND.to_string(),
    };

    let mut rewritten = String::with_capacity(media_id.len() + gaspar_id.len());
    rewritten.push_str(&media_id[..token.start()]);
    rewritten.push_str(gaspar_id);
    rewritten.push_str(&media_id[token.end()..]);
    rewritten.replace("viddler", "gaspar")
}

/// Add the derived columns to a batch sheet.
///
/// - `Gaspar ID` right after the detected id column.
/// - `EMBED Updated` right after `EMBED`, only when both an id column and
///   an `EMBED` column exist.
/// - `Media ID Updated` right after `Media ID`.
///
/// Columns already carrying a derived name are overwritten in place and
/// then moved. All other columns keep their order.
pub fn transform_table(mut table: Table, mapping: &MappingTable) -> Table {
    if let Some(id_column) = find_id_column(&table.columns).map(str::to_string) {
        let gaspar_ids: Vec<String> = table
            .column(&id_column)
            .into_iter()
            .flatten()
            .map(|id| mapping.resolve(id).to_string())
            .collect();

        if table.has_column(EMBED_COLUMN) {
            let embeds = gaspar_ids.iter().map(|id| embed_code(id)).collect();
            table.set_column(EMBED_UPDATED_COLUMN, embeds);
            table.move_after(EMBED_UPDATED_COLUMN, EMBED_COLUMN);
        }

        table.set_column(GASPAR_ID_COLUMN, gaspar_ids);
        table.move_after(GASPAR_ID_COLUMN, &id_column);
    }

    if table.has_column(MEDIA_ID_COLUMN) {
        let rewritten = table
            .column(MEDIA_ID_COLUMN)
            .into_iter()
            .flatten()
            .map(|media_id| rewrite_media_id(media_id, mapping))
            .collect();
        table.set_column(MEDIA_ID_UPDATED_COLUMN, rewritten);
        table.move_after(MEDIA_ID_UPDATED_COLUMN, MEDIA_ID_COLUMN);
    }

    table
}

/// One transformed workbook ready to go into the archive.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Name of the archive entry produced for an uploaded file.
pub fn output_name(file_name: &str) -> String {
    format!("{}{}", file_name, OUTPUT_SUFFIX)
}

/// Transform one uploaded batch workbook.
///
/// Only `.xlsx` files are accepted; the first sheet is transformed and
/// written back as a single-sheet workbook.
pub fn process_file(file_name: &str, data: &[u8], mapping: &MappingTable) -> Result<OutputFile> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());
    if extension.as_deref() != Some("xlsx") {
        return Err(RemapError::UnsupportedExtension(
            extension.unwrap_or_else(|| "<none>".to_string()),
        ));
    }

    let table = first_sheet(data)?;
    let table = transform_table(table, mapping);

    Ok(OutputFile {
        name: output_name(file_name),
        data: to_xlsx(&table)?,
    })
}

/// A batch file that could not be transformed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileError {
    pub file: String,
    pub message: String,
}

/// Outcome of a batch: the zipped results plus any per-file failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub archive: Vec<u8>,
    pub processed: Vec<String>,
    pub errors: Vec<FileError>,
}

/// Transform every `(file name, bytes)` pair and zip the results.
///
/// A failing file is recorded in [`BatchReport::errors`] and left out of
/// the archive; the rest of the batch still runs. Only failing to build
/// the archive itself is an error.
pub fn process_batch<'a, I>(files: I, mapping: &MappingTable) -> Result<BatchReport>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut archive = ArchiveBuilder::new();
    let mut report = BatchReport::default();

    for (name, data) in files {
        match process_file(name, data, mapping) {
            Ok(output) => {
                archive.add(&output.name, &output.data)?;
                report.processed.push(output.name);
            }
            Err(e) => {
                warn!("Error processing {}: {}", name, e);
                report.errors.push(FileError {
                    file: name.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    report.archive = archive.finish()?;
    info!(
        "batch finished: {} processed, {} failed",
        report.processed.len(),
        report.errors.len()
    );
    Ok(report)
}
