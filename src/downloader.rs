use std::io::{Cursor, Write};

use rust_xlsxwriter::{Workbook, Worksheet};
use zip::ZipWriter;
use zip::write::FileOptions;

use crate::error::Result;
use crate::table::Table;

/// Convert a table to XLSX format
///
/// This function exports a table to XLSX (Excel) format using the rust_xlsxwriter library.
/// The header row is written first, followed by every data row. All values are written
/// as text, so ids keep their exact form (leading zeros included).
///
/// # Arguments
/// * `table` - Reference to the table to convert
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
///
/// # Examples
/// ```
/// use gaspar_remap::table::Table;
/// use gaspar_remap::downloader::to_xlsx;
///
/// let table = Table::new(vec!["Viddler ID".to_string()]);
/// match to_xlsx(&table) {
///     Ok(xlsx_data) => println!("XLSX generated: {} bytes", xlsx_data.len()),
///     Err(e) => eprintln!("Failed to generate XLSX: {}", e),
/// }
/// ```
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    for (c, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, c as u16, name.as_str())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            // Blank cells stay blank instead of becoming empty strings
            if value.is_empty() {
                continue;
            }
            worksheet.write_string((r + 1) as u32, c as u16, value.as_str())?;
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}

/// In-memory zip archive of transformed workbooks
pub struct ArchiveBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        ArchiveBuilder {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add one file to the archive
    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Close the archive and return its bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        ArchiveBuilder::new()
    }
}
