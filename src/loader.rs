use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, Xlsx};

use crate::error::{RemapError, Result};
use crate::mapping::MappingTable;
use crate::table::Table;

/// Load every sheet of an xlsx workbook held in memory
///
/// Each sheet is converted to a text-valued [`Table`] whose first row holds
/// the column names. Sheets come back in workbook order.
///
/// # Arguments
/// * `data` - Raw bytes of the xlsx file
///
/// # Returns
/// * `Result<Vec<(String, Table)>>` - Sheet names paired with their tables
///
/// # Examples
/// ```no_run
/// use gaspar_remap::loader::from_excel;
///
/// let data = std::fs::read("batch.xlsx").unwrap();
/// match from_excel(&data) {
///     Ok(sheets) => println!("Loaded {} sheets", sheets.len()),
///     Err(e) => eprintln!("Error loading Excel: {}", e),
/// }
/// ```
pub fn from_excel(data: &[u8]) -> Result<Vec<(String, Table)>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        sheets.push((sheet_name, Table::from_range(&range)));
    }

    Ok(sheets)
}

/// Load only the first sheet of an xlsx workbook held in memory
pub fn first_sheet(data: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(RemapError::EmptyWorkbook)?;

    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(Table::from_range(&range))
}

/// Build a mapping table from an uploaded mapping workbook
///
/// Every sheet is scanned; see [`MappingTable::from_sheets`] for which
/// sheets count.
pub fn load_mapping(data: &[u8]) -> Result<MappingTable> {
    let sheets = from_excel(data)?;
    MappingTable::from_sheets(sheets.iter().map(|(name, table)| (name.as_str(), table)))
}

/// Read a mapping workbook from disk
pub fn load_mapping_file(filepath: impl AsRef<Path>) -> Result<MappingTable> {
    let data = fs::read(filepath)?;
    load_mapping(&data)
}
