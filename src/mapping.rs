use std::collections::HashMap;

use log::{debug, info};

use crate::error::{RemapError, Result};
use crate::table::Table;

/// Header of the old-id column in a mapping sheet.
pub const OLD_ID_COLUMN: &str = "ViddlerMediaId";
/// Header of the new-id column in a mapping sheet.
pub const NEW_ID_COLUMN: &str = "GasparMediaId";
/// Marker reported for every id that could not be resolved.
pub const NOT_FOUND: &str = "ID Not Found";

/// Viddler id to Gaspar id lookup.
///
/// Built once from a mapping workbook and then handed by reference to every
/// batch transform; nothing mutates it while a batch runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
}

impl MappingTable {
    pub fn new() -> Self {
        MappingTable::default()
    }

    /// Build a table from every sheet that carries both mapping columns.
    ///
    /// Sheets are read in order and later rows overwrite earlier ones with
    /// the same old id. Rows with an empty old id are skipped.
    ///
    /// # Errors
    /// [`RemapError::MappingIncomplete`] if no sheet contributes an entry.
    pub fn from_sheets<'a, I>(sheets: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a Table)>,
    {
        let mut mapping = MappingTable::new();

        for (name, sheet) in sheets {
            let (old_idx, new_idx) = match (
                sheet.column_index(OLD_ID_COLUMN),
                sheet.column_index(NEW_ID_COLUMN),
            ) {
                (Some(old_idx), Some(new_idx)) => (old_idx, new_idx),
                _ => {
                    debug!("sheet '{}' has no mapping columns, skipping", name);
                    continue;
                }
            };

            let before = mapping.len();
            for row in &sheet.rows {
                let old_id = &row[old_idx];
                if old_id.is_empty() {
                    continue;
                }
                mapping.insert(old_id.clone(), row[new_idx].clone());
            }
            debug!(
                "sheet '{}' contributed {} new ids ({} rows)",
                name,
                mapping.len() - before,
                sheet.height()
            );
        }

        if mapping.is_empty() {
            return Err(RemapError::MappingIncomplete);
        }

        info!("loaded {} id mappings", mapping.len());
        Ok(mapping)
    }

    /// Insert a pair, replacing any previous new id for `old_id`.
    pub fn insert(&mut self, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.entries.insert(old_id.into(), new_id.into());
    }

    /// Fold `other` into this table; its entries win on collision.
    pub fn merge(&mut self, other: MappingTable) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, old_id: &str) -> Option<&str> {
        self.entries.get(old_id).map(String::as_str)
    }

    /// Look up `old_id`, falling back to [`NOT_FOUND`].
    pub fn resolve(&self, old_id: &str) -> &str {
        self.get(old_id).unwrap_or(NOT_FOUND)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
