//! Column discovery for batch sheets.

use log::debug;

/// Column that carries composite media names.
pub const MEDIA_ID_COLUMN: &str = "Media ID";
/// Column that carries the legacy embed markup.
pub const EMBED_COLUMN: &str = "EMBED";

pub const GASPAR_ID_COLUMN: &str = "Gaspar ID";
pub const EMBED_UPDATED_COLUMN: &str = "EMBED Updated";
pub const MEDIA_ID_UPDATED_COLUMN: &str = "Media ID Updated";

/// Checks a normalized (trimmed, lowercased) header.
pub type HeaderPredicate = fn(&str) -> bool;

fn mentions_viddler(header: &str) -> bool {
    header.contains("viddler")
}

fn is_bare_id(header: &str) -> bool {
    header == "id"
}

/// Headers that mark a column of whole-cell Viddler ids.
pub const ID_COLUMN_PREDICATES: &[HeaderPredicate] = &[mentions_viddler, is_bare_id];

/// Return the leftmost column satisfying any of `predicates`.
pub fn find_column<'a, S: AsRef<str>>(
    columns: &'a [S],
    predicates: &[HeaderPredicate],
) -> Option<&'a str> {
    columns.iter().map(|c| c.as_ref()).find(|name| {
        let header = name.trim().to_lowercase();
        predicates.iter().any(|matches| matches(&header))
    })
}

/// Find the column holding Viddler ids, if any.
///
/// When several columns qualify only the leftmost is used.
pub fn find_id_column<S: AsRef<str>>(columns: &[S]) -> Option<&str> {
    let found = find_column(columns, ID_COLUMN_PREDICATES);
    debug!("id column: {:?}", found);
    found
}
