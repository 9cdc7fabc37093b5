/*!
# Viddler to Gaspar Mapping Tool

Rewrites references to legacy Viddler media ids into Gaspar media ids inside
Excel workbooks.

## Overview

A user supplies one mapping workbook (Viddler id to Gaspar id pairs) and one
or more batch workbooks that reference Viddler ids. Every batch workbook gets
new columns next to the columns they are derived from, and the results are
returned as a zip archive.

## Workflow

1. **Mapping**: every sheet carrying both a `ViddlerMediaId` and a
   `GasparMediaId` column contributes its rows to a [`MappingTable`].
   Later rows win on duplicate ids.
2. **Batch**: for each `.xlsx` file the first sheet is loaded as text and:
   - the leftmost column whose header mentions `viddler` (or is exactly `id`)
     gets a `Gaspar ID` column right after it;
   - if an `EMBED` column exists, an `EMBED Updated` column with the Gaspar
     player markup is placed after it;
   - a `Media ID` column gets a `Media ID Updated` column where the id inside
     `_viddler_<id>_` is replaced and `viddler` becomes `gaspar`.
3. **Archive**: each transformed sheet is written as
   `<original name>_updated.xlsx` into a zip. A file that fails is reported
   by name and left out; the others are still processed.

Anything that can't be resolved is reported as `ID Not Found`.

## Modules

- **table**: text-valued sheet with column insertion and reordering
- **mapping**: the Viddler to Gaspar lookup table
- **columns**: header heuristics used to find id columns
- **transform**: derived columns and batch processing
- **loader**: xlsx import
- **downloader**: xlsx and zip export
- **app**: upload/download web interface (`web` feature)
*/

pub mod columns;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod table;
pub mod transform;

#[cfg(feature = "web")]
pub mod app;

pub use error::{RemapError, Result};
pub use mapping::{MappingTable, NOT_FOUND};
pub use table::Table;
pub use transform::{BatchReport, FileError, process_batch, process_file, transform_table};
