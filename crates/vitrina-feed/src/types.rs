//! Raw shapes produced by the CSV parse layer.
//!
//! ## Observed shape of the published sheets
//!
//! ### Header
//! One header row with Spanish column names. Extra columns (notes, internal
//! costs) show up regularly and are ignored. Columns may be missing entirely
//! on older sheets; a missing column reads as `""`.
//!
//! ### Repeated headers
//! Some exports paste the header row again in the middle of the data, e.g.
//! when two tabs are concatenated. Ingestion drops those rows.
//!
//! ### Encoding
//! Published sheets are UTF-8, sometimes with a BOM. Cells are kept as raw
//! bytes here so that a bad cell fails ingestion of the catalog rather than
//! the parse of the whole file.

use std::collections::HashMap;

use crate::error::FeedError;

pub const COL_CATEGORY: &str = "Categoria";
pub const COL_SUBCATEGORY: &str = "Subcategoria";
pub const COL_LINE: &str = "Linea";
pub const COL_MODEL: &str = "Modelo";
pub const COL_PRICE: &str = "Precio";
pub const COL_HIDDEN: &str = "Ocultar";
pub const COL_VERSION: &str = "Version";
pub const COL_SPECS: &str = "Specs";
pub const COL_LABEL: &str = "Label";
pub const COL_CAPACITY: &str = "Capacidad";
pub const COL_CONDITION: &str = "Condicion";
pub const COL_COLOR: &str = "Color";
pub const COL_BATTERY: &str = "Bateria";
pub const COL_PHOTOS: &str = "Fotos";
pub const COL_AVATAR: &str = "Avatar";

/// One data row keyed by header name.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 1-based line of the row in the source file.
    pub line: u64,
    cells: HashMap<String, Vec<u8>>,
}

impl RawRow {
    /// Builds a row from `(column, value)` pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(line: u64, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        Self {
            line,
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the cell under `column`, or `""` when the column is absent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Normalization`] if the cell is not valid UTF-8.
    pub fn field(&self, column: &str) -> Result<&str, FeedError> {
        match self.cells.get(column) {
            None => Ok(""),
            Some(bytes) => {
                std::str::from_utf8(bytes).map_err(|e| FeedError::Normalization {
                    line: self.line,
                    reason: format!("column {column} is not valid UTF-8: {e}"),
                })
            }
        }
    }
}

/// A row the CSV reader rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRowError {
    pub line: Option<u64>,
    pub message: String,
}

impl std::fmt::Display for CsvRowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Output of [`crate::parse::parse_csv`]: every readable row plus every
/// structural error encountered.
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub errors: Vec<CsvRowError>,
}
