use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a tabular source
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a Pandas reader yields.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Borrow the string payload, if this is a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Null, Into::into)
    }
}

/// One row of the source table: column_name → value.
/// Absent columns and `CellValue::Null` are treated identically downstream.
pub type RawRow = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Table – the complete loaded tabular source
// ---------------------------------------------------------------------------

/// The full parsed source with its column index.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// All rows, in source order.
    pub rows: Vec<RawRow>,
    /// Sorted list of column names seen across all rows.
    pub column_names: Vec<String>,
}

impl Table {
    /// Build the column index from the loaded rows.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let column_names: BTreeSet<String> = rows
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect();
        Table {
            rows,
            column_names: column_names.into_iter().collect(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names
            .binary_search_by(|c| c.as_str().cmp(name))
            .is_ok()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// PracticeRecord – one normalised, geocoded practice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single practice after normalisation. Every numeric field is finite or `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub practice_code: Option<String>,
    pub postcode: Option<String>,
    pub coordinates: Coordinates,
    /// Achievement percent mapped onto a 0–5 star scale.
    pub rating: Option<f64>,
    pub achievement_percent: Option<f64>,
    pub achievement_score: Option<f64>,
    pub intervention_percent: Option<f64>,
    pub review_percent: Option<f64>,
    pub prevalence_percent: Option<f64>,
    pub register: Option<i64>,
    pub list_size: Option<i64>,
    pub pca_rate: Option<f64>,
    pub is_nhs: bool,
    pub phone: Option<String>,
    pub address: String,
    pub icb_name: Option<String>,
    pub ccg_name: Option<String>,
    pub region_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn column_index_is_union_of_row_keys() {
        let table = Table::from_rows(vec![
            row(&[("Postcode", "EC1A1BB".into()), ("Y", 51.5.into())]),
            row(&[("X", (-0.1).into())]),
        ]);
        assert_eq!(table.column_names, vec!["Postcode", "X", "Y"]);
        assert!(table.has_column("X"));
        assert!(!table.has_column("TelNum"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(CellValue::from(None::<f64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3_i64)), CellValue::Integer(3));
        assert_eq!(CellValue::Integer(42).to_string(), "42");
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = PracticeRecord {
            id: Some("X1".into()),
            name: Some("Alpha Practice".into()),
            practice_code: Some("X1".into()),
            postcode: None,
            coordinates: Coordinates { lat: 51.5, lng: -0.1 },
            rating: None,
            achievement_percent: None,
            achievement_score: None,
            intervention_percent: None,
            review_percent: None,
            prevalence_percent: None,
            register: Some(10),
            list_size: None,
            pca_rate: None,
            is_nhs: true,
            phone: None,
            address: String::new(),
            icb_name: None,
            ccg_name: None,
            region_name: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["practiceCode"], "X1");
        assert_eq!(json["isNhs"], true);
        assert_eq!(json["coordinates"]["lng"], -0.1);
        assert!(json["postcode"].is_null());
        assert_eq!(json["register"], 10);
    }
}
