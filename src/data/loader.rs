use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawRow, Table};
use crate::error::DashboardError;

/// Tokens a Pandas CSV reader treats as missing by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the practice table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one practice per line (the published dataset)
/// * `.json`    – `[{ "Practice_code": "...", "Y": 51.5, ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// A missing file is reported as [`DashboardError::MissingSource`] before any
/// reader is opened.
pub fn load_table(path: &Path) -> Result<Table, DashboardError> {
    if !path.is_file() {
        return Err(DashboardError::MissingSource {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    }
    .map_err(|err| DashboardError::UnreadableSource {
        path: path.to_path_buf(),
        reason: format!("{err:#}"),
    })?;

    log::debug!(
        "Loaded {} rows ({} columns) from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Read CSV text with a header row.
///
/// Each column gets one type, inferred over all of its non-missing values the
/// way a Pandas reader does: integer if every value parses as one, then float,
/// then boolean, otherwise every cell in the column stays text.
pub fn read_csv<R: std::io::Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        records.push(result.with_context(|| format!("CSV row {row_no}"))?);
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|col_idx| ColumnKind::infer(records.iter().filter_map(|r| r.get(col_idx))))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(col_idx, (col_name, kind))| {
                    let value = record.get(col_idx).map_or(CellValue::Null, |s| kind.cell(s));
                    (col_name.clone(), value)
                })
                .collect::<RawRow>()
        })
        .collect();

    Ok(Table::from_rows(rows))
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// The single type shared by every cell of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn infer<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let (mut ints, mut floats, mut bools) = (true, true, true);
        for s in values.filter(|s| !is_na(s)) {
            ints &= s.parse::<i64>().is_ok();
            floats &= s.parse::<f64>().is_ok();
            bools &= parse_bool(s).is_some();
            if !(floats || bools) {
                return ColumnKind::Text;
            }
        }
        if ints {
            ColumnKind::Integer
        } else if floats {
            ColumnKind::Float
        } else if bools {
            ColumnKind::Bool
        } else {
            ColumnKind::Text
        }
    }

    fn cell(self, s: &str) -> CellValue {
        if is_na(s) {
            return CellValue::Null;
        }
        let parsed = match self {
            ColumnKind::Integer => s.parse().ok().map(CellValue::Integer),
            ColumnKind::Float => s.parse().ok().map(CellValue::Float),
            ColumnKind::Bool => parse_bool(s).map(CellValue::Bool),
            ColumnKind::Text => None,
        };
        parsed.unwrap_or_else(|| CellValue::String(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Practice_code": "F83004", "Postcode": "EC1V 2PD", "Y": 51.52, "X": -0.08 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json_records(&text)
}

pub fn parse_json_records(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let row: RawRow = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(row);
    }

    Ok(Table::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of practices.
///
/// Every column is read as a scalar cell. Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let columns: Vec<(String, &Arc<dyn Array>)> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().clone(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_name, col_array) in &columns {
                cells.insert(col_name.clone(), extract_cell_value(col_array, row));
            }
            rows.push(cells);
        }
    }

    Ok(Table::from_rows(rows))
}

/// Extract a single cell from an Arrow column at a given row.
/// Unsupported column types degrade to a missing value.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map_or(CellValue::Null, |s| CellValue::String(s.value(row).to_string())),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Null, |a| CellValue::Bool(a.value(row))),
        other => {
            log::debug!("Ignoring parquet cell of unsupported type {other:?}");
            CellValue::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_cells_are_typed_by_inference() {
        let text = "Practice_code,Y,Register_2021_22,Address2,Postcode\n\
                    X1,51.5,120,NA,EC1A1BB\n\
                    X2,,7,High St,\n";
        let table = read_csv(text.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.rows[0];
        assert_eq!(first["Practice_code"], CellValue::String("X1".into()));
        assert_eq!(first["Y"], CellValue::Float(51.5));
        assert_eq!(first["Register_2021_22"], CellValue::Integer(120));
        assert_eq!(first["Address2"], CellValue::Null);

        let second = &table.rows[1];
        assert_eq!(second["Y"], CellValue::Null);
        assert_eq!(second["Postcode"], CellValue::Null);
        assert_eq!(second["Address2"], CellValue::String("High St".into()));
    }

    #[test]
    fn short_csv_rows_fill_missing_cells_with_null() {
        let table = read_csv("A,B,C\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.rows[0]["C"], CellValue::Null);
    }

    #[test]
    fn json_records_keep_native_types() {
        let table = parse_json_records(
            r#"[{"Practice_code": "X1", "Y": 51.5, "List_size_2021_22": 9000, "TelNum": null}]"#,
        )
        .unwrap();
        let row = &table.rows[0];
        assert_eq!(row["Y"], CellValue::Float(51.5));
        assert_eq!(row["List_size_2021_22"], CellValue::Integer(9000));
        assert_eq!(row["TelNum"], CellValue::Null);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(parse_json_records(r#"{"Practice_code": "X1"}"#).is_err());
        assert!(parse_json_records(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn column_kinds_follow_every_value() {
        let kind = |values: &[&str]| ColumnKind::infer(values.iter().copied());
        assert_eq!(kind(&["1", "NA", "7"]), ColumnKind::Integer);
        assert_eq!(kind(&["1", "-0.25"]), ColumnKind::Float);
        assert_eq!(kind(&["True", "false"]), ColumnKind::Bool);
        assert_eq!(kind(&["12", "Unit 4"]), ColumnKind::Text);
        assert_eq!(kind(&["1", "True"]), ColumnKind::Text);
        assert_eq!(ColumnKind::Float.cell("nan"), CellValue::Null);
    }

    #[test]
    fn numeric_looking_text_keeps_its_digits() {
        let text = "Practice_code,TelNum,Address1,Y\n\
                    0123,02079460000,12,51.5\n\
                    X2,020 7946 0001,Unit 4,51\n";
        let table = read_csv(text.as_bytes()).unwrap();

        let first = &table.rows[0];
        assert_eq!(first["Practice_code"], CellValue::String("0123".into()));
        assert_eq!(first["TelNum"], CellValue::String("02079460000".into()));
        assert_eq!(first["Address1"], CellValue::String("12".into()));
        assert_eq!(first["Y"], CellValue::Float(51.5));
        assert_eq!(table.rows[1]["Y"], CellValue::Float(51.0));
    }
}
