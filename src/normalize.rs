//! Null-safe conversion of raw cells into typed scalars.
//!
//! Every function here degrades malformed or missing input to `None` (or an
//! empty string for addresses). Nothing panics and nothing defaults to zero.

use crate::data::model::{CellValue, RawRow};

static NULL: CellValue = CellValue::Null;

/// Look up a column in a row; absent columns read as [`CellValue::Null`].
pub fn cell<'a>(row: &'a RawRow, column: &str) -> &'a CellValue {
    row.get(column).unwrap_or(&NULL)
}

/// A finite float, or `None` for missing, non-numeric, NaN or infinite input.
pub fn safe_float(value: &CellValue) -> Option<f64> {
    let v = match value {
        CellValue::Float(f) => *f,
        CellValue::Integer(i) => *i as f64,
        CellValue::String(s) => s.trim().parse::<f64>().ok()?,
        CellValue::Bool(_) | CellValue::Null => return None,
    };
    v.is_finite().then_some(v)
}

/// An integer truncated toward zero (`"12.9"` → `12`), or `None`.
pub fn safe_int(value: &CellValue) -> Option<i64> {
    if let CellValue::Integer(i) = value {
        return Some(*i);
    }
    let v = safe_float(value)?.trunc();
    (v >= i64::MIN as f64 && v < i64::MAX as f64).then_some(v as i64)
}

/// Normalise a UK postcode to `"OUTWARD INWARD"` form.
///
/// Non-string input yields `None`. Whitespace is removed and the result
/// upper-cased; codes of four or more characters get a single space before the
/// last three (`"ec1a1bb"` → `"EC1A 1BB"`).
pub fn format_postcode(value: &CellValue) -> Option<String> {
    let raw = value.as_str()?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();

    let len = cleaned.chars().count();
    if len < 4 {
        return (!cleaned.is_empty()).then_some(cleaned);
    }
    let split = cleaned
        .char_indices()
        .nth(len - 3)
        .map_or(cleaned.len(), |(i, _)| i);
    Some(format!("{} {}", &cleaned[..split], &cleaned[split..]))
}

/// Postcode with all whitespace removed, for prefix matching.
pub fn compact_postcode(postcode: &str) -> String {
    postcode.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Word-boundary title case: a letter following a non-letter is upper-cased,
/// every other letter lower-cased. `"3rd st"` becomes `"3Rd St"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Join the address-line columns, in column order, into one display string.
/// Empty, non-string and `"NA"` fragments are skipped.
pub fn make_address(row: &RawRow, columns: &[String]) -> String {
    columns
        .iter()
        .filter_map(|column| cell(row, column).as_str())
        .map(str::trim)
        .filter(|part| !part.is_empty() && !part.eq_ignore_ascii_case("NA"))
        .map(title_case)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Map a 0–100 achievement percent onto a 0–5 star rating.
pub fn rating_from_achievement(achievement_percent: Option<f64>) -> Option<f64> {
    achievement_percent.map(|pct| (pct / 20.0).clamp(0.0, 5.0))
}

/// Text form of a cell: non-empty strings as-is, finite numbers via `Display`.
pub fn text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::String(s) if !s.is_empty() => Some(s.clone()),
        CellValue::Integer(i) => Some(i.to_string()),
        CellValue::Float(f) if f.is_finite() => Some(f.to_string()),
        _ => None,
    }
}

/// The first column, in priority order, holding a usable text value.
pub fn first_text(row: &RawRow, columns: &[String]) -> Option<String> {
    columns.iter().find_map(|column| text(cell(row, column)))
}

/// Round half away from zero to `places` decimal places. Values too large to
/// scale are already integral and come back unchanged.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}
