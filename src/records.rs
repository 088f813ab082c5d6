//! Builds the canonical practice record set from raw source rows.

use crate::config::ColumnMap;
use crate::data::model::{Coordinates, PracticeRecord, RawRow, Table};
use crate::normalize::{
    cell, first_text, format_postcode, make_address, rating_from_achievement, round_to,
    safe_float, safe_int, text, title_case,
};

/// Counts from one record-building pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub rows_read: usize,
    pub records_kept: usize,
    pub dropped_without_coordinates: usize,
}

/// Normalise one row. Returns `None` when latitude or longitude is missing,
/// which is the only reason a row is excluded.
pub fn build_record(row: &RawRow, columns: &ColumnMap) -> Option<PracticeRecord> {
    let lat = safe_float(cell(row, &columns.latitude))?;
    let lng = safe_float(cell(row, &columns.longitude))?;

    let float = |column: &str| safe_float(cell(row, column));
    let int = |column: &str| safe_int(cell(row, column));

    let achievement_percent = float(&columns.achievement_percent);
    let practice_code = text(cell(row, &columns.practice_code));

    Some(PracticeRecord {
        id: practice_code.clone(),
        name: cell(row, &columns.practice_name).as_str().map(title_case),
        practice_code,
        postcode: format_postcode(cell(row, &columns.postcode)),
        coordinates: Coordinates {
            lat: round_to(lat, 6),
            lng: round_to(lng, 6),
        },
        rating: rating_from_achievement(achievement_percent),
        achievement_percent,
        achievement_score: float(&columns.achievement_score),
        intervention_percent: float(&columns.intervention_percent),
        review_percent: float(&columns.review_percent),
        prevalence_percent: float(&columns.prevalence_percent),
        register: int(&columns.register),
        list_size: int(&columns.list_size),
        pca_rate: float(&columns.pca_rate),
        is_nhs: true,
        phone: cell(row, &columns.phone).as_str().map(|p| p.trim().to_string()),
        address: make_address(row, &columns.address_lines),
        icb_name: first_text(row, &columns.icb_name),
        ccg_name: first_text(row, &columns.ccg_name),
        region_name: first_text(row, &columns.region_name),
    })
}

/// Normalise every row, preserving source order and dropping rows without
/// both coordinates.
pub fn build_practice_records(
    rows: &[RawRow],
    columns: &ColumnMap,
) -> (Vec<PracticeRecord>, BuildReport) {
    let records: Vec<PracticeRecord> = rows
        .iter()
        .filter_map(|row| build_record(row, columns))
        .collect();

    let report = BuildReport {
        rows_read: rows.len(),
        records_kept: records.len(),
        dropped_without_coordinates: rows.len() - records.len(),
    };
    log::debug!(
        "Built {} practice records from {} rows ({} without coordinates)",
        report.records_kept,
        report.rows_read,
        report.dropped_without_coordinates
    );
    (records, report)
}

/// Warn once for each configured column the source does not carry.
/// Missing columns are not an error; their fields simply come out null.
pub fn warn_missing_columns(table: &Table, columns: &ColumnMap) -> Vec<String> {
    let mut missing: Vec<String> = columns
        .all()
        .into_iter()
        .filter(|name| !table.has_column(name))
        .map(str::to_string)
        .collect();
    missing.sort();
    missing.dedup();
    for name in &missing {
        log::warn!("Source has no '{name}' column; the field will be null");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn row(pairs: &[(&str, CellValue)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn alpha_row() -> RawRow {
        row(&[
            ("Practice_code", "X1".into()),
            ("Practice_name", "alpha practice".into()),
            ("Y", 51.5.into()),
            ("X", (-0.1).into()),
            ("Postcode", "EC1A1BB".into()),
            ("Achievement_2021_22", 80.0.into()),
        ])
    }

    #[test]
    fn builds_a_normalised_record() {
        let record = build_record(&alpha_row(), &ColumnMap::default()).unwrap();
        assert_eq!(record.id.as_deref(), Some("X1"));
        assert_eq!(record.practice_code.as_deref(), Some("X1"));
        assert_eq!(record.name.as_deref(), Some("Alpha Practice"));
        assert_eq!(record.postcode.as_deref(), Some("EC1A 1BB"));
        assert_eq!(record.rating, Some(4.0));
        assert_eq!(record.coordinates, Coordinates { lat: 51.5, lng: -0.1 });
        assert!(record.is_nhs);
        assert_eq!(record.address, "");
        assert_eq!(record.register, None);
    }

    #[test]
    fn rows_without_both_coordinates_are_dropped() {
        let mut no_lat = alpha_row();
        no_lat.remove("Y");
        let mut nan_lng = alpha_row();
        nan_lng.insert("X".into(), CellValue::Float(f64::NAN));
        let mut text_lat = alpha_row();
        text_lat.insert("Y".into(), "north".into());

        let rows = vec![alpha_row(), no_lat, nan_lng, text_lat];
        let (records, report) = build_practice_records(&rows, &ColumnMap::default());

        assert_eq!(records.len(), 1);
        assert_eq!(
            report,
            BuildReport {
                rows_read: 4,
                records_kept: 1,
                dropped_without_coordinates: 3
            }
        );
    }

    #[test]
    fn malformed_metrics_degrade_to_null() {
        let mut r = alpha_row();
        r.insert("Achievement_2021_22".into(), "n/a".into());
        r.insert("Register_2021_22".into(), "12.9".into());
        r.insert("List_size_2021_22".into(), CellValue::Bool(true));
        r.insert("TelNum".into(), " 020 7946 0000 ".into());
        let record = build_record(&r, &ColumnMap::default()).unwrap();
        assert_eq!(record.achievement_percent, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.register, Some(12));
        assert_eq!(record.list_size, None);
        assert_eq!(record.phone.as_deref(), Some("020 7946 0000"));
    }

    #[test]
    fn classification_falls_back_in_priority_order() {
        let mut r = alpha_row();
        r.insert("Sub_ICB_Loc_name".into(), "NHS North Central London".into());
        r.insert("Region Name".into(), "London".into());
        r.insert("NHSE Region Name".into(), "London Region".into());
        let record = build_record(&r, &ColumnMap::default()).unwrap();
        assert_eq!(record.icb_name.as_deref(), Some("NHS North Central London"));
        assert_eq!(record.region_name.as_deref(), Some("London Region"));
        assert_eq!(record.ccg_name, None);
    }

    #[test]
    fn numeric_practice_code_becomes_text() {
        let mut r = alpha_row();
        r.insert("Practice_code".into(), CellValue::Integer(84021));
        let record = build_record(&r, &ColumnMap::default()).unwrap();
        assert_eq!(record.id.as_deref(), Some("84021"));
    }

    #[test]
    fn coordinates_are_rounded_to_six_places() {
        let mut r = alpha_row();
        r.insert("Y".into(), 51.12345678.into());
        let record = build_record(&r, &ColumnMap::default()).unwrap();
        assert_eq!(record.coordinates.lat, 51.123457);
    }

    #[test]
    fn order_is_preserved() {
        let mut second = alpha_row();
        second.insert("Practice_code".into(), "X2".into());
        let mut third = alpha_row();
        third.insert("Practice_code".into(), "X3".into());
        let (records, _) =
            build_practice_records(&[alpha_row(), second, third], &ColumnMap::default());
        let ids: Vec<_> = records.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec!["X1", "X2", "X3"]);
    }

    #[test]
    fn reports_absent_configured_columns() {
        let table = Table::from_rows(vec![alpha_row()]);
        let missing = warn_missing_columns(&table, &ColumnMap::default());
        assert!(missing.contains(&"TelNum".to_string()));
        assert!(!missing.contains(&"Postcode".to_string()));
    }
}
