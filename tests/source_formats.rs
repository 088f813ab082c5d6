use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use gp_dashboard::data::loader::load_table;
use gp_dashboard::data::model::CellValue;
use gp_dashboard::{DashboardError, PipelineConfig, build_dashboard};
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

fn write_parquet(dir: &TempDir) -> PathBuf {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Practice_code", DataType::Utf8, false),
        Field::new("Practice_name", DataType::Utf8, true),
        Field::new("Postcode", DataType::Utf8, true),
        Field::new("Y", DataType::Float64, true),
        Field::new("X", DataType::Float64, true),
        Field::new("Achievement_2021_22", DataType::Float64, true),
        Field::new("Register_2021_22", DataType::Int64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["P1", "P2", "P3"])),
        Arc::new(StringArray::from(vec![Some("city road surgery"), None, Some("park view")])),
        Arc::new(StringArray::from(vec![Some("ec1v2pd"), Some("m11ae"), None])),
        Arc::new(Float64Array::from(vec![Some(51.527), None, Some(53.8)])),
        Arc::new(Float64Array::from(vec![Some(-0.0865), Some(-2.24), Some(-1.54)])),
        Arc::new(Float64Array::from(vec![Some(91.25), Some(70.0), None])),
        Arc::new(Int64Array::from(vec![Some(210), None, Some(75)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let path = dir.path().join("Full_Data.parquet");
    let mut writer = ArrowWriter::try_new(fs::File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}

#[test]
fn parquet_cells_keep_their_arrow_types() {
    let dir = TempDir::new().unwrap();
    let table = load_table(&write_parquet(&dir)).unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.rows[0]["Register_2021_22"], CellValue::Integer(210));
    assert_eq!(table.rows[1]["Y"], CellValue::Null);
    assert_eq!(table.rows[2]["Postcode"], CellValue::Null);
    assert!(table.has_column("Achievement_2021_22"));
}

#[test]
fn parquet_source_builds_the_same_records_as_csv() {
    let dir = TempDir::new().unwrap();
    let parquet = write_parquet(&dir);
    let csv = dir.path().join("Full_Data.csv");
    fs::write(
        &csv,
        "Practice_code,Practice_name,Postcode,Y,X,Achievement_2021_22,Register_2021_22\n\
         P1,city road surgery,ec1v2pd,51.527,-0.0865,91.25,210\n\
         P2,,m11ae,,-2.24,70.0,\n\
         P3,park view,,53.8,-1.54,,75\n",
    )
    .unwrap();

    let config = PipelineConfig::default();
    let from_parquet = build_dashboard(&parquet, None, &config).unwrap().payload;
    let from_csv = build_dashboard(&csv, None, &config).unwrap().payload;

    assert_eq!(from_parquet, from_csv);
    assert_eq!(from_parquet.gp_locations.len(), 2);
    assert_eq!(from_parquet.patient_summary.activity, vec![91.3]);
    assert_eq!(
        from_parquet.gp_locations[0].name.as_deref(),
        Some("City Road Surgery")
    );
}

#[test]
fn json_records_source_is_supported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Full_Data.json");
    fs::write(
        &path,
        r#"[
            {"Practice_code": "J1", "Practice_name": "THE SURGERY", "Y": 53.48, "X": -2.24, "Postcode": "M1 1AE", "List_size_2021_22": "9000.0"},
            {"Practice_code": "J2", "Y": null, "X": -2.25}
        ]"#,
    )
    .unwrap();

    let build = build_dashboard(&path, None, &PipelineConfig::default()).unwrap();
    let records = &build.payload.gp_locations;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name.as_deref(), Some("The Surgery"));
    assert_eq!(records[0].list_size, Some(9000));
    assert!(build.payload.sample_postcodes.contains_key("M1 1AE"));
}

#[test]
fn unreadable_sources_are_reported_with_their_path() {
    let dir = TempDir::new().unwrap();
    let corrupt = dir.path().join("Full_Data.parquet");
    fs::write(&corrupt, b"not a parquet file").unwrap();
    let unknown = dir.path().join("Full_Data.xlsx");
    fs::write(&unknown, b"").unwrap();

    for path in [corrupt, unknown] {
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, DashboardError::UnreadableSource { .. }), "{err}");
        assert!(err.to_string().contains("Full_Data"));
    }
}
