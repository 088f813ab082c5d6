/// Data layer: core types, loading, and postcode selection.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    Table      │  Vec<RawRow>, column index
///   └──────────────┘
///        │   (records::build_practice_records)
///        ▼
///   ┌──────────┐
///   │  filter   │  postcode prefix → matching PracticeRecords
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
