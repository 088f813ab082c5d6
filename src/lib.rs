//! Builds the static data bundle for the GP practice dashboard.
//!
//! ```text
//!  Full_Data.csv / .json / .parquet        weather_lookup.json (optional)
//!        │                                        │
//!        ▼                                        │
//!   data::loader  → Table of RawRow               │
//!        │                                        │
//!        ▼                                        │
//!   records       → Vec<PracticeRecord>           │
//!        │                                        │
//!        ▼                                        ▼
//!   aggregate     → DashboardPayload  ◄──────  lookup
//!        │
//!        ▼
//!   output        → window.DASHBOARD_DATA = {...}
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod lookup;
pub mod normalize;
pub mod output;
pub mod payload;
pub mod pipeline;
pub mod records;

pub use config::PipelineConfig;
pub use error::{DashboardError, Result};
pub use pipeline::{DashboardBuild, build_dashboard};
