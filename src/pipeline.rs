use std::path::Path;

use crate::aggregate::build_payload;
use crate::config::PipelineConfig;
use crate::data::loader::load_table;
use crate::error::Result;
use crate::lookup::load_weather_lookup;
use crate::payload::{DashboardPayload, WeatherLookup};
use crate::records::{BuildReport, build_practice_records, warn_missing_columns};

/// Result of one dashboard build.
#[derive(Debug, Clone)]
pub struct DashboardBuild {
    pub payload: DashboardPayload,
    pub report: BuildReport,
}

/// Load the source table and optional weather lookup, then build the payload.
///
/// Either both inputs are read successfully and a complete payload comes
/// back, or an error does and nothing has been produced.
pub fn build_dashboard(
    source: &Path,
    weather_lookup: Option<&Path>,
    config: &PipelineConfig,
) -> Result<DashboardBuild> {
    let table = load_table(source)?;
    warn_missing_columns(&table, &config.columns);

    let lookup = match weather_lookup {
        Some(path) => load_weather_lookup(path)?,
        None => WeatherLookup::new(),
    };

    let (records, report) = build_practice_records(&table.rows, &config.columns);
    log::info!(
        "Read {} rows from {}; kept {} practices, dropped {} without coordinates",
        report.rows_read,
        source.display(),
        report.records_kept,
        report.dropped_without_coordinates
    );

    let payload = build_payload(records, lookup, config);
    log::info!(
        "Sampled {} of {} areas; weather lookup has {} postcodes",
        payload.sample_postcodes.len(),
        config.areas.len(),
        payload.weather_lookup.len()
    );

    Ok(DashboardBuild { payload, report })
}
