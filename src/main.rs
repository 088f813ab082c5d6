use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gp_dashboard::output::{DEFAULT_GLOBAL, OutputFormat, write_payload};
use gp_dashboard::{PipelineConfig, build_dashboard};

/// Generate the dashboard data bundle from the NHS COPD practice dataset.
#[derive(Parser, Debug)]
#[command(name = "gp-dashboard", version, about)]
struct Args {
    /// Practice table (.csv, .json or .parquet)
    #[arg(long, default_value = "../Full_Data.csv")]
    source: PathBuf,

    /// Where to write the bundle
    #[arg(long, default_value = "data/dashboard-data.js")]
    output: PathBuf,

    /// Optional postcode → weather mapping; skipped if the file is absent
    #[arg(long, default_value = "data/weather_lookup.json")]
    lookup: PathBuf,

    /// TOML file overriding column names, areas and cohort settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output form: `script` assigns a global, `json` writes plain JSON
    #[arg(long, default_value = "script")]
    format: OutputFormat,

    /// Global the script form assigns to
    #[arg(long, default_value = DEFAULT_GLOBAL)]
    global: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let format = match args.format {
        OutputFormat::Script { .. } => OutputFormat::Script {
            global: args.global.clone(),
        },
        OutputFormat::Json => OutputFormat::Json,
    };

    let build = build_dashboard(&args.source, Some(&args.lookup), &config).map_err(|err| {
        if err.is_malformed_lookup() {
            log::error!(
                "Fix {} or pass --lookup with a path that does not exist to build without weather data",
                args.lookup.display()
            );
        }
        err
    })?;

    write_payload(&args.output, &build.payload, &format)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} with {} practices.",
        args.output.display(),
        build.report.records_kept
    );
    Ok(())
}
