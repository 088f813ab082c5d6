use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::Result;
use crate::payload::DashboardPayload;

pub const DEFAULT_GLOBAL: &str = "window.DASHBOARD_DATA";

/// How the payload is written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// `<global> = <json>` for loading with a plain `<script>` tag.
    Script { global: String },
    /// The bare JSON document.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Script {
            global: DEFAULT_GLOBAL.to_string(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Script { global } => write!(f, "script ({global})"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "script" | "js" => Ok(OutputFormat::default()),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected script or json)")),
        }
    }
}

/// Render the payload with two-space indentation.
pub fn render(payload: &DashboardPayload, format: &OutputFormat) -> Result<String> {
    let json = serde_json::to_string_pretty(payload)?;
    Ok(match format {
        OutputFormat::Script { global } => format!("{global} = {json}\n"),
        OutputFormat::Json => format!("{json}\n"),
    })
}

/// Render then write in one shot, creating parent directories as needed.
/// Nothing touches the filesystem if rendering fails.
pub fn write_payload(path: &Path, payload: &DashboardPayload, format: &OutputFormat) -> Result<()> {
    let rendered = render(payload, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &rendered)?;
    log::debug!("Wrote {} bytes to {}", rendered.len(), path.display());
    Ok(())
}
