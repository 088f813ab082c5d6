use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a dashboard build. Cell-level problems never surface
/// here; they degrade to missing values during normalisation.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Cannot find source data at {}", path.display())]
    MissingSource { path: PathBuf },

    #[error("Failed to read source data at {}: {reason}", path.display())]
    UnreadableSource { path: PathBuf, reason: String },

    #[error("Failed to parse weather lookup file: {}", path.display())]
    MalformedLookup {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Weather lookup file {} is not a JSON object", path.display())]
    LookupNotObject { path: PathBuf },

    #[error("Failed to read weather lookup file {}: {source}", path.display())]
    LookupRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether this error belongs to the malformed-lookup family.
    pub fn is_malformed_lookup(&self) -> bool {
        matches!(
            self,
            DashboardError::MalformedLookup { .. } | DashboardError::LookupNotObject { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_share_one_family() {
        let path = PathBuf::from("data/weather_lookup.json");
        let not_object = DashboardError::LookupNotObject { path: path.clone() };
        let missing = DashboardError::MissingSource { path };
        assert!(not_object.is_malformed_lookup());
        assert!(!missing.is_malformed_lookup());
    }
}
