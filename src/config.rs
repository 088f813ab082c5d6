use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Everything dataset-specific the pipeline needs: source column names, the
/// sampled areas, the cohort definition and the static demo blocks.
///
/// Every section falls back to the values for the 2021/22 COPD practice
/// dataset, so an empty TOML file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnMap,
    pub areas: Vec<AreaSpec>,
    pub cohort: CohortConfig,
    pub weather_today: WeatherToday,
    pub demo_profile: DemoProfile,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            areas: AreaSpec::defaults(),
            cohort: CohortConfig::default(),
            weather_today: WeatherToday::default(),
            demo_profile: DemoProfile::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(contents)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. The file must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cohort.prefix.trim().is_empty() {
            return Err(DashboardError::Config(
                "cohort.prefix must not be empty".to_string(),
            ));
        }
        if let Some(area) = self.areas.iter().find(|a| a.prefix.trim().is_empty()) {
            return Err(DashboardError::Config(format!(
                "area '{}' has an empty prefix",
                area.postcode
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Source column names. Fields holding a list are tried in order and the first
/// present value wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub practice_code: String,
    pub practice_name: String,
    pub postcode: String,
    pub latitude: String,
    pub longitude: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub achievement_percent: String,
    pub achievement_score: String,
    pub intervention_percent: String,
    pub review_percent: String,
    pub prevalence_percent: String,
    pub register: String,
    pub list_size: String,
    pub pca_rate: String,
    pub icb_name: Vec<String>,
    pub ccg_name: Vec<String>,
    pub region_name: Vec<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            practice_code: "Practice_code".into(),
            practice_name: "Practice_name".into(),
            postcode: "Postcode".into(),
            latitude: "Y".into(),
            longitude: "X".into(),
            address_lines: (1..=5).map(|i| format!("Address{i}")).collect(),
            phone: "TelNum".into(),
            achievement_percent: "Achievement_2021_22".into(),
            achievement_score: "Achievement_Score_2021_22".into(),
            intervention_percent: "COPD008_Patients_receiving_Intervention_percentage".into(),
            review_percent: "COPD010_Patients_receiving_Intervention_percentage".into(),
            prevalence_percent: "Prevalence_2021_22".into(),
            register: "Register_2021_22".into(),
            list_size: "List_size_2021_22".into(),
            pca_rate: "PCA_Rate_2021_22".into(),
            icb_name: vec!["Integrated Care Board Name".into(), "Sub_ICB_Loc_name".into()],
            ccg_name: vec!["CCG Name".into()],
            region_name: vec!["NHSE Region Name".into(), "Region Name".into()],
        }
    }
}

impl ColumnMap {
    /// Every column name the record builder reads, in no particular order.
    pub fn all(&self) -> Vec<&str> {
        let singles = [
            &self.practice_code,
            &self.practice_name,
            &self.postcode,
            &self.latitude,
            &self.longitude,
            &self.phone,
            &self.achievement_percent,
            &self.achievement_score,
            &self.intervention_percent,
            &self.review_percent,
            &self.prevalence_percent,
            &self.register,
            &self.list_size,
            &self.pca_rate,
        ];
        singles
            .into_iter()
            .chain(&self.address_lines)
            .chain(&self.icb_name)
            .chain(&self.ccg_name)
            .chain(&self.region_name)
            .map(String::as_str)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Areas and cohort
// ---------------------------------------------------------------------------

/// One sampled area: records whose compact postcode starts with `prefix` are
/// averaged and emitted under the canonical `postcode` key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AreaSpec {
    pub prefix: String,
    pub postcode: String,
    pub label: String,
}

impl AreaSpec {
    fn new(prefix: &str, postcode: &str, label: &str) -> Self {
        Self {
            prefix: prefix.into(),
            postcode: postcode.into(),
            label: label.into(),
        }
    }

    /// The areas shown on the dashboard map by default.
    pub fn defaults() -> Vec<AreaSpec> {
        vec![
            AreaSpec::new("EC1", "EC1A 1BB", "Central London (EC1)"),
            AreaSpec::new("SW1", "SW1A 0AA", "Westminster (SW1)"),
            AreaSpec::new("M1", "M1 1AE", "Manchester (M1)"),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CohortConfig {
    pub prefix: String,
    pub top_n: usize,
    pub alias: String,
    pub home_postcode: String,
    pub summary_label: String,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            prefix: "EC1".into(),
            top_n: 7,
            alias: "Central London COPD Cohort".into(),
            home_postcode: "EC1A 1BB".into(),
            summary_label: "Achievement % (Top EC1 Practices)".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Static demo blocks
// ---------------------------------------------------------------------------

/// Illustrative "today" weather card. Not computed from data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct WeatherToday {
    pub temperature_c: i64,
    pub humidity: i64,
    pub aqi: i64,
    pub condition: String,
    pub icon: String,
    pub advice: String,
}

impl Default for WeatherToday {
    fn default() -> Self {
        Self {
            temperature_c: 13,
            humidity: 65,
            aqi: 38,
            condition: "Partly cloudy (demo)".into(),
            icon: "\u{26c5}".into(),
            advice: "Replace with local AQI and weather feed when available.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "camelCase"))]
pub struct DemoProfile {
    pub name: String,
    pub age: u32,
    pub avatar_initials: String,
    pub location: String,
    pub tagline: String,
}

impl Default for DemoProfile {
    fn default() -> Self {
        Self {
            name: "Tung".into(),
            age: 34,
            avatar_initials: "TG".into(),
            location: "Shoreditch, London".into(),
            tagline: String::new(),
        }
    }
}
