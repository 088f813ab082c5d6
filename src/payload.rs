use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{DemoProfile, WeatherToday};
use crate::data::model::{Coordinates, PracticeRecord};

/// Upper-cased postcode → weather object, passed through untouched.
pub type WeatherLookup = Map<String, Value>;

/// The root object handed to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub sample_postcodes: SamplePostcodes,
    pub patient_summary: CohortSummary,
    pub weather_today: WeatherToday,
    pub weather_lookup: WeatherLookup,
    pub gp_locations: Vec<PracticeRecord>,
    pub demo_profile: DemoProfile,
}

/// Mean location of the practices in one postcode area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSample {
    pub label: String,
    pub coordinates: Coordinates,
}

/// Canonical postcode → area sample, serialized in configured area order.
/// Areas without practices are never inserted.
pub type SamplePostcodes = IndexMap<String, AreaSample>;

/// Statistics over the cohort postcode area.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub alias: String,
    pub home_postcode: String,
    pub summary_label: String,
    /// Ranking metric of the top practices, highest first, one decimal place.
    pub activity: Vec<f64>,
    /// Display names parallel to `activity`.
    pub activity_labels: Vec<Option<String>>,
    pub averages: Averages,
    pub top_practice: TopPractice,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Averages {
    pub register: Option<f64>,
    pub intervention_percent: Option<f64>,
    pub review_percent: Option<f64>,
}

/// Projection of the best-ranked cohort practice. All fields are null when the
/// cohort has no ranked practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPractice {
    pub name: Option<String>,
    pub achievement_percent: Option<f64>,
    pub register: Option<i64>,
    pub prevalence_percent: Option<f64>,
    pub address: Option<String>,
}
