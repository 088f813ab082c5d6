//! Derived views over the practice record set and final payload assembly.

use crate::config::{AreaSpec, CohortConfig, PipelineConfig};
use crate::data::filter::records_with_prefix;
use crate::data::model::{Coordinates, PracticeRecord};
use crate::normalize::round_to;
use crate::payload::{
    AreaSample, Averages, CohortSummary, DashboardPayload, SamplePostcodes, TopPractice,
    WeatherLookup,
};

/// Arithmetic mean of the present values, `None` when there are none.
/// Finite inputs give a finite mean even when their sum overflows.
fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let values: Vec<f64> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    if mean.is_finite() {
        Some(mean)
    } else {
        Some(values.iter().map(|v| v / count).sum())
    }
}

// ---------------------------------------------------------------------------
// Area sampling
// ---------------------------------------------------------------------------

/// Mean coordinate of the records in the postcode area `prefix`, each axis
/// rounded to six places. `None` when the area has no records.
pub fn sample_area(records: &[PracticeRecord], prefix: &str, label: &str) -> Option<AreaSample> {
    let subset = records_with_prefix(records, prefix);
    let lat = mean(subset.iter().map(|r| r.coordinates.lat))?;
    let lng = mean(subset.iter().map(|r| r.coordinates.lng))?;
    Some(AreaSample {
        label: label.to_string(),
        coordinates: Coordinates {
            lat: round_to(lat, 6),
            lng: round_to(lng, 6),
        },
    })
}

/// Sample every configured area, in order, omitting areas with no records.
pub fn sample_areas(records: &[PracticeRecord], areas: &[AreaSpec]) -> SamplePostcodes {
    let mut samples = SamplePostcodes::new();
    for area in areas {
        match sample_area(records, &area.prefix, &area.label) {
            Some(sample) => {
                samples.insert(area.postcode.clone(), sample);
            }
            None => log::debug!("No practices in area {}; omitting {}", area.prefix, area.postcode),
        }
    }
    samples
}

// ---------------------------------------------------------------------------
// Cohort summary
// ---------------------------------------------------------------------------

/// Rank the cohort by achievement percent and summarise it.
///
/// The ranked list and the top practice only consider records with an
/// achievement percent; the averages are taken over the whole cohort, each
/// over the records where that field is present.
pub fn build_cohort_summary(records: &[PracticeRecord], cohort: &CohortConfig) -> CohortSummary {
    let members = records_with_prefix(records, &cohort.prefix);

    let mut ranked: Vec<(&PracticeRecord, f64)> = members
        .iter()
        .filter_map(|r| r.achievement_percent.map(|pct| (*r, pct)))
        .collect();
    // stable: ties keep source order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let top: Vec<_> = ranked.iter().take(cohort.top_n).collect();
    let activity = top.iter().map(|(_, pct)| round_to(*pct, 1)).collect();
    let activity_labels = top.iter().map(|(r, _)| r.name.clone()).collect();

    let averages = Averages {
        register: mean(members.iter().filter_map(|r| r.register.map(|v| v as f64)))
            .map(|v| round_to(v, 0)),
        intervention_percent: mean(members.iter().filter_map(|r| r.intervention_percent))
            .map(|v| round_to(v, 1)),
        review_percent: mean(members.iter().filter_map(|r| r.review_percent))
            .map(|v| round_to(v, 1)),
    };

    let top_practice = ranked
        .first()
        .map(|(r, _)| TopPractice {
            name: r.name.clone(),
            achievement_percent: r.achievement_percent.map(|v| round_to(v, 1)),
            register: r.register,
            prevalence_percent: r.prevalence_percent.map(|v| round_to(v, 2)),
            address: Some(r.address.clone()),
        })
        .unwrap_or_default();

    log::debug!(
        "Cohort {}: {} practices, {} ranked",
        cohort.prefix,
        members.len(),
        ranked.len()
    );

    CohortSummary {
        alias: cohort.alias.clone(),
        home_postcode: cohort.home_postcode.clone(),
        summary_label: cohort.summary_label.clone(),
        activity,
        activity_labels,
        averages,
        top_practice,
    }
}

// ---------------------------------------------------------------------------
// Payload assembly
// ---------------------------------------------------------------------------

pub fn build_payload(
    records: Vec<PracticeRecord>,
    weather_lookup: WeatherLookup,
    config: &PipelineConfig,
) -> DashboardPayload {
    DashboardPayload {
        sample_postcodes: sample_areas(&records, &config.areas),
        patient_summary: build_cohort_summary(&records, &config.cohort),
        weather_today: config.weather_today.clone(),
        weather_lookup,
        gp_locations: records,
        demo_profile: config.demo_profile.clone(),
    }
}
