//! Exercise intensity advice from a health checkup row
//!
//! An ordered rule list picks the intensity tier and heart-rate band; a
//! separate function maps the tier to a walking speed band. Max heart rate
//! uses the Fox formula (220 - age).

mod rules;
mod speed;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::HealthProfile;

pub use rules::HealthSignals;
pub use speed::{SpeedRange, speed_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTier {
    Low,
    Moderate,
    High,
}

impl IntensityTier {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "저강도",
            Self::Moderate => "중강도",
            Self::High => "고강도",
        }
    }
}

/// Target heart rate band in beats per minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecommendation {
    pub intensity: IntensityTier,
    pub intensity_label: String,
    pub max_heart_rate: u32,
    pub heart_rate_range: HeartRateRange,
    /// (min, max) minutes per session
    pub duration_minutes: (u32, u32),
    pub frequency: String,
    pub speed: SpeedRange,
    pub precautions: Vec<String>,
    pub reasoning: String,
    pub medical_basis: Vec<String>,
}

/// Fox estimate, 220 - age
#[must_use]
pub fn max_heart_rate(age: u32) -> u32 {
    220_u32.saturating_sub(age)
}

/// `percent` of `max_hr`, rounded half up
fn percent_of(max_hr: u32, percent: u32) -> u32 {
    (max_hr * percent + 50) / 100
}

/// Advice for one checkup row. Missing fields count as a healthy 40 year old.
#[must_use]
pub fn recommend(profile: &HealthProfile) -> ExerciseRecommendation {
    let signals = HealthSignals::detect(profile);
    let rule = rules::first_match(&signals);
    let plan = &rule.plan;
    debug!("Exercise rule '{}' matched for {:?}", rule.name, signals);

    let max_hr = max_heart_rate(profile.age_or_default());
    let (low_pct, high_pct) = plan.heart_rate_percent;

    ExerciseRecommendation {
        intensity: plan.intensity,
        intensity_label: plan.intensity.label().to_string(),
        max_heart_rate: max_hr,
        heart_rate_range: HeartRateRange {
            min: percent_of(max_hr, low_pct),
            max: percent_of(max_hr, high_pct),
        },
        duration_minutes: plan.duration_minutes,
        frequency: plan.frequency.to_string(),
        speed: speed_range(plan.intensity, profile),
        precautions: plan.precautions.iter().map(ToString::to_string).collect(),
        reasoning: plan.reasoning.to_string(),
        medical_basis: plan.medical_basis.iter().map(ToString::to_string).collect(),
    }
}
