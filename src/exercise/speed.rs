use serde::{Deserialize, Serialize};

use super::IntensityTier;
use crate::models::HealthProfile;

const SENIOR_AGE: u32 = 65;
const JOINT_TERMS: [&str; 2] = ["무릎", "관절"];

/// Walking or jogging speed band in km/h
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedRange {
    pub min_kmh: f64,
    pub max_kmh: f64,
}

impl SpeedRange {
    const fn new(min_kmh: f64, max_kmh: f64) -> Self {
        Self { min_kmh, max_kmh }
    }
}

/// Speed band for a tier, narrowed for seniors and then for joint problems
#[must_use]
pub fn speed_range(tier: IntensityTier, profile: &HealthProfile) -> SpeedRange {
    let mut range = match tier {
        IntensityTier::Low => SpeedRange::new(3.0, 4.5),
        IntensityTier::Moderate => SpeedRange::new(4.5, 6.0),
        IntensityTier::High => SpeedRange::new(6.0, 8.0),
    };

    if profile.age_or_default() >= SENIOR_AGE {
        range = SpeedRange::new(3.0, 4.0);
    }
    if profile.diagnosis_mentions(&JOINT_TERMS) {
        range = SpeedRange::new(2.5, 3.5);
    }
    range
}
