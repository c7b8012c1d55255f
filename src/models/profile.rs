//! User fitness profile

use rand::RngExt;
use serde::{Deserialize, Serialize};

use crate::WalkError;
use crate::models::HealthProfile;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "초급",
            FitnessLevel::Intermediate => "중급",
            FitnessLevel::Advanced => "고급",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalkingGoal {
    Health,
    Weight,
    Stress,
    Leisure,
}

impl WalkingGoal {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            WalkingGoal::Health => "건강 증진",
            WalkingGoal::Weight => "체중 관리",
            WalkingGoal::Stress => "스트레스 해소",
            WalkingGoal::Leisure => "여가 산책",
        }
    }
}

const FITNESS_LEVELS: [FitnessLevel; 3] = [
    FitnessLevel::Beginner,
    FitnessLevel::Intermediate,
    FitnessLevel::Advanced,
];

const WALKING_GOALS: [WalkingGoal; 4] = [
    WalkingGoal::Health,
    WalkingGoal::Weight,
    WalkingGoal::Stress,
    WalkingGoal::Leisure,
];

const SAMPLE_CONDITIONS: [&str; 6] = [
    "",
    "무릎 통증",
    "고혈압",
    "허리 디스크",
    "당뇨 전단계",
    "특이사항 없음",
];

/// Fitness profile driving eligibility and recommendation reasons.
///
/// Built once from a form submission or generated randomly; edits replace
/// the whole value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub fitness_level: FitnessLevel,
    /// Preferred walking distance in km, stored as a single-element list
    pub preferred_distance: Vec<f64>,
    /// Free-text health conditions, matched by substring
    #[serde(default)]
    pub health_conditions: String,
    pub walking_goal: WalkingGoal,
}

impl UserProfile {
    pub fn new(
        age: u32,
        fitness_level: FitnessLevel,
        preferred_distance_km: f64,
        health_conditions: impl Into<String>,
        walking_goal: WalkingGoal,
    ) -> Self {
        Self {
            age,
            fitness_level,
            preferred_distance: vec![preferred_distance_km],
            health_conditions: health_conditions.into(),
            walking_goal,
        }
    }

    /// Preferred distance in km, if one was given
    #[must_use]
    pub fn preferred_distance_km(&self) -> Option<f64> {
        self.preferred_distance.first().copied()
    }

    #[must_use]
    pub fn has_condition(&self, needle: &str) -> bool {
        self.health_conditions.contains(needle)
    }

    /// Check a submitted profile before it replaces the current one
    pub fn validate(&self) -> crate::Result<()> {
        if self.age == 0 || self.age > 120 {
            return Err(WalkError::validation(format!(
                "age must be between 1 and 120, got {}",
                self.age
            )));
        }
        if self.preferred_distance.len() > 1 {
            return Err(WalkError::validation(
                "preferredDistance must contain a single value",
            ));
        }
        if let Some(distance) = self.preferred_distance_km() {
            if !distance.is_finite() || distance <= 0.0 {
                return Err(WalkError::validation(format!(
                    "preferredDistance must be a positive number of km, got {distance}"
                )));
            }
        }
        Ok(())
    }

    /// Generate a random profile for first-time visitors
    #[must_use]
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let age = rng.random_range(20..=75);
        let fitness_level = FITNESS_LEVELS[rng.random_range(0..FITNESS_LEVELS.len())];
        let distance = f64::from(rng.random_range(1..=10));
        let conditions = SAMPLE_CONDITIONS[rng.random_range(0..SAMPLE_CONDITIONS.len())];
        let walking_goal = WALKING_GOALS[rng.random_range(0..WALKING_GOALS.len())];

        Self::new(age, fitness_level, distance, conditions, walking_goal)
    }

    /// Derive a profile from a health checkup row.
    ///
    /// Fitness follows weekly exercise sessions (0-1 beginner, 2-4
    /// intermediate, 5+ advanced) and the diagnosis becomes the condition
    /// text.
    #[must_use]
    pub fn from_health_profile(health: &HealthProfile) -> Self {
        let sessions = health.exercise_sessions_per_week();
        let fitness_level = match sessions {
            0 | 1 => FitnessLevel::Beginner,
            2..=4 => FitnessLevel::Intermediate,
            _ => FitnessLevel::Advanced,
        };
        let walking_goal = if health.has_diagnosis() {
            WalkingGoal::Health
        } else if health.bmi().is_some_and(|bmi| bmi >= 25.0) {
            WalkingGoal::Weight
        } else {
            WalkingGoal::Leisure
        };
        let distance = match fitness_level {
            FitnessLevel::Beginner => 2.0,
            FitnessLevel::Intermediate => 4.0,
            FitnessLevel::Advanced => 7.0,
        };

        Self::new(
            health.age_or_default(),
            fitness_level,
            distance,
            health.diagnosis.clone().unwrap_or_default(),
            walking_goal,
        )
    }
}
