//! Profile-based path exclusion

use crate::models::{FitnessLevel, UserProfile, WalkingPath};

const HARD_LABEL: &str = "어려움";
const KNEE: &str = "무릎";

/// Whether a path may be shown to this user.
///
/// Hard paths are excluded for knee conditions and for beginners. Every
/// other combination passes.
#[must_use]
pub fn is_eligible(path: &WalkingPath, profile: &UserProfile) -> bool {
    let is_hard = path.difficulty_label.contains(HARD_LABEL);

    if is_hard && profile.has_condition(KNEE) {
        return false;
    }
    if is_hard && profile.fitness_level == FitnessLevel::Beginner {
        return false;
    }
    true
}

/// Keep eligible paths, preserving order
pub fn filter_eligible(paths: Vec<WalkingPath>, profile: &UserProfile) -> Vec<WalkingPath> {
    paths
        .into_iter()
        .filter(|path| is_eligible(path, profile))
        .collect()
}
