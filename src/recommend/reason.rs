//! Korean recommendation sentences

use crate::models::{FitnessLevel, UserProfile, WalkingGoal, WalkingPath};

/// Compose the "why this path" sentence for a card.
///
/// Region (when known), fitness tier and walking goal each contribute one
/// fragment, so the result always has two or three parts.
#[must_use]
pub fn compose(path: &WalkingPath, profile: &UserProfile) -> String {
    let mut fragments: Vec<String> = Vec::with_capacity(3);

    if let Some(region) = path
        .region
        .as_deref()
        .map(str::trim)
        .filter(|region| !region.is_empty())
    {
        fragments.push(format!("{region}에 위치한 이 코스는"));
    }

    fragments.push(fitness_fragment(profile.fitness_level).to_string());
    fragments.push(goal_fragment(profile.walking_goal).to_string());

    fragments.join(" ")
}

fn fitness_fragment(level: FitnessLevel) -> &'static str {
    match level {
        FitnessLevel::Beginner => "걷기를 막 시작한 분도 부담 없이 걸을 수 있고,",
        FitnessLevel::Intermediate => "적당한 운동 강도로 꾸준히 걷기 좋고,",
        FitnessLevel::Advanced => "충분한 운동량을 원하는 분께도 만족스럽고,",
    }
}

fn goal_fragment(goal: WalkingGoal) -> &'static str {
    match goal {
        WalkingGoal::Health => "심폐 기능과 건강 증진에 도움이 되는 코스입니다.",
        WalkingGoal::Weight => "꾸준히 걸으면 칼로리 소모와 체중 관리에 효과적인 코스입니다.",
        WalkingGoal::Stress => "자연 속에서 머리를 식히며 스트레스를 해소하기 좋은 코스입니다.",
        WalkingGoal::Leisure => "여유롭게 풍경을 즐기며 산책하기 좋은 코스입니다.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WalkingPathRecord;
    use crate::recommend::normalize::to_view_model_with_rating;

    fn path(region: Option<&str>) -> WalkingPath {
        let mut record: WalkingPathRecord =
            serde_json::from_str(r#"{"CoursCode": "R1"}"#).unwrap();
        record.region = region.map(str::to_string);
        to_view_model_with_rating(record, 4.2)
    }

    #[test]
    fn test_three_fragments_with_region() {
        let profile = UserProfile::new(30, FitnessLevel::Beginner, 3.0, "", WalkingGoal::Stress);
        let reason = compose(&path(Some("서울특별시 종로구")), &profile);
        assert!(reason.starts_with("서울특별시 종로구에 위치한 이 코스는"));
        assert!(reason.contains("부담 없이"));
        assert!(reason.ends_with("스트레스를 해소하기 좋은 코스입니다."));
    }

    #[test]
    fn test_two_fragments_without_region() {
        let profile = UserProfile::new(30, FitnessLevel::Advanced, 8.0, "", WalkingGoal::Weight);
        let reason = compose(&path(None), &profile);
        assert!(reason.starts_with("충분한 운동량"));
        assert!(reason.contains("체중 관리"));

        let blank = compose(&path(Some("  ")), &profile);
        assert_eq!(blank, reason);
    }

    #[test]
    fn test_is_deterministic_and_non_empty() {
        let profile = UserProfile::new(50, FitnessLevel::Intermediate, 4.0, "", WalkingGoal::Leisure);
        let target = path(Some("제주시"));
        let first = compose(&target, &profile);
        assert!(!first.is_empty());
        assert_eq!(first, compose(&target, &profile));
    }
}
