//! Raw path rows -> normalized view model
//!
//! Upstream rows are hand-entered: lengths mix units, times are prose and
//! difficulty is whatever the author typed. Everything here is best-effort;
//! a field that cannot be read gets a sensible derived value instead of an
//! error.

use rand::RngExt;

use super::food;
use crate::models::{Difficulty, PathLength, WalkingPath, WalkingPathRecord};

/// Pace used when a row has no readable walking time
pub const ESTIMATED_WALKING_SPEED_KMH: f64 = 4.0;

/// Bare numbers above this are taken to be meters
const METERS_THRESHOLD: f64 = 100.0;

/// Build the view model with a fresh decorative rating
#[must_use]
pub fn to_view_model(record: WalkingPathRecord) -> WalkingPath {
    to_view_model_with_rating(record, random_rating())
}

/// Build the view model with a caller-chosen rating
#[must_use]
pub fn to_view_model_with_rating(record: WalkingPathRecord, rating: f64) -> WalkingPath {
    let distance_km = record
        .length
        .as_ref()
        .and_then(parse_length_km)
        .unwrap_or(0.0);
    let duration_minutes = record
        .time
        .as_deref()
        .and_then(parse_duration_minutes)
        .unwrap_or_else(|| estimate_minutes(distance_km));
    let difficulty = record
        .level
        .as_deref()
        .map_or(Difficulty::Easy, parse_difficulty);

    let description = record.description.clone().unwrap_or_default();
    let route = record.route.clone().unwrap_or_default();
    let features = feature_tags(distance_km, &route, &description);
    let amenities = record.option.as_deref().map(amenity_tags).unwrap_or_default();
    let nearby_food = food::nearby_food(record.region.as_deref());

    WalkingPath {
        name: record.display_name(),
        coordinates: record.coordinates(),
        id: record.cours_code,
        description,
        region: record.region,
        distance_km,
        duration_minutes,
        difficulty,
        difficulty_label: difficulty.label().to_string(),
        rating,
        features,
        amenities,
        route,
        recommendation: String::new(),
        nearby_food,
        nearby_markets: Vec::new(),
        distance_from_user_km: None,
    }
}

/// Rating between 4.0 and 5.0, one decimal
#[must_use]
pub fn random_rating() -> f64 {
    let raw: f64 = rand::rng().random_range(4.0..=5.0);
    (raw * 10.0).round() / 10.0
}

/// Course length in km from a number or free text
#[must_use]
pub fn parse_length_km(length: &PathLength) -> Option<f64> {
    match length {
        PathLength::Number(value) if value.is_finite() && *value >= 0.0 => {
            Some(if *value > METERS_THRESHOLD {
                value / 1000.0
            } else {
                *value
            })
        }
        PathLength::Number(_) => None,
        PathLength::Text(text) => {
            let cleaned = text.to_lowercase().replace(',', "");
            let (value, rest) = next_number(&cleaned)?;
            let unit = rest.trim_start();
            let km = if unit.starts_with("km") || unit.starts_with("킬로") {
                value
            } else if unit.starts_with('m') || unit.starts_with("미터") {
                value / 1000.0
            } else if value > METERS_THRESHOLD {
                value / 1000.0
            } else {
                value
            };
            Some(km)
        }
    }
}

/// Walking time in minutes from prose such as "1시간 30분", "90분",
/// "1:30" or a bare number of minutes
#[must_use]
pub fn parse_duration_minutes(text: &str) -> Option<u32> {
    let text = text.trim();

    if let Some((hours, minutes)) = text.split_once(':') {
        if let (Some((h, _)), Some((m, _))) = (next_number(hours), next_number(minutes)) {
            return Some((h * 60.0 + m).round() as u32);
        }
    }

    let mut total = 0.0;
    let mut found = false;
    let mut rest = text;
    while let Some((value, after)) = next_number(rest) {
        let unit = after.trim_start();
        if unit.starts_with("시간") {
            total += value * 60.0;
            found = true;
        } else if unit.starts_with('분') {
            total += value;
            found = true;
        } else if unit.is_empty() && !found {
            total += value;
            found = true;
        }
        rest = after;
    }

    found.then(|| total.round() as u32)
}

/// Difficulty from free text.
///
/// "상" only counts as a whole word, so "이상" or "중상" stay out of the
/// hard tier.
#[must_use]
pub fn parse_difficulty(text: &str) -> Difficulty {
    let text = text.trim().to_lowercase();
    let grade_word = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "상" || word == "상급");
    if grade_word
        || ["어려", "고급", "hard"]
            .iter()
            .any(|needle| text.contains(needle))
    {
        Difficulty::Hard
    } else if ["보통", "중", "medium", "normal"]
        .iter()
        .any(|needle| text.contains(needle))
    {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// Facilities mentioned in the free-text option field
#[must_use]
pub fn amenity_tags(option: &str) -> Vec<String> {
    let mut tags = Vec::new();
    if option.contains("화장실") {
        tags.push("화장실".to_string());
    }
    if option.contains("주차") {
        tags.push("주차장".to_string());
    }
    if option.contains("음수대") {
        tags.push("음수대".to_string());
    }
    if option.contains("쉼터") || option.contains("정자") {
        tags.push("쉼터".to_string());
    }
    tags
}

fn feature_tags(distance_km: f64, route: &str, description: &str) -> Vec<String> {
    let text = format!("{route} {description}");
    let mut tags = Vec::new();

    if distance_km > 0.0 && distance_km <= 3.0 {
        tags.push("짧은 코스".to_string());
    } else if distance_km >= 10.0 {
        tags.push("장거리 코스".to_string());
    }
    if text.contains("공원") {
        tags.push("공원".to_string());
    }
    if ["강", "하천", "천변", "호수"].iter().any(|w| text.contains(w)) {
        tags.push("수변".to_string());
    }
    if ["산", "숲"].iter().any(|w| text.contains(w)) {
        tags.push("숲길".to_string());
    }
    if ["역사", "문화", "유적"].iter().any(|w| text.contains(w)) {
        tags.push("역사문화".to_string());
    }
    tags
}

fn estimate_minutes(distance_km: f64) -> u32 {
    (distance_km / ESTIMATED_WALKING_SPEED_KMH * 60.0).round() as u32
}

/// First decimal number in `text` and the text following it
fn next_number(text: &str) -> Option<(f64, &str)> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tail = &text[start..];
    let end = tail
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(tail.len());
    let value = tail[..end].trim_end_matches('.').parse().ok()?;
    Some((value, &tail[end..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(json: &str) -> WalkingPathRecord {
        serde_json::from_str(json).unwrap()
    }

    #[rstest]
    #[case(PathLength::Number(3.5), Some(3.5))]
    #[case(PathLength::Number(4200.0), Some(4.2))]
    #[case(PathLength::Text("3.5km".into()), Some(3.5))]
    #[case(PathLength::Text("약 4 km".into()), Some(4.0))]
    #[case(PathLength::Text("3,500m".into()), Some(3.5))]
    #[case(PathLength::Text("800 미터".into()), Some(0.8))]
    #[case(PathLength::Text("12.3".into()), Some(12.3))]
    #[case(PathLength::Text("2500".into()), Some(2.5))]
    #[case(PathLength::Text("정보 없음".into()), None)]
    fn test_parse_length(#[case] input: PathLength, #[case] expected: Option<f64>) {
        let parsed = parse_length_km(&input);
        match (parsed, expected) {
            (Some(got), Some(want)) => assert!((got - want).abs() < 1e-9, "{input:?}: {got}"),
            (got, want) => assert_eq!(got, want),
        }
    }

    #[rstest]
    #[case("1시간 30분", Some(90))]
    #[case("90분", Some(90))]
    #[case("약 2시간 소요", Some(120))]
    #[case("1.5시간", Some(90))]
    #[case("1:30", Some(90))]
    #[case("45", Some(45))]
    #[case("하루 코스", None)]
    fn test_parse_duration(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_duration_minutes(input), expected);
    }

    #[rstest]
    #[case("어려움", Difficulty::Hard)]
    #[case("상", Difficulty::Hard)]
    #[case("보통", Difficulty::Medium)]
    #[case("중급", Difficulty::Medium)]
    #[case("쉬움", Difficulty::Easy)]
    #[case("", Difficulty::Easy)]
    #[case("상급", Difficulty::Hard)]
    #[case("난이도: 상", Difficulty::Hard)]
    #[case("초급 이상", Difficulty::Easy)]
    #[case("쉬움(초보자 이상)", Difficulty::Easy)]
    #[case("하~중상", Difficulty::Medium)]
    fn test_parse_difficulty(#[case] input: &str, #[case] expected: Difficulty) {
        assert_eq!(parse_difficulty(input), expected);
    }

    #[test]
    fn test_view_model_keeps_primary_key() {
        let raw = record(r#"{"CoursCode": "T_CRS_MNG0000005154", "WlkCoursNm": "성곽길"}"#);
        let path = to_view_model(raw.clone());
        assert_eq!(path.id, raw.cours_code);
    }

    #[test]
    fn test_view_model_fields() {
        let raw = record(
            r#"{
                "CoursCode": "C1",
                "WlkCoursNm": "한강 공원 산책로",
                "SignguNm": "서울특별시 마포구",
                "CoursLevelNm": "어려움",
                "CoursLtCn": "2.4km",
                "CoursRoute": "망원한강공원 - 하늘공원",
                "Option": "화장실, 주차 가능, 음수대",
                "Latitude": 37.55,
                "Longitude": 126.89
            }"#,
        );
        let path = to_view_model_with_rating(raw, 4.5);

        assert_eq!(path.name, "한강 공원 산책로");
        assert_eq!(path.difficulty, Difficulty::Hard);
        assert_eq!(path.difficulty_label, "어려움");
        assert!((path.distance_km - 2.4).abs() < 1e-9);
        assert_eq!(path.duration_minutes, 36);
        assert_eq!(path.amenities, vec!["화장실", "주차장", "음수대"]);
        assert!(path.features.contains(&"짧은 코스".to_string()));
        assert!(path.features.contains(&"공원".to_string()));
        assert_eq!(path.nearby_food[0], "망원시장 고로케");
        assert_eq!(path.rating, 4.5);
        assert!(path.coordinates.is_some());
        assert!(path.recommendation.is_empty());
    }

    #[test]
    fn test_random_rating_range() {
        for _ in 0..100 {
            let rating = random_rating();
            assert!((4.0..=5.0).contains(&rating));
            assert_eq!((rating * 10.0).round() / 10.0, rating);
        }
    }
}
