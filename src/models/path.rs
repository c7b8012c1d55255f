//! Walking path rows and the normalized view model

use serde::{Deserialize, Serialize};

use super::health::flexible_f64;
use super::{Coordinates, NearbyMarket};

/// Course length as stored upstream: sometimes a number, sometimes text
/// with or without a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathLength {
    Number(f64),
    Text(String),
}

/// Raw walking path row as served by the backend table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkingPathRecord {
    #[serde(rename = "CoursCode")]
    pub cours_code: String,
    /// Course group name (e.g. a trail network)
    #[serde(rename = "WlkCoursFlagNm", default)]
    pub group_name: Option<String>,
    #[serde(rename = "WlkCoursNm", default)]
    pub course_name: Option<String>,
    #[serde(rename = "CoursDc", default)]
    pub description: Option<String>,
    #[serde(rename = "SignguNm", default)]
    pub region: Option<String>,
    #[serde(rename = "CoursLevelNm", default)]
    pub level: Option<String>,
    #[serde(rename = "CoursLtCn", default)]
    pub length: Option<PathLength>,
    #[serde(rename = "CoursTimeCn", default)]
    pub time: Option<String>,
    #[serde(rename = "CoursRoute", default)]
    pub route: Option<String>,
    /// Free text listing facilities along the course
    #[serde(rename = "Option", default)]
    pub option: Option<String>,
    #[serde(rename = "Latitude", default, deserialize_with = "flexible_f64")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude", default, deserialize_with = "flexible_f64")]
    pub longitude: Option<f64>,
}

impl WalkingPathRecord {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    /// Display name: the course name, then the group name, then the code
    #[must_use]
    pub fn display_name(&self) -> String {
        [&self.course_name, &self.group_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .unwrap_or(self.cours_code.as_str())
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Normalized Korean label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "쉬움",
            Difficulty::Medium => "보통",
            Difficulty::Hard => "어려움",
        }
    }
}

/// Normalized path shown to the user. Rebuilt on every fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalkingPath {
    /// Primary key of the source row, unchanged
    pub id: String,
    pub name: String,
    pub description: String,
    pub region: Option<String>,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub difficulty: Difficulty,
    pub difficulty_label: String,
    /// Decorative rating, 4.0 to 5.0
    pub rating: f64,
    pub features: Vec<String>,
    pub amenities: Vec<String>,
    pub route: String,
    pub coordinates: Option<Coordinates>,
    pub recommendation: String,
    pub nearby_food: Vec<String>,
    #[serde(default)]
    pub nearby_markets: Vec<NearbyMarket>,
    /// Distance from the user in km, set by the proximity filter
    #[serde(default)]
    pub distance_from_user_km: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_mixed_length() {
        let json = r#"[
            {"CoursCode": "T_1", "WlkCoursNm": "북악산 코스", "CoursLtCn": "3.5km", "Latitude": 37.59, "Longitude": 126.97},
            {"CoursCode": "T_2", "CoursLtCn": 4.2, "Latitude": null, "Longitude": 127.0}
        ]"#;
        let records: Vec<WalkingPathRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].length, Some(PathLength::Text("3.5km".to_string())));
        assert_eq!(records[1].length, Some(PathLength::Number(4.2)));
        assert!(records[0].coordinates().is_some());
        assert!(records[1].coordinates().is_none());
    }

    #[test]
    fn test_record_accepts_text_coordinates() {
        let json = r#"[
            {"CoursCode": "T_1", "Latitude": 37.59, "Longitude": 126.97},
            {"CoursCode": "T_2", "Latitude": "37.51", "Longitude": " 127.02 "},
            {"CoursCode": "T_3", "Latitude": "", "Longitude": "미상"}
        ]"#;
        let records: Vec<WalkingPathRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[1].coordinates(), Some(Coordinates::new(37.51, 127.02)));
        assert!(records[2].coordinates().is_none());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut record: WalkingPathRecord =
            serde_json::from_str(r#"{"CoursCode": "T_9", "WlkCoursFlagNm": "서울둘레길"}"#).unwrap();
        assert_eq!(record.display_name(), "서울둘레길");

        record.course_name = Some("1코스".to_string());
        assert_eq!(record.display_name(), "1코스");

        record.course_name = None;
        record.group_name = Some("  ".to_string());
        assert_eq!(record.display_name(), "T_9");
    }
}
