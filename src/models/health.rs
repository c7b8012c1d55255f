//! Health checkup rows from the health-profile table

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Age used when a row carries none
pub const DEFAULT_AGE: u32 = 40;

const NO_DIAGNOSIS: [&str; 4] = ["없음", "정상", "-", "해당없음"];

/// One health checkup row.
///
/// Column names follow the backend table; English aliases are accepted so
/// API clients can post either form. Columns are often text in the source
/// data, so numeric fields accept numbers or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HealthProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "나이", alias = "age", default, deserialize_with = "flexible_u32")]
    pub age: Option<u32>,
    #[serde(rename = "성별", alias = "sex", default)]
    pub sex: Option<String>,
    #[serde(rename = "키", alias = "height", default, deserialize_with = "flexible_f64")]
    pub height_cm: Option<f64>,
    #[serde(rename = "체중", alias = "weight", default, deserialize_with = "flexible_f64")]
    pub weight_kg: Option<f64>,
    #[serde(
        rename = "수축기혈압",
        alias = "systolic_bp",
        default,
        deserialize_with = "flexible_f64"
    )]
    pub systolic_bp: Option<f64>,
    #[serde(
        rename = "이완기혈압",
        alias = "diastolic_bp",
        default,
        deserialize_with = "flexible_f64"
    )]
    pub diastolic_bp: Option<f64>,
    #[serde(
        rename = "공복혈당",
        alias = "fasting_glucose",
        default,
        deserialize_with = "flexible_f64"
    )]
    pub fasting_glucose: Option<f64>,
    #[serde(
        rename = "총콜레스테롤",
        alias = "cholesterol",
        default,
        deserialize_with = "flexible_f64"
    )]
    pub cholesterol: Option<f64>,
    #[serde(rename = "흡연여부", alias = "smoking", default, deserialize_with = "flexible_bool")]
    pub smoking: Option<bool>,
    #[serde(
        rename = "운동빈도",
        alias = "exercise_frequency",
        default,
        deserialize_with = "flexible_string"
    )]
    pub exercise_frequency: Option<String>,
    #[serde(rename = "진단명", alias = "diagnosis", default)]
    pub diagnosis: Option<String>,
}

impl HealthProfile {
    #[must_use]
    pub fn age_or_default(&self) -> u32 {
        self.age.unwrap_or(DEFAULT_AGE)
    }

    #[must_use]
    pub fn diagnosis_text(&self) -> &str {
        self.diagnosis.as_deref().unwrap_or("").trim()
    }

    #[must_use]
    pub fn diagnosis_mentions(&self, needles: &[&str]) -> bool {
        let diagnosis = self.diagnosis_text();
        needles.iter().any(|needle| diagnosis.contains(needle))
    }

    /// Whether the row names any diagnosis at all
    #[must_use]
    pub fn has_diagnosis(&self) -> bool {
        let diagnosis = self.diagnosis_text();
        !diagnosis.is_empty()
            && !NO_DIAGNOSIS.contains(&diagnosis)
            && !diagnosis.contains("없음")
    }

    /// Weekly exercise sessions parsed from the free-text frequency.
    ///
    /// "주 3회" -> 3, "매일" -> 7, "없음" or missing -> 0.
    #[must_use]
    pub fn exercise_sessions_per_week(&self) -> u32 {
        let Some(text) = self.exercise_frequency.as_deref().map(str::trim) else {
            return 0;
        };
        if text.contains("매일") {
            return 7;
        }
        let digits: String = text
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().unwrap_or(0)
    }

    /// Whether the row states that the person does not exercise regularly.
    ///
    /// A missing or blank frequency is unknown, not inactive.
    #[must_use]
    pub fn lacks_regular_exercise(&self) -> bool {
        match self.exercise_frequency.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => self.exercise_sessions_per_week() == 0,
            _ => false,
        }
    }

    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        match (self.height_cm, self.weight_kg) {
            (Some(height), Some(weight)) if height > 0.0 => {
                let meters = height / 100.0;
                Some(weight / (meters * meters))
            }
            _ => None,
        }
    }
}

pub(crate) fn flexible_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }))
}

pub(crate) fn flexible_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(flexible_f64(deserializer)?
        .filter(|number| number.is_finite() && *number >= 0.0)
        .map(|number| number.round() as u32))
}

fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }))
}

fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_i64().map(|n| n != 0),
        Value::String(text) => match text.trim() {
            "Y" | "y" | "예" | "흡연" | "true" | "1" | "현재흡연" => Some(true),
            "N" | "n" | "아니오" | "비흡연" | "false" | "0" | "과거흡연" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}
