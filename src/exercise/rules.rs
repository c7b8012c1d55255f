use serde::Serialize;

use super::IntensityTier;
use crate::models::HealthProfile;

const HEART_DISEASE: [&str; 4] = ["심장", "심근", "협심증", "부정맥"];
const HYPERTENSION: [&str; 1] = ["고혈압"];
const DIABETES: [&str; 1] = ["당뇨"];

const SYSTOLIC_LIMIT: f64 = 140.0;
const DIASTOLIC_LIMIT: f64 = 90.0;
const GLUCOSE_LIMIT: f64 = 126.0;
const CHOLESTEROL_LIMIT: f64 = 240.0;
const SENIOR_AGE: u32 = 65;

/// Conditions derived from one checkup row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSignals {
    pub heart_disease: bool,
    pub hypertension: bool,
    pub diabetes: bool,
    pub other_chronic: bool,
    pub smoker: bool,
    pub high_cholesterol: bool,
    pub senior: bool,
    pub no_regular_exercise: bool,
}

impl HealthSignals {
    #[must_use]
    pub fn detect(profile: &HealthProfile) -> Self {
        let exceeds = |value: Option<f64>, limit: f64| value.is_some_and(|v| v >= limit);

        Self {
            heart_disease: profile.diagnosis_mentions(&HEART_DISEASE),
            hypertension: profile.diagnosis_mentions(&HYPERTENSION)
                || exceeds(profile.systolic_bp, SYSTOLIC_LIMIT)
                || exceeds(profile.diastolic_bp, DIASTOLIC_LIMIT),
            diabetes: profile.diagnosis_mentions(&DIABETES)
                || exceeds(profile.fasting_glucose, GLUCOSE_LIMIT),
            other_chronic: profile.has_diagnosis(),
            smoker: profile.smoking.unwrap_or(false),
            high_cholesterol: exceeds(profile.cholesterol, CHOLESTEROL_LIMIT),
            senior: profile.age_or_default() >= SENIOR_AGE,
            no_regular_exercise: profile.lacks_regular_exercise(),
        }
    }
}

/// What a matching rule prescribes
#[derive(Debug)]
pub struct RulePlan {
    pub intensity: IntensityTier,
    /// Percent of max heart rate
    pub heart_rate_percent: (u32, u32),
    pub duration_minutes: (u32, u32),
    pub frequency: &'static str,
    pub precautions: &'static [&'static str],
    pub reasoning: &'static str,
    pub medical_basis: &'static [&'static str],
}

pub struct IntensityRule {
    pub name: &'static str,
    pub applies: fn(&HealthSignals) -> bool,
    pub plan: RulePlan,
}

const ACSM: &str = "ACSM's Guidelines for Exercise Testing and Prescription, 11th ed.";
const WHO: &str = "WHO Guidelines on Physical Activity and Sedentary Behaviour (2020)";
const KDA: &str = "대한당뇨병학회 당뇨병 진료지침 (2023)";
const KSH: &str = "대한고혈압학회 고혈압 진료지침 (2022)";
const AHA: &str = "AHA Scientific Statement: Exercise Standards for Testing and Training (2013)";

/// Evaluated top to bottom; the first rule that applies wins.
pub static RULES: [IntensityRule; 7] = [
    IntensityRule {
        name: "cardiac",
        applies: |s| s.heart_disease || (s.hypertension && s.diabetes),
        plan: RulePlan {
            intensity: IntensityTier::Low,
            heart_rate_percent: (40, 60),
            duration_minutes: (15, 30),
            frequency: "주 3-5회",
            precautions: &[
                "운동 전 반드시 주치의와 상담하세요.",
                "가슴 통증, 어지러움, 호흡곤란이 있으면 즉시 중단하세요.",
                "준비운동과 정리운동을 각각 10분 이상 하세요.",
            ],
            reasoning: "심혈관 질환 위험이 있어 낮은 강도의 걷기로 시작하는 것이 안전합니다.",
            medical_basis: &[AHA, ACSM],
        },
    },
    IntensityRule {
        name: "diabetes",
        applies: |s| s.diabetes,
        plan: RulePlan {
            intensity: IntensityTier::Moderate,
            heart_rate_percent: (50, 70),
            duration_minutes: (30, 45),
            frequency: "주 5회 이상 (연속 2일 이상 쉬지 않기)",
            precautions: &[
                "운동 전후 혈당을 확인하세요.",
                "저혈당에 대비해 간식을 챙기세요.",
                "발에 상처가 생기지 않도록 편한 신발을 신으세요.",
            ],
            reasoning: "규칙적인 중강도 걷기는 혈당 조절과 인슐린 감수성 개선에 도움이 됩니다.",
            medical_basis: &[KDA, ACSM],
        },
    },
    IntensityRule {
        name: "hypertension",
        applies: |s| s.hypertension,
        plan: RulePlan {
            intensity: IntensityTier::Moderate,
            heart_rate_percent: (50, 70),
            duration_minutes: (30, 60),
            frequency: "주 5-7회",
            precautions: &[
                "숨을 참거나 힘을 주는 동작은 피하세요.",
                "혈압이 180/110mmHg 이상이면 운동을 미루세요.",
            ],
            reasoning: "중강도 유산소 운동은 수축기 혈압을 꾸준히 낮추는 효과가 있습니다.",
            medical_basis: &[KSH, ACSM],
        },
    },
    IntensityRule {
        name: "inactive-senior",
        applies: |s| s.senior && s.no_regular_exercise,
        plan: RulePlan {
            intensity: IntensityTier::Low,
            heart_rate_percent: (40, 60),
            duration_minutes: (10, 30),
            frequency: "주 3-5회",
            precautions: &[
                "평탄한 길을 선택해 낙상을 예방하세요.",
                "처음에는 10분부터 시작해 천천히 늘리세요.",
            ],
            reasoning: "운동 습관이 없는 고령자는 낮은 강도로 시작해 점진적으로 늘리는 것이 좋습니다.",
            medical_basis: &[WHO, ACSM],
        },
    },
    IntensityRule {
        name: "risk-factors",
        applies: |s| s.smoker || s.high_cholesterol || s.other_chronic,
        plan: RulePlan {
            intensity: IntensityTier::Moderate,
            heart_rate_percent: (50, 70),
            duration_minutes: (30, 45),
            frequency: "주 5회",
            precautions: &[
                "운동 중 숨이 많이 차면 속도를 줄이세요.",
                "기존 질환이 있다면 담당 의사와 운동 계획을 확인하세요.",
            ],
            reasoning: "심혈관 위험 요인이 있어 중강도 범위 안에서 꾸준히 걷는 것을 권장합니다.",
            medical_basis: &[ACSM, WHO],
        },
    },
    IntensityRule {
        name: "inactive",
        applies: |s| s.no_regular_exercise,
        plan: RulePlan {
            intensity: IntensityTier::Low,
            heart_rate_percent: (40, 60),
            duration_minutes: (20, 30),
            frequency: "주 3-5회",
            precautions: &["2-3주에 걸쳐 운동 시간을 천천히 늘리세요."],
            reasoning: "현재 규칙적인 운동을 하지 않으므로 낮은 강도부터 시작하는 것이 좋습니다.",
            medical_basis: &[WHO],
        },
    },
    IntensityRule {
        name: "default",
        applies: |_| true,
        plan: RulePlan {
            intensity: IntensityTier::Moderate,
            heart_rate_percent: (60, 80),
            duration_minutes: (30, 60),
            frequency: "주 5회 이상",
            precautions: &["충분한 수분을 섭취하세요."],
            reasoning: "건강 상태가 양호하여 중강도 이상의 걷기가 적합합니다.",
            medical_basis: &[WHO, ACSM],
        },
    },
];

/// First rule that applies to the signals
#[must_use]
pub fn first_match(signals: &HealthSignals) -> &'static IntensityRule {
    RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .unwrap_or(&RULES[RULES.len() - 1])
}
