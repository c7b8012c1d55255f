//! Traditional market rows, joined to paths by distance at read time

use serde::{Deserialize, Serialize};

use super::Coordinates;
use super::health::{flexible_f64, flexible_u32};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraditionalMarket {
    #[serde(rename = "시장명", alias = "name")]
    pub name: String,
    #[serde(rename = "시장유형", alias = "kind", default)]
    pub kind: Option<String>,
    #[serde(rename = "소재지도로명주소", alias = "address", default)]
    pub address: Option<String>,
    #[serde(
        rename = "점포수",
        alias = "store_count",
        default,
        deserialize_with = "flexible_u32"
    )]
    pub store_count: Option<u32>,
    #[serde(rename = "위도", alias = "latitude", default, deserialize_with = "flexible_f64")]
    pub latitude: Option<f64>,
    #[serde(rename = "경도", alias = "longitude", default, deserialize_with = "flexible_f64")]
    pub longitude: Option<f64>,
}

impl TraditionalMarket {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

/// A market attached to a path card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NearbyMarket {
    pub name: String,
    pub address: Option<String>,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_columns_decode() {
        let json = r#"[
            {"시장명": "통인시장", "점포수": 75, "위도": 37.58, "경도": 126.97},
            {"시장명": "망원시장", "점포수": "120", "위도": "37.556", "경도": "126.906"}
        ]"#;
        let markets: Vec<TraditionalMarket> = serde_json::from_str(json).unwrap();
        assert_eq!(markets[1].store_count, Some(120));
        assert_eq!(markets[1].coordinates(), Some(Coordinates::new(37.556, 126.906)));
    }
}
