//! Recommendation pipeline
//!
//! Fetch -> normalize -> proximity -> eligibility -> reasons -> markets.
//! Every step after the fetch is a pure function over the fetched rows.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{eligibility, normalize, reason};
use crate::Result;
use crate::backend::PathDataSource;
use crate::config::DefaultsConfig;
use crate::geo::nearest_within;
use crate::models::{
    NearbyMarket, TraditionalMarket, UserLocation, UserProfile, WalkingPath, WalkingPathRecord,
};

/// Per-request knobs; unset values come from configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SearchOptions {
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

/// Result of one recommendation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendations {
    pub location: UserLocation,
    pub radius_km: f64,
    pub paths: Vec<WalkingPath>,
    /// Placeholder text when nothing matched
    pub message: Option<String>,
}

/// Turns backend rows into ranked, explained path cards
pub struct RecommendationService {
    source: Arc<dyn PathDataSource>,
    defaults: DefaultsConfig,
    fetch_limit: Option<u32>,
}

impl RecommendationService {
    pub fn new(
        source: Arc<dyn PathDataSource>,
        defaults: DefaultsConfig,
        fetch_limit: Option<u32>,
    ) -> Self {
        Self {
            source,
            defaults,
            fetch_limit: fetch_limit.filter(|limit| *limit > 0),
        }
    }

    fn resolve_options(&self, options: SearchOptions) -> (f64, usize) {
        let radius_km = options
            .radius_km
            .filter(|radius| radius.is_finite() && *radius > 0.0)
            .unwrap_or(self.defaults.search_radius_km);
        let limit = options
            .limit
            .unwrap_or(self.defaults.result_limit as usize);
        (radius_km, limit)
    }

    /// Closest paths around a location, without profile filtering
    pub async fn nearby_paths(
        &self,
        location: &UserLocation,
        options: SearchOptions,
    ) -> Result<Vec<WalkingPath>> {
        let (radius_km, limit) = self.resolve_options(options);
        let records = self.source.fetch_paths(self.fetch_limit).await?;
        debug!("Ranking {} path rows by distance", records.len());

        let paths = Self::rank(records, location, radius_km, limit);
        info!(
            "Found {} paths within {}km of {}",
            paths.len(),
            radius_km,
            location.address
        );
        Ok(paths)
    }

    /// Full recommendation for a profile at a location
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        location: &UserLocation,
        options: SearchOptions,
    ) -> Result<Recommendations> {
        let (radius_km, limit) = self.resolve_options(options);
        info!(
            "Recommending up to {} paths within {}km of {}",
            limit, radius_km, location.address
        );

        let (records, markets) = futures::join!(
            self.source.fetch_paths(self.fetch_limit),
            self.source.fetch_markets()
        );
        let records = records?;
        let markets = markets.unwrap_or_else(|e| {
            warn!("Market data unavailable, continuing without it: {}", e);
            Vec::new()
        });

        let nearby = Self::rank(records, location, radius_km, usize::MAX);
        let mut paths = eligibility::filter_eligible(nearby, profile);
        paths.truncate(limit);

        for path in &mut paths {
            path.recommendation = reason::compose(path, profile);
            path.nearby_markets = self.markets_near(path, &markets);
        }

        let message = paths.is_empty().then(|| {
            format!("반경 {radius_km}km 이내에 조건에 맞는 산책로가 없습니다.")
        });

        info!("Returning {} recommendations", paths.len());
        Ok(Recommendations {
            location: location.clone(),
            radius_km,
            paths,
            message,
        })
    }

    fn rank(
        records: Vec<WalkingPathRecord>,
        location: &UserLocation,
        radius_km: f64,
        limit: usize,
    ) -> Vec<WalkingPath> {
        nearest_within(records, location.coordinates(), radius_km, limit)
            .into_iter()
            .map(|(record, distance)| {
                let mut path = normalize::to_view_model(record);
                path.distance_from_user_km = Some(distance);
                path
            })
            .collect()
    }

    fn markets_near(&self, path: &WalkingPath, markets: &[TraditionalMarket]) -> Vec<NearbyMarket> {
        let Some(origin) = path.coordinates else {
            return Vec::new();
        };

        nearest_within(
            markets.iter(),
            origin,
            self.defaults.market_radius_km,
            self.defaults.max_markets as usize,
        )
        .into_iter()
        .map(|(market, distance_km)| NearbyMarket {
            name: market.name.clone(),
            address: market.address.clone(),
            distance_km,
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WalkError;
    use crate::models::{Coordinates, FitnessLevel, HealthProfile, WalkingGoal};
    use async_trait::async_trait;

    const CITY_HALL: Coordinates = Coordinates {
        latitude: 37.5665,
        longitude: 126.9780,
    };

    fn north_of(km: f64) -> Coordinates {
        Coordinates::new(CITY_HALL.latitude + (km / 6371.0).to_degrees(), CITY_HALL.longitude)
    }

    fn record(code: &str, level: &str, km_away: f64) -> WalkingPathRecord {
        let position = north_of(km_away);
        serde_json::from_value(serde_json::json!({
            "CoursCode": code,
            "WlkCoursNm": format!("{code} 코스"),
            "SignguNm": "서울특별시 종로구",
            "CoursLevelNm": level,
            "CoursLtCn": "3km",
            "Latitude": position.latitude,
            "Longitude": position.longitude,
        }))
        .unwrap()
    }

    fn market(name: &str, km_away: f64) -> TraditionalMarket {
        let position = north_of(km_away);
        TraditionalMarket {
            name: name.to_string(),
            kind: None,
            address: Some("서울".to_string()),
            store_count: None,
            latitude: Some(position.latitude),
            longitude: Some(position.longitude),
        }
    }

    struct StubSource {
        paths: Vec<WalkingPathRecord>,
        markets: Option<Vec<TraditionalMarket>>,
    }

    #[async_trait]
    impl PathDataSource for StubSource {
        async fn fetch_paths(&self, _limit: Option<u32>) -> Result<Vec<WalkingPathRecord>> {
            Ok(self.paths.clone())
        }

        async fn fetch_markets(&self) -> Result<Vec<TraditionalMarket>> {
            self.markets
                .clone()
                .ok_or_else(|| WalkError::data_fetch("markets offline"))
        }

        async fn fetch_health_profiles(&self, _limit: Option<u32>) -> Result<Vec<HealthProfile>> {
            Ok(Vec::new())
        }
    }

    fn service(paths: Vec<WalkingPathRecord>, markets: Option<Vec<TraditionalMarket>>) -> RecommendationService {
        RecommendationService::new(
            Arc::new(StubSource { paths, markets }),
            DefaultsConfig::default(),
            None,
        )
    }

    fn city_hall() -> UserLocation {
        UserLocation::from_coordinates(CITY_HALL)
    }

    #[tokio::test]
    async fn test_nearby_paths_scenario() {
        let service = service(
            vec![
                record("A", "쉬움", 1.2),
                record("B", "쉬움", 6.0),
                record("C", "쉬움", 3.4),
            ],
            Some(Vec::new()),
        );

        let paths = service
            .nearby_paths(&city_hall(), SearchOptions { radius_km: Some(5.0), limit: Some(3) })
            .await
            .unwrap();

        let ids: Vec<&str> = paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        let distance = paths[0].distance_from_user_km.unwrap();
        assert!((distance - 1.2).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_recommend_filters_then_limits() {
        let service = service(
            vec![
                record("hard-near", "어려움", 0.5),
                record("easy-1", "쉬움", 1.0),
                record("easy-2", "보통", 2.0),
                record("easy-3", "쉬움", 3.0),
            ],
            Some(vec![market("광장시장", 1.1), market("먼 시장", 4.5)]),
        );
        let profile = UserProfile::new(30, FitnessLevel::Beginner, 3.0, "", WalkingGoal::Health);

        let result = service
            .recommend(&profile, &city_hall(), SearchOptions { radius_km: None, limit: Some(2) })
            .await
            .unwrap();

        let ids: Vec<&str> = result.paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["easy-1", "easy-2"]);
        assert!(result.message.is_none());
        assert!(result.paths.iter().all(|p| !p.recommendation.is_empty()));

        let markets: Vec<&str> = result.paths[0]
            .nearby_markets
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(markets, vec!["광장시장"]);
    }

    #[tokio::test]
    async fn test_recommend_survives_market_outage() {
        let service = service(vec![record("A", "쉬움", 1.0)], None);
        let profile = UserProfile::new(30, FitnessLevel::Advanced, 3.0, "", WalkingGoal::Leisure);

        let result = service
            .recommend(&profile, &city_hall(), SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(result.paths.len(), 1);
        assert!(result.paths[0].nearby_markets.is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let service = service(vec![record("far", "쉬움", 40.0)], Some(Vec::new()));
        let profile = UserProfile::new(30, FitnessLevel::Advanced, 3.0, "", WalkingGoal::Leisure);

        let result = service
            .recommend(&profile, &city_hall(), SearchOptions::default())
            .await
            .unwrap();
        assert!(result.paths.is_empty());
        assert!(result.message.unwrap().contains("5km"));
    }
}
