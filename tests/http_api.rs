//! HTTP API through the full router

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use common::{city_hall_paths, market_row};
use walkpath::api::AppState;
use walkpath::config::DefaultsConfig;
use walkpath::location_resolver::{Geocoder, LocationResolver};
use walkpath::models::{
    Coordinates, HealthProfile, TraditionalMarket, UserLocation, WalkingPathRecord,
};
use walkpath::speech::{Narrator, SpeechEngine};
use walkpath::{PathDataSource, RecommendationService, Result, web};

struct FixtureSource;

#[async_trait]
impl PathDataSource for FixtureSource {
    async fn fetch_paths(&self, _limit: Option<u32>) -> Result<Vec<WalkingPathRecord>> {
        Ok(city_hall_paths()
            .into_iter()
            .map(|row| serde_json::from_value(row).unwrap())
            .collect())
    }

    async fn fetch_markets(&self) -> Result<Vec<TraditionalMarket>> {
        Ok(vec![serde_json::from_value(market_row("남대문시장", 1.5)).unwrap()])
    }

    async fn fetch_health_profiles(&self, _limit: Option<u32>) -> Result<Vec<HealthProfile>> {
        Ok(vec![serde_json::from_value(json!({"나이": 52, "운동빈도": "주 3회"})).unwrap()])
    }
}

struct FixtureGeocoder;

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<UserLocation>> {
        Ok(address
            .contains("시청")
            .then(|| UserLocation::new(37.5665, 126.9780, "서울특별시청")))
    }

    async fn reverse(&self, _coordinates: Coordinates) -> Result<Option<String>> {
        Ok(None)
    }
}

struct SilentEngine;

#[async_trait]
impl SpeechEngine for SilentEngine {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

fn state(with_speech: bool) -> AppState {
    let defaults = DefaultsConfig::default();
    let source: Arc<dyn PathDataSource> = Arc::new(FixtureSource);
    AppState {
        service: Arc::new(RecommendationService::new(
            source.clone(),
            defaults.clone(),
            None,
        )),
        resolver: Arc::new(LocationResolver::new(
            Arc::new(FixtureGeocoder),
            defaults.fallback_location(),
        )),
        source,
        narrator: with_speech
            .then(|| Arc::new(Mutex::new(Narrator::new(Arc::new(SilentEngine))))),
    }
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = web::app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn ids(paths: &Value) -> Vec<String> {
    paths
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(state(false), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], walkpath::VERSION);
}

#[tokio::test]
async fn test_nearby_city_hall_scenario() {
    let (status, body) = send(
        state(false),
        get("/api/paths/nearby?lat=37.5665&lng=126.9780&radius_km=5&limit=3"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec!["A", "C"]);
    let first = body[0]["distanceFromUserKm"].as_f64().unwrap();
    let second = body[1]["distanceFromUserKm"].as_f64().unwrap();
    assert!((first - 1.2).abs() < 1e-3);
    assert!((second - 3.4).abs() < 1e-3);
}

#[tokio::test]
async fn test_nearby_rejects_bad_coordinates() {
    let (status, body) = send(state(false), get("/api/paths/nearby?lat=123&lng=126.9")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("입력값이 올바르지 않습니다"));
}

#[tokio::test]
async fn test_recommendations_for_beginner() {
    let request = json!({
        "profile": {
            "age": 34,
            "fitnessLevel": "beginner",
            "preferredDistance": [3],
            "healthConditions": "",
            "walkingGoal": "leisure"
        },
        "location": { "latitude": 37.5665, "longitude": 126.9780 }
    });
    let (status, body) = send(state(false), post("/api/recommendations", request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["paths"]), vec!["A"]);
    assert_eq!(body["profile"]["age"], 34);
    assert_eq!(body["paths"][0]["nearbyMarkets"][0]["name"], "남대문시장");
    assert!(body["notice"].is_null());
}

#[tokio::test]
async fn test_recommendations_by_address_and_fallback() {
    let by_address = json!({
        "profile": {
            "age": 40,
            "fitnessLevel": "advanced",
            "preferredDistance": [5],
            "walkingGoal": "health"
        },
        "address": "서울시청"
    });
    let (status, body) = send(state(false), post("/api/recommendations", by_address)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["paths"]), vec!["A", "C"]);

    let (status, body) = send(state(false), post("/api/recommendations", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"]["address"], "서울특별시청");
    assert!(body["notice"].as_str().is_some());
}

#[tokio::test]
async fn test_unknown_address_is_not_found() {
    let (status, body) = send(state(false), get("/api/geocode?address=%EC%97%86%EC%9D%8C")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("주소"));
}

#[tokio::test]
async fn test_invalid_profile_is_rejected() {
    let request = json!({
        "profile": {
            "age": 0,
            "fitnessLevel": "beginner",
            "preferredDistance": [3],
            "walkingGoal": "health"
        }
    });
    let (status, _) = send(state(false), post("/api/recommendations", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exercise_advice() {
    let (status, body) = send(
        state(false),
        post("/api/exercise", json!({"age": 70, "운동빈도": "0"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intensity"], "low");
    assert_eq!(body["heartRateRange"], json!({"min": 60, "max": 90}));
    assert_eq!(body["speed"]["maxKmh"], 4.0);
}

#[tokio::test]
async fn test_device_failure_falls_back() {
    let (status, body) = send(
        state(false),
        post("/api/location/device", json!({"errorCode": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isFallback"], true);
    assert_eq!(body["location"]["latitude"], 37.5665);
    assert!(body["notice"].as_str().unwrap().contains("권한"));
}

#[tokio::test]
async fn test_random_profiles() {
    let (status, body) = send(state(false), get("/api/profile/random")).await;
    assert_eq!(status, StatusCode::OK);
    let age = body["profile"]["age"].as_u64().unwrap();
    assert!((20..=75).contains(&age));
    assert!(body["health"].is_null());

    let (status, body) = send(state(false), get("/api/profile/random?from_health=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["age"], 52);
    assert_eq!(body["profile"]["fitnessLevel"], "intermediate");
}

#[tokio::test]
async fn test_speech_flow() {
    let state = state(true);

    let (status, body) = send(state.clone(), post("/api/speech", json!({"text": "안내"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["state"], "speaking");
    assert!(body["audio"].as_str().is_some());

    let (_, body) = send(state.clone(), post("/api/speech/pause", json!({}))).await;
    assert_eq!(body["notice"]["state"], "paused");

    let (status, _) = send(state, post("/api/speech/rewind", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_speech_without_key() {
    let (status, body) = send(state(false), post("/api/speech", json!({"text": "안내"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].is_string());
}
