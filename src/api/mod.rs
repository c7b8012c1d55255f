use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, warn};

use crate::WalkError;
use crate::backend::PathDataSource;
use crate::exercise::{self, ExerciseRecommendation};
use crate::location_resolver::{
    DevicePosition, LocationInput, LocationResolver, ResolvedLocation, validate_coordinates,
};
use crate::models::{Coordinates, HealthProfile, UserLocation, UserProfile, WalkingPath};
use crate::recommend::{RecommendationService, Recommendations, SearchOptions};
use crate::speech::{Narrator, Notice};

const MAX_RESULT_LIMIT: usize = 50;
const HEALTH_SAMPLE_SIZE: u32 = 100;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub resolver: Arc<LocationResolver>,
    pub source: Arc<dyn PathDataSource>,
    /// Absent when no speech key is configured
    pub narrator: Option<Arc<Mutex<Narrator>>>,
}

/// Error body `{ "error": ... }` with a status derived from the category
pub struct ApiError(WalkError);

impl From<WalkError> for ApiError {
    fn from(err: WalkError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WalkError::Validation { .. } => StatusCode::BAD_REQUEST,
            WalkError::Geocoding { .. } => StatusCode::NOT_FOUND,
            WalkError::DataFetch { .. } | WalkError::Speech { .. } => StatusCode::BAD_GATEWAY,
            WalkError::Config { .. } => StatusCode::SERVICE_UNAVAILABLE,
            WalkError::Cache { .. } | WalkError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/paths/nearby", get(nearby_paths))
        .route("/recommendations", post(recommendations))
        .route("/exercise", post(exercise_advice))
        .route("/geocode", get(geocode))
        .route("/location/device", post(device_location))
        .route("/profile/random", get(random_profile))
        .route("/speech", post(speak))
        .route("/speech/{action}", post(speech_control))
}

fn clamp_limit(limit: Option<usize>) -> Result<Option<usize>, WalkError> {
    match limit {
        Some(0) => Err(WalkError::validation("limit은 1 이상이어야 합니다.")),
        Some(limit) => Ok(Some(limit.min(MAX_RESULT_LIMIT))),
        None => Ok(None),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
}

async fn nearby_paths(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> ApiResult<Vec<WalkingPath>> {
    validate_coordinates(query.lat, query.lng)?;
    let location = UserLocation::from_coordinates(Coordinates::new(query.lat, query.lng));
    let options = SearchOptions {
        radius_km: query.radius_km,
        limit: clamp_limit(query.limit)?,
    };
    Ok(Json(state.service.nearby_paths(&location, options).await?))
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationBody {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    #[serde(default)]
    pub profile: Option<UserProfile>,
    #[serde(default)]
    pub location: Option<LocationBody>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "radius_km")]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub profile: UserProfile,
    #[serde(flatten)]
    pub recommendations: Recommendations,
    /// Set when the fallback location was used
    pub notice: Option<String>,
}

async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<RecommendationResponse> {
    let profile = request.profile.unwrap_or_else(UserProfile::random);
    profile.validate()?;

    let (location, notice) = match (request.location, request.address) {
        (Some(body), _) => (
            state
                .resolver
                .resolve(LocationInput::Coordinates(body.latitude, body.longitude))
                .await?,
            None,
        ),
        (None, Some(address)) => (
            state.resolver.resolve(LocationInput::Address(address)).await?,
            None,
        ),
        (None, None) => {
            let resolved = state.resolver.from_device(DevicePosition::failed(2)).await;
            (resolved.location, resolved.notice)
        }
    };

    let options = SearchOptions {
        radius_km: request.radius_km,
        limit: clamp_limit(request.limit)?,
    };
    let recommendations = state.service.recommend(&profile, &location, options).await?;

    Ok(Json(RecommendationResponse {
        profile,
        recommendations,
        notice,
    }))
}

async fn exercise_advice(Json(profile): Json<HealthProfile>) -> Json<ExerciseRecommendation> {
    Json(exercise::recommend(&profile))
}

#[derive(Debug, Deserialize)]
pub struct GeocodeQuery {
    pub address: String,
}

async fn geocode(
    State(state): State<AppState>,
    Query(query): Query<GeocodeQuery>,
) -> ApiResult<UserLocation> {
    Ok(Json(
        state
            .resolver
            .resolve(LocationInput::Address(query.address))
            .await?,
    ))
}

async fn device_location(
    State(state): State<AppState>,
    Json(position): Json<DevicePosition>,
) -> Json<ResolvedLocation> {
    Json(state.resolver.from_device(position).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct RandomProfileQuery {
    /// Derive the profile from a stored health checkup row
    #[serde(default)]
    pub from_health: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RandomProfileResponse {
    pub profile: UserProfile,
    pub health: Option<HealthProfile>,
}

async fn random_profile(
    State(state): State<AppState>,
    Query(query): Query<RandomProfileQuery>,
) -> ApiResult<RandomProfileResponse> {
    if !query.from_health {
        return Ok(Json(RandomProfileResponse {
            profile: UserProfile::random(),
            health: None,
        }));
    }

    let rows = state
        .source
        .fetch_health_profiles(Some(HEALTH_SAMPLE_SIZE))
        .await?;
    if rows.is_empty() {
        return Ok(Json(RandomProfileResponse {
            profile: UserProfile::random(),
            health: None,
        }));
    }

    let index = rand::rng().random_range(0..rows.len());
    let health = rows.into_iter().nth(index);
    Ok(Json(RandomProfileResponse {
        profile: health
            .as_ref()
            .map_or_else(UserProfile::random, UserProfile::from_health_profile),
        health,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SpeakRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub notice: Notice,
    /// Base64 audio of the active utterance
    pub audio: Option<String>,
}

fn narrator(state: &AppState) -> Result<&Arc<Mutex<Narrator>>, WalkError> {
    state
        .narrator
        .as_ref()
        .ok_or_else(|| WalkError::config("Speech is not configured"))
}

async fn speak(
    State(state): State<AppState>,
    Json(request): Json<SpeakRequest>,
) -> ApiResult<SpeechResponse> {
    let mut narrator = narrator(&state)?.lock().await;
    let notice = narrator.speak(&request.text).await;
    let audio = narrator.current_audio().map(|audio| STANDARD.encode(audio));
    Ok(Json(SpeechResponse { notice, audio }))
}

async fn speech_control(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> ApiResult<SpeechResponse> {
    let mut narrator = narrator(&state)?.lock().await;
    let notice = match action.as_str() {
        "pause" => narrator.pause(),
        "resume" => narrator.resume(),
        "stop" => narrator.stop(),
        "finish" => narrator.finish(),
        other => {
            return Err(WalkError::validation(format!("알 수 없는 음성 명령입니다: {other}")).into());
        }
    };
    Ok(Json(SpeechResponse {
        notice,
        audio: None,
    }))
}
