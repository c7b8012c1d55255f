//! Hosted data backend
//!
//! The walking-path, traditional-market and health-profile tables live in
//! a PostgREST style service. Nothing is joined server side; callers relate
//! rows by distance after fetching.

pub mod supabase;

use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::models::{HealthProfile, TraditionalMarket, WalkingPathRecord};
use crate::{Result, WalkError};

pub use supabase::SupabaseClient;

/// Read access to the three backend tables
#[async_trait]
pub trait PathDataSource: Send + Sync {
    /// Path rows with both coordinates present, optionally capped
    async fn fetch_paths(&self, limit: Option<u32>) -> Result<Vec<WalkingPathRecord>>;

    /// Market rows with both coordinates present
    async fn fetch_markets(&self) -> Result<Vec<TraditionalMarket>>;

    /// Health checkup rows, optionally capped
    async fn fetch_health_profiles(&self, limit: Option<u32>) -> Result<Vec<HealthProfile>>;
}

/// HTTP client with timeout and transient-error retry shared by every
/// outbound integration
pub fn http_client(
    timeout_seconds: u32,
    max_retries: u32,
    user_agent: &str,
) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(user_agent)
        .build()
        .map_err(|e| WalkError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
