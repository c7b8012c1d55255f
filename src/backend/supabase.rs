use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use super::{PathDataSource, http_client};
use crate::config::BackendConfig;
use crate::models::{HealthProfile, TraditionalMarket, WalkingPathRecord};
use crate::{Result, WalkError};

/// Client for the PostgREST endpoint of a Supabase project
pub struct SupabaseClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    paths_table: String,
    markets_table: String,
    health_table: String,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = http_client(
            config.timeout_seconds,
            config.max_retries,
            concat!("walkpath/", env!("CARGO_PKG_VERSION")),
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            paths_table: config.paths_table.clone(),
            markets_table: config.markets_table.clone(),
            health_table: config.health_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `select=*` on a table with extra PostgREST filters
    #[instrument(skip(self, filters))]
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}?select=*{}", self.table_url(table), encode_filters(filters));
        debug!("Querying {}", url);

        let mut request = self.client.get(&url);

        if let Some(api_key) = &self.api_key {
            request = request
                .header("apikey", api_key)
                .header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", table, e);
            WalkError::data_fetch(format!("Request to table {table} failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Backend returned {} for {}: {}", status, table, error_text);

            return match status.as_u16() {
                401 | 403 => Err(WalkError::config(
                    "Invalid or missing backend API key".to_string(),
                )),
                429 => Err(WalkError::data_fetch(
                    "Backend rate limit exceeded".to_string(),
                )),
                _ => Err(WalkError::data_fetch(format!(
                    "Backend error {status} for table {table}: {error_text}"
                ))),
            };
        }

        let rows: Vec<T> = response.json().await.map_err(|e| {
            error!("Failed to decode rows from {}: {}", table, e);
            WalkError::data_fetch(format!("Failed to parse rows from {table}: {e}"))
        })?;

        info!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }
}

fn encode_filters(filters: &[(&str, String)]) -> String {
    filters
        .iter()
        .map(|(column, value)| {
            format!(
                "&{}={}",
                urlencoding::encode(column),
                urlencoding::encode(value)
            )
        })
        .collect()
}

fn limit_filter(filters: &mut Vec<(&str, String)>, limit: Option<u32>) {
    if let Some(limit) = limit.filter(|limit| *limit > 0) {
        filters.push(("limit", limit.to_string()));
    }
}

#[async_trait]
impl PathDataSource for SupabaseClient {
    async fn fetch_paths(&self, limit: Option<u32>) -> Result<Vec<WalkingPathRecord>> {
        let mut filters = vec![
            ("Latitude", "not.is.null".to_string()),
            ("Longitude", "not.is.null".to_string()),
        ];
        limit_filter(&mut filters, limit);
        self.select(&self.paths_table, &filters).await
    }

    async fn fetch_markets(&self) -> Result<Vec<TraditionalMarket>> {
        let filters = vec![
            ("위도", "not.is.null".to_string()),
            ("경도", "not.is.null".to_string()),
        ];
        self.select(&self.markets_table, &filters).await
    }

    async fn fetch_health_profiles(&self, limit: Option<u32>) -> Result<Vec<HealthProfile>> {
        let mut filters = Vec::new();
        limit_filter(&mut filters, limit);
        self.select(&self.health_table, &filters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = BackendConfig {
            base_url: "https://example.supabase.co/".to_string(),
            ..BackendConfig::default()
        };
        let client = SupabaseClient::new(&config).unwrap();
        assert_eq!(
            client.table_url("walking_paths"),
            "https://example.supabase.co/rest/v1/walking_paths"
        );
    }

    #[test]
    fn test_encode_filters() {
        let filters = vec![
            ("위도", "not.is.null".to_string()),
            ("limit", "3".to_string()),
        ];
        assert_eq!(
            encode_filters(&filters),
            "&%EC%9C%84%EB%8F%84=not.is.null&limit=3"
        );
    }

    #[test]
    fn test_limit_filter() {
        let mut filters = Vec::new();
        limit_filter(&mut filters, Some(0));
        assert!(filters.is_empty());
        limit_filter(&mut filters, None);
        assert!(filters.is_empty());
        limit_filter(&mut filters, Some(20));
        assert_eq!(filters, vec![("limit", "20".to_string())]);
    }
}
