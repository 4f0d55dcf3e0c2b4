use crate::error::{WeatherError, redact_url};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Bare GET used by every provider adapter. Implementations must be safe to
/// share between adapters.
#[async_trait]
pub trait HttpGet: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, WeatherError>;
}

/// reqwest-backed transport that keeps successful responses for `ttl`,
/// keyed by the full request URL.
pub struct CachedHttpClient {
    client: reqwest::Client,
    cache: RwLock<HashMap<String, CachedResponse>>,
    ttl: Duration,
}

struct CachedResponse {
    response: HttpResponse,
    fetched_at: Instant,
}

impl CachedHttpClient {
    pub fn new(timeout: Duration, ttl: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .user_agent(concat!("weather_exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, ttl))
    }

    pub fn with_client(client: reqwest::Client, ttl: Duration) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn cached(&self, url: &str) -> Option<HttpResponse> {
        let cache = self.cache.read().await;
        cache
            .get(url)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.response.clone())
    }

    async fn store(&self, url: &str, response: &HttpResponse) {
        let mut cache = self.cache.write().await;
        let ttl = self.ttl;
        cache.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        cache.insert(
            url.to_string(),
            CachedResponse {
                response: response.clone(),
                fetched_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl HttpGet for CachedHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, WeatherError> {
        if !self.ttl.is_zero() {
            if let Some(response) = self.cached(url).await {
                tracing::debug!(url = %redact_url(url), "cache hit");
                return Ok(response);
            }
        }

        tracing::debug!(url = %redact_url(url), "cache miss, fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::network(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::network(url, e))?;
        let response = HttpResponse { status, body };

        if response.is_success() && !self.ttl.is_zero() {
            self.store(url, &response).await;
        }

        Ok(response)
    }
}
