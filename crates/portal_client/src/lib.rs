pub mod admin;
pub mod config;
pub mod error;
pub mod public;
pub mod store;

pub use error::ApiError;
pub use reqwest::StatusCode;

use async_trait::async_trait;
use portal_model::{
    DashboardAnalytics, Engagement, IndexJobSummary, IndexStatus, Insights, Timeframe,
    UserProfile,
};
use reqwest::header::RETRY_AFTER;
use reqwest::{redirect, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Something that can hand out the current index-job snapshot.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn index_status(&self) -> Result<IndexStatus, ApiError>;
}

/// The authenticated reads the admin dashboard is assembled from.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn insights(&self) -> Result<Insights, ApiError>;
    async fn analytics(&self) -> Result<DashboardAnalytics, ApiError>;
    async fn engagements(&self, timeframe: Timeframe, limit: u32)
        -> Result<Vec<Engagement>, ApiError>;
    async fn profiles(&self, timeframe: Timeframe, limit: u32)
        -> Result<Vec<UserProfile>, ApiError>;
    async fn index_jobs(&self, limit: u32) -> Result<Vec<IndexJobSummary>, ApiError>;
}

/// HTTP client for one portal deployment.
///
/// The admin session lives in the cookie store, so a single `PortalClient`
/// must be reused between `admin_login` and the calls that need it.
#[derive(Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, config::http_timeout())
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Validation(format!(
                "base url must start with http:// or https:// (got '{}')",
                base_url
            )));
        }
        let http = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http.delete(self.url(path))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        debug!(
            target: "client::http",
            "{} -> {}",
            response.url().path(),
            response.status()
        );
        check_status(response).await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        read_json(response).await
    }
}

/// Maps non-success responses onto [`ApiError`].
pub async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(ApiError::RateLimited { retry_after })
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status {
                status,
                error_id: error_id(&body),
            })
        }
    }
}

pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// `error_id`, else `error`, from a JSON error body.
fn error_id(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error_id", "error"]
        .iter()
        .filter_map(|key| value.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
