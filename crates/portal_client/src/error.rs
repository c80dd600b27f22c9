use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not authorized, please log in")]
    Unauthorized,

    #[error("login failed, check the username and password")]
    LoginFailed,

    #[error("{}", rate_limit_message(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    #[error("server error ({})", .error_id.as_deref().unwrap_or(.status.as_str()))]
    Status {
        status: StatusCode,
        error_id: Option<String>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

fn rate_limit_message(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(wait) => format!(
            "too many requests, try again in {} seconds",
            wait.as_secs().max(1)
        ),
        None => "too many requests, try again later".to_string(),
    }
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_mentions_wait() {
        let err = ApiError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert_eq!(err.to_string(), "too many requests, try again in 30 seconds");
    }

    #[test]
    fn status_message_prefers_error_id() {
        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error_id: Some("err-77".into()),
        };
        assert_eq!(err.to_string(), "server error (err-77)");

        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            error_id: None,
        };
        assert_eq!(err.to_string(), "server error (502)");
    }
}
