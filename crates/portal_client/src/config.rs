use once_cell::sync::Lazy;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

static HTTP_TIMEOUT: Lazy<Duration> = Lazy::new(|| {
    env_duration(
        "PORTAL_HTTP_TIMEOUT_SECS",
        Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        Duration::from_secs,
    )
});

static POLL_INTERVAL: Lazy<Duration> = Lazy::new(|| {
    env_duration(
        "PORTAL_POLL_INTERVAL_MS",
        Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        Duration::from_millis,
    )
});

static POLL_TIMEOUT: Lazy<Duration> = Lazy::new(|| {
    env_duration(
        "PORTAL_POLL_TIMEOUT_SECS",
        Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        Duration::from_secs,
    )
});

pub fn http_timeout() -> Duration {
    *HTTP_TIMEOUT
}

pub fn poll_interval() -> Duration {
    *POLL_INTERVAL
}

pub fn poll_timeout() -> Duration {
    *POLL_TIMEOUT
}

fn env_duration(var: &str, default: Duration, unit: fn(u64) -> Duration) -> Duration {
    std::env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|value| *value > 0)
        .map(unit)
        .unwrap_or(default)
}
