pub mod admin;
pub mod directory;
pub mod insights;
pub mod locale;
pub mod scalar;
pub mod store;

pub use admin::{Ad, Category, Officer, OfficerContact};
pub use directory::{Ministry, Question, ServiceRecord, Subservice, SuperCategory, Suggestion};
pub use insights::{
    AiSearchReply, AiSearchRequest, DashboardAnalytics, Engagement, EngagementEvent, Insights,
    PremiumSuggestion, ProfileSubmission, StatCards, Timeframe, UserProfile,
};
pub use locale::{Language, LocalizedText};
pub use store::{
    CartItem, CheckoutSessionRequest, LineItem, OrderRequest, PaymentRequest, Product,
    ProductQuery, SortOrder, StatusReply, StoreCategories, UserLogin,
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

pub type JobId = String;

/// Status reported for a background index job.
///
/// The server's set of states is open ended: anything that is not one of the
/// four known values is kept in `Other`. A missing or null status is
/// `Other("")`, which counts as terminal like any other unknown value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Error,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Other(value) => value.as_str(),
        }
    }

    /// Whether no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            _ => JobStatus::Other(value),
        }
    }
}

impl From<Value> for JobStatus {
    fn from(value: Value) -> Self {
        match value {
            Value::String(status) => JobStatus::from(status),
            Value::Null => JobStatus::default(),
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Other(String::new())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `index_status` snapshot table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexJob {
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(
        default,
        deserialize_with = "scalar::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /api/admin/index_status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexStatus {
    pub faiss_available: bool,
    pub meta_exists: bool,
    pub index_exists: bool,
    pub documents: u64,
    /// Entries that are not JSON objects are dropped; a null table is empty.
    #[serde(deserialize_with = "job_table")]
    pub jobs: HashMap<JobId, IndexJob>,
}

fn job_table<'de, D>(deserializer: D) -> Result<HashMap<JobId, IndexJob>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(id, job)| Some((id, serde_json::from_value(job).ok()?)))
        .collect())
}

fn job_rows<'de, D>(deserializer: D) -> Result<Vec<IndexJobSummary>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

impl IndexStatus {
    pub fn job(&self, job_id: &str) -> Option<&IndexJob> {
        self.jobs.get(job_id)
    }
}

/// Reply of `POST /api/admin/build_index_async`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStarted {
    pub job_id: JobId,
    #[serde(default)]
    pub status: Value,
}

/// Row of `GET /api/admin/index_jobs`.
///
/// Older server builds report the identifier as `jobId` or only as the
/// document `_id`; all three collapse into `job_id` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIndexJobSummary")]
pub struct IndexJobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub result: Option<Value>,
}

#[derive(Deserialize)]
struct RawIndexJobSummary {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default, rename = "jobId")]
    job_id_camel: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    status: JobStatus,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    finished_at: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

impl From<RawIndexJobSummary> for IndexJobSummary {
    fn from(raw: RawIndexJobSummary) -> Self {
        let job_id = [raw.job_id, raw.job_id_camel, raw.object_id]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .unwrap_or_default();
        Self {
            job_id,
            status: raw.status,
            created_at: raw.created_at,
            started_at: raw.started_at,
            finished_at: raw.finished_at,
            result: raw.result,
        }
    }
}

impl IndexJobSummary {
    /// Short text for the result column: `docs:<n>` when a document count is
    /// present, otherwise the compact JSON of the result.
    pub fn result_summary(&self) -> String {
        match &self.result {
            None | Some(Value::Null) => String::new(),
            Some(result) => match result.get("count") {
                Some(count) if !is_falsy(count) => format!("docs:{}", scalar::text(count)),
                _ => result.to_string(),
            },
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexJobList {
    /// Rows that cannot be read are skipped.
    #[serde(default, deserialize_with = "job_rows")]
    pub jobs: Vec<IndexJobSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLogLine {
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub ts: String,
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub msg: String,
}

/// Body of `GET /api/admin/index_job/:id`, unwrapped from `{job: ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexJobDetail {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub created_at: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub result: Option<Value>,
    pub logs: Vec<JobLogLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexJobEnvelope {
    #[serde(default)]
    pub job: IndexJobDetail,
}

/// Parses the timestamps the server emits: RFC 3339, or naive ISO-8601 taken
/// as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
