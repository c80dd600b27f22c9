//! Assembles the admin dashboard from its sections.
//!
//! Sections load strictly in order (insights, analytics, charts, premium
//! list, engagements, profiles, jobs). Each one contains its own failure; a
//! 401 from any authenticated read is the only thing that aborts the load,
//! turning the whole view back into the login prompt.

use crate::charts::ChartRegistry;
use portal_client::{AdminApi, ApiError};
use portal_model::{
    Engagement, IndexJobSummary, Insights, PremiumSuggestion, StatCards, Timeframe, UserProfile,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_LIST_LIMIT: u32 = 500;
pub const DEFAULT_JOBS_LIMIT: u32 = 20;

pub const NO_PREMIUM: &str = "No premium suggestions at this time.";
pub const NO_ENGAGEMENTS: &str = "No recent engagements found.";
pub const NO_PROFILES: &str = "No profiles found.";
pub const NO_JOBS: &str = "No recent jobs";

/// One region of the dashboard: data, an explicit empty placeholder, or the
/// message shown in place of the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Section<T> {
    Loaded(T),
    Empty(String),
    Failed(String),
}

impl<T> Section<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Section::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Section::Loaded(_) => None,
            Section::Empty(text) | Section::Failed(text) => Some(text),
        }
    }
}

fn list_section<I>(items: Vec<I>, placeholder: &str) -> Section<Vec<I>> {
    if items.is_empty() {
        Section::Empty(placeholder.to_string())
    } else {
        Section::Loaded(items)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub banner: Option<String>,
    pub insights: Insights,
    pub stat_cards: Option<StatCards>,
    pub premium: Section<Vec<PremiumSuggestion>>,
    pub engagements: Section<Vec<Engagement>>,
    pub profiles: Section<Vec<UserProfile>>,
    pub jobs: Section<Vec<IndexJobSummary>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    LoginRequired,
    Ready(Box<Dashboard>),
}

impl DashboardView {
    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            DashboardView::Ready(dashboard) => Some(dashboard),
            DashboardView::LoginRequired => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub engagement_timeframe: Timeframe,
    pub profile_timeframe: Timeframe,
    pub limit: u32,
    pub jobs_limit: u32,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            engagement_timeframe: Timeframe::All,
            profile_timeframe: Timeframe::All,
            limit: DEFAULT_LIST_LIMIT,
            jobs_limit: DEFAULT_JOBS_LIMIT,
        }
    }
}

pub struct DashboardLoader {
    api: Arc<dyn AdminApi>,
    options: DashboardOptions,
}

/// Marker for the one failure that escapes a section.
struct LoginRequired;

type Step<T> = Result<T, LoginRequired>;

impl DashboardLoader {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self {
            api,
            options: DashboardOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DashboardOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn load(&self, charts: &mut ChartRegistry) -> DashboardView {
        charts.clear();
        match self.load_sections(charts).await {
            Ok(dashboard) => {
                info!(target: "engine::dashboard", "dashboard loaded");
                DashboardView::Ready(Box::new(dashboard))
            }
            Err(LoginRequired) => {
                info!(target: "engine::dashboard", "session rejected, login required");
                charts.clear();
                DashboardView::LoginRequired
            }
        }
    }

    async fn load_sections(&self, charts: &mut ChartRegistry) -> Step<Dashboard> {
        let (insights, mut banner) = self.load_insights().await?;
        let stat_cards = self.load_stat_cards().await?;
        charts.render(&insights);
        let premium = list_section(insights.premium_suggestions.clone(), NO_PREMIUM);
        let engagements = self.load_engagements().await?;
        let (profiles, profile_banner) = self.load_profiles().await?;
        if banner.is_none() {
            banner = profile_banner;
        }
        let jobs = self.load_jobs().await?;
        Ok(Dashboard {
            banner,
            insights,
            stat_cards,
            premium,
            engagements,
            profiles,
            jobs,
        })
    }

    async fn load_insights(&self) -> Step<(Insights, Option<String>)> {
        match self.api.insights().await {
            Ok(insights) => Ok((insights, None)),
            Err(ApiError::Unauthorized) => Err(LoginRequired),
            Err(ApiError::Status { status, error_id }) => {
                warn!(target: "engine::dashboard", "insights answered {}", status);
                let id = error_id.unwrap_or_else(|| status.as_u16().to_string());
                Ok((
                    Insights::default(),
                    Some(format!(
                        "Server error ({}). Some data may be unavailable.",
                        id
                    )),
                ))
            }
            Err(err) => {
                warn!(target: "engine::dashboard", "insights unavailable: {}", err);
                Ok((Insights::default(), None))
            }
        }
    }

    async fn load_stat_cards(&self) -> Step<Option<StatCards>> {
        match self.api.analytics().await {
            Ok(analytics) => Ok(Some(analytics.stat_cards())),
            Err(ApiError::Unauthorized) => Err(LoginRequired),
            Err(err) => {
                warn!(target: "engine::dashboard", "analytics unavailable: {}", err);
                Ok(None)
            }
        }
    }

    async fn load_engagements(&self) -> Step<Section<Vec<Engagement>>> {
        let result = self
            .api
            .engagements(self.options.engagement_timeframe, self.options.limit)
            .await;
        match result {
            Ok(rows) => Ok(list_section(rows, NO_ENGAGEMENTS)),
            Err(ApiError::Unauthorized) => Err(LoginRequired),
            Err(err) => {
                warn!(target: "engine::dashboard", "engagements unavailable: {}", err);
                Ok(Section::Failed("Failed to load engagements.".into()))
            }
        }
    }

    async fn load_profiles(&self) -> Step<(Section<Vec<UserProfile>>, Option<String>)> {
        let result = self
            .api
            .profiles(self.options.profile_timeframe, self.options.limit)
            .await;
        match result {
            Ok(rows) => Ok((list_section(rows, NO_PROFILES), None)),
            Err(ApiError::Unauthorized) => Err(LoginRequired),
            Err(ApiError::Status { status, error_id }) => {
                warn!(target: "engine::dashboard", "profiles answered {}", status);
                let id = error_id.unwrap_or_else(|| status.as_u16().to_string());
                Ok((
                    Section::Failed("Failed to load profiles (server error).".into()),
                    Some(format!("Failed to load profiles (server error: {}).", id)),
                ))
            }
            Err(ApiError::Transport(err)) => {
                warn!(target: "engine::dashboard", "profiles request failed: {}", err);
                Ok((
                    Section::Failed("Network error loading profiles.".into()),
                    None,
                ))
            }
            Err(err) => {
                warn!(target: "engine::dashboard", "profiles unavailable: {}", err);
                Ok((Section::Failed("Failed to load profiles.".into()), None))
            }
        }
    }

    async fn load_jobs(&self) -> Step<Section<Vec<IndexJobSummary>>> {
        match self.api.index_jobs(self.options.jobs_limit).await {
            Ok(jobs) => Ok(list_section(jobs, NO_JOBS)),
            Err(ApiError::Unauthorized) => Err(LoginRequired),
            Err(ApiError::Status { .. }) => Ok(Section::Failed("Failed to load jobs".into())),
            Err(err) => {
                warn!(target: "engine::dashboard", "index jobs unavailable: {}", err);
                Ok(Section::Failed("Error loading jobs".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartId;
    use async_trait::async_trait;
    use portal_client::StatusCode;
    use portal_model::DashboardAnalytics;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Outcome {
        Ok,
        Unauthorized,
        ServerError,
        Empty,
    }

    struct FakeAdmin {
        insights: Outcome,
        analytics: Outcome,
        engagements: Outcome,
        profiles: Outcome,
        jobs: Outcome,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeAdmin {
        fn healthy() -> Self {
            Self {
                insights: Outcome::Ok,
                analytics: Outcome::Ok,
                engagements: Outcome::Ok,
                profiles: Outcome::Ok,
                jobs: Outcome::Ok,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn failure(outcome: Outcome) -> ApiError {
        match outcome {
            Outcome::Unauthorized => ApiError::Unauthorized,
            _ => ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error_id: Some("err-1".into()),
            },
        }
    }

    fn rows<T: serde::de::DeserializeOwned>(
        outcome: Outcome,
        row: serde_json::Value,
    ) -> Result<Vec<T>, ApiError> {
        match outcome {
            Outcome::Ok => Ok(vec![serde_json::from_value(row).unwrap()]),
            Outcome::Empty => Ok(Vec::new()),
            other => Err(failure(other)),
        }
    }

    #[async_trait]
    impl AdminApi for FakeAdmin {
        async fn insights(&self) -> Result<Insights, ApiError> {
            self.record("insights");
            match self.insights {
                Outcome::Ok => Ok(serde_json::from_value(json!({
                    "age_groups": {"18-25": 4},
                    "premium_suggestions": [{"user": null, "question": "Passport?", "count": 7}]
                }))
                .unwrap()),
                Outcome::Empty => Ok(Insights::default()),
                other => Err(failure(other)),
            }
        }

        async fn analytics(&self) -> Result<DashboardAnalytics, ApiError> {
            self.record("analytics");
            match self.analytics {
                Outcome::Ok | Outcome::Empty => Ok(serde_json::from_value(json!({
                    "user_metrics": {"total_users": 3}
                }))
                .unwrap()),
                other => Err(failure(other)),
            }
        }

        async fn engagements(
            &self,
            _timeframe: Timeframe,
            _limit: u32,
        ) -> Result<Vec<Engagement>, ApiError> {
            self.record("engagements");
            rows(self.engagements, json!({"user_id": "u1"}))
        }

        async fn profiles(
            &self,
            _timeframe: Timeframe,
            _limit: u32,
        ) -> Result<Vec<UserProfile>, ApiError> {
            self.record("profiles");
            rows(self.profiles, json!({"_id": "p1"}))
        }

        async fn index_jobs(&self, _limit: u32) -> Result<Vec<IndexJobSummary>, ApiError> {
            self.record("jobs");
            rows(self.jobs, json!({"job_id": "j1", "status": "completed"}))
        }
    }

    async fn load(api: FakeAdmin) -> (DashboardView, ChartRegistry, Arc<FakeAdmin>) {
        let api = Arc::new(api);
        let mut charts = ChartRegistry::default();
        let view = DashboardLoader::new(api.clone()).load(&mut charts).await;
        (view, charts, api)
    }

    #[tokio::test]
    async fn sections_load_in_order() {
        let (view, charts, api) = load(FakeAdmin::healthy()).await;
        assert_eq!(
            api.calls(),
            vec!["insights", "analytics", "engagements", "profiles", "jobs"]
        );
        let dashboard = view.dashboard().unwrap();
        assert!(dashboard.banner.is_none());
        assert_eq!(dashboard.stat_cards.unwrap().total_users, 3);
        assert_eq!(dashboard.premium.loaded().unwrap()[0].user_label(), "Unknown");
        assert!(dashboard.jobs.loaded().is_some());
        assert!(charts.get(ChartId::AgeGroups).is_some());
    }

    #[tokio::test]
    async fn unauthorized_anywhere_requires_login() {
        for stage in 0..5 {
            let mut api = FakeAdmin::healthy();
            match stage {
                0 => api.insights = Outcome::Unauthorized,
                1 => api.analytics = Outcome::Unauthorized,
                2 => api.engagements = Outcome::Unauthorized,
                3 => api.profiles = Outcome::Unauthorized,
                _ => api.jobs = Outcome::Unauthorized,
            }
            let (view, charts, _) = load(api).await;
            assert!(matches!(view, DashboardView::LoginRequired), "stage {stage}");
            assert!(charts.is_empty());
        }
    }

    #[tokio::test]
    async fn insights_failure_shows_banner_and_defaults() {
        let mut api = FakeAdmin::healthy();
        api.insights = Outcome::ServerError;
        let (view, charts, api) = load(api).await;
        let dashboard = view.dashboard().unwrap();
        assert_eq!(
            dashboard.banner.as_deref(),
            Some("Server error (err-1). Some data may be unavailable.")
        );
        assert_eq!(dashboard.premium, Section::Empty(NO_PREMIUM.into()));
        assert_eq!(charts.len(), 4);
        assert_eq!(api.calls().len(), 5);
    }

    #[tokio::test]
    async fn failing_section_does_not_block_later_ones() {
        let mut api = FakeAdmin::healthy();
        api.analytics = Outcome::ServerError;
        api.engagements = Outcome::ServerError;
        api.profiles = Outcome::Empty;
        let (view, _, _) = load(api).await;
        let dashboard = view.dashboard().unwrap();
        assert!(dashboard.stat_cards.is_none());
        assert_eq!(
            dashboard.engagements,
            Section::Failed("Failed to load engagements.".into())
        );
        assert_eq!(dashboard.profiles, Section::Empty(NO_PROFILES.into()));
        assert!(dashboard.jobs.loaded().is_some());
    }

    #[tokio::test]
    async fn profile_server_error_sets_banner() {
        let mut api = FakeAdmin::healthy();
        api.profiles = Outcome::ServerError;
        api.jobs = Outcome::Empty;
        let (view, _, _) = load(api).await;
        let dashboard = view.dashboard().unwrap();
        assert_eq!(
            dashboard.banner.as_deref(),
            Some("Failed to load profiles (server error: err-1).")
        );
        assert_eq!(dashboard.jobs, Section::Empty(NO_JOBS.into()));
    }
}
