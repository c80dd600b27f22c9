//! Endpoints behind the admin session cookie.

use crate::{check_status, AdminApi, ApiError, JobStatusSource, PortalClient};
use async_trait::async_trait;
use portal_model::{
    Ad, BuildStarted, Category, DashboardAnalytics, Engagement, IndexJobDetail, IndexJobEnvelope,
    IndexJobList, IndexJobSummary, IndexStatus, Insights, Officer, ServiceRecord, StatusReply,
    Timeframe, UserProfile,
};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::info;

/// CSV downloads offered by the admin reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Engagements,
    Profiles,
}

impl ExportKind {
    pub fn path(self) -> &'static str {
        match self {
            ExportKind::Engagements => "/api/admin/export_csv",
            ExportKind::Profiles => "/api/admin/export_profiles",
        }
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportKind::Engagements => "engagements.csv",
            ExportKind::Profiles => "profiles.csv",
        }
    }
}

impl PortalClient {
    /// Opens an admin session. The server answers a good login with a
    /// redirect to `/admin` and a bad one with `401 Login failed`.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self
            .post("/admin/login")
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;
        let status = response.status();
        if status.is_redirection() {
            info!(target: "client::http", "admin session opened for {}", username);
            return Ok(());
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::LoginFailed);
        }
        let response = check_status(response).await?;
        let body = response.text().await?;
        if body.contains("Login failed") {
            return Err(ApiError::LoginFailed);
        }
        info!(target: "client::http", "admin session opened for {}", username);
        Ok(())
    }

    pub async fn admin_logout(&self) -> Result<(), ApiError> {
        self.send(self.post("/api/admin/logout")).await?;
        Ok(())
    }

    pub async fn insights(&self) -> Result<Insights, ApiError> {
        self.send_json(self.get("/api/admin/insights")).await
    }

    pub async fn analytics(&self) -> Result<DashboardAnalytics, ApiError> {
        self.send_json(self.get("/api/dashboard/analytics")).await
    }

    pub async fn engagements(
        &self,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<Engagement>, ApiError> {
        self.send_json(self.get("/api/admin/engagements").query(&window(timeframe, limit)))
            .await
    }

    pub async fn profiles(
        &self,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<UserProfile>, ApiError> {
        self.send_json(self.get("/api/admin/profiles").query(&window(timeframe, limit)))
            .await
    }

    /// Starts a background index build. `simulate` asks the server for a
    /// short fake job instead of a real rebuild.
    pub async fn build_index_async(&self, simulate: bool) -> Result<BuildStarted, ApiError> {
        let mut request = self.post("/api/admin/build_index_async");
        if simulate {
            request = request.query(&[("simulate", "1")]);
        }
        let started: BuildStarted = self.send_json(request).await?;
        info!(target: "client::http", "index build job {} created", started.job_id);
        Ok(started)
    }

    pub async fn index_status(&self) -> Result<IndexStatus, ApiError> {
        self.send_json(self.get("/api/admin/index_status")).await
    }

    pub async fn index_jobs(&self, limit: u32) -> Result<Vec<IndexJobSummary>, ApiError> {
        let list: IndexJobList = self
            .send_json(self.get("/api/admin/index_jobs").query(&[("limit", limit)]))
            .await?;
        Ok(list.jobs)
    }

    /// Stored details for one job, `None` when the server does not know it.
    pub async fn index_job(&self, job_id: &str) -> Result<Option<IndexJobDetail>, ApiError> {
        let path = format!("/api/admin/index_job/{}", job_id);
        match self.send_json::<IndexJobEnvelope>(self.get(&path)).await {
            Ok(envelope) => Ok(Some(envelope.job)),
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn list_ads(&self) -> Result<Vec<Ad>, ApiError> {
        self.send_json(self.get("/api/admin/ads")).await
    }

    pub async fn save_ad(&self, ad: &Ad) -> Result<StatusReply, ApiError> {
        self.upsert("/api/admin/ads", ad).await
    }

    pub async fn delete_ad(&self, id: &str) -> Result<StatusReply, ApiError> {
        self.delete_by_query("/api/admin/ads", id).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send_json(self.get("/api/admin/categories")).await
    }

    pub async fn save_category(&self, category: &Category) -> Result<StatusReply, ApiError> {
        self.upsert("/api/admin/categories", category).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<StatusReply, ApiError> {
        self.delete_by_query("/api/admin/categories", id).await
    }

    pub async fn list_officers(&self) -> Result<Vec<Officer>, ApiError> {
        self.send_json(self.get("/api/admin/officers")).await
    }

    pub async fn save_officer(&self, officer: &Officer) -> Result<StatusReply, ApiError> {
        self.upsert("/api/admin/officers", officer).await
    }

    pub async fn delete_officer(&self, id: &str) -> Result<StatusReply, ApiError> {
        self.delete_by_query("/api/admin/officers", id).await
    }

    pub async fn list_service_records(&self) -> Result<Vec<ServiceRecord>, ApiError> {
        self.send_json(self.get("/api/admin/services")).await
    }

    pub async fn save_service_record(
        &self,
        record: &ServiceRecord,
    ) -> Result<StatusReply, ApiError> {
        self.upsert("/api/admin/services", record).await
    }

    /// Services are the one admin collection deleted by path segment.
    pub async fn delete_service_record(&self, id: &str) -> Result<StatusReply, ApiError> {
        let path = format!("/api/admin/services/{}", id);
        self.send_json(self.delete(&path)).await
    }

    /// Raw CSV bytes of an admin export.
    pub async fn export(&self, kind: ExportKind) -> Result<Vec<u8>, ApiError> {
        let response = self.send(self.get(kind.path())).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn upsert<T: Serialize + ?Sized>(
        &self,
        path: &str,
        record: &T,
    ) -> Result<StatusReply, ApiError> {
        self.send_json(self.post(path).json(record)).await
    }

    async fn delete_by_query(&self, path: &str, id: &str) -> Result<StatusReply, ApiError> {
        self.send_json(self.delete(path).query(&[("id", id)])).await
    }
}

fn window(timeframe: Timeframe, limit: u32) -> [(&'static str, String); 2] {
    [
        ("timeframe", timeframe.as_str().to_string()),
        ("limit", limit.to_string()),
    ]
}

#[async_trait]
impl JobStatusSource for PortalClient {
    async fn index_status(&self) -> Result<IndexStatus, ApiError> {
        PortalClient::index_status(self).await
    }
}

#[async_trait]
impl AdminApi for PortalClient {
    async fn insights(&self) -> Result<Insights, ApiError> {
        PortalClient::insights(self).await
    }

    async fn analytics(&self) -> Result<DashboardAnalytics, ApiError> {
        PortalClient::analytics(self).await
    }

    async fn engagements(
        &self,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<Engagement>, ApiError> {
        PortalClient::engagements(self, timeframe, limit).await
    }

    async fn profiles(
        &self,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<UserProfile>, ApiError> {
        PortalClient::profiles(self, timeframe, limit).await
    }

    async fn index_jobs(&self, limit: u32) -> Result<Vec<IndexJobSummary>, ApiError> {
        PortalClient::index_jobs(self, limit).await
    }
}
