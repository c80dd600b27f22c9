use crate::{ApiError, PortalClient};
use portal_model::{
    Ad, AiSearchReply, AiSearchRequest, EngagementEvent, ProfileSubmission, StatusReply,
    SuperCategory, Suggestion,
};
use serde_json::json;
use tracing::debug;

impl PortalClient {
    /// The full public service hierarchy.
    pub async fn services(&self) -> Result<Vec<SuperCategory>, ApiError> {
        self.send_json(self.get("/api/services")).await
    }

    /// One super-category. The server answers `{}` for unknown ids, which is
    /// returned here as `None`.
    pub async fn service(&self, id: &str) -> Result<Option<SuperCategory>, ApiError> {
        let path = format!("/api/service/{}", id);
        let value: serde_json::Value = self.send_json(self.get(&path)).await?;
        match value.get("id") {
            Some(_) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn public_ads(&self) -> Result<Vec<Ad>, ApiError> {
        self.send_json(self.get("/api/ads")).await
    }

    pub async fn autosuggest(&self, q: &str) -> Result<Vec<Suggestion>, ApiError> {
        self.send_json(self.get("/api/search/autosuggest").query(&[("q", q)]))
            .await
    }

    pub async fn log_engagement(&self, event: &EngagementEvent) -> Result<(), ApiError> {
        debug!(
            target: "client::http",
            "engagement source={} service={:?}",
            event.source,
            event.service
        );
        self.send(self.post("/api/engagement").json(event)).await?;
        Ok(())
    }

    /// Sends the whole profile form in one step and returns the server's
    /// profile id.
    pub async fn submit_profile(
        &self,
        profile_id: Option<&str>,
        profile: &ProfileSubmission,
    ) -> Result<Option<String>, ApiError> {
        let mut body = json!({ "step": "all", "data": profile });
        if let Some(id) = profile_id {
            body["profile_id"] = json!(id);
        }
        let reply: StatusReply = self.send_json(self.post("/api/profile/step").json(&body)).await?;
        Ok(reply.profile_id)
    }

    pub async fn ai_search(&self, query: &str, top_k: u32) -> Result<AiSearchReply, ApiError> {
        let request = AiSearchRequest {
            query: query.to_string(),
            top_k,
        };
        self.send_json(self.post("/api/ai/search").json(&request))
            .await
    }
}
