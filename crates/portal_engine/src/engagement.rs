//! Builders for the events posted to `/api/engagement`.

use portal_model::EngagementEvent;

pub const DIRECT_CLICK: &str = "direct_click";
pub const AI_CHAT: &str = "ai_chat";
pub const AD_CLICK: &str = "ad_click";

/// A question opened from the service directory.
pub fn direct_click(
    question: impl Into<String>,
    service: impl Into<String>,
    profile_id: Option<&str>,
) -> EngagementEvent {
    EngagementEvent {
        user_id: profile_id.map(str::to_string),
        question_clicked: Some(question.into()),
        service: Some(service.into()),
        source: DIRECT_CLICK.to_string(),
        ..Default::default()
    }
}

/// A question typed into the assistant.
pub fn ai_chat(query: impl Into<String>, profile_id: Option<&str>) -> EngagementEvent {
    EngagementEvent {
        user_id: profile_id.map(str::to_string),
        question_clicked: Some(query.into()),
        source: AI_CHAT.to_string(),
        ..Default::default()
    }
}

/// A click on a public advertisement.
pub fn ad_click(ad_id: impl Into<String>, profile_id: Option<&str>) -> EngagementEvent {
    EngagementEvent {
        user_id: profile_id.map(str::to_string),
        ad: Some(ad_id.into()),
        source: AD_CLICK.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ad_click_sends_only_the_ad() {
        let event = ad_click("ad-7", None);
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "user_id": null,
                "desires": [],
                "question_clicked": null,
                "service": null,
                "ad": "ad-7",
                "source": "ad_click"
            })
        );
    }

    #[test]
    fn chat_event_has_no_service() {
        let event = ai_chat("passport renewal", Some("p-9"));
        assert_eq!(event.source, AI_CHAT);
        assert_eq!(event.service, None);
        assert_eq!(event.user_id.as_deref(), Some("p-9"));
    }
}
