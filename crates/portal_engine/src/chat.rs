use crate::engagement;
use anyhow::{ensure, Context, Result};
use portal_client::PortalClient;
use portal_model::Suggestion;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const TOP_K: u32 = 5;
pub const MIN_SUGGEST_CHARS: usize = 2;
pub const NO_ANSWER: &str =
    "I'm sorry, I couldn't find an answer to that. Please try rephrasing your question.";
pub const ASSISTANT_UNAVAILABLE: &str =
    "Oops! Something went wrong with the AI assistant. Please try again later.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub query: String,
    pub answer: String,
    pub sources: Vec<Value>,
}

/// Asks the assistant and records the question as an `ai_chat` engagement.
/// The engagement is best effort; only the search itself can fail.
pub async fn ask(
    client: &PortalClient,
    query: &str,
    profile_id: Option<&str>,
) -> Result<ChatReply> {
    let query = query.trim();
    ensure!(!query.is_empty(), "type a question first");

    let reply = client
        .ai_search(query, TOP_K)
        .await
        .context("AI search failed")?;
    let answer = if reply.answer.trim().is_empty() {
        NO_ANSWER.to_string()
    } else {
        reply.answer
    };

    if let Err(err) = client
        .log_engagement(&engagement::ai_chat(query, profile_id))
        .await
    {
        warn!(target: "engine::chat", "failed to record chat engagement: {}", err);
    }

    Ok(ChatReply {
        query: query.to_string(),
        answer,
        sources: reply.sources,
    })
}

/// Autosuggest hits for a partial query. Short queries are not sent and a
/// failed lookup yields no suggestions.
pub async fn suggest(client: &PortalClient, partial: &str) -> Vec<Suggestion> {
    let partial = partial.trim();
    if partial.chars().count() < MIN_SUGGEST_CHARS {
        return Vec::new();
    }
    match client.autosuggest(partial).await {
        Ok(hits) => hits,
        Err(err) => {
            debug!(target: "engine::chat", "autosuggest for '{}' failed: {}", partial, err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn empty_answer_falls_back_and_logs_engagement() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/search"))
            .and(body_partial_json(json!({"query": "driving licence", "top_k": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": "driving licence", "answer": "", "sources": [], "hits_count": 0
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/engagement"))
            .and(body_partial_json(json!({"source": "ai_chat", "user_id": "p-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri()).unwrap();
        let reply = ask(&client, "  driving licence ", Some("p-1")).await.unwrap();
        assert_eq!(reply.answer, NO_ANSWER);
        assert_eq!(reply.query, "driving licence");
    }

    #[tokio::test]
    async fn engagement_failure_does_not_fail_the_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "answer": "Visit the divisional secretariat."
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/engagement"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri()).unwrap();
        let reply = ask(&client, "birth certificate", None).await.unwrap();
        assert_eq!(reply.answer, "Visit the divisional secretariat.");
    }

    #[tokio::test]
    async fn short_queries_are_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search/autosuggest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri()).unwrap();
        assert!(suggest(&client, "p").await.is_empty());
        assert!(suggest(&client, " p ").await.is_empty());
    }

    #[tokio::test]
    async fn failed_autosuggest_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search/autosuggest"))
            .and(query_param("q", "pass"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = PortalClient::new(server.uri()).unwrap();
        assert!(suggest(&client, "pass").await.is_empty());
    }
}
