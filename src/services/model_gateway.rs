//! Client for the upstream LLM completion API (Groq, OpenAI-compatible).
//!
//! Provides:
//! - A `ModelGateway` trait so handlers and the itinerary pipeline can be
//!   exercised against a scripted model in tests
//! - `GroqClient`, the chat-completions implementation with bounded retries

use anyhow::{Context, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::domain::chat::ChatMessage;
use crate::error::ApiError;

/// Something that turns a message list into one text completion.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ApiError>;

    /// Cheap reachability check used by `/health`.
    async fn health_check(&self) -> Result<()>;
}

/// Client for the Groq chat-completions endpoint.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry_max_elapsed: Duration,
}

/// Error body returned by the completions API.
#[derive(Debug, Deserialize)]
struct GroqErrorResponse {
    error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GroqErrorDetail {
    message: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_seconds: u64,
        retry_max_elapsed_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Model gateway client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry_max_elapsed: Duration::from_secs(retry_max_elapsed_seconds),
        })
    }

    /// Single attempt. Transport failures, 429 and 5xx are transient.
    async fn post_completion(
        &self,
        body: &CompletionRequest<'_>,
    ) -> Result<String, backoff::Error<ApiError>> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = body.model, "Model gateway request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Model gateway request failed");
                backoff::Error::transient(ApiError::Upstream(format!(
                    "model gateway unavailable: {}",
                    e
                )))
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<GroqErrorResponse>()
                .await
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("model gateway error: {}", status));

            let err = ApiError::Upstream(message);
            return if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(status = %status, "Model gateway transient error");
                Err(backoff::Error::transient(err))
            } else {
                error!(status = %status, "Model gateway rejected request");
                Err(backoff::Error::permanent(err))
            };
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse model gateway response");
            backoff::Error::permanent(ApiError::Upstream(format!(
                "invalid model gateway response: {}",
                e
            )))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                backoff::Error::permanent(ApiError::Upstream(
                    "model gateway returned no choices".to_string(),
                ))
            })
    }
}

#[async_trait]
impl ModelGateway for GroqClient {
    #[instrument(skip(self, messages), fields(messages = messages.len()))]
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ApiError> {
        let body = CompletionRequest { model, messages };

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(250))
            .with_max_elapsed_time(Some(self.retry_max_elapsed))
            .build();

        backoff::future::retry(policy, || self.post_completion(&body)).await
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models", self.base_url);

        self.client
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("Model gateway health check failed")?
            .error_for_status()
            .context("Model gateway unhealthy")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::http::{header::AUTHORIZATION, HeaderMap};
    use axum::routing::post;
    use axum::{Json, Router};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Completions endpoint that answers the n-th call with `statuses[n]`,
    /// then 200 once the script runs out.
    struct ScriptedUpstream {
        statuses: Vec<StatusCode>,
        hits: AtomicUsize,
        authorization: Mutex<Option<String>>,
    }

    async fn completions(
        State(upstream): State<Arc<ScriptedUpstream>>,
        headers: HeaderMap,
    ) -> (StatusCode, Json<Value>) {
        let hit = upstream.hits.fetch_add(1, Ordering::SeqCst);
        *upstream.authorization.lock() = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let status = upstream.statuses.get(hit).copied().unwrap_or(StatusCode::OK);
        if status.is_success() {
            let body = json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "Namaskar!"}}]
            });
            (status, Json(body))
        } else {
            let body = json!({"error": {"message": format!("scripted {}", status.as_u16())}});
            (status, Json(body))
        }
    }

    async fn upstream(statuses: &[StatusCode]) -> (String, Arc<ScriptedUpstream>) {
        let state = Arc::new(ScriptedUpstream {
            statuses: statuses.to_vec(),
            hits: AtomicUsize::new(0),
            authorization: Mutex::new(None),
        });
        let app = Router::new()
            .route("/chat/completions", post(completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        (format!("http://{}", addr), state)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("Best fort near Pune?")]
    }

    #[tokio::test]
    async fn success_returns_first_choice_with_bearer_auth() {
        let (base, upstream) = upstream(&[]).await;
        let client = GroqClient::new(&base, "test-key", 5, 5).unwrap();

        let reply = client.complete("llama-3.1-8b-instant", &messages()).await.unwrap();

        assert_eq!(reply, "Namaskar!");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        assert_eq!(upstream.authorization.lock().as_deref(), Some("Bearer test-key"));
    }

    #[tokio::test]
    async fn client_error_is_attempted_once() {
        let (base, upstream) = upstream(&[StatusCode::BAD_REQUEST]).await;
        let client = GroqClient::new(&base, "test-key", 5, 5).unwrap();

        let err = client
            .complete("llama-3.1-8b-instant", &messages())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Upstream(ref m) if m == "scripted 400"));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_limit_and_server_errors_are_retried() {
        let (base, upstream) = upstream(&[
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ])
        .await;
        let client = GroqClient::new(&base, "test-key", 5, 10).unwrap();

        let reply = client.complete("llama-3.1-8b-instant", &messages()).await.unwrap();

        assert_eq!(reply, "Namaskar!");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_server_error_gives_up() {
        let (base, upstream) = upstream(&[StatusCode::INTERNAL_SERVER_ERROR; 64]).await;
        let client = GroqClient::new(&base, "test-key", 5, 1).unwrap();

        let err = client
            .complete("llama-3.1-8b-instant", &messages())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Upstream(_)));
        assert!(upstream.hits.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn request_uses_chat_completions_shape() {
        let messages = vec![
            ChatMessage::system("You are an expert Maharashtra travel guide."),
            ChatMessage::user("Is monsoon good for Lonavala?"),
        ];
        let body = serde_json::to_value(CompletionRequest {
            model: "llama-3.1-8b-instant",
            messages: &messages,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "system", "content": "You are an expert Maharashtra travel guide."},
                    {"role": "user", "content": "Is monsoon good for Lonavala?"}
                ]
            })
        );
    }

    #[test]
    fn first_choice_content_is_the_reply() {
        let parsed: CompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Namaskar!"}}]
        }))
        .unwrap();

        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Namaskar!")
        );
    }
}
