use async_trait::async_trait;
use serde::Serialize;

use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Enqueues the follow-on remote job after a successful upload.
#[async_trait]
pub trait JobTrigger: Send + Sync {
    async fn trigger(&self, user_id: &str, session_id: &str) -> StoryframeResult<()>;
}

#[derive(Serialize)]
struct TriggerRequest<'a> {
    user_id: &'a str,
    session_id: &'a str,
}

/// JSON POST of `{user_id, session_id}`.
#[derive(Clone, Debug)]
pub struct HttpJobTrigger {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpJobTrigger {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl JobTrigger for HttpJobTrigger {
    #[tracing::instrument(level = "info", skip(self), fields(endpoint = %self.endpoint))]
    async fn trigger(&self, user_id: &str, session_id: &str) -> StoryframeResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TriggerRequest {
                user_id,
                session_id,
            })
            .send()
            .await
            .map_err(|e| StoryframeError::network(format!("POST {}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoryframeError::http_status(
                format_args!("POST {}", self.endpoint),
                status.as_u16(),
                &body,
            ));
        }
        Ok(())
    }
}
