use async_trait::async_trait;
use serde::Deserialize;

use crate::export::package::UploadPackage;
use crate::foundation::error::{StoryframeError, StoryframeResult};

/// Acknowledgment returned by the ingestion endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadAck {
    pub success: bool,
    pub message: Option<String>,
    /// Response body as received.
    pub raw: String,
}

impl UploadAck {
    /// Interpret a 2xx response body. Non-JSON bodies count as success.
    pub fn from_body(body: &str) -> Self {
        #[derive(Deserialize)]
        struct Repr {
            success: Option<bool>,
            message: Option<String>,
        }

        match serde_json::from_str::<Repr>(body) {
            Ok(r) => Self {
                success: r.success.unwrap_or(true),
                message: r.message,
                raw: body.to_string(),
            },
            Err(_) => Self {
                success: true,
                message: None,
                raw: body.to_string(),
            },
        }
    }
}

/// Sends a finished package to the ingestion endpoint.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// `Ok` only for an acknowledged upload; rejections are [`StoryframeError::Upload`].
    async fn upload(&self, package: &UploadPackage) -> StoryframeResult<UploadAck>;
}

/// Multipart POST to an HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn form(package: &UploadPackage) -> StoryframeResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new()
            .text("user_id", package.user_id.clone())
            .text("session_id", package.session_id.clone())
            .text("frame_metadata", package.metadata_json()?);
        for part in &package.parts {
            let body = reqwest::multipart::Part::bytes(part.binary.clone())
                .file_name(part.file_name.clone())
                .mime_str(&part.mime_type)
                .map_err(|e| {
                    StoryframeError::validation(format!(
                        "mime type '{}' for {}: {e}",
                        part.mime_type, part.field_name
                    ))
                })?;
            form = form.part(part.field_name.clone(), body);
        }
        Ok(form)
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    #[tracing::instrument(level = "info", skip_all, fields(endpoint = %self.endpoint, parts = package.parts.len()))]
    async fn upload(&self, package: &UploadPackage) -> StoryframeResult<UploadAck> {
        let form = Self::form(package)?;
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoryframeError::network(format!("POST {}: {e}", self.endpoint)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            StoryframeError::network(format!("read response of {}: {e}", self.endpoint))
        })?;
        if !status.is_success() {
            return Err(StoryframeError::Upload {
                status: status.as_u16(),
                body,
            });
        }

        let ack = UploadAck::from_body(&body);
        if !ack.success {
            return Err(StoryframeError::Upload {
                status: status.as_u16(),
                body,
            });
        }
        Ok(ack)
    }
}
