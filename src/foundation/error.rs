/// Crate-wide result alias.
pub type StoryframeResult<T> = Result<T, StoryframeError>;

/// Error type for compositing, capture and export.
///
/// Element- and image-level failures are absorbed inside the pipeline and never surface through
/// this type from the batch entry points. What does surface is either a validation problem with
/// the input, an empty cache after a sweep, or a network failure.
#[derive(thiserror::Error, Debug)]
pub enum StoryframeError {
    /// Input document or argument is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Bytes could not be decoded into an image or SVG tree.
    #[error("decode error: {0}")]
    Decode(String),

    /// An image resource could not be fetched.
    #[error("load error: {0}")]
    Load(String),

    /// Raster operation failed.
    #[error("render error: {0}")]
    Render(String),

    /// The sweep finished without a single rendered binary.
    #[error("no rendered frames available: every capture attempt failed")]
    EmptyCache,

    /// The ingestion endpoint answered with a non-success status.
    #[error("upload rejected with status {status}: {body}")]
    Upload {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// Transport-level failure talking to a remote endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryframeError {
    /// Build a [`StoryframeError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryframeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StoryframeError::Load`].
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`StoryframeError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryframeError::Network`].
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a [`StoryframeError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`StoryframeError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// A non-success reply from a remote service other than the ingestion endpoint.
    pub fn http_status(context: impl std::fmt::Display, status: u16, body: &str) -> Self {
        Self::Network(format!("{context}: status {status}: {body}"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
