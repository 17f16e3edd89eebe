//! Transport seam between a provider and the network

use async_trait::async_trait;

/// Ordered form fields of a provider request
pub type FormFields = Vec<(String, String)>;

/// Trait for posting URL-encoded forms to a provider API
///
/// Implementations send every value literally (no file-upload or other
/// reinterpretation of leading characters) and return the body of a 2xx
/// response. Anything else is a [`crate::Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `form` to `endpoint` and return the response body
    async fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<String, crate::Error>;
}
