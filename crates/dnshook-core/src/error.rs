//! Error types for the DNS-01 hook
//!
//! Every failure is terminal for the current invocation. Nothing in the
//! pipeline retries; the binary maps any error to a non-zero exit status.

use thiserror::Error;

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DNS-01 hook
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed hook arguments (raised before any network call)
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// Public IPv4 address could not be determined
    #[error("IP resolution failed: {0}")]
    Resolve(String),

    /// Network, TLS, timeout or non-2xx failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body is not a well-formed, single-rooted document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider answered with a non-OK status
    #[error("Provider returned non-OK status: {0}")]
    ApiStatus(String),

    /// The zone is not served by the provider's name servers
    #[error("Domain {0} is not using the provider's DNS")]
    NotDelegated(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an IP resolution error
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an API status error
    pub fn api_status(msg: impl Into<String>) -> Self {
        Self::ApiStatus(msg.into())
    }

    /// Create a "not delegated" error for a domain
    pub fn not_delegated(domain: impl Into<String>) -> Self {
        Self::NotDelegated(domain.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the failure happened before anything was sent to the provider
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
