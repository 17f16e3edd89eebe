//! Configuration types for the DNS-01 hook
//!
//! Configuration is read once by the binary and passed into the core as
//! explicit values. Nothing in the core reads the environment.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Production XML API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.namecheap.com/xml.response";

/// Service used to discover the public IPv4 address
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://icanhazip.com/";

/// Hook configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Provider account / API user
    pub api_user: String,

    /// Provider API key
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Public IPv4 address to report instead of looking it up
    #[serde(default)]
    pub client_ip: Option<Ipv4Addr>,

    /// Provider API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// PEM bundle to trust instead of the one shipped with the provider
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,

    /// URL returning the caller's public IP as plain text
    #[serde(default = "default_ip_lookup_url")]
    pub ip_lookup_url: String,

    /// Seconds to wait after a successful deploy for DNS to propagate
    #[serde(default = "default_propagation_delay_secs")]
    pub propagation_delay_secs: u64,

    /// Command run after a successful hook invocation with the same arguments
    #[serde(default)]
    pub passthrough: Option<String>,

    /// Fetch zones but only log the records that would be written
    #[serde(default)]
    pub dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for HookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookConfig")
            .field("api_user", &self.api_user)
            .field("api_key", &"<REDACTED>")
            .field("client_ip", &self.client_ip)
            .field("endpoint", &self.endpoint)
            .field("ca_bundle", &self.ca_bundle)
            .field("ip_lookup_url", &self.ip_lookup_url)
            .field("propagation_delay_secs", &self.propagation_delay_secs)
            .field("passthrough", &self.passthrough)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl HookConfig {
    /// Create a configuration with defaults for everything but credentials
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_user: api_user.into(),
            api_key: api_key.into(),
            client_ip: None,
            endpoint: default_endpoint(),
            ca_bundle: None,
            ip_lookup_url: default_ip_lookup_url(),
            propagation_delay_secs: default_propagation_delay_secs(),
            passthrough: None,
            dry_run: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_user.trim().is_empty() {
            return Err(crate::Error::config("No provider API user supplied"));
        }

        if self.api_key.trim().is_empty() {
            return Err(crate::Error::config("No provider API key supplied"));
        }

        // Credentials travel in the request body
        if !self.endpoint.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "Provider endpoint must use HTTPS. Got: {}",
                self.endpoint
            )));
        }

        // A client IP override makes the lookup URL irrelevant
        if self.client_ip.is_none()
            && !self.ip_lookup_url.starts_with("http://")
            && !self.ip_lookup_url.starts_with("https://")
        {
            return Err(crate::Error::config(format!(
                "IP lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_lookup_url
            )));
        }

        if self.propagation_delay_secs > 600 {
            return Err(crate::Error::config(format!(
                "Propagation delay must be at most 600 seconds. Got: {}",
                self.propagation_delay_secs
            )));
        }

        if let Some(ref command) = self.passthrough
            && command.trim().is_empty()
        {
            return Err(crate::Error::config("Passthrough command cannot be empty"));
        }

        Ok(())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_ip_lookup_url() -> String {
    DEFAULT_IP_LOOKUP_URL.to_string()
}

fn default_propagation_delay_secs() -> u64 {
    10
}
