// # HTTP IP Source
//
// This crate looks up the caller's public IPv4 address from a plain-text
// "what is my IP" service (icanhazip.com by default).
//
// ## Purpose
//
// The provider API only accepts requests whose ClientIP field matches the
// whitelisted address the request comes from. This source answers that
// question when no override is configured.
//
// ## IPv4 Only
//
// The client binds to 0.0.0.0 so the lookup goes out over IPv4: a dual-stack
// host would otherwise report its IPv6 address, which the provider rejects.
//
// Results are cached by `dnshook_core::IpResolver`, not here.

use dnshook_core::config::DEFAULT_IP_LOOKUP_URL;
use dnshook_core::traits::IpSource;
use dnshook_core::{Error, Result};

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Lookup timeout
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IPv4 lookup
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client bound to IPv4
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL answering with the caller's address as plain text
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .build()
            .map_err(|e| Error::config(format!("Failed to build lookup client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Source using the default lookup service
    pub fn with_default_url() -> Result<Self> {
        Self::new(DEFAULT_IP_LOOKUP_URL)
    }

    /// URL queried by this source
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Parse a lookup service body into an IPv4 address
pub fn parse_ipv4(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();

    text.parse::<Ipv4Addr>().map_err(|_| {
        Error::resolve(format!(
            "Lookup service returned '{}', not an IPv4 address",
            text
        ))
    })
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Looking up public IPv4 address via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolve(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolve(format!(
                "Lookup service returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolve(format!("Failed to read lookup response: {}", e)))?;

        let ip = parse_ipv4(&body)?;
        tracing::info!("Public IPv4 address is {}", ip);
        Ok(ip)
    }
}
