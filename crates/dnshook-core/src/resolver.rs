//! Public IPv4 resolution with override and per-instance caching
//!
//! Precedence: configured override (no network) → cached result of an
//! earlier lookup through this resolver → live lookup via the [`IpSource`].
//! A successful lookup is cached for the lifetime of the resolver, which the
//! binary creates once per process.

use std::net::Ipv4Addr;

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::traits::IpSource;

/// Resolves the client IP sent with every provider request
pub struct IpResolver {
    /// Configured address, short-circuits any lookup
    override_ip: Option<Ipv4Addr>,

    /// Live lookup, if any
    source: Option<Box<dyn IpSource>>,

    /// First successful lookup
    cached: OnceCell<Ipv4Addr>,
}

impl std::fmt::Debug for IpResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpResolver")
            .field("override_ip", &self.override_ip)
            .field("has_source", &self.source.is_some())
            .field("cached", &self.cached.get())
            .finish()
    }
}

impl IpResolver {
    /// Create a resolver backed by a live lookup
    pub fn new(source: Box<dyn IpSource>) -> Self {
        Self {
            override_ip: None,
            source: Some(source),
            cached: OnceCell::new(),
        }
    }

    /// Create a resolver that always returns `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self {
            override_ip: Some(ip),
            source: None,
            cached: OnceCell::new(),
        }
    }

    /// Create a resolver from an optional override and an optional source
    pub fn with_override(
        override_ip: Option<Ipv4Addr>,
        source: Option<Box<dyn IpSource>>,
    ) -> Self {
        Self {
            override_ip,
            source,
            cached: OnceCell::new(),
        }
    }

    /// Resolve the public IPv4 address
    ///
    /// # Errors
    ///
    /// [`Error::Resolve`] if there is no override and the lookup fails (or no
    /// lookup is configured). Failed lookups are not cached.
    pub async fn resolve(&self) -> Result<Ipv4Addr> {
        if let Some(ip) = self.override_ip {
            return Ok(ip);
        }

        let ip = self
            .cached
            .get_or_try_init(|| async {
                let source = self.source.as_ref().ok_or_else(|| {
                    Error::resolve("no client IP configured and no lookup available")
                })?;

                let ip = source.current().await?;
                tracing::debug!("Resolved public IPv4 address: {}", ip);
                Ok::<_, Error>(ip)
            })
            .await?;

        Ok(*ip)
    }
}
