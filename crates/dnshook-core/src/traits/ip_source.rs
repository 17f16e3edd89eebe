// # IP Source Trait
//
// Defines the interface for discovering the caller's public IPv4 address.
// The provider requires it as a client-identity field on every request.
//
// ## Implementations
//
// - HTTP lookup service: `dnshook-ip-http` crate
//
// Sources are not called directly by providers; they sit behind
// [`crate::IpResolver`], which applies the configured override and caches
// the first successful lookup.

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public IPv4 address lookups
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Look up the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address as seen from outside
    /// - `Err(Error::Resolve)`: If the lookup failed or did not yield IPv4
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;
}
