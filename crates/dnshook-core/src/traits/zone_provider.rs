// # Zone Provider Trait
//
// Defines the interface for providers whose API can only read or replace a
// zone's complete host record set.
//
// ## Implementations
//
// - Namecheap: `dnshook-provider-namecheap` crate
//
// ## Usage
//
// ```rust,ignore
// use dnshook_core::ZoneProvider;
//
// let mut hosts = provider.get_hosts("example.com").await?;
// hosts.push(HostRecord::challenge("_acme-challenge", token));
// provider.set_hosts("example.com", &hosts).await?;
// ```

use async_trait::async_trait;

use crate::record::HostRecord;

/// Trait for full-replace zone providers
///
/// # Full-Replace Semantics
///
/// `set_hosts` replaces the whole zone. Any record missing from the slice is
/// deleted by the provider. Callers must always start from the snapshot
/// returned by `get_hosts` and only add or remove challenge records.
///
/// # Concurrency
///
/// Two reconciliations against the same domain race: the later `set_hosts`
/// wins and silently discards the earlier one's additions. Callers serialize
/// by batching every pair of a domain into one request.
///
/// # Trust Level: Untrusted
///
/// - ✅ Perform HTTP/HTTPS API calls to their endpoint only
/// - ✅ Parse provider-specific responses
/// - ❌ Retry (every failure is terminal for the invocation)
/// - ❌ Cache zone state beyond a single request
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Fetch the current host records of a domain
    ///
    /// Challenge TXT records (see [`HostRecord::is_challenge`]) are excluded
    /// from the returned snapshot; every other record is returned in provider
    /// order.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::NotDelegated`] if the zone is not served by the provider
    /// - [`crate::Error::ApiStatus`] if the provider reports a non-OK status
    /// - [`crate::Error::Transport`], [`crate::Error::Parse`],
    ///   [`crate::Error::Resolve`] for lower-level failures
    async fn get_hosts(&self, domain: &str) -> Result<Vec<HostRecord>, crate::Error>;

    /// Replace the host records of a domain with `hosts`
    async fn set_hosts(&self, domain: &str, hosts: &[HostRecord]) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
