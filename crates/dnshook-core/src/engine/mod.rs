//! Challenge reconciliation engine
//!
//! The ChallengeEngine is responsible for:
//! - Fetching the full zone snapshot (challenge TXT records already stripped)
//! - Adding one challenge TXT record per (fqdn, token) pair on deploy
//! - Writing the whole zone back in a single set-call
//!
//! ## Architecture
//!
//! ```text
//!  ChallengeRequest
//!         │
//!         ▼
//! ┌────────────────┐  get_hosts   ┌──────────────┐
//! │ChallengeEngine │─────────────▶│ ZoneProvider │
//! │                │◀─────────────│              │
//! │  + challenges  │  set_hosts   │              │
//! │                │─────────────▶│              │
//! └────────────────┘              └──────────────┘
//! ```
//!
//! ## Safety
//!
//! Every set-call is built from the snapshot fetched in the same operation,
//! so records unrelated to the challenge are always written back. The
//! provider's delegation check runs during the fetch, before any mutation.
//!
//! Operations are sequential and not safe to run concurrently for the same
//! domain: the provider API replaces the whole zone, so the later write wins.

use crate::error::Result;
use crate::record::{ChallengeRequest, HostRecord};
use crate::traits::ZoneProvider;
use tracing::{debug, info};

/// Summary of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Domain whose zone was written
    pub domain: String,
    /// Non-challenge records carried over from the fetched snapshot
    pub preserved: usize,
    /// Challenge records written
    pub published: usize,
}

/// Core reconciliation engine
///
/// Owns the business rules of the hook; all provider I/O goes through the
/// [`ZoneProvider`] it was created with.
pub struct ChallengeEngine {
    /// Provider holding the zone
    provider: Box<dyn ZoneProvider>,
}

impl ChallengeEngine {
    /// Create a new engine
    pub fn new(provider: Box<dyn ZoneProvider>) -> Self {
        Self { provider }
    }

    /// Publish one challenge TXT record per pair
    ///
    /// Existing challenge TXT records are dropped by the fetch and not carried
    /// over, so the written zone holds exactly the challenges of this request.
    /// On success the caller waits for DNS propagation before letting the ACME
    /// server validate.
    pub async fn deploy(&self, request: &ChallengeRequest) -> Result<ReconcileReport> {
        let domain = request.domain();
        info!(
            "Deploying {} challenge record(s) for {} via {}",
            request.pairs().len(),
            domain,
            self.provider.provider_name()
        );

        let mut hosts = self.provider.get_hosts(domain).await?;
        let preserved = hosts.len();

        let challenges = request.challenge_records();
        for record in &challenges {
            debug!("Adding challenge record {} {}", record.record_type, record.name);
        }
        let published = challenges.len();
        hosts.extend(challenges);

        self.write(domain, &hosts).await?;

        info!(
            "Deployed challenge record(s) for {} ({} existing record(s) preserved)",
            domain, preserved
        );

        Ok(ReconcileReport {
            domain: domain.to_string(),
            preserved,
            published,
        })
    }

    /// Remove every challenge TXT record from the zone
    ///
    /// Removal is prefix based: all TXT records whose name starts with
    /// `_acme-challenge` go, whichever pairs the request names. The pairs are
    /// only validated for argument-shape symmetry with [`Self::deploy`].
    pub async fn clean(&self, request: &ChallengeRequest) -> Result<ReconcileReport> {
        let domain = request.domain();
        info!(
            "Cleaning challenge records for {} via {}",
            domain,
            self.provider.provider_name()
        );

        let hosts = self.provider.get_hosts(domain).await?;
        let preserved = hosts.len();

        self.write(domain, &hosts).await?;

        info!(
            "Cleaned challenge records for {} ({} record(s) kept)",
            domain, preserved
        );

        Ok(ReconcileReport {
            domain: domain.to_string(),
            preserved,
            published: 0,
        })
    }

    async fn write(&self, domain: &str, hosts: &[HostRecord]) -> Result<()> {
        debug!("Writing {} host record(s) for {}", hosts.len(), domain);
        self.provider.set_hosts(domain, hosts).await
    }
}

