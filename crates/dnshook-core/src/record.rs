//! Host records and challenge requests
//!
//! [`HostRecord`] is one entry of a provider zone. [`ChallengeRequest`] is the
//! validated form of the hook arguments `domain fqdn1 token1 [fqdn2 token2 ...]`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label prefix of every DNS-01 challenge record
pub const CHALLENGE_PREFIX: &str = "_acme-challenge";

/// Record type used for challenge records
pub const CHALLENGE_RECORD_TYPE: &str = "TXT";

/// MX preference sent for records that are not MX records
pub const DEFAULT_MX_PREF: u32 = 10;

/// TTL of published challenge records (seconds)
pub const CHALLENGE_TTL: u32 = 1800;

/// One host record of a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Name relative to the zone (e.g. "@", "www", "_acme-challenge.foo")
    pub name: String,
    /// Record type (e.g. "A", "TXT")
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value
    pub address: String,
    /// MX preference
    pub mx_pref: u32,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl HostRecord {
    /// Create a record with the default MX preference
    pub fn new(
        name: impl Into<String>,
        record_type: impl Into<String>,
        address: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type: record_type.into(),
            address: address.into(),
            mx_pref: DEFAULT_MX_PREF,
            ttl,
        }
    }

    /// Create the TXT record that publishes a challenge token
    pub fn challenge(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(name, CHALLENGE_RECORD_TYPE, token, CHALLENGE_TTL)
    }

    /// Set the MX preference
    pub fn with_mx_pref(mut self, mx_pref: u32) -> Self {
        self.mx_pref = mx_pref;
        self
    }

    /// True for TXT records whose name starts with the challenge prefix
    ///
    /// These are never carried over from a fetched zone; deploy re-creates
    /// the ones it needs.
    pub fn is_challenge(&self) -> bool {
        self.record_type == CHALLENGE_RECORD_TYPE && self.name.starts_with(CHALLENGE_PREFIX)
    }
}

/// One (fqdn, token) pair of a challenge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengePair {
    /// Fully-qualified name being validated
    pub fqdn: String,
    /// Value to publish in the challenge TXT record
    pub token: String,
}

/// Validated challenge request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRequest {
    domain: String,
    pairs: Vec<ChallengePair>,
}

impl ChallengeRequest {
    /// Build a request from hook arguments (verb already removed)
    ///
    /// Expects `domain fqdn1 token1 [fqdn2 token2 ...]`: at least three
    /// arguments, an odd count, and a domain containing a `.`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() < 3 {
            return Err(Error::validation(format!(
                "expected at least 3 arguments (domain, fqdn, token), got {}",
                args.len()
            )));
        }

        if args.len() % 2 == 0 {
            return Err(Error::validation(format!(
                "expected an odd number of arguments (domain followed by fqdn/token pairs), got {}",
                args.len()
            )));
        }

        let pairs = args[1..]
            .chunks_exact(2)
            .map(|pair| ChallengePair {
                fqdn: pair[0].as_ref().to_string(),
                token: pair[1].as_ref().to_string(),
            })
            .collect();

        Self::new(args[0].as_ref(), pairs)
    }

    /// Build a request from a domain and its pairs
    ///
    /// The domain is lower-cased. The fqdns are taken as given; see
    /// [`subdomain_of`] for how they map onto record names.
    pub fn new(domain: &str, pairs: Vec<ChallengePair>) -> Result<Self> {
        let domain = domain.trim_end_matches('.').to_ascii_lowercase();

        if !domain.contains('.') {
            return Err(Error::validation(format!(
                "expected domain as first argument, got '{}'",
                domain
            )));
        }

        if pairs.is_empty() {
            return Err(Error::validation("at least one fqdn/token pair is required"));
        }

        Ok(Self { domain, pairs })
    }

    /// The (lower-cased) domain the zone belongs to
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The (fqdn, token) pairs in argument order
    pub fn pairs(&self) -> &[ChallengePair] {
        &self.pairs
    }

    /// Challenge TXT records for every pair, in argument order
    pub fn challenge_records(&self) -> Vec<HostRecord> {
        self.pairs
            .iter()
            .map(|pair| {
                let name = challenge_record_name(&pair.fqdn, &self.domain);
                HostRecord::challenge(name, pair.token.clone())
            })
            .collect()
    }
}

/// Subdomain part of `fqdn` relative to `domain`
///
/// The last `domain.len()` characters are cut off and surrounding dots
/// trimmed; an fqdn equal to the domain yields an empty string. An fqdn
/// outside the domain is cut the same way (with a warning), so the ACME
/// client's arguments are never second-guessed.
pub fn subdomain_of(fqdn: &str, domain: &str) -> String {
    let fqdn = fqdn.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if !fqdn.ends_with(domain.as_str()) {
        tracing::warn!("'{}' does not end with domain '{}'", fqdn, domain);
    }

    let cut = fqdn.len().saturating_sub(domain.len());
    let prefix = fqdn.get(..cut).unwrap_or_default();

    prefix.trim_matches('.').to_string()
}

/// Relative name of the challenge record for `fqdn`
///
/// `_acme-challenge` for the domain itself, `_acme-challenge.<subdomain>`
/// otherwise.
pub fn challenge_record_name(fqdn: &str, domain: &str) -> String {
    let subdomain = subdomain_of(fqdn, domain);

    if subdomain.is_empty() {
        CHALLENGE_PREFIX.to_string()
    } else {
        format!("{}.{}", CHALLENGE_PREFIX, subdomain)
    }
}
