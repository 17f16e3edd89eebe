// # dnshook-core
//
// Core library for the ACME DNS-01 hook against full-replace zone APIs.
//
// ## Architecture Overview
//
// - **xml**: Flat tag-event stream → single-rooted element tree (no recursion)
// - **record**: HostRecord, challenge naming rules, validated ChallengeRequest
// - **ChallengeEngine**: get → add/remove challenges → set, for deploy and clean
// - **IpResolver**: Client IP override, cache and lookup
// - **Traits**: ZoneProvider, Transport and IpSource seams for implementations
//
// ## Design Principles
//
// 1. **Full snapshot in, full snapshot out**: a set-call is always built from
//    the zone fetched in the same operation, so unrelated records survive
// 2. **Check before mutate**: delegation and status checks happen on fetch
// 3. **Fail once, fail loudly**: every error is terminal, nothing retries
// 4. **Library-First**: the binary is thin glue around this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod record;
pub mod resolver;
pub mod traits;
pub mod xml;

// Re-export core types for convenience
pub use config::HookConfig;
pub use engine::{ChallengeEngine, ReconcileReport};
pub use error::{Error, Result};
pub use record::{CHALLENGE_PREFIX, ChallengePair, ChallengeRequest, HostRecord};
pub use resolver::IpResolver;
pub use traits::{IpSource, Transport, ZoneProvider};
pub use xml::{XmlElement, parse_document};
