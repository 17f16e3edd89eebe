//! Core traits for the DNS-01 hook
//!
//! This module defines the seams between the core and its implementations.
//!
//! - [`ZoneProvider`]: Fetch and replace a provider zone
//! - [`Transport`]: POST a form to the provider API
//! - [`IpSource`]: Look up the caller's public IPv4 address

pub mod ip_source;
pub mod transport;
pub mod zone_provider;

pub use ip_source::IpSource;
pub use transport::{FormFields, Transport};
pub use zone_provider::ZoneProvider;
