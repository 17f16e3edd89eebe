//! XML API response model
//!
//! Interprets a parsed response tree against the provider's schema:
//!
//! ```text
//! <ApiResponse Status="OK">
//!   <Errors><Error Number="...">message</Error></Errors>
//!   <Warnings />
//!   <CommandResponse Type="namecheap.domains.dns.getHosts">
//!     <DomainDNSGetHostsResult Domain="example.com" IsUsingOurDNS="true">
//!       <host Name="@" Type="A" Address="192.0.2.1" MXPref="10" TTL="1800" />
//!     </DomainDNSGetHostsResult>
//!   </CommandResponse>
//! </ApiResponse>
//! ```
//!
//! `Errors`/`Warnings` entries are logged but never fatal on their own; the
//! root `Status` attribute decides success.

use dnshook_core::record::DEFAULT_MX_PREF;
use dnshook_core::xml::parse_document;
use dnshook_core::{CHALLENGE_PREFIX, Error, HostRecord, Result, XmlElement};

/// Command that returns a zone's host records
pub const GET_HOSTS_COMMAND: &str = "namecheap.domains.dns.getHosts";

/// Command that replaces a zone's host records
pub const SET_HOSTS_COMMAND: &str = "namecheap.domains.dns.setHosts";

/// A parsed API response
#[derive(Debug)]
pub struct ApiResponse {
    root: XmlElement,
}

impl ApiResponse {
    /// Parse a raw response body
    pub fn parse(body: &str) -> Result<Self> {
        Ok(Self {
            root: parse_document(body)?,
        })
    }

    /// Value of the root `Status` attribute
    pub fn status(&self) -> Option<&str> {
        self.root.attribute("Status")
    }

    /// Interpret a getHosts response for `domain`
    ///
    /// Returns the zone's host records minus challenge TXT records, in
    /// provider order. The snapshot is only trusted when the response holds
    /// exactly one `DomainDNSGetHostsResult` for `domain` under a getHosts
    /// `CommandResponse` and that result has `IsUsingOurDNS="true"`.
    /// Anything else is an error: an empty snapshot written back would wipe
    /// the zone.
    pub fn into_hosts(self, domain: &str) -> Result<Vec<HostRecord>> {
        let mut results = Vec::new();

        for element in &self.root.children {
            match element.name.as_str() {
                "Errors" | "Warnings" => log_diagnostics(element),
                "CommandResponse" => {
                    if element.attribute("Type") != Some(GET_HOSTS_COMMAND) {
                        tracing::warn!(
                            "Skipping CommandResponse of type {:?}",
                            element.attribute("Type")
                        );
                        continue;
                    }

                    results.extend(
                        element
                            .children_named("DomainDNSGetHostsResult")
                            .filter(|result| matches_domain(result, domain)),
                    );
                }
                _ => {}
            }
        }

        self.ensure_ok()?;

        let result = match results.as_slice() {
            [result] => *result,
            [] => {
                tracing::error!("Response holds no getHosts result for {}, aborting", domain);
                return Err(Error::not_delegated(domain));
            }
            _ => {
                return Err(Error::parse(format!(
                    "response holds {} getHosts results for {}",
                    results.len(),
                    domain
                )));
            }
        };

        if result.attribute("IsUsingOurDNS") != Some("true") {
            tracing::error!(
                "{} is not using the provider's DNS (IsUsingOurDNS={:?})",
                domain,
                result.attribute("IsUsingOurDNS")
            );
            return Err(Error::not_delegated(domain));
        }

        let mut hosts = Vec::new();
        for host in result.children_named("host") {
            if is_challenge_host(host) {
                tracing::debug!(
                    "Dropping challenge record {:?} from snapshot",
                    host.attribute("Name")
                );
                continue;
            }
            hosts.push(host_record(host)?);
        }

        Ok(hosts)
    }

    /// Interpret a setHosts response for `domain`
    pub fn confirm_set(self, domain: &str) -> Result<()> {
        for element in &self.root.children {
            match element.name.as_str() {
                "Errors" | "Warnings" => log_diagnostics(element),
                "CommandResponse" if element.attribute("Type") == Some(SET_HOSTS_COMMAND) => {
                    let rejected = element
                        .children_named("DomainDNSSetHostsResult")
                        .filter(|result| matches_domain(result, domain))
                        .any(|result| {
                            result
                                .attribute("IsSuccess")
                                .is_some_and(|success| success != "true")
                        });

                    if rejected {
                        return Err(Error::api_status(format!(
                            "setHosts for {} reported IsSuccess other than true",
                            domain
                        )));
                    }
                }
                _ => {}
            }
        }

        self.ensure_ok()
    }

    fn ensure_ok(&self) -> Result<()> {
        match self.status() {
            Some("OK") => Ok(()),
            other => {
                tracing::error!("Received non-OK status from provider API, aborting");
                Err(Error::api_status(other.unwrap_or("<missing>").to_string()))
            }
        }
    }
}

/// Log each child of an `Errors`/`Warnings` element
fn log_diagnostics(element: &XmlElement) {
    let name = element.name.as_str();
    let severity = name.strip_suffix('s').unwrap_or(name).to_uppercase();

    for diagnostic in &element.children {
        let number = diagnostic.attribute("Number").unwrap_or("-");
        if severity == "ERROR" {
            tracing::error!(
                severity = %severity,
                number = %number,
                "Provider API reported \"{}\"",
                diagnostic.content
            );
        } else {
            tracing::warn!(
                severity = %severity,
                number = %number,
                "Provider API reported \"{}\"",
                diagnostic.content
            );
        }
    }
}

fn matches_domain(result: &XmlElement, domain: &str) -> bool {
    result
        .attribute("Domain")
        .is_some_and(|d| d.eq_ignore_ascii_case(domain))
}

fn is_challenge_host(host: &XmlElement) -> bool {
    host.attribute("Type") == Some("TXT")
        && host
            .attribute("Name")
            .is_some_and(|name| name.starts_with(CHALLENGE_PREFIX))
}

/// Build a HostRecord from a `host` element's attributes
fn host_record(host: &XmlElement) -> Result<HostRecord> {
    let mx_pref = match host.attribute("MXPref") {
        Some(_) => numeric(host, "MXPref")?,
        None => DEFAULT_MX_PREF,
    };

    Ok(HostRecord {
        name: required(host, "Name")?.to_string(),
        record_type: required(host, "Type")?.to_string(),
        address: required(host, "Address")?.to_string(),
        mx_pref,
        ttl: numeric(host, "TTL")?,
    })
}

fn required<'a>(host: &'a XmlElement, key: &str) -> Result<&'a str> {
    host.attribute(key)
        .ok_or_else(|| Error::parse(format!("host record is missing the {} attribute", key)))
}

fn numeric(host: &XmlElement, key: &str) -> Result<u32> {
    let value = required(host, key)?;
    value.trim().parse().map_err(|_| {
        Error::parse(format!(
            "host record attribute {} is not a number: '{}'",
            key, value
        ))
    })
}
