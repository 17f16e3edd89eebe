//! Test doubles for provider contract tests
//!
//! [`ScriptedTransport`] answers each POST with the next scripted body and
//! records every form it was sent.

#![allow(dead_code)]

use dnshook_core::error::{Error, Result};
use dnshook_core::traits::{IpSource, Transport};
use dnshook_core::{ChallengeEngine, HostRecord, IpResolver};
use dnshook_provider_namecheap::NamecheapProvider;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CLIENT_IP: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 55);
pub const ENDPOINT: &str = "https://api.sandbox.namecheap.com/xml.response";

/// Transport that replays scripted responses
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a transport that shares script and records with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            responses: Arc::clone(&other.responses),
            requests: Arc::clone(&other.requests),
            call_count: Arc::clone(&other.call_count),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Form of the n-th request (0-based)
    pub fn form(&self, n: usize) -> Vec<(String, String)> {
        self.requests.lock().unwrap()[n].1.clone()
    }

    /// Endpoint of the n-th request (0-based)
    pub fn endpoint(&self, n: usize) -> String {
        self.requests.lock().unwrap()[n].0.clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, endpoint: &str, form: &[(String, String)]) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), form.to_vec()));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no scripted response left")))
    }
}

/// IP source that always fails
pub struct UnreachableIpSource;

#[async_trait::async_trait]
impl IpSource for UnreachableIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        Err(Error::resolve("lookup service unreachable"))
    }
}

/// Provider over `transport` with a fixed client IP
pub fn provider(transport: &ScriptedTransport, dry_run: bool) -> NamecheapProvider {
    NamecheapProvider::new(
        "apiuser",
        "apikey",
        ENDPOINT,
        IpResolver::fixed(CLIENT_IP),
        Box::new(ScriptedTransport::sharing_state_with(transport)),
        dry_run,
    )
    .expect("provider construction succeeds")
}

/// Engine over a provider over `transport`
pub fn engine(transport: &ScriptedTransport) -> ChallengeEngine {
    ChallengeEngine::new(Box::new(provider(transport, false)))
}

/// Value of a form field
pub fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Host records encoded in the numbered fields of a setHosts form
pub fn hosts_in(form: &[(String, String)]) -> Vec<HostRecord> {
    let mut hosts = Vec::new();
    let mut n = 1;

    while let Some(name) = field(form, &format!("HostName{}", n)) {
        hosts.push(HostRecord {
            name: name.to_string(),
            record_type: field(form, &format!("RecordType{}", n)).unwrap().to_string(),
            address: field(form, &format!("Address{}", n)).unwrap().to_string(),
            mx_pref: field(form, &format!("MXPref{}", n)).unwrap().parse().unwrap(),
            ttl: field(form, &format!("TTL{}", n)).unwrap().parse().unwrap(),
        });
        n += 1;
    }

    hosts
}

/// A getHosts response body
pub fn get_hosts_body(domain: &str, using_our_dns: &str, hosts: &[HostRecord]) -> String {
    let host_elements: String = hosts
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                r#"<host HostId="{}" Name="{}" Type="{}" Address="{}" MXPref="{}" TTL="{}" AssociatedAppTitle="" FriendlyName="" IsActive="true" IsDDNSEnabled="false" />"#,
                i + 1,
                h.name,
                h.record_type,
                h.address,
                h.mx_pref,
                h.ttl
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <Warnings />
  <RequestedCommand>namecheap.domains.dns.gethosts</RequestedCommand>
  <CommandResponse Type="namecheap.domains.dns.getHosts">
    <DomainDNSGetHostsResult Domain="{}" EmailType="MX" IsUsingOurDNS="{}">{}</DomainDNSGetHostsResult>
  </CommandResponse>
  <Server>PHX01SBAPIEXT05</Server>
  <GMTTimeDifference>--4:00</GMTTimeDifference>
  <ExecutionTime>0.011</ExecutionTime>
</ApiResponse>"#,
        domain, using_our_dns, host_elements
    )
}

/// A successful setHosts response body
pub fn set_hosts_ok_body(domain: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
  <Errors />
  <Warnings />
  <RequestedCommand>namecheap.domains.dns.setHosts</RequestedCommand>
  <CommandResponse Type="namecheap.domains.dns.setHosts">
    <DomainDNSSetHostsResult Domain="{}" IsSuccess="true">
      <Warnings />
    </DomainDNSSetHostsResult>
  </CommandResponse>
  <Server>PHX01SBAPIEXT05</Server>
  <ExecutionTime>0.498</ExecutionTime>
</ApiResponse>"#,
        domain
    )
}

/// A response with a non-OK status and one error entry
pub fn error_body(message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<ApiResponse Status="ERROR" xmlns="http://api.namecheap.com/xml.response">
  <Errors>
    <Error Number="1011150">{}</Error>
  </Errors>
  <Warnings />
  <RequestedCommand />
  <Server>PHX01SBAPIEXT05</Server>
</ApiResponse>"#,
        message
    )
}

/// Two ordinary records and one stale challenge record
pub fn sample_zone() -> Vec<HostRecord> {
    vec![
        HostRecord::new("@", "A", "192.0.2.10", 1800),
        HostRecord::new("www", "CNAME", "example.com.", 1800),
        HostRecord::new("_acme-challenge.sub", "TXT", "stale-token", 1800),
    ]
}
