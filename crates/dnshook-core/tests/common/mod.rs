//! Test doubles and common utilities for contract tests
//!
//! The doubles hold a full zone (challenge records included) and honor the
//! [`ZoneProvider`] contract by stripping challenge TXT records on fetch.

#![allow(dead_code)]

use dnshook_core::error::{Error, Result};
use dnshook_core::traits::{IpSource, ZoneProvider};
use dnshook_core::HostRecord;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory provider that records every set-call payload
pub struct RecordingZoneProvider {
    /// Zone as the provider stores it
    zone: Arc<Mutex<Vec<HostRecord>>>,
    /// Payload of every set_hosts() call
    set_calls: Arc<Mutex<Vec<Vec<HostRecord>>>>,
    /// Call counter for get_hosts()
    get_call_count: Arc<AtomicUsize>,
    /// Error returned by get_hosts() instead of the zone
    fail_get_with: Option<fn(&str) -> Error>,
}

impl RecordingZoneProvider {
    pub fn new(zone: Vec<HostRecord>) -> Self {
        Self {
            zone: Arc::new(Mutex::new(zone)),
            set_calls: Arc::new(Mutex::new(Vec::new())),
            get_call_count: Arc::new(AtomicUsize::new(0)),
            fail_get_with: None,
        }
    }

    /// Make get_hosts() fail with the error built by `error`
    pub fn failing_get(mut self, error: fn(&str) -> Error) -> Self {
        self.fail_get_with = Some(error);
        self
    }

    /// Create a provider that shares zone and counters with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            zone: Arc::clone(&other.zone),
            set_calls: Arc::clone(&other.set_calls),
            get_call_count: Arc::clone(&other.get_call_count),
            fail_get_with: other.fail_get_with,
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> Vec<Vec<HostRecord>> {
        self.set_calls.lock().unwrap().clone()
    }

    pub fn zone(&self) -> Vec<HostRecord> {
        self.zone.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ZoneProvider for RecordingZoneProvider {
    async fn get_hosts(&self, domain: &str) -> Result<Vec<HostRecord>> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.fail_get_with {
            return Err(error(domain));
        }

        Ok(self
            .zone
            .lock()
            .unwrap()
            .iter()
            .filter(|record| !record.is_challenge())
            .cloned()
            .collect())
    }

    async fn set_hosts(&self, _domain: &str, hosts: &[HostRecord]) -> Result<()> {
        self.set_calls.lock().unwrap().push(hosts.to_vec());
        *self.zone.lock().unwrap() = hosts.to_vec();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// IP source that counts lookups and can fail a number of times first
pub struct CountingIpSource {
    ip: Ipv4Addr,
    failures_left: Arc<AtomicUsize>,
    call_count: Arc<AtomicUsize>,
}

impl CountingIpSource {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self::failing_first(ip, 0)
    }

    pub fn failing_first(ip: Ipv4Addr, failures: usize) -> Self {
        Self {
            ip,
            failures_left: Arc::new(AtomicUsize::new(failures)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a source that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            failures_left: Arc::clone(&other.failures_left),
            call_count: Arc::clone(&other.call_count),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for CountingIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if failing {
            return Err(Error::resolve("lookup service unreachable"));
        }

        Ok(self.ip)
    }
}

/// Zone with two ordinary records and one stale challenge record
pub fn sample_zone() -> Vec<HostRecord> {
    vec![
        HostRecord::new("@", "A", "192.0.2.10", 1800),
        HostRecord::new("@", "MX", "mail.example.com.", 3600).with_mx_pref(5),
        HostRecord::new("_acme-challenge.sub", "TXT", "stale-token", 1800),
    ]
}
