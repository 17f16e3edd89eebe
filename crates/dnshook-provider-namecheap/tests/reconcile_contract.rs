//! Contract Test: Wire-Level Reconciliation
//!
//! Constraints verified:
//! - setHosts carries every non-challenge record of the getHosts snapshot,
//!   numbered from 1 in snapshot order
//! - Deploy adds exactly one challenge TXT record per pair, stale ones go
//! - Clean writes back only the non-challenge records
//! - Every request carries the client identity and the split domain

mod common;

use common::*;
use dnshook_core::{ChallengeRequest, HostRecord};

#[tokio::test]
async fn deploy_sends_snapshot_plus_challenge() {
    let transport = ScriptedTransport::new(vec![
        Ok(get_hosts_body("example.com", "true", &sample_zone())),
        Ok(set_hosts_ok_body("example.com")),
    ]);
    let engine = engine(&transport);

    let request =
        ChallengeRequest::from_args(&["example.com", "sub.example.com", "tok"]).unwrap();
    let report = engine.deploy(&request).await.expect("deploy succeeds");

    assert_eq!(transport.call_count(), 2);
    assert_eq!(field(&transport.form(0), "Command"), Some("namecheap.domains.dns.getHosts"));
    assert_eq!(field(&transport.form(1), "Command"), Some("namecheap.domains.dns.setHosts"));

    assert_eq!(
        hosts_in(&transport.form(1)),
        vec![
            HostRecord::new("@", "A", "192.0.2.10", 1800),
            HostRecord::new("www", "CNAME", "example.com.", 1800),
            HostRecord::challenge("_acme-challenge.sub", "tok"),
        ]
    );
    assert_eq!(report.preserved, 2);
    assert_eq!(report.published, 1);
}

#[tokio::test]
async fn clean_sends_only_unrelated_records() {
    let zone = vec![
        HostRecord::new("@", "A", "192.0.2.10", 1800),
        HostRecord::challenge("_acme-challenge", "c1"),
        HostRecord::challenge("_acme-challenge.sub", "c2"),
    ];
    let transport = ScriptedTransport::new(vec![
        Ok(get_hosts_body("example.com", "true", &zone)),
        Ok(set_hosts_ok_body("example.com")),
    ]);
    let engine = engine(&transport);

    let request = ChallengeRequest::from_args(&["example.com", "example.com", "c1"]).unwrap();
    engine.clean(&request).await.expect("clean succeeds");

    assert_eq!(transport.call_count(), 2);
    assert_eq!(
        hosts_in(&transport.form(1)),
        vec![HostRecord::new("@", "A", "192.0.2.10", 1800)]
    );
}

#[tokio::test]
async fn non_challenge_txt_records_survive() {
    let zone = vec![
        HostRecord::new("@", "TXT", "v=spf1 -all", 1800),
        HostRecord::new("_dmarc", "TXT", "v=DMARC1; p=none", 1800),
        HostRecord::new("@", "MX", "mail.example.com.", 3600).with_mx_pref(5),
    ];
    let transport = ScriptedTransport::new(vec![
        Ok(get_hosts_body("example.com", "true", &zone)),
        Ok(set_hosts_ok_body("example.com")),
    ]);
    let engine = engine(&transport);

    let request = ChallengeRequest::from_args(&["example.com", "example.com", "c1"]).unwrap();
    engine.clean(&request).await.expect("clean succeeds");

    assert_eq!(hosts_in(&transport.form(1)), zone);
}

#[tokio::test]
async fn requests_carry_identity_and_split_domain() {
    let transport = ScriptedTransport::new(vec![
        Ok(get_hosts_body("example.co.uk", "true", &[])),
        Ok(set_hosts_ok_body("example.co.uk")),
    ]);
    let engine = engine(&transport);

    let request =
        ChallengeRequest::from_args(&["Example.CO.uk", "www.example.co.uk", "tok"]).unwrap();
    engine.deploy(&request).await.expect("deploy succeeds");

    for n in 0..2 {
        let form = transport.form(n);
        assert_eq!(transport.endpoint(n), ENDPOINT);
        assert_eq!(field(&form, "ClientIP"), Some("192.0.2.55"));
        assert_eq!(field(&form, "UserName"), Some("apiuser"));
        assert_eq!(field(&form, "ApiUser"), Some("apiuser"));
        assert_eq!(field(&form, "ApiKey"), Some("apikey"));
        assert_eq!(field(&form, "SLD"), Some("example"));
        assert_eq!(field(&form, "TLD"), Some("co.uk"));
    }

    assert_eq!(
        hosts_in(&transport.form(1)),
        vec![HostRecord::challenge("_acme-challenge.www", "tok")]
    );
}
