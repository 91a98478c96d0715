//! Integration test exercising the real master-file parser end to end:
//! reading `tests/zones/minimal.zone` through `zone_source::file::FileSource`
//! and reassembling it into owner-groups via the real `hickory-proto`
//! decoder, matching spec.md §8 scenario 1's "minimal good zone, file
//! source" setup (signature verification itself is covered at the
//! `verifier` unit-test level, where canonical rdata helpers are in scope).

use dnssec_audit::error::Error;
use dnssec_audit::model::{Name, RrType};
use dnssec_audit::zone_source::file::FileSource;
use dnssec_audit::zone_source::ZoneSource;

fn fixture_path() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/zones/minimal.zone").to_string()
}

#[test]
fn file_source_reassembles_apex_and_child_owner_groups() {
    let mut source = FileSource::new(4, true);
    source.start(&fixture_path()).expect("fixture zone should parse");

    let mut groups = Vec::new();
    loop {
        match source.next_group() {
            Ok(g) => groups.push(g),
            Err(Error::LoadingDone) => break,
            Err(e) => panic!("unexpected error draining fixture zone: {}", e),
        }
    }

    assert_eq!(source.apex(), Some(&Name::new("example.com")));
    assert!(source.soa().is_some());

    let apex_group = groups.iter().find(|g| g.owner == Name::new("example.com")).expect("apex group present");
    assert!(!apex_group.records_of(RrType::Soa).is_empty());
    assert!(!apex_group.records_of(RrType::Ns).is_empty());

    let ns_group = groups.iter().find(|g| g.owner == Name::new("ns1.example.com")).expect("glue group present");
    assert!(!ns_group.records_of(RrType::A).is_empty());

    let www_group = groups.iter().find(|g| g.owner == Name::new("www.example.com")).expect("www group present");
    assert!(!www_group.records_of(RrType::A).is_empty());
    assert!(!www_group.has_ns_only());
}

#[test]
fn missing_file_is_reported_as_file_error() {
    let mut source = FileSource::new(1, false);
    let err = source.start("/nonexistent/path/for/this/test.zone").unwrap_err();
    assert!(matches!(err, Error::FileError { .. }));
}
