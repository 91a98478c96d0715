//! Recursive chain-of-trust resolution: given a domain and a seed set of
//! trusted keys/DS records, climbs toward the configured anchor,
//! fetching DNSKEY/DS through the resolver pool as needed.
//!
//! Grounded on `__get_valid_keys` in
//! `examples/original_source/tests/application/ZoneChecker.py`. Unlike
//! the original, each recursion level keeps its own local `status`/key
//! set rather than reusing a shared mutable variable across levels --
//! ownership makes the original's variable-reuse pattern (see spec.md
//! §4.7 "Policy: at most one recursion per level") impossible to express
//! by accident.

use crate::model::{DnskeyRdata, DsRdata, Name, Rr};
use ring::digest;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStatus {
    Ok,
    NoTrustedKey,
    NoTrustedDs,
}

/// The validated DNSKEY set for one domain, keyed by key tag for RRSIG
/// lookups during per-group verification.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    by_tag: HashMap<u16, DnskeyRdata>,
}

impl KeySet {
    pub fn new() -> Self {
        KeySet { by_tag: HashMap::new() }
    }

    pub fn insert(&mut self, key: DnskeyRdata) {
        self.by_tag.insert(key.key_tag(), key);
    }

    pub fn get(&self, key_tag: u16) -> Option<&DnskeyRdata> {
        self.by_tag.get(&key_tag)
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DnskeyRdata> {
        self.by_tag.values()
    }

    fn extend(&mut self, other: &KeySet) {
        for k in other.by_tag.values() {
            self.insert(k.clone());
        }
    }
}

/// A single query capability the resolver pool exposes to this module.
/// Kept as a trait so tests can stub DNSKEY/DS answers without a live
/// resolver; `resolver_pool::ResolverPool` + the wire adapter implement
/// the real version in the pipeline.
pub trait TrustQuery {
    fn query_dnskey(&mut self, domain: &Name) -> Option<Vec<Rr>>;
    fn query_ds(&mut self, domain: &Name) -> Option<Vec<Rr>>;
}

fn sha256_digest(data: &[u8]) -> Vec<u8> {
    digest::digest(&digest::SHA256, data).as_ref().to_vec()
}

fn sha1_digest(data: &[u8]) -> Vec<u8> {
    use sha1::{Digest, Sha1};
    Sha1::digest(data).to_vec()
}

/// Computes the digest of `name || dnskey_rdata` per RFC 4034 §5.1.4 for
/// the DS digest types this auditor supports (1=SHA-1, 2=SHA-256).
fn ds_digest(owner: &Name, key: &DnskeyRdata, digest_type: u8) -> Option<Vec<u8>> {
    let mut wire = Vec::new();
    wire.extend_from_slice(&crate::model::wire_name_lower(owner));
    wire.extend_from_slice(&key.flags.to_be_bytes());
    wire.push(key.protocol);
    wire.push(key.algorithm);
    wire.extend_from_slice(&key.public_key);

    match digest_type {
        1 => Some(sha1_digest(&wire)),
        2 => Some(sha256_digest(&wire)),
        _ => None,
    }
}

/// True iff `key` at `owner` matches `ds` under `ds.digest_type`.
pub fn ds_matches_key(owner: &Name, ds: &DsRdata, key: &DnskeyRdata) -> bool {
    if ds.algorithm != key.algorithm || ds.key_tag != key.key_tag() {
        return false;
    }
    ds_digest(owner, key, ds.digest_type).map(|d| d == ds.digest).unwrap_or(false)
}

/// Selects, from `candidates`, the keys validated by `seed`: DNSKEYs
/// that are themselves present in a DNSKEY seed, or DNSKEYs matched by a
/// DS seed.
fn validate_against_seed(owner: &Name, candidates: &[Rr], seed: &[Rr]) -> KeySet {
    let mut out = KeySet::new();
    let candidate_keys: Vec<&DnskeyRdata> = candidates.iter().filter_map(|rr| match &rr.rdata {
        crate::model::Rdata::Dnskey(k) => Some(k),
        _ => None,
    }).collect();

    for seed_rr in seed {
        match &seed_rr.rdata {
            crate::model::Rdata::Dnskey(seed_key) => {
                for k in &candidate_keys {
                    if k.key_tag() == seed_key.key_tag() && k.public_key == seed_key.public_key {
                        out.insert((*k).clone());
                    }
                }
            }
            crate::model::Rdata::Ds(ds) => {
                for k in &candidate_keys {
                    if ds_matches_key(owner, ds, k) {
                        out.insert((*k).clone());
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// Implements spec.md §4.7 in full.
pub fn resolve(query: &mut dyn TrustQuery, domain: &Name, seed: &[Rr]) -> (ChainStatus, KeySet) {
    if let Some(candidates) = query.query_dnskey(domain) {
        let validated = validate_against_seed(domain, &candidates, seed);
        if !validated.is_empty() {
            return (ChainStatus::Ok, validated);
        }
    }

    if domain.is_root() {
        return (ChainStatus::NoTrustedKey, KeySet::new());
    }

    let parent = domain.parent();
    let (parent_status, parent_keys) = resolve(query, &parent, seed);
    if parent_keys.is_empty() {
        let _ = parent_status;
        return (ChainStatus::NoTrustedKey, KeySet::new());
    }

    let ds_candidates = match query.query_ds(domain) {
        Some(rrs) => rrs,
        None => return (ChainStatus::NoTrustedDs, KeySet::new()),
    };

    let ds_seed: Vec<Rr> = ds_candidates;
    let dnskey_candidates = match query.query_dnskey(domain) {
        Some(rrs) => rrs,
        None => return (ChainStatus::NoTrustedDs, KeySet::new()),
    };
    let via_ds = validate_against_seed(domain, &dnskey_candidates, &ds_seed);
    if via_ds.is_empty() {
        return (ChainStatus::NoTrustedDs, KeySet::new());
    }

    resolve(query, domain, &dnskey_candidates.into_iter().filter(|rr| {
        matches!(&rr.rdata, crate::model::Rdata::Dnskey(k) if via_ds.get(k.key_tag()).is_some())
    }).collect::<Vec<_>>())
}

/// The expected `(algorithm, flags)` pairs covering every DNSKEY in
/// `keys`, used by the verifier's algorithm-coverage check.
pub fn expected_algorithms(keys: &KeySet) -> Vec<(u8, u16)> {
    let mut v: Vec<(u8, u16)> = keys.iter().map(|k| (k.algorithm, k.flags)).collect();
    v.sort_unstable();
    v.dedup();
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rdata, RrClass, RrType};

    fn dnskey_rr(owner: &str, flags: u16, key: Vec<u8>) -> Rr {
        Rr {
            owner: Name::new(owner),
            rr_type: RrType::Dnskey,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::Dnskey(DnskeyRdata { flags, protocol: 3, algorithm: 8, public_key: key }),
        }
    }

    struct StubQuery {
        dnskeys: HashMap<String, Vec<Rr>>,
    }

    impl TrustQuery for StubQuery {
        fn query_dnskey(&mut self, domain: &Name) -> Option<Vec<Rr>> {
            self.dnskeys.get(domain.as_str()).cloned()
        }
        fn query_ds(&mut self, _domain: &Name) -> Option<Vec<Rr>> {
            None
        }
    }

    #[test]
    fn self_signing_zone_resolves_ok_with_matching_anchor() {
        let apex = Name::new("example.com");
        let key = dnskey_rr("example.com", 257, vec![9, 9, 9]);
        let mut dnskeys = HashMap::new();
        dnskeys.insert(apex.as_str().to_string(), vec![key.clone()]);
        let mut q = StubQuery { dnskeys };

        let (status, keys) = resolve(&mut q, &apex, &[key]);
        assert_eq!(status, ChainStatus::Ok);
        assert!(!keys.is_empty());
    }

    #[test]
    fn no_matching_anchor_and_no_parent_yields_no_trusted_key() {
        let apex = Name::new("example.com");
        let other_key = dnskey_rr("example.com", 257, vec![1]);
        let anchor = dnskey_rr("example.com", 257, vec![2]);
        let mut dnskeys = HashMap::new();
        dnskeys.insert(apex.as_str().to_string(), vec![other_key]);
        let mut q = StubQuery { dnskeys };

        let (status, keys) = resolve(&mut q, &apex, &[anchor]);
        assert_eq!(status, ChainStatus::NoTrustedKey);
        assert!(keys.is_empty());
    }

    #[test]
    fn ds_matches_key_checks_algorithm_tag_and_digest() {
        let owner = Name::new("example.com");
        let key = DnskeyRdata { flags: 257, protocol: 3, algorithm: 8, public_key: vec![1, 2, 3] };
        let digest = ds_digest(&owner, &key, 2).unwrap();
        let ds = DsRdata { key_tag: key.key_tag(), algorithm: 8, digest_type: 2, digest };
        assert!(ds_matches_key(&owner, &ds, &key));

        let mut wrong = ds.clone();
        wrong.algorithm = 13;
        assert!(!ds_matches_key(&owner, &wrong, &key));
    }

    #[test]
    fn expected_algorithms_dedups_and_sorts() {
        let mut keys = KeySet::new();
        keys.insert(DnskeyRdata { flags: 256, protocol: 3, algorithm: 8, public_key: vec![1] });
        keys.insert(DnskeyRdata { flags: 256, protocol: 3, algorithm: 8, public_key: vec![2] });
        keys.insert(DnskeyRdata { flags: 257, protocol: 3, algorithm: 13, public_key: vec![3] });
        let expected = expected_algorithms(&keys);
        assert!(expected.contains(&(8, 256)));
        assert!(expected.contains(&(13, 257)));
    }
}
