//! DNSSEC zone configuration auditor
//!
//! Streams the resource records of a zone (from a master file or a full
//! zone transfer), reconstructs a chain of trust against configured
//! anchors, and reports configuration defects: RRSIG validity, DNSKEY
//! algorithm coverage, NSEC/NSEC3 denial-of-existence correctness, TTL
//! policy, and DS-at-parent consistency.
//!
//! # Architecture
//!
//! * `model` - domain name, resource record and rdata types
//! * `wire` - translation between the external DNS wire codec and `model`
//! * `time_oracle` - pluggable reference-time source for RRSIG checks
//! * `stats` - named occurrence counters used for usage reporting
//! * `owner_group` - streaming reassembly of same-owner record sets
//! * `serial_gate` - persisted last-seen SOA serial numbers
//! * `resolver_pool` - ordered, fail-over-capable resolver address list
//! * `chain_of_trust` - recursive DNSKEY/DS chain-of-trust resolution
//! * `verifier` - per-owner-group policy checks
//! * `zone_source` - zone master file and AXFR record sources
//! * `anchors` - trust anchor set loading
//! * `config` - CLI and INI configuration parsing
//! * `error` - the crate's error taxonomy
//! * `report` - severity-tagged finding sink
//! * `pipeline` - per-zone orchestration

pub mod anchors;
pub mod chain_of_trust;
pub mod config;
pub mod error;
pub mod model;
pub mod owner_group;
pub mod pipeline;
pub mod report;
pub mod resolver_pool;
pub mod serial_gate;
pub mod stats;
pub mod time_oracle;
pub mod verifier;
pub mod wire;
pub mod zone_source;
