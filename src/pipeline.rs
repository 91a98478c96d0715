//! Per-zone orchestration: resolver preparation, trust anchor loading,
//! group pumping, check dispatch, and end-of-zone statistics.
//!
//! Grounded in full on `main()` in
//! `examples/original_source/tests/application/Main.py`.

use crate::anchors::{self, TrustAnchorSet};
use crate::chain_of_trust::{self, ChainStatus, KeySet, TrustQuery};
use crate::config::{Config, ZoneParams};
use crate::error::Error;
use crate::model::{Group, Name, Rr};
use crate::report::Sink;
use crate::resolver_pool::ResolverPool;
use crate::serial_gate::SerialGate;
use crate::time_oracle::TimeOracle;
use crate::verifier::{self, ZoneState};
use crate::zone_source::{axfr::AxfrSource, file::FileSource, ZoneSource};
use hickory_proto::rr::RecordType;
use std::io::Write;

/// Adapts a `ResolverPool` to the `TrustQuery` capability the
/// Chain-of-Trust Resolver needs, failing over across the pool exactly
/// as the auxiliary DS lookup in `verify_ds_records` does.
struct PoolTrustQuery<'a> {
    pool: &'a mut ResolverPool,
}

impl<'a> TrustQuery for PoolTrustQuery<'a> {
    fn query_dnskey(&mut self, domain: &Name) -> Option<Vec<Rr>> {
        crate::wire::query_rrtype(self.pool, domain, RecordType::DNSKEY)
    }

    fn query_ds(&mut self, domain: &Name) -> Option<Vec<Rr>> {
        crate::wire::query_rrtype(self.pool, domain, RecordType::DS)
    }
}

/// Host-default name server addresses, used when a zone specifies none
/// (spec.md §6 `--resolver` default). Falls back to localhost with a
/// WARNING, mirroring `Main.py`'s "No default resolver address
/// available" path, when the system configuration yields nothing.
fn default_resolvers<W: Write>(sink: &mut Sink<W>) -> Vec<String> {
    match hickory_resolver::system_conf::read_system_conf() {
        Ok((conf, _opts)) => {
            let ips: Vec<String> = conf.name_servers().iter().map(|ns| ns.socket_addr.ip().to_string()).collect();
            if ips.is_empty() {
                sink.warning("No default resolver address available. Setting to localhost (127.0.0.1).");
                vec!["127.0.0.1".to_string()]
            } else {
                ips
            }
        }
        Err(_) => {
            sink.warning("No default resolver address available. Setting to localhost (127.0.0.1).");
            vec!["127.0.0.1".to_string()]
        }
    }
}

/// Builds the DNSKEY set validated all the way up to a configured
/// anchor, unioning in any local anchor DNSKEY at `domain` per
/// spec.md §4.7's final step, and downgrading the chain status to a
/// report finding.
fn resolve_trusted_keys<W: Write>(
    pool: &mut ResolverPool,
    domain: &Name,
    anchor_rrs: &[Rr],
    anchors: &TrustAnchorSet,
    sink: &mut Sink<W>,
) -> KeySet {
    let mut query = PoolTrustQuery { pool };
    let (status, mut keys) = chain_of_trust::resolve(&mut query, domain, anchor_rrs);

    for rr in anchors.dnskeys_for(domain) {
        if let crate::model::Rdata::Dnskey(k) = &rr.rdata {
            keys.insert(k.clone());
        }
    }

    if !keys.is_empty() {
        if status != ChainStatus::Ok {
            sink.warning(format!("Chain of trust for {} required falling back to a local trust anchor.", domain));
        }
    } else {
        sink.critical(format!("No trusted keys available for {}. Disabling signature verification.", domain));
    }

    keys
}

fn build_resolver_pool<W: Write>(zone: &ZoneParams, sink: &mut Sink<W>) -> Result<ResolverPool, Error> {
    let mut pool = ResolverPool::new();
    let servers = if zone.resolver.is_empty() {
        default_resolvers(sink)
    } else {
        zone.resolver.clone()
    };
    pool.set_servers(&servers, zone.tsig.clone())?;
    Ok(pool)
}

/// Builds and starts the zone source named by `zone.source_type`,
/// returning it already positioned for `next_group` (spec.md §4.4: both
/// variants expose `start`/`next_group`/`soa`/`apex` behind one
/// capability set).
fn build_and_start_source(zone: &ZoneParams, pool: &mut ResolverPool) -> Result<Box<dyn ZoneSource>, Error> {
    match zone.source_type {
        crate::config::SourceType::File => {
            let mut source = FileSource::new(zone.buffer_size, zone.buffer_warn);
            source.start(&zone.source)?;
            Ok(Box::new(source))
        }
        crate::config::SourceType::Axfr => {
            let mut source = AxfrSource::new(zone.buffer_size, zone.buffer_warn);
            source.start(&zone.source, pool)?;
            Ok(Box::new(source))
        }
    }
}

/// Runs one configured zone end-to-end, per spec.md §4.9. Recoverable
/// source errors (file/AXFR/resolver) abort the zone with a CRITICAL
/// finding rather than the process.
pub fn run_zone<W: Write>(zone: &ZoneParams, general_time: &str, sink: &mut Sink<W>) {
    let time_oracle = match TimeOracle::new(general_time) {
        Ok(o) => o,
        Err(e) => {
            sink.critical(format!("Invalid reference time: {}", e));
            return;
        }
    };

    let mut pool = match build_resolver_pool(zone, sink) {
        Ok(p) => p,
        Err(e) => {
            sink.critical(format!("{}", e));
            return;
        }
    };

    let mut source = match build_and_start_source(zone, &mut pool) {
        Ok(s) => s,
        Err(e) => {
            sink.critical(format!("{}", e));
            return;
        }
    };

    let first_group = match source.next_group() {
        Ok(g) => g,
        Err(Error::LoadingDone) => {
            sink.critical("No SOA record available. Skipping this source.");
            return;
        }
        Err(e) => {
            sink.critical(format!("{}", e));
            return;
        }
    };

    for w in source.take_warnings() {
        sink.warning(w);
    }

    let soa_rr = match source.soa() {
        Some(rr) => rr.clone(),
        None => {
            sink.critical("No SOA record available. Skipping this source.");
            return;
        }
    };
    let apex = source.apex().cloned().unwrap_or_else(|| soa_rr.owner.clone());

    let soa = match &soa_rr.rdata {
        crate::model::Rdata::Soa(s) => s.clone(),
        _ => {
            sink.critical("No SOA record available. Skipping this source.");
            return;
        }
    };

    if zone.sn_check {
        let gate = SerialGate::default_path();
        match gate.is_new(apex.as_str(), soa.serial, true) {
            Ok(false) => {
                sink.debug("Current serial number of the zone is not higher than the previous. Skipping this source.");
                return;
            }
            Ok(true) => {}
            Err(e) => {
                sink.critical(format!("{}", e));
                return;
            }
        }
    }

    let anchor_set = anchors::load(&zone.trust, sink);
    let anchor_rrs: Vec<Rr> = anchor_set.iter().cloned().collect();

    sink.info(format!("{:=^80}", format!(" Verification of source {} ", zone.name)));

    let mut zone_state = ZoneState::new(apex.clone());
    zone_state.set_soa(soa.clone());
    let mut trusted_keys: Option<KeySet> = None;
    let mut expected_algs: Vec<(u8, u16)> = Vec::new();

    let mut group = Some(first_group);
    loop {
        let g = match group.take() {
            Some(g) => g,
            None => break,
        };

        let stop = dispatch_group(&g, zone, &apex, &mut zone_state, &mut trusted_keys, &mut expected_algs, &anchor_rrs, &anchor_set, &mut pool, &time_oracle, sink);
        if stop {
            break;
        }

        group = match source.next_group() {
            Ok(g) => {
                for w in source.take_warnings() {
                    sink.warning(w);
                }
                Some(g)
            }
            Err(Error::LoadingDone) => None,
            Err(e) => {
                sink.critical(format!("{}", e));
                None
            }
        };
    }

    if zone.check_wanted("NSEC") {
        verifier::write_remaining_glue_errors(&zone_state, sink);
    }
    if zone.check_wanted("NSEC_S") && !zone_state.nsec3_presence_disabled {
        verifier::print_nsec_statistics(&zone_state.nsec_stats, sink);
    }
    if zone.check_wanted("RRSIG_S") {
        verifier::print_algorithm_statistics(&zone_state.alg_stats, sink);
    }
}

/// Dispatches every enabled check against one owner-group, lazily
/// building the apex trusted-key cache on first need (spec.md §3
/// "Trusted-Key Cache (per zone)"). Returns `true` when the zone pass
/// should stop early (the DS-only early-termination path, spec.md §4.8).
fn dispatch_group<W: Write>(
    group: &Group,
    zone: &ZoneParams,
    apex: &Name,
    zone_state: &mut ZoneState,
    trusted_keys: &mut Option<KeySet>,
    expected_algs: &mut Vec<(u8, u16)>,
    anchor_rrs: &[Rr],
    anchor_set: &TrustAnchorSet,
    pool: &mut ResolverPool,
    time_oracle: &TimeOracle,
    sink: &mut Sink<W>,
) -> bool {
    for w in group.warnings() {
        sink.warning(w.clone());
    }

    let is_apex = group.owner == *apex;

    if is_apex && group.nsec_kind() == crate::model::NsecKind::Nsec3 && !zone_state.nsec3_presence_disabled {
        zone_state.nsec3_presence_disabled = true;
        if zone.check_wanted("NSEC") {
            sink.warning("Zone appears to be secured with NSEC3. NSEC type records presence check will be disabled.");
        }
    }

    if is_apex && zone.check_wanted("DS") {
        let ds_rrs = crate::wire::query_rrtype(pool, apex, RecordType::DS).unwrap_or_default();
        let ds_rdata: Vec<crate::model::DsRdata> = ds_rrs.iter().filter_map(|rr| match &rr.rdata {
            crate::model::Rdata::Ds(ds) => Some(ds.clone()),
            _ => None,
        }).collect();
        verifier::verify_ds_records(group, &ds_rdata, sink);
        if zone.check_wanted_only("DS") {
            return true;
        }
    }

    if zone.check_wanted("RRSIG_T") && !zone.check_wanted("RRSIG") {
        verifier::verify_rrsig_times(group, time_oracle, sink);
    }

    if zone_state.has_trusted_keys && (zone.check_wanted("RRSIG") || zone.check_wanted("RRSIG_A")) {
        if trusted_keys.is_none() {
            let keys = resolve_trusted_keys(pool, apex, anchor_rrs, anchor_set, sink);
            *expected_algs = chain_of_trust::expected_algorithms(&keys);
            zone_state.has_trusted_keys = !keys.is_empty();
            *trusted_keys = Some(keys);
        }

        if let Some(keys) = trusted_keys.as_ref() {
            if zone.check_wanted("RRSIG") {
                verifier::verify_signatures(group, keys, apex, zone.check_wanted("RRSIG_T"), time_oracle, sink);
            }
            if zone.check_wanted("RRSIG_A") {
                verifier::verify_algorithm_coverage(group, expected_algs.as_slice(), sink);
            }
        }
    }

    if zone.check_wanted("NSEC_S") {
        verifier::log_nsec_usage(group, &mut zone_state.nsec_stats);
    }
    if zone.check_wanted("RRSIG_S") {
        verifier::log_algorithm_usage(group, &mut zone_state.alg_stats);
    }
    if zone.check_wanted("TTL") {
        verifier::verify_ttls(group, zone_state, time_oracle, sink);
    }
    if zone.check_wanted("NSEC") {
        verifier::verify_nsecs(group, zone_state, sink);
    }

    false
}

/// Runs every zone in `config`, in order (spec.md §5: "this crate's CLI
/// entry point processes zones sequentially"). Parse-time diagnostics
/// (unknown check tokens, partial TSIG specs) are flushed first, as
/// CRITICAL findings, per spec.md §6.
pub fn run<W: Write>(config: &Config, sink: &mut Sink<W>) {
    for w in &config.warnings {
        sink.critical(w.clone());
    }
    for zone in &config.zones {
        if !zone.enabled {
            continue;
        }
        run_zone(zone, &config.general.time, sink);
    }
}
