//! Trust Anchor Set loading.
//!
//! Grounded on `init_trust_anchors`/`load_trust_anchors` in
//! `examples/original_source/tests/application/ZoneChecker.py`: a root
//! anchor file named `ds-root` is always read in addition to any
//! zone-specific anchor files passed via `--anchor`/`trust=`. Each
//! anchor file holds one DNSKEY or DS RR in zone master-file
//! presentation format.

use crate::model::{Name, Rdata, Rr};
use crate::report::Sink;
use crate::wire;
use std::io::Write;
use std::path::Path;

pub const ROOT_ANCHOR_FILE: &str = "ds-root";

/// Unordered set of DNSKEY/DS RRs used as roots of trust for a zone
/// pass. Constructed once per zone (root anchor + zone-specific files),
/// consumed by the Chain-of-Trust Resolver.
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorSet {
    anchors: Vec<Rr>,
}

impl TrustAnchorSet {
    pub fn new() -> Self {
        TrustAnchorSet { anchors: Vec::new() }
    }

    pub fn push(&mut self, rr: Rr) {
        self.anchors.push(rr);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rr> {
        self.anchors.iter()
    }

    /// All DNSKEY anchors whose owner equals `domain` -- consulted by
    /// the Chain-of-Trust Resolver's final union step (spec §4.7).
    pub fn dnskeys_for(&self, domain: &Name) -> impl Iterator<Item = &Rr> {
        self.anchors.iter().filter(move |rr| {
            rr.owner == *domain && matches!(rr.rdata, Rdata::Dnskey(_))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

fn read_anchor_file(path: &str) -> Option<Rr> {
    if !Path::new(path).exists() {
        return None;
    }
    let text = std::fs::read_to_string(path).ok()?;
    wire::parse_single_rr(text.trim())
}

/// Builds a fresh `TrustAnchorSet` for one zone: the root anchor
/// (`ds-root`, missing or unreadable logs ERROR but is not fatal) plus
/// every file in `extra`.
pub fn load<W: Write>(extra: &[String], sink: &mut Sink<W>) -> TrustAnchorSet {
    let mut set = TrustAnchorSet::new();

    match read_anchor_file(ROOT_ANCHOR_FILE) {
        Some(rr) => {
            set.push(rr);
            sink.debug("Root trust anchor loaded.");
        }
        None => sink.error(format!("Could not read the root trust anchor from file \"{}\".", ROOT_ANCHOR_FILE)),
    }

    for path in extra {
        match read_anchor_file(path) {
            Some(rr) => set.push(rr),
            None => sink.error(format!("No trust anchor was read from file \"{}\".", path)),
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DnskeyRdata, RrClass, RrType};

    fn dnskey_rr(owner: &str, flags: u16) -> Rr {
        Rr {
            owner: Name::new(owner),
            rr_type: RrType::Dnskey,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::Dnskey(DnskeyRdata { flags, protocol: 3, algorithm: 8, public_key: vec![1, 2, 3] }),
        }
    }

    #[test]
    fn dnskeys_for_filters_by_owner_and_type() {
        let mut set = TrustAnchorSet::new();
        set.push(dnskey_rr("example.com", 257));
        set.push(dnskey_rr("other.com", 257));
        let matches: Vec<_> = set.dnskeys_for(&Name::new("example.com")).collect();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn empty_set_reports_empty() {
        assert!(TrustAnchorSet::new().is_empty());
    }
}
