//! Domain name, resource record and rdata types.
//!
//! Grounded on `RRCollection` in
//! `examples/original_source/tests/application/ZoneChecker.py` for the
//! owner-group shape, and on the rdata struct naming in the teacher's
//! `dns::dnssec` module (`RrsigRecord`, `DnskeyRecord`, `DsRecord`,
//! `Nsec3Record`), though the fields here follow RFC 4034/5155 rather
//! than that module's signing-oriented layout.

use std::collections::HashMap;
use std::fmt;

/// A canonical, dot-terminated, lower-cased domain name. Comparisons and
/// hashing are case-insensitive by construction.
#[derive(Debug, Clone, Eq)]
pub struct Name(String);

impl Name {
    pub fn new(raw: &str) -> Self {
        let mut s = raw.to_ascii_lowercase();
        if !s.ends_with('.') {
            s.push('.');
        }
        Name(s)
    }

    pub fn root() -> Self {
        Name(".".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strips the leftmost label, returning the parent name. Returns the
    /// root unchanged if called on the root.
    pub fn parent(&self) -> Name {
        if self.is_root() {
            return self.clone();
        }
        match self.0.find('.') {
            Some(idx) if idx + 1 < self.0.len() => Name(self.0[idx + 1..].to_string()),
            _ => Name::root(),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for Name {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RrClass {
    In,
    Other(u16),
}

/// DNS RR type, extended with the DNSSEC types a general-purpose query
/// type enum (like the teacher's `QueryType`) omits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RrType {
    A,
    Aaaa,
    Ns,
    Cname,
    Soa,
    Mx,
    Txt,
    Dnskey,
    Rrsig,
    Ds,
    Nsec,
    Nsec3,
    Nsec3Param,
    Other(u16),
}

impl RrType {
    pub fn to_num(self) -> u16 {
        match self {
            RrType::A => 1,
            RrType::Ns => 2,
            RrType::Cname => 5,
            RrType::Soa => 6,
            RrType::Mx => 15,
            RrType::Txt => 16,
            RrType::Aaaa => 28,
            RrType::Nsec => 47,
            RrType::Dnskey => 48,
            RrType::Ds => 43,
            RrType::Rrsig => 46,
            RrType::Nsec3 => 50,
            RrType::Nsec3Param => 51,
            RrType::Other(n) => n,
        }
    }

    pub fn from_num(num: u16) -> RrType {
        match num {
            1 => RrType::A,
            2 => RrType::Ns,
            5 => RrType::Cname,
            6 => RrType::Soa,
            15 => RrType::Mx,
            16 => RrType::Txt,
            28 => RrType::Aaaa,
            47 => RrType::Nsec,
            48 => RrType::Dnskey,
            43 => RrType::Ds,
            46 => RrType::Rrsig,
            50 => RrType::Nsec3,
            51 => RrType::Nsec3Param,
            other => RrType::Other(other),
        }
    }

    /// Short uppercase mnemonic, used in report messages ("MX type not
    /// present in NSEC").
    pub fn mnemonic(self) -> String {
        match self {
            RrType::Other(n) => format!("TYPE{}", n),
            other => format!("{:?}", other).to_uppercase(),
        }
    }
}

pub const KSK_FLAG: u16 = 257;
pub const ZSK_FLAG: u16 = 256;

#[derive(Debug, Clone)]
pub struct SoaRdata {
    pub mname: Name,
    pub rname: Name,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone)]
pub struct DnskeyRdata {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyRdata {
    pub fn is_ksk(&self) -> bool {
        self.flags == KSK_FLAG
    }

    /// RFC 4034 Appendix B key tag, used to match an RRSIG's `key_tag`
    /// against a candidate DNSKEY.
    pub fn key_tag(&self) -> u16 {
        let mut wire = Vec::with_capacity(4 + self.public_key.len());
        wire.extend_from_slice(&self.flags.to_be_bytes());
        wire.push(self.protocol);
        wire.push(self.algorithm);
        wire.extend_from_slice(&self.public_key);

        let mut ac: u32 = 0;
        for (i, &b) in wire.iter().enumerate() {
            if i % 2 == 0 {
                ac += (b as u32) << 8;
            } else {
                ac += b as u32;
            }
        }
        ac += (ac >> 16) & 0xFFFF;
        (ac & 0xFFFF) as u16
    }
}

#[derive(Debug, Clone)]
pub struct RrsigRdata {
    pub type_covered: RrType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: i64,
    pub signature_inception: i64,
    pub key_tag: u16,
    pub signer_name: Name,
    pub signature: Vec<u8>,
    /// The RRSIG RR's own wire TTL, distinct from the `original_ttl`
    /// rdata field (spec.md §4.8 TTL checks compare against both).
    pub rr_ttl: u32,
}

#[derive(Debug, Clone)]
pub struct DsRdata {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NsecRdata {
    pub next_name: Name,
    pub types: Vec<RrType>,
}

#[derive(Debug, Clone)]
pub struct Nsec3Rdata {
    pub hash_algorithm: u8,
    pub flags: u8,
    pub iterations: u16,
    pub salt: Vec<u8>,
    pub next_hashed_owner: Vec<u8>,
    pub types: Vec<RrType>,
}

#[derive(Debug, Clone)]
pub enum Rdata {
    A(std::net::Ipv4Addr),
    Aaaa(std::net::Ipv6Addr),
    Ns(Name),
    Cname(Name),
    Soa(SoaRdata),
    Mx { preference: u16, exchange: Name },
    Txt(Vec<u8>),
    Dnskey(DnskeyRdata),
    Rrsig(RrsigRdata),
    Ds(DsRdata),
    Nsec(NsecRdata),
    Nsec3(Nsec3Rdata),
    Nsec3Param { hash_algorithm: u8, flags: u8, iterations: u16, salt: Vec<u8> },
    Opaque(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Rr {
    pub owner: Name,
    pub rr_type: RrType,
    pub class: RrClass,
    pub ttl: u32,
    pub rdata: Rdata,
}

fn wire_name(n: &Name) -> Vec<u8> {
    wire_name_lower(n)
}

/// RFC 4034 §6.2 canonical wire-format name encoding: lower-case labels,
/// length-prefixed, root-terminated. `Name` is already lower-cased by
/// construction, but this is re-applied defensively since it also backs
/// the RFC 4034 §5.1.4 DS digest input, which must match bit-for-bit.
pub fn wire_name_lower(n: &Name) -> Vec<u8> {
    let mut out = Vec::new();
    for label in n.as_str().trim_end_matches('.').split('.') {
        if label.is_empty() {
            continue;
        }
        out.push(label.len() as u8);
        out.extend_from_slice(label.to_ascii_lowercase().as_bytes());
    }
    out.push(0);
    out
}

impl Rdata {
    /// RFC 4034 §3.1.8.1 canonical wire-format encoding of the rdata,
    /// for the record types this auditor signature-verifies. Types
    /// outside that set (anything carried only as `Opaque`) return
    /// `None`; callers skip cryptographic verification for those RRs
    /// rather than guessing at a wire form.
    pub fn to_wire(&self) -> Option<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Rdata::A(addr) => out.extend_from_slice(&addr.octets()),
            Rdata::Aaaa(addr) => out.extend_from_slice(&addr.octets()),
            Rdata::Ns(n) => out.extend(wire_name(n)),
            Rdata::Cname(n) => out.extend(wire_name(n)),
            Rdata::Mx { preference, exchange } => {
                out.extend_from_slice(&preference.to_be_bytes());
                out.extend(wire_name(exchange));
            }
            Rdata::Txt(bytes) => {
                for chunk in bytes.chunks(255) {
                    out.push(chunk.len() as u8);
                    out.extend_from_slice(chunk);
                }
            }
            Rdata::Soa(soa) => {
                out.extend(wire_name(&soa.mname));
                out.extend(wire_name(&soa.rname));
                out.extend_from_slice(&soa.serial.to_be_bytes());
                out.extend_from_slice(&soa.refresh.to_be_bytes());
                out.extend_from_slice(&soa.retry.to_be_bytes());
                out.extend_from_slice(&soa.expire.to_be_bytes());
                out.extend_from_slice(&soa.minimum.to_be_bytes());
            }
            Rdata::Dnskey(k) => {
                out.extend_from_slice(&k.flags.to_be_bytes());
                out.push(k.protocol);
                out.push(k.algorithm);
                out.extend_from_slice(&k.public_key);
            }
            Rdata::Ds(ds) => {
                out.extend_from_slice(&ds.key_tag.to_be_bytes());
                out.push(ds.algorithm);
                out.push(ds.digest_type);
                out.extend_from_slice(&ds.digest);
            }
            Rdata::Nsec(n) => {
                out.extend(wire_name(&n.next_name));
                out.extend(encode_type_bitmap(&n.types));
            }
            Rdata::Nsec3(n) => {
                out.push(n.hash_algorithm);
                out.push(n.flags);
                out.extend_from_slice(&n.iterations.to_be_bytes());
                out.push(n.salt.len() as u8);
                out.extend_from_slice(&n.salt);
                out.push(n.next_hashed_owner.len() as u8);
                out.extend_from_slice(&n.next_hashed_owner);
                out.extend(encode_type_bitmap(&n.types));
            }
            Rdata::Nsec3Param { hash_algorithm, flags, iterations, salt } => {
                out.push(*hash_algorithm);
                out.push(*flags);
                out.extend_from_slice(&iterations.to_be_bytes());
                out.push(salt.len() as u8);
                out.extend_from_slice(salt);
            }
            Rdata::Rrsig(_) | Rdata::Opaque(_) => return None,
        }
        Some(out)
    }
}

/// RFC 4034 §4.1.2 type-bitmap encoding, window block 0 only (sufficient
/// for the record sets a zone auditor expects to canonicalize; a type
/// numbered >= 256 falls outside this block and is omitted).
fn encode_type_bitmap(types: &[RrType]) -> Vec<u8> {
    let mut window = [0u8; 32];
    let mut present = false;
    for t in types {
        let n = t.to_num();
        if n < 256 {
            window[(n / 8) as usize] |= 1 << (7 - (n % 8));
            present = true;
        }
    }
    if !present {
        return Vec::new();
    }
    let last = window.iter().rposition(|&b| b != 0).unwrap_or(0);
    let mut out = vec![0u8, (last + 1) as u8];
    out.extend_from_slice(&window[..=last]);
    out
}

/// Classification of the single NSEC-family record a group may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NsecKind {
    NotSecured,
    Nsec,
    Nsec3,
    Other,
}

impl fmt::Display for NsecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NsecKind::NotSecured => "not secured",
            NsecKind::Nsec => "NSEC",
            NsecKind::Nsec3 => "NSEC3",
            NsecKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Types excluded from the `has_ns_only` glue-delegation test (spec §3).
const GLUE_EXCLUDED: [RrType; 4] = [RrType::Ds, RrType::Ns, RrType::Nsec, RrType::Nsec3];

/// All RRs sharing one owner name, reassembled by the owner-group buffer.
#[derive(Debug, Clone)]
pub struct Group {
    pub owner: Name,
    records: HashMap<RrType, Vec<Rr>>,
    record_order: Vec<RrType>,
    rrsigs: HashMap<RrType, Vec<RrsigRdata>>,
    rrsig_order: Vec<RrType>,
    nsec: Option<Rr>,
    nsec_kind: NsecKind,
    has_ns_only: bool,
    /// Populated when a second NSEC-family record arrives for this owner
    /// (spec.md §3 invariant (b): at most one is kept, duplicates log a
    /// warning); drained by the pipeline when the group is dispatched.
    warnings: Vec<String>,
}

impl Group {
    pub fn new(owner: Name) -> Self {
        Group {
            owner,
            records: HashMap::new(),
            record_order: Vec::new(),
            rrsigs: HashMap::new(),
            rrsig_order: Vec::new(),
            nsec: None,
            nsec_kind: NsecKind::NotSecured,
            has_ns_only: true,
            warnings: Vec::new(),
        }
    }

    /// Routes `rr` into the group. Mirrors `RRCollection.add` in
    /// `ZoneChecker.py`: RRSIGs file under their `type_covered`; NSEC and
    /// NSEC3 occupy the single NSEC-family slot (a second one logs a
    /// warning, handled by the caller since this type has no logger).
    pub fn add(&mut self, rr: Rr) {
        debug_assert_eq!(rr.owner, self.owner, "RR routed to wrong owner-group");

        match &rr.rdata {
            Rdata::Rrsig(sig) => {
                let tc = sig.type_covered;
                let mut sig = sig.clone();
                sig.rr_ttl = rr.ttl;
                if !self.rrsigs.contains_key(&tc) {
                    self.rrsig_order.push(tc);
                }
                self.rrsigs.entry(tc).or_default().push(sig);
            }
            Rdata::Nsec(_) => {
                if self.nsec.is_some() {
                    self.warnings.push(format!("{} - more than one NSEC-family record present, keeping the first.", self.owner));
                } else {
                    self.nsec = Some(rr);
                    self.nsec_kind = NsecKind::Nsec;
                }
            }
            Rdata::Nsec3(_) => {
                if self.nsec.is_some() {
                    self.warnings.push(format!("{} - more than one NSEC-family record present, keeping the first.", self.owner));
                } else {
                    self.nsec = Some(rr);
                    self.nsec_kind = NsecKind::Nsec3;
                }
            }
            _ => {
                if !GLUE_EXCLUDED.contains(&rr.rr_type) {
                    self.has_ns_only = false;
                }
                if !self.records.contains_key(&rr.rr_type) {
                    self.record_order.push(rr.rr_type);
                }
                self.records.entry(rr.rr_type).or_default().push(rr);
            }
        }
    }

    pub fn records_of(&self, rr_type: RrType) -> &[Rr] {
        self.records.get(&rr_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Types present in this group, excluding RRSIG/NSEC/NSEC3 (insertion order).
    pub fn record_types(&self) -> impl Iterator<Item = RrType> + '_ {
        self.record_order.iter().copied()
    }

    pub fn rrsigs_of(&self, type_covered: RrType) -> &[RrsigRdata] {
        self.rrsigs.get(&type_covered).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Types with at least one RRSIG, in insertion order.
    pub fn rrsig_types(&self) -> impl Iterator<Item = RrType> + '_ {
        self.rrsig_order.iter().copied()
    }

    pub fn nsec(&self) -> Option<&Rr> {
        self.nsec.as_ref()
    }

    pub fn nsec_kind(&self) -> NsecKind {
        self.nsec_kind
    }

    pub fn has_ns_only(&self) -> bool {
        self.has_ns_only
    }

    /// Diagnostics accumulated while routing RRs into this group (a
    /// duplicate NSEC-family record); the pipeline drains and forwards
    /// these to the report sink when the group is dispatched.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.rrsigs.is_empty() && self.nsec.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_rr(owner: &str) -> Rr {
        Rr {
            owner: Name::new(owner),
            rr_type: RrType::A,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::A(std::net::Ipv4Addr::new(192, 0, 2, 1)),
        }
    }

    fn ns_rr(owner: &str) -> Rr {
        Rr {
            owner: Name::new(owner),
            rr_type: RrType::Ns,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::Ns(Name::new("ns1.example.com")),
        }
    }

    #[test]
    fn name_is_canonical_and_case_insensitive() {
        assert_eq!(Name::new("Example.COM"), Name::new("example.com."));
    }

    #[test]
    fn parent_strips_leftmost_label() {
        assert_eq!(Name::new("www.example.com").parent(), Name::new("example.com"));
        assert_eq!(Name::new("com").parent(), Name::root());
        assert_eq!(Name::root().parent(), Name::root());
    }

    #[test]
    fn has_ns_only_true_for_glue_delegation_point() {
        let mut g = Group::new(Name::new("example.com"));
        g.add(ns_rr("example.com"));
        assert!(g.has_ns_only());
        g.add(a_rr("example.com"));
        assert!(!g.has_ns_only());
    }

    #[test]
    fn nsec_kind_derived_from_added_record() {
        let mut g = Group::new(Name::new("example.com"));
        assert_eq!(g.nsec_kind(), NsecKind::NotSecured);
        g.add(Rr {
            owner: Name::new("example.com"),
            rr_type: RrType::Nsec,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::Nsec(NsecRdata { next_name: Name::new("a.example.com"), types: vec![] }),
        });
        assert_eq!(g.nsec_kind(), NsecKind::Nsec);
    }

    #[test]
    fn key_tag_is_stable_for_same_key_material() {
        let k = DnskeyRdata { flags: ZSK_FLAG, protocol: 3, algorithm: 8, public_key: vec![1, 2, 3, 4, 5] };
        assert_eq!(k.key_tag(), k.key_tag());
    }

    #[test]
    fn duplicate_nsec_family_record_keeps_first_and_warns() {
        let mut g = Group::new(Name::new("example.com"));
        let nsec = |next: &str| Rr {
            owner: Name::new("example.com"),
            rr_type: RrType::Nsec,
            class: RrClass::In,
            ttl: 3600,
            rdata: Rdata::Nsec(NsecRdata { next_name: Name::new(next), types: vec![] }),
        };
        g.add(nsec("a.example.com"));
        g.add(nsec("b.example.com"));
        assert_eq!(g.warnings().len(), 1);
        assert!(g.warnings()[0].contains("more than one NSEC"));
        match &g.nsec().unwrap().rdata {
            Rdata::Nsec(n) => assert_eq!(n.next_name, Name::new("a.example.com")),
            _ => panic!("expected NSEC"),
        }
    }
}
