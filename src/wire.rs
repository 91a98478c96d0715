//! Translation between the external DNS wire codec (`hickory-proto`/
//! `hickory-client`) and this crate's domain model (`model.rs`), plus the
//! blocking-on-async shim used to drive the otherwise-synchronous
//! pipeline through `hickory-resolver`'s async API.
//!
//! Grounded on the teacher's choice (`src/bin/atlas.rs`) to host a
//! `tokio` runtime inside an otherwise-synchronous CLI process for async
//! calls it needs only incidentally.

use crate::model::{DnskeyRdata, DsRdata, Name as ModelName, Nsec3Rdata, NsecRdata, Rdata, Rr, RrClass, RrType, RrsigRdata, SoaRdata};
use hickory_proto::rr::rdata::{DNSKEY, DS, NSEC, NSEC3, NSEC3PARAM, SOA, SIG};
use hickory_proto::rr::{Name as ProtoName, RData, Record};
use hickory_proto::serialize::txt::Parser;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tokio::runtime::Runtime;

static RUNTIME: Lazy<Mutex<Runtime>> = Lazy::new(|| {
    Mutex::new(Runtime::new().expect("failed to start tokio runtime for wire adapter"))
});

/// Runs an async future to completion on the shared background runtime,
/// blocking the calling (synchronous) thread. Used anywhere the pipeline
/// needs a result from `hickory-resolver`/`hickory-client`.
pub fn block_on<F: std::future::Future>(fut: F) -> F::Output {
    let rt = RUNTIME.lock().expect("wire runtime mutex poisoned");
    rt.block_on(fut)
}

fn name_from_proto(n: &ProtoName) -> ModelName {
    ModelName::new(&n.to_string())
}

/// Converts one `hickory-proto` wire/master-file record into our model,
/// returning `None` for record types this crate has no use for (still
/// tallied by callers as "seen but not modeled" where relevant).
pub fn from_record(record: &Record) -> Option<Rr> {
    let owner = name_from_proto(record.name());
    let ttl = record.ttl();
    let class = RrClass::In;

    let rdata = match record.data()? {
        RData::A(addr) => Rdata::A(addr.0),
        RData::AAAA(addr) => Rdata::Aaaa(addr.0),
        RData::NS(ns) => Rdata::Ns(name_from_proto(&ns.0)),
        RData::CNAME(c) => Rdata::Cname(name_from_proto(&c.0)),
        RData::MX(mx) => Rdata::Mx { preference: mx.preference(), exchange: name_from_proto(mx.exchange()) },
        RData::TXT(txt) => Rdata::Txt(txt.txt_data().concat()),
        RData::SOA(soa) => Rdata::Soa(soa_from_proto(soa)),
        RData::DNSSEC(dnssec) => dnssec_from_proto(dnssec)?,
        _ => Rdata::Opaque(Vec::new()),
    };

    let rr_type = match &rdata {
        Rdata::A(_) => RrType::A,
        Rdata::Aaaa(_) => RrType::Aaaa,
        Rdata::Ns(_) => RrType::Ns,
        Rdata::Cname(_) => RrType::Cname,
        Rdata::Soa(_) => RrType::Soa,
        Rdata::Mx { .. } => RrType::Mx,
        Rdata::Txt(_) => RrType::Txt,
        Rdata::Dnskey(_) => RrType::Dnskey,
        Rdata::Rrsig(_) => RrType::Rrsig,
        Rdata::Ds(_) => RrType::Ds,
        Rdata::Nsec(_) => RrType::Nsec,
        Rdata::Nsec3(_) => RrType::Nsec3,
        Rdata::Nsec3Param { .. } => RrType::Nsec3Param,
        Rdata::Opaque(_) => RrType::Other(record.record_type().into()),
    };

    Some(Rr { owner, rr_type, class, ttl, rdata })
}

fn soa_from_proto(soa: &SOA) -> SoaRdata {
    SoaRdata {
        mname: name_from_proto(soa.mname()),
        rname: name_from_proto(soa.rname()),
        serial: soa.serial(),
        refresh: soa.refresh() as u32,
        retry: soa.retry() as u32,
        expire: soa.expire() as u32,
        minimum: soa.minimum(),
    }
}

fn dnssec_from_proto(d: &hickory_proto::rr::rdata::DNSSECRData) -> Option<Rdata> {
    use hickory_proto::rr::rdata::DNSSECRData as D;
    match d {
        D::DNSKEY(k) => Some(Rdata::Dnskey(dnskey_from_proto(k))),
        D::DS(ds) => Some(Rdata::Ds(ds_from_proto(ds))),
        D::SIG(sig) => Some(Rdata::Rrsig(rrsig_from_proto(sig))),
        D::NSEC(n) => Some(Rdata::Nsec(nsec_from_proto(n))),
        D::NSEC3(n) => Some(Rdata::Nsec3(nsec3_from_proto(n))),
        D::NSEC3PARAM(p) => Some(nsec3param_from_proto(p)),
        _ => None,
    }
}

fn dnskey_from_proto(k: &DNSKEY) -> DnskeyRdata {
    let mut flags: u16 = 0;
    if k.zone_key() {
        flags |= 1 << 8;
    }
    if k.secure_entry_point() {
        flags |= 1;
    }
    if k.revoke() {
        flags |= 1 << 7;
    }
    DnskeyRdata {
        flags,
        protocol: 3,
        algorithm: u8::from(k.algorithm()),
        public_key: k.public_key().to_vec(),
    }
}

fn ds_from_proto(ds: &DS) -> DsRdata {
    DsRdata {
        key_tag: ds.key_tag(),
        algorithm: u8::from(ds.algorithm()),
        digest_type: u8::from(ds.digest_type()),
        digest: ds.digest().to_vec(),
    }
}

fn rrsig_from_proto(sig: &SIG) -> RrsigRdata {
    RrsigRdata {
        type_covered: RrType::from_num(sig.type_covered().into()),
        algorithm: u8::from(sig.algorithm()),
        labels: sig.num_labels(),
        original_ttl: sig.original_ttl(),
        signature_expiration: sig.sig_expiration() as i64,
        signature_inception: sig.sig_inception() as i64,
        key_tag: sig.key_tag(),
        signer_name: name_from_proto(sig.signer_name()),
        signature: sig.sig().to_vec(),
        rr_ttl: sig.original_ttl(),
    }
}

fn nsec_from_proto(n: &NSEC) -> NsecRdata {
    NsecRdata {
        next_name: name_from_proto(n.next_domain_name()),
        types: n.type_bit_maps().iter().map(|t| RrType::from_num((*t).into())).collect(),
    }
}

/// NSEC3's `flags` octet has a single defined bit (RFC 5155 §3.1.2,
/// opt-out); `hickory-proto` exposes it as a bool rather than the raw
/// octet, so it is reconstructed here.
fn nsec3_from_proto(n: &NSEC3) -> Nsec3Rdata {
    Nsec3Rdata {
        hash_algorithm: u8::from(n.hash_algorithm()),
        flags: if n.opt_out() { 1 } else { 0 },
        iterations: n.iterations(),
        salt: n.salt().to_vec(),
        next_hashed_owner: n.next_hashed_owner_name().to_vec(),
        types: n.type_bit_maps().iter().map(|t| RrType::from_num((*t).into())).collect(),
    }
}

fn nsec3param_from_proto(p: &NSEC3PARAM) -> Rdata {
    Rdata::Nsec3Param {
        hash_algorithm: u8::from(p.hash_algorithm()),
        flags: if p.opt_out() { 1 } else { 0 },
        iterations: p.iterations(),
        salt: p.salt().to_vec(),
    }
}

/// Parses a single RR in zone master-file presentation format, used for
/// trust anchor files (`ds-root`, `--anchor` files) which hold exactly
/// one DNSKEY or DS record each.
pub fn parse_single_rr(text: &str) -> Option<Rr> {
    let synthetic = format!("$ORIGIN .\n$TTL 3600\n{}\n", text);
    let (records, _origin) = Parser::new(synthetic, None, None).parse().ok()?;
    records.values().flatten().next().and_then(from_record)
}

/// Issues a single DNSKEY/DS query against `server`, DNSSEC-OK and
/// recursion-disabled (spec.md §4.6: authoritative servers of the zone
/// are contacted directly, not a recursive resolver).
async fn query_once(server: std::net::IpAddr, domain: &ModelName, record_type: hickory_proto::rr::RecordType) -> Option<Vec<Record>> {
    use hickory_client::client::{AsyncClient, ClientHandle};
    use hickory_client::rr::DNSClass;
    use hickory_client::udp::UdpClientStream;
    use std::net::SocketAddr;
    use std::str::FromStr;

    let name = ProtoName::from_str(domain.as_str()).ok()?;
    let addr = SocketAddr::new(server, 53);
    let (stream, _sender) = UdpClientStream::<tokio::net::UdpSocket>::new(addr);
    let (mut client, bg) = AsyncClient::connect(stream).await.ok()?;
    tokio::spawn(bg);

    let response = client.query(name, DNSClass::IN, record_type).await.ok()?;
    let answers = response.answers().to_vec();
    if answers.is_empty() {
        None
    } else {
        Some(answers)
    }
}

/// Queries `record_type` for `domain`, failing over across the pool's
/// configured name servers (spec.md §4.7: "iterates `pool.count()` times
/// per query"). Returns `None` only once every server has been tried.
pub fn query_rrtype(pool: &mut crate::resolver_pool::ResolverPool, domain: &ModelName, record_type: hickory_proto::rr::RecordType) -> Option<Vec<Rr>> {
    let attempts = pool.count().max(1);
    for _ in 0..attempts {
        let server = pool.current()?;
        if let Some(records) = block_on(query_once(server, domain, record_type)) {
            return Some(records.iter().filter_map(from_record).collect());
        }
        pool.advance();
    }
    None
}
