//! AXFR (full zone transfer) source.
//!
//! Grounded on `ZoneProviderAXFR` in
//! `examples/original_source/tests/application/ZoneChecker.py`: retries
//! across the resolver pool on a failed transfer start, and requires the
//! closing SOA bookend to consider the transfer complete.

use crate::error::Error;
use crate::model::{Group, Name, Rr};
use crate::resolver_pool::{ResolverPool, Tsig};
use crate::wire;
use crate::zone_source::{SourceState, ZoneSource};
use hickory_client::client::{AsyncClient, ClientHandle};
use hickory_client::rr::{DNSClass, Name as ClientName};
use hickory_client::tcp::TcpClientStream;
use hickory_proto::iocompat::AsyncIoTokioAsStd;
use hickory_proto::rr::dnssec::rdata::tsig::TsigAlgorithm;
use hickory_proto::rr::dnssec::tsig::TSigner;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpStream;

pub struct AxfrSource {
    state: SourceState,
    pending: VecDeque<hickory_proto::rr::Record>,
}

impl AxfrSource {
    pub fn new(buffer_size: usize, buffer_warn: bool) -> Self {
        AxfrSource { state: SourceState::new(buffer_size, buffer_warn), pending: VecDeque::new() }
    }

    /// Attempts the transfer against each server in `pool`, in fail-over
    /// order, up to `pool.count()` tries (spec.md §4.4), signing the
    /// transfer with `pool.tsig()` when one is configured (spec.md §4.6).
    pub fn start(&mut self, zone: &str, pool: &mut ResolverPool) -> Result<(), Error> {
        let zone_name = ClientName::from_str(zone)
            .map_err(|e| Error::AxfrError(format!("invalid zone name \"{}\": {}", zone, e)))?;

        let signer = pool
            .tsig()
            .and_then(build_signer)
            .map(Arc::new);

        let attempts = pool.count().max(1);
        let mut last_err = None;
        for _ in 0..attempts {
            let server = match pool.current() {
                Some(s) => s,
                None => return Err(Error::AxfrError("no name server configured for AXFR".into())),
            };
            match wire::block_on(run_axfr(server, zone_name.clone(), signer.clone())) {
                Ok(records) => {
                    self.pending = records.into();
                    return Ok(());
                }
                Err(e) => {
                    last_err = Some(e);
                    pool.advance();
                }
            }
        }
        Err(Error::AxfrError(last_err.unwrap_or_else(|| "AXFR refused by all name servers".into())))
    }
}

/// Maps a configured TSIG key onto `hickory-proto`'s signer. `algorithm`
/// is matched case-insensitively against the BIND-style names accepted
/// by `--key`/`key=` (e.g. `hmac-sha256`); `key_data` is the key secret,
/// base64-encoded the same way `named.conf`/`tsig-keygen` emit it.
/// Returns `None` (the transfer proceeds unsigned) for an algorithm this
/// auditor does not recognize or a secret that fails to decode.
fn build_signer(tsig: &Tsig) -> Option<TSigner> {
    let algorithm = match tsig.algorithm.to_ascii_lowercase().as_str() {
        "hmac-md5" | "hmac-md5.sig-alg.reg.int" => TsigAlgorithm::HmacMd5,
        "hmac-sha1" => TsigAlgorithm::HmacSha1,
        "hmac-sha224" => TsigAlgorithm::HmacSha224,
        "hmac-sha256" => TsigAlgorithm::HmacSha256,
        "hmac-sha384" => TsigAlgorithm::HmacSha384,
        "hmac-sha512" => TsigAlgorithm::HmacSha512,
        _ => return None,
    };
    let key_bytes = base64::decode(&tsig.key_data).ok()?;
    let signer_name = ClientName::from_str(&tsig.name).unwrap_or_else(|_| ClientName::root());
    TSigner::new(key_bytes, algorithm, signer_name, 300).ok()
}

/// Transfers `zone` from `server` over TCP, per RFC 5936 §4.2: a real
/// zone routinely exceeds one UDP datagram, so AXFR is always carried
/// over a stream transport (UDP remains fine for the single DNSKEY/DS
/// lookups in `wire::query_once`). `signer` is attached to the
/// connection when TSIG is configured.
async fn run_axfr(server: std::net::IpAddr, zone: ClientName, signer: Option<Arc<TSigner>>) -> Result<Vec<hickory_proto::rr::Record>, String> {
    let addr = SocketAddr::new(server, 53);
    let (stream, sender) = TcpClientStream::<AsyncIoTokioAsStd<TcpStream>>::new(addr);
    let client = AsyncClient::new(stream, sender, signer);
    let (mut client, bg) = client.await.map_err(|e| e.to_string())?;
    tokio::spawn(bg);

    let response = client
        .query(zone, DNSClass::IN, hickory_proto::rr::RecordType::AXFR)
        .await
        .map_err(|e| e.to_string())?;

    let records = response.answers().to_vec();
    if records.is_empty() {
        return Err("transfer not fully completed".to_string());
    }
    Ok(records)
}

impl ZoneSource for AxfrSource {
    fn next_group(&mut self) -> Result<Group, Error> {
        loop {
            match self.pending.pop_front() {
                Some(record) => {
                    if let Some(rr) = wire::from_record(&record) {
                        if let Some(group) = self.state.feed(rr) {
                            return Ok(group);
                        }
                    }
                }
                None => {
                    if !self.state.is_exhausted() && self.state.soa().is_none() {
                        return Err(Error::AxfrError("transfer not fully completed".into()));
                    }
                    self.state.mark_exhausted();
                    return self.state.drain_or_done();
                }
            }
        }
    }

    fn soa(&self) -> Option<&Rr> {
        self.state.soa()
    }

    fn apex(&self) -> Option<&Name> {
        self.state.apex()
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.state.take_warnings()
    }
}
