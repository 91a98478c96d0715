//! Ordered name-server list with round-robin fail-over, optionally
//! TSIG-authenticated.
//!
//! Grounded on `SafeResolver` in
//! `examples/original_source/tests/application/ZoneChecker.py` (the
//! fail-over-on-failure wrapper around the underlying resolver) and on
//! the worker/retry shape of the teacher's `dns::client::DnsNetworkClient`.

use crate::error::Error;
use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Tsig {
    pub name: String,
    pub algorithm: String,
    pub key_data: String,
}

/// Wraps an ordered list of name-server addresses. DNSSEC is always
/// requested, recursion is always disabled (authoritative servers of the
/// zone are contacted directly), and queries never give up mid-flight --
/// failure just means "try the next server."
#[derive(Debug, Clone)]
pub struct ResolverPool {
    servers: Vec<IpAddr>,
    cursor: usize,
    tsig: Option<Tsig>,
}

impl ResolverPool {
    pub fn new() -> Self {
        ResolverPool { servers: Vec::new(), cursor: 0, tsig: None }
    }

    /// Replaces the active server list. `tsig` is only installed if all
    /// three components are present; a partial TSIG spec (the caller
    /// passing `Some` fields with any empty) disables TSIG entirely and
    /// is reported by the caller as CRITICAL, not failed outright.
    pub fn set_servers(&mut self, ips: &[String], tsig: Option<Tsig>) -> Result<(), Error> {
        let parsed: Vec<IpAddr> = ips.iter().filter_map(|s| s.parse().ok()).collect();
        if parsed.is_empty() {
            return Err(Error::ResolverError("no valid resolver IP address configured".into()));
        }
        self.servers = parsed;
        self.cursor = 0;
        self.tsig = tsig;
        Ok(())
    }

    /// The server fail-over should currently try.
    pub fn current(&self) -> Option<IpAddr> {
        self.servers.get(self.cursor).copied()
    }

    /// Rotates to the next server, modulo pool size.
    pub fn advance(&mut self) {
        if !self.servers.is_empty() {
            self.cursor = (self.cursor + 1) % self.servers.len();
        }
    }

    pub fn count(&self) -> usize {
        self.servers.len()
    }

    pub fn tsig(&self) -> Option<&Tsig> {
        self.tsig.as_ref()
    }
}

impl Default for ResolverPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial-TSIG check used by both the CLI and INI config paths:
/// returns `Some(Tsig)` only when every field is non-empty.
pub fn tsig_from_parts(name: &str, algorithm: &str, key_data: &str) -> Option<Tsig> {
    if name.is_empty() || algorithm.is_empty() || key_data.is_empty() {
        None
    } else {
        Some(Tsig { name: name.to_string(), algorithm: algorithm.to_string(), key_data: key_data.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_servers_rejects_all_invalid() {
        let mut pool = ResolverPool::new();
        assert!(pool.set_servers(&["not-an-ip".into()], None).is_err());
    }

    #[test]
    fn advance_rotates_modulo_pool_size() {
        let mut pool = ResolverPool::new();
        pool.set_servers(&["192.0.2.1".into(), "192.0.2.2".into()], None).unwrap();
        assert_eq!(pool.current(), Some("192.0.2.1".parse().unwrap()));
        pool.advance();
        assert_eq!(pool.current(), Some("192.0.2.2".parse().unwrap()));
        pool.advance();
        assert_eq!(pool.current(), Some("192.0.2.1".parse().unwrap()));
    }

    #[test]
    fn partial_tsig_is_rejected() {
        assert!(tsig_from_parts("name", "", "data").is_none());
        assert!(tsig_from_parts("name", "hmac-sha256", "data").is_some());
    }

    #[test]
    fn count_reflects_parsed_servers_only() {
        let mut pool = ResolverPool::new();
        pool.set_servers(&["192.0.2.1".into(), "not-an-ip".into(), "192.0.2.2".into()], None).unwrap();
        assert_eq!(pool.count(), 2);
    }
}
