//! Persisted last-seen SOA serial numbers, used by `--sn` to skip zones
//! that have not changed since the previous run.
//!
//! Grounded on `ZoneProvider.is_new`/`store_sn` in
//! `examples/original_source/tests/application/ZoneChecker.py`. The
//! store is an INI file, section `[zones]`, keys compared
//! case-insensitively, values the decimal serial number.

use crate::error::Error;
use ini::Ini;
use std::path::{Path, PathBuf};

pub const DEFAULT_PATH: &str = "/tmp/dnssec_last_serial_numbers";
const SECTION: &str = "zones";

pub struct SerialGate {
    path: PathBuf,
}

impl SerialGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SerialGate { path: path.into() }
    }

    pub fn default_path() -> Self {
        SerialGate::new(DEFAULT_PATH)
    }

    fn load(&self) -> Result<Ini, Error> {
        if !Path::new(&self.path).exists() {
            return Ok(Ini::new());
        }
        Ini::load_from_file(&self.path)
            .map_err(|e| Error::BadConfig(format!("corrupt serial-number store {:?}: {}", self.path, e)))
    }

    /// Returns true iff no prior value for `zone_name` exists, or the
    /// stored value is strictly less than `soa_serial`. When true and
    /// `store_current`, persists `soa_serial` back immediately.
    pub fn is_new(&self, zone_name: &str, soa_serial: u32, store_current: bool) -> Result<bool, Error> {
        let mut conf = self.load()?;
        let key = zone_name.to_ascii_lowercase();

        let prior: Option<u32> = conf
            .section(Some(SECTION))
            .and_then(|s| s.get(key.as_str()))
            .and_then(|v| v.parse().ok());

        let is_new = match prior {
            None => true,
            Some(stored) => stored < soa_serial,
        };

        if is_new && store_current {
            conf.with_section(Some(SECTION)).set(key, soa_serial.to_string());
            conf.write_to_file(&self.path)
                .map_err(|e| Error::BadConfig(format!("cannot write serial-number store {:?}: {}", self.path, e)))?;
        }

        Ok(is_new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("dnssec-audit-test-{}-{}", std::process::id(), name));
        let _ = fs::remove_file(&p);
        p
    }

    #[test]
    fn missing_file_treated_as_no_prior_value() {
        let path = temp_path("missing");
        let gate = SerialGate::new(&path);
        assert!(gate.is_new("example.com", 1, false).unwrap());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn higher_serial_is_new_and_persists() {
        let path = temp_path("higher");
        let gate = SerialGate::new(&path);
        assert!(gate.is_new("example.com", 10, true).unwrap());
        assert!(!gate.is_new("example.com", 10, true).unwrap());
        assert!(gate.is_new("example.com", 11, true).unwrap());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn zone_names_compared_case_insensitively() {
        let path = temp_path("case");
        let gate = SerialGate::new(&path);
        assert!(gate.is_new("Example.COM", 5, true).unwrap());
        assert!(!gate.is_new("example.com", 5, true).unwrap());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn store_current_false_does_not_persist() {
        let path = temp_path("nopersist");
        let gate = SerialGate::new(&path);
        assert!(gate.is_new("example.com", 5, false).unwrap());
        assert!(gate.is_new("example.com", 5, false).unwrap());
        let _ = fs::remove_file(&path);
    }
}
