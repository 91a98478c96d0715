//! Reference-time source for RRSIG validity checks.
//!
//! Grounded on `--time` handling in `ParamParser.py` and the inception/
//! expiration comparisons in `ZoneChecker.py`'s `verify_rrsigs_times`.

use crate::error::Error;
use chrono::{NaiveDateTime, Utc};

const LITERAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RRSIG_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Valid,
    Expired,
    Future,
}

#[derive(Debug, Clone)]
enum Mode {
    Fixed(i64),
    Run(i64),
    Live,
}

/// Source of "now" for signature time checks. Constructed once per
/// invocation from the `--time` parameter and shared across zones.
#[derive(Debug, Clone)]
pub struct TimeOracle {
    mode: Mode,
}

impl TimeOracle {
    /// `spec` is one of a literal `YYYY-MM-DD HH:MM:SS` timestamp,
    /// `"run"` (captures `now()` once, here), or `"now"` (live).
    pub fn new(spec: &str) -> Result<Self, Error> {
        let mode = match spec {
            "run" => Mode::Run(Utc::now().timestamp()),
            "now" => Mode::Live,
            literal => {
                let parsed = NaiveDateTime::parse_from_str(literal, LITERAL_FORMAT)
                    .map_err(|_| Error::BadConfig(format!(
                        "invalid --time value \"{}\", expected \"run\", \"now\", or \"{}\"",
                        literal, LITERAL_FORMAT,
                    )))?;
                Mode::Fixed(parsed.and_utc().timestamp())
            }
        };
        Ok(TimeOracle { mode })
    }

    pub fn now(&self) -> i64 {
        match self.mode {
            Mode::Fixed(t) | Mode::Run(t) => t,
            Mode::Live => Utc::now().timestamp(),
        }
    }

    /// Converts an RRSIG inception/expiration value, either the 14-digit
    /// `YYYYMMDDHHMMSS` form or decimal seconds-since-epoch, to an
    /// absolute epoch timestamp.
    pub fn normalize(&self, value: &str) -> Result<i64, Error> {
        if value.len() == 14 && value.bytes().all(|b| b.is_ascii_digit()) {
            let parsed = NaiveDateTime::parse_from_str(value, RRSIG_DATETIME_FORMAT)
                .map_err(|_| Error::BadTime(format!("invalid RRSIG timestamp \"{}\"", value)))?;
            return Ok(parsed.and_utc().timestamp());
        }
        value.parse::<i64>()
            .map_err(|_| Error::BadTime(format!("invalid RRSIG timestamp \"{}\"", value)))
    }

    pub fn classify(&self, inception: i64, expiration: i64) -> Classification {
        let now = self.now();
        if now < inception {
            Classification::Future
        } else if now <= expiration {
            Classification::Valid
        } else {
            Classification::Expired
        }
    }

    /// Seconds until `expiration`, saturating at zero if already passed.
    pub fn remaining(&self, expiration: i64) -> i64 {
        (expiration - self.now()).max(0)
    }
}
