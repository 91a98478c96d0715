//! The crate's error taxonomy.
//!
//! `ValidationFinding`s (RRSIG mismatches, missing DS records, and so on)
//! are never represented here -- they are configuration defects in the
//! audited zone, not failures of this program, and are surfaced only
//! through [`crate::report::Sink`]. This enum exists for failures of the
//! auditor itself: bad configuration, unreadable zone data, unreachable
//! name servers.

use derive_more::{Display, Error};
use std::io;
use std::sync::PoisonError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum Error {
    /// A CLI argument or config file value is missing, malformed, or
    /// contradictory. Carries the already-formatted message to display.
    #[display(fmt = "{}", _0)]
    BadConfig(String),

    /// A `--time` value or RRSIG timestamp could not be parsed.
    #[display(fmt = "{}", _0)]
    BadTime(String),

    /// A zone master file could not be read or did not parse.
    #[display(fmt = "line {}: {}", line, msg)]
    FileError {
        line: usize,
        msg: String,
    },

    /// A zone transfer (AXFR) failed or did not complete.
    #[display(fmt = "{}", _0)]
    AxfrError(String),

    /// All configured name servers failed to answer a query.
    #[display(fmt = "{}", _0)]
    ResolverError(String),

    /// Sentinel raised by a [`crate::zone_source::ZoneSource`] once its
    /// last owner-group has been returned. Not a real error; the
    /// pipeline driver treats it as "this zone is exhausted."
    #[display(fmt = "zone loading finished")]
    LoadingDone,

    /// The chain of trust could not be built: no DNSKEY in the
    /// candidate set verifies against any trusted key.
    #[display(fmt = "no trusted key found for {}", _0)]
    NoTrustedKey(String),

    /// The chain of trust could not climb further: no DS record at the
    /// parent matches any DNSKEY at this level.
    #[display(fmt = "no trusted DS record found for {}", _0)]
    NoTrustedDs(String),

    #[display(fmt = "I/O error: {}", _0)]
    Io(io::Error),

    #[display(fmt = "internal lock poisoned")]
    #[error(ignore)]
    Poisoned,
}

impl<T> From<PoisonError<T>> for Error {
    fn from(_: PoisonError<T>) -> Self {
        Error::Poisoned
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
