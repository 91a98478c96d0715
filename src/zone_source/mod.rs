//! Zone record sources: master file and AXFR variants, unified behind
//! one small capability trait (spec.md §9: "Dynamic dispatch over zone
//! sources... a sum type or small vtable; no deep hierarchy is needed").
//!
//! Grounded on `ZoneProvider`/`ZoneProviderFile`/`ZoneProviderAXFR` in
//! `examples/original_source/tests/application/ZoneChecker.py`.

pub mod axfr;
pub mod file;

use crate::error::Error;
use crate::model::{Group, Name, Rr};
use crate::owner_group::OwnerGroupBuffer;

/// Shared buffering/SOA-tracking logic both variants drive. Not a
/// `ZoneSource` itself -- each variant owns one and implements
/// `next_group` by pulling decoded RRs from its own source into it.
pub struct SourceState {
    buffer: OwnerGroupBuffer,
    soa: Option<Rr>,
    apex: Option<Name>,
    exhausted: bool,
}

impl SourceState {
    pub fn new(buffer_size: usize, buffer_warn: bool) -> Self {
        SourceState {
            buffer: OwnerGroupBuffer::new(buffer_size, buffer_warn),
            soa: None,
            apex: None,
            exhausted: false,
        }
    }

    /// Feeds one decoded RR into the buffer, latching the SOA/apex on
    /// first sight and ignoring any subsequent SOA (AXFR's closing
    /// bookend). Returns an evicted group, if any.
    pub fn feed(&mut self, rr: Rr) -> Option<Group> {
        if let crate::model::Rdata::Soa(_) = &rr.rdata {
            if self.soa.is_none() {
                self.apex = Some(rr.owner.clone());
                self.soa = Some(rr.clone());
            } else {
                return None; // closing SOA bookend, not a new group
            }
        }
        self.buffer.push(rr)
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        self.buffer.take_warnings()
    }

    pub fn soa(&self) -> Option<&Rr> {
        self.soa.as_ref()
    }

    pub fn apex(&self) -> Option<&Name> {
        self.apex.as_ref()
    }

    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }

    /// Drains the buffer once the underlying stream has signaled EOF;
    /// returns `LoadingDone` once nothing remains.
    pub fn drain_or_done(&mut self) -> Result<Group, Error> {
        if let Some(g) = self.buffer.drain() {
            return Ok(g);
        }
        Err(Error::LoadingDone)
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

pub trait ZoneSource {
    fn next_group(&mut self) -> Result<Group, Error>;
    fn soa(&self) -> Option<&Rr>;
    fn apex(&self) -> Option<&Name>;
    /// Drains any owner-group-buffer warnings (revisited owners) since
    /// the last call, for the pipeline to forward to the report sink.
    fn take_warnings(&mut self) -> Vec<String>;
}
