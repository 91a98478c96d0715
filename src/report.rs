//! Severity-tagged finding sink.
//!
//! The external format contract (`--sformat`/`--dformat`) is Python
//! `logging`-module style: a message template with `%(asctime)s`,
//! `%(levelname)s`, `%(message)s` tokens, and a `strftime`-compatible
//! date sub-format for the first. Grounded on the call sites in
//! `examples/original_source/tests/application/ZoneChecker.py` and
//! `Main.py` (`logging.debug/info/warning/error/critical(...)`), and on
//! `ParamParser.py`'s `--sformat`/`--dformat` defaults.

use chrono::{DateTime, Utc};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub fn parse(s: &str) -> Option<Level> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warning" => Some(Level::Warning),
            "error" => Some(Level::Error),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

/// Severity-tagged finding sink. Findings at or above `threshold` are
/// written to `out` (the error stream by default); anything below is
/// dropped, matching a Python `logging` handler's level filter.
pub struct Sink<W: Write> {
    out: W,
    /// Statistics banners go to the primary output stream (spec.md §6),
    /// distinct from findings on the error stream. `None` (the default,
    /// and what every in-crate test uses) falls back to `out`.
    stats_out: Option<Box<dyn Write + Send>>,
    threshold: Level,
    sformat: String,
    dformat: String,
}

impl<W: Write> Sink<W> {
    pub fn new(out: W, threshold: Level, sformat: impl Into<String>, dformat: impl Into<String>) -> Self {
        Sink { out, stats_out: None, threshold, sformat: sformat.into(), dformat: dformat.into() }
    }

    /// Routes statistics banners (`print_statistics`) to a separate
    /// writer -- the process binary uses this to send findings to
    /// stderr and usage statistics to stdout, per spec.md §6.
    pub fn with_stats_writer(mut self, w: impl Write + Send + 'static) -> Self {
        self.stats_out = Some(Box::new(w));
        self
    }

    pub fn debug(&mut self, msg: impl Into<String>) {
        self.emit(Level::Debug, msg.into());
    }

    pub fn info(&mut self, msg: impl Into<String>) {
        self.emit(Level::Info, msg.into());
    }

    pub fn warning(&mut self, msg: impl Into<String>) {
        self.emit(Level::Warning, msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.emit(Level::Error, msg.into());
    }

    pub fn critical(&mut self, msg: impl Into<String>) {
        self.emit(Level::Critical, msg.into());
    }

    fn emit(&mut self, level: Level, message: String) {
        if level < self.threshold {
            return;
        }
        let line = self.format(level, &message, Utc::now());
        let _ = writeln!(self.out, "{}", line);
    }

    fn format(&self, level: Level, message: &str, when: DateTime<Utc>) -> String {
        let asctime = when.format(&self.dformat).to_string();
        self.sformat
            .replace("%(asctime)s", &asctime)
            .replace("%(levelname)s", level.name())
            .replace("%(message)s", message)
    }

    /// Prints an 80-column-ruled statistics banner followed by each
    /// `(name, value, percent)` entry, one per line.
    pub fn print_statistics(&mut self, title: &str, entries: impl Iterator<Item = crate::stats::Entry>) {
        let banner = format!("---- Statistics - {} ----", title);
        let mut write_line = |line: &str| {
            match self.stats_out.as_mut() {
                Some(w) => { let _ = writeln!(w, "{}", line); }
                None => { let _ = writeln!(self.out, "{}", line); }
            }
        };
        write_line(&banner);
        for e in entries {
            let line = match e.percent {
                Some(p) => format!("{}: {} ({:.2}%)", e.name, e.value, p),
                None => format!("{}: {}", e.name, e.value),
            };
            write_line(&line);
        }
    }
}

pub const DEFAULT_SFORMAT: &str = "%(asctime)s %(levelname)s: %(message)s";
pub const DEFAULT_DFORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn level_ordering_filters_below_threshold() {
        let mut out = Vec::new();
        {
            let mut sink = Sink::new(&mut out, Level::Warning, DEFAULT_SFORMAT, DEFAULT_DFORMAT);
            sink.debug("should be dropped");
            sink.info("also dropped");
            sink.warning("kept");
        }
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("dropped"));
        assert!(text.contains("kept"));
    }

    #[test]
    fn format_substitutes_all_tokens() {
        let sink = Sink::new(Vec::new(), Level::Debug, DEFAULT_SFORMAT, DEFAULT_DFORMAT);
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let line = sink.format(Level::Error, "boom", when);
        assert_eq!(line, "2024-01-02 03:04:05 ERROR: boom");
    }

    #[test]
    fn custom_sformat_is_honored() {
        let sink = Sink::new(Vec::new(), Level::Debug, "[%(levelname)s] %(message)s", DEFAULT_DFORMAT);
        let line = sink.format(Level::Critical, "oops", Utc::now());
        assert_eq!(line, "[CRITICAL] oops");
    }

    #[test]
    fn level_parse_is_case_insensitive() {
        assert_eq!(Level::parse("WARNING"), Some(Level::Warning));
        assert_eq!(Level::parse("Error"), Some(Level::Error));
        assert_eq!(Level::parse("bogus"), None);
    }
}
