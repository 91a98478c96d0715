//! `--config=FILE` INI configuration parsing.
//!
//! Grounded in full on `ParamParser.__load_params` in
//! `examples/original_source/tests/application/ParamParser.py`. Section
//! `[general]` carries the global parameters; every other section names
//! a zone. Unknown keys and unknown sections are tolerated (spec.md §6).

use crate::config::{resolve_checks, Config, GeneralParams, SourceType, ZoneParams};
use crate::report::Level;
use crate::resolver_pool::tsig_from_parts;
use ini::Ini;

fn split_list(value: &str) -> Vec<String> {
    value.split(';').filter(|s| !s.is_empty()).map(|s| s.to_string()).collect()
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        other => Err(format!("invalid boolean value \"{}\"", other)),
    }
}

/// Parses an INI document into a `Config`. Returns a human-readable
/// error (wrapped by the caller into a `CliError` with exit code 7) on
/// any malformed value.
pub fn parse(text: &str) -> Result<Config, String> {
    let conf = Ini::load_from_str(text).map_err(|e| e.to_string())?;

    let mut general = GeneralParams::default();
    if let Some(section) = conf.section(Some("general")) {
        if let Some(v) = section.get("outputLevel") {
            general.level = Level::parse(v).ok_or_else(|| format!("invalid outputLevel \"{}\"", v))?;
        }
        if let Some(v) = section.get("outputFormat") {
            general.sformat = v.to_string();
        }
        if let Some(v) = section.get("outputFormatDate") {
            general.dformat = v.to_string();
        }
        if let Some(v) = section.get("time") {
            crate::time_oracle::TimeOracle::new(v).map_err(|_| format!("invalid time value \"{}\"", v))?;
            general.time = v.to_string();
        }
    }

    let mut zones = Vec::new();
    let mut warnings = Vec::new();
    for (name, section) in conf.iter() {
        let name = match name {
            Some(n) if n != "general" => n,
            _ => continue,
        };

        let enabled = match section.get("enabled") {
            Some(v) => parse_bool(v)?,
            None => true,
        };
        if !enabled {
            continue;
        }

        let source_type = match section.get("type") {
            None | Some("file") => SourceType::File,
            Some("axfr") => SourceType::Axfr,
            Some(other) => return Err(format!("zone \"{}\": invalid type \"{}\"", name, other)),
        };

        let source = section.get("zone").unwrap_or_default().to_string();

        let trust = section.get("trust").map(split_list).unwrap_or_default();

        let resolver = match section.get("resolver") {
            None => Vec::new(),
            Some(v) if v.eq_ignore_ascii_case("default") => Vec::new(),
            Some(v) => split_list(v),
        };

        let buffer_size: usize = match section.get("buffersize") {
            None => 1,
            Some(v) => v.parse::<usize>().ok().filter(|n| *n >= 1)
                .ok_or_else(|| format!("zone \"{}\": invalid buffersize \"{}\"", name, v))?,
        };

        let buffer_warn = match section.get("bufferwarn") {
            Some(v) => parse_bool(v).map_err(|e| format!("zone \"{}\": {}", name, e))?,
            None => true,
        };

        let check = section.get("check").map(split_list).unwrap_or_default();
        let nocheck = section.get("nocheck").map(split_list).unwrap_or_default();
        let (checks, check_warnings) = resolve_checks(&check, &nocheck);
        warnings.extend(check_warnings.into_iter().map(|w| format!("zone \"{}\": {}", name, w)));

        let tsig = match section.get("key") {
            None => None,
            Some(spec) => {
                let parts: Vec<&str> = spec.split_whitespace().collect();
                if parts.len() != 3 {
                    warnings.push(format!("zone \"{}\": TSIG key \"{}\" is incomplete (expected \"NAME ALGORITHM DATA\"); disabling TSIG.", name, spec));
                    None
                } else {
                    let t = tsig_from_parts(parts[0], parts[1], parts[2]);
                    if t.is_none() {
                        warnings.push(format!("zone \"{}\": TSIG key \"{}\" is incomplete; disabling TSIG.", name, spec));
                    }
                    t
                }
            }
        };

        let sn_check = match section.get("sncheck") {
            Some(v) => parse_bool(v).map_err(|e| format!("zone \"{}\": {}", name, e))?,
            None => false,
        };

        zones.push(ZoneParams {
            name: name.to_string(),
            enabled: true,
            source_type,
            source,
            trust,
            resolver,
            tsig,
            buffer_size,
            buffer_warn,
            checks,
            sn_check,
        });
    }

    Ok(Config { general, zones, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_section_overrides_defaults() {
        let text = "[general]\noutputLevel = debug\ntime = now\n";
        let cfg = parse(text).unwrap();
        assert_eq!(cfg.general.level, Level::Debug);
        assert_eq!(cfg.general.time, "now");
    }

    #[test]
    fn zone_section_becomes_a_zone() {
        let text = "[example.com]\nzone = zone.db\ntype = file\n";
        let cfg = parse(text).unwrap();
        assert_eq!(cfg.zones.len(), 1);
        assert_eq!(cfg.zones[0].name, "example.com");
        assert_eq!(cfg.zones[0].source, "zone.db");
    }

    #[test]
    fn disabled_zone_is_skipped() {
        let text = "[example.com]\nzone = zone.db\nenabled = false\n";
        let cfg = parse(text).unwrap();
        assert!(cfg.zones.is_empty());
    }

    #[test]
    fn resolver_default_means_empty() {
        let text = "[example.com]\nzone = zone.db\nresolver = default\n";
        let cfg = parse(text).unwrap();
        assert!(cfg.zones[0].resolver.is_empty());
    }

    #[test]
    fn unknown_keys_and_sections_are_tolerated() {
        let text = "[general]\nbogus = 1\n[example.com]\nzone = zone.db\nbogus = 1\n";
        assert!(parse(text).is_ok());
    }

    #[test]
    fn invalid_buffersize_is_an_error() {
        let text = "[example.com]\nzone = zone.db\nbuffersize = 0\n";
        assert!(parse(text).is_err());
    }

    #[test]
    fn partial_tsig_key_is_warned_not_fatal() {
        let text = "[example.com]\nzone = zone.db\nkey = name alg\n";
        let cfg = parse(text).unwrap();
        assert!(cfg.zones[0].tsig.is_none());
        assert_eq!(cfg.warnings.len(), 1);
        assert!(cfg.warnings[0].contains("incomplete"));
    }

    #[test]
    fn unknown_check_token_is_warned_and_dropped() {
        let text = "[example.com]\nzone = zone.db\ncheck = RRSIG;BOGUS\n";
        let cfg = parse(text).unwrap();
        assert_eq!(cfg.zones[0].checks, vec!["RRSIG".to_string()]);
        assert_eq!(cfg.warnings.len(), 1);
        assert!(cfg.warnings[0].contains("BOGUS"));
    }
}
