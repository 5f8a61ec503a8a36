//! Storage-safe names derived from free-text CFIHOS names.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use cfihos_model::constants::{MODEL_VERSION_LENGTH, RELATION_SUFFIX};
use cfihos_model::{CfihosError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStyle {
    /// Entity names: `Pump Casing` → `PumpCasing`.
    Pascal,
    /// Property names: `Design Pressure` → `design_pressure`.
    Snake,
}

fn dash_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[‐‑‒–—―−#():/\\-]+").unwrap())
}

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w_]").unwrap())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Split a name into capitalized words, dropping diacritics and punctuation.
fn words(input: &str) -> Vec<String> {
    let stripped: String = input.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    let mut s = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        match c {
            ' ' | ',' | '.' => s.push('_'),
            '\'' | '"' | '?' | '!' | ';' => {}
            '%' => s.push_str("percent"),
            '&' => s.push_str("and"),
            other => s.push(other),
        }
    }

    let s = dash_run().replace_all(&s, "_");
    let s = non_word().replace_all(&s, "_");

    s.split('_').filter(|w| !w.is_empty()).map(capitalize).collect()
}

/// Render `input` as a storage-safe identifier; relations get a `_rel` suffix.
pub fn sanitize_name(input: &str, style: CaseStyle, is_relation: bool) -> String {
    let words = words(input);
    let mut out = match style {
        CaseStyle::Pascal => words.concat(),
        CaseStyle::Snake => words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("_"),
    };
    if is_relation {
        out.push_str(RELATION_SUFFIX);
    }
    out
}

pub fn snake(input: &str) -> String {
    sanitize_name(input, CaseStyle::Snake, false)
}

pub fn pascal(input: &str) -> String {
    sanitize_name(input, CaseStyle::Pascal, false)
}

/// Keep `name` under `max_length` characters: the head is kept and only the
/// capitals of the tail survive. Fails if that is still too long.
pub fn bound_length(name: &str, max_length: usize) -> Result<String> {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() < max_length {
        return Ok(name.to_string());
    }
    let keep = max_length.saturating_sub(10);
    let mut out: String = chars[..keep].iter().collect();
    out.extend(chars[keep..].iter().filter(|c| c.is_uppercase()));
    if out.chars().count() > max_length + MODEL_VERSION_LENGTH {
        return Err(CfihosError::NameTooLong {
            name: name.to_string(),
            max_length,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_and_pascal() {
        assert_eq!(snake("Test String"), "test_string");
        assert_eq!(pascal("test string"), "TestString");
        assert_eq!(sanitize_name("test string", CaseStyle::Snake, true), "test_string_rel");
    }

    #[test]
    fn test_diacritics_and_symbols() {
        assert_eq!(snake("Tëmpérature (max.)"), "temperature_max");
        assert_eq!(snake("Flow % at 50/60 Hz"), "flow_percent_at_50_60_hz");
        assert_eq!(pascal("oil & gas"), "OilAndGas");
        assert_eq!(snake("what's up?!"), "whats_up");
    }

    #[test]
    fn test_dash_runs_and_repeated_separators() {
        assert_eq!(snake("pump -- casing—inner"), "pump_casing_inner");
        assert_eq!(snake("__leading and trailing__"), "leading_and_trailing");
        assert_eq!(pascal("PUMP casing"), "PumpCasing");
    }

    #[test]
    fn test_bound_length() {
        assert_eq!(bound_length("ShortName", 54).unwrap(), "ShortName");
        let long = "AbcdefghijAbcdefghijAbcdefghijAbcdefghijAbcdefghijAbcdefghijXyz";
        let bounded = bound_length(long, 54).unwrap();
        assert_eq!(bounded, "AbcdefghijAbcdefghijAbcdefghijAbcdefghijAbcdAX");
        assert!(bound_length(&"A".repeat(80), 54).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(snake(""), "");
        assert_eq!(sanitize_name("", CaseStyle::Pascal, true), "_rel");
    }
}
