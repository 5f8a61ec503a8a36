//! Fixed vocabularies for CFIHOS flag and type columns.

use cfihos_model::{CfihosError, Result};
use serde_json::Value;

/// Values accepted as `true` in first-class-citizen and in-model columns.
const TRUTHY: [&str; 5] = ["true", "1", "yes", "y", "t"];

pub fn is_truthy(s: &str) -> bool {
    let s = s.trim().to_lowercase();
    TRUTHY.contains(&s.as_str())
}

/// Map a CFIHOS `format` value onto a storage scalar type.
pub fn map_scalar_type(raw: &str) -> Result<&'static str> {
    let raw = if raw.starts_with("Text,") { "Text" } else { raw };
    let mapped = match raw {
        "Text" => "text",
        "Date" => "timestamp",
        "Boolean (Yes/No)" | "Boolean" => "boolean",
        "Decimal (10)" | "NUM" | "Number" => "float32",
        "Integer" => "int32",
        other => return Err(CfihosError::MissingTypeConversion(other.to_string())),
    };
    Ok(mapped)
}

/// Like [`map_scalar_type`], but a missing value is reported and read as `Text`.
pub fn map_scalar_type_or_text(raw: Option<&str>, property_id: &str) -> Result<&'static str> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => map_scalar_type(raw),
        None => {
            tracing::error!(
                property = property_id,
                "missing target type, a Text type is assigned"
            );
            map_scalar_type("Text")
        }
    }
}

fn flag_token(value: Option<&Value>) -> FlagToken<'_> {
    match value {
        Some(Value::Bool(b)) => FlagToken::Bool(*b),
        Some(Value::String(s)) => FlagToken::Text(s.trim()),
        Some(other) => FlagToken::Other(other.to_string()),
        None => FlagToken::Other(String::new()),
    }
}

enum FlagToken<'a> {
    Bool(bool),
    Text(&'a str),
    Other(String),
}

impl FlagToken<'_> {
    fn unmappable(self, field: &'static str) -> CfihosError {
        let value = match self {
            FlagToken::Bool(b) => b.to_string(),
            FlagToken::Text(s) => s.to_string(),
            FlagToken::Other(s) => s,
        };
        CfihosError::UnmappableFlag { field, value }
    }
}

/// `Optional` → false, `Mandatory`/`Identifier` → true, booleans pass through.
pub fn map_required(value: Option<&Value>) -> Result<bool> {
    match flag_token(value) {
        FlagToken::Bool(b) => Ok(b),
        FlagToken::Text("Optional") => Ok(false),
        FlagToken::Text("Mandatory") | FlagToken::Text("Identifier") => Ok(true),
        other => Err(other.unmappable("is required field")),
    }
}

/// Only `Identifier` makes a property unique; booleans pass through.
pub fn map_unique(value: Option<&Value>) -> Result<bool> {
    match flag_token(value) {
        FlagToken::Bool(b) => Ok(b),
        FlagToken::Text("Optional") | FlagToken::Text("Mandatory") => Ok(false),
        FlagToken::Text("Identifier") => Ok(true),
        other => Err(other.unmappable("is unique field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthy_tokens() {
        for s in ["TRUE", " yes ", "Y", "1", "t"] {
            assert!(is_truthy(s), "{s} should be truthy");
        }
        for s in ["", "no", "0", "false", "maybe"] {
            assert!(!is_truthy(s), "{s} should be falsy");
        }
    }

    #[test]
    fn test_scalar_type_conversion() {
        assert_eq!(map_scalar_type("Text").unwrap(), "text");
        assert_eq!(map_scalar_type("Text, 255").unwrap(), "text");
        assert_eq!(map_scalar_type("Date").unwrap(), "timestamp");
        assert_eq!(map_scalar_type("Boolean (Yes/No)").unwrap(), "boolean");
        assert_eq!(map_scalar_type("Decimal (10)").unwrap(), "float32");
        assert_eq!(map_scalar_type("Integer").unwrap(), "int32");
        let err = map_scalar_type("Blob").unwrap_err();
        assert_eq!(err.to_string(), "Missing conversion for 'Blob'");
    }

    #[test]
    fn test_missing_scalar_type_defaults_to_text() {
        assert_eq!(map_scalar_type_or_text(None, "P1").unwrap(), "text");
        assert_eq!(map_scalar_type_or_text(Some("  "), "P1").unwrap(), "text");
        assert_eq!(map_scalar_type_or_text(Some("NUM"), "P1").unwrap(), "float32");
    }

    #[test]
    fn test_required_and_unique_vocabularies_differ_on_mandatory() {
        let mandatory = json!("Mandatory");
        assert!(map_required(Some(&mandatory)).unwrap());
        assert!(!map_unique(Some(&mandatory)).unwrap());

        let identifier = json!("Identifier");
        assert!(map_required(Some(&identifier)).unwrap());
        assert!(map_unique(Some(&identifier)).unwrap());

        assert!(map_required(Some(&json!(true))).unwrap());
        assert!(!map_unique(Some(&json!(false))).unwrap());
    }

    #[test]
    fn test_unknown_flag_tokens_are_rejected() {
        let err = map_required(Some(&json!("Sometimes"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not map property field 'is required field' - 'Sometimes'"
        );
        assert!(map_required(None).is_err());
        assert!(map_unique(Some(&json!(3))).is_err());
    }
}
