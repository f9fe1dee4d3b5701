// In: src/config.rs

//! The single source of truth for decoder configuration.
//!
//! `DecoderConfig` is created once at the application boundary (in code, or
//! from a JSON document) and passed by reference into every decode call. The
//! decoder holds no other state, so one config can be shared freely across
//! threads.

use serde::{Deserialize, Serialize};

use crate::error::Result;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// What to do with an NCHAR code unit that is not a valid Unicode scalar value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NcharPolicy {
    /// **Default:** fail the decode with `CorruptBlock`.
    #[default]
    Strict,

    /// Substitute U+FFFD and keep going. A warning is logged per cell.
    Replace,
}

//==================================================================================
// II. The Unified DecoderConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DecoderConfig {
    /// If true, the header's `total_length` must fit in the buffer and every
    /// column region must end inside it. If false, only the buffer length bounds reads.
    #[serde(default = "default_true")]
    pub validate_total_length: bool,

    /// If true, the caller's column type tags must match the block's embedded
    /// column-info array.
    #[serde(default = "default_true")]
    pub check_column_types: bool,

    #[serde(default)]
    pub nchar_policy: NcharPolicy,

    /// Upper bound for any length-prefixed envelope name and for schema
    /// column counts.
    #[serde(default = "default_max_metadata_len")]
    pub max_metadata_len: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            validate_total_length: true,
            check_column_types: true,
            nchar_policy: NcharPolicy::default(),
            max_metadata_len: default_max_metadata_len(),
        }
    }
}

impl DecoderConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

/// 16MB, a reasonable limit to keep malformed lengths from driving huge reads.
fn default_max_metadata_len() -> usize {
    16 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let cfg = DecoderConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, DecoderConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let cfg = DecoderConfig::from_json_str(
            r#"{"nchar_policy": "replace", "validate_total_length": false}"#,
        )
        .unwrap();
        assert_eq!(cfg.nchar_policy, NcharPolicy::Replace);
        assert!(!cfg.validate_total_length);
        assert!(cfg.check_column_types);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(DecoderConfig::from_json_str(r#"{"nchar_policy": "lenient"}"#).is_err());
    }
}
