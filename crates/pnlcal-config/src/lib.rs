//! pnlcal-config
//!
//! Layered YAML configuration.
//! - Later files override earlier ones (deep merge of mappings)
//! - The merged document is canonicalized and hashed (SHA-256, hex)
//! - Typed settings are read from the merged document with defaults
//! - Leaf keys nothing reads are reported (`unused`)

mod settings;
mod unused;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use settings::{AppConfig, CalendarSettings, ParserSettings, ReportSettings, WeekStart};
pub use unused::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport, CONSUMED_POINTERS};

/// Largest value accepted for `report.decimals`.
pub const MAX_DECIMALS: u8 = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read yaml path '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config json conversion failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CONFIG_INVALID {pointer}: {message}")]
    Invalid { pointer: String, message: String },
    #[error(
        "CONFIG_UNUSED_KEYS: {count} unused config leaf key(s) detected. \
         Remove them or fix their spelling. First few: {preview}"
    )]
    UnusedKeys { count: usize, preview: String },
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed, validated view of the merged document.
    pub fn settings(&self) -> Result<AppConfig, ConfigError> {
        AppConfig::from_json(&self.config_json)
    }
}

pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig, ConfigError> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p).map_err(|source| ConfigError::Read {
            path: p.to_path_buf(),
            source,
        })?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig, ConfigError> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
        // An empty file parses as null and contributes nothing.
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml)?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    tracing::debug!(config_hash = %config_hash, layers = yaml_docs.len(), "config loaded");
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Compact JSON with object keys in sorted order (serde_json's default map).
fn canonicalize_json(v: &Value) -> Result<String, ConfigError> {
    Ok(serde_json::to_string(v)?)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn deep_merge_overrides_leaves_and_keeps_siblings() {
        let a = serde_json::json!({"parser": {"grouping_separator": ",", "date_formats": ["%Y-%m-%d"]}});
        let b = serde_json::json!({"parser": {"grouping_separator": " "}});
        let m = deep_merge(a, b);
        assert_eq!(m.pointer("/parser/grouping_separator").unwrap(), " ");
        assert_eq!(m.pointer("/parser/date_formats/0").unwrap(), "%Y-%m-%d");
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let a = serde_json::json!({"parser": {"date_formats": ["a", "b"]}});
        let b = serde_json::json!({"parser": {"date_formats": ["c"]}});
        let m = deep_merge(a, b);
        assert_eq!(m.pointer("/parser/date_formats").unwrap(), &serde_json::json!(["c"]));
    }

    #[test]
    fn empty_layer_is_ignored() {
        let a = load_layered_yaml_from_strings(&["report:\n  decimals: 3\n", ""]).unwrap();
        assert_eq!(a.config_json.pointer("/report/decimals").unwrap(), 3);
    }

    #[test]
    fn invalid_yaml_is_error() {
        let err = load_layered_yaml_from_strings(&["parser: [unclosed"]).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn loads_from_files_in_order() {
        let mut base = tempfile::NamedTempFile::new().unwrap();
        writeln!(base, "calendar:\n  week_start: monday\nreport:\n  decimals: 4").unwrap();
        let mut over = tempfile::NamedTempFile::new().unwrap();
        writeln!(over, "report:\n  decimals: 0").unwrap();

        let loaded = load_layered_yaml(&[base.path(), over.path()]).unwrap();
        let cfg = loaded.settings().unwrap();
        assert_eq!(cfg.calendar.week_start, WeekStart::Monday);
        assert_eq!(cfg.report.decimals, 0);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_layered_yaml(&["/nonexistent/pnlcal.yaml"]).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("pnlcal.yaml"));
    }
}
