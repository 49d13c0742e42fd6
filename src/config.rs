//! `ParameterMap`: the immutable-after-load, access-recorded configuration
//! contract. Parses the line-oriented `key = value` / `[table]`
//! / `#comment` grammar, applies `key=value` command-line overrides, and
//! tracks which keys were actually read so unused keys can be warned about
//! (or rejected, in strict mode) at shutdown.
//!
//! Grounded in the shape of a `yaml_patch.rs` precedent: a small, generic,
//! inline-unit-tested module. The grammar itself is not YAML — a
//! different, explicit contract is wanted here, so this module is new
//! rather than adapted from `yaml_patch::Patch`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crate::error::ConfigError;

/// A single parsed value, before it has been interpreted as a particular
/// type. Values are parsed on demand: the map stores the raw
/// string and converts it when a typed getter is called.
#[derive(Clone, Debug, PartialEq)]
pub struct RawValue(String);

impl RawValue {
    fn as_bool(&self) -> Option<bool> {
        match self.0.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

/// An immutable, keyed bag of configuration values, built once at startup
/// from a parameter file plus command-line overrides. Reads are recorded so
/// [`ParameterMap::warn_unused`] / [`ParameterMap::unused_keys`] can report
/// keys nobody looked at.
#[derive(Clone, Debug)]
pub struct ParameterMap {
    values: BTreeMap<String, RawValue>,
    read_keys: RefCell<HashSet<String>>,
    strict: bool,
}

fn is_valid_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

fn validate_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(is_valid_key_char)
}

impl ParameterMap {
    /// Parse a parameter file's text. `path` is used only for error
    /// messages.
    pub fn parse(path: &str, text: &str) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        let mut headings_seen = HashSet::new();
        let mut table_prefix = String::new();

        for (line_no, raw_line) in text.lines().enumerate() {
            let line_no = line_no + 1;
            let line = strip_comment(raw_line).trim();

            if line.is_empty() {
                continue;
            }

            if let Some(heading) = parse_heading(line) {
                if !validate_key(heading) {
                    return Err(ConfigError::InvalidKey { path: path.into(), line: line_no, key: heading.into() });
                }
                if !headings_seen.insert(heading.to_string()) {
                    return Err(ConfigError::DuplicateHeading { path: path.into(), heading: heading.into() });
                }
                if values.keys().any(|k: &String| k == heading) {
                    return Err(ConfigError::HeadingKeyCollision { path: path.into(), key: heading.into() });
                }
                table_prefix = format!("{heading}.");
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::MalformedLine { path: path.into(), line: line_no, text: raw_line.into() });
            };
            let key = key.trim();
            let value = value.trim();

            if !validate_key(key) {
                return Err(ConfigError::InvalidKey { path: path.into(), line: line_no, key: key.into() });
            }
            let full_key = format!("{table_prefix}{key}");
            if headings_seen.contains(&full_key) {
                return Err(ConfigError::HeadingKeyCollision { path: path.into(), key: full_key });
            }
            values.insert(full_key, RawValue(value.to_string()));
        }

        Ok(Self { values, read_keys: RefCell::new(HashSet::new()), strict: false })
    }

    /// Build an empty map, useful for tests and for setups that take all
    /// parameters from presets/overrides.
    pub fn empty() -> Self {
        Self { values: BTreeMap::new(), read_keys: RefCell::new(HashSet::new()), strict: false }
    }

    /// Reject unknown keys (including overrides) instead of merely warning
    /// about them at shutdown.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Apply a single `key=value` command-line override, replacing any
    /// value already present at `key`.
    pub fn apply_override(&mut self, token: &str) -> Result<(), ConfigError> {
        let Some((key, value)) = token.split_once('=') else {
            return Err(ConfigError::MalformedOverride { token: token.into() });
        };
        let key = key.trim();
        if !validate_key(key) {
            return Err(ConfigError::MalformedOverride { token: token.into() });
        }
        if self.strict && !self.values.contains_key(key) {
            return Err(ConfigError::UnknownKey { key: key.into() });
        }
        self.values.insert(key.to_string(), RawValue(value.trim().to_string()));
        Ok(())
    }

    pub fn apply_overrides<I: IntoIterator<Item = S>, S: AsRef<str>>(&mut self, tokens: I) -> Result<(), ConfigError> {
        for token in tokens {
            self.apply_override(token.as_ref())?;
        }
        Ok(())
    }

    fn mark_read(&self, key: &str) {
        self.read_keys.borrow_mut().insert(key.to_string());
    }

    fn raw(&self, key: &str) -> Option<&RawValue> {
        self.mark_read(key);
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| ConfigError::TypeMismatch {
                key: key.into(), value: v.0.clone(), expected: "bool",
            }),
        }
    }

    pub fn require_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.raw(key)
            .ok_or_else(|| ConfigError::MissingKey { key: key.into() })?
            .as_bool()
            .ok_or_else(|| ConfigError::TypeMismatch { key: key.into(), value: self.values[key].0.clone(), expected: "bool" })
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => v.as_i64().ok_or_else(|| ConfigError::TypeMismatch {
                key: key.into(), value: v.0.clone(), expected: "integer",
            }),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| ConfigError::TypeMismatch {
                key: key.into(), value: v.0.clone(), expected: "float",
            }),
        }
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ConfigError> {
        let raw = self.raw(key).ok_or_else(|| ConfigError::MissingKey { key: key.into() })?;
        raw.as_f64().ok_or_else(|| ConfigError::TypeMismatch { key: key.into(), value: raw.0.clone(), expected: "float" })
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        match self.raw(key) {
            None => default.to_string(),
            Some(v) => v.0.clone(),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, ConfigError> {
        self.raw(key).map(|v| v.0.clone()).ok_or_else(|| ConfigError::MissingKey { key: key.into() })
    }

    /// Keys present in the map that were never read by a typed getter.
    pub fn unused_keys(&self) -> Vec<String> {
        let read = self.read_keys.borrow();
        self.values.keys().filter(|k| !read.contains(*k)).cloned().collect()
    }

    /// Log (via `tracing::warn!`) every key that was never read, or return
    /// an error if `strict` was set.
    pub fn warn_unused(&self) -> Result<(), ConfigError> {
        let unused = self.unused_keys();
        if unused.is_empty() {
            return Ok(());
        }
        if self.strict {
            return Err(ConfigError::UnknownKey { key: unused.join(", ") });
        }
        for key in &unused {
            tracing::warn!(key, "parameter was never read");
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    let cut = line.find(['#', ';']).unwrap_or(line.len());
    &line[..cut]
}

fn parse_heading(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
        Some(&line[1..line.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_flat_keys() {
        let m = ParameterMap::parse("t", "cfl = 0.4\nnx = 100\nname = sod\n").unwrap();
        assert_eq!(m.get_f64("cfl", 0.0).unwrap(), 0.4);
        assert_eq!(m.get_i64("nx", 0).unwrap(), 100);
        assert_eq!(m.get_str("name", ""), "sod");
    }

    #[test]
    fn table_headings_prefix_keys() {
        let m = ParameterMap::parse("t", "[gravity]\nenabled = true\nhigh_accuracy_gradient = false\n").unwrap();
        assert!(m.get_bool("gravity.enabled", false).unwrap());
        assert!(!m.get_bool("gravity.high_accuracy_gradient", true).unwrap());
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let m = ParameterMap::parse("t", "# a comment\n\n; another\ncfl = 0.3\n").unwrap();
        assert_eq!(m.get_f64("cfl", 0.0).unwrap(), 0.3);
    }

    #[test]
    fn duplicate_heading_is_an_error() {
        let err = ParameterMap::parse("t", "[a]\nx = 1\n[a]\ny = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateHeading { .. }));
    }

    #[test]
    fn heading_key_collision_is_an_error() {
        let err = ParameterMap::parse("t", "a = 1\n[a]\nx = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::HeadingKeyCollision { .. }));
    }

    #[test]
    fn override_replaces_file_value() {
        let mut m = ParameterMap::parse("t", "cfl = 0.4\n").unwrap();
        m.apply_override("cfl=0.2").unwrap();
        assert_eq!(m.get_f64("cfl", 0.0).unwrap(), 0.2);
    }

    #[test]
    fn unused_keys_are_reported() {
        let m = ParameterMap::parse("t", "cfl = 0.4\nnx = 10\n").unwrap();
        m.get_f64("cfl", 0.0).unwrap();
        assert_eq!(m.unused_keys(), vec!["nx".to_string()]);
    }

    #[test]
    fn strict_mode_rejects_unknown_override() {
        let mut m = ParameterMap::parse("t", "cfl = 0.4\n").unwrap().with_strict(true);
        assert!(m.apply_override("bogus=1").is_err());
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(ParameterMap::parse("t", "not a key value line\n").is_err());
    }
}
