//! Raw key/value maps fed into schema validation.
//!
//! An [`EnvironmentMap`] is built fresh by every `load()` call, either from
//! dotenv text or from an [`EnvSnapshot`] of the process environment. Keys
//! may be present but unset so the schema, not the source, decides what is
//! missing.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::mode::RunMode;

// KEY=VALUE with optional whitespace around the key and the `=`.
static RE_DOTENV_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_.-]+)\s*=\s*(.*)?\s*$").expect("dotenv line pattern")
});

fn unquote(raw: &str) -> String {
    let quoted_with = |quote: char| raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote);

    if quoted_with('"') {
        raw[1..raw.len() - 1].replace("\\n", "\n")
    } else if quoted_with('\'') {
        raw[1..raw.len() - 1].to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Flat mapping of configuration keys to raw string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentMap {
    entries: BTreeMap<String, Option<String>>,
}

impl EnvironmentMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse dotenv-formatted text (`KEY=VALUE` per line).
    ///
    /// Values are taken literally: no `$VAR` expansion and no inline
    /// comments. A value wrapped in matching single or double quotes loses
    /// the quotes, and `\n` inside double quotes becomes a newline.
    /// Unquoted values are trimmed. Lines that are not `KEY=VALUE` (blank
    /// lines, comments) are skipped. Later duplicates win.
    pub fn parse_dotenv(content: &str) -> Self {
        let mut map = EnvironmentMap::new();

        for line in content.split(|c| c == '\n' || c == '\r') {
            let Some(caps) = RE_DOTENV_LINE.captures(line) else {
                continue;
            };
            let key = &caps[1];
            let raw = caps.get(2).map_or("", |m| m.as_str());
            map.insert(key, unquote(raw));
        }

        map
    }

    /// Set `key` to `value`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Record `key` as known but without a value.
    pub fn insert_unset(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    /// Value for `key`, or `None` when absent or unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    /// Whether `key` appears in the map, set or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvironmentMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = EnvironmentMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Point-in-time copy of process environment variables.
///
/// Captured once at startup and passed explicitly to whatever needs the
/// environment, so resolution never reads global state behind the caller's
/// back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        EnvSnapshot { vars }
    }

    /// Add or replace a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Remove a variable.
    pub fn without_var(mut self, key: &str) -> Self {
        self.vars.remove(key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Run-mode named by [`crate::RUN_MODE_VAR`]; an empty value counts as unset.
    pub fn run_mode(&self) -> Option<RunMode> {
        self.get(crate::RUN_MODE_VAR)
            .filter(|value| !value.is_empty())
            .map(RunMode::from)
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvSnapshot {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
