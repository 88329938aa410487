// src/config/env.rs

//! Read-only snapshot of the invocation's environment.
//!
//! Taken once at startup and passed explicitly; nothing in the crate reads
//! or mutates the ambient process environment after that point. The engine's
//! child environment is derived from the snapshot with [`EnvSnapshot::with`].

use std::collections::BTreeMap;

pub const ENV_TIMEOUT: &str = "AUDITION_TIMEOUT";
pub const ENV_DEBUG: &str = "AUDITION_DEBUG";
pub const ENV_ONLY: &str = "AUDITION_ONLY";
pub const ENV_CAPTURE_DEVICE: &str = "AUDITION_CAPTURE_DEVICE";
pub const ENV_LOG: &str = "AUDITION_LOG";

/// Marker set in the engine's environment so the audition script knows it is
/// being driven by the runner.
pub const ENV_ENGINE_MARKER: &str = "SC_AUDITION";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment.
    ///
    /// Variables that are not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// True when the variable is present and non-empty.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    /// Value with surrounding whitespace removed; empty counts as unset.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Copy of the snapshot with one variable overridden.
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(key.into(), value.into());
        Self { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_requires_non_empty_value() {
        let env = EnvSnapshot::from_pairs([(ENV_DEBUG, ""), ("OTHER", "1")]);
        assert!(!env.flag(ENV_DEBUG));
        assert!(env.flag("OTHER"));
        assert!(!env.flag("MISSING"));
    }

    #[test]
    fn non_empty_trims() {
        let env = EnvSnapshot::from_pairs([(ENV_ONLY, "  pad  "), ("BLANK", "   ")]);
        assert_eq!(env.non_empty(ENV_ONLY), Some("pad"));
        assert_eq!(env.non_empty("BLANK"), None);
    }

    #[test]
    fn with_does_not_touch_original() {
        let env = EnvSnapshot::from_pairs([("A", "1")]);
        let child = env.with(ENV_ENGINE_MARKER, "1");
        assert_eq!(child.get(ENV_ENGINE_MARKER), Some("1"));
        assert_eq!(env.get(ENV_ENGINE_MARKER), None);
    }
}
