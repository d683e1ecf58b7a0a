//! Session configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How attribute equality is applied when choosing a stub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Headers, params and body must all be equal, absent on both sides included.
    #[default]
    Strict,
    /// Fields missing on either side are ignored; the most specific stub wins.
    Partial,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Strict => "strict",
            MatchMode::Partial => "partial",
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(MatchMode::Strict),
            "partial" => Ok(MatchMode::Partial),
            other => anyhow::bail!("Unknown match mode '{other}', expected 'strict' or 'partial'"),
        }
    }
}

/// Configuration for a [`MockSession`](crate::MockSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockConfig {
    pub match_mode: MatchMode,
    /// Delay applied by [`MockClient`](crate::MockClient) before a result is delivered.
    pub delay_response_ms: u64,
    /// Keep a per-method history of dispatched calls.
    pub record_history: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Strict,
            delay_response_ms: 0,
            record_history: true,
        }
    }
}

impl MockConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn partial() -> Self {
        Self {
            match_mode: MatchMode::Partial,
            ..Self::default()
        }
    }

    /// Load from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = if is_yaml(path) {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML config in {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON config in {}", path.display()))?
        };
        Ok(config)
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}
