//! Environment variable configuration adapter.
//!
//! Each key maps to the upper-cased variable of the same name
//! (`cache_url` → `CACHE_URL`). Unset or blank variables fall through to an
//! optional file-backed adapter.

use crate::ports::config_port::ConfigPort;
use std::collections::HashMap;
use std::env;

pub struct EnvConfigAdapter {
    overrides: Option<HashMap<String, String>>,
    fallback: Option<Box<dyn ConfigPort + Send + Sync>>,
}

impl EnvConfigAdapter {
    pub fn from_env() -> Self {
        Self {
            overrides: None,
            fallback: None,
        }
    }

    /// Read from `vars` instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn ConfigPort + Send + Sync>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn lookup(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(vars) => vars.get(name).cloned(),
            None => env::var(name).ok(),
        };
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

impl ConfigPort for EnvConfigAdapter {
    fn get_string(&self, key: &str) -> Option<String> {
        self.lookup(&key.to_uppercase())
            .or_else(|| self.fallback.as_ref().and_then(|f| f.get_string(key)))
    }
}
