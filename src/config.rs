//! Registry configuration.
//!
//! Defaults suit almost every application. Overrides come from the
//! environment (`MANAGED_DI_*` variables) or, with the `config` feature, from
//! JSON.

use std::env;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::internal::MAX_DEPTH;

const ENV_PREFIX: &str = "MANAGED_DI";

/// Tunables for resolution.
///
/// # Examples
///
/// ```
/// use managed_di::{Registry, RegistryConfig};
///
/// let config = RegistryConfig { max_depth: 64, ..RegistryConfig::default() };
/// let registry = Registry::with_config(config.clone());
/// assert_eq!(registry.config(), &config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RegistryConfig {
    /// Deepest provider construction chain allowed.
    ///
    /// Construction recurses once per level, so limits much above the
    /// default need a thread with a larger stack.
    pub max_depth: usize,
    /// Turn re-entrant provider construction into `DiError::Circular`
    pub detect_cycles: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_depth: MAX_DEPTH, detect_cycles: true }
    }
}

impl RegistryConfig {
    /// Defaults overridden by `MANAGED_DI_MAX_DEPTH` and `MANAGED_DI_DETECT_CYCLES`.
    pub fn from_env() -> DiResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env_value("MAX_DEPTH")? {
            config.max_depth = v;
        }
        if let Some(v) = env_value("DETECT_CYCLES")? {
            config.detect_cycles = v;
        }
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DiResult<()> {
        if self.max_depth == 0 {
            return Err(DiError::Config("max_depth must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> DiResult<Option<T>> {
    let name = format!("{}_{}", ENV_PREFIX, key);
    match env::var(&name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| DiError::Config(format!("{} has invalid value `{}`", name, raw))),
        Err(_) => Ok(None),
    }
}
