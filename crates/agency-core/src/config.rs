//! Engine configuration
//!
//! Layering follows the usual order: built-in defaults, then a TOML file, then
//! `AGENCY_*` environment variables, then explicit overrides. The result is
//! validated before an engine is built from it.

use crate::domain::DomainParams;
use crate::errors::{AgencyError, Result};
use crate::identifiers::PrincipalId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment variables read by [`EngineConfig::merge_with_env`].
pub const ENV_PREFIX: &str = "AGENCY_";

/// Configuration for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine name mixed into the domain value
    pub engine_name: String,
    /// Engine version mixed into the domain value
    pub engine_version: String,
    /// Network identifier mixed into the domain value
    pub network_id: u64,
    /// Address of this engine instance
    #[serde(with = "principal_hex")]
    pub engine_address: PrincipalId,
    /// Maximum nesting depth of threshold signer verification
    pub max_signer_depth: usize,
    /// Maximum number of delegations in one chain
    pub max_chain_length: usize,
    /// Maximum number of items in one redemption batch
    pub max_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_name: "DelegationManager".to_string(),
            engine_version: "1".to_string(),
            network_id: 1,
            engine_address: PrincipalId::derive("agency.engine"),
            max_signer_depth: 4,
            max_chain_length: 32,
            max_batch_size: 64,
        }
    }
}

impl EngineConfig {
    /// Default configuration values
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AgencyError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), engine = %config.engine_name, "Loaded engine configuration");
        Ok(config)
    }

    /// Merge `AGENCY_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Merge `AGENCY_*` variables from an explicit iterator
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            if let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) {
                self.set_from_string(&name.to_lowercase(), value.as_ref())?;
                debug!(key = %name.to_lowercase(), "Configuration overridden from environment");
            }
        }
        Ok(())
    }

    /// Set a single configuration value by key name
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "engine_name" => self.engine_name = value.to_string(),
            "engine_version" => self.engine_version = value.to_string(),
            "network_id" => self.network_id = parse_number(key, value)?,
            "engine_address" => self.engine_address = value.parse()?,
            "max_signer_depth" => self.max_signer_depth = parse_number(key, value)?,
            "max_chain_length" => self.max_chain_length = parse_number(key, value)?,
            "max_batch_size" => self.max_batch_size = parse_number(key, value)?,
            other => {
                return Err(AgencyError::config(format!(
                    "unknown configuration key `{other}`"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.engine_name.trim().is_empty() {
            return Err(AgencyError::config("engine_name must not be empty"));
        }
        if self.engine_version.trim().is_empty() {
            return Err(AgencyError::config("engine_version must not be empty"));
        }
        for (name, value) in [
            ("max_signer_depth", self.max_signer_depth),
            ("max_chain_length", self.max_chain_length),
            ("max_batch_size", self.max_batch_size),
        ] {
            if value == 0 {
                return Err(AgencyError::config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }

    /// Domain inputs for this deployment
    pub fn domain_params(&self) -> DomainParams {
        DomainParams {
            name: self.engine_name.clone(),
            version: self.engine_version.clone(),
            network_id: self.network_id,
            engine_address: self.engine_address,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AgencyError::config(format!("invalid value for {key}: {e}")))
}

mod principal_hex {
    use crate::identifiers::PrincipalId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &PrincipalId, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PrincipalId, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
