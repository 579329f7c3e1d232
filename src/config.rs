use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Region used when `--region` is not given
    pub region: String,
    pub pricing: PricingConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub source: PricingSourceKind,
    /// Fixed rates, consulted when `source = "static"`
    pub rates: Vec<StaticRate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingSourceKind {
    /// AWS Price List API
    #[default]
    Aws,
    /// `[[pricing.rates]]` entries in this file
    Static,
}

impl std::str::FromStr for PricingSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(PricingSourceKind::Aws),
            "static" => Ok(PricingSourceKind::Static),
            _ => Err(ConfigError::UnknownPricingSource(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRate {
    pub instance_type: String,
    /// Applies to every region when absent
    pub region: Option<String>,
    pub managed_per_hour: f64,
    pub compute_per_hour: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            pricing: PricingConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .emrcost.toml in current dir, then ~/.config/emrcost/config.toml
            let local = PathBuf::from(".emrcost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("emrcost").join("config.toml"))
                    .unwrap_or(local)
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content).map_err(|e| match e {
                ConfigError::ParseError(msg) => ConfigError::ParseError(format!(
                    "{}: {}",
                    config_path.display(),
                    msg
                ))
                .into(),
                other => other.into(),
            })
        } else {
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration.");
            }
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        for rate in &self.pricing.rates {
            for (field, value) in [
                ("managed_per_hour", rate.managed_per_hour),
                ("compute_per_hour", rate.compute_per_hour),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidValue {
                        field: format!("pricing.rates[{}].{}", rate.instance_type, field),
                        reason: format!("must be a non-negative number, got {}", value),
                    });
                }
            }
        }
        Ok(())
    }

    /// Explicit flag wins over the configured region.
    pub fn effective_region(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .unwrap_or_else(|| self.region.clone())
    }
}
