//! Selecting and configuring a predictor at runtime.

use std::path::Path;
use serde::{ Deserialize, Serialize };

use crate::error::ConfigError;
use crate::predictor::*;

/// Configuration for any of the available predictors.
///
/// In JSON this is an object tagged with `"kind"`, for example:
///
/// ```text
/// { "kind": "piecewise", "contexts": 32, "rows": 8, "history": 30 }
/// { "kind": "gshare", "table_bits": 15, "history_length": 15 }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredictorConfig {
    Piecewise(PiecewiseConfig),
    Gshare(GshareConfig),
}
impl PredictorConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Piecewise(c) => c.validate(),
            Self::Gshare(c) => c.validate(),
        }
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        match self {
            Self::Piecewise(c) => c.storage_bits(),
            Self::Gshare(c) => c.storage_bits(),
        }
    }

    /// Use this configuration to create a new predictor.
    pub fn build(self) -> Result<Box<dyn BranchPredictor>, ConfigError> {
        let p: Box<dyn BranchPredictor> = match self {
            Self::Piecewise(c) => Box::new(c.build()?),
            Self::Gshare(c) => Box::new(c.build()?),
        };
        Ok(p)
    }
}
impl Default for PredictorConfig {
    fn default() -> Self {
        Self::Piecewise(PiecewiseConfig::default())
    }
}
