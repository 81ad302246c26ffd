//! Settings loaded from an optional TOML file.
//!
//! Every key is optional; anything missing falls back to [`Settings::default`].
//! Command-line flags are applied on top by the binary.

use crate::domain::simplify::SimplifyStrategy;
use crate::error::Result;
use crate::interfaces::report::ReportFormat;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Debt matching policy.
    pub strategy: SimplifyStrategy,
    /// Report format written to stdout.
    pub format: ReportFormat,
    /// Currency for groups whose records do not name one.
    pub default_currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: SimplifyStrategy::default(),
            format: ReportFormat::default(),
            default_currency: "USD".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
