use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversion::ConversionRegistry;
use crate::kind::QuantityKind;
use crate::provider::{BuiltinTables, JsonDirectoryTables, LayeredTables};

/// Conversion table configuration, usually read from a TOML file:
///
/// ```toml
/// tables_dir = "conversion_tables"
///
/// [overrides.length]
/// furlong = 201.168
/// ```
///
/// Tables found in `tables_dir` take precedence over the built-in ones.
/// Overrides add or replace linear units on top of whichever table is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, BTreeMap<String, f64>>,
}

impl UnitsConfig {
    /// Load from `path`; a relative `tables_dir` is resolved against the
    /// directory containing the file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read units config {}", path.display()))?;
        let mut config: UnitsConfig = contents
            .parse()
            .with_context(|| format!("Failed to parse units config {}", path.display()))?;
        if let (Some(dir), Some(parent)) = (&config.tables_dir, path.parent()) {
            if dir.is_relative() {
                config.tables_dir = Some(parent.join(dir));
            }
        }
        Ok(config)
    }

    /// Overrides must name registered, non-affine kinds with usable factors.
    pub fn validate(&self) -> Result<()> {
        for (kind, units) in &self.overrides {
            let quantity_kind: QuantityKind = kind
                .parse()
                .with_context(|| format!("Invalid override section [overrides.{kind}]"))?;
            if quantity_kind.is_affine() || quantity_kind == QuantityKind::Derived {
                anyhow::bail!("Overrides are not supported for '{kind}'");
            }
            for (symbol, factor) in units {
                if !factor.is_finite() || *factor == 0.0 {
                    anyhow::bail!("Override '{symbol}' in '{kind}' must be finite and non-zero");
                }
            }
        }
        Ok(())
    }

    pub fn provider(&self) -> LayeredTables {
        let mut provider = LayeredTables::new();
        if let Some(dir) = &self.tables_dir {
            provider = provider.with_layer(JsonDirectoryTables::new(dir));
        }
        provider
            .with_layer(BuiltinTables)
            .with_overrides(self.overrides.clone())
    }

    pub fn registry(&self) -> Result<ConversionRegistry> {
        self.validate()?;
        Ok(ConversionRegistry::new(self.provider()))
    }
}

impl FromStr for UnitsConfig {
    type Err = toml::de::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
