use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{self, Factor};
use crate::conversion::{ConversionTable, ConversionTableProvider};
use crate::error::QuantityError;
use crate::kind::QuantityKind;

/// Tables compiled into the crate from the unit catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTables;

impl ConversionTableProvider for BuiltinTables {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
        let missing = || QuantityError::MissingTable {
            kind: kind.to_string(),
        };
        let quantity_kind = QuantityKind::from_key(kind).ok_or_else(missing)?;

        let table = if quantity_kind.is_affine() {
            let mut units = BTreeMap::new();
            for entry in catalog::entries(quantity_kind) {
                if let Factor::Affine(factor) = entry.factor {
                    units.insert(entry.symbol.to_string(), factor);
                }
            }
            ConversionTable::Affine(units)
        } else {
            let mut units = BTreeMap::new();
            for entry in catalog::entries(quantity_kind) {
                if let Factor::Linear(factor) = entry.factor {
                    units.insert(entry.symbol.to_string(), factor);
                }
            }
            ConversionTable::Linear(units)
        };

        if table.is_empty() {
            return Err(missing());
        }
        Ok(table)
    }
}

#[derive(Deserialize)]
struct TableFile {
    units: ConversionTable,
}

/// Reads `<dir>/<kind>.json` files of the form `{"units": {...}}`.
#[derive(Debug, Clone)]
pub struct JsonDirectoryTables {
    dir: PathBuf,
}

impl JsonDirectoryTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.dir.join(format!("{kind}.json"))
    }
}

impl ConversionTableProvider for JsonDirectoryTables {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
        let path = self.path_for(kind);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(QuantityError::MissingTable {
                    kind: kind.to_string(),
                });
            }
            Err(e) => {
                return Err(QuantityError::invalid_table(
                    kind,
                    format!("failed to read {}: {e}", path.display()),
                ));
            }
        };
        let file: TableFile = serde_json::from_str(&contents).map_err(|e| {
            QuantityError::invalid_table(kind, format!("failed to parse {}: {e}", path.display()))
        })?;
        log::debug!("Read {} table from {}", kind, path.display());
        Ok(file.units)
    }
}

/// Tries each layer in order and merges linear overrides on top.
///
/// A layer that has no table for the kind is skipped; any other failure is
/// reported as-is.
#[derive(Default)]
pub struct LayeredTables {
    layers: Vec<Box<dyn ConversionTableProvider>>,
    overrides: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LayeredTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl ConversionTableProvider + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn with_overrides(mut self, overrides: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        for (kind, units) in overrides {
            self.overrides.entry(kind).or_default().extend(units);
        }
        self
    }
}

impl ConversionTableProvider for LayeredTables {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
        let mut found = None;
        for layer in &self.layers {
            match layer.table(kind) {
                Ok(table) => {
                    found = Some(table);
                    break;
                }
                Err(QuantityError::MissingTable { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        let overrides = self.overrides.get(kind);
        match (found, overrides) {
            (Some(ConversionTable::Linear(mut units)), Some(extra)) => {
                units.extend(extra.iter().map(|(s, f)| (s.clone(), *f)));
                Ok(ConversionTable::Linear(units))
            }
            (Some(ConversionTable::Affine(_)), Some(_)) => Err(QuantityError::invalid_table(
                kind,
                "linear overrides cannot extend an affine table",
            )),
            (Some(table), None) => Ok(table),
            (None, Some(extra)) => Ok(ConversionTable::Linear(extra.clone())),
            (None, None) => Err(QuantityError::MissingTable {
                kind: kind.to_string(),
            }),
        }
    }
}
