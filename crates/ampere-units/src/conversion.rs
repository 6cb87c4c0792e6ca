//! Per-kind unit conversion.
//!
//! A [`ConversionManager`] is built once from a table handed out by a
//! [`ConversionTableProvider`] and is read-only afterwards. Tables are plain
//! numbers: linear kinds map a symbol to its factor against the base unit,
//! affine kinds (temperature) map a symbol to a scale/offset pair.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::QuantityError;
use crate::kind::QuantityKind;
use crate::provider::BuiltinTables;

/// `base = value * scale + offset`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineFactor {
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

impl AffineFactor {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn to_base(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn from_base(&self, base: f64) -> f64 {
        (base - self.offset) / self.scale
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConversionTable {
    Linear(BTreeMap<String, f64>),
    Affine(BTreeMap<String, AffineFactor>),
}

impl ConversionTable {
    pub fn is_affine(&self) -> bool {
        matches!(self, ConversionTable::Affine(_))
    }

    pub fn contains(&self, symbol: &str) -> bool {
        match self {
            ConversionTable::Linear(t) => t.contains_key(symbol),
            ConversionTable::Affine(t) => t.contains_key(symbol),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ConversionTable::Linear(t) => t.len(),
            ConversionTable::Affine(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn symbols(&self) -> Vec<&str> {
        match self {
            ConversionTable::Linear(t) => t.keys().map(String::as_str).collect(),
            ConversionTable::Affine(t) => t.keys().map(String::as_str).collect(),
        }
    }

    /// Reject tables that cannot convert in both directions, or whose shape
    /// does not match a registered kind: temperature needs scale/offset
    /// pairs and every other kind plain factors.
    pub fn validate(&self, kind: &str) -> Result<(), QuantityError> {
        if self.is_empty() {
            return Err(QuantityError::invalid_table(kind, "table is empty"));
        }
        if let Some(quantity_kind) = QuantityKind::from_key(kind) {
            match (quantity_kind.is_affine(), self.is_affine()) {
                (true, false) => {
                    return Err(QuantityError::invalid_table(
                        kind,
                        "expected scale/offset pairs, found plain factors",
                    ));
                }
                (false, true) => {
                    return Err(QuantityError::invalid_table(
                        kind,
                        "expected plain factors, found scale/offset pairs",
                    ));
                }
                _ => {}
            }
        }
        let bad = |symbol: &str, what: &str| {
            QuantityError::invalid_table(kind, format!("{what} for '{symbol}' must be finite and non-zero"))
        };
        match self {
            ConversionTable::Linear(t) => {
                for (symbol, factor) in t {
                    if !factor.is_finite() || *factor == 0.0 {
                        return Err(bad(symbol, "factor"));
                    }
                }
            }
            ConversionTable::Affine(t) => {
                for (symbol, factor) in t {
                    if !factor.scale.is_finite() || factor.scale == 0.0 {
                        return Err(bad(symbol, "scale"));
                    }
                    if !factor.offset.is_finite() {
                        return Err(QuantityError::invalid_table(
                            kind,
                            format!("offset for '{symbol}' must be finite"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Source of conversion tables, keyed by [`QuantityKind::key`].
pub trait ConversionTableProvider: Send + Sync {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError>;
}

impl<P: ConversionTableProvider + ?Sized> ConversionTableProvider for Arc<P> {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
        (**self).table(kind)
    }
}

impl<P: ConversionTableProvider + ?Sized> ConversionTableProvider for Box<P> {
    fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
        (**self).table(kind)
    }
}

#[derive(Debug, Clone)]
pub struct ConversionManager {
    kind: String,
    table: ConversionTable,
}

impl ConversionManager {
    pub fn new(kind: &str, provider: &dyn ConversionTableProvider) -> Result<Self, QuantityError> {
        let table = provider.table(kind)?;
        Self::from_table(kind, table)
    }

    pub fn from_table(kind: &str, table: ConversionTable) -> Result<Self, QuantityError> {
        table.validate(kind)?;
        log::debug!("Loaded {} conversion table with {} units", kind, table.len());
        Ok(Self {
            kind: kind.to_string(),
            table,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn table(&self) -> &ConversionTable {
        &self.table
    }

    pub fn convert(&self, value: f64, from_unit: &str, to_unit: &str) -> Result<f64, QuantityError> {
        if from_unit == to_unit {
            return Ok(value);
        }
        match &self.table {
            ConversionTable::Linear(t) => {
                let from = self.lookup(t, from_unit)?;
                let to = self.lookup(t, to_unit)?;
                Ok(value * from / to)
            }
            ConversionTable::Affine(t) => {
                let from = self.lookup(t, from_unit)?;
                let to = self.lookup(t, to_unit)?;
                Ok(to.from_base(from.to_base(value)))
            }
        }
    }

    fn lookup<T: Copy>(&self, table: &BTreeMap<String, T>, symbol: &str) -> Result<T, QuantityError> {
        table
            .get(symbol)
            .copied()
            .ok_or_else(|| QuantityError::unknown_unit(&self.kind, symbol))
    }
}

/// Lazily builds and caches one [`ConversionManager`] per kind.
///
/// Managers are shared behind `Arc` and never change once built, so a
/// registry can be used from several threads at once.
pub struct ConversionRegistry {
    provider: Box<dyn ConversionTableProvider>,
    managers: Mutex<HashMap<QuantityKind, Arc<ConversionManager>>>,
}

impl ConversionRegistry {
    pub fn new(provider: impl ConversionTableProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            managers: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide registry over the compiled-in tables.
    pub fn builtin() -> &'static ConversionRegistry {
        static BUILTIN: OnceLock<ConversionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| ConversionRegistry::new(BuiltinTables))
    }

    pub fn manager(&self, kind: QuantityKind) -> Result<Arc<ConversionManager>, QuantityError> {
        if kind == QuantityKind::Derived {
            return Err(QuantityError::MissingTable {
                kind: kind.key().to_string(),
            });
        }
        if let Some(manager) = self.cached(kind) {
            return Ok(manager);
        }
        // Built without the lock held so a slow table read does not stall
        // other kinds. Two threads may race to build the same kind; the first
        // one stored wins.
        let manager = Arc::new(ConversionManager::new(kind.key(), self.provider.as_ref())?);
        let mut managers = self.managers.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(managers.entry(kind).or_insert(manager).clone())
    }

    fn cached(&self, kind: QuantityKind) -> Option<Arc<ConversionManager>> {
        let managers = self.managers.lock().unwrap_or_else(PoisonError::into_inner);
        managers.get(&kind).cloned()
    }

    pub fn convert(
        &self,
        kind: QuantityKind,
        value: f64,
        from_unit: &str,
        to_unit: &str,
    ) -> Result<f64, QuantityError> {
        if from_unit == to_unit {
            return Ok(value);
        }
        self.manager(kind)?.convert(value, from_unit, to_unit)
    }
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let managers = self.managers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut loaded: Vec<_> = managers.keys().map(QuantityKind::key).collect();
        loaded.sort_unstable();
        f.debug_struct("ConversionRegistry")
            .field("loaded", &loaded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use super::*;

    fn builtin(kind: QuantityKind) -> Arc<ConversionManager> {
        ConversionRegistry::builtin().manager(kind).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_identity_short_circuits() {
        let m = builtin(QuantityKind::Length);
        assert_eq!(m.convert(42.0, "m", "m").unwrap(), 42.0);
        // not in the table, but identical symbols never touch it
        assert_eq!(m.convert(1.5, "furlong", "furlong").unwrap(), 1.5);
    }

    #[test]
    fn test_linear_conversions() {
        let cases = [
            (QuantityKind::Length, 1.0, "m", "mm", 1000.0, 1e-6),
            (QuantityKind::Length, 25.4, "mm", "in", 1.0, 1e-6),
            (QuantityKind::Length, 1.0, "ft", "in", 12.0, 1e-9),
            (QuantityKind::Mass, 454.0, "g", "lb", 1.0, 1e-2),
            (QuantityKind::Time, 1200.0, "s", "h", 0.333_333_33, 1e-8),
            (QuantityKind::Voltage, 10_000.0, "V", "kV", 10.0, 1e-9),
            (QuantityKind::Energy, 1.0, "kWh", "J", 3.6e6, 1e-6),
            (QuantityKind::Charge, 5000.0, "mAh", "C", 18_000.0, 1e-6),
            (QuantityKind::Frequency, 1.0, "Hz", "rad/s", 2.0 * std::f64::consts::PI, 1e-9),
            (QuantityKind::Frequency, 1.0, "Hz", "rpm", 60.0, 1e-9),
            (QuantityKind::Angle, 90.0, "deg", "grad", 100.0, 1e-9),
            (QuantityKind::Force, 1.0, "kgf", "lbf", 2.204_62, 1e-5),
            (QuantityKind::Pressure, 1.0, "atm", "Pa", 101_325.0, 1e-9),
            (QuantityKind::Speed, 60.0, "mph", "m/s", 26.8224, 1e-4),
            (QuantityKind::Area, 1.0, "acre", "m2", 4046.856_42, 1e-5),
            (QuantityKind::Volume, 5.0, "gal", "m3", 0.018_927_05, 1e-8),
            (QuantityKind::Resistance, 1.0, "GΩ", "Ω", 1e9, 1e-3),
            (QuantityKind::MassFlowRate, 1.0, "lb/s", "kg/s", 0.453_592_37, 1e-9),
            (QuantityKind::ThermalConductivity, 100.0, "W/(cm*K)", "W/(m*K)", 10_000.0, 1e-6),
        ];
        for (kind, value, from, to, expected, tol) in cases {
            let result = builtin(kind).convert(value, from, to).unwrap();
            assert_close(result, expected, tol);
        }
    }

    #[test]
    fn test_temperature_is_affine() {
        let m = builtin(QuantityKind::Temperature);
        assert!(m.table().is_affine());
        assert_close(m.convert(0.0, "C", "F").unwrap(), 32.0, 1e-9);
        assert_close(m.convert(373.15, "K", "C").unwrap(), 100.0, 1e-9);
        assert_close(m.convert(212.0, "F", "C").unwrap(), 100.0, 1e-9);
        assert_close(m.convert(0.0, "K", "C").unwrap(), -273.15, 1e-9);
        assert_close(m.convert(32.0, "F", "K").unwrap(), 273.15, 1e-9);
        assert_close(m.convert(491.67, "R", "F").unwrap(), 32.0, 1e-9);
    }

    #[test]
    fn test_unknown_unit() {
        let m = builtin(QuantityKind::Length);
        let err = m.convert(1.0, "bogus_unit", "m").unwrap_err();
        assert!(matches!(
            err,
            QuantityError::UnknownUnit { ref symbol, .. } if symbol == "bogus_unit"
        ));
        assert!(matches!(
            m.convert(1.0, "m", "bogus_unit"),
            Err(QuantityError::UnknownUnit { .. })
        ));
        let t = builtin(QuantityKind::Temperature);
        assert!(matches!(
            t.convert(1.0, "K", "bogus_unit"),
            Err(QuantityError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_tables() {
        let zero = ConversionTable::Linear(BTreeMap::from([("x".to_string(), 0.0)]));
        assert!(matches!(
            ConversionManager::from_table("length", zero),
            Err(QuantityError::InvalidTable { .. })
        ));
        let empty = ConversionTable::Linear(BTreeMap::new());
        assert!(ConversionManager::from_table("length", empty).is_err());
        let nan_offset = ConversionTable::Affine(BTreeMap::from([(
            "C".to_string(),
            AffineFactor {
                scale: 1.0,
                offset: f64::NAN,
            },
        )]));
        assert!(ConversionManager::from_table("temperature", nan_offset).is_err());
    }

    #[test]
    fn test_rejects_table_shape_for_kind() {
        let plain = ConversionTable::Linear(BTreeMap::from([
            ("K".to_string(), 1.0),
            ("C".to_string(), 1.0),
        ]));
        let err = ConversionManager::from_table("temperature", plain.clone()).unwrap_err();
        insta::assert_snapshot!(
            err,
            @"Invalid conversion table for 'temperature': expected scale/offset pairs, found plain factors"
        );
        assert!(ConversionManager::from_table("length", plain).is_ok());

        let pairs = ConversionTable::Affine(BTreeMap::from([("m".to_string(), AffineFactor::IDENTITY)]));
        assert!(matches!(
            ConversionManager::from_table("length", pairs.clone()),
            Err(QuantityError::InvalidTable { .. })
        ));
        // keys outside the kind registry are not checked for shape
        assert!(ConversionManager::from_table("custom", pairs).is_ok());
    }

    #[test]
    fn test_registry_caches_managers() {
        let registry = ConversionRegistry::new(BuiltinTables);
        let a = registry.manager(QuantityKind::Voltage).unwrap();
        let b = registry.manager(QuantityKind::Voltage).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(matches!(
            registry.manager(QuantityKind::Derived),
            Err(QuantityError::MissingTable { .. })
        ));
    }

    struct SlowTables {
        entered: Arc<Barrier>,
        release: Arc<Barrier>,
    }

    impl ConversionTableProvider for SlowTables {
        fn table(&self, kind: &str) -> Result<ConversionTable, QuantityError> {
            if kind == "length" {
                self.entered.wait();
                self.release.wait();
            }
            BuiltinTables.table(kind)
        }
    }

    #[test]
    fn test_slow_table_does_not_block_other_kinds() {
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let registry = Arc::new(ConversionRegistry::new(SlowTables {
            entered: entered.clone(),
            release: release.clone(),
        }));
        let slow = {
            let registry = registry.clone();
            std::thread::spawn(move || registry.convert(QuantityKind::Length, 1.0, "km", "m").unwrap())
        };

        // the length table is now being read on the other thread
        entered.wait();
        let mv = registry.convert(QuantityKind::Voltage, 1.0, "V", "mV").unwrap();
        assert_eq!(mv, 1000.0);
        release.wait();

        assert_eq!(slow.join().unwrap(), 1000.0);
        assert!(Arc::ptr_eq(
            &registry.manager(QuantityKind::Length).unwrap(),
            &registry.manager(QuantityKind::Length).unwrap()
        ));
    }

    #[test]
    fn test_registry_is_shareable_across_threads() {
        let registry = Arc::new(ConversionRegistry::new(BuiltinTables));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry
                        .convert(QuantityKind::Current, i as f64, "A", "mA")
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![0.0, 1000.0, 2000.0, 3000.0]);
    }

    #[test]
    fn test_table_deserializes_both_shapes() {
        let linear: ConversionTable = serde_json::from_str(r#"{"m": 1.0, "km": 1000}"#).unwrap();
        assert!(!linear.is_affine());
        assert_eq!(linear.symbols(), vec!["km", "m"]);
        let affine: ConversionTable =
            serde_json::from_str(r#"{"K": {"scale": 1.0}, "C": {"scale": 1.0, "offset": 273.15}}"#)
                .unwrap();
        assert!(affine.is_affine());
        assert!(affine.contains("C"));
    }
}
