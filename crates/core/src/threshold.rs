//! Merge-distance threshold strategies.
//!
//! A strategy maps a unit pair (the unit at `index` and its predecessor) to
//! the integer gap tolerance used by the distance check. The set of kinds is
//! closed; the function behind each kind can be replaced.

use std::collections::HashMap;

use crate::error::{GroupingError, Result};
use crate::unit::MinimumUnit;

/// Gap tolerance, in pixels, used by the fixed strategy.
pub const FIXED_MERGE_THRESHOLD: i32 = 15;

/// Signature of a threshold strategy: all units and the index of the current one.
pub type ThresholdFn = fn(&[MinimumUnit], usize) -> i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MergeThresholdKind {
    #[default]
    Fixed,
    /// Context-sensitive threshold; not yet derived from any signal.
    AdaptiveInference,
}

impl MergeThresholdKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fixed" => Some(MergeThresholdKind::Fixed),
            "adaptive" | "adaptive-inference" => Some(MergeThresholdKind::AdaptiveInference),
            _ => None,
        }
    }
}

/// Always [`FIXED_MERGE_THRESHOLD`].
pub fn fixed_threshold(_units: &[MinimumUnit], _index: usize) -> i32 {
    FIXED_MERGE_THRESHOLD
}

/// Placeholder for the adaptive strategy. Yields 0, which never admits a merge.
pub fn adaptive_inference_threshold(_units: &[MinimumUnit], _index: usize) -> i32 {
    0
}

/// Lookup table from strategy kind to function.
#[derive(Debug, Clone)]
pub struct ThresholdRegistry {
    funcs: HashMap<MergeThresholdKind, ThresholdFn>,
}

impl Default for ThresholdRegistry {
    fn default() -> Self {
        let mut funcs: HashMap<MergeThresholdKind, ThresholdFn> = HashMap::with_capacity(2);
        funcs.insert(MergeThresholdKind::Fixed, fixed_threshold);
        funcs.insert(
            MergeThresholdKind::AdaptiveInference,
            adaptive_inference_threshold,
        );
        Self { funcs }
    }
}

impl ThresholdRegistry {
    /// Registry with no strategies at all.
    pub fn empty() -> Self {
        Self {
            funcs: HashMap::new(),
        }
    }

    /// Replaces (or registers) the function for `kind`.
    pub fn with_strategy(mut self, kind: MergeThresholdKind, func: ThresholdFn) -> Self {
        self.funcs.insert(kind, func);
        self
    }

    pub fn without_strategy(mut self, kind: MergeThresholdKind) -> Self {
        self.funcs.remove(&kind);
        self
    }

    pub fn get(&self, kind: MergeThresholdKind) -> Option<ThresholdFn> {
        self.funcs.get(&kind).copied()
    }

    /// Like [`get`](Self::get), but an absent kind is a configuration error.
    pub fn resolve(&self, kind: MergeThresholdKind) -> Result<ThresholdFn> {
        self.get(kind)
            .ok_or(GroupingError::UnregisteredStrategy(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_both_kinds() {
        let registry = ThresholdRegistry::default();
        let fixed = registry.get(MergeThresholdKind::Fixed).unwrap();
        assert_eq!(fixed(&[], 0), 15);
        let adaptive = registry.get(MergeThresholdKind::AdaptiveInference).unwrap();
        assert_eq!(adaptive(&[], 0), 0);
    }

    #[test]
    fn missing_kind_is_absent_and_resolve_fails() {
        let registry = ThresholdRegistry::default().without_strategy(MergeThresholdKind::Fixed);
        assert!(registry.get(MergeThresholdKind::Fixed).is_none());
        assert!(matches!(
            registry.resolve(MergeThresholdKind::Fixed),
            Err(GroupingError::UnregisteredStrategy(MergeThresholdKind::Fixed))
        ));
        assert!(ThresholdRegistry::empty()
            .get(MergeThresholdKind::AdaptiveInference)
            .is_none());
    }

    #[test]
    fn injected_strategy_replaces_default() {
        fn wide(_: &[MinimumUnit], _: usize) -> i32 {
            100
        }
        let registry = ThresholdRegistry::default().with_strategy(MergeThresholdKind::Fixed, wide);
        assert_eq!(registry.resolve(MergeThresholdKind::Fixed).unwrap()(&[], 0), 100);
    }

    #[test]
    fn kind_from_str() {
        assert_eq!(MergeThresholdKind::from_str("fixed"), Some(MergeThresholdKind::Fixed));
        assert_eq!(
            MergeThresholdKind::from_str("adaptive"),
            Some(MergeThresholdKind::AdaptiveInference)
        );
        assert_eq!(MergeThresholdKind::from_str("fuzzy"), None);
    }
}
