//! Per-graph memo of computed metrics
//!
//! The cache is only ever cleared wholesale. A generation counter guards
//! against storing a value computed before an invalidation that raced it.

use crate::algebra::ExpSum;
use crate::model::{Element, Observer};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Names under which graph results are cached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Reliability,
    Availability,
    Maintainability,
    Mttf,
    Mttr,
    SuccessPaths,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Reliability => "reliability",
            Metric::Availability => "availability",
            Metric::Maintainability => "maintainability",
            Metric::Mttf => "mttf",
            Metric::Mttr => "mttr",
            Metric::SuccessPaths => "success_paths",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Cached {
    Formula(ExpSum),
    Value(f64),
    Paths(Arc<Vec<Vec<Element>>>),
}

#[derive(Debug, Default)]
pub(crate) struct MetricCache {
    entries: RwLock<FxHashMap<Metric, Cached>>,
    generation: AtomicU64,
}

impl MetricCache {
    /// Current generation; pass it back to [`MetricCache::insert`]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn get(&self, metric: Metric) -> Option<Cached> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&metric)
            .cloned()
    }

    /// Store a value unless the cache was cleared since `generation`
    pub fn insert(&self, metric: Metric, value: Cached, generation: u64) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation() == generation {
            entries.insert(metric, value);
        }
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&metric)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }
}

impl Observer for MetricCache {
    fn invalidate(&self) {
        debug!("clearing {} cached graph metric(s)", self.len());
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let cache = MetricCache::default();
        let generation = cache.generation();
        cache.insert(Metric::Mttf, Cached::Value(10.0), generation);
        assert!(cache.contains(Metric::Mttf));

        cache.invalidate();
        assert_eq!(cache.len(), 0);
        assert!(cache.get(Metric::Mttf).is_none());
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let cache = MetricCache::default();
        let generation = cache.generation();
        cache.clear();
        cache.insert(Metric::Reliability, Cached::Formula(ExpSum::one()), generation);
        assert!(!cache.contains(Metric::Reliability));
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(Metric::SuccessPaths.as_str(), "success_paths");
        assert_eq!(
            serde_json::to_string(&Metric::Mttr).unwrap(),
            "\"mttr\""
        );
    }
}
