use crate::core::{Result, ShardError, ShardLayout};
use crate::distribution::{PlacementKind, ShardDistributionPolicy};
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Hit/miss counters of a [`PolicyCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicyCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded cache of built policies, keyed by layout and placement.
///
/// Useful to a coordinator that keeps evaluating the same candidate shapes.
/// Cached policies are shared through `Arc`; the policies themselves are
/// immutable, so handing out clones of the `Arc` is safe across threads.
pub struct PolicyCache {
    entries: Mutex<LruCache<(ShardLayout, PlacementKind), Arc<ShardDistributionPolicy>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PolicyCache {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ShardError::ConfigError("policy cache capacity must be >= 1".to_string())
        })?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Returns the cyclic-window policy for `layout`, building it on a miss.
    pub fn get_or_build(&self, layout: ShardLayout) -> Result<Arc<ShardDistributionPolicy>> {
        self.get_or_build_with(layout, PlacementKind::CyclicWindow)
    }

    /// Returns the policy for `layout` placed with `placement`, building it on a miss.
    ///
    /// Invalid layouts are cached too; their policy simply reports `is_valid() == false`.
    pub fn get_or_build_with(
        &self,
        layout: ShardLayout,
        placement: PlacementKind,
    ) -> Result<Arc<ShardDistributionPolicy>> {
        let key = (layout, placement);
        {
            let mut entries = self.entries.lock()?;
            if let Some(policy) = entries.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(policy));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Policy cache miss for {} ({})", layout, placement.as_str());
        // built outside the lock; a racing builder produces an identical policy
        let policy = Arc::new(ShardDistributionPolicy::with_strategy(
            layout,
            placement.strategy(),
        )?);

        let mut entries = self.entries.lock()?;
        let policy = entries.get_or_insert(key, || policy).clone();
        Ok(policy)
    }

    pub fn contains(&self, layout: ShardLayout, placement: PlacementKind) -> Result<bool> {
        Ok(self.entries.lock()?.contains(&(layout, placement)))
    }

    pub fn clear(&self) -> Result<()> {
        self.entries.lock()?.clear();
        Ok(())
    }

    pub fn stats(&self) -> Result<PolicyCacheStats> {
        Ok(PolicyCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock()?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(
            PolicyCache::new(0),
            Err(ShardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_hit_returns_same_policy() {
        let cache = PolicyCache::new(4).unwrap();
        let layout = ShardLayout::new(24, 3, 8);

        let first = cache.get_or_build(layout).unwrap();
        let second = cache.get_or_build(layout).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats().unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_placement_is_part_of_key() {
        let cache = PolicyCache::new(4).unwrap();
        let layout = ShardLayout::new(10, 2, 4);

        let cyclic = cache.get_or_build(layout).unwrap();
        let striped = cache
            .get_or_build_with(layout, PlacementKind::Striped)
            .unwrap();
        assert_eq!(cyclic.strategy_name(), "cyclic-window");
        assert_eq!(striped.strategy_name(), "striped");
        assert_eq!(cache.stats().unwrap().entries, 2);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = PolicyCache::new(2).unwrap();
        let a = ShardLayout::new(10, 1, 1);
        let b = ShardLayout::new(10, 1, 2);
        let c = ShardLayout::new(10, 1, 5);

        cache.get_or_build(a).unwrap();
        cache.get_or_build(b).unwrap();
        cache.get_or_build(a).unwrap();
        cache.get_or_build(c).unwrap();

        assert!(cache.contains(a, PlacementKind::CyclicWindow).unwrap());
        assert!(!cache.contains(b, PlacementKind::CyclicWindow).unwrap());
        assert!(cache.contains(c, PlacementKind::CyclicWindow).unwrap());

        cache.clear().unwrap();
        assert_eq!(cache.stats().unwrap().entries, 0);
    }

    #[test]
    fn test_invalid_layouts_are_cached() {
        let cache = PolicyCache::new(2).unwrap();
        let policy = cache.get_or_build(ShardLayout::new(10, 11, 10)).unwrap();
        assert!(!policy.is_valid());
        assert!(
            cache
                .contains(ShardLayout::new(10, 11, 10), PlacementKind::CyclicWindow)
                .unwrap()
        );
    }
}
