use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::core::geo::TileRef;

/// Bytes of recently fetched tiles, least recently used evicted first.
///
/// Shared between fetch tasks, so clones point at the same cache.
#[derive(Debug, Clone)]
pub struct TileCache {
    inner: Arc<Mutex<LruCache<TileRef, Arc<Vec<u8>>>>>,
}

impl TileCache {
    /// A zero capacity is bumped to one entry
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get(&self, tile: &TileRef) -> Option<Arc<Vec<u8>>> {
        self.inner.lock().ok()?.get(tile).cloned()
    }

    pub fn put(&self, tile: TileRef, data: Arc<Vec<u8>>) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(tile, data);
        }
    }

    pub fn contains(&self, tile: &TileRef) -> bool {
        self.inner
            .lock()
            .map(|cache| cache.contains(tile))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let cache = TileCache::new(4);
        let tile = TileRef::new(1, 2, 3);
        assert!(cache.is_empty());

        cache.put(tile, Arc::new(vec![7, 8, 9]));
        assert!(cache.contains(&tile));
        assert_eq!(cache.get(&tile).unwrap().as_slice(), &[7, 8, 9]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = TileCache::new(2);
        let a = TileRef::new(0, 0, 1);
        let b = TileRef::new(1, 0, 1);
        let c = TileRef::new(0, 1, 1);

        cache.put(a, Arc::new(vec![1]));
        cache.put(b, Arc::new(vec![2]));
        // Touch `a` so `b` becomes the eviction candidate
        assert!(cache.get(&a).is_some());
        cache.put(c, Arc::new(vec![3]));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = TileCache::new(2);
        let clone = cache.clone();
        clone.put(TileRef::new(0, 0, 0), Arc::new(vec![0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity() {
        let cache = TileCache::new(0);
        cache.put(TileRef::new(0, 0, 0), Arc::new(vec![0]));
        assert_eq!(cache.len(), 1);
    }
}
