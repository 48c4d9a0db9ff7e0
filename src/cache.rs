use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Memo cache with optional least-recently-used eviction.
///
/// With `capacity == None` entries are never evicted. Single-threaded:
/// interior mutability via `RefCell`, no locking.
pub struct MemoCache<K, V> {
    capacity: Option<usize>,
    inner: RefCell<Inner<K, V>>,
}

struct Inner<K, V> {
    entries: HashMap<K, (V, u64)>,
    /// Last-use tick → key, oldest first.
    order: BTreeMap<u64, K>,
    tick: u64,
}

impl<K: Clone + Eq + Hash, V: Clone> MemoCache<K, V> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            inner: RefCell::new(Inner {
                entries: HashMap::new(),
                order: BTreeMap::new(),
                tick: 0,
            }),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Return the cached value for `key`, building it with `make` on a miss.
    ///
    /// `make` runs outside the borrow, so it may use other caches freely.
    pub fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> V) -> V {
        if let Some(value) = self.touch(&key) {
            return value;
        }
        let value = make();
        self.insert(key, value.clone());
        value
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.touch(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.entries.clear();
        inner.order.clear();
    }

    fn touch(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.borrow_mut();
        inner.tick += 1;
        let tick = inner.tick;
        let (value, old_tick) = {
            let slot = inner.entries.get_mut(key)?;
            let old = slot.1;
            slot.1 = tick;
            (slot.0.clone(), old)
        };
        inner.order.remove(&old_tick);
        inner.order.insert(tick, key.clone());
        Some(value)
    }

    fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.borrow_mut();
        inner.tick += 1;
        let tick = inner.tick;
        if let Some((_, old_tick)) = inner.entries.insert(key.clone(), (value, tick)) {
            inner.order.remove(&old_tick);
        }
        inner.order.insert(tick, key);

        if let Some(capacity) = self.capacity {
            while inner.entries.len() > capacity {
                let Some((_, oldest)) = inner.order.pop_first() else {
                    break;
                };
                inner.entries.remove(&oldest);
                tracing::debug!("memo cache evicted an entry (capacity {})", capacity);
            }
        }
    }
}
