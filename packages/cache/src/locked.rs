//! Reader/writer lock decorator.

use std::fmt::Debug;
use std::hash::Hash;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::{
    Cache, CacheError, CacheItemCallback, DictionaryCache, KeySelector, MissingValueProvider,
    SharedCache,
};

/// Thread-safe cache over a backing [`Cache`].
///
/// One lock guards every operation. Lookups of present keys only take the
/// shared lock. A missing key is resolved under an upgradable read lock,
/// which admits concurrent readers but excludes other upgraders, so exactly
/// one thread runs the factory for a given key while the rest wait and then
/// observe the inserted value.
///
/// Factories and hooks run while the lock is held and must not call back
/// into the same cache.
#[derive(Debug, Default)]
pub struct LockedCache<C> {
    inner: RwLock<C>,
}

/// The usual thread-safe lazy cache.
pub type LazyCache<K, V> = LockedCache<DictionaryCache<K, V>>;

impl<C> LockedCache<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }
}

impl<K, V> LazyCache<K, V>
where
    K: Clone + Eq + Hash + Debug + 'static,
    V: Clone + 'static,
{
    /// A lazy cache with `provider` installed as its missing-value provider.
    pub fn with_provider(
        provider: impl Fn(&K) -> Result<V, CacheError> + Send + Sync + 'static,
    ) -> Self {
        let mut backing = DictionaryCache::new();
        backing.set_missing_value_provider(Box::new(provider));
        Self::new(backing)
    }
}

impl<C, K, V> SharedCache<K, V> for LockedCache<C>
where
    C: Cache<K, V> + Send + Sync,
{
    fn len(&self) -> usize {
        self.inner.read().len()
    }

    fn has(&self, key: &K) -> bool {
        self.inner.read().has(key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.inner.read().peek(key)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        if let Some(value) = self.inner.read().peek(key) {
            return Ok(value);
        }
        let guard = self.inner.upgradable_read();
        if let Some(value) = guard.peek(key) {
            return Ok(value);
        }
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.get(key)
    }

    fn get_or_insert_with<E>(
        &self,
        key: &K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.inner.read().peek(key) {
            return Ok(value);
        }
        let guard = self.inner.upgradable_read();
        if let Some(value) = guard.peek(key) {
            return Ok(value);
        }
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.get_or_insert_with(key, factory)
    }

    fn add(&self, key: K, value: V) -> bool {
        self.inner.write().add(key, value)
    }

    fn set(&self, key: K, value: V) {
        self.inner.write().set(key, value)
    }

    fn add_value(&self, value: V) -> Result<bool, CacheError> {
        self.inner.write().add_value(value)
    }

    fn fill(&self, values: impl IntoIterator<Item = V>) -> Result<(), CacheError> {
        self.inner.write().fill(values)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    fn remove_value(&self, value: &V) -> Result<Option<V>, CacheError> {
        self.inner.write().remove_value(value)
    }

    fn clear(&self) {
        self.inner.write().clear()
    }

    fn each(&self, callback: impl FnMut(&K, &V)) {
        self.inner.read().each(callback)
    }

    fn find(&self, predicate: impl FnMut(&V) -> bool) -> Option<V> {
        self.inner.read().find(predicate)
    }

    fn keys(&self) -> Vec<K> {
        self.inner.read().keys()
    }

    fn values(&self) -> Vec<V> {
        self.inner.read().values()
    }

    fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.read().with_value(key, callback)
    }

    fn set_missing_value_provider(&self, provider: MissingValueProvider<K, V>) {
        self.inner.write().set_missing_value_provider(provider)
    }

    fn set_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.inner.write().set_value_added(callback)
    }

    fn set_value_removed(&self, callback: CacheItemCallback<K, V>) {
        self.inner.write().set_value_removed(callback)
    }

    fn set_duplicate_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.inner.write().set_duplicate_value_added(callback)
    }

    fn set_key_selector(&self, selector: KeySelector<K, V>) {
        self.inner.write().set_key_selector(selector)
    }
}
