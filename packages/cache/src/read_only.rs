//! Read-only facade over a shared cache.

use std::marker::PhantomData;

use crate::{CacheError, CacheItemCallback, KeySelector, MissingValueProvider, SharedCache};

/// Exposes the read side of a shared cache.
///
/// Provider-backed `get` still constructs missing values, and the provider
/// and hooks can still be installed; entries cannot be added or removed
/// directly.
pub struct ReadOnlyCache<K, V, S> {
    inner: S,
    _entries: PhantomData<fn(K) -> V>,
}

impl<K, V, S: SharedCache<K, V>> ReadOnlyCache<K, V, S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            _entries: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn has(&self, key: &K) -> bool {
        self.inner.has(key)
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.peek(key)
    }

    pub fn get(&self, key: &K) -> Result<V, CacheError> {
        self.inner.get(key)
    }

    pub fn each(&self, callback: impl FnMut(&K, &V)) {
        self.inner.each(callback)
    }

    pub fn find(&self, predicate: impl FnMut(&V) -> bool) -> Option<V> {
        self.inner.find(predicate)
    }

    pub fn exists(&self, predicate: impl FnMut(&V) -> bool) -> bool {
        self.inner.exists(predicate)
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.keys()
    }

    pub fn values(&self) -> Vec<V> {
        self.inner.values()
    }

    pub fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.with_value(key, callback)
    }

    pub fn set_missing_value_provider(&self, provider: MissingValueProvider<K, V>) {
        self.inner.set_missing_value_provider(provider)
    }

    pub fn set_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.inner.set_value_added(callback)
    }

    pub fn set_value_removed(&self, callback: CacheItemCallback<K, V>) {
        self.inner.set_value_removed(callback)
    }

    pub fn set_duplicate_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.inner.set_duplicate_value_added(callback)
    }

    pub fn set_key_selector(&self, selector: KeySelector<K, V>) {
        self.inner.set_key_selector(selector)
    }
}

impl<K, V, S> std::fmt::Debug for ReadOnlyCache<K, V, S>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReadOnlyCache").field(&self.inner).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LazyCache;
    use std::sync::Arc;

    #[test]
    fn reads_see_writes_made_through_the_owner() {
        let owner = Arc::new(LazyCache::<String, u32>::default());
        let view = ReadOnlyCache::new(Arc::clone(&owner));

        owner.add("a".into(), 1);
        assert!(view.has(&"a".to_string()));
        assert_eq!(view.peek(&"a".to_string()), Some(1));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn get_uses_provider_installed_through_view() {
        let owner = Arc::new(LazyCache::<String, usize>::default());
        let view = ReadOnlyCache::new(Arc::clone(&owner));

        view.set_missing_value_provider(Box::new(|k: &String| Ok(k.len() * 2)));
        assert_eq!(view.get(&"abcd".to_string()).unwrap(), 8);
        assert_eq!(owner.peek(&"abcd".to_string()), Some(8));
    }
}
