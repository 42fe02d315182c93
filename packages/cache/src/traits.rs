//! Cache traits: the single-owner backing contract and the shared contract.

use crate::CacheError;

/// Produces the value for a key that is not cached yet.
pub type MissingValueProvider<K, V> = Box<dyn Fn(&K) -> Result<V, CacheError> + Send + Sync>;

/// Lifecycle hook invoked with the key and the affected value.
pub type CacheItemCallback<K, V> = Box<dyn Fn(&K, &V) + Send + Sync>;

/// Derives the key of a value for `add_value`, `remove_value` and `fill`.
pub type KeySelector<K, V> = Box<dyn Fn(&V) -> K + Send + Sync>;

/// Backing cache contract.
///
/// Implementations are not required to be thread-safe: every mutation takes
/// `&mut self`. Wrap a backing cache in a [`LockedCache`](crate::LockedCache)
/// to share it between threads.
///
/// Values are handed out by clone, so `V` is normally an `Arc` or a small
/// `Copy` type.
pub trait Cache<K, V> {
    /// Number of cached entries.
    fn len(&self) -> usize;

    /// Whether the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a value is cached for `key`.
    fn has(&self, key: &K) -> bool;

    /// The cached value for `key`, without constructing it.
    fn peek(&self, key: &K) -> Option<V>;

    /// The value for `key`, constructed by the missing-value provider when
    /// absent.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` when the key is absent and no provider is installed, or
    /// the provider's error. A failed construction caches nothing.
    fn get(&mut self, key: &K) -> Result<V, CacheError>;

    /// The value for `key`, constructed by `factory` when absent.
    ///
    /// The factory runs at most once per call and only when the key is
    /// absent. Its error is returned unchanged and nothing is cached.
    fn get_or_insert_with<E>(
        &mut self,
        key: &K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E>;

    /// Insert `value` if `key` is absent.
    ///
    /// Returns `false` when the key was already present; the duplicate hook
    /// then receives the discarded value and the cached one is kept.
    fn add(&mut self, key: K, value: V) -> bool;

    /// Insert or replace the value for `key`.
    fn set(&mut self, key: K, value: V);

    /// Insert a value under the key chosen by the key selector.
    fn add_value(&mut self, value: V) -> Result<bool, CacheError>;

    /// Insert every value under the key chosen by the key selector.
    fn fill(&mut self, values: impl IntoIterator<Item = V>) -> Result<(), CacheError> {
        for value in values {
            self.add_value(value)?;
        }
        Ok(())
    }

    /// Remove and return the value for `key`.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Remove the entry whose key the key selector derives from `value`.
    fn remove_value(&mut self, value: &V) -> Result<Option<V>, CacheError>;

    /// Remove every entry, firing the removed hook for each.
    fn clear(&mut self);

    /// Visit every entry.
    fn each(&self, callback: impl FnMut(&K, &V));

    /// The first value matching `predicate`.
    fn find(&self, predicate: impl FnMut(&V) -> bool) -> Option<V>;

    /// Whether any value matches `predicate`.
    fn exists(&self, predicate: impl FnMut(&V) -> bool) -> bool {
        self.find(predicate).is_some()
    }

    /// All cached keys.
    fn keys(&self) -> Vec<K>;

    /// All cached values.
    fn values(&self) -> Vec<V>;

    /// Run `callback` on the cached value for `key`, if any.
    fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R>;

    fn set_missing_value_provider(&mut self, provider: MissingValueProvider<K, V>);
    fn set_value_added(&mut self, callback: CacheItemCallback<K, V>);
    fn set_value_removed(&mut self, callback: CacheItemCallback<K, V>);
    fn set_duplicate_value_added(&mut self, callback: CacheItemCallback<K, V>);
    fn set_key_selector(&mut self, selector: KeySelector<K, V>);
}

/// Thread-safe cache contract.
///
/// Same operations as [`Cache`] through `&self`. `get` and
/// `get_or_insert_with` construct a missing value at most once per key even
/// when many threads ask for the same key before construction completes.
pub trait SharedCache<K, V>: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn has(&self, key: &K) -> bool;

    fn peek(&self, key: &K) -> Option<V>;

    fn get(&self, key: &K) -> Result<V, CacheError>;

    fn get_or_insert_with<E>(
        &self,
        key: &K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E>;

    fn add(&self, key: K, value: V) -> bool;

    fn set(&self, key: K, value: V);

    fn add_value(&self, value: V) -> Result<bool, CacheError>;

    fn fill(&self, values: impl IntoIterator<Item = V>) -> Result<(), CacheError>;

    fn remove(&self, key: &K) -> Option<V>;

    fn remove_value(&self, value: &V) -> Result<Option<V>, CacheError>;

    fn clear(&self);

    fn each(&self, callback: impl FnMut(&K, &V));

    fn find(&self, predicate: impl FnMut(&V) -> bool) -> Option<V>;

    fn exists(&self, predicate: impl FnMut(&V) -> bool) -> bool {
        self.find(predicate).is_some()
    }

    fn keys(&self) -> Vec<K>;

    fn values(&self) -> Vec<V>;

    fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R>;

    fn set_missing_value_provider(&self, provider: MissingValueProvider<K, V>);
    fn set_value_added(&self, callback: CacheItemCallback<K, V>);
    fn set_value_removed(&self, callback: CacheItemCallback<K, V>);
    fn set_duplicate_value_added(&self, callback: CacheItemCallback<K, V>);
    fn set_key_selector(&self, selector: KeySelector<K, V>);
}

// Shared caches are usually held behind an Arc by several owners.

impl<K, V, S: SharedCache<K, V> + ?Sized> SharedCache<K, V> for std::sync::Arc<S> {
    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn has(&self, key: &K) -> bool {
        self.as_ref().has(key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.as_ref().peek(key)
    }

    fn get(&self, key: &K) -> Result<V, CacheError> {
        self.as_ref().get(key)
    }

    fn get_or_insert_with<E>(
        &self,
        key: &K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        self.as_ref().get_or_insert_with(key, factory)
    }

    fn add(&self, key: K, value: V) -> bool {
        self.as_ref().add(key, value)
    }

    fn set(&self, key: K, value: V) {
        self.as_ref().set(key, value)
    }

    fn add_value(&self, value: V) -> Result<bool, CacheError> {
        self.as_ref().add_value(value)
    }

    fn fill(&self, values: impl IntoIterator<Item = V>) -> Result<(), CacheError> {
        self.as_ref().fill(values)
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.as_ref().remove(key)
    }

    fn remove_value(&self, value: &V) -> Result<Option<V>, CacheError> {
        self.as_ref().remove_value(value)
    }

    fn clear(&self) {
        self.as_ref().clear()
    }

    fn each(&self, callback: impl FnMut(&K, &V)) {
        self.as_ref().each(callback)
    }

    fn find(&self, predicate: impl FnMut(&V) -> bool) -> Option<V> {
        self.as_ref().find(predicate)
    }

    fn keys(&self) -> Vec<K> {
        self.as_ref().keys()
    }

    fn values(&self) -> Vec<V> {
        self.as_ref().values()
    }

    fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R> {
        self.as_ref().with_value(key, callback)
    }

    fn set_missing_value_provider(&self, provider: MissingValueProvider<K, V>) {
        self.as_ref().set_missing_value_provider(provider)
    }

    fn set_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.as_ref().set_value_added(callback)
    }

    fn set_value_removed(&self, callback: CacheItemCallback<K, V>) {
        self.as_ref().set_value_removed(callback)
    }

    fn set_duplicate_value_added(&self, callback: CacheItemCallback<K, V>) {
        self.as_ref().set_duplicate_value_added(callback)
    }

    fn set_key_selector(&self, selector: KeySelector<K, V>) {
        self.as_ref().set_key_selector(selector)
    }
}
