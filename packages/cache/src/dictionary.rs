//! `HashMap`-backed cache.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::{Cache, CacheError, CacheItemCallback, KeySelector, MissingValueProvider};

/// Backing cache over a `HashMap`.
///
/// Not thread-safe on its own. Lifecycle hooks run synchronously inside the
/// mutating call that caused them.
pub struct DictionaryCache<K, V> {
    items: HashMap<K, V>,
    missing_value_provider: Option<MissingValueProvider<K, V>>,
    value_added: Option<CacheItemCallback<K, V>>,
    value_removed: Option<CacheItemCallback<K, V>>,
    duplicate_value_added: Option<CacheItemCallback<K, V>>,
    key_selector: Option<KeySelector<K, V>>,
}

impl<K, V> DictionaryCache<K, V> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            missing_value_provider: None,
            value_added: None,
            value_removed: None,
            duplicate_value_added: None,
            key_selector: None,
        }
    }
}

impl<K, V> Default for DictionaryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Debug for DictionaryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryCache")
            .field("len", &self.items.len())
            .field("has_provider", &self.missing_value_provider.is_some())
            .field("has_key_selector", &self.key_selector.is_some())
            .finish()
    }
}

impl<K, V> DictionaryCache<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    fn insert_new(&mut self, key: K, value: V) {
        if let Some(added) = &self.value_added {
            added(&key, &value);
        }
        self.items.insert(key, value);
    }

    fn select_key(&self, value: &V) -> Result<K, CacheError> {
        match &self.key_selector {
            Some(selector) => Ok(selector(value)),
            None => Err(CacheError::NoKeySelector),
        }
    }
}

impl<K, V> Cache<K, V> for DictionaryCache<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone,
{
    fn len(&self) -> usize {
        self.items.len()
    }

    fn has(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.items.get(key).cloned()
    }

    fn get(&mut self, key: &K) -> Result<V, CacheError> {
        if let Some(value) = self.items.get(key) {
            return Ok(value.clone());
        }
        let value = match &self.missing_value_provider {
            Some(provider) => provider(key)?,
            None => return Err(CacheError::key_not_found(key)),
        };
        self.insert_new(key.clone(), value.clone());
        Ok(value)
    }

    fn get_or_insert_with<E>(
        &mut self,
        key: &K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.items.get(key) {
            return Ok(value.clone());
        }
        let value = factory(key)?;
        self.insert_new(key.clone(), value.clone());
        Ok(value)
    }

    fn add(&mut self, key: K, value: V) -> bool {
        match self.items.entry(key) {
            Entry::Occupied(existing) => {
                if let Some(duplicate) = &self.duplicate_value_added {
                    duplicate(existing.key(), &value);
                }
                false
            }
            Entry::Vacant(slot) => {
                if let Some(added) = &self.value_added {
                    added(slot.key(), &value);
                }
                slot.insert(value);
                true
            }
        }
    }

    fn set(&mut self, key: K, value: V) {
        if let Some((old_key, old)) = self.items.remove_entry(&key) {
            if let Some(removed) = &self.value_removed {
                removed(&old_key, &old);
            }
        }
        self.insert_new(key, value);
    }

    fn add_value(&mut self, value: V) -> Result<bool, CacheError> {
        let key = self.select_key(&value)?;
        Ok(self.add(key, value))
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let (key, value) = self.items.remove_entry(key)?;
        if let Some(removed) = &self.value_removed {
            removed(&key, &value);
        }
        Some(value)
    }

    fn remove_value(&mut self, value: &V) -> Result<Option<V>, CacheError> {
        let key = self.select_key(value)?;
        Ok(self.remove(&key))
    }

    fn clear(&mut self) {
        for (key, value) in self.items.drain() {
            if let Some(removed) = &self.value_removed {
                removed(&key, &value);
            }
        }
    }

    fn each(&self, mut callback: impl FnMut(&K, &V)) {
        for (key, value) in &self.items {
            callback(key, value);
        }
    }

    fn find(&self, mut predicate: impl FnMut(&V) -> bool) -> Option<V> {
        self.items.values().find(|v| predicate(*v)).cloned()
    }

    fn keys(&self) -> Vec<K> {
        self.items.keys().cloned().collect()
    }

    fn values(&self) -> Vec<V> {
        self.items.values().cloned().collect()
    }

    fn with_value<R>(&self, key: &K, callback: impl FnOnce(&V) -> R) -> Option<R> {
        self.items.get(key).map(callback)
    }

    fn set_missing_value_provider(&mut self, provider: MissingValueProvider<K, V>) {
        self.missing_value_provider = Some(provider);
    }

    fn set_value_added(&mut self, callback: CacheItemCallback<K, V>) {
        self.value_added = Some(callback);
    }

    fn set_value_removed(&mut self, callback: CacheItemCallback<K, V>) {
        self.value_removed = Some(callback);
    }

    fn set_duplicate_value_added(&mut self, callback: CacheItemCallback<K, V>) {
        self.duplicate_value_added = Some(callback);
    }

    fn set_key_selector(&mut self, selector: KeySelector<K, V>) {
        self.key_selector = Some(selector);
    }
}
