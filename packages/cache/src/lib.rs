//! Keyed Lazy Caches
//!
//! The lowest layer of recordmap. Nothing here knows about types or records:
//! - `Cache`: single-owner backing contract (`&mut self` mutation)
//! - `SharedCache`: thread-safe contract (`&self`), at-most-once construction
//! - `DictionaryCache`: `HashMap`-backed backing cache with lifecycle hooks
//! - `LockedCache`: reader/writer lock decorator over any backing cache
//! - `ReadOnlyCache`: narrow read-only facade over a shared cache
//!
//! # Example
//!
//! ```rust
//! use recordmap_cache::{LazyCache, SharedCache};
//!
//! let cache: LazyCache<String, usize> = LazyCache::default();
//! cache.set_missing_value_provider(Box::new(|key: &String| Ok(key.len())));
//!
//! assert_eq!(cache.get(&"hello".to_string()).unwrap(), 5);
//! assert!(cache.has(&"hello".to_string()));
//! ```

mod dictionary;
mod error;
mod locked;
mod read_only;
mod traits;

pub use dictionary::DictionaryCache;
pub use error::CacheError;
pub use locked::{LazyCache, LockedCache};
pub use read_only::ReadOnlyCache;
pub use traits::{Cache, CacheItemCallback, KeySelector, MissingValueProvider, SharedCache};
