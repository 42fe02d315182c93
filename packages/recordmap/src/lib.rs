//! recordmap: converters between reflected Rust types and records.
//!
//! A [`RecordCodec`] builds one converter per type, lazily and at most once
//! even under concurrent first use, and uses it to turn instances into
//! [`Record`]s (field name to [`Value`]) and back. Recursive and mutually
//! recursive types are supported.
//!
//! The layers are also available on their own:
//! - [`cache`]: keyed lazy caches and their lock decorators
//! - [`model`]: records, the reflection model, type descriptors
//! - [`codec`]: converters and the codec façade
//!
//! ```rust
//! use recordmap::{ObjectInfo, RecordCodec, Reflect, TypeInfo, TypeKind};
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Node { value: i64, next: Option<Box<Node>> }
//!
//! impl Reflect for Node {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::new(TypeKind::Struct(
//!             ObjectInfo::builder::<Node>()
//!                 .field("Value", |n| &n.value, |n, v| n.value = v)
//!                 .field("Next", |n| &n.next, |n, v| n.next = v)
//!                 .build(),
//!         ))
//!     }
//! }
//!
//! let codec = RecordCodec::new();
//! let list = Node { value: 1, next: Some(Box::new(Node { value: 2, next: None })) };
//! let json = codec.to_json(&list).unwrap();
//! assert_eq!(json, serde_json::json!({ "Value": 1, "Next": { "Value": 2 } }));
//! assert_eq!(codec.from_json::<Node>(json).unwrap(), list);
//! ```

pub use recordmap_cache as cache;
pub use recordmap_codec as codec;
pub use recordmap_core as model;

pub use recordmap_codec::{
    CodecConfig, Converter, EnumEncoding, EnumInfo, Error, Implementations, MapEncoding,
    ObjectInfo, Record, RecordCodec, RecordCodecBuilder, Reflect, TypeInfo, TypeKind, TypeRef,
    Value,
};
