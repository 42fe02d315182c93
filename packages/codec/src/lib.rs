//! Record Codec: Converters Between Reflected Types and Records
//!
//! This layer joins the two sides described by `recordmap-core`. It adds:
//! - `RecordCodec`: the entry point, an owned registry of converters
//! - `Converter`: the per-type plan, built once and shared as `Arc`
//! - `FieldStrategy` / `FieldMapper`: how each field is copied
//! - `CodecConfig`: enum and map encodings, lenient reads
//! - Record <-> `serde_json` conversions
//!
//! Converters are built lazily. Building one type builds every type it
//! reaches, including itself when the type is recursive.
//!
//! # Example
//!
//! ```rust
//! use recordmap_codec::{EnumInfo, ObjectInfo, RecordCodec, Reflect, TypeInfo, TypeKind};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! enum Color { #[default] Red, Green }
//!
//! impl Reflect for Color {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::new(TypeKind::Enum(EnumInfo::new(
//!             &[("Red", Color::Red), ("Green", Color::Green)],
//!             |c| *c as i64,
//!         )))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Paint { color: Color }
//!
//! impl Reflect for Paint {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::new(TypeKind::Struct(
//!             ObjectInfo::builder::<Paint>()
//!                 .field("Color", |p| &p.color, |p, v| p.color = v)
//!                 .build(),
//!         ))
//!     }
//! }
//!
//! let codec = RecordCodec::new();
//! let json = codec.to_json(&Paint { color: Color::Green }).unwrap();
//! assert_eq!(json, serde_json::json!({ "Color": "Green" }));
//!
//! let paint: Paint = codec.from_json(serde_json::json!({ "Color": 1 })).unwrap();
//! assert_eq!(paint.color, Color::Green);
//! ```

mod builder;
mod codec;
mod config;
mod convert;
mod converter;
mod mapper;
mod strategy;

pub use builder::ConverterBuilder;
pub use codec::{ConverterView, RecordCodec, RecordCodecBuilder};
pub use config::{CodecConfig, EnumEncoding, MapEncoding};
pub use convert::{json_to_record, json_to_value, record_to_json, value_to_json};
pub use converter::Converter;
pub use mapper::FieldMapper;
pub use strategy::{Element, FieldStrategy, Slot, ValueCodec};

// Re-export core types for convenience
pub use recordmap_core::{
    getter, setter, Capability, ClosedShape, DeclaredProperties, EnumInfo, Error, FieldRef,
    Implementation, ImplementationSource, Implementations, Instance, MapOps, ObjectInfo,
    OpenShape, Property, PropertySource, Record, Reflect, SequenceOps, TypeDescriptorCache,
    TypeInfo, TypeKind, TypeRef, Value, ARRAY, LIST, MAP, SEQUENCE,
};
