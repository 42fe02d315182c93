//! Core recordmap: Records and Reflected Types
//!
//! This layer describes both sides of a conversion:
//! - `Record` / `Value`: the loosely-typed side, a field-name to value tree
//! - `Reflect` / `TypeRef` / `TypeInfo`: runtime descriptions of Rust types
//! - `OpenShape` / `ClosedShape`: generic capabilities such as `List<T>`
//! - `TypeDescriptorCache`: memoized type and capability lookups
//! - `PropertyCache` / `ImplementationSource`: accessors and interface
//!   implementations, behind replaceable traits
//!
//! The converters that join the two sides live in `recordmap-codec`.
//!
//! # Example
//!
//! ```rust
//! use recordmap_core::{TypeDescriptorCache, TypeRef, LIST};
//!
//! let types = TypeDescriptorCache::new();
//! let args = types.closing_arguments(TypeRef::of::<Vec<u32>>(), LIST).unwrap();
//! assert_eq!(args, vec![TypeRef::of::<u32>()]);
//! ```

mod builtin;
mod descriptor;
mod error;
mod implementation;
mod object;
mod property;
mod record;
mod reflect;
mod scalar;
pub mod shape;
mod value;

pub use descriptor::{TypeDescriptor, TypeDescriptorCache};
pub use error::Error;
pub use implementation::{Implementation, ImplementationSource, Implementations, Upcast};
pub use object::{
    getter, setter, Constructor, FieldRef, Getter, ObjectBuilder, ObjectInfo, Property, Setter,
};
pub use property::{DeclaredProperties, PropertyCache, PropertySource};
pub use record::Record;
pub use reflect::{
    EnumInfo, Instance, MapOps, Reflect, SequenceOps, TypeInfo, TypeKind, TypeRef, WrapperInfo,
};
pub use scalar::ScalarKind;
pub use shape::{Capability, ClosedShape, OpenShape, ShapeKind, ARRAY, LIST, MAP, SEQUENCE};
pub use value::Value;
