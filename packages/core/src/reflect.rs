//! Runtime type descriptions.
//!
//! Rust has no runtime reflection, so every mappable type describes itself
//! through [`Reflect`]. A [`TypeRef`] is the cheap, copyable identity of such
//! a type; its [`TypeInfo`] says what kind of type it is, which shapes it
//! closes, what it derives from, and (for objects) which properties it has.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::object::{getter, FieldRef, Getter, ObjectInfo};
use crate::scalar::ScalarKind;
use crate::shape::{ClosedShape, OpenShape};

/// A type-erased owned value.
pub type Instance = Box<dyn Any>;

/// Types that can describe themselves at runtime.
///
/// ```rust
/// use recordmap_core::{ObjectInfo, Reflect, TypeInfo, TypeKind};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Reflect for Point {
///     fn type_info() -> TypeInfo {
///         TypeInfo::new(TypeKind::Struct(
///             ObjectInfo::builder::<Point>()
///                 .field("X", |p| &p.x, |p, v| p.x = v)
///                 .field("Y", |p| &p.y, |p, v| p.y = v)
///                 .build(),
///         ))
///     }
/// }
/// ```
pub trait Reflect: Any {
    fn type_info() -> TypeInfo;
}

/// Identity of a reflected type.
///
/// Equality, ordering and hashing go by `TypeId`; the name is only for
/// display. The description itself is produced lazily through `info()`.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    info: fn() -> TypeInfo,
}

impl TypeRef {
    pub fn of<T: Reflect>() -> Self {
        TypeRef {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            info: T::type_info,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type path, e.g. `alloc::vec::Vec<i32>`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Build a fresh description of the type.
    pub fn info(&self) -> TypeInfo {
        (self.info)()
    }

    /// Whether `value` is an instance of this type.
    pub fn is_instance(&self, value: &dyn Any) -> bool {
        value.type_id() == self.id
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Description of a type: its kind, the shapes it closes, and its base.
#[derive(Clone)]
pub struct TypeInfo {
    pub kind: TypeKind,
    pub capabilities: Vec<ClosedShape>,
    pub base: Option<TypeRef>,
    base_view: Option<Getter>,
}

impl TypeInfo {
    pub fn new(kind: TypeKind) -> Self {
        TypeInfo {
            kind,
            capabilities: Vec::new(),
            base: None,
            base_view: None,
        }
    }

    /// Declare that the type closes `shape`.
    pub fn implements(mut self, shape: ClosedShape) -> Self {
        self.capabilities.push(shape);
        self
    }

    /// Declare the base type whose capabilities are inherited.
    pub fn extends(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare a base type whose capabilities and properties are both
    /// inherited. Inherited properties are read from the base value that
    /// `view` produces for an instance of `T`.
    pub fn inherits<T, B>(mut self, view: impl Fn(&T) -> B + Send + Sync + 'static) -> Self
    where
        T: Reflect,
        B: Reflect,
    {
        self.base = Some(TypeRef::of::<B>());
        self.base_view = Some(getter(move |owner: &dyn Any| {
            let owner = owner.downcast_ref::<T>()?;
            Some(FieldRef::Owned(Box::new(view(owner))))
        }));
        self
    }

    /// Projection of an instance onto its base, when properties are inherited.
    pub fn base_view(&self) -> Option<&Getter> {
        self.base_view.as_ref()
    }

    /// Scalar or enum.
    pub fn is_value(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(_) | TypeKind::Enum(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface(_))
    }

    /// Properties of a struct or interface.
    pub fn object(&self) -> Option<&ObjectInfo> {
        match &self.kind {
            TypeKind::Struct(object) | TypeKind::Interface(object) => Some(object),
            _ => None,
        }
    }

    /// The capability closing `shape`, if declared directly on this type.
    pub fn declared(&self, shape: &OpenShape) -> Option<&ClosedShape> {
        self.capabilities.iter().find(|c| c.shape() == shape)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("kind", &self.kind)
            .field("capabilities", &self.capabilities)
            .field("base", &self.base)
            .field("inherits_properties", &self.base_view.is_some())
            .finish()
    }
}

/// What a type is, plus the operations needed to take it apart and rebuild it.
#[derive(Clone, Debug)]
pub enum TypeKind {
    Scalar(ScalarKind),
    Enum(EnumInfo),
    /// A transparent indirection such as `Option<T>` or `Box<T>`.
    Wrapper(WrapperInfo),
    Sequence(SequenceOps),
    Map(MapOps),
    Struct(ObjectInfo),
    /// Readable through its properties; constructed through an implementation.
    Interface(ObjectInfo),
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Scalar(_) => "scalar",
            TypeKind::Enum(_) => "enum",
            TypeKind::Wrapper(_) => "wrapper",
            TypeKind::Sequence(_) => "sequence",
            TypeKind::Map(_) => "map",
            TypeKind::Struct(_) => "struct",
            TypeKind::Interface(_) => "interface",
        }
    }
}

/// A single-slot indirection around `inner`.
#[derive(Clone, Copy)]
pub struct WrapperInfo {
    pub inner: TypeRef,
    /// Whether the wrapper can be empty (`Option`) or always holds a value (`Box`).
    pub nullable: bool,
    /// Borrow the wrapped value; `None` when empty or not a wrapper instance.
    pub unwrap: fn(&dyn Any) -> Option<&dyn Any>,
    /// Wrap an inner instance; `None` builds the empty wrapper when nullable.
    pub wrap: fn(Option<Instance>) -> Option<Instance>,
}

impl fmt::Debug for WrapperInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperInfo")
            .field("inner", &self.inner)
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// Iterate and rebuild an ordered collection.
#[derive(Clone, Copy)]
pub struct SequenceOps {
    pub iter: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    /// `None` when an item has the wrong type or the length does not fit.
    pub collect: fn(Vec<Instance>) -> Option<Instance>,
}

impl fmt::Debug for SequenceOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SequenceOps")
    }
}

/// Iterate and rebuild a keyed collection.
#[derive(Clone, Copy)]
pub struct MapOps {
    pub entries: fn(&dyn Any) -> Option<Vec<(&dyn Any, &dyn Any)>>,
    pub collect: fn(Vec<(Instance, Instance)>) -> Option<Instance>,
}

impl fmt::Debug for MapOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapOps")
    }
}

/// Symbolic names and underlying values of a fieldless enum.
///
/// The ordinal of a variant is its discriminant, as returned by the
/// `discriminant` function given at construction (usually `|v| *v as i64`).
///
/// ```rust
/// use recordmap_core::EnumInfo;
///
/// #[derive(Clone, Copy, PartialEq)]
/// enum Level { Low = 10, High = 20 }
///
/// let info = EnumInfo::new(&[("Low", Level::Low), ("High", Level::High)], |l| *l as i64);
/// assert_eq!(info.name_of(&Level::High), Some("High"));
/// assert_eq!(info.ordinal_of(&Level::High), Some(20));
/// assert!(info.from_ordinal(1).is_none());
/// ```
#[derive(Clone)]
pub struct EnumInfo {
    names: Arc<[&'static str]>,
    ordinals: Arc<[i64]>,
    index: Arc<dyn Fn(&dyn Any) -> Option<usize> + Send + Sync>,
    make: Arc<dyn Fn(usize) -> Option<Instance> + Send + Sync>,
}

impl EnumInfo {
    pub fn new<T>(variants: &[(&'static str, T)], discriminant: fn(&T) -> i64) -> Self
    where
        T: Copy + PartialEq + Send + Sync + 'static,
    {
        let names: Arc<[&'static str]> = variants.iter().map(|(name, _)| *name).collect();
        let ordinals: Arc<[i64]> = variants.iter().map(|(_, value)| discriminant(value)).collect();
        let values: Arc<[T]> = variants.iter().map(|(_, value)| *value).collect();
        let lookup = Arc::clone(&values);
        EnumInfo {
            names,
            ordinals,
            index: Arc::new(move |any: &dyn Any| {
                let value = any.downcast_ref::<T>()?;
                lookup.iter().position(|v| v == value)
            }),
            make: Arc::new(move |index: usize| {
                values.get(index).map(|v| Box::new(*v) as Instance)
            }),
        }
    }

    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Underlying values, in declaration order.
    pub fn ordinals(&self) -> &[i64] {
        &self.ordinals
    }

    pub fn ordinal_of(&self, value: &dyn Any) -> Option<i64> {
        (self.index)(value).and_then(|i| self.ordinals.get(i).copied())
    }

    pub fn name_of(&self, value: &dyn Any) -> Option<&'static str> {
        (self.index)(value).and_then(|i| self.names.get(i).copied())
    }

    /// The variant whose underlying value is `ordinal`.
    pub fn from_ordinal(&self, ordinal: i64) -> Option<Instance> {
        let index = self.ordinals.iter().position(|o| *o == ordinal)?;
        (self.make)(index)
    }

    pub fn from_name(&self, name: &str) -> Option<Instance> {
        let index = self.names.iter().position(|n| *n == name)?;
        (self.make)(index)
    }

    /// The first declared variant.
    pub fn first(&self) -> Option<Instance> {
        (self.make)(0)
    }
}

impl fmt::Debug for EnumInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumInfo").field(&self.names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Color {
        Red,
        Green,
        Blue,
    }

    fn colors() -> EnumInfo {
        EnumInfo::new(
            &[
                ("Red", Color::Red),
                ("Green", Color::Green),
                ("Blue", Color::Blue),
            ],
            |c| *c as i64,
        )
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Level {
        Low = 10,
        High = 20,
    }

    #[test]
    fn enum_names_and_ordinals() {
        let info = colors();
        assert_eq!(info.names(), &["Red", "Green", "Blue"]);
        assert_eq!(info.name_of(&Color::Blue), Some("Blue"));
        assert_eq!(info.ordinal_of(&Color::Green), Some(1));
        assert_eq!(info.ordinal_of(&42i32), None);
    }

    #[test]
    fn enum_construction() {
        let info = colors();
        let green = info.from_name("Green").unwrap();
        assert_eq!(green.downcast_ref::<Color>(), Some(&Color::Green));
        let blue = info.from_ordinal(2).unwrap();
        assert_eq!(blue.downcast_ref::<Color>(), Some(&Color::Blue));
        assert!(info.from_name("Purple").is_none());
        assert!(info.from_ordinal(3).is_none());
    }

    #[test]
    fn ordinals_are_discriminants() {
        let info = EnumInfo::new(&[("Low", Level::Low), ("High", Level::High)], |l| *l as i64);
        assert_eq!(info.ordinals(), &[10, 20]);
        assert_eq!(info.ordinal_of(&Level::High), Some(20));
        let high = info.from_ordinal(20).unwrap();
        assert_eq!(high.downcast_ref::<Level>(), Some(&Level::High));
        assert!(info.from_ordinal(1).is_none());
        assert!(info.from_ordinal(0).is_none());
    }

    #[test]
    fn type_ref_identity() {
        let a = TypeRef::of::<i32>();
        let b = TypeRef::of::<i32>();
        let c = TypeRef::of::<String>();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.name(), "i32");
        assert!(a.is_instance(&5i32));
        assert!(!a.is_instance(&5i64));
    }

    #[test]
    fn value_types() {
        assert!(TypeRef::of::<i32>().info().is_value());
        assert!(TypeRef::of::<String>().info().is_value());
        assert!(!TypeRef::of::<Vec<i32>>().info().is_value());
        assert!(!TypeRef::of::<Option<i32>>().info().is_value());
    }
}
