//! Generic shapes and capabilities.
//!
//! An [`OpenShape`] is a generic contract with unbound type parameters, like
//! "list of something". A [`ClosedShape`] binds every parameter, like "list
//! of `i32`". Types declare the closed shapes they satisfy in their
//! [`TypeInfo`](crate::TypeInfo).

use std::fmt;

use crate::TypeRef;

/// Whether a shape is an interface contract or a concrete class family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Interface,
    Class,
}

/// A generic shape with `arity` unbound type parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OpenShape {
    name: &'static str,
    arity: usize,
    kind: ShapeKind,
}

/// Anything that can be iterated in order.
pub const SEQUENCE: OpenShape = OpenShape::interface("Sequence", 1);
/// Fixed-length arrays.
pub const ARRAY: OpenShape = OpenShape::class("Array", 1);
/// Growable ordered collections.
pub const LIST: OpenShape = OpenShape::interface("List", 1);
/// Keyed collections; arguments are key then value.
pub const MAP: OpenShape = OpenShape::interface("Map", 2);

impl OpenShape {
    pub const fn interface(name: &'static str, arity: usize) -> Self {
        OpenShape {
            name,
            arity,
            kind: ShapeKind::Interface,
        }
    }

    pub const fn class(name: &'static str, arity: usize) -> Self {
        OpenShape {
            name,
            arity,
            kind: ShapeKind::Class,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ShapeKind::Interface
    }

    /// Bind every type parameter.
    ///
    /// # Panics
    ///
    /// Panics if `arguments.len()` differs from the shape's arity. Shapes
    /// are closed in `Reflect` impls, where a wrong count is a programming
    /// error.
    pub fn close(self, arguments: Vec<TypeRef>) -> ClosedShape {
        assert_eq!(
            arguments.len(),
            self.arity,
            "{} takes {} type argument(s)",
            self.name,
            self.arity
        );
        ClosedShape {
            shape: self,
            arguments,
        }
    }
}

impl fmt::Display for OpenShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.name, ",".repeat(self.arity.saturating_sub(1)))
    }
}

/// An open shape with all of its type parameters bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClosedShape {
    shape: OpenShape,
    arguments: Vec<TypeRef>,
}

impl ClosedShape {
    pub fn shape(&self) -> &OpenShape {
        &self.shape
    }

    /// Type arguments in declaration order.
    pub fn arguments(&self) -> &[TypeRef] {
        &self.arguments
    }
}

impl fmt::Display for ClosedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<", self.shape.name)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(arg.name())?;
        }
        f.write_str(">")
    }
}

/// A capability query: either "closes this open shape with anything" or
/// "closes exactly this closed shape".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Open(OpenShape),
    Closed(ClosedShape),
}

impl Capability {
    pub fn shape(&self) -> &OpenShape {
        match self {
            Capability::Open(shape) => shape,
            Capability::Closed(closed) => closed.shape(),
        }
    }

    /// Whether the declared capability `declared` answers this query.
    pub fn matches(&self, declared: &ClosedShape) -> bool {
        match self {
            Capability::Open(shape) => declared.shape() == shape,
            Capability::Closed(closed) => declared == closed,
        }
    }
}

impl From<OpenShape> for Capability {
    fn from(shape: OpenShape) -> Self {
        Capability::Open(shape)
    }
}

impl From<ClosedShape> for Capability {
    fn from(shape: ClosedShape) -> Self {
        Capability::Closed(shape)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Open(shape) => fmt::Display::fmt(shape, f),
            Capability::Closed(closed) => fmt::Display::fmt(closed, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_binds_arguments() {
        let map = MAP.close(vec![TypeRef::of::<String>(), TypeRef::of::<i32>()]);
        assert_eq!(map.shape(), &MAP);
        assert_eq!(map.arguments()[1], TypeRef::of::<i32>());
        assert_eq!(map.to_string(), "Map<alloc::string::String, i32>");
    }

    #[test]
    #[should_panic(expected = "takes 2 type argument")]
    fn close_rejects_wrong_arity() {
        MAP.close(vec![TypeRef::of::<String>()]);
    }

    #[test]
    fn open_query_matches_any_closing() {
        let list_of_i32 = LIST.close(vec![TypeRef::of::<i32>()]);
        let list_of_u8 = LIST.close(vec![TypeRef::of::<u8>()]);

        assert!(Capability::from(LIST).matches(&list_of_i32));
        assert!(!Capability::from(SEQUENCE).matches(&list_of_i32));
        assert!(Capability::from(list_of_i32.clone()).matches(&list_of_i32));
        assert!(!Capability::from(list_of_u8).matches(&list_of_i32));
    }

    #[test]
    fn shape_kinds() {
        assert!(LIST.is_interface());
        assert!(MAP.is_interface());
        assert!(!ARRAY.is_interface());
        assert_eq!(MAP.to_string(), "Map<,>");
    }
}
