//! Error types for the core layer.

use recordmap_cache::CacheError;

/// Errors raised while describing types or converting records.
///
/// Configuration errors (`UnmappableKey` through `ShapeNotImplemented`) are
/// reported when a converter is built. `Mismatch` and `WrongInstance` are
/// data errors reported while a conversion runs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A map field whose key type is neither a scalar nor an enum.
    #[error("cannot map {owner}.{field}: map key type {key} is not a value type")]
    UnmappableKey {
        owner: String,
        field: String,
        key: String,
    },

    /// An interface was requested but nothing implements it.
    #[error("no implementation registered for interface {interface}")]
    NoImplementation { interface: String },

    /// An interface-only operation received something else.
    #[error("{ty} is not an interface")]
    NotAnInterface { ty: String },

    /// A converter was requested for a type without properties.
    #[error("{ty} is not an object type")]
    NotAnObject { ty: String },

    /// A type declares a shape but does not provide the operations for it.
    #[error("{ty} declares {shape} without providing its operations")]
    MissingShape { ty: String, shape: String },

    /// The type does not close the requested open shape.
    #[error("{ty} does not implement {shape}")]
    ShapeNotImplemented { ty: String, shape: String },

    /// A record value does not fit the field it is assigned to.
    #[error("field {field}: expected {expected}, found {found}")]
    Mismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// A converter or accessor received an instance of another type.
    #[error("expected an instance of {expected}")]
    WrongInstance { expected: String },

    /// A converter was used before its plan was resolved.
    #[error("converter for {ty} is not built yet")]
    ConverterNotReady { ty: String },

    /// Error from the cache layer.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::Mismatch {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn wrong_instance(expected: impl Into<String>) -> Self {
        Error::WrongInstance {
            expected: expected.into(),
        }
    }

    /// Whether this error describes bad input data rather than a type that
    /// cannot be mapped.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Error::Mismatch { .. } | Error::WrongInstance { .. })
    }
}
