//! Concrete implementations for interface types.

use std::fmt;
use std::sync::Arc;

use recordmap_cache::{LazyCache, SharedCache};

use crate::{Error, Instance, Reflect, TypeInfo, TypeRef};

/// Converts a boxed concrete instance into the interface container.
pub type Upcast = Arc<dyn Fn(Instance) -> Option<Instance> + Send + Sync>;

/// A constructible type standing in for an interface.
#[derive(Clone)]
pub struct Implementation {
    concrete: TypeRef,
    upcast: Upcast,
}

impl Implementation {
    /// `C` implements interface container `I` through `upcast`.
    pub fn new<I, C>(upcast: impl Fn(C) -> I + Send + Sync + 'static) -> Self
    where
        I: Reflect,
        C: Reflect,
    {
        Implementation {
            concrete: TypeRef::of::<C>(),
            upcast: Arc::new(move |instance: Instance| {
                let concrete = instance.downcast::<C>().ok()?;
                Some(Box::new(upcast(*concrete)) as Instance)
            }),
        }
    }

    pub fn concrete(&self) -> TypeRef {
        self.concrete
    }

    /// Wrap a concrete instance; `None` when it is not of the concrete type.
    pub fn upcast(&self, instance: Instance) -> Option<Instance> {
        (self.upcast)(instance)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Implementation").field(&self.concrete).finish()
    }
}

/// Finds the concrete type to construct for an interface.
pub trait ImplementationSource: Send + Sync {
    /// # Errors
    ///
    /// `NotAnInterface` when `interface` is not an interface type,
    /// `NoImplementation` when nothing implements it.
    fn implementation(&self, interface: TypeRef, info: &TypeInfo) -> Result<Implementation, Error>;
}

/// Registry of interface implementations.
///
/// The first registration for an interface wins; later ones are logged and
/// dropped.
pub struct Implementations {
    registry: LazyCache<TypeRef, Implementation>,
}

impl Implementations {
    pub fn new() -> Self {
        let registry: LazyCache<TypeRef, Implementation> = LazyCache::default();
        registry.set_duplicate_value_added(Box::new(
            |interface: &TypeRef, rejected: &Implementation| {
                tracing::warn!(
                    "ignoring implementation {} for {}: already registered",
                    rejected.concrete(),
                    interface
                );
            },
        ));
        Implementations { registry }
    }

    /// Register `C` as the implementation of interface container `I`.
    ///
    /// Returns `false` when `I` already had one.
    pub fn register<I, C>(&self, upcast: impl Fn(C) -> I + Send + Sync + 'static) -> bool
    where
        I: Reflect,
        C: Reflect,
    {
        self.registry
            .add(TypeRef::of::<I>(), Implementation::new(upcast))
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for Implementations {
    fn default() -> Self {
        Self::new()
    }
}

impl ImplementationSource for Implementations {
    fn implementation(&self, interface: TypeRef, info: &TypeInfo) -> Result<Implementation, Error> {
        if !info.is_interface() {
            return Err(Error::NotAnInterface {
                ty: interface.name().to_string(),
            });
        }
        self.registry
            .peek(&interface)
            .ok_or_else(|| Error::NoImplementation {
                interface: interface.name().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectInfo, TypeKind};

    trait Greeter: Send + Sync {
        fn greeting(&self) -> String;
    }

    #[derive(Default)]
    struct English;

    impl Greeter for English {
        fn greeting(&self) -> String {
            "hello".into()
        }
    }

    #[derive(Default)]
    struct French;

    impl Greeter for French {
        fn greeting(&self) -> String {
            "bonjour".into()
        }
    }

    struct AnyGreeter(Box<dyn Greeter>);

    impl Reflect for AnyGreeter {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Interface(
                ObjectInfo::interface::<AnyGreeter>()
                    .computed("Greeting", |g| g.0.greeting())
                    .build(),
            ))
        }
    }

    impl Reflect for English {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(ObjectInfo::builder::<English>().build()))
        }
    }

    impl Reflect for French {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(ObjectInfo::builder::<French>().build()))
        }
    }

    #[test]
    fn first_registration_wins() {
        let registry = Implementations::new();
        assert!(registry.register(|e: English| AnyGreeter(Box::new(e))));
        assert!(!registry.register(|f: French| AnyGreeter(Box::new(f))));
        assert_eq!(registry.len(), 1);

        let found = registry
            .implementation(TypeRef::of::<AnyGreeter>(), &AnyGreeter::type_info())
            .unwrap();
        assert_eq!(found.concrete(), TypeRef::of::<English>());

        let upcast = found.upcast(Box::new(English)).unwrap();
        let greeter = upcast.downcast_ref::<AnyGreeter>().unwrap();
        assert_eq!(greeter.0.greeting(), "hello");
        assert!(found.upcast(Box::new(French)).is_none());
    }

    #[test]
    fn unregistered_interface() {
        let registry = Implementations::new();
        let err = registry
            .implementation(TypeRef::of::<AnyGreeter>(), &AnyGreeter::type_info())
            .unwrap_err();
        assert!(matches!(err, Error::NoImplementation { .. }));
    }

    #[test]
    fn structs_are_not_interfaces() {
        let registry = Implementations::new();
        let err = registry
            .implementation(TypeRef::of::<English>(), &English::type_info())
            .unwrap_err();
        assert!(matches!(err, Error::NotAnInterface { .. }));
    }
}
