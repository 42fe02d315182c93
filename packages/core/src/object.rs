//! Object descriptions: properties and constructors.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use crate::{Error, Instance, Reflect, TypeRef};

/// Value read through a property getter.
pub enum FieldRef<'a> {
    /// A field stored on the owner.
    Borrowed(&'a dyn Any),
    /// A value computed on read.
    Owned(Instance),
}

impl Deref for FieldRef<'_> {
    type Target = dyn Any;

    fn deref(&self) -> &dyn Any {
        match self {
            FieldRef::Borrowed(value) => *value,
            FieldRef::Owned(value) => &**value,
        }
    }
}

/// Reads a property from a type-erased owner.
pub type Getter = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<FieldRef<'a>> + Send + Sync>;

/// Writes a property on a type-erased owner.
pub type Setter = Arc<dyn Fn(&mut dyn Any, Instance) -> Result<(), Error> + Send + Sync>;

/// Builds a fresh default instance.
pub type Constructor = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Box a getter closure.
pub fn getter<F>(get: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Any) -> Option<FieldRef<'a>> + Send + Sync + 'static,
{
    Arc::new(get)
}

/// Box a setter closure.
pub fn setter<F>(set: F) -> Setter
where
    F: Fn(&mut dyn Any, Instance) -> Result<(), Error> + Send + Sync + 'static,
{
    Arc::new(set)
}

/// A named, typed accessor pair on an object type.
#[derive(Clone)]
pub struct Property {
    name: String,
    ty: TypeRef,
    getter: Getter,
    setter: Option<Setter>,
}

impl Property {
    pub fn new(
        name: impl Into<String>,
        ty: TypeRef,
        getter: Getter,
        setter: Option<Setter>,
    ) -> Self {
        Property {
            name: name.into(),
            ty,
            getter,
            setter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the property value.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property; `None` when `owner` is not of the declaring type.
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<FieldRef<'a>> {
        (self.getter)(owner)
    }

    /// The same property read through `view`, which projects an owner onto
    /// the declaring type. The result is read-only.
    ///
    /// A stored field of a projected value that `view` had to compute cannot
    /// be borrowed past the projection and reads as `None`.
    pub fn through(&self, view: Getter) -> Property {
        let inner = Arc::clone(&self.getter);
        Property {
            name: self.name.clone(),
            ty: self.ty,
            getter: getter(move |owner: &dyn Any| match view(owner)? {
                FieldRef::Borrowed(base) => inner(base),
                FieldRef::Owned(base) => {
                    let read = inner(&*base)?;
                    match read {
                        FieldRef::Owned(value) => Some(FieldRef::Owned(value)),
                        FieldRef::Borrowed(_) => None,
                    }
                }
            }),
            setter: None,
        }
    }

    /// Write the property.
    ///
    /// # Errors
    ///
    /// `WrongInstance` when the owner or the value has the wrong type, or
    /// `Other` when the property is read-only.
    pub fn set(&self, owner: &mut dyn Any, value: Instance) -> Result<(), Error> {
        match &self.setter {
            Some(set) => set(owner, value),
            None => Err(Error::Other {
                message: format!("property {} is read-only", self.name),
            }),
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("writable", &self.is_writable())
            .finish()
    }
}

/// Properties and constructor of a struct or interface type.
#[derive(Clone, Default)]
pub struct ObjectInfo {
    properties: Vec<Property>,
    construct: Option<Constructor>,
}

impl ObjectInfo {
    /// Describe a constructible struct; instances start from `T::default()`.
    pub fn builder<T: Reflect + Default>() -> ObjectBuilder<T> {
        ObjectBuilder {
            properties: Vec::new(),
            construct: Some(Arc::new(|| Box::new(T::default()) as Instance)),
            _owner: PhantomData,
        }
    }

    /// Describe a type that is only ever built through an implementation.
    pub fn interface<T: Reflect>() -> ObjectBuilder<T> {
        ObjectBuilder {
            properties: Vec::new(),
            construct: None,
            _owner: PhantomData,
        }
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.construct.as_ref()
    }
}

impl fmt::Debug for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectInfo")
            .field("properties", &self.properties)
            .field("constructible", &self.construct.is_some())
            .finish()
    }
}

/// Typed builder for [`ObjectInfo`].
pub struct ObjectBuilder<T> {
    properties: Vec<Property>,
    construct: Option<Constructor>,
    _owner: PhantomData<fn() -> T>,
}

impl<T: Reflect> ObjectBuilder<T> {
    /// A stored field with a getter and a setter.
    pub fn field<F, G, S>(mut self, name: &str, get: G, set: S) -> Self
    where
        F: Reflect,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.properties.push(Property::new(
            name,
            TypeRef::of::<F>(),
            borrowed_getter::<T, F, G>(get),
            Some(typed_setter::<T, F, S>(set)),
        ));
        self
    }

    /// A stored field that is only read.
    pub fn read_only<F, G>(mut self, name: &str, get: G) -> Self
    where
        F: Reflect,
        G: Fn(&T) -> &F + Send + Sync + 'static,
    {
        self.properties.push(Property::new(
            name,
            TypeRef::of::<F>(),
            borrowed_getter::<T, F, G>(get),
            None,
        ));
        self
    }

    /// A read-only value computed from the owner.
    pub fn computed<F, C>(mut self, name: &str, compute: C) -> Self
    where
        F: Reflect,
        C: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.properties.push(Property::new(
            name,
            TypeRef::of::<F>(),
            getter(move |owner: &dyn Any| {
                let owner = owner.downcast_ref::<T>()?;
                Some(FieldRef::Owned(Box::new(compute(owner))))
            }),
            None,
        ));
        self
    }

    pub fn build(self) -> ObjectInfo {
        ObjectInfo {
            properties: self.properties,
            construct: self.construct,
        }
    }
}

fn borrowed_getter<T, F, G>(get: G) -> Getter
where
    T: Reflect,
    F: Reflect,
    G: Fn(&T) -> &F + Send + Sync + 'static,
{
    getter(move |owner: &dyn Any| {
        let owner = owner.downcast_ref::<T>()?;
        Some(FieldRef::Borrowed(get(owner) as &dyn Any))
    })
}

fn typed_setter<T, F, S>(set: S) -> Setter
where
    T: Reflect,
    F: Reflect,
    S: Fn(&mut T, F) + Send + Sync + 'static,
{
    setter(move |owner: &mut dyn Any, value: Instance| {
        let owner = owner
            .downcast_mut::<T>()
            .ok_or_else(|| Error::wrong_instance(std::any::type_name::<T>()))?;
        let value = value
            .downcast::<F>()
            .map_err(|_| Error::wrong_instance(std::any::type_name::<F>()))?;
        set(owner, *value);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TypeInfo, TypeKind};

    #[derive(Default, Debug, PartialEq)]
    struct Account {
        id: u32,
        owner: String,
    }

    impl Reflect for Account {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(
                ObjectInfo::builder::<Account>()
                    .read_only("Id", |a| &a.id)
                    .field("Owner", |a| &a.owner, |a, v| a.owner = v)
                    .computed("Label", |a| format!("{}#{}", a.owner, a.id))
                    .build(),
            ))
        }
    }

    fn object() -> ObjectInfo {
        Account::type_info().object().cloned().unwrap()
    }

    #[test]
    fn properties_keep_declaration_order() {
        let info = object();
        let names: Vec<&str> = info.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Id", "Owner", "Label"]);
    }

    #[test]
    fn getters_borrow_or_compute() {
        let info = object();
        let account = Account {
            id: 7,
            owner: "ada".into(),
        };
        let props = info.properties();

        let id = props[0].get(&account).unwrap();
        assert_eq!(id.downcast_ref::<u32>(), Some(&7));
        let label = props[2].get(&account).unwrap();
        assert_eq!(label.downcast_ref::<String>().map(String::as_str), Some("ada#7"));

        assert!(props[0].get(&"not an account").is_none());
    }

    #[test]
    fn setters_check_types() {
        let info = object();
        let props = info.properties();
        let mut account = Account::default();

        props[1].set(&mut account, Box::new("grace".to_string())).unwrap();
        assert_eq!(account.owner, "grace");

        let err = props[1].set(&mut account, Box::new(5i32)).unwrap_err();
        assert!(matches!(err, Error::WrongInstance { .. }));
        assert!(props[0].set(&mut account, Box::new(1u32)).is_err());
        assert!(!props[0].is_writable());
    }

    #[test]
    fn builder_installs_constructor() {
        let info = object();
        let fresh = (info.constructor().unwrap())();
        assert_eq!(fresh.downcast_ref::<Account>(), Some(&Account::default()));
        assert!(ObjectInfo::interface::<Account>().build().constructor().is_none());
    }
}
