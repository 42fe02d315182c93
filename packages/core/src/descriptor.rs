//! Type descriptor cache.
//!
//! Memoizes what is known about each reflected type: its [`TypeInfo`] and,
//! lazily per query, which declared capability answers a shape query. Both
//! levels are lazy caches, so concurrent first queries for the same type or
//! capability do the work once.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use recordmap_cache::{LazyCache, SharedCache};

use crate::shape::{Capability, ClosedShape, OpenShape};
use crate::{Error, TypeInfo, TypeRef};

/// Cached description of one type.
pub struct TypeDescriptor {
    ty: TypeRef,
    info: TypeInfo,
    capabilities: LazyCache<Capability, Option<ClosedShape>>,
}

impl TypeDescriptor {
    fn new(ty: TypeRef) -> Self {
        TypeDescriptor {
            ty,
            info: ty.info(),
            capabilities: LazyCache::default(),
        }
    }

    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("ty", &self.ty)
            .field("kind", &self.info.kind.name())
            .field("resolved_capabilities", &self.capabilities.len())
            .finish()
    }
}

/// Registry of type descriptors, one per distinct type.
pub struct TypeDescriptorCache {
    descriptors: LazyCache<TypeRef, Arc<TypeDescriptor>>,
}

impl Default for TypeDescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDescriptorCache {
    pub fn new() -> Self {
        TypeDescriptorCache {
            descriptors: LazyCache::with_provider(|ty: &TypeRef| {
                tracing::debug!("describing type {}", ty);
                Ok(Arc::new(TypeDescriptor::new(*ty)))
            }),
        }
    }

    /// The descriptor for `ty`, created on first request.
    pub fn descriptor(&self, ty: TypeRef) -> Result<Arc<TypeDescriptor>, Error> {
        Ok(self.descriptors.get(&ty)?)
    }

    /// Whether `ty` implements the interface shape in `capability`.
    ///
    /// # Errors
    ///
    /// `NotAnInterface` when the queried shape is a class shape.
    pub fn has_capability(&self, ty: TypeRef, capability: &Capability) -> Result<bool, Error> {
        Ok(self.capability(ty, capability)?.is_some())
    }

    /// The declared capability of `ty` answering an interface query.
    ///
    /// An open query returns the closing capability, never the open shape.
    pub fn capability(
        &self,
        ty: TypeRef,
        capability: &Capability,
    ) -> Result<Option<ClosedShape>, Error> {
        if !capability.shape().is_interface() {
            return Err(Error::NotAnInterface {
                ty: capability.shape().to_string(),
            });
        }
        let descriptor = self.descriptor(ty)?;
        self.lookup(&descriptor, capability)
    }

    /// Whether `ty` closes `shape`, interface or class.
    pub fn closes(&self, ty: TypeRef, shape: OpenShape) -> Result<bool, Error> {
        let descriptor = self.descriptor(ty)?;
        Ok(self.lookup(&descriptor, &Capability::Open(shape))?.is_some())
    }

    /// Type arguments with which `ty` closes `shape`, in order.
    ///
    /// # Errors
    ///
    /// `ShapeNotImplemented` when `ty` does not close `shape`.
    pub fn closing_arguments(&self, ty: TypeRef, shape: OpenShape) -> Result<Vec<TypeRef>, Error> {
        let descriptor = self.descriptor(ty)?;
        match self.lookup(&descriptor, &Capability::Open(shape))? {
            Some(closed) => Ok(closed.arguments().to_vec()),
            None => Err(Error::ShapeNotImplemented {
                ty: ty.name().to_string(),
                shape: shape.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Types described so far.
    pub fn types(&self) -> Vec<TypeRef> {
        self.descriptors.keys()
    }

    fn lookup(
        &self,
        descriptor: &TypeDescriptor,
        capability: &Capability,
    ) -> Result<Option<ClosedShape>, Error> {
        descriptor
            .capabilities
            .get_or_insert_with(capability, |capability| self.resolve(descriptor, capability))
    }

    // Own declarations first, then the base chain. A base chain that loops
    // back on itself stops at the first repeated type.
    fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        capability: &Capability,
    ) -> Result<Option<ClosedShape>, Error> {
        if let Some(found) = first_match(&descriptor.info, capability) {
            return Ok(Some(found));
        }
        let mut visited = HashSet::from([descriptor.ty]);
        let mut next = descriptor.info.base;
        while let Some(base) = next {
            if !visited.insert(base) {
                break;
            }
            let base = self.descriptor(base)?;
            if let Some(found) = first_match(&base.info, capability) {
                return Ok(Some(found));
            }
            next = base.info.base;
        }
        Ok(None)
    }
}

fn first_match(info: &TypeInfo, capability: &Capability) -> Option<ClosedShape> {
    info.capabilities
        .iter()
        .find(|declared| capability.matches(declared))
        .cloned()
}
