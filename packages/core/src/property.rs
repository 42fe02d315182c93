//! Property discovery and caching.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use recordmap_cache::{LazyCache, SharedCache};

use crate::descriptor::TypeDescriptor;
use crate::{Error, Getter, Property, TypeInfo, TypeRef};

/// Lists the properties of a type.
///
/// Discovery for one type runs at most once at a time; discovery for
/// different types may run concurrently.
pub trait PropertySource: Send + Sync {
    fn properties(&self, ty: TypeRef, info: &TypeInfo) -> Result<Vec<Property>, Error>;
}

/// Reads the properties a type declares in its `ObjectInfo`, followed by
/// those it inherits.
///
/// Inheritance follows bases declared with [`TypeInfo::inherits`]; a base
/// declared with plain `extends` contributes capabilities only. A property
/// declared closer to the type hides an inherited one of the same name, and
/// a base chain that loops back on itself stops at the first repeated type.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredProperties;

impl PropertySource for DeclaredProperties {
    fn properties(&self, ty: TypeRef, info: &TypeInfo) -> Result<Vec<Property>, Error> {
        let object = info.object().ok_or_else(|| Error::NotAnObject {
            ty: ty.name().to_string(),
        })?;
        let mut properties = object.properties().to_vec();

        let mut visited = HashSet::from([ty]);
        let mut views: Vec<Getter> = Vec::new();
        let mut link = info.base.zip(info.base_view().cloned());
        while let Some((base, view)) = link {
            if !visited.insert(base) {
                break;
            }
            views.push(view);
            let base_info = base.info();
            if let Some(object) = base_info.object() {
                for property in object.properties() {
                    if properties.iter().any(|p| p.name() == property.name()) {
                        continue;
                    }
                    let inherited = views
                        .iter()
                        .rev()
                        .fold(property.clone(), |p, view| p.through(Arc::clone(view)));
                    properties.push(inherited);
                }
            }
            link = base_info.base.zip(base_info.base_view().cloned());
        }
        Ok(properties)
    }
}

type Discovered = Arc<Mutex<Option<Arc<[Property]>>>>;

/// Property lists per declaring type, discovered once.
///
/// The outer cache only hands out one cell per type; discovery itself runs
/// under that cell's lock, so slow discovery of one type never holds up
/// another. A failed discovery leaves the cell empty for the next caller.
pub struct PropertyCache {
    source: Arc<dyn PropertySource>,
    properties: LazyCache<TypeRef, Discovered>,
}

impl PropertyCache {
    pub fn new(source: Arc<dyn PropertySource>) -> Self {
        PropertyCache {
            source,
            properties: LazyCache::with_provider(|_: &TypeRef| Ok(Discovered::default())),
        }
    }

    /// All properties of the type, in declaration order.
    pub fn readable(&self, descriptor: &TypeDescriptor) -> Result<Arc<[Property]>, Error> {
        let cell = self.properties.get(&descriptor.ty())?;
        let mut slot = cell.lock();
        if let Some(found) = slot.as_ref() {
            return Ok(Arc::clone(found));
        }
        let found: Arc<[Property]> = self
            .source
            .properties(descriptor.ty(), descriptor.info())?
            .into();
        *slot = Some(Arc::clone(&found));
        Ok(found)
    }

    /// Properties of the type that have a setter, in declaration order.
    pub fn writable(&self, descriptor: &TypeDescriptor) -> Result<Vec<Property>, Error> {
        Ok(self
            .readable(descriptor)?
            .iter()
            .filter(|p| p.is_writable())
            .cloned()
            .collect())
    }

    /// Number of types whose properties have been discovered.
    pub fn len(&self) -> usize {
        self.properties
            .values()
            .iter()
            .filter(|cell| cell.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PropertyCache {
    fn default() -> Self {
        Self::new(Arc::new(DeclaredProperties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectInfo, Reflect, TypeDescriptorCache, TypeKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Sensor {
        id: u16,
        reading: f64,
    }

    impl Reflect for Sensor {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(
                ObjectInfo::builder::<Sensor>()
                    .read_only("Id", |s| &s.id)
                    .field("Reading", |s| &s.reading, |s, v| s.reading = v)
                    .build(),
            ))
        }
    }

    struct Counting {
        calls: AtomicUsize,
    }

    impl PropertySource for Counting {
        fn properties(&self, ty: TypeRef, info: &TypeInfo) -> Result<Vec<Property>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DeclaredProperties.properties(ty, info)
        }
    }

    #[test]
    fn readable_and_writable() {
        let types = TypeDescriptorCache::new();
        let cache = PropertyCache::default();
        let sensor = types.descriptor(TypeRef::of::<Sensor>()).unwrap();

        let readable: Vec<String> = cache
            .readable(&sensor)
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(readable, vec!["Id", "Reading"]);

        let writable = cache.writable(&sensor).unwrap();
        assert_eq!(writable.len(), 1);
        assert_eq!(writable[0].name(), "Reading");
    }

    #[test]
    fn discovery_runs_once_per_type() {
        let source = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let cache = PropertyCache::new(source.clone());
        let types = TypeDescriptorCache::new();
        let sensor = types.descriptor(TypeRef::of::<Sensor>()).unwrap();

        cache.readable(&sensor).unwrap();
        cache.writable(&sensor).unwrap();
        cache.readable(&sensor).unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct Badge {
        serial: u32,
    }

    impl Reflect for Badge {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(
                ObjectInfo::builder::<Badge>()
                    .computed("Id", |b| b.serial)
                    .computed("Kind", |_| "badge".to_string())
                    .build(),
            ))
        }
    }

    /// Carries a badge and inherits its properties.
    #[derive(Default)]
    struct Holder {
        serial: u32,
        kind: String,
    }

    impl Reflect for Holder {
        fn type_info() -> TypeInfo {
            TypeInfo::new(TypeKind::Struct(
                ObjectInfo::builder::<Holder>()
                    .read_only("Kind", |h| &h.kind)
                    .build(),
            ))
            .inherits(|h: &Holder| Badge { serial: h.serial })
        }
    }

    #[test]
    fn inherited_properties_follow_own_ones() {
        let properties = DeclaredProperties
            .properties(TypeRef::of::<Holder>(), &Holder::type_info())
            .unwrap();
        let names: Vec<&str> = properties.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Kind", "Id"]);

        let holder = Holder {
            serial: 7,
            kind: "staff".to_string(),
        };
        let id = properties[1].get(&holder).unwrap();
        assert_eq!(id.downcast_ref::<u32>(), Some(&7));
        assert!(!properties[1].is_writable());
    }

    #[test]
    fn extends_does_not_inherit_properties() {
        let info = Holder::type_info();
        let plain = TypeInfo::new(info.kind.clone()).extends(TypeRef::of::<Badge>());
        let properties = DeclaredProperties
            .properties(TypeRef::of::<Holder>(), &plain)
            .unwrap();
        assert_eq!(properties.len(), 1);
    }

    #[test]
    fn scalars_have_no_properties() {
        let types = TypeDescriptorCache::new();
        let cache = PropertyCache::default();
        let err = cache
            .readable(&types.descriptor(TypeRef::of::<i32>()).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::NotAnObject { .. }));
        assert!(cache.is_empty());
    }
}
