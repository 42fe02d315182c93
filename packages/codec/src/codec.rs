//! The record codec: an owned registry of converters.

use std::fmt;
use std::sync::Arc;

use recordmap_cache::{LazyCache, SharedCache};
use recordmap_core::{
    DeclaredProperties, Error, ImplementationSource, Implementations, PropertyCache,
    PropertySource, Record, Reflect, TypeDescriptorCache, TypeRef,
};

use crate::builder::ConverterBuilder;
use crate::config::CodecConfig;
use crate::convert::{json_to_record, record_to_json};
use crate::Converter;

/// Read-only view of a codec's converter cache.
///
/// Only inspects what is cached. Nothing is built through the view, and the
/// cache's provider and hooks are out of reach.
#[derive(Clone)]
pub struct ConverterView {
    converters: Arc<LazyCache<TypeRef, Arc<Converter>>>,
}

impl ConverterView {
    pub(crate) fn new(converters: Arc<LazyCache<TypeRef, Arc<Converter>>>) -> Self {
        ConverterView { converters }
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub fn has(&self, ty: &TypeRef) -> bool {
        self.converters.has(ty)
    }

    /// The cached converter for `ty`, finished or still being built.
    pub fn peek(&self, ty: &TypeRef) -> Option<Arc<Converter>> {
        self.converters.peek(ty)
    }

    pub fn keys(&self) -> Vec<TypeRef> {
        self.converters.keys()
    }

    pub fn each(&self, callback: impl FnMut(&TypeRef, &Arc<Converter>)) {
        self.converters.each(callback)
    }

    pub fn find(&self, predicate: impl FnMut(&Arc<Converter>) -> bool) -> Option<Arc<Converter>> {
        self.converters.find(predicate)
    }
}

impl fmt::Debug for ConverterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterView")
            .field("len", &self.len())
            .finish()
    }
}

/// Converts reflected values to and from records.
///
/// Every codec owns its caches; two codecs never share converters.
///
/// ```rust
/// use recordmap_codec::{ObjectInfo, RecordCodec, Reflect, TypeInfo, TypeKind, Value};
///
/// #[derive(Default, Debug, PartialEq)]
/// struct Point { x: i32, y: i32 }
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
///
/// let codec = RecordCodec::new();
/// let record = codec.to_record(&Point { x: 3, y: 4 }).unwrap();
/// assert_eq!(record.get("X"), Some(&Value::Integer(3)));
/// assert_eq!(codec.from_record::<Point>(&record).unwrap(), Point { x: 3, y: 4 });
/// ```
pub struct RecordCodec {
    builder: ConverterBuilder,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCodec {
    /// A codec with declared properties, an empty implementation registry and
    /// the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RecordCodecBuilder {
        RecordCodecBuilder::default()
    }

    /// The converter for `ty`, built on first request.
    pub fn converter(&self, ty: TypeRef) -> Result<Arc<Converter>, Error> {
        self.builder.converter(ty)
    }

    pub fn converter_for<T: Reflect>(&self) -> Result<Arc<Converter>, Error> {
        self.converter(TypeRef::of::<T>())
    }

    pub fn to_record<T: Reflect>(&self, value: &T) -> Result<Record, Error> {
        self.converter_for::<T>()?.to_record(value)
    }

    pub fn from_record<T: Reflect>(&self, record: &Record) -> Result<T, Error> {
        self.converter_for::<T>()?.from_record_as::<T>(record)
    }

    /// Convert a value straight to a JSON object.
    pub fn to_json<T: Reflect>(&self, value: &T) -> Result<serde_json::Value, Error> {
        Ok(record_to_json(self.to_record(value)?))
    }

    /// Read a value from a JSON object.
    pub fn from_json<T: Reflect>(&self, json: serde_json::Value) -> Result<T, Error> {
        self.from_record(&json_to_record(json)?)
    }

    /// Types with a finished converter.
    pub fn cached_types(&self) -> Vec<TypeRef> {
        let mut types = Vec::new();
        self.builder.converters().each(|ty, converter| {
            if converter.is_published() {
                types.push(*ty);
            }
        });
        types.sort();
        types
    }

    pub fn converters(&self) -> ConverterView {
        self.builder.converters()
    }

    pub fn descriptors(&self) -> &TypeDescriptorCache {
        self.builder.descriptors()
    }

    pub fn config(&self) -> &CodecConfig {
        self.builder.config()
    }
}

/// Builder for [`RecordCodec`].
pub struct RecordCodecBuilder {
    config: CodecConfig,
    properties: Arc<dyn PropertySource>,
    implementations: Implementations,
    source: Option<Arc<dyn ImplementationSource>>,
}

impl Default for RecordCodecBuilder {
    fn default() -> Self {
        RecordCodecBuilder {
            config: CodecConfig::default(),
            properties: Arc::new(DeclaredProperties),
            implementations: Implementations::new(),
            source: None,
        }
    }
}

impl RecordCodecBuilder {
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace where property lists come from.
    pub fn property_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.properties = source;
        self
    }

    /// Replace the implementation registry with a custom source. Later
    /// [`implementation`](Self::implementation) calls are then ignored.
    pub fn implementation_source(mut self, source: Arc<dyn ImplementationSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Register `C` as the implementation of interface container `I`.
    pub fn implementation<I, C>(self, upcast: impl Fn(C) -> I + Send + Sync + 'static) -> Self
    where
        I: Reflect,
        C: Reflect,
    {
        self.implementations.register(upcast);
        self
    }

    pub fn build(self) -> RecordCodec {
        let implementations = match self.source {
            Some(source) => source,
            None => Arc::new(self.implementations),
        };
        RecordCodec {
            builder: ConverterBuilder::new(
                Arc::new(TypeDescriptorCache::new()),
                PropertyCache::new(self.properties),
                implementations,
                self.config,
            ),
        }
    }
}
