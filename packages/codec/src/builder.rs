//! Converter graph builder.
//!
//! Converters are created in two steps. The converter cache's provider only
//! makes an empty placeholder; its plan is resolved afterwards inside a
//! [`BuildSession`]. A session claims every placeholder it resolves, so a
//! type that refers back to itself (directly or through other types) finds
//! its own claim and links to the placeholder instead of recursing forever.
//!
//! Sessions building unrelated types never wait for each other. A session
//! that reaches a type claimed by another session waits for that session to
//! settle; if the wait would close a cycle of sessions, the later session
//! rolls back and starts over once the other one is done.
//!
//! A session publishes every converter it resolved when it succeeds and
//! evicts all of them when it fails, so a failed build leaves nothing
//! half-made behind and the next request starts over.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use recordmap_cache::{LazyCache, SharedCache};
use recordmap_core::{
    Error, ImplementationSource, MapOps, OpenShape, Property, PropertyCache, SequenceOps,
    TypeDescriptor, TypeDescriptorCache, TypeKind, TypeRef, ARRAY, LIST, MAP, SEQUENCE,
};

use crate::codec::ConverterView;
use crate::config::CodecConfig;
use crate::converter::{Construct, Converter, Plan};
use crate::mapper::FieldMapper;
use crate::strategy::{Element, FieldStrategy, Slot, ValueCodec};

/// Types touched by one top-level converter request.
struct BuildSession {
    id: u64,
    touched: Vec<Arc<Converter>>,
    /// Set when the session backed off to avoid waiting in a cycle.
    yielded: Option<(TypeRef, u64)>,
}

impl BuildSession {
    fn new(id: u64) -> Self {
        BuildSession {
            id,
            touched: Vec::new(),
            yielded: None,
        }
    }
}

/// Which session is resolving which unpublished converter.
#[derive(Default)]
struct Claims {
    owners: HashMap<TypeRef, u64>,
    /// Sessions blocked on a type claimed by another session.
    waiting: HashMap<u64, TypeRef>,
}

impl Claims {
    /// Whether `holder` is, directly or through other sessions, waiting on
    /// `session`.
    fn waits_on(&self, mut holder: u64, session: u64) -> bool {
        let mut seen = HashSet::new();
        loop {
            if holder == session {
                return true;
            }
            if !seen.insert(holder) {
                return false;
            }
            match self.waiting.get(&holder).and_then(|ty| self.owners.get(ty)) {
                Some(next) => holder = *next,
                None => return false,
            }
        }
    }
}

/// Builds and caches one [`Converter`] per type.
pub struct ConverterBuilder {
    converters: Arc<LazyCache<TypeRef, Arc<Converter>>>,
    descriptors: Arc<TypeDescriptorCache>,
    properties: PropertyCache,
    implementations: Arc<dyn ImplementationSource>,
    config: CodecConfig,
    claims: Mutex<Claims>,
    settled: Condvar,
    sessions: AtomicU64,
}

impl ConverterBuilder {
    pub fn new(
        descriptors: Arc<TypeDescriptorCache>,
        properties: PropertyCache,
        implementations: Arc<dyn ImplementationSource>,
        config: CodecConfig,
    ) -> Self {
        let converters: LazyCache<TypeRef, Arc<Converter>> =
            LazyCache::with_provider(|ty: &TypeRef| Ok(Arc::new(Converter::placeholder(*ty))));
        converters.set_value_removed(Box::new(|ty: &TypeRef, _: &Arc<Converter>| {
            tracing::debug!("evicted converter for {}", ty);
        }));
        ConverterBuilder {
            converters: Arc::new(converters),
            descriptors,
            properties,
            implementations,
            config,
            claims: Mutex::new(Claims::default()),
            settled: Condvar::new(),
            sessions: AtomicU64::new(0),
        }
    }

    /// The converter for `ty`, built on first request.
    ///
    /// Concurrent callers for the same type get the same `Arc`.
    ///
    /// # Errors
    ///
    /// Configuration errors such as `UnmappableKey`, `NotAnObject` or
    /// `NoImplementation`, from `ty` or any type reachable from it. Nothing
    /// is cached on failure.
    pub fn converter(&self, ty: TypeRef) -> Result<Arc<Converter>, Error> {
        let converter = self.converters.get(&ty)?;
        if converter.is_published() {
            return Ok(converter);
        }

        loop {
            let mut session = BuildSession::new(self.sessions.fetch_add(1, Ordering::Relaxed));
            let result = self.nested(ty, &mut session);

            let mut claims = self.claims.lock();
            match result {
                Ok(converter) => {
                    for built in &session.touched {
                        built.publish();
                        claims.owners.remove(&built.ty());
                    }
                    self.settled.notify_all();
                    return Ok(converter);
                }
                Err(e) => {
                    for built in &session.touched {
                        claims.owners.remove(&built.ty());
                        self.converters.remove(&built.ty());
                    }
                    self.settled.notify_all();
                    let Some((blocked, holder)) = session.yielded else {
                        tracing::warn!("failed to build converter for {}: {}", ty, e);
                        return Err(e);
                    };
                    tracing::debug!("build of {} yielded to another session on {}", ty, blocked);
                    while claims.owners.get(&blocked) == Some(&holder) {
                        self.settled.wait(&mut claims);
                    }
                }
            }
        }
    }

    /// Read-only view of the converter cache.
    pub fn converters(&self) -> ConverterView {
        ConverterView::new(Arc::clone(&self.converters))
    }

    pub fn descriptors(&self) -> &Arc<TypeDescriptorCache> {
        &self.descriptors
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The converter for `ty` within `session`: published, claimed by this
    /// session, or claimed now and resolved.
    fn nested(&self, ty: TypeRef, session: &mut BuildSession) -> Result<Arc<Converter>, Error> {
        let mut claims = self.claims.lock();
        let converter = loop {
            // Evictions happen under the claims lock, so this is current.
            let converter = self.converters.get(&ty)?;
            if converter.is_published() {
                return Ok(converter);
            }
            match claims.owners.get(&ty).copied() {
                None => {
                    claims.owners.insert(ty, session.id);
                    break converter;
                }
                Some(holder) if holder == session.id => return Ok(converter),
                Some(holder) => {
                    if claims.waits_on(holder, session.id) {
                        session.yielded = Some((ty, holder));
                        return Err(Error::ConverterNotReady {
                            ty: ty.name().to_string(),
                        });
                    }
                    claims.waiting.insert(session.id, ty);
                    while claims.owners.get(&ty) == Some(&holder) {
                        self.settled.wait(&mut claims);
                    }
                    claims.waiting.remove(&session.id);
                }
            }
        };
        drop(claims);

        session.touched.push(Arc::clone(&converter));
        let plan = self.plan(ty, session)?;
        let fields = plan.to_record.len();
        converter.set_plan(plan);
        tracing::debug!("built converter for {} with {} fields", ty, fields);
        Ok(converter)
    }

    fn plan(&self, ty: TypeRef, session: &mut BuildSession) -> Result<Plan, Error> {
        let descriptor = self.descriptors.descriptor(ty)?;
        match &descriptor.info().kind {
            TypeKind::Struct(object) => {
                let construct = object
                    .constructor()
                    .cloned()
                    .ok_or_else(|| not_constructible(ty))?;
                let readable = self.properties.readable(&descriptor)?;
                let to_record = self.mappers(ty, &readable, session)?;
                let from_record = to_record
                    .iter()
                    .filter(|m| m.property().is_writable())
                    .cloned()
                    .collect();
                Ok(Plan {
                    to_record,
                    from_record,
                    construct: Construct::Direct(construct),
                    config: self.config,
                })
            }
            TypeKind::Interface(_) => {
                let readable = self.properties.readable(&descriptor)?;
                let to_record = self.mappers(ty, &readable, session)?;

                let implementation = self
                    .implementations
                    .implementation(ty, descriptor.info())?;
                let concrete = self.descriptors.descriptor(implementation.concrete())?;
                let construct = concrete
                    .info()
                    .object()
                    .and_then(|object| object.constructor())
                    .cloned()
                    .ok_or_else(|| not_constructible(concrete.ty()))?;
                let writable = self.properties.writable(&concrete)?;
                let from_record = self.mappers(concrete.ty(), &writable, session)?;
                Ok(Plan {
                    to_record,
                    from_record,
                    construct: Construct::Implemented {
                        construct,
                        implementation,
                    },
                    config: self.config,
                })
            }
            _ => Err(Error::NotAnObject {
                ty: ty.name().to_string(),
            }),
        }
    }

    fn mappers(
        &self,
        owner: TypeRef,
        properties: &[Property],
        session: &mut BuildSession,
    ) -> Result<Vec<FieldMapper>, Error> {
        properties
            .iter()
            .map(|property| {
                let (slot, strategy) = self.select(owner, property, session)?;
                Ok(FieldMapper::new(property.clone(), slot, strategy))
            })
            .collect()
    }

    /// Pick the strategy for one property. The first matching rule wins.
    fn select(
        &self,
        owner: TypeRef,
        property: &Property,
        session: &mut BuildSession,
    ) -> Result<(Slot, FieldStrategy), Error> {
        let field = property.name();
        let (slot, descriptor) = self.peel(property.ty())?;
        let ty = descriptor.ty();
        let info = descriptor.info();

        let strategy = if let Some(codec) = ValueCodec::of(info).filter(|_| slot.is_nullable()) {
            FieldStrategy::NullableValue(codec)
        } else if let TypeKind::Enum(variants) = &info.kind {
            FieldStrategy::Enum(variants.clone())
        } else if let Some(args) = self.closing(ty, ARRAY)? {
            let ops = sequence_ops(&descriptor, ARRAY)?;
            let element = self.element(args[0], session)?;
            if element.is_value() {
                FieldStrategy::ValueArray { ops, element }
            } else {
                FieldStrategy::ObjectArray { ops, element }
            }
        } else if let TypeKind::Scalar(kind) = &info.kind {
            FieldStrategy::Scalar(*kind)
        } else if let Some(args) = self.closing(ty, MAP)? {
            let key_info = self.descriptors.descriptor(args[0])?;
            let key = ValueCodec::of(key_info.info()).ok_or_else(|| Error::UnmappableKey {
                owner: owner.name().to_string(),
                field: field.to_string(),
                key: args[0].name().to_string(),
            })?;
            let ops = map_ops(&descriptor)?;
            let value = self.element(args[1], session)?;
            if value.is_value() {
                FieldStrategy::ValueMap { ops, key, value }
            } else {
                FieldStrategy::ObjectMap { ops, key, value }
            }
        } else if let Some((shape, args)) = self.ordered(ty)? {
            let ops = sequence_ops(&descriptor, shape)?;
            let element = self.element(args[0], session)?;
            if element.is_value() {
                FieldStrategy::ValueList { ops, element }
            } else {
                FieldStrategy::ObjectList { ops, element }
            }
        } else {
            FieldStrategy::Object(self.nested(ty, session)?)
        };

        tracing::trace!("{}.{}: {:?}", owner, field, strategy);
        Ok((slot, strategy))
    }

    /// Collection item: a value codec or a nested converter, behind any
    /// number of indirections.
    fn element(&self, ty: TypeRef, session: &mut BuildSession) -> Result<Element, Error> {
        let (slot, descriptor) = self.peel(ty)?;
        match ValueCodec::of(descriptor.info()) {
            Some(codec) => Ok(Element::value(slot, codec)),
            None => Ok(Element::object(slot, self.nested(descriptor.ty(), session)?)),
        }
    }

    fn peel(&self, ty: TypeRef) -> Result<(Slot, Arc<TypeDescriptor>), Error> {
        let mut slot = Slot::default();
        let mut descriptor = self.descriptors.descriptor(ty)?;
        loop {
            let layer = match &descriptor.info().kind {
                TypeKind::Wrapper(layer) => *layer,
                _ => return Ok((slot, descriptor)),
            };
            slot.push(layer);
            descriptor = self.descriptors.descriptor(layer.inner)?;
        }
    }

    // LIST is preferred over SEQUENCE so errors name the narrower shape.
    fn ordered(&self, ty: TypeRef) -> Result<Option<(OpenShape, Vec<TypeRef>)>, Error> {
        for shape in [LIST, SEQUENCE] {
            if let Some(args) = self.closing(ty, shape)? {
                return Ok(Some((shape, args)));
            }
        }
        Ok(None)
    }

    fn closing(&self, ty: TypeRef, shape: OpenShape) -> Result<Option<Vec<TypeRef>>, Error> {
        if self.descriptors.closes(ty, shape)? {
            Ok(Some(self.descriptors.closing_arguments(ty, shape)?))
        } else {
            Ok(None)
        }
    }
}

fn sequence_ops(descriptor: &TypeDescriptor, shape: OpenShape) -> Result<SequenceOps, Error> {
    match &descriptor.info().kind {
        TypeKind::Sequence(ops) => Ok(*ops),
        _ => Err(missing_shape(descriptor, shape)),
    }
}

fn map_ops(descriptor: &TypeDescriptor) -> Result<MapOps, Error> {
    match &descriptor.info().kind {
        TypeKind::Map(ops) => Ok(*ops),
        _ => Err(missing_shape(descriptor, MAP)),
    }
}

fn missing_shape(descriptor: &TypeDescriptor, shape: OpenShape) -> Error {
    Error::MissingShape {
        ty: descriptor.ty().name().to_string(),
        shape: shape.to_string(),
    }
}

fn not_constructible(ty: TypeRef) -> Error {
    Error::Other {
        message: format!("{} has no constructor", ty),
    }
}
