//! Per-type converters.
//!
//! A [`Converter`] sits in the builder's cache as a placeholder before its
//! plan is resolved so that self-referential types can point at it. The plan
//! is set exactly once; the converter is handed out to callers only after the
//! build session that resolved it has committed.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use recordmap_core::{Constructor, Error, Implementation, Instance, Record, Reflect, TypeRef};

use crate::config::CodecConfig;
use crate::mapper::FieldMapper;

/// How a fresh instance is produced when reading a record.
#[derive(Clone)]
pub(crate) enum Construct {
    /// The type builds itself.
    Direct(Constructor),
    /// Build the concrete implementation, then upcast into the interface.
    Implemented {
        construct: Constructor,
        implementation: Implementation,
    },
}

pub(crate) struct Plan {
    pub(crate) to_record: Vec<FieldMapper>,
    pub(crate) from_record: Vec<FieldMapper>,
    pub(crate) construct: Construct,
    pub(crate) config: CodecConfig,
}

/// Converts instances of one type to and from records.
pub struct Converter {
    ty: TypeRef,
    plan: OnceLock<Plan>,
    published: AtomicBool,
}

impl Converter {
    pub(crate) fn placeholder(ty: TypeRef) -> Self {
        Converter {
            ty,
            plan: OnceLock::new(),
            published: AtomicBool::new(false),
        }
    }

    /// Set by the one session holding the claim on this converter.
    pub(crate) fn set_plan(&self, plan: Plan) {
        if self.plan.set(plan).is_err() {
            tracing::warn!("plan for {} was already set", self.ty);
        }
    }

    pub(crate) fn publish(&self) {
        self.published.store(true, Ordering::Release);
    }

    /// The type this converter maps.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// Whether the converter is complete and visible to every caller.
    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::Acquire)
    }

    /// Record field names written by [`to_record`](Self::to_record), in
    /// declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.plan
            .get()
            .map(|plan| {
                plan.to_record
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mappers applied when writing a record.
    pub fn to_record_mappers(&self) -> &[FieldMapper] {
        self.plan.get().map_or(&[][..], |plan| plan.to_record.as_slice())
    }

    /// Mappers applied when reading a record.
    pub fn from_record_mappers(&self) -> &[FieldMapper] {
        self.plan.get().map_or(&[][..], |plan| plan.from_record.as_slice())
    }

    /// Convert an instance of [`ty`](Self::ty) into a record.
    ///
    /// # Errors
    ///
    /// `WrongInstance` when `instance` is of another type, `Mismatch` when a
    /// field value cannot be represented.
    pub fn to_record(&self, instance: &dyn Any) -> Result<Record, Error> {
        let plan = self.plan()?;
        if !self.ty.is_instance(instance) {
            return Err(Error::wrong_instance(self.ty.name()));
        }
        let mut record = Record::new();
        for mapper in &plan.to_record {
            mapper.write(instance, &mut record, &plan.config)?;
        }
        Ok(record)
    }

    /// Build a fresh instance of [`ty`](Self::ty) from a record.
    ///
    /// Fields absent from the record keep their default values.
    ///
    /// # Errors
    ///
    /// `Mismatch` when a record value does not fit its field, unless the
    /// codec is lenient.
    pub fn from_record(&self, record: &Record) -> Result<Instance, Error> {
        let plan = self.plan()?;
        let (construct, implementation) = match &plan.construct {
            Construct::Direct(construct) => (construct, None),
            Construct::Implemented {
                construct,
                implementation,
            } => (construct, Some(implementation)),
        };

        let mut instance = construct();
        for mapper in &plan.from_record {
            match mapper.read(record, &mut *instance) {
                Ok(()) => {}
                Err(e) if plan.config.lenient && e.is_data_error() => {
                    tracing::trace!("skipping field {} of {}: {}", mapper.name(), self.ty, e);
                }
                Err(e) => return Err(e),
            }
        }

        match implementation {
            None => Ok(instance),
            Some(implementation) => implementation
                .upcast(instance)
                .ok_or_else(|| Error::wrong_instance(implementation.concrete().name())),
        }
    }

    /// Typed [`from_record`](Self::from_record).
    pub fn from_record_as<T: Reflect>(&self, record: &Record) -> Result<T, Error> {
        let instance = self.from_record(record)?;
        instance
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| Error::wrong_instance(std::any::type_name::<T>()))
    }

    fn plan(&self) -> Result<&Plan, Error> {
        self.plan.get().ok_or_else(|| Error::ConverterNotReady {
            ty: self.ty.name().to_string(),
        })
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("ty", &self.ty)
            .field("published", &self.is_published())
            .field("fields", &self.field_names())
            .finish()
    }
}
