//! Field mappers: one property bound to its strategy.

use std::any::Any;
use std::fmt;

use recordmap_core::{Error, Property, Record, Value};

use crate::config::CodecConfig;
use crate::strategy::{FieldStrategy, Slot};

/// Converts one property of one declaring type.
///
/// Immutable once built; owned by the converter of the declaring type.
#[derive(Clone)]
pub struct FieldMapper {
    property: Property,
    slot: Slot,
    strategy: FieldStrategy,
}

impl FieldMapper {
    pub(crate) fn new(property: Property, slot: Slot, strategy: FieldStrategy) -> Self {
        FieldMapper {
            property,
            slot,
            strategy,
        }
    }

    pub fn name(&self) -> &str {
        self.property.name()
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn strategy(&self) -> &FieldStrategy {
        &self.strategy
    }

    /// Copy the field from `owner` into `record`. Empty optional fields are
    /// left out.
    pub fn write(
        &self,
        owner: &dyn Any,
        record: &mut Record,
        config: &CodecConfig,
    ) -> Result<(), Error> {
        let field = self.property.get(owner).ok_or_else(|| {
            Error::wrong_instance(format!("owner of property {}", self.name()))
        })?;
        let Some(inner) = self.slot.unwrap(&*field) else {
            return Ok(());
        };
        let value = self.strategy.write(self.name(), inner, config)?;
        record.insert(self.name(), value);
        Ok(())
    }

    /// Copy the field from `record` into `owner`.
    ///
    /// An absent field is a no-op. `Null` empties a nullable field and is
    /// ignored otherwise.
    pub fn read(&self, record: &Record, owner: &mut dyn Any) -> Result<(), Error> {
        let instance = match record.get(self.name()) {
            None => return Ok(()),
            Some(Value::Null) => match self.slot.wrap(None) {
                Some(empty) => empty,
                None => return Ok(()),
            },
            Some(value) => {
                let inner = self.strategy.read(self.name(), value)?;
                self.slot.wrap(Some(inner)).ok_or_else(|| {
                    Error::wrong_instance(format!("value of property {}", self.name()))
                })?
            }
        };
        self.property.set(owner, instance)
    }
}

impl fmt::Debug for FieldMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapper")
            .field("name", &self.name())
            .field("ty", &self.property.ty())
            .field("strategy", &self.strategy)
            .finish()
    }
}
