//! Field strategies: how one field value becomes a record value and back.
//!
//! The set of strategies is closed. Which one a field gets is decided once,
//! when its converter is built (see `ConverterBuilder::select`).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use recordmap_core::{
    EnumInfo, Error, Instance, MapOps, Record, ScalarKind, SequenceOps, TypeInfo, TypeKind, Value,
    WrapperInfo,
};

use crate::config::{CodecConfig, EnumEncoding, MapEncoding};
use crate::Converter;

/// Codec for value types: scalars and enums.
#[derive(Clone, Debug)]
pub enum ValueCodec {
    Scalar(ScalarKind),
    Enum(EnumInfo),
}

impl ValueCodec {
    /// The codec for a value type; `None` for anything else.
    pub fn of(info: &TypeInfo) -> Option<Self> {
        match &info.kind {
            TypeKind::Scalar(kind) => Some(ValueCodec::Scalar(*kind)),
            TypeKind::Enum(variants) => Some(ValueCodec::Enum(variants.clone())),
            _ => None,
        }
    }

    pub fn expected(&self) -> &'static str {
        match self {
            ValueCodec::Scalar(kind) => kind.name(),
            ValueCodec::Enum(_) => "enum name or ordinal",
        }
    }

    pub fn write(&self, any: &dyn Any, config: &CodecConfig) -> Option<Value> {
        match self {
            ValueCodec::Scalar(kind) => kind.to_value(any),
            ValueCodec::Enum(variants) => match config.enum_encoding {
                EnumEncoding::Name => variants.name_of(any).map(Value::from),
                EnumEncoding::Ordinal => variants.ordinal_of(any).map(Value::Integer),
            },
        }
    }

    /// Enums read by name from strings and by underlying value from
    /// integers.
    pub fn read(&self, value: &Value) -> Option<Instance> {
        match self {
            ValueCodec::Scalar(kind) => kind.from_value(value),
            ValueCodec::Enum(variants) => match value {
                Value::String(name) => variants.from_name(name),
                Value::Integer(i) => variants.from_ordinal(*i),
                _ => None,
            },
        }
    }

    /// Read a map key from the field name of a record-encoded map.
    pub fn read_key(&self, text: &str) -> Option<Instance> {
        match self {
            ValueCodec::Scalar(kind) => kind.parse_key(text),
            ValueCodec::Enum(variants) => variants.from_name(text).or_else(|| {
                text.parse::<i64>()
                    .ok()
                    .and_then(|i| variants.from_ordinal(i))
            }),
        }
    }
}

/// Transparent indirections (`Box`, `Option`) between a declared type and
/// the type that is actually mapped, outermost first.
#[derive(Clone, Debug, Default)]
pub struct Slot {
    layers: Vec<WrapperInfo>,
}

impl Slot {
    pub fn push(&mut self, layer: WrapperInfo) {
        self.layers.push(layer);
    }

    pub fn is_nullable(&self) -> bool {
        self.layers.iter().any(|layer| layer.nullable)
    }

    /// Borrow the innermost value; `None` when some layer is empty.
    pub fn unwrap<'a>(&self, any: &'a dyn Any) -> Option<&'a dyn Any> {
        self.layers
            .iter()
            .try_fold(any, |current, layer| (layer.unwrap)(current))
    }

    /// Wrap an innermost value back up. `None` produces the empty form of
    /// the outermost nullable layer, or fails when no layer is nullable.
    pub fn wrap(&self, inner: Option<Instance>) -> Option<Instance> {
        match inner {
            Some(value) => self
                .layers
                .iter()
                .rev()
                .try_fold(value, |acc, layer| (layer.wrap)(Some(acc))),
            None => {
                let nullable = self.layers.iter().position(|layer| layer.nullable)?;
                let empty = (self.layers[nullable].wrap)(None)?;
                self.layers[..nullable]
                    .iter()
                    .rev()
                    .try_fold(empty, |acc, layer| (layer.wrap)(Some(acc)))
            }
        }
    }
}

/// What sits inside a collection: a value type or an object with its
/// converter, possibly behind indirections.
#[derive(Clone)]
pub struct Element {
    slot: Slot,
    kind: ElementKind,
}

#[derive(Clone)]
enum ElementKind {
    Value(ValueCodec),
    Object(Arc<Converter>),
}

impl Element {
    pub fn value(slot: Slot, codec: ValueCodec) -> Self {
        Element {
            slot,
            kind: ElementKind::Value(codec),
        }
    }

    pub fn object(slot: Slot, converter: Arc<Converter>) -> Self {
        Element {
            slot,
            kind: ElementKind::Object(converter),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, ElementKind::Value(_))
    }

    fn write(&self, field: &str, any: &dyn Any, config: &CodecConfig) -> Result<Value, Error> {
        let Some(inner) = self.slot.unwrap(any) else {
            return Ok(Value::Null);
        };
        match &self.kind {
            ElementKind::Value(codec) => write_value(codec, field, inner, config),
            ElementKind::Object(converter) => Ok(Value::Record(converter.to_record(inner)?)),
        }
    }

    /// The item stored when only a key is given: empty when nullable,
    /// otherwise the zero value, first variant or default object.
    fn default_instance(&self, field: &str) -> Result<Instance, Error> {
        let missing = || Error::mismatch(field, "[key, value] pair", "key without a value");
        if self.slot.is_nullable() {
            return self.slot.wrap(None).ok_or_else(missing);
        }
        let inner = match &self.kind {
            ElementKind::Value(ValueCodec::Scalar(kind)) => Some(kind.default_instance()),
            ElementKind::Value(ValueCodec::Enum(variants)) => {
                variants.from_ordinal(0).or_else(|| variants.first())
            }
            ElementKind::Object(converter) => Some(converter.from_record(&Record::new())?),
        };
        inner
            .and_then(|inner| self.slot.wrap(Some(inner)))
            .ok_or_else(missing)
    }

    fn read(&self, field: &str, value: &Value) -> Result<Instance, Error> {
        let inner = match value {
            Value::Null => None,
            value => Some(match &self.kind {
                ElementKind::Value(codec) => read_value(codec, field, value)?,
                ElementKind::Object(converter) => read_object(converter, field, value)?,
            }),
        };
        let expected = match &self.kind {
            ElementKind::Value(codec) => codec.expected(),
            ElementKind::Object(_) => "record",
        };
        self.slot
            .wrap(inner)
            .ok_or_else(|| Error::mismatch(field, expected, value.kind_name()))
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ElementKind::Value(codec) => f.debug_tuple("Element").field(codec).finish(),
            ElementKind::Object(converter) => {
                f.debug_tuple("Element").field(&converter.ty()).finish()
            }
        }
    }
}

/// How a field value is converted.
#[derive(Clone)]
pub enum FieldStrategy {
    /// `Option` of a scalar or enum; the `Option` layer lives in the slot.
    NullableValue(ValueCodec),
    Enum(EnumInfo),
    /// Fixed-length array of values.
    ValueArray { ops: SequenceOps, element: Element },
    /// Fixed-length array of objects.
    ObjectArray { ops: SequenceOps, element: Element },
    Scalar(ScalarKind),
    /// Map with value keys and value values.
    ValueMap {
        ops: MapOps,
        key: ValueCodec,
        value: Element,
    },
    /// Map with value keys and object values.
    ObjectMap {
        ops: MapOps,
        key: ValueCodec,
        value: Element,
    },
    /// Ordered collection of objects.
    ObjectList { ops: SequenceOps, element: Element },
    /// Ordered collection of values.
    ValueList { ops: SequenceOps, element: Element },
    /// Nested object through its own converter.
    Object(Arc<Converter>),
}

impl FieldStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            FieldStrategy::NullableValue(_) => "nullable value",
            FieldStrategy::Enum(_) => "enum",
            FieldStrategy::ValueArray { .. } => "value array",
            FieldStrategy::ObjectArray { .. } => "object array",
            FieldStrategy::Scalar(_) => "scalar",
            FieldStrategy::ValueMap { .. } => "value map",
            FieldStrategy::ObjectMap { .. } => "object map",
            FieldStrategy::ObjectList { .. } => "object list",
            FieldStrategy::ValueList { .. } => "value list",
            FieldStrategy::Object(_) => "object",
        }
    }

    /// Convert an unwrapped field value into a record value.
    pub fn write(&self, field: &str, any: &dyn Any, config: &CodecConfig) -> Result<Value, Error> {
        match self {
            FieldStrategy::NullableValue(codec) => write_value(codec, field, any, config),
            FieldStrategy::Enum(variants) => {
                write_value(&ValueCodec::Enum(variants.clone()), field, any, config)
            }
            FieldStrategy::Scalar(kind) => {
                write_value(&ValueCodec::Scalar(*kind), field, any, config)
            }
            FieldStrategy::ValueArray { ops, element }
            | FieldStrategy::ObjectArray { ops, element }
            | FieldStrategy::ObjectList { ops, element }
            | FieldStrategy::ValueList { ops, element } => {
                let items = (ops.iter)(any).ok_or_else(|| wrong_collection(field))?;
                let values = items
                    .into_iter()
                    .map(|item| element.write(field, item, config))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
            FieldStrategy::ValueMap { ops, key, value }
            | FieldStrategy::ObjectMap { ops, key, value } => {
                write_map(field, any, ops, key, value, config)
            }
            FieldStrategy::Object(converter) => Ok(Value::Record(converter.to_record(any)?)),
        }
    }

    /// Convert a non-null record value into an unwrapped field value.
    pub fn read(&self, field: &str, value: &Value) -> Result<Instance, Error> {
        match self {
            FieldStrategy::NullableValue(codec) => read_value(codec, field, value),
            FieldStrategy::Enum(variants) => {
                read_value(&ValueCodec::Enum(variants.clone()), field, value)
            }
            FieldStrategy::Scalar(kind) => read_value(&ValueCodec::Scalar(*kind), field, value),
            FieldStrategy::ValueArray { ops, element }
            | FieldStrategy::ObjectArray { ops, element }
            | FieldStrategy::ObjectList { ops, element }
            | FieldStrategy::ValueList { ops, element } => {
                let items = value
                    .as_array()
                    .ok_or_else(|| Error::mismatch(field, "array", value.kind_name()))?;
                let instances = items
                    .iter()
                    .map(|item| element.read(field, item))
                    .collect::<Result<Vec<_>, _>>()?;
                let len = instances.len();
                (ops.collect)(instances).ok_or_else(|| {
                    let found = format!("{len} items");
                    Error::mismatch(field, "collection of the declared length", found)
                })
            }
            FieldStrategy::ValueMap { ops, key, value: element }
            | FieldStrategy::ObjectMap { ops, key, value: element } => {
                read_map(field, value, ops, key, element)
            }
            FieldStrategy::Object(converter) => read_object(converter, field, value),
        }
    }
}

impl fmt::Debug for FieldStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldStrategy::Object(converter) => {
                write!(f, "{}({})", self.name(), converter.ty())
            }
            _ => f.write_str(self.name()),
        }
    }
}

fn write_value(
    codec: &ValueCodec,
    field: &str,
    any: &dyn Any,
    config: &CodecConfig,
) -> Result<Value, Error> {
    codec
        .write(any, config)
        .ok_or_else(|| Error::mismatch(field, codec.expected(), "value out of range"))
}

fn read_value(codec: &ValueCodec, field: &str, value: &Value) -> Result<Instance, Error> {
    codec
        .read(value)
        .ok_or_else(|| Error::mismatch(field, codec.expected(), value.kind_name()))
}

fn read_object(converter: &Converter, field: &str, value: &Value) -> Result<Instance, Error> {
    let record = value
        .as_record()
        .ok_or_else(|| Error::mismatch(field, "record", value.kind_name()))?;
    converter.from_record(record)
}

fn wrong_collection(field: &str) -> Error {
    Error::wrong_instance(format!("collection for field {}", field))
}

fn write_map(
    field: &str,
    any: &dyn Any,
    ops: &MapOps,
    key: &ValueCodec,
    value: &Element,
    config: &CodecConfig,
) -> Result<Value, Error> {
    let entries = (ops.entries)(any).ok_or_else(|| wrong_collection(field))?;
    match config.map_encoding {
        MapEncoding::Pairs => {
            let pairs = entries
                .into_iter()
                .map(|(k, v)| {
                    Ok(Value::Array(vec![
                        write_value(key, field, k, config)?,
                        value.write(field, v, config)?,
                    ]))
                })
                .collect::<Result<Vec<_>, Error>>()?;
            Ok(Value::Array(pairs))
        }
        MapEncoding::Record => {
            let mut record = Record::new();
            for (k, v) in entries {
                let name = write_value(key, field, k, config)?
                    .key_text()
                    .ok_or_else(|| Error::mismatch(field, "key with a text form", "value"))?;
                record.insert(name, value.write(field, v, config)?);
            }
            Ok(Value::Record(record))
        }
    }
}

// Both encodings are accepted regardless of configuration. A pair holding
// only a key maps that key to the element's default.
fn read_map(
    field: &str,
    value: &Value,
    ops: &MapOps,
    key: &ValueCodec,
    element: &Element,
) -> Result<Instance, Error> {
    let entries = match value {
        Value::Array(pairs) => pairs
            .iter()
            .map(|pair| match pair.as_array() {
                Some([k, v]) => Ok((read_value(key, field, k)?, element.read(field, v)?)),
                Some([k]) => Ok((read_value(key, field, k)?, element.default_instance(field)?)),
                _ => Err(Error::mismatch(field, "[key, value] pair", pair.kind_name())),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Value::Record(record) => record
            .iter()
            .map(|(name, v)| {
                let k = key.read_key(name).ok_or_else(|| {
                    Error::mismatch(field, key.expected(), format!("key {:?}", name))
                })?;
                Ok((k, element.read(field, v)?))
            })
            .collect::<Result<Vec<_>, Error>>()?,
        other => return Err(Error::mismatch(field, "map", other.kind_name())),
    };
    (ops.collect)(entries).ok_or_else(|| wrong_collection(field))
}
