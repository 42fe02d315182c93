//! Scalar kinds and their record representation.

use std::any::Any;

use crate::{Instance, Value};

/// The primitive types a record can hold directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
}

macro_rules! integer_kinds {
    ($($kind:ident => $ty:ty),* $(,)?) => {
        fn integer_to_value(kind: ScalarKind, any: &dyn Any) -> Option<Value> {
            match kind {
                $(ScalarKind::$kind => any
                    .downcast_ref::<$ty>()
                    .and_then(|v| i64::try_from(*v).ok())
                    .map(Value::Integer),)*
                _ => None,
            }
        }

        fn integer_from_i64(kind: ScalarKind, i: i64) -> Option<Instance> {
            match kind {
                $(ScalarKind::$kind => <$ty>::try_from(i).ok().map(|v| Box::new(v) as Instance),)*
                _ => None,
            }
        }
    };
}

integer_kinds! {
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
}

// NaN and the infinities carry over; finite values must stay finite.
fn narrow_float(f: f64) -> Option<f32> {
    let v = f as f32;
    (v.is_finite() || !f.is_finite()).then_some(v)
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "string",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarKind::Bool
                | ScalarKind::F32
                | ScalarKind::F64
                | ScalarKind::Char
                | ScalarKind::String
        )
    }

    /// Read a scalar instance into a record value.
    ///
    /// `None` when `any` is not of this kind or does not fit an `i64`.
    pub fn to_value(self, any: &dyn Any) -> Option<Value> {
        match self {
            ScalarKind::Bool => any.downcast_ref::<bool>().map(|v| Value::Bool(*v)),
            ScalarKind::F32 => any.downcast_ref::<f32>().map(|v| Value::Float(*v as f64)),
            ScalarKind::F64 => any.downcast_ref::<f64>().map(|v| Value::Float(*v)),
            ScalarKind::Char => any
                .downcast_ref::<char>()
                .map(|v| Value::String(v.to_string())),
            ScalarKind::String => any.downcast_ref::<String>().map(|v| Value::String(v.clone())),
            _ => integer_to_value(self, any),
        }
    }

    /// Build a scalar instance from a record value.
    ///
    /// Integers are range-checked. Floats accept integers they represent
    /// exactly, and `f32` rejects finite values beyond its range. Chars
    /// accept one-character strings. `None` when the value does not fit.
    pub fn from_value(self, value: &Value) -> Option<Instance> {
        match (self, value) {
            (ScalarKind::Bool, Value::Bool(b)) => Some(Box::new(*b)),
            (ScalarKind::F32, Value::Float(f)) => narrow_float(*f).map(|v| Box::new(v) as Instance),
            (ScalarKind::F32, Value::Integer(i)) => {
                let v = *i as f32;
                (v as i128 == *i as i128).then(|| Box::new(v) as Instance)
            }
            (ScalarKind::F64, Value::Float(f)) => Some(Box::new(*f)),
            (ScalarKind::F64, Value::Integer(i)) => {
                let v = *i as f64;
                (v as i128 == *i as i128).then(|| Box::new(v) as Instance)
            }
            (ScalarKind::Char, Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Box::new(c)),
                    _ => None,
                }
            }
            (ScalarKind::String, Value::String(s)) => Some(Box::new(s.clone())),
            (kind, Value::Integer(i)) if kind.is_integer() => integer_from_i64(kind, *i),
            _ => None,
        }
    }

    /// The zero value of the kind.
    pub fn default_instance(self) -> Instance {
        match self {
            ScalarKind::Bool => Box::new(false),
            ScalarKind::I8 => Box::new(0i8),
            ScalarKind::I16 => Box::new(0i16),
            ScalarKind::I32 => Box::new(0i32),
            ScalarKind::I64 => Box::new(0i64),
            ScalarKind::U8 => Box::new(0u8),
            ScalarKind::U16 => Box::new(0u16),
            ScalarKind::U32 => Box::new(0u32),
            ScalarKind::U64 => Box::new(0u64),
            ScalarKind::F32 => Box::new(0f32),
            ScalarKind::F64 => Box::new(0f64),
            ScalarKind::Char => Box::new('\0'),
            ScalarKind::String => Box::new(String::new()),
        }
    }

    /// Build a scalar instance from the text of a record field name.
    pub fn parse_key(self, text: &str) -> Option<Instance> {
        let value = match self {
            ScalarKind::String | ScalarKind::Char => Value::String(text.to_string()),
            ScalarKind::Bool => Value::Bool(text.parse().ok()?),
            ScalarKind::F32 | ScalarKind::F64 => Value::Float(text.parse().ok()?),
            _ => Value::Integer(text.parse().ok()?),
        };
        self.from_value(&value)
    }
}
