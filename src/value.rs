//! Runtime values produced by casting and binding.
use std::fmt;

use serde_json::json;

use crate::types::{BaseKind, ParameterType};

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(isize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Uint(usize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Complex64 { re: f32, im: f32 },
    Complex128 { re: f64, im: f64 },
    Bool(bool),
    Str(String),
    Byte(u8),
    Rune(char),
    /// A failure value carrying its message.
    Failure(String),
}

impl Scalar {
    pub fn kind(&self) -> BaseKind {
        match self {
            Scalar::Int(_) => BaseKind::Int,
            Scalar::I8(_) => BaseKind::Int8,
            Scalar::I16(_) => BaseKind::Int16,
            Scalar::I32(_) => BaseKind::Int32,
            Scalar::I64(_) => BaseKind::Int64,
            Scalar::Uint(_) => BaseKind::Uint,
            Scalar::U8(_) => BaseKind::Uint8,
            Scalar::U16(_) => BaseKind::Uint16,
            Scalar::U32(_) => BaseKind::Uint32,
            Scalar::U64(_) => BaseKind::Uint64,
            Scalar::F32(_) => BaseKind::Float32,
            Scalar::F64(_) => BaseKind::Float64,
            Scalar::Complex64 { .. } => BaseKind::Complex64,
            Scalar::Complex128 { .. } => BaseKind::Complex128,
            Scalar::Bool(_) => BaseKind::Bool,
            Scalar::Str(_) => BaseKind::String,
            Scalar::Byte(_) => BaseKind::Byte,
            Scalar::Rune(_) => BaseKind::Rune,
            Scalar::Failure(_) => BaseKind::Error,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Int(v) => json!(v),
            Scalar::I8(v) => json!(v),
            Scalar::I16(v) => json!(v),
            Scalar::I32(v) => json!(v),
            Scalar::I64(v) => json!(v),
            Scalar::Uint(v) => json!(v),
            Scalar::U8(v) => json!(v),
            Scalar::U16(v) => json!(v),
            Scalar::U32(v) => json!(v),
            Scalar::U64(v) => json!(v),
            // non-finite floats become null
            Scalar::F32(v) => json!(v),
            Scalar::F64(v) => json!(v),
            Scalar::Complex64 { re, im } => json!({ "re": re, "im": im }),
            Scalar::Complex128 { re, im } => json!({ "re": re, "im": im }),
            Scalar::Bool(v) => json!(v),
            Scalar::Str(v) => json!(v),
            Scalar::Byte(v) => json!((*v as char).to_string()),
            Scalar::Rune(v) => json!(v.to_string()),
            Scalar::Failure(message) => json!({ "error": message }),
        }
    }
}

/// Canonical text; casting it back yields the same scalar.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::I8(v) => write!(f, "{v}"),
            Scalar::I16(v) => write!(f, "{v}"),
            Scalar::I32(v) => write!(f, "{v}"),
            Scalar::I64(v) => write!(f, "{v}"),
            Scalar::Uint(v) => write!(f, "{v}"),
            Scalar::U8(v) => write!(f, "{v}"),
            Scalar::U16(v) => write!(f, "{v}"),
            Scalar::U32(v) => write!(f, "{v}"),
            Scalar::U64(v) => write!(f, "{v}"),
            Scalar::F32(v) => write!(f, "{v}"),
            Scalar::F64(v) => write!(f, "{v}"),
            Scalar::Complex64 { re, im } => write!(f, "({re},{im}i)"),
            Scalar::Complex128 { re, im } => write!(f, "({re},{im}i)"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Str(v) => f.write_str(v),
            Scalar::Byte(v) => write!(f, "{}", *v as char),
            Scalar::Rune(v) => write!(f, "{v}"),
            Scalar::Failure(message) => f.write_str(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    /// One pointer layer.
    Ptr(Box<Value>),
    /// A pointer to nothing.
    Nil,
    /// Variable-length list.
    List(Vec<Value>),
    /// Fixed-length array; always holds exactly its declared number of slots.
    Array(Vec<Value>),
}

impl Value {
    /// Wrap in `depth` pointer layers.
    pub fn wrap(self, depth: u32) -> Value {
        (0..depth).fold(self, |value, _| Value::Ptr(Box::new(value)))
    }

    /// What a parameter receives when its flag was not passed.
    pub fn absent(ty: &ParameterType) -> Option<Value> {
        if ty.is_pointer() {
            Some(Value::Nil)
        } else if ty.is_switch() {
            Some(Value::Scalar(Scalar::Bool(false)))
        } else {
            None
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Scalar(scalar) => scalar.to_json(),
            Value::Ptr(inner) => inner.to_json(),
            Value::Nil => serde_json::Value::Null,
            Value::List(items) | Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}
