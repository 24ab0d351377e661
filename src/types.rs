//! Parameter type model.
//!
//! A declared type such as `*[3]**int64` is normalised into a closed
//! [`BaseKind`], the indirection wrapped directly around the base, and at
//! most one array layer with its own independent indirection:
//!
//! ```text
//!   *  [3]  **  int64
//!   │   │   │   └── base kind
//!   │   │   └────── base indirection (array of pointers to elements)
//!   │   └────────── bounded array layer
//!   └────────────── array indirection (pointer to the array)
//! ```
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::TypeModelError;

// ————————————————————————————————————————————————————————————————————————————
// BASE KIND
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Bool,
    String,
    Byte,
    Rune,
    Error,
}

static KIND_BY_NAME: Lazy<HashMap<&'static str, BaseKind>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, BaseKind> =
        BaseKind::ALL.iter().map(|kind| (kind.name(), *kind)).collect();
    // Rust spellings of the same kinds
    table.extend([
        ("isize", BaseKind::Int),
        ("i8", BaseKind::Int8),
        ("i16", BaseKind::Int16),
        ("i32", BaseKind::Int32),
        ("i64", BaseKind::Int64),
        ("usize", BaseKind::Uint),
        ("u8", BaseKind::Uint8),
        ("u16", BaseKind::Uint16),
        ("u32", BaseKind::Uint32),
        ("u64", BaseKind::Uint64),
        ("f32", BaseKind::Float32),
        ("f64", BaseKind::Float64),
        ("char", BaseKind::Rune),
    ]);
    table
});

impl BaseKind {
    pub const COUNT: usize = 19;

    pub const ALL: [BaseKind; Self::COUNT] = [
        BaseKind::Int,
        BaseKind::Int8,
        BaseKind::Int16,
        BaseKind::Int32,
        BaseKind::Int64,
        BaseKind::Uint,
        BaseKind::Uint8,
        BaseKind::Uint16,
        BaseKind::Uint32,
        BaseKind::Uint64,
        BaseKind::Float32,
        BaseKind::Float64,
        BaseKind::Complex64,
        BaseKind::Complex128,
        BaseKind::Bool,
        BaseKind::String,
        BaseKind::Byte,
        BaseKind::Rune,
        BaseKind::Error,
    ];

    /// Position in dispatch tables indexed by kind.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseKind::Int => "int",
            BaseKind::Int8 => "int8",
            BaseKind::Int16 => "int16",
            BaseKind::Int32 => "int32",
            BaseKind::Int64 => "int64",
            BaseKind::Uint => "uint",
            BaseKind::Uint8 => "uint8",
            BaseKind::Uint16 => "uint16",
            BaseKind::Uint32 => "uint32",
            BaseKind::Uint64 => "uint64",
            BaseKind::Float32 => "float32",
            BaseKind::Float64 => "float64",
            BaseKind::Complex64 => "complex64",
            BaseKind::Complex128 => "complex128",
            BaseKind::Bool => "bool",
            BaseKind::String => "string",
            BaseKind::Byte => "byte",
            BaseKind::Rune => "rune",
            BaseKind::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        KIND_BY_NAME.get(name).copied()
    }

    /// The float kind each complex component is cast with.
    pub fn component_kind(self) -> Option<BaseKind> {
        match self {
            BaseKind::Complex64 => Some(BaseKind::Float32),
            BaseKind::Complex128 => Some(BaseKind::Float64),
            _ => None,
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PARAMETER TYPE
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayLayer {
    /// `Some(n)` for a bounded array of exactly `n` slots, `None` for a list.
    pub length: Option<usize>,
    /// Pointer layers around the array itself.
    pub indirection: u32,
}

impl ArrayLayer {
    pub fn is_bounded(&self) -> bool {
        self.length.is_some()
    }

    /// `[3]` or `[]`.
    pub fn shape(&self) -> String {
        match self.length {
            Some(length) => format!("[{length}]"),
            None => "[]".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterType {
    pub base: BaseKind,
    /// Pointer layers directly around the base value.
    pub base_indirection: u32,
    pub array: Option<ArrayLayer>,
}

static DECLARED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<outer>\**)(?:\[(?P<len>[^\]]*)\](?P<inner>\**))?(?P<base>.*)$")
        .expect("declared type pattern is valid")
});

impl ParameterType {
    pub fn scalar(base: BaseKind) -> Self {
        Self { base, base_indirection: 0, array: None }
    }

    /// Derive the normalised shape of a declared type.
    pub fn parse(declared: &str) -> Result<Self, TypeModelError> {
        let declared = declared.trim();
        let malformed = |reason: &str| TypeModelError::Malformed {
            declared: declared.to_string(),
            reason: reason.to_string(),
        };
        let caps = DECLARED_TYPE
            .captures(declared)
            .ok_or_else(|| malformed("unrecognised type syntax"))?;
        let outer = caps.name("outer").map_or(0, |m| m.as_str().len()) as u32;
        let base_src = caps.name("base").map_or("", |m| m.as_str());

        // pointers were already taken by the pattern, so `[` here opens a second layer
        if base_src.starts_with('[') {
            return Err(TypeModelError::UnsupportedShape(declared.to_string()));
        }
        if base_src.contains('[') || base_src.contains(']') {
            return Err(malformed("misplaced brackets"));
        }
        if base_src.is_empty() {
            return Err(malformed("missing base type"));
        }
        let base = BaseKind::from_name(base_src)
            .ok_or_else(|| TypeModelError::UnknownType(base_src.to_string()))?;

        let Some(len) = caps.name("len") else {
            return Ok(Self { base, base_indirection: outer, array: None });
        };
        let length = match len.as_str().trim() {
            "" => None,
            digits if digits.bytes().all(|b| b.is_ascii_digit()) => Some(
                digits
                    .parse::<usize>()
                    .map_err(|_| malformed("array length is too large"))?,
            ),
            _ => return Err(malformed("array length must be a non-negative integer literal")),
        };
        let inner = caps.name("inner").map_or(0, |m| m.as_str().len()) as u32;
        Ok(Self {
            base,
            base_indirection: inner,
            array: Some(ArrayLayer { length, indirection: outer }),
        })
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// The outermost layer is a pointer.
    pub fn is_pointer(&self) -> bool {
        match &self.array {
            Some(layer) => layer.indirection > 0,
            None => self.base_indirection > 0,
        }
    }

    /// Presence alone sets a non-array bool.
    pub fn is_switch(&self) -> bool {
        self.base == BaseKind::Bool && !self.is_array()
    }

    pub fn is_required(&self) -> bool {
        !self.is_switch() && !self.is_pointer()
    }

    /// The element (or value) type without the array layer: `**int64`.
    pub fn element_text(&self) -> String {
        format!("{}{}", "*".repeat(self.base_indirection as usize), self.base)
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(layer) = &self.array {
            write!(f, "{}{}", "*".repeat(layer.indirection as usize), layer.shape())?;
        }
        f.write_str(&self.element_text())
    }
}

impl Serialize for ParameterType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FLAG
// ————————————————————————————————————————————————————————————————————————————

/// One parameter as seen from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub name: String,
    /// Shortest unambiguous alias; `None` when the full name is required.
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub ty: ParameterType,
}

impl Flag {
    pub fn is_required(&self) -> bool {
        self.ty.is_required()
    }

    /// The short name, when it actually saves typing.
    pub fn distinct_short_name(&self) -> Option<&str> {
        self.short_name.as_deref().filter(|short| *short != self.name)
    }
}
