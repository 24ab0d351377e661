//! String-to-value cast routines and the per-kind conversion table.
//!
//! The generation pass asks a [`CastSynthesizer`] for every base kind it
//! meets; each kind is synthesized at most once and the finished
//! [`ConversionTable`] is shared read-only by every function at runtime.
use crate::complex;
use crate::error::{CastError, InternalError, NumReason};
use crate::types::BaseKind;
use crate::value::Scalar;

pub type CastFn = fn(&str) -> Result<Scalar, CastError>;

// ————————————————————————————————————————————————————————————————————————————
// CONVERSION TABLE
// ————————————————————————————————————————————————————————————————————————————

/// Cast routines indexed by [`BaseKind::index`].
#[derive(Clone)]
pub struct ConversionTable {
    routines: [Option<CastFn>; BaseKind::COUNT],
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self { routines: [None; BaseKind::COUNT] }
    }
}

impl std::fmt::Debug for ConversionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}

impl ConversionTable {
    pub fn get(&self, kind: BaseKind) -> Option<CastFn> {
        self.routines[kind.index()]
    }

    pub fn contains(&self, kind: BaseKind) -> bool {
        self.get(kind).is_some()
    }

    /// Kinds with a routine, in declaration order of [`BaseKind`].
    pub fn kinds(&self) -> impl Iterator<Item = BaseKind> + '_ {
        BaseKind::ALL.into_iter().filter(|kind| self.contains(*kind))
    }

    pub fn routine(&self, kind: BaseKind) -> Result<CastFn, InternalError> {
        self.get(kind)
            .ok_or_else(|| InternalError::new(format!("no cast routine was synthesized for {kind}")))
    }

    /// Every kind; mostly for tests and ad-hoc casting.
    pub fn complete() -> Self {
        let mut synth = CastSynthesizer::default();
        for kind in BaseKind::ALL {
            synth.require(kind);
        }
        synth.finish()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SYNTHESIS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
pub struct CastSynthesizer {
    table: ConversionTable,
    complex_parser: bool,
}

impl CastSynthesizer {
    /// Make sure `kind` has a routine. Returns `false` when it already had one.
    pub fn require(&mut self, kind: BaseKind) -> bool {
        if self.table.contains(kind) {
            return false;
        }
        if let Some(component) = kind.component_kind() {
            self.complex_parser = true;
            self.require(component);
        }
        self.table.routines[kind.index()] = Some(routine_for(kind));
        true
    }

    /// Whether any synthesized routine needs the complex grammar.
    pub fn needs_complex_parser(&self) -> bool {
        self.complex_parser
    }

    pub fn table(&self) -> &ConversionTable {
        &self.table
    }

    pub fn finish(self) -> ConversionTable {
        self.table
    }
}

fn routine_for(kind: BaseKind) -> CastFn {
    match kind {
        BaseKind::Int => cast_int,
        BaseKind::Int8 => cast_int8,
        BaseKind::Int16 => cast_int16,
        BaseKind::Int32 => cast_int32,
        BaseKind::Int64 => cast_int64,
        BaseKind::Uint => cast_uint,
        BaseKind::Uint8 => cast_uint8,
        BaseKind::Uint16 => cast_uint16,
        BaseKind::Uint32 => cast_uint32,
        BaseKind::Uint64 => cast_uint64,
        BaseKind::Float32 => cast_float32,
        BaseKind::Float64 => cast_float64,
        BaseKind::Complex64 => cast_complex64,
        BaseKind::Complex128 => cast_complex128,
        BaseKind::Bool => cast_bool,
        BaseKind::String => cast_string,
        BaseKind::Byte => cast_byte,
        BaseKind::Rune => cast_rune,
        BaseKind::Error => cast_error,
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ROUTINES
// ————————————————————————————————————————————————————————————————————————————

macro_rules! signed_routine {
    ($name:ident, $bits:expr, $variant:ident, $ty:ty, $target:literal) => {
        fn $name(arg: &str) -> Result<Scalar, CastError> {
            parse_signed(arg, $bits)
                .map(|v| Scalar::$variant(v as $ty))
                .map_err(|reason| CastError::Integer { literal: arg.to_string(), target: $target, reason })
        }
    };
}

macro_rules! unsigned_routine {
    ($name:ident, $bits:expr, $variant:ident, $ty:ty, $target:literal) => {
        fn $name(arg: &str) -> Result<Scalar, CastError> {
            parse_unsigned(arg, $bits)
                .map(|v| Scalar::$variant(v as $ty))
                .map_err(|reason| CastError::Integer { literal: arg.to_string(), target: $target, reason })
        }
    };
}

signed_routine!(cast_int, isize::BITS, Int, isize, "int");
signed_routine!(cast_int8, 8, I8, i8, "int8");
signed_routine!(cast_int16, 16, I16, i16, "int16");
signed_routine!(cast_int32, 32, I32, i32, "int32");
signed_routine!(cast_int64, 64, I64, i64, "int64");
unsigned_routine!(cast_uint, usize::BITS, Uint, usize, "uint");
unsigned_routine!(cast_uint8, 8, U8, u8, "uint8");
unsigned_routine!(cast_uint16, 16, U16, u16, "uint16");
unsigned_routine!(cast_uint32, 32, U32, u32, "uint32");
unsigned_routine!(cast_uint64, 64, U64, u64, "uint64");

fn cast_float32(arg: &str) -> Result<Scalar, CastError> {
    parse_f32(arg).map(Scalar::F32)
}

fn cast_float64(arg: &str) -> Result<Scalar, CastError> {
    parse_f64(arg).map(Scalar::F64)
}

fn cast_complex64(arg: &str) -> Result<Scalar, CastError> {
    let parts = complex::parse(arg)?;
    Ok(Scalar::Complex64 { re: parse_f32(&parts.real)?, im: parse_f32(&parts.imag)? })
}

fn cast_complex128(arg: &str) -> Result<Scalar, CastError> {
    let parts = complex::parse(arg)?;
    Ok(Scalar::Complex128 { re: parse_f64(&parts.real)?, im: parse_f64(&parts.imag)? })
}

fn cast_bool(arg: &str) -> Result<Scalar, CastError> {
    match arg.to_lowercase().as_str() {
        "true" | "t" => Ok(Scalar::Bool(true)),
        "false" | "f" => Ok(Scalar::Bool(false)),
        _ => Err(CastError::Bool(arg.to_string())),
    }
}

fn cast_string(arg: &str) -> Result<Scalar, CastError> {
    Ok(Scalar::Str(arg.to_string()))
}

fn cast_byte(arg: &str) -> Result<Scalar, CastError> {
    match arg.as_bytes() {
        [] => Err(CastError::EmptyUnit { target: "byte" }),
        [byte] => Ok(Scalar::Byte(*byte)),
        bytes => Err(CastError::TooManyUnits {
            literal: arg.to_string(),
            target: "byte",
            count: bytes.len(),
            unit: "bytes",
        }),
    }
}

fn cast_rune(arg: &str) -> Result<Scalar, CastError> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(CastError::EmptyUnit { target: "rune" }),
        (Some(ch), None) => Ok(Scalar::Rune(ch)),
        _ => Err(CastError::TooManyUnits {
            literal: arg.to_string(),
            target: "rune",
            count: arg.chars().count(),
            unit: "runes",
        }),
    }
}

fn cast_error(arg: &str) -> Result<Scalar, CastError> {
    Ok(Scalar::Failure(arg.to_string()))
}

// ————————————————————————————————————————————————————————————————————————————
// NUMERIC GRAMMAR
// ————————————————————————————————————————————————————————————————————————————

fn parse_f32(arg: &str) -> Result<f32, CastError> {
    let value = parse_float::<f32>(arg, "float32")?;
    if value.is_infinite() && !is_infinity_literal(arg) {
        return Err(float_error(arg, "float32", NumReason::OutOfRange));
    }
    Ok(value)
}

fn parse_f64(arg: &str) -> Result<f64, CastError> {
    let value = parse_float::<f64>(arg, "float64")?;
    if value.is_infinite() && !is_infinity_literal(arg) {
        return Err(float_error(arg, "float64", NumReason::OutOfRange));
    }
    Ok(value)
}

fn parse_float<T: std::str::FromStr>(arg: &str, target: &'static str) -> Result<T, CastError> {
    arg.parse::<T>().map_err(|_| float_error(arg, target, NumReason::InvalidSyntax))
}

fn is_infinity_literal(arg: &str) -> bool {
    let unsigned = arg.strip_prefix(['+', '-']).unwrap_or(arg);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn float_error(arg: &str, target: &'static str, reason: NumReason) -> CastError {
    CastError::Float { literal: arg.to_string(), target, reason }
}

fn parse_signed(literal: &str, bits: u32) -> Result<i64, NumReason> {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    let magnitude = parse_magnitude(unsigned)?;
    let limit = 1u128 << (bits - 1);
    if negative {
        if magnitude > limit {
            return Err(NumReason::OutOfRange);
        }
        Ok((-(magnitude as i128)) as i64)
    } else {
        if magnitude >= limit {
            return Err(NumReason::OutOfRange);
        }
        Ok(magnitude as i64)
    }
}

fn parse_unsigned(literal: &str, bits: u32) -> Result<u64, NumReason> {
    if literal.starts_with(['+', '-']) {
        return Err(NumReason::InvalidSyntax);
    }
    let magnitude = parse_magnitude(literal)?;
    if magnitude > (u64::MAX >> (64 - bits)) as u128 {
        return Err(NumReason::OutOfRange);
    }
    Ok(magnitude as u64)
}

/// Unsigned integer literal with an optional base prefix (`0x`, `0o`, `0b`,
/// or a legacy leading `0` for octal). Single underscores may separate digits
/// or follow a prefix.
fn parse_magnitude(literal: &str) -> Result<u128, NumReason> {
    let bytes = literal.as_bytes();
    let (radix, digits, prefixed) = match bytes {
        [b'0', b'x' | b'X', rest @ ..] => (16, rest, true),
        [b'0', b'o' | b'O', rest @ ..] => (8, rest, true),
        [b'0', b'b' | b'B', rest @ ..] => (2, rest, true),
        [b'0', rest @ ..] if !rest.is_empty() => (8, rest, true),
        _ => (10, bytes, false),
    };
    if digits.is_empty() {
        return Err(NumReason::InvalidSyntax);
    }

    let mut value: u128 = 0;
    let mut overflow = false;
    // the prefix counts as a digit for underscore placement
    let mut after_digit = prefixed;
    let mut saw_digit = false;
    for &b in digits {
        if b == b'_' {
            if !after_digit {
                return Err(NumReason::InvalidSyntax);
            }
            after_digit = false;
            continue;
        }
        let digit = (b as char).to_digit(radix).ok_or(NumReason::InvalidSyntax)?;
        after_digit = true;
        saw_digit = true;
        match value.checked_mul(radix as u128).and_then(|v| v.checked_add(digit as u128)) {
            Some(next) => value = next,
            None => overflow = true,
        }
    }
    if !after_digit || !saw_digit {
        return Err(NumReason::InvalidSyntax);
    }
    if overflow {
        return Err(NumReason::OutOfRange);
    }
    Ok(value)
}
