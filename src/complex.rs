//! Complex literal grammar.
//!
//! Accepted forms, with `i` as the imaginary-unit marker:
//! - `3.5` (real only), `-2i` (imaginary only), `i`, `-i`, `+i`
//! - `(re, imi)` or `(imi, re)`: exactly one comma, exactly one marked part
//!
//! The parser only splits the literal; each part is cast by the float
//! routine of the matching width.
use crate::error::{ComplexGrammarError, ComplexReason};

pub const IMAGINARY_UNIT: char = 'i';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexParts {
    pub real: String,
    pub imag: String,
}

impl ComplexParts {
    fn new(real: &str, imag: &str) -> Self {
        Self { real: real.to_string(), imag: normalize_imag(imag).to_string() }
    }
}

pub fn parse(arg: &str) -> Result<ComplexParts, ComplexGrammarError> {
    if arg.is_empty() {
        return Err(ComplexGrammarError::Empty);
    }
    let malformed = |reason| ComplexGrammarError::Malformed { literal: arg.to_string(), reason };

    let Some(payload) = arg.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) else {
        return Ok(match arg.strip_suffix(IMAGINARY_UNIT) {
            Some(imag) => ComplexParts::new("0", imag),
            None => ComplexParts::new(arg, "0"),
        });
    };

    let Some((first, second)) = payload.split_once(',') else {
        return Err(malformed(ComplexReason::MissingSeparator));
    };
    if second.is_empty() {
        return Err(malformed(ComplexReason::MissingSeparator));
    }
    if second.contains(',') {
        return Err(malformed(ComplexReason::MultipleSeparators));
    }
    let (first, second) = (first.trim(), second.trim());
    if first.is_empty() || second.is_empty() {
        return Err(malformed(ComplexReason::EmptyComponent));
    }

    match (first.strip_suffix(IMAGINARY_UNIT), second.strip_suffix(IMAGINARY_UNIT)) {
        (Some(imag), None) => Ok(ComplexParts::new(second, imag)),
        (None, Some(imag)) => Ok(ComplexParts::new(first, imag)),
        _ => Err(malformed(ComplexReason::AmbiguousParts)),
    }
}

/// A bare unit marker means a coefficient of one.
fn normalize_imag(imag: &str) -> &str {
    match imag {
        "" => "1",
        "-" => "-1",
        "+" => "+1",
        other => other,
    }
}
