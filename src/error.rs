//! Error taxonomy shared by generation and runtime binding.
//!
//! Generation-time errors (`TypeModelError`, `AbbreviationError`,
//! `GenerateError`) skip a single function. Runtime errors (`TokenizeError`,
//! `CastError`, `BindError`, `LaunchError`) abort one invocation.
//! `InternalError` marks a broken invariant and is never caused by user input;
//! during generation it aborts the whole pass instead of skipping a function.

use std::path::PathBuf;
use thiserror::Error;

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL
// ————————————————————————————————————————————————————————————————————————————

/// A broken internal invariant. Never the user's fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("internal error: {0}")]
pub struct InternalError(pub String);

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// GENERATION TIME
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeModelError {
    #[error("type {0} is unknown")]
    UnknownType(String),

    #[error("multidimensional parameters are not supported: {0}")]
    UnsupportedShape(String),

    #[error("malformed type {declared}: {reason}")]
    Malformed { declared: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbbreviationError {
    #[error("zero arguments passed")]
    NoNames,

    #[error("passed name is empty")]
    EmptyName,

    #[error("failed to append the argument {0}: it is already in the trie")]
    Duplicate(String),
}

/// Why a catalog function was left out of the generated program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("failed to analyse parameter #{index} \"{name}\": {source}")]
    Parameter {
        index: usize,
        name: String,
        #[source]
        source: TypeModelError,
    },

    #[error(transparent)]
    Abbreviation(#[from] AbbreviationError),

    #[error("function {0} is declared more than once")]
    DuplicateFunction(String),

    #[error("function name {0:?} is reserved")]
    ReservedName(String),
}

// ————————————————————————————————————————————————————————————————————————————
// RUNTIME
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumReason {
    #[error("invalid syntax")]
    InvalidSyntax,
    #[error("value out of range")]
    OutOfRange,
}

/// Sub-reasons of a malformed parenthesised complex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComplexReason {
    #[error("it should contain real and imaginary parts separated by a comma (e.g. \"(1,2i)\")")]
    MissingSeparator,
    #[error("it should contain real and imaginary parts separated by a comma (e.g. \"(1,2i)\")")]
    EmptyComponent,
    #[error("multiple commas found")]
    MultipleSeparators,
    #[error("it should contain one and only one real part and one and only one imaginary part")]
    AmbiguousParts,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComplexGrammarError {
    #[error("an empty string cannot be parsed as a complex number")]
    Empty,

    #[error("\"{literal}\" cannot be parsed as a complex number: {reason}")]
    Malformed { literal: String, reason: ComplexReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("failed to cast {literal} to {target}: parsing \"{literal}\": {reason}")]
    Integer { literal: String, target: &'static str, reason: NumReason },

    #[error("failed to cast \"{literal}\" to {target}: parsing \"{literal}\": {reason}")]
    Float { literal: String, target: &'static str, reason: NumReason },

    #[error("expected zero or one argument that must be any of [true, t, false, f] (case insensitive), got: {0}")]
    Bool(String),

    #[error("failed to cast an empty string to {target}")]
    EmptyUnit { target: &'static str },

    #[error("failed to cast {literal} to {target}: {literal} contains {count} {unit}")]
    TooManyUnits { literal: String, target: &'static str, count: usize, unit: &'static str },

    #[error(transparent)]
    Complex(#[from] ComplexGrammarError),
}

/// Why a flag's value run could not be read as a single argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgCountReason {
    #[error("no arguments passed")]
    Missing,
    #[error("expected a single argument, got {} ({})", .0.len(), bracketed(.0))]
    TooMany(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("an error occurred during the flag \"{0}\" extraction: expected a flag (e.g. --flag), got an argument \"{0}\"")]
    NotAFlag(String),

    #[error("an error occurred during the flag \"{0}\" extraction: passed flag \"{0}\" is treated as empty and empty flags are not allowed")]
    EmptyFlag(String),

    #[error("\"--\" found, but ending command options and passing positional arguments is NYI")]
    Terminator,

    #[error("an unexpected flag \"{0}\" found")]
    UnexpectedFlag(String),

    #[error("could not get the argument passed to the flag \"{flag}\": {reason}")]
    ArgumentCount { flag: String, reason: ArgCountReason },

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("cast failed: {0}")]
    Cast(#[from] CastError),

    #[error("flag {flag}: expected {expected} argument{}, but got {} ({})", plural(.expected), .actual.len(), bracketed(.actual))]
    ArrayLength { flag: String, expected: usize, actual: Vec<String> },

    /// Every required flag that was absent, in declaration order.
    #[error("required flags were not passed: {}", dashed(.0))]
    MissingRequired(Vec<String>),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("no function name passed")]
    NoFunction,

    #[error("unknown function {0}")]
    UnknownFunction(String),

    #[error("{source}")]
    Invocation {
        function: String,
        #[source]
        source: BindError,
    },
}

// ————————————————————————————————————————————————————————————————————————————
// CATALOG INPUT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {origin}: {message}")]
    Parse { origin: String, message: String },
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn bracketed(values: &[String]) -> String {
    format!("[{}]", values.join(" "))
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

fn dashed(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"-{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
