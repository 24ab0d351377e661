//! Turn a catalog of typed function signatures into a command-line program:
//! one subcommand per function, one flag per parameter, abbreviated flag
//! names and typed value parsing.
pub mod bind;
pub mod cast;
pub mod catalog;
pub mod complex;
pub mod error;
pub mod generate;
pub mod help;
pub mod launch;
pub mod tokenize;
pub mod trie;
pub mod types;
pub mod value;

pub use bind::BoundCall;
pub use cast::ConversionTable;
pub use catalog::{Catalog, FunctionSignature, ParamSignature};
pub use generate::{generate, GenerateOptions, Generated, GeneratedFunction};
pub use launch::{Dispatch, LaunchFailure, Launcher};
pub use types::{BaseKind, Flag, ParameterType};
pub use value::{Scalar, Value};
