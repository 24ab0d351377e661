//! Runtime entry point of a generated program: `argv[1]` picks the function.

use colored::Colorize;
use thiserror::Error;

use crate::bind::BoundCall;
use crate::error::LaunchError;
use crate::generate::{Generated, HELP_COMMAND};
use crate::help;

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// `help` alone: the list of functions.
    CatalogHelp(String),
    /// `<function> help`.
    FunctionHelp(String),
    Invoke(BoundCall),
}

/// A failed launch together with the help text to show after the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct LaunchFailure {
    #[source]
    pub error: LaunchError,
    pub help: String,
}

impl LaunchFailure {
    /// `[ERR]: <message>` followed by the help text, for stderr.
    pub fn render(&self, color: bool) -> String {
        let tag = if color { "[ERR]:".red().to_string() } else { "[ERR]:".to_string() };
        format!("{tag} {}\n{}", self.error, self.help)
    }
}

pub struct Launcher {
    program: String,
    generated: Generated,
}

impl Launcher {
    pub fn new(program: impl Into<String>, generated: Generated) -> Self {
        Self { program: program.into(), generated }
    }

    pub fn generated(&self) -> &Generated {
        &self.generated
    }

    pub fn catalog_help(&self) -> String {
        help::catalog_help(&self.program, self.generated.names())
    }

    pub fn function_help(&self, name: &str) -> Option<String> {
        let function = self.generated.function(name)?;
        Some(help::function_help(&function.help_input()))
    }

    /// Route `argv` (program name excluded) to help or to a function's parser.
    pub fn dispatch<S: AsRef<str>>(&self, argv: &[S]) -> Result<Dispatch, LaunchFailure> {
        let Some((name, rest)) = argv.split_first() else {
            return Err(self.catalog_failure(LaunchError::NoFunction));
        };
        let name = name.as_ref();
        if name == HELP_COMMAND && rest.is_empty() {
            return Ok(Dispatch::CatalogHelp(self.catalog_help()));
        }
        let Some(function) = self.generated.function(name) else {
            return Err(self.catalog_failure(LaunchError::UnknownFunction(name.to_string())));
        };
        let function_help = || help::function_help(&function.help_input());
        if let [only] = rest {
            if only.as_ref() == HELP_COMMAND {
                return Ok(Dispatch::FunctionHelp(function_help()));
            }
        }
        function
            .parse(rest, &self.generated.conversions)
            .map(Dispatch::Invoke)
            .map_err(|source| LaunchFailure {
                error: LaunchError::Invocation { function: name.to_string(), source },
                help: function_help(),
            })
    }

    fn catalog_failure(&self, error: LaunchError) -> LaunchFailure {
        LaunchFailure { error, help: self.catalog_help() }
    }
}
