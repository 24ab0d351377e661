//! CLI: catalog → (inspect | help-text | run)
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use sigcli::{generate, Catalog, Dispatch, GenerateOptions, Generated, Launcher};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// turn a catalog of typed function signatures into a command line program
#[derive(Parser, Debug)]
#[command(name = "sigcli", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// log level for generation diagnostics (also read from RUST_LOG)
    #[arg(long, value_enum, global = true, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    /// only log errors; skipped functions are not reported
    #[arg(long, short, global = true, default_value_t = false)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate and print the report: flags, short names, conversions, support block, skipped functions
    Inspect(InspectOut),
    /// print the catalog help, or one function's help
    HelpText(HelpTextOut),
    /// generate, then run the program on the arguments after `--`
    Run(RunOut),
}

#[derive(Args, Debug, Clone)]
struct CatalogSettings {
    /// One or more catalog files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// analyse functions one after another instead of on the rayon pool
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct HelpTextOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    /// program name used in the example line
    #[arg(long, default_value = "generated-binary")]
    program: String,

    /// function to describe (the whole catalog if omitted)
    function: Option<String>,
}

#[derive(clap::Parser, Debug)]
struct RunOut {
    #[command(flatten)]
    catalog_settings: CatalogSettings,

    /// program name used in help text
    #[arg(long, default_value = "generated-binary")]
    program: String,

    /// arguments of the generated program: a function name and its flags
    #[arg(last = true)]
    argv: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CatalogSettings {
    fn load_catalog(&self) -> anyhow::Result<Catalog> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut catalog = Catalog::default();
        for source_path in source_paths {
            log::info!("loading catalog {}", source_path.display());
            catalog.extend(Catalog::load(&source_path)?);
        }
        if catalog.is_empty() {
            log::warn!("the catalog declares no functions");
        } else {
            log::debug!("catalog declares {} functions", catalog.len());
        }
        Ok(catalog)
    }

    fn generate(&self) -> anyhow::Result<Generated> {
        let catalog = self.load_catalog()?;
        let options = GenerateOptions { parallel: !self.sequential };
        Ok(generate(&catalog, &options)?)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    /// Level for the logger; `--quiet` wins over `--log-level`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet { log::LevelFilter::Error } else { self.log_level.into() }
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Inspect(target) => {
                let generated = target.catalog_settings.generate()?;
                let report_src = serde_json::to_string_pretty(&generated.report())?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &report_src)
                        .with_context(|| format!("failed to write {}", out.display()))?;
                } else {
                    println!("{report_src}");
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::HelpText(target) => {
                let launcher = Launcher::new(&target.program, target.catalog_settings.generate()?);
                let text = match target.function.as_deref() {
                    None => launcher.catalog_help(),
                    Some(name) => launcher
                        .function_help(name)
                        .with_context(|| format!("unknown function {name}"))?,
                };
                print!("{text}");
                Ok(ExitCode::SUCCESS)
            }
            Command::Run(target) => {
                let launcher = Launcher::new(&target.program, target.catalog_settings.generate()?);
                match launcher.dispatch(&target.argv) {
                    Ok(Dispatch::CatalogHelp(text) | Dispatch::FunctionHelp(text)) => {
                        print!("{text}");
                        Ok(ExitCode::SUCCESS)
                    }
                    Ok(Dispatch::Invoke(call)) => {
                        // the invocation shim: show what the function would receive
                        println!("{}", serde_json::to_string_pretty(&call.to_json())?);
                        Ok(ExitCode::SUCCESS)
                    }
                    Err(failure) => {
                        eprint!("{}", failure.render(true));
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let matched = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // an explicit glob that matched nothing is surfaced as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
