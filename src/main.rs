pub mod cli;

use std::process::ExitCode;

use colored::Colorize;
use env_logger::Env;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .filter_level(command_line_interface.log_level())
        .format_timestamp(None)
        .init();

    match command_line_interface.run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error:#}", "[ERR]:".red());
            ExitCode::FAILURE
        }
    }
}
