mod commands;
mod logging;
mod progress;
mod tasks;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dotenv::dotenv;
use std::process;
use tracing::{debug, info};
use upa_core::config::load_configuration;
use upa_core::error::{EXIT_ABNORMAL, EXIT_UNKNOWN_TASK};
use upa_core::{LocalMediaService, MediaFileService};

use crate::commands::Cli;
use crate::logging::{init_logger, ConsoleSettings, Verbosity};
use crate::progress::ConsoleReporter;
use crate::tasks::TaskContext;

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                ErrorKind::InvalidSubcommand => EXIT_UNKNOWN_TASK,
                _ => EXIT_ABNORMAL,
            };
            let _ = err.print();
            process::exit(code)
        }
    }
}

fn main() {
    dotenv().ok();
    let cli = parse_cli();

    let config = match load_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load configuration: {}", err);
            process::exit(err.exit_code())
        }
    };

    let settings = ConsoleSettings::from_cli(&cli);
    let reporter = ConsoleReporter::new(settings);
    reporter.attach_log_guard(init_logger(
        &settings,
        config.log_file.as_deref(),
        reporter.slot(),
    ));
    debug!("Loaded configuration: {:?}", config);

    let service = LocalMediaService::new(config.supported_formats.clone());

    if cli.supported_formats {
        if settings.is_quiet() {
            reporter.abnormal_exit("--supported-formats has no output in quiet mode", EXIT_ABNORMAL);
        }
        let formats = service.supported_extensions();
        if settings.verbosity == Verbosity::Verbose {
            info!("Supported image formats: {}", formats.join(", "));
        } else {
            info!("{}", formats.join("|"));
        }
        reporter.exit(0);
    }

    let Some(command) = cli.command.as_ref() else {
        let _ = Cli::command().print_help();
        reporter.exit(EXIT_ABNORMAL);
    };

    let ctx = TaskContext {
        config: &config,
        service: &service,
        reporter: &reporter,
    };
    match tasks::run(command, &ctx) {
        Ok(code) => reporter.exit(code),
        Err(err) => reporter.abnormal_exit(&err.to_string(), err.exit_code()),
    }
}
