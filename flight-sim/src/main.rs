use std::{
    io::{self, ErrorKind},
    process::ExitCode,
};

use clap::Parser;
use flight_sim::{
    cli::Args,
    commands::{CommandError, ShellCommand},
    config::{Config, ConfigError},
    shell::Shell,
    types::{
        client::RedisStore,
        emulation::TrafficEmulation,
        store::{FlightStore, StoreError},
    },
};
use logger::{Color, Logger};
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every one-shot query succeeded.
fn run(args: &Args) -> Result<bool, AppError> {
    let config = Config::resolve(args.connection.as_deref(), args.log_dir.clone())?;

    let logger = match Logger::new(&config.log_dir, &config.addr()) {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Warning: running without a session log: {}", e);
            None
        }
    };

    log_info(&logger, &format!("connecting to {}", config.addr()));
    let store = RedisStore::connect(&config).map_err(|source| {
        let error = AppError::Connection {
            addr: config.addr(),
            source,
        };
        log_error(&logger, &error.to_string());
        error
    })?;
    let mut emulation = TrafficEmulation::new(store);

    if let Some(path) = &args.json {
        let import = ShellCommand::Load(path.clone());
        log_info(&logger, &import.describe());
        match import.execute(&mut emulation) {
            Ok(reply) => println!("{}", reply.render(false)?),
            Err(e) => {
                log_error(&logger, &e.to_string());
                return Err(e.into());
            }
        }
    }

    if !args.has_queries() {
        let mut shell = Shell::new(emulation, logger);
        return match shell.run(io::stdin().lock(), io::stdout()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(true),
            Err(e) => Err(e.into()),
        };
    }

    let mut all_succeeded = true;
    for query in args.queries()? {
        log_info(&logger, &query.describe());
        if let Err(e) = answer(&query, &mut emulation) {
            log_error(&logger, &e.to_string());
            eprintln!("Error: {}", e);
            all_succeeded = false;
        }
    }
    Ok(all_succeeded)
}

fn answer<S: FlightStore>(
    query: &ShellCommand,
    emulation: &mut TrafficEmulation<S>,
) -> Result<(), CommandError> {
    let reply = query.execute(emulation)?;
    for warning in reply.warnings() {
        eprintln!("Warning: {}", warning);
    }
    println!("{}", reply.render(false)?);
    Ok(())
}

fn log_info(logger: &Option<Logger>, message: &str) {
    if let Some(logger) = logger {
        let _ = logger.info(message, Color::Green, false);
    }
}

fn log_error(logger: &Option<Logger>, message: &str) {
    if let Some(logger) = logger {
        let _ = logger.error(message, false);
    }
}
