// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::ffi::OsString;

use clap::{Arg, ArgMatches, Command};
use tokio::runtime;
use tracing_subscriber::EnvFilter;

use dummy_services_runner::launch::DEFAULT_INTERPRETER;
use dummy_services_runner::{
    run, Console, Error, Launcher, OutputMode, RunOutcome, WaitMode,
};

const INTERPRETER: &str = "interpreter";
const OUTPUT: &str = "output";
const WAIT: &str = "wait";
const LOG_LEVEL: &str = "log-level";

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new(INTERPRETER)
                .long(INTERPRETER)
                .value_name("PROGRAM")
                .value_parser(clap::value_parser!(OsString))
                .default_value(DEFAULT_INTERPRETER)
                .help("runtime used to run each service entry file"),
        )
        .arg(
            Arg::new(OUTPUT)
                .long(OUTPUT)
                .value_name("MODE")
                .value_parser(["captured", "drain", "discard"])
                .default_value("captured")
                .help("what to do with the services' stdout and stderr"),
        )
        .arg(
            Arg::new(WAIT)
                .long(WAIT)
                .value_name("MODE")
                .value_parser(["sequential", "concurrent"])
                .default_value("sequential")
                .help("wait on the courier then the e-store, or on both at once"),
        )
        .arg(
            Arg::new(LOG_LEVEL)
                .long(LOG_LEVEL)
                .value_name("LEVEL")
                .default_value("warn")
                .help("diagnostic log level (trace, debug, info, warn, error), RUST_LOG takes precedence"),
        )
}

fn main() -> Result<(), Error> {
    let args = cli().get_matches();

    init_tracing(string_arg(&args, LOG_LEVEL)?);

    let output: OutputMode = string_arg(&args, OUTPUT)?.parse()?;
    let mode: WaitMode = string_arg(&args, WAIT)?.parse()?;
    let interpreter = args
        .get_one::<OsString>(INTERPRETER)
        .cloned()
        .ok_or("interpreter not specified")?;

    let runtime = runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(async move {
        let launcher = Launcher::from_current_dir()?
            .interpreter(interpreter)
            .output(output);
        let mut console = Console::stdout();

        match run(&launcher, &mut console, mode, interrupted()).await? {
            RunOutcome::Completed { courier, estore } => {
                tracing::info!("services exited, courier: {}, estore: {}", courier, estore);
            }
            RunOutcome::Interrupted => tracing::info!("services asked to terminate"),
            RunOutcome::Incomplete { running, failures } => {
                tracing::info!(
                    "{} service(s) failed to start, {} left running",
                    failures.len(),
                    running.len()
                );
            }
        }

        Ok::<(), Error>(())
    })
}

fn string_arg<'a>(args: &'a ArgMatches, id: &'static str) -> Result<&'a str, Error> {
    args.get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| Error::from(format!("{} not specified", id)))
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dummy_services_runner={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Completes on Ctrl-C; if the handler cannot be installed, never completes
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("unable to listen for Ctrl-C: {}", e);
        futures::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = cli().get_matches_from(vec!["dummy-services-runner"]);

        assert_eq!(
            args.get_one::<OsString>(INTERPRETER),
            Some(&OsString::from("node"))
        );
        assert_eq!(string_arg(&args, OUTPUT).unwrap(), "captured");
        assert_eq!(string_arg(&args, WAIT).unwrap(), "sequential");
        assert_eq!(string_arg(&args, LOG_LEVEL).unwrap(), "warn");
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let result = cli().try_get_matches_from(vec!["dummy-services-runner", "--wait", "parallel"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verifies() {
        cli().debug_assert();
    }
}
