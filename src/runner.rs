// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::future::Future;
use std::io::Write;
use std::process::ExitStatus;

use crate::console::Console;
use crate::error::LaunchFailure;
use crate::launch::Launcher;
use crate::procs::{self, ServiceProcess, Supervision, WaitMode};
use crate::service::ServiceDescriptor;
use crate::Error;

/// What a run ended with
#[derive(Debug)]
pub enum RunOutcome {
    /// Both services ran and exited on their own
    Completed {
        courier: ExitStatus,
        estore: ExitStatus,
    },
    /// Interrupted during the wait phase, both services were asked to terminate
    Interrupted,
    /// At least one service failed to launch, nothing was waited on
    ///
    /// `running` holds the services that did start, dropping them leaves them running.
    Incomplete {
        running: Vec<ServiceProcess>,
        failures: Vec<LaunchFailure>,
    },
}

/// Starts the courier then the e-store service and supervises both until they exit or
///  `interrupt` completes.
pub async fn run<W, I>(
    launcher: &Launcher,
    console: &mut Console<W>,
    mode: WaitMode,
    interrupt: I,
) -> Result<RunOutcome, Error>
where
    W: Write,
    I: Future<Output = ()>,
{
    run_services(
        launcher,
        console,
        &ServiceDescriptor::courier(),
        &ServiceDescriptor::estore(),
        mode,
        interrupt,
    )
    .await
}

/// As [`run`], with the two services given explicitly, launched in the order given
pub async fn run_services<W, I>(
    launcher: &Launcher,
    console: &mut Console<W>,
    courier: &ServiceDescriptor,
    estore: &ServiceDescriptor,
    mode: WaitMode,
    interrupt: I,
) -> Result<RunOutcome, Error>
where
    W: Write,
    I: Future<Output = ()>,
{
    let courier = launcher.launch(console, courier);
    let estore = launcher.launch(console, estore);

    let (mut courier, mut estore) = match (courier, estore) {
        (Ok(courier), Ok(estore)) => (courier, estore),
        (courier, estore) => {
            let mut running = Vec::new();
            let mut failures = Vec::new();
            for launched in [courier, estore] {
                match launched {
                    Ok(process) => running.push(process),
                    Err(failure) => failures.push(failure),
                }
            }

            for process in &running {
                tracing::info!(
                    "{} left running in the background (pid {:?})",
                    process.descriptor(),
                    procs::ProcessHandle::id(process)
                );
            }

            return Ok(RunOutcome::Incomplete { running, failures });
        }
    };

    let supervision = procs::supervise(console, &mut courier, &mut estore, mode, interrupt).await?;

    Ok(match supervision {
        Supervision::Exited { first, second } => RunOutcome::Completed {
            courier: first,
            estore: second,
        },
        Supervision::Interrupted => RunOutcome::Interrupted,
    })
}
