// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::future::Future;
use std::io::Write;
use std::process::ExitStatus;
use std::str::FromStr;

use futures::future::try_join;

use crate::console::Console;
use crate::procs::ProcessHandle;
use crate::Error;

/// How the two children are awaited
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitMode {
    /// First to exit, then second; the second's exit is not observed while blocked on the first
    Sequential,
    /// Both at once, finishes when both have exited
    Concurrent,
}

impl Default for WaitMode {
    fn default() -> Self {
        WaitMode::Sequential
    }
}

impl FromStr for WaitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(WaitMode::Sequential),
            "concurrent" => Ok(WaitMode::Concurrent),
            other => Err(format!("unknown wait mode: {}", other).into()),
        }
    }
}

/// How the wait phase ended
#[derive(Debug, PartialEq, Eq)]
pub enum Supervision {
    /// Both children exited on their own
    Exited { first: ExitStatus, second: ExitStatus },
    /// The interrupt fired first, both children were asked to terminate
    Interrupted,
}

/// Monitor two launched processes
///
/// Rules:
///   - waits on both children in the order given (or together, see [`WaitMode`])
///   - on `interrupt`, prints the shutdown notice and requests termination of each child exactly once
///   - never escalates, and never waits for the terminated children
pub async fn supervise<A, B, I, W>(
    console: &mut Console<W>,
    first: &mut A,
    second: &mut B,
    mode: WaitMode,
    interrupt: I,
) -> Result<Supervision, Error>
where
    A: ProcessHandle,
    B: ProcessHandle,
    I: Future<Output = ()>,
    W: Write,
{
    let exited = {
        let waits = wait_for_both(&mut *first, &mut *second, mode);
        tokio::pin!(waits);
        tokio::pin!(interrupt);

        tokio::select! {
            statuses = &mut waits => Some(statuses?),
            _ = &mut interrupt => None,
        }
    };

    if let Some((first, second)) = exited {
        return Ok(Supervision::Exited { first, second });
    }

    console.shutting_down();
    terminate(first);
    terminate(second);

    Ok(Supervision::Interrupted)
}

/// Best effort, a failure is only logged
fn terminate<P: ProcessHandle>(handle: &mut P) {
    if let Err(e) = handle.terminate() {
        tracing::warn!("failed to terminate {}: {}", handle.name(), e);
    }
}

async fn wait_for_both<A, B>(
    first: &mut A,
    second: &mut B,
    mode: WaitMode,
) -> Result<(ExitStatus, ExitStatus), Error>
where
    A: ProcessHandle,
    B: ProcessHandle,
{
    match mode {
        WaitMode::Sequential => {
            let first = first.wait().await?;
            let second = second.wait().await?;
            Ok((first, second))
        }
        WaitMode::Concurrent => try_join(first.wait(), second.wait()).await,
    }
}
