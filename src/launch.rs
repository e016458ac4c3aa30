// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::str::FromStr;

use tokio::process::Command;

use crate::console::Console;
use crate::error::LaunchFailure;
use crate::procs::{self, ServiceProcess};
use crate::service::ServiceDescriptor;
use crate::Error;

pub const DEFAULT_INTERPRETER: &str = "node";

pub struct StdIoConf {
    pub stdin: Stdio,
    pub stderr: Stdio,
    pub stdout: Stdio,
}

/// What happens to a service's stdout and stderr
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// Piped to the handle and never read; a chatty child blocks once the pipe fills
    Captured,
    /// Piped and forwarded line by line to the log
    Drain,
    /// Sent to the null device
    Discard,
}

impl OutputMode {
    fn stdio(self) -> StdIoConf {
        match self {
            OutputMode::Captured | OutputMode::Drain => StdIoConf {
                stdin: Stdio::inherit(),
                stderr: Stdio::piped(),
                stdout: Stdio::piped(),
            },
            OutputMode::Discard => StdIoConf {
                stdin: Stdio::inherit(),
                stderr: Stdio::null(),
                stdout: Stdio::null(),
            },
        }
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Captured
    }
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "captured" => Ok(OutputMode::Captured),
            "drain" => Ok(OutputMode::Drain),
            "discard" => Ok(OutputMode::Discard),
            other => Err(format!("unknown output mode: {}", other).into()),
        }
    }
}

/// Starts services under an interpreter.
///
/// Relative service paths are resolved against `base_dir`; the launcher's own working
///  directory is never changed, each child is given its directory at spawn.
#[derive(Clone, Debug)]
pub struct Launcher {
    base_dir: PathBuf,
    interpreter: OsString,
    output: OutputMode,
}

impl Launcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            interpreter: OsString::from(DEFAULT_INTERPRETER),
            output: OutputMode::default(),
        }
    }

    /// Launcher anchored at the current working directory
    pub fn from_current_dir() -> Result<Self, Error> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn interpreter(mut self, interpreter: impl Into<OsString>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Starts the service, reporting the outcome on the console.
    ///
    /// Failures are reported and handed back, they never abort the caller. Must be called from
    ///  within a Tokio runtime.
    pub fn launch<W: Write>(
        &self,
        console: &mut Console<W>,
        descriptor: &ServiceDescriptor,
    ) -> Result<ServiceProcess, LaunchFailure> {
        match self.spawn(descriptor) {
            Ok(process) => {
                console.started(descriptor);
                Ok(process)
            }
            Err(e) => {
                let failure = LaunchFailure::new(descriptor.clone(), e);
                console.failed(&failure);
                Err(failure)
            }
        }
    }

    fn spawn(&self, descriptor: &ServiceDescriptor) -> Result<ServiceProcess, Error> {
        let resolved = descriptor.resolve(&self.base_dir)?;
        let stdio = self.output.stdio();

        let child = Command::new(&self.interpreter)
            .arg(resolved.entry())
            .current_dir(resolved.home())
            .stdin(stdio.stdin)
            .stdout(stdio.stdout)
            .stderr(stdio.stderr)
            .spawn()?;

        tracing::debug!(
            "started {} in {} (pid {:?})",
            descriptor,
            resolved.home().display(),
            child.id()
        );

        let mut process = ServiceProcess::new(descriptor.clone(), child);
        if self.output == OutputMode::Drain {
            procs::drain_output(&mut process);
        }

        Ok(process)
    }
}
