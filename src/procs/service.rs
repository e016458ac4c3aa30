// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::process::ExitStatus;

use async_trait::async_trait;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, ChildStderr, ChildStdout};

use crate::procs::ProcessHandle;
use crate::service::ServiceDescriptor;
use crate::Error;

/// A launched service.
///
/// Dropping this does not stop the child, it keeps running in the background.
#[derive(Debug)]
pub struct ServiceProcess {
    descriptor: ServiceDescriptor,
    name: String,
    child: Child,
}

impl ServiceProcess {
    pub(crate) fn new(descriptor: ServiceDescriptor, child: Child) -> Self {
        let name = descriptor.to_string();
        Self {
            descriptor,
            name,
            child,
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// The captured stdout, if it was piped and has not already been taken
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// The captured stderr, if it was piped and has not already been taken
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }
}

#[async_trait]
impl ProcessHandle for ServiceProcess {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<ExitStatus, Error> {
        let status = self.child.wait().await?;
        tracing::debug!("{} exited: {}", self.name, status);
        Ok(status)
    }

    fn terminate(&mut self) -> Result<(), Error> {
        let pid = match self.child.id() {
            Some(pid) => pid,
            // already reaped, nothing left to signal
            None => return Ok(()),
        };

        tracing::debug!("sending SIGTERM to {} ({})", self.name, pid);
        kill(Pid::from_raw(pid as libc::pid_t), Signal::SIGTERM)?;
        Ok(())
    }
}
