// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod logger;
mod service;
mod supervisor;

pub use logger::drain_output;
pub use service::ServiceProcess;
pub use supervisor::{supervise, Supervision, WaitMode};

use std::process::ExitStatus;

use async_trait::async_trait;

use crate::Error;

/// Ownership of a running child, as seen by the supervisor
///
/// Implemented by [`ServiceProcess`] for real children; tests provide their own to observe
///  the order of waits and terminations.
#[async_trait]
pub trait ProcessHandle: Send {
    /// The configured path the process was launched from, for diagnostics
    fn name(&self) -> &str;

    /// OS process id, `None` once the child has been reaped
    fn id(&self) -> Option<u32>;

    /// Blocks until the child exits
    async fn wait(&mut self) -> Result<ExitStatus, Error>;

    /// Requests that the child stop, does not wait for it to do so
    fn terminate(&mut self) -> Result<(), Error>;
}
