// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Starts the courier and e-store dummy services and keeps them running

pub mod console;
mod error;
pub mod launch;
pub mod procs;
pub mod runner;
pub mod service;

pub use console::Console;
pub use error::{Error, ErrorKind, LaunchFailure};
pub use launch::{Launcher, OutputMode};
pub use procs::{ProcessHandle, ServiceProcess, WaitMode};
pub use runner::{run, run_services, RunOutcome};
pub use service::ServiceDescriptor;
