// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::{self, Stdout, Write};

use crate::error::LaunchFailure;
use crate::service::ServiceDescriptor;

/// Plain-text status lines for the person running the services.
pub struct Console<W: Write = Stdout> {
    output: W,
}

impl<W: Write> Console<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn started(&mut self, descriptor: &ServiceDescriptor) {
        self.line(format_args!("Started service: {}", descriptor));
    }

    pub fn failed(&mut self, failure: &LaunchFailure) {
        self.line(format_args!("{}", failure));
    }

    pub fn shutting_down(&mut self) {
        self.line(format_args!("\nShutting down services..."));
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        // a closed stdout must not take the services down with it
        if let Err(e) = writeln!(self.output, "{}", args).and_then(|_| self.output.flush()) {
            tracing::debug!("failed to write status line: {}", e);
        }
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}
