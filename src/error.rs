// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;

use thiserror::Error;

use crate::service::ServiceDescriptor;

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    NixError(#[from] nix::Error),
    #[error("{0}")]
    ErrorMsg(String),
    #[error("{0}")]
    ErrorStr(&'static str),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

impl<E> From<E> for Error
where
    E: Into<ErrorKind>,
{
    fn from(err: E) -> Self {
        Self::from_kind(err.into())
    }
}

impl From<&'static str> for Error {
    fn from(err: &'static str) -> Self {
        Self::from_kind(ErrorKind::ErrorStr(err))
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Self::from_kind(ErrorKind::ErrorMsg(err))
    }
}

/// A service that could not be started.
///
/// The display form is the line reported to the user.
#[derive(Error, Debug)]
#[error("Error starting service {descriptor}: {error}")]
pub struct LaunchFailure {
    descriptor: ServiceDescriptor,
    #[source]
    error: Error,
}

impl LaunchFailure {
    pub fn new(descriptor: ServiceDescriptor, error: impl Into<Error>) -> Self {
        Self {
            descriptor,
            error: error.into(),
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn error(&self) -> &Error {
        &self.error
    }
}
