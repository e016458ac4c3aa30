// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The services this runner knows how to start.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::Error;

pub const COURIER_SERVICE_PATH: &str = "./Couriers/courier.js";
pub const ESTORE_SERVICE_PATH: &str = "./E-stores/estore.js";

/// Configured entry point of a service, as given (usually relative).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    path: PathBuf,
}

impl ServiceDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn courier() -> Self {
        Self::new(COURIER_SERVICE_PATH)
    }

    pub fn estore() -> Self {
        Self::new(ESTORE_SERVICE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves the entry point against `base`, the directory relative paths are anchored to.
    ///
    /// The entry file must exist; the interpreter is not checked here, spawning will report it.
    pub fn resolve(&self, base: &Path) -> Result<ResolvedService, Error> {
        let absolute = normalize(&base.join(&self.path));

        let entry = absolute
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| format!("{} does not name a file", self.path.display()))?;
        let home = absolute
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| format!("{} has no containing directory", self.path.display()))?;

        let metadata = std::fs::metadata(&absolute)?;
        if !metadata.is_file() {
            return Err(format!("{} is not a file", absolute.display()).into());
        }

        Ok(ResolvedService { home, entry })
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A service entry point split into the directory to run in and the file to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedService {
    home: PathBuf,
    entry: OsString,
}

impl ResolvedService {
    /// Absolute directory containing the entry file, used as the child's working directory
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Base name of the entry file, the interpreter's only argument
    pub fn entry(&self) -> &OsStr {
        &self.entry
    }
}

/// Lexically drops `.` and resolves `..`, without touching symlinks.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
