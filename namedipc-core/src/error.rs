// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Error types for named IPC resources.
//!
//! Every fallible boundary returns a strongly typed enum - no `Box<dyn Error>`,
//! no `anyhow::Result`. Raw OS failures are first captured as [`OsError`] and
//! then wrapped with the resource they concern.

use std::fmt;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// The kind of OS resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    SharedMemory,
    Semaphore,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::SharedMemory => write!(f, "shared memory segment"),
            ResourceKind::Semaphore => write!(f, "semaphore"),
        }
    }
}

/// A failed system call: the operation name plus the errno it reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{operation} failed: {}", .errno.desc())]
pub struct OsError {
    pub operation: &'static str,
    pub errno: Errno,
}

impl OsError {
    pub fn new(operation: &'static str, errno: Errno) -> Self {
        Self { operation, errno }
    }

    /// Capture the calling thread's current errno for `operation`.
    pub fn last(operation: &'static str) -> Self {
        Self::new(operation, Errno::last())
    }
}

/// Translate a raw OS error code into an [`OsError`].
///
/// A zero code means success and produces no failure.
pub fn check_errno(code: i32, operation: &'static str) -> Result<(), OsError> {
    if code == 0 {
        return Ok(());
    }
    Err(OsError::new(operation, Errno::from_raw(code)))
}

/// Check the return value of a call that reports failure as `-1` + errno.
pub(crate) fn check_status(ret: libc::c_int, operation: &'static str) -> Result<(), OsError> {
    if ret == 0 {
        return Ok(());
    }
    check_errno(Errno::last_raw(), operation)?;
    // Failed without setting errno
    Err(OsError::new(operation, Errno::UnknownErrno))
}

/// Top-level error type for shared memory and semaphore handles.
#[derive(Debug, Error)]
pub enum IpcError {
    // =========================================================================
    // Resource Lifecycle Errors
    // =========================================================================
    #[error("Failed to create {kind} '{name}': {source}")]
    ResourceCreation {
        kind: ResourceKind,
        name: String,
        #[source]
        source: OsError,
    },

    #[error("Failed to access {kind} '{name}': {source}")]
    ResourceAccess {
        kind: ResourceKind,
        name: String,
        #[source]
        source: OsError,
    },

    #[error("Semaphore operation on '{name}' failed: {source}")]
    Operation {
        name: String,
        #[source]
        source: OsError,
    },

    #[error("{kind} '{name}' has already been released")]
    Released { kind: ResourceKind, name: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration: {field} = {value} - {reason}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// A semaphore count outside `[0, max]`, left behind by a previous owner
/// that died between a post and its matching wait.
///
/// Recovered from automatically; only ever rendered into a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("semaphore '{name}' has stale count {observed} (expected 0..={max})")]
pub(crate) struct StaleSemaphoreState {
    pub name: String,
    pub observed: i32,
    pub max: u32,
}

impl StaleSemaphoreState {
    /// Returns the stale state if `observed` falls outside `[0, max]`.
    pub fn check(name: &str, observed: i32, max: u32) -> Option<Self> {
        let in_bounds = observed >= 0 && (observed as u32) <= max;
        if in_bounds {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            observed,
            max,
        })
    }
}

/// Result type alias using IpcError.
pub type IpcResult<T> = Result<T, IpcError>;
