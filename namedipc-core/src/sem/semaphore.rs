// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! NamedSemaphore - POSIX named counting semaphore.
//!
//! Named semaphores persist in the kernel independently of any process. A
//! process that posts and then dies before the matching wait leaves a count
//! every later attacher inherits, so opening validates the observed count
//! and recreates the semaphore when it is out of bounds.

use std::ffi::{CStr, CString};
use std::ptr::NonNull;

use nix::errno::Errno;

use crate::error::{
    check_status, IpcError, IpcResult, OsError, ResourceKind, StaleSemaphoreState,
};
use crate::sem::ScopedLock;

/// Permission bits for newly created semaphores (owner read/write, others read).
pub const DEFAULT_SEMAPHORE_MODE: u32 = 0o644;

/// Owns one handle to a named, kernel-persisted counting semaphore.
///
/// Dropping the handle destroys it: a final post, then unlink and close.
/// The default value is the invalid state.
#[derive(Debug, Default)]
pub struct NamedSemaphore {
    /// Name in the global semaphore namespace.
    name: String,
    /// Open handle, `None` once destroyed or moved out.
    handle: Option<NonNull<libc::sem_t>>,
}

// SAFETY: sem_wait/sem_post/sem_getvalue are thread-safe on a shared handle;
// the only mutation of the handle itself (destroy) requires `&mut self`.
unsafe impl Send for NamedSemaphore {}

// SAFETY: see above.
unsafe impl Sync for NamedSemaphore {}

impl NamedSemaphore {
    /// Create the semaphore `name` with `initial_value`, or attach to it if a
    /// cooperating process created it first.
    ///
    /// An attached semaphore whose count lies outside `[0, initial_value]` is
    /// treated as stale: a warning is logged and the semaphore is unlinked
    /// and recreated with `initial_value`.
    ///
    /// # Errors
    /// `ResourceCreation` if the create, attach or recreate fails,
    /// `ResourceAccess` if the count cannot be read.
    pub fn open_or_create(name: impl Into<String>, initial_value: u32) -> IpcResult<Self> {
        Self::open_or_create_with_mode(name, initial_value, DEFAULT_SEMAPHORE_MODE)
    }

    /// Same as [`open_or_create`](Self::open_or_create) with explicit
    /// permission bits for a newly created semaphore.
    pub fn open_or_create_with_mode(
        name: impl Into<String>,
        initial_value: u32,
        mode: u32,
    ) -> IpcResult<Self> {
        let name = name.into();
        let c_name = CString::new(name.as_str())
            .map_err(|_| Self::creation_failed(&name, OsError::new("sem_open", Errno::EINVAL)))?;

        let handle = match create_exclusive(&c_name, initial_value, mode) {
            Ok(handle) => {
                tracing::debug!(name = %name, initial_value, "Created semaphore");
                handle
            }
            Err(err) if err.errno == Errno::EEXIST => {
                let handle = attach(&c_name).map_err(|e| Self::creation_failed(&name, e))?;
                tracing::debug!(name = %name, "Attached to existing semaphore");
                handle
            }
            Err(err) => return Err(Self::creation_failed(&name, err)),
        };

        let observed = match get_value(handle) {
            Ok(value) => value,
            Err(source) => {
                // SAFETY: handle came from sem_open above and is not shared
                unsafe { libc::sem_close(handle.as_ptr()) };
                return Err(IpcError::ResourceAccess {
                    kind: ResourceKind::Semaphore,
                    name,
                    source,
                });
            }
        };

        let handle = match StaleSemaphoreState::check(&name, observed, initial_value) {
            None => handle,
            Some(stale) => {
                tracing::warn!(
                    name = %name,
                    observed = stale.observed,
                    initial_value,
                    "Resetting semaphore: {}",
                    stale
                );
                // SAFETY: handle came from sem_open above and is not shared
                unsafe {
                    libc::sem_close(handle.as_ptr());
                    libc::sem_unlink(c_name.as_ptr());
                }
                create_exclusive(&c_name, initial_value, mode)
                    .map_err(|e| Self::creation_failed(&name, e))?
            }
        };

        Ok(Self {
            name,
            handle: Some(handle),
        })
    }

    /// Name of the semaphore in the global namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this object still owns an open handle.
    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// P operation: block until the count is positive, then decrement it.
    ///
    /// Retries transparently when interrupted by a signal.
    pub fn wait(&self) -> IpcResult<()> {
        let handle = self.handle()?;
        loop {
            // SAFETY: handle is open for as long as self owns it
            match check_status(unsafe { libc::sem_wait(handle.as_ptr()) }, "sem_wait") {
                Ok(()) => return Ok(()),
                Err(source) if source.errno == Errno::EINTR => continue,
                Err(source) => return Err(self.operation_failed(source)),
            }
        }
    }

    /// V operation: increment the count, waking at most one waiter.
    pub fn post(&self) -> IpcResult<()> {
        let handle = self.handle()?;
        // SAFETY: handle is open for as long as self owns it
        check_status(unsafe { libc::sem_post(handle.as_ptr()) }, "sem_post")
            .map_err(|source| self.operation_failed(source))
    }

    /// Current count as reported by the OS.
    pub fn value(&self) -> IpcResult<i32> {
        let handle = self.handle()?;
        get_value(handle).map_err(|source| IpcError::ResourceAccess {
            kind: ResourceKind::Semaphore,
            name: self.name.clone(),
            source,
        })
    }

    /// Block until acquired and return a guard that posts on drop.
    pub fn lock(&self) -> IpcResult<ScopedLock<'_>> {
        ScopedLock::acquire(self)
    }

    /// Move the owned handle out, leaving `self` invalid with an empty name.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Post once, unlink the name and close the handle.
    ///
    /// The final post releases any process still blocked on a semaphore that
    /// is about to vanish. Idempotent; teardown failures are ignored because
    /// another owner may already have unlinked the name.
    pub fn destroy(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // SAFETY: handle was open until taken above and is closed exactly once
        unsafe {
            libc::sem_post(handle.as_ptr());
            if let Ok(c_name) = CString::new(self.name.as_str()) {
                libc::sem_unlink(c_name.as_ptr());
            }
            libc::sem_close(handle.as_ptr());
        }

        tracing::debug!(name = %self.name, "Destroyed semaphore");
    }

    fn handle(&self) -> IpcResult<NonNull<libc::sem_t>> {
        self.handle.ok_or_else(|| IpcError::Released {
            kind: ResourceKind::Semaphore,
            name: self.name.clone(),
        })
    }

    fn operation_failed(&self, source: OsError) -> IpcError {
        IpcError::Operation {
            name: self.name.clone(),
            source,
        }
    }

    fn creation_failed(name: &str, source: OsError) -> IpcError {
        IpcError::ResourceCreation {
            kind: ResourceKind::Semaphore,
            name: name.to_string(),
            source,
        }
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn create_exclusive(
    c_name: &CStr,
    initial_value: u32,
    mode: u32,
) -> Result<NonNull<libc::sem_t>, OsError> {
    // SAFETY: c_name is a valid NUL-terminated string; mode and value are
    // passed as the unsigned ints sem_open reads for O_CREAT
    let sem = unsafe {
        libc::sem_open(
            c_name.as_ptr(),
            libc::O_CREAT | libc::O_EXCL,
            mode as libc::c_uint,
            initial_value as libc::c_uint,
        )
    };
    checked_handle(sem)
}

fn attach(c_name: &CStr) -> Result<NonNull<libc::sem_t>, OsError> {
    // SAFETY: c_name is a valid NUL-terminated string; no O_CREAT, so no
    // variadic arguments are read
    let sem = unsafe { libc::sem_open(c_name.as_ptr(), 0) };
    checked_handle(sem)
}

fn checked_handle(sem: *mut libc::sem_t) -> Result<NonNull<libc::sem_t>, OsError> {
    if sem == libc::SEM_FAILED {
        return Err(OsError::last("sem_open"));
    }
    NonNull::new(sem).ok_or_else(|| OsError::new("sem_open", Errno::EFAULT))
}

fn get_value(handle: NonNull<libc::sem_t>) -> Result<i32, OsError> {
    let mut value: libc::c_int = 0;
    // SAFETY: handle is an open semaphore, value is a valid out pointer
    check_status(
        unsafe { libc::sem_getvalue(handle.as_ptr(), &mut value) },
        "sem_getvalue",
    )?;
    Ok(value)
}
