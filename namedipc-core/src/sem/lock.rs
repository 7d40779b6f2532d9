// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scope-bound mutual exclusion on top of a [`NamedSemaphore`].

use std::marker::PhantomData;

use crate::error::IpcResult;
use crate::sem::NamedSemaphore;

/// Holds one unit of a [`NamedSemaphore`] until dropped or released.
///
/// The guard borrows the semaphore, so it cannot outlive it, and it is
/// `!Send`, so the hold cannot be handed to another thread. Release posts
/// at most once per acquisition no matter how many release paths run.
#[derive(Debug)]
pub struct ScopedLock<'a> {
    sem: &'a NamedSemaphore,
    locked: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopedLock<'a> {
    /// Block on `sem` until acquired.
    ///
    /// If the wait fails the error is returned and nothing is held.
    pub fn acquire(sem: &'a NamedSemaphore) -> IpcResult<Self> {
        sem.wait()?;
        Ok(Self {
            sem,
            locked: true,
            _not_send: PhantomData,
        })
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Release early. A second call, and the eventual drop, do nothing.
    pub fn release(&mut self) -> IpcResult<()> {
        if !self.locked {
            return Ok(());
        }
        self.locked = false;
        self.sem.post()
    }
}

impl Drop for ScopedLock<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::error!(name = %self.sem.name(), error = %e, "Failed to release scoped lock");
        }
    }
}

/// Run `f` while holding `sem`, releasing on return or unwind.
///
/// Unlike [`ScopedLock::acquire`] or [`NamedSemaphore::lock`], this form
/// never hands the guard to the caller.
pub fn with_lock<T>(sem: &NamedSemaphore, f: impl FnOnce() -> T) -> IpcResult<T> {
    let mut guard = ScopedLock::acquire(sem)?;
    let result = f();
    guard.release()?;
    Ok(result)
}
