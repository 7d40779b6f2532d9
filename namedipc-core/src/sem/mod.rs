// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Named semaphore IPC module.
//!
//! Kernel-persisted counting semaphores addressable by name from unrelated
//! processes, plus a scope-bound guard for critical sections.

mod lock;
mod semaphore;

pub use lock::{with_lock, ScopedLock};
pub use semaphore::{NamedSemaphore, DEFAULT_SEMAPHORE_MODE};
