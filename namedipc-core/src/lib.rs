// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Named IPC Core Library
//!
//! Host-local, name-addressed interprocess primitives that outlive the
//! processes using them: file-backed shared memory segments, POSIX named
//! counting semaphores with stale-state recovery, and a scope-bound lock.

pub mod config;
pub mod error;
pub mod path;
pub mod sem;
pub mod shm;

// Re-export commonly used types
pub use config::{ConfigLoader, IpcConfig};
pub use error::{check_errno, IpcError, IpcResult, OsError, ResourceKind};
pub use path::{shm_path, SHARED_MEM_PATH};
pub use sem::{with_lock, NamedSemaphore, ScopedLock};
pub use shm::SharedMemorySegment;
