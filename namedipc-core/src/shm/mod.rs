// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Shared Memory IPC module.
//!
//! File-backed shared memory mapped into every process that opens the same
//! path. The byte layout is left entirely to the caller.

mod segment;

pub use segment::{SharedMemorySegment, DEFAULT_SEGMENT_MODE};
