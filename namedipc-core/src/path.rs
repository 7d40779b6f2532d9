// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Shared memory path convention.

/// Directory holding every shared memory backing file.
pub const SHARED_MEM_PATH: &str = "/dev/shm/";

/// Build the backing-file path for a segment called `file_name`.
///
/// The returned string is both the filesystem location and the identity of
/// the segment: every process that calls this with the same name maps the
/// same memory.
pub fn shm_path(file_name: &str) -> String {
    format!("{}{}", SHARED_MEM_PATH, file_name)
}
