// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Named IPC Benchmarking Helpers
//!
//! Fixtures shared by the criterion benches. Every resource gets a name
//! unique to the benchmark process so parallel runs never collide in the
//! host-global namespaces.

use std::path::PathBuf;

use tempfile::TempDir;

/// Semaphore name unique to this process and `tag`.
pub fn unique_sem_name(tag: &str) -> String {
    format!("/namedipc_bench_{}_{}", tag, std::process::id())
}

/// A private directory for segment backing files, removed on drop.
pub struct SegmentDir {
    dir: TempDir,
}

impl SegmentDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("namedipc-bench").tempdir()?,
        })
    }

    /// Backing-file path for `file_name` inside the directory.
    pub fn path(&self, file_name: &str) -> String {
        let path: PathBuf = self.dir.path().join(file_name);
        path.to_string_lossy().into_owned()
    }
}
