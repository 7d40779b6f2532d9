// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration for resource locations and permissions.
//!
//! Every field is optional and falls back to the conventions in
//! [`crate::path`], [`crate::shm`] and [`crate::sem`]. Invalid values fail
//! validation at load time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IpcError, IpcResult};
use crate::path::SHARED_MEM_PATH;
use crate::sem::{NamedSemaphore, DEFAULT_SEMAPHORE_MODE};
use crate::shm::{SharedMemorySegment, DEFAULT_SEGMENT_MODE};

/// Highest permission value accepted for any mode field.
const MAX_MODE: u32 = 0o777;

/// Raw configuration as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIpcConfig {
    #[serde(default = "default_shm_dir")]
    shm_dir: String,
    #[serde(default = "default_segment_mode")]
    segment_mode: u32,
    #[serde(default = "default_semaphore_mode")]
    semaphore_mode: u32,
}

fn default_shm_dir() -> String {
    SHARED_MEM_PATH.to_string()
}

fn default_segment_mode() -> u32 {
    DEFAULT_SEGMENT_MODE
}

fn default_semaphore_mode() -> u32 {
    DEFAULT_SEMAPHORE_MODE
}

/// Validated IPC configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpcConfig {
    /// Directory holding shared memory backing files.
    pub shm_dir: PathBuf,
    /// Permission bits for newly created backing files.
    pub segment_mode: u32,
    /// Permission bits for newly created semaphores.
    pub semaphore_mode: u32,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            shm_dir: PathBuf::from(SHARED_MEM_PATH),
            segment_mode: DEFAULT_SEGMENT_MODE,
            semaphore_mode: DEFAULT_SEMAPHORE_MODE,
        }
    }
}

impl IpcConfig {
    /// Backing-file path for the segment called `file_name`.
    pub fn segment_path(&self, file_name: &str) -> PathBuf {
        self.shm_dir.join(file_name)
    }

    /// Create or attach the segment `file_name` under the configured directory.
    pub fn create_segment(&self, file_name: &str, size: usize) -> IpcResult<SharedMemorySegment> {
        let path = self.segment_path(file_name);
        SharedMemorySegment::create_with_mode(
            path.to_string_lossy().into_owned(),
            size,
            self.segment_mode,
        )
    }

    /// Create or attach the semaphore `name` with the configured mode.
    pub fn open_semaphore(&self, name: &str, initial_value: u32) -> IpcResult<NamedSemaphore> {
        NamedSemaphore::open_or_create_with_mode(name, initial_value, self.semaphore_mode)
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> IpcResult<IpcConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(IpcError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| IpcError::ConfigParse {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        Self::load_str(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_str(content: &str) -> IpcResult<IpcConfig> {
        let raw: RawIpcConfig = serde_yaml::from_str(content).map_err(|e| IpcError::ConfigParse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawIpcConfig) -> IpcResult<IpcConfig> {
        let shm_dir = PathBuf::from(&raw.shm_dir);
        if !shm_dir.is_absolute() {
            return Err(IpcError::InvalidConfig {
                field: "shm_dir",
                value: raw.shm_dir,
                reason: "Must be an absolute path".to_string(),
            });
        }

        Self::validate_mode("segment_mode", raw.segment_mode)?;
        Self::validate_mode("semaphore_mode", raw.semaphore_mode)?;

        Ok(IpcConfig {
            shm_dir,
            segment_mode: raw.segment_mode,
            semaphore_mode: raw.semaphore_mode,
        })
    }

    fn validate_mode(field: &'static str, mode: u32) -> IpcResult<()> {
        if mode > MAX_MODE {
            return Err(IpcError::InvalidConfig {
                field,
                value: format!("{:#o}", mode),
                reason: format!("Must not exceed {:#o}", MAX_MODE),
            });
        }
        Ok(())
    }
}
