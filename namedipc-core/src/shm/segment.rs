// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! SharedMemorySegment - file-backed shared memory wrapper.
//!
//! Opens (or creates) a backing file, sizes it and maps it shared read/write.
//! Any process mapping the same path sees the same bytes.

use std::os::unix::io::RawFd;
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, unlink};

use crate::error::{check_status, IpcError, IpcResult, OsError, ResourceKind};

/// Permission bits for newly created backing files (world read/write).
pub const DEFAULT_SEGMENT_MODE: u32 = 0o666;

/// Owns one mapped, file-backed shared memory region.
///
/// The mapping pointer is present if and only if the descriptor is open;
/// both are released together by [`SharedMemorySegment::destroy`], which
/// also runs on drop. The default value is the empty state.
#[derive(Debug)]
pub struct SharedMemorySegment {
    /// Backing file path; also the identity of the segment.
    path: String,
    /// Size of the mapped region in bytes.
    size: usize,
    /// Descriptor of the backing file, `-1` when released.
    fd: RawFd,
    /// Start of the mapping, `None` when released.
    ptr: Option<NonNull<u8>>,
}

// SAFETY: the segment exclusively owns its descriptor and mapping; the
// mapped bytes are plain memory whose synchronization is the caller's job.
unsafe impl Send for SharedMemorySegment {}

// SAFETY: shared references only expose the raw pointer and accessors.
unsafe impl Sync for SharedMemorySegment {}

impl Default for SharedMemorySegment {
    fn default() -> Self {
        Self {
            path: String::new(),
            size: 0,
            fd: -1,
            ptr: None,
        }
    }
}

impl SharedMemorySegment {
    /// Open or create the backing file at `path`, size it to exactly `size`
    /// bytes and map it shared read/write.
    ///
    /// # Errors
    /// `ResourceCreation` if open or truncate fails, `ResourceAccess` if the
    /// mapping fails. The descriptor is closed on every failure path.
    pub fn create(path: impl Into<String>, size: usize) -> IpcResult<Self> {
        Self::create_with_mode(path, size, DEFAULT_SEGMENT_MODE)
    }

    /// Same as [`create`](Self::create) with explicit permission bits for a
    /// newly created backing file.
    pub fn create_with_mode(path: impl Into<String>, size: usize, mode: u32) -> IpcResult<Self> {
        let path = path.into();

        let creation_failed = |source: OsError| IpcError::ResourceCreation {
            kind: ResourceKind::SharedMemory,
            name: path.clone(),
            source,
        };

        // Interior NUL bytes are rejected by nix with EINVAL
        let fd = open(
            path.as_str(),
            OFlag::O_CREAT | OFlag::O_RDWR,
            Mode::from_bits_truncate(mode as libc::mode_t),
        )
        .map_err(|errno| creation_failed(OsError::new("open", errno)))?;

        let len = match libc::off_t::try_from(size) {
            Ok(len) => len,
            Err(_) => {
                let _ = close(fd);
                return Err(creation_failed(OsError::new("ftruncate", Errno::EFBIG)));
            }
        };

        // SAFETY: fd was opened above and is still owned here
        if let Err(source) = check_status(unsafe { libc::ftruncate(fd, len) }, "ftruncate") {
            let _ = close(fd);
            return Err(creation_failed(source));
        }

        // SAFETY: fd is valid and sized to `size` bytes, offset 0 is valid
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                fd,
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            let source = OsError::last("mmap");
            let _ = close(fd);
            return Err(IpcError::ResourceAccess {
                kind: ResourceKind::SharedMemory,
                name: path,
                source,
            });
        }

        let Some(ptr) = NonNull::new(ptr as *mut u8) else {
            let _ = close(fd);
            return Err(IpcError::ResourceAccess {
                kind: ResourceKind::SharedMemory,
                name: path,
                source: OsError::new("mmap", Errno::EFAULT),
            });
        };

        tracing::debug!(path = %path, size = size, "Mapped shared memory segment");

        Ok(Self {
            path,
            size,
            fd,
            ptr: Some(ptr),
        })
    }

    /// Address of the mapping, or null once released.
    ///
    /// Only valid while this handle is alive and not destroyed.
    pub fn get(&self) -> *mut u8 {
        self.ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    /// Size of the mapped region in bytes (zero once released).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Path of the backing file (empty once released).
    pub fn file_path(&self) -> &str {
        &self.path
    }

    /// Whether this handle currently owns a mapping.
    pub fn is_mapped(&self) -> bool {
        self.ptr.is_some()
    }

    /// View the mapped bytes.
    ///
    /// # Safety
    /// Other handles (in this or another process) may write the same memory;
    /// the caller must rule out concurrent writes for the borrow's lifetime.
    pub unsafe fn as_slice(&self) -> &[u8] {
        match self.ptr {
            Some(ptr) => std::slice::from_raw_parts(ptr.as_ptr(), self.size),
            None => &[],
        }
    }

    /// Mutable view of the mapped bytes.
    ///
    /// # Safety
    /// The caller must ensure exclusive access to the region for the
    /// borrow's lifetime, across every process mapping it.
    pub unsafe fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.ptr {
            Some(ptr) => std::slice::from_raw_parts_mut(ptr.as_ptr(), self.size),
            None => &mut [],
        }
    }

    /// Move the owned resource out, leaving `self` in the empty state.
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Unlink the backing file, unmap the memory and close the descriptor.
    ///
    /// Idempotent: every step is skipped once done, and teardown failures
    /// are swallowed since a concurrent owner may already have removed the
    /// file.
    pub fn destroy(&mut self) {
        if !self.path.is_empty() {
            match unlink(self.path.as_str()) {
                Ok(()) | Err(Errno::ENOENT) => {}
                Err(errno) => {
                    tracing::debug!(path = %self.path, error = %errno, "Ignoring unlink failure");
                }
            }
            tracing::debug!(path = %self.path, "Released shared memory segment");
            self.path.clear();
        }

        if let Some(ptr) = self.ptr.take() {
            // SAFETY: ptr and size describe the mapping created in create_with_mode
            unsafe { libc::munmap(ptr.as_ptr() as *mut libc::c_void, self.size) };
        }

        if self.fd >= 0 {
            let _ = close(self.fd);
            self.fd = -1;
        }

        self.size = 0;
    }
}

impl Drop for SharedMemorySegment {
    fn drop(&mut self) {
        self.destroy();
    }
}
