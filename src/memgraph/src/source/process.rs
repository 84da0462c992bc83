//! Current Process Memory Source
//!
//! Reads this process's own address space through the OS's remote-read
//! primitive, so unmapped or protected addresses fail cleanly instead of
//! faulting.

use super::{heap, parse_maps, MappedRange, MemorySource};

use anyhow::{Context, Result};
#[cfg(not(target_os = "linux"))]
use process_memory::{CopyAddress, ProcessHandle, TryIntoProcessHandle};

/// Handle on the current process
pub struct SelfProcess {
    pub pid: u32,
    #[cfg(not(target_os = "linux"))]
    handle: ProcessHandle,
    maps: Vec<MappedRange>,
}

// SAFETY: the handle only names this process (a pid or task port, or a
// pseudo-handle on Windows) and reads through it are stateless.
unsafe impl Send for SelfProcess {}
unsafe impl Sync for SelfProcess {}

impl MemorySource for SelfProcess {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        self.copy_exact(address, &mut buffer)
            .with_context(|| format!("Failed to read {} bytes at {:#x}", size, address))?;
        Ok(buffer)
    }

    fn allocation_size(&self, address: usize) -> usize {
        heap::allocation_size(self, &self.maps, address)
    }
}

impl SelfProcess {
    /// Open a handle on the current process and snapshot its mappings
    pub fn attach() -> Result<Self> {
        let pid = std::process::id();
        let maps = load_maps(pid)?;

        tracing::debug!("Attached to pid {} ({} mappings)", pid, maps.len());

        Ok(SelfProcess {
            pid,
            #[cfg(not(target_os = "linux"))]
            handle: (pid as process_memory::Pid)
                .try_into_process_handle()
                .context("Failed to open a handle on the current process")?,
            maps,
        })
    }

    /// Fill `buffer` from `address`; a short read is an error.
    #[cfg(target_os = "linux")]
    fn copy_exact(&self, address: usize, buffer: &mut [u8]) -> Result<()> {
        if buffer.is_empty() {
            return Ok(());
        }

        let local = libc::iovec {
            iov_base: buffer.as_mut_ptr().cast(),
            iov_len: buffer.len(),
        };
        let remote = libc::iovec {
            iov_base: address as *mut libc::c_void,
            iov_len: buffer.len(),
        };

        // SAFETY: `local` covers exactly `buffer`; the kernel validates the
        // remote range and reports EFAULT instead of faulting.
        let copied =
            unsafe { libc::process_vm_readv(self.pid as libc::pid_t, &local, 1, &remote, 1, 0) };

        if copied < 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        if copied as usize != buffer.len() {
            anyhow::bail!("Short read: got {} of {} bytes", copied, buffer.len());
        }
        Ok(())
    }

    /// Fill `buffer` from `address`
    #[cfg(not(target_os = "linux"))]
    fn copy_exact(&self, address: usize, buffer: &mut [u8]) -> Result<()> {
        self.handle.copy_address(address, buffer)?;
        Ok(())
    }
}

fn load_maps(pid: u32) -> Result<Vec<MappedRange>> {
    if cfg!(target_os = "linux") {
        parse_maps(pid)
    } else {
        Ok(Vec::new())
    }
}
