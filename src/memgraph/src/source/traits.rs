//! Memory Source Trait
//!
//! Core abstraction for reading memory and classifying allocations.

use anyhow::{bail, Result};
use byteorder::{ByteOrder, NativeEndian};

/// Size of a machine word, and of every pointer candidate.
pub const WORD_SIZE: usize = std::mem::size_of::<usize>();

/// Trait for reading memory and asking the allocator about it
pub trait MemorySource: Send + Sync {
    /// Read `size` bytes starting at a virtual address.
    ///
    /// Fails when any part of the range is unmapped or protected.
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>>;

    /// Usable size of the allocation starting at `address`, or 0 when the
    /// address is not known to be the start of a live allocation.
    fn allocation_size(&self, address: usize) -> usize;

    /// Read one machine word in native byte order
    fn read_word(&self, address: usize) -> Result<usize> {
        let bytes = self.read_bytes(address, WORD_SIZE)?;
        if bytes.len() < WORD_SIZE {
            bail!("Short read of {} bytes at {:#x}", bytes.len(), address);
        }
        Ok(NativeEndian::read_uint(&bytes, WORD_SIZE) as usize)
    }
}
