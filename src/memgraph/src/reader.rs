//! Safe-failing reads of one address, classified by the allocator.

use crate::region::MemoryRegion;
use crate::source::MemorySource;

/// Bytes read when the allocator does not know an address
pub const DEFAULT_FALLBACK_LEN: usize = 64;

/// Error type for region reads
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReadError {
    #[error("Cannot read {len} bytes at {address:#x}: {reason}")]
    Unreadable {
        address: usize,
        len: usize,
        reason: String,
    },
}

/// Reads regions from a memory source
pub struct MemoryReader<'a, S: MemorySource + ?Sized> {
    source: &'a S,
    fallback_len: usize,
}

impl<'a, S: MemorySource + ?Sized> MemoryReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self::with_fallback(source, DEFAULT_FALLBACK_LEN)
    }

    pub fn with_fallback(source: &'a S, fallback_len: usize) -> Self {
        Self {
            source,
            fallback_len,
        }
    }

    /// Capture the region at `address`.
    ///
    /// A `known_size` is used as-is and skips the allocator query. Otherwise
    /// the allocation size decides the length, falling back to
    /// `fallback_len` for addresses the allocator does not know.
    pub fn read(&self, address: usize, known_size: Option<usize>) -> Result<MemoryRegion, ReadError> {
        let (len, is_allocation) = match known_size {
            Some(size) => (size, false),
            None => match self.source.allocation_size(address) {
                0 => (self.fallback_len, false),
                size => (size, true),
            },
        };

        let bytes = self
            .source
            .read_bytes(address, len)
            .map_err(|e| ReadError::Unreadable {
                address,
                len,
                reason: format!("{:#}", e),
            })?;

        Ok(MemoryRegion::new(bytes, is_allocation))
    }
}
