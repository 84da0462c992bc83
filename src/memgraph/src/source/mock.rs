//! Mock Memory Source
//!
//! A sparse, in-memory address space for testing the reader and traversal.

use super::{MemorySource, WORD_SIZE};
use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// One contiguous block of fake memory
#[derive(Debug, Clone)]
struct MockBlock {
    data: Vec<u8>,
    heap: bool,
}

/// A mock memory source made of non-overlapping blocks.
///
/// Heap blocks report their length as the allocation size when queried at
/// their start address; all other addresses report 0.
#[derive(Debug, Clone, Default)]
pub struct MockMemorySource {
    blocks: BTreeMap<usize, MockBlock>,
}

impl MockMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a heap allocation at `address`
    pub fn with_heap(mut self, address: usize, data: Vec<u8>) -> Self {
        self.blocks.insert(address, MockBlock { data, heap: true });
        self
    }

    /// Add readable memory that the allocator does not know about
    pub fn with_static(mut self, address: usize, data: Vec<u8>) -> Self {
        self.blocks.insert(address, MockBlock { data, heap: false });
        self
    }

    /// Encode words in native byte order
    pub fn words(values: &[usize]) -> Vec<u8> {
        let mut out = Vec::with_capacity(values.len() * WORD_SIZE);
        for value in values {
            out.extend_from_slice(&value.to_ne_bytes());
        }
        out
    }
}

impl MemorySource for MockMemorySource {
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>> {
        let Some((&start, block)) = self.blocks.range(..=address).next_back() else {
            bail!("Address {:#x} is not mapped", address);
        };

        let offset = address - start;
        if offset.checked_add(size).map_or(true, |end| end > block.data.len()) {
            bail!(
                "Read of {} bytes at {:#x} exceeds block at {:#x} ({} bytes)",
                size,
                address,
                start,
                block.data.len()
            );
        }

        Ok(block.data[offset..offset + size].to_vec())
    }

    fn allocation_size(&self, address: usize) -> usize {
        match self.blocks.get(&address) {
            Some(block) if block.heap => block.data.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_bytes() {
        let source = MockMemorySource::new().with_static(0x1000, vec![0x41, 0x42, 0x43, 0x44]);

        assert_eq!(source.read_bytes(0x1000, 4).unwrap(), vec![0x41, 0x42, 0x43, 0x44]);
        assert_eq!(source.read_bytes(0x1001, 2).unwrap(), vec![0x42, 0x43]);
    }

    #[test]
    fn test_mock_source_read_out_of_bounds() {
        let source = MockMemorySource::new().with_static(0x1000, vec![0; 4]);

        assert!(source.read_bytes(0x1002, 10).is_err());
        assert!(source.read_bytes(0x500, 4).is_err());
        assert!(source.read_bytes(0x5000, 1).is_err());
    }

    #[test]
    fn test_mock_source_allocation_size() {
        let source = MockMemorySource::new()
            .with_heap(0x2000, vec![0; 48])
            .with_static(0x3000, vec![0; 48]);

        assert_eq!(source.allocation_size(0x2000), 48);
        assert_eq!(source.allocation_size(0x2008), 0);
        assert_eq!(source.allocation_size(0x3000), 0);
        assert_eq!(source.allocation_size(0x9000), 0);
    }

    #[test]
    fn test_mock_source_read_word() {
        let source = MockMemorySource::new().with_static(0x1000, MockMemorySource::words(&[0xdead_beef]));
        assert_eq!(source.read_word(0x1000).unwrap(), 0xdead_beef);
    }
}
