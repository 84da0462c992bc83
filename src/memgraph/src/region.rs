//! Captured memory regions and what can be read out of them.
//!
//! Both scans are heuristics over raw bytes: every word is a *candidate*
//! pointer until a read at that address succeeds, and printable runs are
//! display-only.

use crate::source::WORD_SIZE;
use byteorder::{ByteOrder, NativeEndian};

/// Printable ASCII range used by the string scan
const PRINTABLE: std::ops::RangeInclusive<u8> = 32..=126;

/// Shortest printable run reported as a string
pub const MIN_STRING_LEN: usize = 4;

/// Bytes between spaces in the hex rendering
const HEX_GROUP: usize = 8;

/// Bytes read from one address at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    bytes: Vec<u8>,
    is_allocation: bool,
}

/// An aligned word inside a region, not yet confirmed as a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCandidate {
    pub value: usize,
    /// Byte offset within the owning region, always a multiple of `WORD_SIZE`
    pub offset: usize,
}

impl MemoryRegion {
    pub fn new(bytes: Vec<u8>, is_allocation: bool) -> Self {
        Self {
            bytes,
            is_allocation,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when the allocator recognised the address as an allocation start
    pub fn is_allocation(&self) -> bool {
        self.is_allocation
    }

    /// Every whole word in the region, in order. A trailing partial word is
    /// not a candidate.
    pub fn pointer_candidates(&self) -> Vec<PointerCandidate> {
        self.bytes
            .chunks_exact(WORD_SIZE)
            .enumerate()
            .map(|(i, word)| PointerCandidate {
                value: NativeEndian::read_uint(word, WORD_SIZE) as usize,
                offset: i * WORD_SIZE,
            })
            .collect()
    }

    /// Runs of printable ASCII at least `MIN_STRING_LEN` bytes long
    pub fn strings(&self) -> Vec<String> {
        let mut strings = Vec::new();
        let mut start = None;

        for (i, byte) in self.bytes.iter().enumerate() {
            match (PRINTABLE.contains(byte), start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    push_run(&mut strings, &self.bytes[s..i]);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            push_run(&mut strings, &self.bytes[s..]);
        }

        strings
    }

    /// Lowercase hex, grouped into words separated by spaces
    pub fn hex(&self) -> String {
        self.bytes
            .chunks(HEX_GROUP)
            .map(hex::encode)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn push_run(strings: &mut Vec<String>, run: &[u8]) {
    if run.len() >= MIN_STRING_LEN {
        // Printable ASCII is always valid UTF-8
        strings.push(run.iter().map(|&b| b as char).collect());
    }
}
