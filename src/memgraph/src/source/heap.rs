//! Heap Allocation Classification
//!
//! Answers "is this address the start of a live heap allocation, and how big
//! is it?" for the current process.
//!
//! - macOS: the allocator answers directly (`malloc_size`), and is safe to ask
//!   about arbitrary addresses.
//! - Linux/glibc: `malloc_usable_size` is undefined for foreign pointers, so the
//!   chunk header in front of the address is read through the memory source
//!   and checked against glibc's chunk layout instead. This is a heuristic and
//!   can misclassify free chunks or coincidental bit patterns.
//! - Elsewhere: always unknown (0).

use super::{MappedRange, MemorySource, WORD_SIZE};

// glibc malloc_chunk layout: [prev_size][size|flags][user data...]
const MALLOC_ALIGNMENT: usize = 2 * WORD_SIZE;
const MIN_CHUNK_SIZE: usize = 4 * WORD_SIZE;
const CHUNK_HEADER: usize = 2 * WORD_SIZE;

const PREV_INUSE: usize = 0x1;
const IS_MMAPPED: usize = 0x2;
const NON_MAIN_ARENA: usize = 0x4;
const SIZE_BITS: usize = PREV_INUSE | IS_MMAPPED | NON_MAIN_ARENA;

/// Mappings malloc can hand out memory from: the brk heap and anonymous
/// read/write mappings (secondary arenas, mmapped chunks).
pub fn is_heap_like(range: &MappedRange) -> bool {
    range.is_readable()
        && range.is_writable()
        && (range.path.as_deref() == Some("[heap]") || range.is_anonymous())
}

/// Usable size of the glibc chunk whose user pointer is `address`, or 0.
#[cfg_attr(not(all(target_os = "linux", target_env = "gnu")), allow(dead_code))]
pub(crate) fn glibc_usable_size<S: MemorySource + ?Sized>(
    source: &S,
    range: &MappedRange,
    address: usize,
) -> usize {
    if !is_heap_like(range) || !range.contains(address) || address % MALLOC_ALIGNMENT != 0 {
        return 0;
    }

    let chunk = match address.checked_sub(CHUNK_HEADER) {
        Some(chunk) if chunk >= range.start => chunk,
        _ => return 0,
    };

    let Ok(size_field) = source.read_word(chunk + WORD_SIZE) else {
        return 0;
    };

    let chunk_size = size_field & !SIZE_BITS;
    if chunk_size < MIN_CHUNK_SIZE || chunk_size % MALLOC_ALIGNMENT != 0 {
        return 0;
    }

    let chunk_end = match chunk.checked_add(chunk_size) {
        Some(end) if end <= range.end => end,
        _ => return 0,
    };

    // mmapped chunks have no neighbour; prev_size is part of the header
    if size_field & IS_MMAPPED != 0 {
        return chunk_size - CHUNK_HEADER;
    }

    // A chunk is in use iff the next chunk says so
    if chunk_end + CHUNK_HEADER > range.end {
        return 0;
    }
    match source.read_word(chunk_end + WORD_SIZE) {
        Ok(next_size) if next_size & PREV_INUSE != 0 => chunk_size - WORD_SIZE,
        _ => 0,
    }
}

#[cfg(target_os = "macos")]
pub(crate) fn allocation_size<S: MemorySource + ?Sized>(
    _source: &S,
    _maps: &[MappedRange],
    address: usize,
) -> usize {
    // SAFETY: malloc_size looks the pointer up in the zone tables and returns
    // 0 for anything it does not own; it never dereferences the address.
    unsafe { libc::malloc_size(address as *const libc::c_void) }
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub(crate) fn allocation_size<S: MemorySource + ?Sized>(
    source: &S,
    maps: &[MappedRange],
    address: usize,
) -> usize {
    maps.iter()
        .find(|r| r.contains(address))
        .map(|r| glibc_usable_size(source, r, address))
        .unwrap_or(0)
}

#[cfg(not(any(target_os = "macos", all(target_os = "linux", target_env = "gnu"))))]
pub(crate) fn allocation_size<S: MemorySource + ?Sized>(
    _source: &S,
    _maps: &[MappedRange],
    _address: usize,
) -> usize {
    0
}
