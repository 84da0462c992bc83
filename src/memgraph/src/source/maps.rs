//! Mapped Address Ranges
//!
//! Entries of /proc/<pid>/maps, used to tell heap-like mappings apart from
//! code, stacks and file-backed data.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// One mapping from /proc/<pid>/maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRange {
    pub start: usize,
    pub end: usize,
    pub perms: String,
    pub path: Option<String>,
}

impl MappedRange {
    pub fn contains(&self, address: usize) -> bool {
        address >= self.start && address < self.end
    }

    pub fn is_readable(&self) -> bool {
        self.perms.starts_with('r')
    }

    pub fn is_writable(&self) -> bool {
        self.perms.chars().nth(1) == Some('w')
    }

    /// True for anonymous mappings (no backing file or pseudo-path)
    pub fn is_anonymous(&self) -> bool {
        self.path.is_none()
    }
}

/// Parse a single maps line, e.g.
/// `55d0c000-55d0e000 rw-p 00000000 00:00 0    [heap]`
pub fn parse_maps_line(line: &str) -> Option<MappedRange> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let (lo, hi) = parts.first()?.split_once('-')?;

    let start = usize::from_str_radix(lo, 16).ok()?;
    let end = usize::from_str_radix(hi, 16).ok()?;
    if end < start {
        return None;
    }

    let perms = parts.get(1).unwrap_or(&"").to_string();
    // Paths may contain spaces; everything after the inode column belongs to it
    let path = if parts.len() > 5 {
        Some(parts[5..].join(" "))
    } else {
        None
    };

    Some(MappedRange {
        start,
        end,
        perms,
        path,
    })
}

/// Parse /proc/<pid>/maps to get the process's mappings
pub fn parse_maps(pid: u32) -> Result<Vec<MappedRange>> {
    let maps_path = format!("/proc/{}/maps", pid);
    let file = File::open(&maps_path)
        .with_context(|| format!("Failed to open {}. Do you have permission?", maps_path))?;

    let reader = BufReader::new(file);
    let mut ranges = Vec::new();

    for line in reader.lines() {
        let line = line.with_context(|| format!("Failed to read {}", maps_path))?;
        if let Some(range) = parse_maps_line(&line) {
            ranges.push(range);
        }
    }

    Ok(ranges)
}
