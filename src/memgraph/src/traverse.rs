//! Pointer-graph traversal.
//!
//! Starting from a root region, every word is treated as a candidate pointer
//! and every candidate not seen before is queued for a read. Reads that fail
//! are dropped; reads that succeed become nodes and are scanned in turn,
//! until the queue runs dry or the node ceiling is hit.
//!
//! An address is marked seen when it is queued, so an address reachable along
//! several paths hangs off whichever node discovered it first.

use crate::config::TraversalConfig;
use crate::reader::{MemoryReader, ReadError};
use crate::source::MemorySource;
use crate::tree::{ScanEntry, ScanTree};
use crate::Root;

use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Counters for one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Nodes accepted into the tree
    pub accepted: usize,
    /// Candidates whose read failed
    pub failed_reads: usize,
    /// Candidates still queued when the traversal stopped
    pub unexplored: usize,
    /// True if the traversal stopped at the node ceiling
    pub ceiling_reached: bool,
}

/// Result of one traversal; `tree` is `None` when the root was unreadable.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub tree: Option<ScanTree>,
    pub stats: ScanStats,
}

/// Traverses the pointer graph of a memory source
pub struct Scanner<'a, S: MemorySource + ?Sized> {
    reader: MemoryReader<'a, S>,
    node_limit: usize,
}

impl<'a, S: MemorySource + ?Sized> Scanner<'a, S> {
    pub fn new(source: &'a S, config: &TraversalConfig) -> Self {
        Self {
            reader: MemoryReader::with_fallback(source, config.fallback_len),
            node_limit: config.node_limit,
        }
    }

    /// Build the tree reachable from `root`.
    ///
    /// The root is read with exactly `root.len` bytes; every other node's
    /// length comes from the allocator or the fallback.
    pub fn scan(&self, root: Root) -> ScanOutcome {
        debug!(
            "Scanning from {:#x} ({} bytes, limit {})",
            root.address, root.len, self.node_limit
        );

        let mut seen = HashSet::new();
        let mut worklist = VecDeque::new();
        let mut tree = ScanTree::new();
        let mut stats = ScanStats::default();

        seen.insert(root.address);
        worklist.push_back(ScanEntry::root(root.address));

        while tree.len() < self.node_limit {
            let Some(mut entry) = worklist.pop_back() else {
                break;
            };
            entry.index = tree.len();

            let known_size = entry.parent.is_none().then_some(root.len);
            let region = match self.reader.read(entry.address, known_size) {
                Ok(region) => region,
                Err(ReadError::Unreadable { address, len, reason }) => {
                    trace!("Dropping {:#x} ({} bytes): {}", address, len, reason);
                    stats.failed_reads += 1;
                    continue;
                }
            };

            let candidates = region.pointer_candidates();
            let index = tree.push(entry, region);

            // Queued ahead of older entries as one block, in scan order
            for candidate in candidates {
                if seen.insert(candidate.value) {
                    worklist.push_front(ScanEntry::child(
                        candidate.value,
                        index,
                        candidate.offset,
                        tree.len(),
                    ));
                }
            }
        }

        stats.accepted = tree.len();
        stats.unexplored = worklist.len();
        stats.ceiling_reached = tree.len() >= self.node_limit && !worklist.is_empty();

        debug!(
            "Scan finished: {} nodes, {} failed reads, {} unexplored{}",
            stats.accepted,
            stats.failed_reads,
            stats.unexplored,
            if stats.ceiling_reached { " (ceiling reached)" } else { "" }
        );

        ScanOutcome {
            tree: (!tree.is_empty()).then_some(tree),
            stats,
        }
    }
}
