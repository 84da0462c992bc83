//! # memgraph
//!
//! Inspect the memory graph reachable from a live value in the current
//! process.
//!
//! Starting at a value's own bytes, every aligned machine word is treated as
//! a candidate pointer. Candidates that can be read become nodes, are scanned
//! in turn, and the result is a tree of memory regions that can be rendered
//! for a human:
//!
//! ```no_run
//! let value = Box::new(vec![String::from("hello"), String::from("world")]);
//! memgraph::dump(&value)?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! This is a diagnostic tool. Pointer detection is a heuristic: any word that
//! happens to hold a readable address is followed, and the tree is capped at a
//! fixed number of nodes (150 by default) so arbitrary binary data cannot blow
//! it up. Each region is a separate snapshot of memory that other threads may
//! be changing.
//!
//! ## Module Structure
//!
//! - `source` - Memory source abstraction (current process, mock for tests)
//! - `region` - Captured bytes, pointer candidates, printable strings
//! - `reader` - Safe-failing reads classified by the allocator
//! - `traverse` - Bounded pointer-graph traversal
//! - `tree` - The resulting tree of regions
//! - `render` - Annotated text output
//! - `labels` - Address labels for the renderer
//! - `config` - Traversal and rendering configuration

pub mod config;
pub mod labels;
pub mod logging;
pub mod reader;
pub mod region;
pub mod render;
pub mod source;
pub mod traverse;
pub mod tree;

#[doc(inline)]
pub use config::{Config, RenderConfig, TraversalConfig};
#[doc(inline)]
pub use labels::LabelTable;
#[doc(inline)]
pub use reader::{MemoryReader, ReadError};
#[doc(inline)]
pub use region::{MemoryRegion, PointerCandidate};
#[doc(inline)]
pub use render::Renderer;
#[doc(inline)]
pub use source::{MemorySource, SelfProcess};
#[doc(inline)]
pub use traverse::{ScanOutcome, ScanStats, Scanner};
#[doc(inline)]
pub use tree::{ScanEntry, ScanResult, ScanTree};

use anyhow::{Context, Result};
use std::io::Write;

/// Where a traversal starts: an address and how many bytes belong to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Root {
    pub address: usize,
    pub len: usize,
}

impl Root {
    pub fn new(address: usize, len: usize) -> Self {
        Self { address, len }
    }

    /// The bytes of `value` itself; its type plays no other part
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self {
            address: value as *const T as *const u8 as usize,
            len: std::mem::size_of_val(value),
        }
    }
}

/// Traverse the memory graph of `value` in the current process
pub fn inspect<T: ?Sized>(value: &T) -> Result<ScanOutcome> {
    let source = SelfProcess::attach()?;
    Ok(inspect_with(&source, Root::of(value), &TraversalConfig::default()))
}

/// Traverse from an explicit root over any memory source
pub fn inspect_with<S: MemorySource + ?Sized>(
    source: &S,
    root: Root,
    config: &TraversalConfig,
) -> ScanOutcome {
    Scanner::new(source, config).scan(root)
}

/// Traverse `value` and print the tree to stdout
pub fn dump<T: ?Sized>(value: &T) -> Result<()> {
    let source = SelfProcess::attach()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump_with(
        &source,
        Root::of(value),
        &Config::default(),
        &LabelTable::new(),
        &mut out,
    )?;
    Ok(())
}

/// Traverse from `root` and render the tree to `out`.
///
/// Writes nothing when the root itself is unreadable.
pub fn dump_with<S, W>(
    source: &S,
    root: Root,
    config: &Config,
    labels: &LabelTable,
    out: &mut W,
) -> Result<ScanStats>
where
    S: MemorySource + ?Sized,
    W: Write + ?Sized,
{
    let outcome = inspect_with(source, root, &config.traversal);
    if let Some(tree) = &outcome.tree {
        Renderer::new(labels, &config.render)
            .render(tree, out)
            .context("Failed to write memory graph")?;
    }
    Ok(outcome.stats)
}
