//! The tree a traversal produces.
//!
//! Nodes live in one arena in discovery order, so a node's discovery index is
//! also its position in the arena and parent/child links are plain indices.

use crate::region::MemoryRegion;
use std::collections::HashMap;

/// A discovered address waiting for (or having had) its read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub address: usize,
    /// Discovery index of the node whose region contained this address
    pub parent: Option<usize>,
    /// Byte offset of the pointer inside the parent's region
    pub parent_offset: usize,
    /// Order of acceptance into the tree; 0 for the root
    pub index: usize,
}

impl ScanEntry {
    pub fn root(address: usize) -> Self {
        Self {
            address,
            parent: None,
            parent_offset: 0,
            index: 0,
        }
    }

    pub fn child(address: usize, parent: usize, parent_offset: usize, index: usize) -> Self {
        Self {
            address,
            parent: Some(parent),
            parent_offset,
            index,
        }
    }
}

/// A node: an entry whose read succeeded, and its accepted children
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub entry: ScanEntry,
    pub region: MemoryRegion,
    /// Discovery indices of children, in acceptance order
    pub children: Vec<usize>,
}

impl ScanResult {
    pub fn address(&self) -> usize {
        self.entry.address
    }

    pub fn index(&self) -> usize {
        self.entry.index
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Every node reached from one root; node 0 is the root
#[derive(Debug, Clone)]
pub struct ScanTree {
    nodes: Vec<ScanResult>,
    by_address: HashMap<usize, usize>,
}

impl ScanTree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_address: HashMap::new(),
        }
    }

    /// Append a node, linking it under its parent. Returns its index.
    pub(crate) fn push(&mut self, entry: ScanEntry, region: MemoryRegion) -> usize {
        let index = self.nodes.len();
        debug_assert_eq!(entry.index, index);

        if let Some(parent) = entry.parent {
            self.nodes[parent].children.push(index);
        }
        self.by_address.insert(entry.address, index);
        self.nodes.push(ScanResult {
            entry,
            region,
            children: Vec::new(),
        });
        index
    }

    pub fn root(&self) -> &ScanResult {
        &self.nodes[0]
    }

    pub fn get(&self, index: usize) -> Option<&ScanResult> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node for an address, if the traversal reached it
    pub fn find(&self, address: usize) -> Option<&ScanResult> {
        self.by_address.get(&address).map(|&i| &self.nodes[i])
    }

    pub fn parent(&self, node: &ScanResult) -> Option<&ScanResult> {
        node.entry.parent.map(|p| &self.nodes[p])
    }

    pub fn children<'a>(&'a self, node: &'a ScanResult) -> impl Iterator<Item = &'a ScanResult> + 'a {
        node.children.iter().map(move |&c| &self.nodes[c])
    }

    /// Number of edges between a node and the root
    pub fn depth(&self, node: &ScanResult) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Nodes in discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, ScanResult> {
        self.nodes.iter()
    }

    /// Depth-first pre-order walk yielding `(depth, node)`; a node's first
    /// child comes right after it.
    pub fn walk(&self) -> Walk<'_> {
        let stack = if self.nodes.is_empty() {
            Vec::new()
        } else {
            vec![(0, 0)]
        };
        Walk { tree: self, stack }
    }
}

/// Iterator returned by [`ScanTree::walk`]
pub struct Walk<'a> {
    tree: &'a ScanTree,
    stack: Vec<(usize, usize)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a ScanResult);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, depth) = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        // Reversed so the first child is popped first
        for &child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((depth, node))
    }
}
