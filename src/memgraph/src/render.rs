//! Text rendering of a scan tree.
//!
//! One line per node, in depth-first pre-order, indented by depth:
//!
//! ```text
//!                                   0 0x00007ffd5a3c1e40:     8 bytes <unknwn> 10b2c35f56550000
//!   (  0, 0x00007ffd5a3c1e40@0  ) <-   1 0x000055565fc3b210:    24 bytes <malloc> 68656c6c6f000000 ... -- strings: (hello)
//! ```
//!
//! Nodes with children get a colour from a small rotating palette, and their
//! children repeat it in the `(parent) <-` prefix so the two can be matched up
//! in a linear stream.

use crate::config::RenderConfig;
use crate::labels::LabelTable;
use crate::source::WORD_SIZE;
use crate::tree::{ScanResult, ScanTree};

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// `0x` plus two hex digits per byte
const POINTER_WIDTH: usize = 2 + 2 * WORD_SIZE;

/// Width of `(iii, <pointer>@ooo) <- `
const ORIGIN_WIDTH: usize = 15 + POINTER_WIDTH;

/// Format an address as fixed-width, zero-padded hex
pub fn format_pointer(address: usize) -> String {
    format!("{:#0width$x}", address, width = POINTER_WIDTH)
}

fn limit(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len])
    }
}

/// Renders scan trees as annotated text
pub struct Renderer<'a> {
    labels: &'a LabelTable,
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(labels: &'a LabelTable, config: &'a RenderConfig) -> Self {
        Self { labels, config }
    }

    /// Write every line of the tree to `out`
    pub fn render<W: Write + ?Sized>(&self, tree: &ScanTree, out: &mut W) -> io::Result<()> {
        for line in self.lines(tree) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    pub fn render_to_string(&self, tree: &ScanTree) -> String {
        let mut text = String::new();
        for line in self.lines(tree) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    /// One line per node, in walk order
    pub fn lines(&self, tree: &ScanTree) -> Vec<String> {
        let colors = assign_colors(tree);
        tree.walk()
            .map(|(depth, node)| {
                format!("{}{}", "  ".repeat(depth), self.line(tree, node, &colors))
            })
            .collect()
    }

    fn line(&self, tree: &ScanTree, node: &ScanResult, colors: &[Option<Color>]) -> String {
        let mut line = String::with_capacity(192);

        match tree.parent(node) {
            Some(parent) => {
                let origin = format!(
                    "{:>3}, {}@{:<3}",
                    parent.index(),
                    format_pointer(parent.address()),
                    node.entry.parent_offset
                );
                line.push('(');
                line.push_str(&self.paint(origin, colors[parent.index()]));
                line.push_str(") <- ");
            }
            None => line.push_str(&" ".repeat(ORIGIN_WIDTH)),
        }

        let name = format!("{:>3} {}", node.index(), format_pointer(node.address()));
        line.push_str(&self.paint(name, colors[node.index()]));
        line.push_str(": ");

        let region = &node.region;
        line.push_str(&format!("{:>5} bytes ", region.len()));
        line.push_str(if region.is_allocation() { "<malloc> " } else { "<unknwn> " });
        line.push_str(&limit(&region.hex(), self.config.hex_limit));

        if let Some(label) = self.labels.label_for(node.address()) {
            line.push_str(" type ");
            line.push_str(label);
        }

        if self.config.show_strings {
            let strings = region.strings();
            if !strings.is_empty() {
                line.push_str(" -- strings: (");
                line.push_str(&strings.join(", "));
                line.push(')');
            }
        }

        line
    }

    fn paint(&self, text: String, color: Option<Color>) -> String {
        match color {
            Some(color) if self.config.color => text.with(color).to_string(),
            _ => text,
        }
    }
}

/// Palette colour per node index; only nodes with children get one, in walk
/// order.
pub(crate) fn assign_colors(tree: &ScanTree) -> Vec<Option<Color>> {
    let mut colors = vec![None; tree.len()];
    let mut palette = PALETTE.iter().copied().cycle();
    for (_, node) in tree.walk() {
        if node.has_children() {
            colors[node.index()] = palette.next();
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TraversalConfig;
    use crate::source::MockMemorySource;
    use crate::traverse::Scanner;
    use crate::Root;

    const ROOT: usize = 0x1000;
    const HEAP: usize = 0x10_0000;

    fn plain() -> RenderConfig {
        RenderConfig {
            color: false,
            ..Default::default()
        }
    }

    fn sample_tree() -> ScanTree {
        let mut heap = b"hello wo".to_vec();
        heap.extend_from_slice(&[0; 8]);
        let source = MockMemorySource::new()
            .with_static(ROOT, MockMemorySource::words(&[HEAP]))
            .with_heap(HEAP, heap);

        Scanner::new(&source, &TraversalConfig::default())
            .scan(Root::new(ROOT, WORD_SIZE))
            .tree
            .unwrap()
    }

    fn list_tree(n: usize) -> ScanTree {
        let mut source =
            MockMemorySource::new().with_static(ROOT, MockMemorySource::words(&[HEAP]));
        for i in 0..n {
            let next = if i + 1 < n { HEAP + (i + 1) * 0x100 } else { 0 };
            source = source.with_heap(HEAP + i * 0x100, MockMemorySource::words(&[next]));
        }
        Scanner::new(&source, &TraversalConfig::default())
            .scan(Root::new(ROOT, WORD_SIZE))
            .tree
            .unwrap()
    }

    #[test]
    fn test_format_pointer() {
        assert_eq!(format_pointer(0x1000), "0x0000000000001000");
        assert_eq!(format_pointer(usize::MAX), "0xffffffffffffffff");
    }

    #[test]
    fn test_limit() {
        assert_eq!(limit("abcdef", 6), "abcdef");
        assert_eq!(limit("abcdef", 4), "abcd...");
    }

    #[test]
    fn test_render_plain_lines() {
        let tree = sample_tree();
        let mut labels = LabelTable::new();
        labels.insert(HEAP, "Widget");
        let config = plain();

        let lines = Renderer::new(&labels, &config).lines(&tree);

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!(
                "{}  0 0x0000000000001000:     8 bytes <unknwn> 0000100000000000",
                " ".repeat(33)
            )
        );
        assert_eq!(
            lines[1],
            "  (  0, 0x0000000000001000@0  ) <-   1 0x0000000000100000:    16 bytes <malloc> \
             68656c6c6f20776f 0000000000000000 type Widget -- strings: (hello wo)"
        );
    }

    #[test]
    fn test_root_and_child_names_line_up() {
        let tree = sample_tree();
        let labels = LabelTable::new();
        let config = plain();

        let lines = Renderer::new(&labels, &config).lines(&tree);
        let root_col = lines[0].find("  0 0x").unwrap();
        // Strip the child's depth indent before comparing
        let child_col = lines[1][2..].find("  1 0x").unwrap();
        assert_eq!(root_col, ORIGIN_WIDTH);
        assert_eq!(root_col, child_col);
    }

    #[test]
    fn test_render_hides_strings() {
        let tree = sample_tree();
        let labels = LabelTable::new();
        let config = RenderConfig {
            show_strings: false,
            ..plain()
        };

        let text = Renderer::new(&labels, &config).render_to_string(&tree);
        assert!(!text.contains("strings"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_render_truncates_hex() {
        let source = MockMemorySource::new().with_static(ROOT, vec![0xab; 64]);
        let tree = Scanner::new(&source, &TraversalConfig::default())
            .scan(Root::new(ROOT, 64))
            .tree
            .unwrap();
        let labels = LabelTable::new();
        let config = plain();

        let line = &Renderer::new(&labels, &config).lines(&tree)[0];
        let hex = line.split("<unknwn> ").nth(1).unwrap();
        assert_eq!(hex.len(), 67 + 3);
        assert!(hex.ends_with("..."));
    }

    #[test]
    fn test_render_colors_parents_only() {
        let tree = sample_tree();
        let labels = LabelTable::new();
        let config = RenderConfig::default();

        let lines = Renderer::new(&labels, &config).lines(&tree);
        // crossterm honours NO_COLOR
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(lines[0].contains("\x1b["));
        }
        // The leaf's own name is left in the default colour
        assert!(lines[1].contains(") <-   1 0x0000000000100000: "));
    }

    #[test]
    fn test_palette_cycles() {
        // Root plus a list of 7: eight nodes, seven of them parents
        let tree = list_tree(7);
        let colors = assign_colors(&tree);

        assert_eq!(colors.len(), 8);
        assert_eq!(colors[0], Some(Color::Red));
        assert_eq!(colors[1], Some(Color::Green));
        assert_eq!(colors[5], Some(Color::Cyan));
        assert_eq!(colors[6], Some(Color::Red));
        assert_eq!(colors[7], None);
    }

    #[test]
    fn test_render_indents_by_depth() {
        let tree = list_tree(3);
        let labels = LabelTable::new();
        let config = plain();

        let text = Renderer::new(&labels, &config).render_to_string(&tree);
        let indents: Vec<Option<usize>> = text.lines().map(|l| l.find('(')).collect();
        assert_eq!(indents, vec![None, Some(2), Some(4), Some(6)]);
    }
}
