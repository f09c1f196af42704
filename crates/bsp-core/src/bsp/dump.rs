//! Human-readable tree dump.
//!
//! One node per line, indented four spaces per depth level. Internal nodes
//! print `NODE <id>` followed by `LEFT { … }` and `RIGHT { … }` blocks;
//! childless nodes print `LEAF <id>`. When exactly one child exists, the
//! absent sibling is shown as `NULL` inside its block so the tree shape
//! stays unambiguous.

use std::io::{self, Write};

use super::builder::BspTree;

fn indent<W: Write>(out: &mut W, level: usize) -> io::Result<()> {
    for _ in 0..level {
        out.write_all(b"    ")?;
    }
    Ok(())
}

impl BspTree {
    /// Pretty-prints the whole tree; an empty tree prints `NULL`.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.root() {
            Some(root) => self.write_node(out, 0, root),
            None => writeln!(out, "NULL"),
        }
    }

    fn write_node<W: Write>(&self, out: &mut W, level: usize, id: u16) -> io::Result<()> {
        let Some(node) = self.node(id) else {
            indent(out, level)?;
            return writeln!(out, "NULL");
        };

        if node.is_leaf() {
            indent(out, level)?;
            return writeln!(out, "LEAF {id}");
        }

        indent(out, level)?;
        writeln!(out, "NODE {id}")?;
        for (label, child) in [("LEFT", node.left()), ("RIGHT", node.right())] {
            indent(out, level)?;
            writeln!(out, "  {label} {{")?;
            match child {
                Some(child) => self.write_node(out, level + 1, child)?,
                None => {
                    indent(out, level + 1)?;
                    writeln!(out, "NULL")?;
                }
            }
            indent(out, level)?;
            writeln!(out, "  }}")?;
        }
        Ok(())
    }
}
