use std::io::Write;

use serde::{Deserialize, Serialize};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    core::{
        error::{Error, Result},
        id::NodeId,
        node::Node,
        world::Core,
    },
    geom::Rect,
    layout::SizeRequest,
};

/// Traverses a tree of nodes and returns a string showing each node's kind,
/// name, visibility and rectangles. This is a debug function.
pub fn dump(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump`], without color escapes.
pub fn dump_plain(core: &Core, root: NodeId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_node(&mut buffer, core, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(buffer, "{label}")?;
    buffer.reset()?;
    writeln!(buffer, " {value}")?;
    Ok(())
}

/// Format a rectangle.
fn fmt_rect(r: Rect) -> String {
    format!("x: {}, y: {}, w: {}, h: {}", r.tl.x, r.tl.y, r.w, r.h)
}

/// Look up a node for dumping.
fn lookup(core: &Core, id: NodeId) -> Result<&Node> {
    core.nodes
        .get(id)
        .ok_or_else(|| Error::Internal(format!("missing node {id:?}")))
}

/// Walk a node subtree and emit formatted debug output.
fn dump_node(buffer: &mut Buffer, core: &Core, id: NodeId, level: usize) -> Result<()> {
    let node = lookup(core, id)?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    write!(buffer, "{} {}", node.kind.label(), node.name)?;
    buffer.reset()?;
    write!(buffer, " {id:?}")?;
    if !node.visible {
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(buffer, " hidden")?;
        buffer.reset()?;
    }
    writeln!(buffer)?;

    if let Some(allocation) = node.allocation {
        write_field(buffer, &indent, "allocation:", &fmt_rect(allocation))?;
        write_field(buffer, &indent, "rect:", &fmt_rect(node.rect))?;
    }
    if let Some(m) = node.last_request {
        write_field(
            buffer,
            &indent,
            "request:",
            &format!(
                "w {}..{}, h {}..{}",
                m.width.minimum, m.width.natural, m.height.minimum, m.height.natural
            ),
        )?;
    }

    if node.visible {
        for child in &node.children {
            dump_node(buffer, core, *child, level + 1)?;
        }
    }
    Ok(())
}

/// A serialisable record of a laid-out subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Node kind label.
    pub kind: String,
    /// Node name.
    pub name: String,
    /// Whether the node is visible.
    pub visible: bool,
    /// Final rectangle, if the node has been allocated.
    pub rect: Option<Rect>,
    /// Unconstrained width request seen by the last size check.
    pub width: Option<SizeRequest>,
    /// Unconstrained height request seen by the last size check.
    pub height: Option<SizeRequest>,
    /// Children, in placement order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl LayoutSnapshot {
    /// Capture a subtree.
    pub fn capture(core: &Core, root: NodeId) -> Result<Self> {
        let node = lookup(core, root)?;
        let children = node
            .children
            .iter()
            .map(|c| Self::capture(core, *c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind: node.kind.label().into(),
            name: node.name.clone(),
            visible: node.visible,
            rect: node.allocation.map(|_| node.rect),
            width: node.last_request.map(|m| m.width),
            height: node.last_request.map(|m| m.height),
            children,
        })
    }

    /// Find the first node with a given name, depth first.
    pub fn find(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Capture a subtree as pretty-printed JSON.
pub fn dump_json(core: &Core, root: NodeId) -> Result<String> {
    let snapshot = LayoutSnapshot::capture(core, root)?;
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geom::Orientation,
        layout::PackMode,
        testing::{FixedWidget, ManualLoop},
    };

    fn laid_out() -> Result<(Core, NodeId)> {
        let mut core = Core::new(ManualLoop::new());
        let w = core.add_window();
        let b = core.add_box(Orientation::Horizontal, 2);
        let a = core.add_leaf(FixedWidget::new(10, 3));
        let c = core.add_leaf(FixedWidget::new(5, 1));
        core.set_name(a, "first")?;
        core.set_name(c, "second")?;
        core.set_content(w, b)?;
        core.pack_start(b, a, PackMode::Natural, 0)?;
        core.pack_start(b, c, PackMode::Natural, 0)?;
        core.run_checkpoint();
        Ok((core, w))
    }

    #[test]
    fn plain_dump_lists_tree() -> Result<()> {
        let (core, w) = laid_out()?;
        let out = dump_plain(&core, w)?;
        assert!(out.starts_with("window window"));
        assert!(out.contains("    hbox hbox"));
        assert!(out.contains("        leaf first"));
        assert!(out.contains("rect: x: 12, y: 0, w: 5, h: 3"));
        Ok(())
    }

    #[test]
    fn snapshot_round_trips_through_json() -> Result<()> {
        let (core, w) = laid_out()?;
        let json = dump_json(&core, w)?;
        let snap: LayoutSnapshot = serde_json::from_str(&json)?;
        assert_eq!(snap, LayoutSnapshot::capture(&core, w)?);
        let first = snap.find("first").map(|n| n.rect);
        assert_eq!(first, Some(Some(Rect::new(0, 0, 10, 3))));
        Ok(())
    }
}
