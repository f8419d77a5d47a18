//! In-memory layer document implementing [`Host`].
//!
//! Layers live in an arena addressed by [`LayerId`]. Group bounds are the
//! union of their visible descendants, the way design tools report them.
//! Reordering a layer releases clip-to-below on it and on any layers that
//! were clipped onto it, again matching host behaviour, so a pass that
//! forgets to rebuild clipping is caught by tests.
//!
//! Any `(layer, operation)` pair can be made to fail with
//! [`MemoryDocument::reject`] to exercise the engine's skip paths.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::{Rect, Size};
use crate::host::{EditContext, Host, HostError, LayerKind, Operation};

/// Handle to a layer in a [`MemoryDocument`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u32);

/// Flattened copy of a set of layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Layers that went into the copy, in document order.
    pub sources: Vec<LayerId>,
    /// Union of the sources' bounds.
    pub bounds: Option<Rect>,
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    kind: LayerKind,
    /// Own rectangle; unused for groups.
    rect: Rect,
    visible: bool,
    clipped: bool,
    rounded: bool,
    parent: Option<LayerId>,
    children: Vec<LayerId>,
    contents: Option<Snapshot>,
}

/// A layer tree held entirely in memory.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    extent: Size,
    rejected: Vec<(LayerId, Operation)>,
    open: Option<LayerId>,
    staged: Option<Snapshot>,
}

const ROOT: LayerId = LayerId(0);

impl MemoryDocument {
    /// Empty document with a canvas of `width × height`.
    pub fn new(width: f64, height: f64) -> Self {
        let root = Node {
            name: String::new(),
            kind: LayerKind::Group,
            rect: Rect::default(),
            visible: true,
            clipped: false,
            rounded: false,
            parent: None,
            children: Vec::new(),
            contents: None,
        };
        Self {
            nodes: vec![root],
            extent: Size::new(width, height),
            rejected: Vec::new(),
            open: None,
            staged: None,
        }
    }

    /// Append an empty group at the bottom of `parent`.
    pub fn add_group(&mut self, parent: LayerId, name: &str) -> LayerId {
        self.add_layer(parent, name, LayerKind::Group, Rect::default())
    }

    /// Append a layer at the bottom of `parent`.
    pub fn add_layer(&mut self, parent: LayerId, name: &str, kind: LayerKind, rect: Rect) -> LayerId {
        let id = LayerId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: String::from(name),
            kind,
            rect,
            visible: true,
            clipped: false,
            rounded: false,
            parent: Some(parent),
            children: Vec::new(),
            contents: None,
        });
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn set_visible(&mut self, layer: LayerId, visible: bool) {
        self.node_mut(layer).visible = visible;
    }

    /// Set clip-to-below directly, bypassing the host rules.
    pub fn set_clipped(&mut self, layer: LayerId, clipped: bool) {
        self.node_mut(layer).clipped = clipped;
    }

    /// Make every future `op` on `layer` fail with [`HostError::Rejected`].
    pub fn reject(&mut self, layer: LayerId, op: Operation) {
        self.rejected.push((layer, op));
    }

    /// First layer named `name`, in document order.
    pub fn find(&self, name: &str) -> Option<LayerId> {
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            if id != ROOT && self.node(id).name == name {
                return Some(id);
            }
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        None
    }

    pub fn layer_name(&self, layer: LayerId) -> &str {
        &self.node(layer).name
    }

    /// Names of `container`'s children, top to bottom.
    pub fn child_names(&self, container: LayerId) -> Vec<&str> {
        self.node(container)
            .children
            .iter()
            .map(|&c| self.node(c).name.as_str())
            .collect()
    }

    /// Whether the maximum corner radius has been applied.
    pub fn is_rounded(&self, layer: LayerId) -> bool {
        self.node(layer).rounded
    }

    /// Merged contents of a smart object, if any were committed.
    pub fn contents(&self, layer: LayerId) -> Option<&Snapshot> {
        self.node(layer).contents.as_ref()
    }

    /// Smart object currently opened for editing.
    pub fn open_target(&self) -> Option<LayerId> {
        self.open
    }

    fn node(&self, id: LayerId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: LayerId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn check(&self, layer: LayerId, op: Operation) -> Result<(), HostError> {
        if self.rejected.contains(&(layer, op)) {
            Err(HostError::Rejected(op))
        } else {
            Ok(())
        }
    }

    fn is_ancestor_or_self(&self, ancestor: LayerId, mut layer: LayerId) -> bool {
        loop {
            if layer == ancestor {
                return true;
            }
            match self.node(layer).parent {
                Some(p) => layer = p,
                None => return false,
            }
        }
    }

    /// Every layer under `layer`, excluding itself.
    fn descendants(&self, layer: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack = self.node(layer).children.clone();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().copied());
        }
        out
    }

    /// Remove `layer` from its parent, releasing clipping that depended on
    /// its old position.
    fn unlink(&mut self, layer: LayerId) {
        let Some(parent) = self.node(layer).parent else {
            return;
        };
        let siblings = &self.node(parent).children;
        let Some(index) = siblings.iter().position(|&c| c == layer) else {
            return;
        };
        let released: Vec<LayerId> = siblings[..index]
            .iter()
            .rev()
            .copied()
            .take_while(|&c| self.node(c).clipped)
            .collect();
        for c in released {
            self.node_mut(c).clipped = false;
        }
        let node = self.node_mut(layer);
        node.clipped = false;
        node.parent = None;
        self.node_mut(parent).children.remove(index);
    }

    /// Whether every group between `layer` and `top` (exclusive) is visible.
    fn effectively_visible_below(&self, layer: LayerId, top: LayerId) -> bool {
        let mut current = self.node(layer).parent;
        while let Some(p) = current {
            if p == top {
                return true;
            }
            if !self.node(p).visible {
                return false;
            }
            current = self.node(p).parent;
        }
        true
    }

    fn reorder_target_ok(&self, layer: LayerId, container: LayerId) -> Result<(), HostError> {
        if layer == ROOT || self.is_ancestor_or_self(layer, container) {
            return Err(HostError::Rejected(Operation::Reorder));
        }
        self.check(layer, Operation::Reorder)
    }
}

impl Host for MemoryDocument {
    type Layer = LayerId;
    type Snapshot = Snapshot;

    fn root(&self) -> LayerId {
        ROOT
    }

    fn children(&self, container: LayerId) -> Vec<LayerId> {
        self.node(container).children.clone()
    }

    fn parent(&self, layer: LayerId) -> Option<LayerId> {
        self.node(layer).parent
    }

    fn name(&self, layer: LayerId) -> String {
        self.node(layer).name.clone()
    }

    fn kind(&self, layer: LayerId) -> LayerKind {
        self.node(layer).kind
    }

    fn bounds(&self, layer: LayerId) -> Rect {
        let node = self.node(layer);
        if node.kind != LayerKind::Group {
            return node.rect;
        }
        let leaves = self
            .descendants(layer)
            .into_iter()
            .filter(|&id| {
                let n = self.node(id);
                n.kind != LayerKind::Group && n.visible && self.effectively_visible_below(id, layer)
            })
            .map(|id| self.node(id).rect);
        Rect::union_all(leaves).unwrap_or_default()
    }

    fn is_visible(&self, layer: LayerId) -> bool {
        self.node(layer).visible
    }

    fn is_clipped(&self, layer: LayerId) -> bool {
        self.node(layer).clipped
    }

    fn document_extent(&self) -> Size {
        self.extent
    }

    fn translate(&mut self, layer: LayerId, dx: f64, dy: f64) -> Result<(), HostError> {
        if !self.node(layer).kind.is_transformable() {
            return Err(HostError::Unsupported(Operation::Translate));
        }
        self.check(layer, Operation::Translate)?;
        let mut moved = self.descendants(layer);
        moved.push(layer);
        for id in moved {
            let node = self.node_mut(id);
            if node.kind != LayerKind::Group && node.kind.is_transformable() {
                node.rect = node.rect.translated(dx, dy);
            }
        }
        Ok(())
    }

    fn resize_to(&mut self, layer: LayerId, width: f64, height: f64) -> Result<(), HostError> {
        match self.node(layer).kind {
            LayerKind::Group | LayerKind::Text | LayerKind::Adjustment => {
                return Err(HostError::Unsupported(Operation::Resize));
            }
            _ => {}
        }
        self.check(layer, Operation::Resize)?;
        let node = self.node_mut(layer);
        node.rect.right = node.rect.left + width;
        node.rect.bottom = node.rect.top + height;
        Ok(())
    }

    fn move_before(&mut self, layer: LayerId, sibling: LayerId) -> Result<(), HostError> {
        if layer == sibling {
            return Ok(());
        }
        let parent = self.node(sibling).parent.ok_or(HostError::Detached)?;
        self.reorder_target_ok(layer, parent)?;
        self.unlink(layer);
        let index = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == sibling)
            .ok_or(HostError::Detached)?;
        self.node_mut(parent).children.insert(index, layer);
        self.node_mut(layer).parent = Some(parent);
        Ok(())
    }

    fn move_into(&mut self, layer: LayerId, container: LayerId) -> Result<(), HostError> {
        if self.node(container).kind != LayerKind::Group {
            return Err(HostError::Unsupported(Operation::Reorder));
        }
        self.reorder_target_ok(layer, container)?;
        self.unlink(layer);
        self.node_mut(container).children.push(layer);
        self.node_mut(layer).parent = Some(container);
        Ok(())
    }

    fn move_to_root(&mut self, layer: LayerId) -> Result<(), HostError> {
        self.reorder_target_ok(layer, ROOT)?;
        self.unlink(layer);
        self.node_mut(ROOT).children.insert(0, layer);
        self.node_mut(layer).parent = Some(ROOT);
        Ok(())
    }

    fn set_max_corner_radius(&mut self, layer: LayerId) -> Result<(), HostError> {
        if self.node(layer).kind != LayerKind::Shape {
            return Err(HostError::Unsupported(Operation::CornerRadius));
        }
        self.check(layer, Operation::CornerRadius)?;
        self.node_mut(layer).rounded = true;
        Ok(())
    }

    fn set_clip_to_below(&mut self, layer: LayerId, clipped: bool) -> Result<(), HostError> {
        let parent = self.node(layer).parent.ok_or(HostError::Detached)?;
        self.check(layer, Operation::Clip)?;
        // The bottom layer of a group has nothing to clip to.
        if clipped && self.node(parent).children.last() == Some(&layer) {
            return Err(HostError::Rejected(Operation::Clip));
        }
        self.node_mut(layer).clipped = clipped;
        Ok(())
    }

    fn snapshot_merged(
        &mut self,
        ctx: &EditContext<LayerId>,
        sources: &[LayerId],
    ) -> Result<Snapshot, HostError> {
        self.check(ctx.target, Operation::Snapshot)?;
        Ok(Snapshot {
            sources: sources.to_vec(),
            bounds: Rect::union_all(sources.iter().map(|&s| self.bounds(s))),
        })
    }

    fn open_contents(&mut self, ctx: &EditContext<LayerId>) -> Result<(), HostError> {
        if !self.node(ctx.target).kind.is_mergeable() {
            return Err(HostError::Unsupported(Operation::OpenContents));
        }
        if self.open.is_some() {
            return Err(HostError::Rejected(Operation::OpenContents));
        }
        self.check(ctx.target, Operation::OpenContents)?;
        self.open = Some(ctx.target);
        Ok(())
    }

    fn replace_contents(
        &mut self,
        ctx: &EditContext<LayerId>,
        snapshot: Snapshot,
    ) -> Result<(), HostError> {
        if self.open != Some(ctx.target) {
            return Err(HostError::Detached);
        }
        self.check(ctx.target, Operation::ReplaceContents)?;
        self.staged = Some(snapshot);
        Ok(())
    }

    fn close_contents(&mut self, ctx: &EditContext<LayerId>, commit: bool) -> Result<(), HostError> {
        if self.open != Some(ctx.target) {
            return Err(HostError::Rejected(Operation::CloseContents));
        }
        let staged = self.staged.take();
        self.open = None;
        if commit {
            self.check(ctx.target, Operation::CloseContents)?;
            if let Some(snapshot) = staged {
                self.node_mut(ctx.target).contents = Some(snapshot);
            }
        }
        Ok(())
    }
}
