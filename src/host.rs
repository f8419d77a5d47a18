//! The document the engine lays out, seen as an abstract capability.
//!
//! The engine never owns layers. It reads a layer tree through [`Host`] and
//! asks the host to perform primitive, individually atomic mutations. Any
//! mutation may fail with a [`HostError`]; the engine treats every failure
//! as a skipped mutation and carries on.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::geometry::{Rect, Size};

/// What a layer is, as far as layout is concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// A folder of layers. The only kind whose children are traversed.
    Group,
    /// Raster content.
    Pixel,
    /// Vector shape; supports corner radius.
    Shape,
    Text,
    /// Embedded document; the only kind whose contents can be replaced by a merge.
    SmartObject,
    /// Non-geometric layer (levels, curves, fills). Cannot be moved or transformed.
    Adjustment,
}

impl LayerKind {
    /// Whether translate and resize can be applied at all.
    pub fn is_transformable(self) -> bool {
        !matches!(self, Self::Adjustment)
    }

    /// Whether the engine descends into this layer's children.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Group)
    }

    /// Whether a merged snapshot can be injected as this layer's contents.
    pub fn is_mergeable(self) -> bool {
        matches!(self, Self::SmartObject)
    }
}

/// A primitive host operation, for error reporting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Translate,
    Resize,
    Reorder,
    CornerRadius,
    Clip,
    Snapshot,
    OpenContents,
    ReplaceContents,
    CloseContents,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Translate => "translate",
            Self::Resize => "resize",
            Self::Reorder => "reorder",
            Self::CornerRadius => "corner radius",
            Self::Clip => "clip to below",
            Self::Snapshot => "merged snapshot",
            Self::OpenContents => "open contents",
            Self::ReplaceContents => "replace contents",
            Self::CloseContents => "close contents",
        })
    }
}

/// Host mutation failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostError {
    /// The layer's kind does not support this operation.
    Unsupported(Operation),
    /// The host refused or failed to apply the operation.
    Rejected(Operation),
    /// The layer (or the sibling or container it refers to) is not in the document.
    Detached,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(op) => write!(f, "{op} is not supported for this layer kind"),
            Self::Rejected(op) => write!(f, "host rejected {op}"),
            Self::Detached => f.write_str("layer is not attached to the document"),
        }
    }
}

impl core::error::Error for HostError {}

/// Explicit state of a nested edit (opening a smart object to replace its
/// contents), threaded through the merge calls instead of living in the host
/// as "the active document".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditContext<L> {
    /// The container whose contents are being edited.
    pub target: L,
    /// Whether a nested edit is currently open and must be closed.
    pub open: bool,
}

impl<L> EditContext<L> {
    pub fn new(target: L) -> Self {
        Self {
            target,
            open: false,
        }
    }
}

/// Read and mutate access to a layer document.
///
/// Child lists are in visual order, top to bottom. All positions are
/// absolute canvas coordinates.
pub trait Host {
    /// Cheap handle to a layer.
    type Layer: Copy + Ord + fmt::Debug;
    /// Flattened copy produced by [`snapshot_merged`](Self::snapshot_merged).
    type Snapshot;

    /// The document root. Never extracted, never laid out.
    fn root(&self) -> Self::Layer;
    /// Direct children of `container`, top to bottom. Empty for non-groups.
    fn children(&self, container: Self::Layer) -> Vec<Self::Layer>;
    fn parent(&self, layer: Self::Layer) -> Option<Self::Layer>;
    fn name(&self, layer: Self::Layer) -> String;
    fn kind(&self, layer: Self::Layer) -> LayerKind;
    fn bounds(&self, layer: Self::Layer) -> Rect;
    fn is_visible(&self, layer: Self::Layer) -> bool;
    /// Whether the layer is clipped to the layer directly below it.
    fn is_clipped(&self, layer: Self::Layer) -> bool;
    /// Canvas size of the document.
    fn document_extent(&self) -> Size;

    fn translate(&mut self, layer: Self::Layer, dx: f64, dy: f64) -> Result<(), HostError>;
    /// Resize keeping the top-left corner.
    fn resize_to(&mut self, layer: Self::Layer, width: f64, height: f64) -> Result<(), HostError>;
    /// Move `layer` directly above `sibling`, inside the sibling's parent.
    fn move_before(&mut self, layer: Self::Layer, sibling: Self::Layer) -> Result<(), HostError>;
    /// Move `layer` to the bottom of `container`.
    fn move_into(&mut self, layer: Self::Layer, container: Self::Layer) -> Result<(), HostError>;
    /// Move `layer` to the top of the document root.
    fn move_to_root(&mut self, layer: Self::Layer) -> Result<(), HostError>;
    fn set_max_corner_radius(&mut self, layer: Self::Layer) -> Result<(), HostError>;
    fn set_clip_to_below(&mut self, layer: Self::Layer, clipped: bool) -> Result<(), HostError>;

    /// Flatten `sources` into a detached snapshot without modifying them.
    fn snapshot_merged(
        &mut self,
        ctx: &EditContext<Self::Layer>,
        sources: &[Self::Layer],
    ) -> Result<Self::Snapshot, HostError>;
    /// Open `ctx.target` for editing its contents.
    fn open_contents(&mut self, ctx: &EditContext<Self::Layer>) -> Result<(), HostError>;
    /// Replace everything inside the open target with `snapshot`.
    fn replace_contents(
        &mut self,
        ctx: &EditContext<Self::Layer>,
        snapshot: Self::Snapshot,
    ) -> Result<(), HostError>;
    /// Close the open target, keeping (`commit`) or discarding the edit, and
    /// return focus to the original document.
    fn close_contents(
        &mut self,
        ctx: &EditContext<Self::Layer>,
        commit: bool,
    ) -> Result<(), HostError>;
}
