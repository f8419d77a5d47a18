//! Engine configuration.

use crate::geometry::{EPSILON, Point, Rect};
use crate::host::Host;

/// Area a backdrop's content container is stretched to cover.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BackdropExtent {
    /// The whole document canvas, from `(0, 0)`.
    #[default]
    Document,
    /// An explicit canvas rectangle.
    Rect(Rect),
}

impl BackdropExtent {
    /// Resolve against a host document.
    pub fn resolve<H: Host + ?Sized>(&self, host: &H) -> Rect {
        match self {
            Self::Document => Rect::from_origin_size(Point::default(), host.document_extent()),
            Self::Rect(r) => *r,
        }
    }
}

/// Options for one [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use zenflex::{BackdropExtent, EngineOptions};
///
/// let options = EngineOptions::new()
///     .max_depth(16)
///     .merge_backdrops(false);
/// assert_eq!(options.max_depth, 16);
/// assert_eq!(options.backdrop_extent, BackdropExtent::Document);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOptions {
    /// Deltas smaller than this are not applied.
    pub epsilon: f64,
    /// Deepest level any tree walk descends to. Layers below it are ignored.
    pub max_depth: usize,
    pub backdrop_extent: BackdropExtent,
    /// Give every `rounded` layer the maximum corner radius after layout.
    pub round_corners: bool,
    /// Replace backdrop contents with a flattened copy of the layers below.
    pub merge_backdrops: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self {
            epsilon: EPSILON,
            max_depth: 64,
            backdrop_extent: BackdropExtent::Document,
            round_corners: true,
            merge_backdrops: true,
        }
    }

    /// Set the no-op threshold for deltas.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the traversal depth limit.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn backdrop_extent(mut self, extent: BackdropExtent) -> Self {
        self.backdrop_extent = extent;
        self
    }

    pub fn round_corners(mut self, enabled: bool) -> Self {
        self.round_corners = enabled;
        self
    }

    pub fn merge_backdrops(mut self, enabled: bool) -> Self {
        self.merge_backdrops = enabled;
        self
    }
}
