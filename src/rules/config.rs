//! Layout configuration types: parsed representation of a layer name.

/// Stacking direction of a layout container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Children laid out left to right (`hstack`).
    Row,
    /// Children laid out top to bottom (`vstack`).
    Column,
}

/// Cross-axis alignment (`items-*`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
}

/// Main-axis distribution (`justify-*`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    /// First child at the start, last at the end, equal space between.
    Between,
}

/// Padding insets in document units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// Same inset on all four sides.
    pub const fn all(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Vertical (top and bottom) and horizontal (left and right) insets.
    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Layout rules parsed from one layer name.
///
/// Produced by [`crate::rules::parse()`]. A name without the leading marker
/// yields [`LayoutConfig::default()`], which participates in flow as an
/// ordinary child.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct LayoutConfig {
    /// Stack direction, `None` when the name declares neither `hstack` nor `vstack`.
    pub direction: Option<Direction>,
    /// Static spacing between consecutive flow children (`gap(n)`).
    pub gap: f64,
    /// Interior padding (`padding(...)`).
    pub padding: Padding,
    /// Cross-axis alignment.
    pub items: Align,
    /// Main-axis distribution.
    pub justify: Justify,
    /// This layer is its parent's content frame (`content`).
    pub is_content: bool,
    /// A content frame that grows to fit the flow children (`resize`).
    pub content_resizes: bool,
    /// Receives the maximum corner radius after layout (`rounded`).
    pub is_rounded: bool,
    /// Keeps its canvas position regardless of layout (`fixed`).
    pub is_fixed: bool,
    /// Out of flow but rides along with its container (`relative`).
    pub is_relative: bool,
    /// Replaced by a flattened copy of everything below it (`backdrop`).
    pub is_backdrop: bool,
}

impl LayoutConfig {
    /// Whether this layer is excluded from flow measurement and placement.
    pub fn is_out_of_flow(&self) -> bool {
        self.is_fixed || self.is_relative || self.is_backdrop
    }

    /// Whether the content frame defines the container size.
    ///
    /// True for a content child that does not carry `resize`.
    pub fn is_fixed_frame(&self) -> bool {
        self.is_content && !self.content_resizes
    }
}
