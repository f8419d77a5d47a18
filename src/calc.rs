//! Single-pass flex distribution for one container.
//!
//! Takes a container's children (rectangles, parsed rules, visibility) and
//! the container's own rules, and computes where each flow child goes and
//! what frame the content child gets. Pure geometry: nothing here touches a
//! host document.
//!
//! # Sizing modes
//!
//! - **Fixed-size**: the first content child does not carry `resize`. Its
//!   rectangle is the container frame; flow children are placed inside it,
//!   minus padding, so `center`/`end`/`between` have room to act.
//! - **Auto-size**: no content child, or one carrying `resize`. The interior
//!   is exactly the measured extent of the flow children and content
//!   children are stretched to cover it plus padding.
//!
//! In auto-size mode the anchor is the top-left of the union of the current
//! flow-child rectangles, never the container's own bounds. Running the
//! layout on an already laid out tree therefore reproduces it exactly;
//! padding is applied once and never accumulates.
//!
//! # Example
//!
//! ```
//! use zenflex::calc::{ChildInput, Target, compute_layout};
//! use zenflex::geometry::{Point, Rect};
//! use zenflex::rules;
//!
//! let container = rules::parse(".hstack.gap(5)");
//! let plain = rules::parse("layer");
//! let children = [
//!     ChildInput::new(Rect::new(0.0, 0.0, 10.0, 10.0), &plain),
//!     ChildInput::new(Rect::new(0.0, 0.0, 20.0, 10.0), &plain),
//!     ChildInput::new(Rect::new(0.0, 0.0, 30.0, 10.0), &plain),
//! ];
//!
//! let outcome = compute_layout(&children, &container).unwrap();
//! assert_eq!(outcome.content.width, 70.0);
//! assert_eq!(outcome.targets[2], Some(Target::Position(Point::new(40.0, 0.0))));
//! ```

use alloc::vec;
use alloc::vec::Vec;

use crate::geometry::{Point, Rect, Size};
use crate::rules::{Align, Direction, Justify, LayoutConfig};

/// One child of the container, as seen at calculation time.
#[derive(Copy, Clone, Debug)]
pub struct ChildInput<'a> {
    /// Current rectangle in canvas coordinates.
    pub rect: Rect,
    /// Rules parsed from the child's name.
    pub config: &'a LayoutConfig,
    /// Invisible children are excluded from measurement and placement.
    pub visible: bool,
}

impl<'a> ChildInput<'a> {
    /// A visible child.
    pub fn new(rect: Rect, config: &'a LayoutConfig) -> Self {
        Self {
            rect,
            config,
            visible: true,
        }
    }

    /// Set visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Whether this child is measured and placed.
    pub fn is_flow(&self) -> bool {
        self.visible && !self.config.is_content && !self.config.is_out_of_flow()
    }
}

/// Computed destination for one child.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Target {
    /// Move the child's top-left to this point. Size is unchanged.
    Position(Point),
    /// Resize and move the child to exactly this rectangle (content children).
    Frame(Rect),
}

/// Result of laying out one container.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutOutcome {
    /// One entry per input child, in input order. `None` = leave untouched.
    pub targets: Vec<Option<Target>>,
    /// Measured extent of the flow children (gaps included for stacks).
    pub content: Size,
    /// Interior rectangle the flow children were placed into.
    pub interior: Rect,
    /// Whether a non-resizing content child fixed the container size.
    pub fixed_size: bool,
}

/// Lay out one container.
///
/// Only visible children count: a hidden content child neither fixes the
/// container frame nor receives a target.
///
/// Returns `None` when the container has neither a flow child nor a visible
/// content child, in which case nothing should be mutated.
pub fn compute_layout(
    children: &[ChildInput<'_>],
    container: &LayoutConfig,
) -> Option<LayoutOutcome> {
    let flow: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_flow())
        .map(|(i, _)| i)
        .collect();
    let content: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.visible && c.config.is_content)
        .map(|(i, _)| i)
        .collect();

    let pad = container.padding;
    let flow_union = Rect::union_all(flow.iter().map(|&i| children[i].rect));
    let extent = measure(children, &flow, container.direction, container.gap);
    let primary = content.first().map(|&i| &children[i]);

    let (interior, fixed_size) = match (primary, flow_union) {
        (Some(frame), _) if frame.config.is_fixed_frame() => (
            frame.rect.inset(pad.top, pad.right, pad.bottom, pad.left),
            true,
        ),
        (_, Some(union)) => (Rect::from_origin_size(union.origin(), extent), false),
        (Some(frame), None) => {
            let origin = Point::new(frame.rect.left + pad.left, frame.rect.top + pad.top);
            (Rect::from_origin_size(origin, extent), false)
        }
        (None, None) => return None,
    };

    let mut targets = vec![None; children.len()];

    if let Some(union) = flow_union {
        match container.direction {
            Some(dir) => place_stack(children, &flow, container, dir, interior, &mut targets),
            None => place_free(children, &flow, container, union, interior, &mut targets),
        }
    }

    let frame = Rect::new(
        interior.left - pad.left,
        interior.top - pad.top,
        interior.right + pad.right,
        interior.bottom + pad.bottom,
    );
    for &i in &content {
        targets[i] = Some(Target::Frame(frame));
    }

    Some(LayoutOutcome {
        targets,
        content: extent,
        interior,
        fixed_size,
    })
}

/// Extent of the flow children along both axes.
fn measure(
    children: &[ChildInput<'_>],
    flow: &[usize],
    direction: Option<Direction>,
    gap: f64,
) -> Size {
    if flow.is_empty() {
        return Size::default();
    }
    let Some(dir) = direction else {
        return Rect::union_all(flow.iter().map(|&i| children[i].rect))
            .map(|r| r.size())
            .unwrap_or_default();
    };

    let mut main = 0.0;
    let mut cross: f64 = 0.0;
    for &i in flow {
        let (m, c) = split(dir, children[i].rect.size());
        main += m;
        cross = cross.max(c);
    }
    main += gap * (flow.len() - 1) as f64;
    join_size(dir, main, cross)
}

/// Place flow children one after another along the main axis.
fn place_stack(
    children: &[ChildInput<'_>],
    flow: &[usize],
    container: &LayoutConfig,
    dir: Direction,
    interior: Rect,
    targets: &mut [Option<Target>],
) {
    let (avail_main, avail_cross) = split(dir, interior.size());
    let (anchor_main, anchor_cross) = split_point(dir, interior.origin());

    let n = flow.len();
    let sum_main: f64 = flow
        .iter()
        .map(|&i| split(dir, children[i].rect.size()).0)
        .sum();
    let total_main = sum_main + container.gap * (n - 1) as f64;

    let mut gap = container.gap;
    let mut cursor = match container.justify {
        Justify::Start | Justify::Between => 0.0,
        Justify::Center => (avail_main - total_main) / 2.0,
        Justify::End => avail_main - total_main,
    };
    if container.justify == Justify::Between && n > 1 {
        let dynamic = (avail_main - sum_main) / (n - 1) as f64;
        if dynamic > 0.0 {
            gap = dynamic;
        }
    }

    for &i in flow {
        let (m, c) = split(dir, children[i].rect.size());
        let cross_offset = align_offset(container.items, avail_cross, c);
        targets[i] = Some(Target::Position(join_point(
            dir,
            anchor_main + cursor,
            anchor_cross + cross_offset,
        )));
        cursor += m + gap;
    }
}

/// No direction: keep the children's arrangement and align the block as a whole.
///
/// `justify` aligns horizontally and `items` vertically; `between` acts as `start`.
fn place_free(
    children: &[ChildInput<'_>],
    flow: &[usize],
    container: &LayoutConfig,
    union: Rect,
    interior: Rect,
    targets: &mut [Option<Target>],
) {
    let dx = match container.justify {
        Justify::Start | Justify::Between => 0.0,
        Justify::Center => (interior.width() - union.width()) / 2.0,
        Justify::End => interior.width() - union.width(),
    };
    let dy = align_offset(container.items, interior.height(), union.height());
    let origin = Point::new(interior.left + dx, interior.top + dy);

    for &i in flow {
        let r = children[i].rect;
        targets[i] = Some(Target::Position(Point::new(
            origin.x + (r.left - union.left),
            origin.y + (r.top - union.top),
        )));
    }
}

fn align_offset(align: Align, available: f64, size: f64) -> f64 {
    match align {
        Align::Start => 0.0,
        Align::Center => (available - size) / 2.0,
        Align::End => available - size,
    }
}

/// `(main, cross)` components of a size.
fn split(dir: Direction, s: Size) -> (f64, f64) {
    match dir {
        Direction::Row => (s.width, s.height),
        Direction::Column => (s.height, s.width),
    }
}

fn split_point(dir: Direction, p: Point) -> (f64, f64) {
    match dir {
        Direction::Row => (p.x, p.y),
        Direction::Column => (p.y, p.x),
    }
}

fn join_size(dir: Direction, main: f64, cross: f64) -> Size {
    match dir {
        Direction::Row => Size::new(main, cross),
        Direction::Column => Size::new(cross, main),
    }
}

fn join_point(dir: Direction, main: f64, cross: f64) -> Point {
    match dir {
        Direction::Row => Point::new(main, cross),
        Direction::Column => Point::new(cross, main),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::from_origin_size(Point::new(x, y), Size::new(w, h))
    }

    fn position(outcome: &LayoutOutcome, i: usize) -> Point {
        match outcome.targets[i] {
            Some(Target::Position(p)) => p,
            other => panic!("child {i}: expected position, got {other:?}"),
        }
    }

    fn frame(outcome: &LayoutOutcome, i: usize) -> Rect {
        match outcome.targets[i] {
            Some(Target::Frame(r)) => r,
            other => panic!("child {i}: expected frame, got {other:?}"),
        }
    }

    /// Move every child to its target, as a host would.
    fn apply(rects: &mut [Rect], outcome: &LayoutOutcome) {
        for (r, t) in rects.iter_mut().zip(&outcome.targets) {
            match t {
                Some(Target::Position(p)) => *r = r.translated(p.x - r.left, p.y - r.top),
                Some(Target::Frame(f)) => *r = *f,
                None => {}
            }
        }
    }

    // ── measurement ─────────────────────────────────────────────────────

    #[test]
    fn row_gap_offsets() {
        let container = parse(".hstack.gap(5)");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(100.0, 40.0, 10.0, 8.0), &plain),
            ChildInput::new(rect(300.0, 90.0, 20.0, 12.0), &plain),
            ChildInput::new(rect(120.0, 60.0, 30.0, 4.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();

        // Anchor = union top-left = (100, 40).
        assert_eq!(out.content, Size::new(70.0, 12.0));
        assert_eq!(position(&out, 0), Point::new(100.0, 40.0));
        assert_eq!(position(&out, 1), Point::new(115.0, 40.0));
        assert_eq!(position(&out, 2), Point::new(140.0, 40.0));
        assert!(!out.fixed_size);
    }

    #[test]
    fn column_measures_height_sum() {
        let container = parse(".vstack.gap(2)");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 10.0, 5.0), &plain),
            ChildInput::new(rect(0.0, 50.0, 40.0, 7.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(out.content, Size::new(40.0, 14.0));
        assert_eq!(position(&out, 1), Point::new(0.0, 7.0));
    }

    #[test]
    fn no_direction_measures_union() {
        let container = parse(".padding(4)");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(10.0, 10.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(30.0, 15.0, 10.0, 10.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(out.content, Size::new(30.0, 15.0));
        // Free layout in auto-size mode leaves children where they are.
        assert_eq!(position(&out, 0), Point::new(10.0, 10.0));
        assert_eq!(position(&out, 1), Point::new(30.0, 15.0));
    }

    #[test]
    fn invisible_and_out_of_flow_excluded() {
        let container = parse(".hstack.gap(10)");
        let plain = LayoutConfig::default();
        let fixed = parse(".fixed");
        let relative = parse(".relative");
        let children = [
            ChildInput::new(rect(0.0, 0.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(500.0, 0.0, 90.0, 90.0), &fixed),
            ChildInput::new(rect(0.0, 0.0, 50.0, 50.0), &plain).visible(false),
            ChildInput::new(rect(600.0, 0.0, 90.0, 90.0), &relative),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(out.content, Size::new(10.0, 10.0));
        assert_eq!(out.targets[1], None);
        assert_eq!(out.targets[2], None);
        assert_eq!(out.targets[3], None);
    }

    #[test]
    fn empty_container_is_none() {
        let container = parse(".hstack");
        let fixed = parse(".fixed");
        let children = [ChildInput::new(rect(0.0, 0.0, 10.0, 10.0), &fixed)];
        assert_eq!(compute_layout(&children, &container), None);
        assert_eq!(compute_layout(&[], &container), None);
    }

    // ── fixed-size placement ────────────────────────────────────────────

    #[test]
    fn padding_containment_centered() {
        let container = parse(".hstack.padding(8,16,8,16).items-center.justify-center");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 20.0, 20.0), &plain),
            ChildInput::new(rect(200.0, 100.0, 100.0, 50.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert!(out.fixed_size);
        // Interior is 68×34 at (216, 108); child centred inside it.
        assert_eq!(position(&out, 0), Point::new(240.0, 115.0));
        // The frame is authoritative and stays put.
        assert_eq!(frame(&out, 1), rect(200.0, 100.0, 100.0, 50.0));
    }

    #[test]
    fn justify_between_distributes() {
        let container = parse(".hstack.justify-between.gap(3)");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 100.0, 10.0), &content),
            ChildInput::new(rect(7.0, 0.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(9.0, 0.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(3.0, 0.0, 10.0, 10.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(position(&out, 1).x, 0.0);
        assert_eq!(position(&out, 2).x, 45.0);
        assert_eq!(position(&out, 3).x, 90.0);
    }

    #[test]
    fn justify_between_overfull_keeps_static_gap() {
        let container = parse(".hstack.justify-between.gap(3)");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 20.0, 10.0), &content),
            ChildInput::new(rect(0.0, 0.0, 15.0, 10.0), &plain),
            ChildInput::new(rect(0.0, 0.0, 15.0, 10.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(position(&out, 2).x, 18.0);
    }

    #[test]
    fn justify_end_and_items_end() {
        let container = parse(".vstack.justify-end.items-end.padding(10)");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 20.0, 30.0), &plain),
            ChildInput::new(rect(0.0, 0.0, 100.0, 100.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        // Interior (10,10)-(90,90).
        assert_eq!(position(&out, 0), Point::new(70.0, 60.0));
    }

    #[test]
    fn column_centred_in_fixed_frame() {
        let container = parse(".vstack.gap(4).padding(10).justify-center.items-center");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 20.0, 10.0), &plain),
            ChildInput::new(rect(50.0, 50.0, 40.0, 10.0), &plain),
            ChildInput::new(rect(0.0, 0.0, 100.0, 100.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        // Interior (10,10)-(90,90); the 24-high stack starts 28 down.
        assert_eq!(position(&out, 0), Point::new(40.0, 38.0));
        assert_eq!(position(&out, 1), Point::new(30.0, 52.0));
    }

    #[test]
    fn hidden_content_is_ignored() {
        let container = parse(".hstack.padding(2)");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 100.0, 100.0), &content).visible(false),
            ChildInput::new(rect(10.0, 10.0, 10.0, 10.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert!(!out.fixed_size);
        assert_eq!(out.targets[0], None);
        assert_eq!(position(&out, 1), Point::new(10.0, 10.0));

        let alone = [ChildInput::new(rect(0.0, 0.0, 100.0, 100.0), &content).visible(false)];
        assert_eq!(compute_layout(&alone, &container), None);
    }

    #[test]
    fn free_layout_centres_block_in_frame() {
        let container = parse(".padding(0).justify-center.items-center");
        let content = parse(".content");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(10.0, 10.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(0.0, 0.0, 60.0, 40.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(position(&out, 0), Point::new(20.0, 10.0));
        assert_eq!(position(&out, 1), Point::new(30.0, 20.0));
    }

    // ── auto-size content ───────────────────────────────────────────────

    #[test]
    fn resizing_content_wraps_flow_plus_padding() {
        let container = parse(".hstack.gap(4).padding(2,6)");
        let content = parse(".content.resize");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(50.0, 50.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(70.0, 55.0, 10.0, 20.0), &plain),
            ChildInput::new(rect(0.0, 0.0, 5.0, 5.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert!(!out.fixed_size);
        // Flow extent 24×20 anchored at (50, 50); padding (2,6,2,6).
        assert_eq!(frame(&out, 2), Rect::new(44.0, 48.0, 80.0, 72.0));
    }

    #[test]
    fn all_content_children_share_frame() {
        let container = parse(".vstack");
        let content = parse(".content.resize");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(0.0, 0.0, 5.0, 5.0), &content),
            ChildInput::new(rect(10.0, 10.0, 30.0, 30.0), &plain),
            ChildInput::new(rect(99.0, 99.0, 1.0, 1.0), &content),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(frame(&out, 0), frame(&out, 2));
        assert_eq!(frame(&out, 0), rect(10.0, 10.0, 30.0, 30.0));
    }

    #[test]
    fn content_without_flow_keeps_padding_frame() {
        let container = parse(".hstack.padding(5)");
        let content = parse(".content.resize");
        let children = [ChildInput::new(rect(40.0, 40.0, 80.0, 80.0), &content)];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(frame(&out, 0), rect(40.0, 40.0, 10.0, 10.0));
    }

    #[test]
    fn center_is_noop_in_auto_size() {
        let container = parse(".hstack.justify-center.items-start");
        let plain = LayoutConfig::default();
        let children = [
            ChildInput::new(rect(10.0, 10.0, 10.0, 10.0), &plain),
            ChildInput::new(rect(20.0, 10.0, 10.0, 10.0), &plain),
        ];
        let out = compute_layout(&children, &container).unwrap();
        assert_eq!(position(&out, 0), Point::new(10.0, 10.0));
        assert_eq!(position(&out, 1), Point::new(20.0, 10.0));
    }

    // ── idempotence ─────────────────────────────────────────────────────

    #[test]
    fn rerun_reproduces_positions() {
        let container = parse(".hstack.gap(8).padding(12).items-center");
        let content = parse(".content.resize");
        let plain = LayoutConfig::default();
        let configs = [&plain, &plain, &content, &plain];
        let mut rects = [
            rect(30.0, 90.0, 40.0, 10.0),
            rect(5.0, 20.0, 20.0, 30.0),
            rect(0.0, 0.0, 1.0, 1.0),
            rect(80.0, 60.0, 10.0, 12.0),
        ];

        fn inputs<'a>(rects: &[Rect], configs: &[&'a LayoutConfig]) -> Vec<ChildInput<'a>> {
            rects
                .iter()
                .zip(configs)
                .map(|(r, &c)| ChildInput::new(*r, c))
                .collect()
        }

        let first = compute_layout(&inputs(&rects, &configs), &container).unwrap();
        apply(&mut rects, &first);
        let after_one = rects;

        let second = compute_layout(&inputs(&rects, &configs), &container).unwrap();
        apply(&mut rects, &second);

        assert_eq!(first.targets, second.targets);
        assert_eq!(after_one, rects);
    }
}
