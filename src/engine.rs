//! Out-of-flow orchestration: one full layout pass over a document.
//!
//! A pass is a fixed sequence of [`Phase`]s. Layers that must not take part
//! in flow (fixed, relative, backdrop, and adjustment layers inside
//! fixed/relative groups) are detached to the document root before any
//! container is measured, then put back where they came from once layout
//! has run.
//!
//! ```text
//!   Scan ─► ExtractAdjustment ─► ExtractNonFlow ─► RestoreRelative ─► Layout
//!     │                                                                │
//!     └─(no containers)─► NothingFound          RestoreFixedAndBackdrop ◄┘
//!                                                         │
//!          Done ◄─ MergeBackdrops ◄─ ResizeBackdrops ◄─ RestoreClipping
//! ```
//!
//! Every extraction gets a document-wide sequence number. Restoring in
//! ascending sequence order, inserting each layer above the sibling that
//! originally followed it, rebuilds the original stacking exactly.
//!
//! The pass is best-effort: a host mutation that fails is logged, counted in
//! [`PassReport::mutations_skipped`], and never stops the pass.

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::backdrop::{self, MergeOutcome};
use crate::calc::{ChildInput, Target, compute_layout};
use crate::geometry::{Point, Rect, delta};
use crate::host::{Host, LayerKind};
use crate::options::EngineOptions;
use crate::rules::{self, LayoutConfig};

/// Step of a document pass, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Find layout containers and sort them deepest first.
    Scan,
    /// Detach adjustment layers from inside fixed/relative groups.
    ///
    /// Every detachment also snapshots the clip-to-below states it releases
    /// (the layer itself and the clipped layers stacked directly above it),
    /// for [`Phase::RestoreClipping`].
    ExtractAdjustment,
    /// Detach fixed, relative and backdrop children of every container,
    /// snapshotting released clip states the same way.
    ExtractNonFlow,
    /// Put relative layers back so they ride along with their container.
    RestoreRelative,
    /// Lay out every container, deepest first.
    Layout,
    /// Put fixed, backdrop and adjustment layers back; pin fixed layers.
    RestoreFixedAndBackdrop,
    /// Re-apply clip-to-below, bottom to top.
    RestoreClipping,
    /// Stretch the content container of every backdrop in the document over
    /// the backdrop extent.
    ResizeBackdrops,
    /// Refill backdrop content containers with the layers below them.
    MergeBackdrops,
    Done,
}

impl Phase {
    /// The phase that follows this one. `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Scan => Self::ExtractAdjustment,
            Self::ExtractAdjustment => Self::ExtractNonFlow,
            Self::ExtractNonFlow => Self::RestoreRelative,
            Self::RestoreRelative => Self::Layout,
            Self::Layout => Self::RestoreFixedAndBackdrop,
            Self::RestoreFixedAndBackdrop => Self::RestoreClipping,
            Self::RestoreClipping => Self::ResizeBackdrops,
            Self::ResizeBackdrops => Self::MergeBackdrops,
            Self::MergeBackdrops | Self::Done => Self::Done,
        }
    }
}

/// Why a layer was taken out of flow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Non-transformable layer inside a fixed or relative group.
    Adjustment,
    Backdrop,
    Fixed,
    Relative,
}

impl Category {
    /// Single out-of-flow category for a layer, or `None` for flow layers.
    ///
    /// Contradictory names resolve by precedence:
    /// adjustment > backdrop > fixed > relative.
    pub fn classify(kind: LayerKind, config: &LayoutConfig) -> Option<Self> {
        if !kind.is_transformable() {
            Some(Self::Adjustment)
        } else if config.is_backdrop {
            Some(Self::Backdrop)
        } else if config.is_fixed {
            Some(Self::Fixed)
        } else if config.is_relative {
            Some(Self::Relative)
        } else {
            None
        }
    }
}

/// A layer detached from its container for the duration of a pass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExtractionRecord<L> {
    pub layer: L,
    /// Container the layer was taken from.
    pub container: L,
    /// Sibling directly below the layer at extraction time.
    pub next_sibling: Option<L>,
    /// Absolute top-left at extraction time.
    pub origin: Point,
    pub category: Category,
    /// Document-wide, strictly increasing.
    pub sequence: u64,
}

/// Layers under one parent whose clip-to-below was released by an
/// extraction, top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClippingRecord<L> {
    pub container: L,
    pub layers: Vec<L>,
}

/// Counters for one completed pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Layout containers found by the scan.
    pub containers: usize,
    /// Containers the calculator produced targets for.
    pub laid_out: usize,
    /// Containers skipped for having no flow or content child.
    pub empty_containers: usize,
    pub extracted: usize,
    pub restored: usize,
    pub mutations_applied: usize,
    /// Mutations the host could not apply, or that the layer kind forbids.
    pub mutations_skipped: usize,
    pub corners_rounded: usize,
    pub clips_restored: usize,
    pub backdrops_merged: usize,
    pub backdrops_skipped: usize,
}

/// Result of [`Engine::run`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// The document has no layout container and no backdrop; nothing was
    /// touched.
    NothingFound,
    Completed(PassReport),
}

/// Runs layout passes over host documents.
///
/// The engine holds no document state between passes and must not be run
/// reentrantly on the same document.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run one full pass over `host`.
    pub fn run<H: Host>(&self, host: &mut H) -> PassOutcome {
        let mut pass = Pass::new(host, &self.options);
        let mut phase = Phase::Scan;
        while phase != Phase::Done {
            debug!("phase {phase:?}");
            pass.step(phase);
            if phase == Phase::Scan && pass.containers.is_empty() && pass.backdrops.is_empty() {
                debug!("no layout containers or backdrops");
                return PassOutcome::NothingFound;
            }
            phase = phase.next();
        }
        debug!("pass complete: {:?}", pass.report);
        PassOutcome::Completed(pass.report)
    }
}

#[derive(Clone, Debug)]
struct Container<L> {
    layer: L,
    depth: usize,
    config: LayoutConfig,
}

/// State owned by one pass.
struct Pass<'a, H: Host> {
    host: &'a mut H,
    options: &'a EngineOptions,
    containers: Vec<Container<H::Layer>>,
    records: Vec<ExtractionRecord<H::Layer>>,
    /// Detached layers not yet restored, mapped to their record index.
    pending: BTreeMap<H::Layer, usize>,
    clipping: Vec<ClippingRecord<H::Layer>>,
    /// Visible backdrop markers anywhere in the document, in document order.
    backdrops: Vec<H::Layer>,
    next_sequence: u64,
    report: PassReport,
}

impl<'a, H: Host> Pass<'a, H> {
    fn new(host: &'a mut H, options: &'a EngineOptions) -> Self {
        Self {
            host,
            options,
            containers: Vec::new(),
            records: Vec::new(),
            pending: BTreeMap::new(),
            clipping: Vec::new(),
            backdrops: Vec::new(),
            next_sequence: 0,
            report: PassReport::default(),
        }
    }

    fn step(&mut self, phase: Phase) {
        match phase {
            Phase::Scan => self.scan(),
            Phase::ExtractAdjustment => self.extract_adjustments(),
            Phase::ExtractNonFlow => self.extract_non_flow(),
            Phase::RestoreRelative => self.restore_where(|c| c == Category::Relative),
            Phase::Layout => {
                self.layout_all();
                if self.options.round_corners {
                    self.round_corners();
                }
            }
            Phase::RestoreFixedAndBackdrop => {
                self.restore_where(|c| matches!(c, Category::Fixed | Category::Backdrop));
                self.restore_where(|c| c == Category::Adjustment);
            }
            Phase::RestoreClipping => self.restore_clipping(),
            Phase::ResizeBackdrops => self.resize_backdrops(),
            Phase::MergeBackdrops => {
                if self.options.merge_backdrops {
                    self.merge_backdrops();
                }
            }
            Phase::Done => {}
        }
    }

    fn parse(&self, layer: H::Layer) -> LayoutConfig {
        rules::parse(&self.host.name(layer))
    }

    // ── scan ────────────────────────────────────────────────────────────

    fn scan(&mut self) {
        let root = self.host.root();
        let mut stack = vec![(root, 0usize)];
        while let Some((layer, depth)) = stack.pop() {
            let kind = self.host.kind(layer);
            if layer != root {
                let name = self.host.name(layer);
                let parsed = rules::parse_with_warnings(&name);
                if parsed.config.is_backdrop && self.host.is_visible(layer) {
                    self.backdrops.push(layer);
                }
                if !kind.is_container() {
                    continue;
                }
                if !parsed.warnings.is_empty() {
                    debug!("{layer:?} {name:?}: {:?}", parsed.warnings);
                }
                if parsed.is_container {
                    self.containers.push(Container {
                        layer,
                        depth,
                        config: parsed.config,
                    });
                }
            }
            if depth >= self.options.max_depth {
                warn!("{layer:?}: depth limit {} reached", self.options.max_depth);
                continue;
            }
            for child in self.host.children(layer).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        // Stable: containers at equal depth keep document order.
        self.containers.sort_by(|a, b| b.depth.cmp(&a.depth));
        self.report.containers = self.containers.len();
        debug!(
            "found {} layout containers, {} backdrops",
            self.containers.len(),
            self.backdrops.len()
        );
    }

    // ── extraction ──────────────────────────────────────────────────────

    fn extract_adjustments(&mut self) {
        for i in 0..self.containers.len() {
            let container = self.containers[i].layer;
            for child in self.host.children(container) {
                if !self.host.is_visible(child) || !self.host.kind(child).is_container() {
                    continue;
                }
                let config = self.parse(child);
                if matches!(
                    Category::classify(self.host.kind(child), &config),
                    Some(Category::Fixed | Category::Relative)
                ) {
                    self.extract_adjustments_in(child);
                }
            }
        }
    }

    /// Detach every adjustment layer anywhere inside `group`.
    fn extract_adjustments_in(&mut self, group: H::Layer) {
        let mut stack = vec![(group, 0usize)];
        while let Some((parent, depth)) = stack.pop() {
            let kids = self.host.children(parent);
            for (i, &kid) in kids.iter().enumerate() {
                let kind = self.host.kind(kid);
                if kind == LayerKind::Adjustment {
                    self.extract(kid, parent, kids.get(i + 1).copied(), Category::Adjustment);
                } else if kind.is_container() {
                    if depth + 1 < self.options.max_depth {
                        stack.push((kid, depth + 1));
                    } else {
                        warn!("{kid:?}: depth limit {} reached", self.options.max_depth);
                    }
                }
            }
        }
    }

    fn extract_non_flow(&mut self) {
        for i in 0..self.containers.len() {
            let container = self.containers[i].layer;
            let kids = self.host.children(container);
            for (j, &kid) in kids.iter().enumerate() {
                if !self.host.is_visible(kid) {
                    continue;
                }
                let config = self.parse(kid);
                if let Some(category @ (Category::Backdrop | Category::Fixed | Category::Relative)) =
                    Category::classify(self.host.kind(kid), &config)
                {
                    self.extract(kid, container, kids.get(j + 1).copied(), category);
                }
            }
        }
        debug!("{} layers out of flow", self.pending.len());
    }

    fn extract(
        &mut self,
        layer: H::Layer,
        container: H::Layer,
        next_sibling: Option<H::Layer>,
        category: Category,
    ) {
        let origin = self.host.bounds(layer).origin();
        let released = self.clip_chain(container, layer);
        if let Err(e) = self.host.move_to_root(layer) {
            debug!("{layer:?}: cannot extract {category:?}: {e}");
            self.report.mutations_skipped += 1;
            return;
        }
        if !released.is_empty() {
            trace!("{container:?}: {} clipped layers released", released.len());
            self.clipping.push(ClippingRecord {
                container,
                layers: released,
            });
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!("{layer:?}: extracted {category:?} #{sequence} from {container:?}");
        self.pending.insert(layer, self.records.len());
        self.records.push(ExtractionRecord {
            layer,
            container,
            next_sibling,
            origin,
            category,
            sequence,
        });
        self.report.extracted += 1;
    }

    /// Clip states that detaching `layer` from `parent` releases, top to
    /// bottom: the clipped layers stacked directly above it, then `layer`
    /// itself if clipped. Layers already recorded are left out.
    fn clip_chain(&self, parent: H::Layer, layer: H::Layer) -> Vec<H::Layer> {
        let kids = self.host.children(parent);
        let Some(index) = kids.iter().position(|&k| k == layer) else {
            return Vec::new();
        };
        let mut chain: Vec<H::Layer> = kids[..index]
            .iter()
            .rev()
            .copied()
            .take_while(|&k| self.host.is_clipped(k))
            .collect();
        chain.reverse();
        if self.host.is_clipped(layer) {
            chain.push(layer);
        }
        chain.retain(|l| !self.clipping.iter().any(|r| r.layers.contains(l)));
        chain
    }

    // ── restoration ─────────────────────────────────────────────────────

    /// Restore pending records whose category matches, in sequence order.
    fn restore_where(&mut self, wanted: impl Fn(Category) -> bool) {
        let due: Vec<usize> = (0..self.records.len())
            .filter(|&i| {
                let record = &self.records[i];
                wanted(record.category) && self.pending.contains_key(&record.layer)
            })
            .collect();
        for i in due {
            self.restore(i);
        }
    }

    fn restore(&mut self, index: usize) {
        let record = self.records[index];
        self.pending.remove(&record.layer);

        let placed = match self.anchor_for(&record) {
            Some(sibling) => self.host.move_before(record.layer, sibling),
            None => self.host.move_into(record.layer, record.container),
        };
        if let Err(e) = placed {
            debug!("{:?}: cannot restore into {:?}: {e}", record.layer, record.container);
            self.report.mutations_skipped += 1;
            return;
        }
        self.report.restored += 1;

        if record.category == Category::Fixed {
            let now = self.host.bounds(record.layer).origin();
            self.translate_by(record.layer, now, record.origin);
        }
    }

    /// The layer to insert above: the recorded next sibling if it is back in
    /// the container, else that sibling's own recorded next sibling, and so
    /// on. `None` means the bottom of the container.
    fn anchor_for(&self, record: &ExtractionRecord<H::Layer>) -> Option<H::Layer> {
        let mut next = record.next_sibling;
        let mut hops = 0;
        while let Some(sibling) = next {
            if self.host.parent(sibling) == Some(record.container) {
                return Some(sibling);
            }
            let &i = self.pending.get(&sibling)?;
            next = self.records[i].next_sibling;
            hops += 1;
            if hops > self.records.len() {
                return None;
            }
        }
        None
    }

    fn restore_clipping(&mut self) {
        for r in 0..self.clipping.len() {
            for i in (0..self.clipping[r].layers.len()).rev() {
                let layer = self.clipping[r].layers[i];
                if self.host.is_clipped(layer) {
                    continue;
                }
                match self.host.set_clip_to_below(layer, true) {
                    Ok(()) => self.report.clips_restored += 1,
                    Err(e) => {
                        debug!("{layer:?}: cannot restore clipping: {e}");
                        self.report.mutations_skipped += 1;
                    }
                }
            }
        }
    }

    // ── layout ──────────────────────────────────────────────────────────

    fn layout_all(&mut self) {
        for i in 0..self.containers.len() {
            let container = self.containers[i].clone();
            self.layout(&container);
        }
    }

    fn layout(&mut self, container: &Container<H::Layer>) {
        let kids = self.host.children(container.layer);
        let configs: Vec<LayoutConfig> = kids.iter().map(|&k| self.parse(k)).collect();
        let inputs: Vec<ChildInput<'_>> = kids
            .iter()
            .zip(&configs)
            .map(|(&k, config)| {
                let rect = self.host.bounds(k);
                let kind = self.host.kind(k);
                // A group with nothing visible inside has no position to measure.
                let empty_group = kind.is_container() && rect.width() == 0.0 && rect.height() == 0.0;
                ChildInput {
                    rect,
                    config,
                    visible: self.host.is_visible(k) && kind.is_transformable() && !empty_group,
                }
            })
            .collect();

        let Some(outcome) = compute_layout(&inputs, &container.config) else {
            debug!("{:?}: nothing to lay out", container.layer);
            self.report.empty_containers += 1;
            return;
        };
        trace!(
            "{:?}: content {:?} interior {:?}",
            container.layer, outcome.content, outcome.interior
        );
        self.report.laid_out += 1;

        for ((&kid, input), target) in kids.iter().zip(&inputs).zip(&outcome.targets) {
            let Some(target) = *target else {
                continue;
            };
            if !self.host.kind(kid).is_transformable() {
                self.report.mutations_skipped += 1;
                continue;
            }
            self.apply(kid, input.rect, target);
        }
    }

    fn apply(&mut self, layer: H::Layer, current: Rect, target: Target) {
        match target {
            Target::Position(p) => self.translate_by(layer, current.origin(), p),
            Target::Frame(frame) => {
                if !current.size().approx_eq(frame.size(), self.options.epsilon) {
                    match self.host.resize_to(layer, frame.width(), frame.height()) {
                        Ok(()) => {
                            trace!("{layer:?}: resized to {:?}", frame.size());
                            self.report.mutations_applied += 1;
                        }
                        Err(e) => {
                            debug!("{layer:?}: resize skipped: {e}");
                            self.report.mutations_skipped += 1;
                        }
                    }
                }
                let now = self.host.bounds(layer).origin();
                self.translate_by(layer, now, frame.origin());
            }
        }
    }

    fn translate_by(&mut self, layer: H::Layer, from: Point, to: Point) {
        let Some((dx, dy)) = delta(from, to, self.options.epsilon) else {
            return;
        };
        match self.host.translate(layer, dx, dy) {
            Ok(()) => {
                trace!("{layer:?}: moved by ({dx}, {dy})");
                self.report.mutations_applied += 1;
            }
            Err(e) => {
                debug!("{layer:?}: translate skipped: {e}");
                self.report.mutations_skipped += 1;
            }
        }
    }

    fn round_corners(&mut self) {
        let root = self.host.root();
        let mut stack = vec![(root, 0usize)];
        while let Some((layer, depth)) = stack.pop() {
            if layer != root && self.parse(layer).is_rounded {
                match self.host.set_max_corner_radius(layer) {
                    Ok(()) => self.report.corners_rounded += 1,
                    Err(e) => debug!("{layer:?}: corner radius skipped: {e}"),
                }
            }
            if self.host.kind(layer).is_container() && depth < self.options.max_depth {
                for child in self.host.children(layer).into_iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    // ── backdrops ───────────────────────────────────────────────────────

    fn resize_backdrops(&mut self) {
        let extent = self.options.backdrop_extent.resolve(&*self.host);
        for layer in self.backdrops.clone() {
            match backdrop::resize_to_extent(&mut *self.host, layer, extent, self.options.epsilon) {
                Ok(applied) => {
                    trace!("{layer:?}: backdrop covers {extent:?}");
                    self.report.mutations_applied += applied;
                }
                Err(e) => {
                    debug!("{layer:?}: backdrop resize skipped: {e}");
                    self.report.mutations_skipped += 1;
                }
            }
        }
    }

    fn merge_backdrops(&mut self) {
        for layer in self.backdrops.clone() {
            let below = backdrop::layers_below(&*self.host, layer, self.options.max_depth);
            match backdrop::merge_below(&mut *self.host, layer, &below) {
                MergeOutcome::Merged { layers } => {
                    debug!("{layer:?}: merged {layers} layers");
                    self.report.backdrops_merged += 1;
                }
                MergeOutcome::Skipped(reason) => {
                    debug!("{layer:?}: backdrop merge skipped: {reason:?}");
                    self.report.backdrops_skipped += 1;
                }
            }
        }
    }
}
