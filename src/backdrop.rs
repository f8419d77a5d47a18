//! Backdrop merge protocol.
//!
//! A backdrop is a layer marked `backdrop` whose content container (itself if
//! it is a smart object, otherwise its first smart-object child) is refilled
//! with a flattened copy of every visible layer below it in the document.
//! The source layers are never modified.

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, warn};

use crate::geometry::{Rect, delta};
use crate::host::{EditContext, Host, HostError, Operation};
use crate::rules;

/// Why a backdrop merge did not happen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The backdrop has no smart-object content container.
    NotMergeable,
    /// No eligible layer lies below the backdrop.
    NothingBelow,
    /// A step of the nested edit failed; any opened edit was discarded.
    Failed(HostError),
}

/// Outcome of [`merge_below`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The content container now holds a flattened copy of `layers` layers.
    Merged { layers: usize },
    Skipped(SkipReason),
}

/// Whether a layer's name marks it as a backdrop.
pub fn is_backdrop<H: Host + ?Sized>(host: &H, layer: H::Layer) -> bool {
    rules::parse(&host.name(layer)).is_backdrop
}

/// The layer whose contents a merge replaces: the backdrop itself when it is
/// mergeable, else its first mergeable direct child.
pub fn content_container<H: Host + ?Sized>(host: &H, backdrop: H::Layer) -> Option<H::Layer> {
    let kind = host.kind(backdrop);
    if kind.is_mergeable() {
        return Some(backdrop);
    }
    if !kind.is_container() {
        return None;
    }
    host.children(backdrop)
        .into_iter()
        .find(|&child| host.kind(child).is_mergeable())
}

/// Stretch the backdrop's content container to exactly cover `extent`.
///
/// Resizes first, then moves the top-left corner onto the extent's. Changes
/// smaller than `epsilon` are skipped. Returns how many mutations were
/// applied.
pub fn resize_to_extent<H: Host + ?Sized>(
    host: &mut H,
    backdrop: H::Layer,
    extent: Rect,
    epsilon: f64,
) -> Result<usize, HostError> {
    let Some(target) = content_container(host, backdrop) else {
        return Err(HostError::Unsupported(Operation::Resize));
    };
    let mut applied = 0;
    let current = host.bounds(target);
    if !current.size().approx_eq(extent.size(), epsilon) {
        host.resize_to(target, extent.width(), extent.height())?;
        applied += 1;
    }
    let now = host.bounds(target).origin();
    if let Some((dx, dy)) = delta(now, extent.origin(), epsilon) {
        host.translate(target, dx, dy)?;
        applied += 1;
    }
    Ok(applied)
}

/// Every layer below `backdrop` in document order that should appear in its
/// merged copy.
///
/// Walks the tree top to bottom with an explicit stack. Eligible layers are
/// visible (with every ancestor visible), are not groups, and are neither a
/// backdrop nor inside one. Nothing deeper than `max_depth` is visited.
pub fn layers_below<H: Host + ?Sized>(
    host: &H,
    backdrop: H::Layer,
    max_depth: usize,
) -> Vec<H::Layer> {
    let mut below = Vec::new();
    let mut passed = false;
    let mut truncated = false;
    let mut stack = vec![(host.root(), 0usize)];

    while let Some((layer, depth)) = stack.pop() {
        if layer == backdrop {
            passed = true;
            continue;
        }
        if depth > 0 && (!host.is_visible(layer) || is_backdrop(host, layer)) {
            continue;
        }
        let kind = host.kind(layer);
        if kind.is_container() {
            if depth >= max_depth {
                truncated = true;
                continue;
            }
            for child in host.children(layer).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        } else if passed {
            below.push(layer);
        }
    }

    if truncated {
        warn!("backdrop {backdrop:?}: layers deeper than {max_depth} were not merged");
    }
    below
}

/// Merge `below` into the backdrop's content container.
///
/// Snapshots the sources, opens the container, replaces its contents and
/// closes it again. If any step fails the nested edit is closed without
/// committing and the merge is reported as skipped.
pub fn merge_below<H: Host + ?Sized>(
    host: &mut H,
    backdrop: H::Layer,
    below: &[H::Layer],
) -> MergeOutcome {
    let Some(target) = content_container(host, backdrop) else {
        return MergeOutcome::Skipped(SkipReason::NotMergeable);
    };
    if below.is_empty() {
        return MergeOutcome::Skipped(SkipReason::NothingBelow);
    }

    let mut ctx = EditContext::new(target);
    match run_merge(host, &mut ctx, below) {
        Ok(()) => MergeOutcome::Merged {
            layers: below.len(),
        },
        Err(e) => {
            if ctx.open {
                if let Err(close) = host.close_contents(&ctx, false) {
                    debug!("backdrop {backdrop:?}: discarding edit failed: {close}");
                }
                ctx.open = false;
            }
            MergeOutcome::Skipped(SkipReason::Failed(e))
        }
    }
}

fn run_merge<H: Host + ?Sized>(
    host: &mut H,
    ctx: &mut EditContext<H::Layer>,
    below: &[H::Layer],
) -> Result<(), HostError> {
    let snapshot = host.snapshot_merged(ctx, below)?;
    host.open_contents(ctx)?;
    ctx.open = true;
    host.replace_contents(ctx, snapshot)?;
    host.close_contents(ctx, true)?;
    ctx.open = false;
    Ok(())
}
