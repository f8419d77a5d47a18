//! Flexbox-style layout for design-document layer trees.
//!
//! Layout rules live in layer names (`.hstack.gap(8).padding(16)`). A pass
//! finds every container carrying rules, takes fixed, relative, backdrop and
//! adjustment layers out of flow, lays containers out deepest first, then
//! puts the out-of-flow layers back with their stacking, clipping and (for
//! fixed layers) canvas position intact. Re-running a pass on its own output
//! changes nothing.
//!
//! # Modules
//!
//! - [`rules`]: layer-name parsing into [`LayoutConfig`]
//! - [`geometry`]: rectangles, points, sizes, epsilon-aware deltas
//! - [`calc`]: single-container flex distribution
//! - [`host`]: the [`Host`] trait a document implements
//! - [`engine`]: the out-of-flow orchestrator ([`Engine::run`])
//! - [`backdrop`]: flattening the layers below a backdrop into it
//! - [`memory`]: an in-memory [`Host`] for tests and dry runs
//!
//! # Example
//!
//! ```
//! use zenflex::host::{Host, LayerKind};
//! use zenflex::memory::MemoryDocument;
//! use zenflex::{Engine, EngineOptions, PassOutcome, Rect};
//!
//! let mut doc = MemoryDocument::new(400.0, 300.0);
//! let root = doc.root();
//! let row = doc.add_group(root, ".hstack.gap(5)");
//! let a = doc.add_layer(row, "a", LayerKind::Shape, Rect::new(0.0, 0.0, 10.0, 10.0));
//! let b = doc.add_layer(row, "b", LayerKind::Shape, Rect::new(50.0, 0.0, 70.0, 10.0));
//!
//! let outcome = Engine::new(EngineOptions::new()).run(&mut doc);
//! assert!(matches!(outcome, PassOutcome::Completed(_)));
//! assert_eq!(doc.bounds(b), Rect::new(15.0, 0.0, 35.0, 10.0));
//! assert_eq!(doc.bounds(a), Rect::new(0.0, 0.0, 10.0, 10.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod backdrop;
pub mod calc;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod memory;
pub mod options;
pub mod rules;

pub use calc::{ChildInput, LayoutOutcome, Target, compute_layout};
pub use engine::{
    Category, ClippingRecord, Engine, ExtractionRecord, PassOutcome, PassReport, Phase,
};
pub use geometry::{Point, Rect, Size};
pub use host::{EditContext, Host, HostError, LayerKind, Operation};
pub use options::{BackdropExtent, EngineOptions};
pub use rules::{Align, Direction, Justify, LayoutConfig, Padding};
