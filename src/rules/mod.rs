//! Layer-name rule parsing.
//!
//! Turns class-style layer names like `.hstack.gap(8).padding(16,24)` into a
//! [`LayoutConfig`]. Malformed arguments never fail the parse: they resolve
//! to zero and surface as [`ParseWarning`]s.
//!
//! # Example
//!
//! ```
//! use zenflex::rules::{self, Direction, Justify};
//!
//! let result = rules::parse_with_warnings(".hstack.gap(8).justify-between");
//! assert!(result.warnings.is_empty());
//! assert!(result.is_container);
//! assert_eq!(result.config.direction, Some(Direction::Row));
//! assert_eq!(result.config.gap, 8.0);
//! assert_eq!(result.config.justify, Justify::Between);
//!
//! // A role marker is not a container on its own.
//! assert!(!rules::is_layout_container(".content"));
//! ```

mod config;
mod parse;

pub use config::{Align, Direction, Justify, LayoutConfig, Padding};

use alloc::string::String;
use alloc::vec::Vec;

/// Result of parsing a layer name.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed layout rules.
    pub config: LayoutConfig,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
    /// Whether the name declares a layout container
    /// (marker-prefixed with `hstack`, `vstack` or `padding(...)`).
    pub is_container: bool,
}

/// Non-fatal warning from layer-name parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A mutually exclusive token replaced an earlier one (later wins).
    Overridden { token: String },
    /// A segment was not recognized and was ignored.
    TokenNotRecognized { token: String },
    /// A token was recognized but its argument could not be parsed; zero was used.
    ValueInvalid {
        token: String,
        reason: &'static str,
    },
}

/// Parse a layer name, discarding warnings.
pub fn parse(name: &str) -> LayoutConfig {
    parse::parse_name(name).0
}

/// Parse a layer name and keep any non-fatal warnings.
pub fn parse_with_warnings(name: &str) -> ParseResult {
    let (config, warnings, is_container) = parse::parse_name(name);
    ParseResult {
        config,
        warnings,
        is_container,
    }
}

/// Whether `name` declares a layout container.
pub fn is_layout_container(name: &str) -> bool {
    parse::parse_name(name).2
}
