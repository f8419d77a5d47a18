//! Layer-name tokenizer and token parsers.
//!
//! A qualifying name starts with the marker (`.`); the remainder is split on
//! markers and whitespace into segments that are interpreted independently.

use alloc::string::String;
use alloc::vec::Vec;

use super::ParseWarning;
use super::config::{Align, Direction, Justify, LayoutConfig, Padding};

/// Leading character that makes a layer name carry layout rules.
pub(crate) const MARKER: char = '.';

/// Parse a layer name into a config, the warnings raised, and whether the
/// name declares a layout container.
pub(crate) fn parse_name(name: &str) -> (LayoutConfig, Vec<ParseWarning>, bool) {
    let mut config = LayoutConfig::default();
    let mut warnings = Vec::new();
    let mut is_container = false;

    let Some(rest) = name.strip_prefix(MARKER) else {
        return (config, warnings, false);
    };

    let mut seen_direction = false;
    let mut seen_items = false;
    let mut seen_justify = false;

    for segment in split_segments(rest) {
        let token = segment.to_ascii_lowercase();
        match token.as_str() {
            "hstack" | "vstack" => {
                let dir = if token == "hstack" {
                    Direction::Row
                } else {
                    Direction::Column
                };
                if seen_direction && config.direction != Some(dir) {
                    warnings.push(ParseWarning::Overridden {
                        token: String::from(segment),
                    });
                }
                seen_direction = true;
                config.direction = Some(dir);
                is_container = true;
            }
            "content" => config.is_content = true,
            "resize" => config.content_resizes = true,
            "rounded" => config.is_rounded = true,
            "fixed" => config.is_fixed = true,
            "relative" => config.is_relative = true,
            "backdrop" => config.is_backdrop = true,
            _ => {
                if let Some(align) = token.strip_prefix("items-").and_then(parse_align) {
                    if seen_items && config.items != align {
                        warnings.push(ParseWarning::Overridden {
                            token: String::from(segment),
                        });
                    }
                    seen_items = true;
                    config.items = align;
                } else if let Some(justify) =
                    token.strip_prefix("justify-").and_then(parse_justify)
                {
                    if seen_justify && config.justify != justify {
                        warnings.push(ParseWarning::Overridden {
                            token: String::from(segment),
                        });
                    }
                    seen_justify = true;
                    config.justify = justify;
                } else if let Some(args) = call_args(&token, "gap") {
                    config.gap = match parse_non_negative(args) {
                        Some(v) => v,
                        None => {
                            warnings.push(ParseWarning::ValueInvalid {
                                token: String::from(segment),
                                reason: "expected gap(n) with a non-negative integer",
                            });
                            0.0
                        }
                    };
                } else if let Some(args) = call_args(&token, "padding") {
                    is_container = true;
                    config.padding = match parse_padding(args) {
                        Some(p) => p,
                        None => {
                            warnings.push(ParseWarning::ValueInvalid {
                                token: String::from(segment),
                                reason: "expected padding(a), padding(v,h) or padding(t,r,b,l)",
                            });
                            Padding::default()
                        }
                    };
                } else {
                    warnings.push(ParseWarning::TokenNotRecognized {
                        token: String::from(segment),
                    });
                }
            }
        }
    }

    (config, warnings, is_container)
}

/// Split on markers and whitespace outside parentheses, dropping empty segments.
fn split_segments(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c == MARKER || c.is_whitespace()) => {
                segments.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    segments.push(&s[start..]);
    segments.retain(|seg| !seg.is_empty());
    segments
}

/// For `name(args)`, return `args`. Also accepts a missing closing paren.
fn call_args<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    let rest = token.strip_prefix(name)?.strip_prefix('(')?;
    Some(rest.strip_suffix(')').unwrap_or(rest))
}

fn parse_align(s: &str) -> Option<Align> {
    match s {
        "start" => Some(Align::Start),
        "center" => Some(Align::Center),
        "end" => Some(Align::End),
        _ => None,
    }
}

fn parse_justify(s: &str) -> Option<Justify> {
    match s {
        "start" => Some(Justify::Start),
        "center" => Some(Justify::Center),
        "end" => Some(Justify::End),
        "between" => Some(Justify::Between),
        _ => None,
    }
}

fn parse_non_negative(s: &str) -> Option<f64> {
    s.trim().parse::<u32>().ok().map(f64::from)
}

fn parse_padding(s: &str) -> Option<Padding> {
    let parts: Vec<&str> = s.split(',').collect();
    let mut vals = [0.0; 4];
    if parts.len() > vals.len() {
        return None;
    }
    for (slot, part) in vals.iter_mut().zip(&parts) {
        *slot = parse_non_negative(part)?;
    }
    match parts.len() {
        1 => Some(Padding::all(vals[0])),
        2 => Some(Padding::symmetric(vals[0], vals[1])),
        4 => Some(Padding::new(vals[0], vals[1], vals[2], vals[3])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: &str) -> LayoutConfig {
        parse_name(name).0
    }

    // ── qualification ───────────────────────────────────────────────────

    #[test]
    fn unmarked_name_is_default() {
        let (c, warnings, container) = parse_name("hstack gap(8)");
        assert_eq!(c, LayoutConfig::default());
        assert!(warnings.is_empty());
        assert!(!container);
    }

    #[test]
    fn bare_marker_is_default() {
        let (c, warnings, container) = parse_name(".");
        assert_eq!(c, LayoutConfig::default());
        assert!(warnings.is_empty());
        assert!(!container);
    }

    // ── tokens ──────────────────────────────────────────────────────────

    #[test]
    fn direction_tokens() {
        assert_eq!(config(".hstack").direction, Some(Direction::Row));
        assert_eq!(config(".vstack").direction, Some(Direction::Column));
        assert_eq!(config(".content").direction, None);
    }

    #[test]
    fn flags() {
        let c = config(".content.resize.rounded");
        assert!(c.is_content);
        assert!(c.content_resizes);
        assert!(c.is_rounded);
        assert!(!c.is_fixed);

        let c = config(".fixed");
        assert!(c.is_fixed && c.is_out_of_flow());
        assert!(config(".relative").is_relative);
        assert!(config(".backdrop").is_backdrop);
    }

    #[test]
    fn alignment_tokens() {
        let c = config(".hstack.items-center.justify-between");
        assert_eq!(c.items, Align::Center);
        assert_eq!(c.justify, Justify::Between);
        assert_eq!(config(".vstack.items-end").items, Align::End);
        assert_eq!(config(".vstack.justify-end").justify, Justify::End);
    }

    #[test]
    fn whitespace_separated_segments() {
        let c = config(".hstack gap(4) items-center");
        assert_eq!(c.direction, Some(Direction::Row));
        assert_eq!(c.gap, 4.0);
        assert_eq!(c.items, Align::Center);
    }

    #[test]
    fn tokens_are_case_insensitive() {
        let c = config(".HStack.Gap(3)");
        assert_eq!(c.direction, Some(Direction::Row));
        assert_eq!(c.gap, 3.0);
    }

    // ── gap / padding ───────────────────────────────────────────────────

    #[test]
    fn gap_integer() {
        assert_eq!(config(".hstack.gap(12)").gap, 12.0);
    }

    #[test]
    fn gap_malformed_is_zero() {
        let (c, warnings, _) = parse_name(".hstack.gap(abc)");
        assert_eq!(c.gap, 0.0);
        assert!(matches!(warnings[0], ParseWarning::ValueInvalid { .. }));

        assert_eq!(config(".hstack.gap(-4)").gap, 0.0);
    }

    #[test]
    fn padding_one_two_four() {
        assert_eq!(config(".padding(8)").padding, Padding::all(8.0));
        assert_eq!(
            config(".padding(8,16)").padding,
            Padding::new(8.0, 16.0, 8.0, 16.0)
        );
        assert_eq!(
            config(".padding(1, 2, 3, 4)").padding,
            Padding::new(1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn padding_three_values_is_zero() {
        let (c, warnings, container) = parse_name(".padding(1,2,3)");
        assert_eq!(c.padding, Padding::default());
        assert_eq!(warnings.len(), 1);
        // Still a padding token, so still a container.
        assert!(container);
    }

    #[test]
    fn padding_bad_value_is_zero() {
        assert_eq!(config(".padding(4,x)").padding, Padding::default());
        assert_eq!(config(".padding()").padding, Padding::default());
    }

    // ── precedence ──────────────────────────────────────────────────────

    #[test]
    fn later_direction_wins() {
        let (c, warnings, _) = parse_name(".hstack.vstack");
        assert_eq!(c.direction, Some(Direction::Column));
        assert!(matches!(
            &warnings[0],
            ParseWarning::Overridden { token } if token == "vstack"
        ));
    }

    #[test]
    fn later_alignment_wins() {
        let c = config(".vstack.items-end.items-start.justify-center.justify-end");
        assert_eq!(c.items, Align::Start);
        assert_eq!(c.justify, Justify::End);
    }

    #[test]
    fn repeated_identical_token_no_warning() {
        let (_, warnings, _) = parse_name(".hstack.hstack");
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_token_warns_and_is_ignored() {
        let (c, warnings, container) = parse_name(".hstack.wrap");
        assert_eq!(c.direction, Some(Direction::Row));
        assert!(container);
        assert!(matches!(
            &warnings[0],
            ParseWarning::TokenNotRecognized { token } if token == "wrap"
        ));
    }

    // ── container predicate ─────────────────────────────────────────────

    #[test]
    fn container_requires_direction_or_padding() {
        assert!(parse_name(".hstack").2);
        assert!(parse_name(".vstack").2);
        assert!(parse_name(".padding(4)").2);
        assert!(!parse_name(".content").2);
        assert!(!parse_name(".gap(4).items-center").2);
        assert!(!parse_name(".fixed").2);
    }
}
