//! Core building blocks for stylestrip.
//!
//! This crate provides the pieces needed to strip globally shared rules out of
//! per-page stylesheets, including:
//! - Collecting per-page stylesheets from a build output tree
//! - Normalizing stylesheet text into a canonical one-rule-per-line form
//! - Removing main-stylesheet content from a per-page stylesheet
//! - Minifying the result through lightningcss
//!
//! # Limitations
//!
//! Normalization works on text, not on a parsed stylesheet. Only the
//! [`Beautifier`] step skips quoted strings; the later spacing of `{` and the
//! line break after `}` apply inside string literals too, so
//! `content:"}"` comes out as `content: "}\n"`. The `line-set`
//! [`DedupStrategy`] also works below rule granularity and drops any line that
//! coincides with a main-stylesheet line, even inside unrelated rules.

mod collector;
mod constants;
mod dedupe;
mod error;
mod minifier;
mod normalizer;

// Re-export public API
pub use collector::{CollectorConfig, collect_styles, dir_matches};
pub use constants::{DEFAULT_START_DIR, DEFAULT_STYLE_SUFFIX};
pub use dedupe::{DedupStrategy, dedupe, remove_by_lines, remove_by_substring};
pub use error::StyleError;
pub use minifier::{LightningMinifier, Minifier};
pub use normalizer::{Beautifier, Formatter, Normalizer, strip_comments};
