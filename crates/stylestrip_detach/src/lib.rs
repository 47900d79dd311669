//! Detach globally shared styles from per-page stylesheets.
//!
//! Bundlers for multi-page apps often repeat every rule of the main
//! stylesheet inside each page's stylesheet. This crate rewrites those
//! per-page files in place so they only keep their own rules, leaving the
//! shared ones to the main stylesheet.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use stylestrip_detach::{DetachOptions, StyleDeduplicator};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let options = DetachOptions::new("dist/common/main.wxss", "dist")
//!     .with_start_with_dir(["pages", "pagesMine"])
//!     .with_compress(true);
//!
//! let report = StyleDeduplicator::new(options).run()?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! stylestrip_detach::print_report(&mut stdout, &report)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Dedup strategies
//!
//! `substring` (the default) removes the normalized main stylesheet as one
//! block and only fires when a page repeats it verbatim. `line-set` removes
//! every line of a page that also appears in the main stylesheet. It is more
//! forgiving about ordering but works below rule granularity: a declaration
//! or closing brace that merely coincides with a main-stylesheet line is
//! dropped from unrelated rules too.
//!
//! Both strategies compare normalized text, and normalization is not
//! quote-aware past the beautifier: braces inside string literals are spaced
//! and line-broken like real ones (`content:"}"` is rewritten as
//! `content: "}\n"`).

mod config;
mod deduplicator;
mod reporter;
mod types;

// Re-export public API
pub use config::{Config, DetachOptions, FileConfig, StartWithDir, normalize_start_dirs};
pub use deduplicator::{StyleDeduplicator, run_detach};
pub use reporter::{print_main_missing, print_report};
pub use stylestrip_core::DedupStrategy;
pub use types::{FileOutcome, FileStatus, RunReport, RunStatus};
