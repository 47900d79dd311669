//! Defaults shared by the collector and the configuration layer.
//!
//! The values match the layout produced by mini-program builds, where every
//! page lives under `pages/` and stylesheets carry the `.wxss` suffix.

/// Directory name that roots the per-page subtree when none is configured
pub const DEFAULT_START_DIR: &str = "pages";

/// File name suffix of per-page stylesheets when none is configured
pub const DEFAULT_STYLE_SUFFIX: &str = ".wxss";
