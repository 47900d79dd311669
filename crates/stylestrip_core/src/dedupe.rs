use log::trace;
use serde::Deserialize;
use std::{collections::HashSet, fmt, str::FromStr};

use crate::error::StyleError;

/// How main-stylesheet content is removed from a per-page stylesheet.
///
/// Both strategies expect their inputs to have gone through the same
/// normalizer beforehand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupStrategy {
    /// Remove the whole main stylesheet as one literal block.
    #[default]
    Substring,
    /// Remove every line that also appears in the main stylesheet.
    ///
    /// This works below rule granularity: a lone `}` or a declaration such as
    /// `color: red;` that happens to match a main-stylesheet line is removed
    /// even when it belongs to an unrelated rule.
    LineSet,
}

impl FromStr for DedupStrategy {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(DedupStrategy::Substring),
            "line-set" | "lineset" | "line_set" => Ok(DedupStrategy::LineSet),
            other => Err(StyleError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for DedupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupStrategy::Substring => f.write_str("substring"),
            DedupStrategy::LineSet => f.write_str("line-set"),
        }
    }
}

/// Removes `main` content from `target` using `strategy`.
pub fn dedupe(strategy: DedupStrategy, target: &str, main: &str) -> String {
    match strategy {
        DedupStrategy::Substring => remove_by_substring(target, main),
        DedupStrategy::LineSet => remove_by_lines(target, main),
    }
}

/// Removes the first exact occurrence of `main` from `target`.
///
/// A single differing character between the two texts means nothing is removed.
pub fn remove_by_substring(target: &str, main: &str) -> String {
    if main.is_empty() || !target.contains(main) {
        trace!("Main stylesheet not found verbatim in target");
        return target.to_string();
    }
    target.replacen(main, "", 1)
}

/// Keeps only the lines of `target` whose trimmed form does not occur in `main`.
///
/// Surviving lines keep their original whitespace and are joined with `\n`.
pub fn remove_by_lines(target: &str, main: &str) -> String {
    let shared: HashSet<&str> =
        main.split('\n').map(str::trim).filter(|line| !line.is_empty()).collect();
    if shared.is_empty() {
        return target.to_string();
    }

    let kept: Vec<&str> = target.split('\n').filter(|line| !shared.contains(line.trim())).collect();
    trace!("Line-set removal kept {} of {} lines", kept.len(), target.split('\n').count());
    kept.join("\n")
}
