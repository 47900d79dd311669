//! Canonical textual form for stylesheets.
//!
//! Normalization runs four steps:
//! 1. strip `/* ... */` comments
//! 2. beautify through a [`Formatter`] (one statement per line, semicolons added)
//! 3. compress the result onto a single line, exactly one space on each side of every `{`
//! 4. break the line after every `}` so each rule block sits on its own line
//!
//! The output of [`Normalizer::normalize`] is a fixed point of the same
//! pipeline, so stylesheets normalized by different runs compare equal.
//!
//! Steps 3 and 4 are plain text passes and do not track quotes. A brace
//! inside a string is spaced or broken like any other, so
//! `.a::after{content:"}"}` normalizes to `.a::after { content: "}\n"; }`.
//! Main and per-page stylesheets go through the same passes, so such rules
//! still compare equal, but the rewritten string literal differs from the
//! input.

use log::trace;

/// A CSS beautifier.
///
/// Given syntactically valid CSS, implementations return re-indented text with
/// one statement per line and semicolon-terminated declarations.
pub trait Formatter: Send + Sync {
    fn format(&self, css: &str) -> String;
}

/// Default [`Formatter`]: a small, dependency-free CSS pretty printer.
#[derive(Debug, Clone)]
pub struct Beautifier {
    indent: String,
    auto_semicolon: bool,
}

impl Default for Beautifier {
    fn default() -> Self {
        Self { indent: "  ".to_string(), auto_semicolon: true }
    }
}

impl Beautifier {
    pub fn new(indent: impl Into<String>, auto_semicolon: bool) -> Self {
        Self { indent: indent.into(), auto_semicolon }
    }

    fn push_line(&self, out: &mut String, depth: usize, line: &str) {
        for _ in 0..depth {
            out.push_str(&self.indent);
        }
        out.push_str(line);
        out.push('\n');
    }

    fn push_statement(&self, out: &mut String, depth: usize, raw: &str, terminate: bool) {
        let text = collapse_whitespace(raw);
        if text.is_empty() {
            return;
        }
        let mut line = if depth > 0 && !text.starts_with('@') {
            format_declaration(&text)
        } else {
            text
        };
        if terminate {
            line.push(';');
        }
        self.push_line(out, depth, &line);
    }
}

impl Formatter for Beautifier {
    fn format(&self, css: &str) -> String {
        let mut out = String::with_capacity(css.len() + css.len() / 4);
        let mut pending = String::new();
        let mut depth = 0usize;
        let mut parens = 0usize;
        let mut quote: Option<char> = None;
        let mut chars = css.chars();

        while let Some(ch) = chars.next() {
            if let Some(q) = quote {
                pending.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        pending.push(escaped);
                    }
                } else if ch == q {
                    quote = None;
                }
                continue;
            }

            match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    pending.push(ch);
                }
                '(' => {
                    parens += 1;
                    pending.push(ch);
                }
                ')' => {
                    parens = parens.saturating_sub(1);
                    pending.push(ch);
                }
                '{' if parens == 0 => {
                    let selector = collapse_whitespace(&pending);
                    let line =
                        if selector.is_empty() { "{".to_string() } else { format!("{selector} {{") };
                    self.push_line(&mut out, depth, &line);
                    pending.clear();
                    depth += 1;
                }
                ';' if parens == 0 => {
                    self.push_statement(&mut out, depth, &pending, true);
                    pending.clear();
                }
                '}' if parens == 0 => {
                    self.push_statement(&mut out, depth, &pending, self.auto_semicolon);
                    pending.clear();
                    depth = depth.saturating_sub(1);
                    self.push_line(&mut out, depth, "}");
                    if depth == 0 {
                        out.push('\n');
                    }
                }
                _ => pending.push(ch),
            }
        }

        let rest = collapse_whitespace(&pending);
        if !rest.is_empty() {
            self.push_line(&mut out, depth, &rest);
        }
        out
    }
}

/// `color:red` -> `color: red`. Only the first colon separates property and value.
fn format_declaration(text: &str) -> String {
    match text.split_once(':') {
        Some((property, value)) => format!("{}: {}", property.trim(), value.trim()),
        None => text.to_string(),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every `/* ... */` block. An unterminated comment is left in place.
pub fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + 2 + len + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Flattens formatted CSS onto one line with exactly one space on each side of every `{`.
fn compress(css: &str) -> String {
    collapse_whitespace(&css.replace('{', " { "))
}

/// Breaks the line after every `}` so each rule block sits on its own line.
fn expand(css: &str) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / 16);
    for ch in css.chars() {
        if ch == ' ' && out.ends_with('\n') {
            continue;
        }
        out.push(ch);
        if ch == '}' {
            out.push('\n');
        }
    }
    out
}

/// Produces the canonical one-rule-per-line form of a stylesheet.
pub struct Normalizer {
    formatter: Box<dyn Formatter>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Beautifier::default())
    }
}

impl Normalizer {
    pub fn new(formatter: impl Formatter + 'static) -> Self {
        Self { formatter: Box::new(formatter) }
    }

    pub fn normalize(&self, css: &str) -> String {
        let stripped = strip_comments(css);
        let formatted = self.formatter.format(&stripped);
        let normalized = expand(&compress(&formatted));
        trace!("Normalized {} bytes into {} bytes", css.len(), normalized.len());
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;

    impl Formatter for Identity {
        fn format(&self, css: &str) -> String {
            css.to_string()
        }
    }

    const SAMPLES: &[&str] = &[
        "body{margin:0}",
        "body{margin:0}\n.title{color:#000}",
        "/* header */\n.a , .b{ color : red ; background:url(data:image/png;base64,AAA=) }",
        "@import url('common.wxss');\n.page{padding:10rpx 20rpx;font-family:\"Helvetica Neue\", sans-serif}",
        "@media (max-width: 600px){.a{color:red}.b{color:blue;}}\n.c{}",
        "a:hover::after{content:'{ ; }';filter:progid:DXImageTransform.Microsoft.gradient(startColorstr=#1)}",
        "@font-face{font-family:x;src:url(\"a.woff\")}\n\n\n.x{width:calc(100% - 10px)!important}",
        ".empty{}\n.bad{color:}",
    ];

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = Normalizer::default();
        for sample in SAMPLES {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice, "normalize is not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_normalize_puts_one_rule_per_line() {
        let normalizer = Normalizer::default();
        let css = normalizer.normalize("body{margin:0}\n.title{color:#000}");
        assert_eq!(css, "body { margin: 0; }\n.title { color: #000; }\n");
    }

    #[test]
    fn test_normalize_strips_comments() {
        let normalizer = Normalizer::default();
        let css = normalizer.normalize("/* global */ body { margin: 0; /* reset */ }");
        assert_eq!(css, "body { margin: 0; }\n");
    }

    #[test]
    fn test_normalize_matches_differently_formatted_inputs() {
        let normalizer = Normalizer::default();
        let compact = normalizer.normalize(".a{color:red;background:blue}");
        let loose = normalizer.normalize(".a {\n    color :  red;\n\n    background: blue\n}\n");
        assert_eq!(compact, loose);
    }

    #[test]
    fn test_normalize_nested_blocks() {
        let normalizer = Normalizer::default();
        let css = normalizer.normalize("@media screen{.a{color:red}}");
        assert_eq!(css, "@media screen { .a { color: red; }\n}\n");
    }

    #[test]
    fn test_normalize_uses_injected_formatter() {
        let normalizer = Normalizer::new(Identity);
        let css = normalizer.normalize("a{color:red}\n\nb{color:blue}");
        assert_eq!(css, "a { color:red}\nb { color:blue}\n");
    }

    #[test]
    fn test_normalize_spaces_open_brace_for_any_formatter() {
        let normalizer = Normalizer::new(Identity);
        assert_eq!(normalizer.normalize("a   {x}\nb\t{y}"), "a { x}\nb { y}\n");
        assert_eq!(normalizer.normalize("a{b{x}}"), "a { b { x}\n}\n");
    }

    #[test]
    fn test_normalize_breaks_braces_inside_strings() {
        let normalizer = Normalizer::default();
        let css = normalizer.normalize(".a::after{content:\"}\"}");
        assert_eq!(css, ".a::after { content: \"}\n\"; }\n");
        assert_eq!(normalizer.normalize(&css), css);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(Normalizer::default().normalize(""), "");
        assert_eq!(Normalizer::default().normalize("  /* only a comment */ \n"), "");
    }

    #[test]
    fn test_beautifier_output() {
        let out = Beautifier::default().format("a,b{color:red;margin:0 auto}");
        assert_eq!(out, "a,b {\n  color: red;\n  margin: 0 auto;\n}\n\n");
    }

    #[test]
    fn test_beautifier_without_auto_semicolon() {
        let out = Beautifier::new("\t", false).format("a{color:red}");
        assert_eq!(out, "a {\n\tcolor: red\n}\n\n");
    }

    #[test]
    fn test_beautifier_keeps_semicolons_inside_parens_and_strings() {
        let out = Beautifier::default().format("a{background:url(data:a;b);content:\";\"}");
        assert_eq!(out, "a {\n  background: url(data:a;b);\n  content: \";\";\n}\n\n");
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a/* x */b/* y\n z */c"), "abc");
        assert_eq!(strip_comments("a /* open"), "a /* open");
        assert_eq!(strip_comments("/**/"), "");
    }
}
