use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use log::trace;

use crate::error::StyleError;

/// A CSS minifier. Implementations may reorder or merge rules but must keep
/// the stylesheet's meaning.
pub trait Minifier: Send + Sync {
    fn minify(&self, css: &str) -> Result<String, StyleError>;
}

/// [`Minifier`] backed by lightningcss.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningMinifier;

impl Minifier for LightningMinifier {
    fn minify(&self, css: &str) -> Result<String, StyleError> {
        let mut sheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| StyleError::MalformedInput(e.to_string()))?;
        sheet
            .minify(MinifyOptions::default())
            .map_err(|e| StyleError::MalformedInput(e.to_string()))?;
        let printed = sheet
            .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
            .map_err(|e| StyleError::MalformedInput(e.to_string()))?;
        trace!("Minified {} bytes into {} bytes", css.len(), printed.code.len());
        Ok(printed.code)
    }
}
