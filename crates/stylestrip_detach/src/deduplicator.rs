use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use rayon::{ThreadPoolBuilder, prelude::*};
use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::Instant,
};

use stylestrip_core::{LightningMinifier, Minifier, Normalizer, StyleError, collect_styles, dedupe};

use crate::{
    config::{Config, DetachOptions},
    types::{FileOutcome, FileStatus, RunReport, RunStatus},
};

/// Resolves `cfg` and runs a single detach pass.
pub fn run_detach(cfg: Config) -> Result<RunReport> {
    info!("Starting style detach");
    let options = cfg.resolve()?;
    info!(
        "Running detach with strategy: {} (using {} threads)",
        options.strategy(),
        if options.jobs() == 0 { rayon::current_num_threads() } else { options.jobs() }
    );
    let report = StyleDeduplicator::new(options).run().context("Style detach failed")?;
    Ok(report)
}

/// Removes main-stylesheet rules from every collected per-page stylesheet.
///
/// The normalized main stylesheet is computed once and shared read-only by
/// all workers. Each per-page stylesheet is read, normalized, deduplicated,
/// optionally minified and written back in place.
pub struct StyleDeduplicator {
    options: DetachOptions,
    normalizer: Normalizer,
    minifier: Box<dyn Minifier>,
}

impl StyleDeduplicator {
    pub fn new(options: DetachOptions) -> Self {
        Self { options, normalizer: Normalizer::default(), minifier: Box::new(LightningMinifier) }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_minifier(mut self, minifier: impl Minifier + 'static) -> Self {
        self.minifier = Box::new(minifier);
        self
    }

    pub fn options(&self) -> &DetachOptions {
        &self.options
    }

    /// Entry point for bundler "build finished" hooks. The build result is not inspected.
    pub fn on_build_done<B: ?Sized>(&self, _build: &B) -> Result<RunReport, StyleError> {
        self.run()
    }

    pub fn run(&self) -> Result<RunReport, StyleError> {
        let start = Instant::now();
        let main_path = self.options.main_style_path();

        if !main_path.exists() {
            info!("{}, nothing to do", StyleError::MainStyleNotFound(main_path.to_path_buf()));
            return Ok(RunReport {
                main_style: main_path.to_path_buf(),
                base_dir: self.options.base_dir().to_path_buf(),
                status: RunStatus::MainStyleNotFound,
                files: Vec::new(),
                elapsed: start.elapsed(),
            });
        }

        info!("Processing started: detaching {}", main_path.display());
        let raw_main = read_style(main_path)?;
        let main_css = self.normalizer.normalize(&raw_main);
        debug!("Normalized main stylesheet: {} lines", main_css.lines().count());

        let files = self.collect(main_path)?;
        info!("Found {} stylesheets under {}", files.len(), self.options.base_dir().display());
        if self.options.debug() {
            for file in &files {
                info!("  {}", file.display());
            }
        }

        let outcomes = if self.options.fail_fast() {
            self.process_sequential(&files, &main_css, start)?
        } else {
            self.process_isolated(&files, &main_css, start)?
        };
        self.check_deadline(start)?;

        let main_out =
            if self.options.compress() { self.minifier.minify(&main_css)? } else { main_css };
        write_style(main_path, &main_out)?;

        let report = RunReport {
            main_style: main_path.to_path_buf(),
            base_dir: self.options.base_dir().to_path_buf(),
            status: RunStatus::Completed,
            files: outcomes,
            elapsed: start.elapsed(),
        };
        info!(
            "Completed: {} deduplicated, {} failed in {}ms",
            report.deduplicated_count(),
            report.failures().count(),
            report.elapsed.as_millis()
        );
        Ok(report)
    }

    fn collect(&self, main_path: &Path) -> Result<Vec<PathBuf>, StyleError> {
        let mut files =
            collect_styles(&self.options.collector_config(), self.options.base_dir(), false)?;

        let main_canonical = fs::canonicalize(main_path).ok();
        files.retain(|file| {
            let same = match (&main_canonical, fs::canonicalize(file)) {
                (Some(main), Ok(file)) => *main == file,
                _ => file == main_path,
            };
            if same {
                warn!(
                    "Main stylesheet {} lies inside a matched directory, skipping it",
                    file.display()
                );
            }
            !same
        });
        Ok(files)
    }

    /// Stops at the first failure and leaves the main stylesheet untouched.
    fn process_sequential(
        &self,
        files: &[PathBuf],
        main_css: &str,
        start: Instant,
    ) -> Result<Vec<FileOutcome>, StyleError> {
        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            self.check_deadline(start)?;
            let status = self.process_file(path, main_css)?;
            outcomes.push(FileOutcome { path: path.clone(), status });
        }
        Ok(outcomes)
    }

    /// Runs every stylesheet as its own unit on a bounded pool; failures are
    /// recorded in the outcome and do not stop the other units.
    fn process_isolated(
        &self,
        files: &[PathBuf],
        main_css: &str,
        start: Instant,
    ) -> Result<Vec<FileOutcome>, StyleError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.jobs())
            .build()
            .map_err(|e| StyleError::InvalidConfig(format!("cannot build worker pool: {e}")))?;
        info!("Processing {} stylesheets on {} threads", files.len(), pool.current_num_threads());

        let outcomes: Vec<Option<FileOutcome>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    if self.check_deadline(start).is_err() {
                        trace!("Deadline passed, skipping {}", path.display());
                        return None;
                    }
                    let thread_id = thread::current().id();
                    debug!("Thread {:?} processing: {}", thread_id, path.display());

                    let status = match self.process_file(path, main_css) {
                        Ok(status) => status,
                        Err(e) => {
                            warn!("Failed to process {}: {}", path.display(), e);
                            FileStatus::Failed(e)
                        }
                    };
                    Some(FileOutcome { path: path.clone(), status })
                })
                .collect()
        });

        if outcomes.iter().any(Option::is_none)
            && let Some(timeout) = self.options.timeout()
        {
            return Err(StyleError::DeadlineExceeded(timeout));
        }
        Ok(outcomes.into_iter().flatten().collect())
    }

    fn process_file(&self, path: &Path, main_css: &str) -> Result<FileStatus, StyleError> {
        let raw = read_style(path)?;
        let normalized = self.normalizer.normalize(&raw);
        let mut css = dedupe(self.options.strategy(), &normalized, main_css);
        if self.options.compress() {
            css = self.minifier.minify(&css)?;
        }
        write_style(path, &css)?;
        trace!("Rewrote {} ({} -> {} bytes)", path.display(), raw.len(), css.len());
        Ok(FileStatus::Deduplicated { bytes_before: raw.len(), bytes_after: css.len() })
    }

    fn check_deadline(&self, start: Instant) -> Result<(), StyleError> {
        match self.options.timeout() {
            Some(timeout) if start.elapsed() >= timeout => {
                Err(StyleError::DeadlineExceeded(timeout))
            }
            _ => Ok(()),
        }
    }
}

fn read_style(path: &Path) -> Result<String, StyleError> {
    fs::read_to_string(path).map_err(|e| StyleError::fs(path, e))
}

fn write_style(path: &Path, css: &str) -> Result<(), StyleError> {
    fs::write(path, css).map_err(|e| StyleError::fs(path, e))
}
