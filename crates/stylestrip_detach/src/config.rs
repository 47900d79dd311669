use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use path_clean::PathClean;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use stylestrip_core::{
    CollectorConfig, DEFAULT_START_DIR, DEFAULT_STYLE_SUFFIX, DedupStrategy, StyleError,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "detach")]
#[command(about = "Strip rules shared with the main stylesheet out of per-page stylesheets")]
pub struct Config {
    /// Path to the main stylesheet holding globally shared rules
    #[arg(long)]
    pub main_style: Option<PathBuf>,

    /// Root directory of the build output to scan
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Directory names (or name prefixes) rooting per-page subtrees [default: pages]
    #[arg(long, value_delimiter = ',')]
    pub start_with_dir: Vec<String>,

    /// File name suffix of per-page stylesheets [default: .wxss]
    #[arg(long)]
    pub end_with_file: Option<String>,

    /// Require directory names to equal a --start-with-dir entry instead of starting with it
    #[arg(long)]
    pub full_match: bool,

    /// Log the collected stylesheet list before processing
    #[arg(long)]
    pub debug: bool,

    /// Minify every rewritten stylesheet, including the main one
    #[arg(long)]
    pub compress: bool,

    /// Removal strategy: `substring` or `line-set` [default: substring].
    /// `line-set` removes every line that also appears in the main stylesheet,
    /// including lone declarations or braces belonging to unrelated rules
    #[arg(long)]
    pub strategy: Option<DedupStrategy>,

    /// Stop at the first stylesheet that fails instead of continuing with the rest
    #[arg(long)]
    pub fail_fast: bool,

    /// Number of worker threads (0 uses one per CPU)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Abort the run when it takes longer than this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// JSON file with options (mainStylePath, baseDir, startWithDir, ...)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Merges command line values over the optional JSON file into run options.
    pub fn resolve(self) -> Result<DetachOptions> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let main_style_path = self.main_style.or(file.main_style_path).ok_or_else(|| {
            StyleError::InvalidConfig(
                "missing main stylesheet path (--main-style or mainStylePath)".to_string(),
            )
        })?;
        let base_dir = self.base_dir.or(file.base_dir).ok_or_else(|| {
            StyleError::InvalidConfig("missing base directory (--base-dir or baseDir)".to_string())
        })?;

        let start_with_dir = if self.start_with_dir.is_empty() {
            file.start_with_dir.map(StartWithDir::into_vec).unwrap_or_default()
        } else {
            self.start_with_dir
        };

        let mut options = DetachOptions::new(main_style_path, base_dir)
            .with_start_with_dir(start_with_dir)
            .with_full_match(self.full_match || file.full_match)
            .with_debug(self.debug || file.debug)
            .with_compress(self.compress || file.compress)
            .with_strategy(self.strategy.or(file.strategy).unwrap_or_default())
            .with_fail_fast(self.fail_fast || file.fail_fast)
            .with_jobs(self.jobs.or(file.jobs).unwrap_or(0));
        if let Some(suffix) = self.end_with_file.or(file.end_with_file) {
            options = options.with_end_with_file(suffix);
        }
        if let Some(secs) = self.timeout_secs.or(file.timeout_secs) {
            options = options.with_timeout(Duration::from_secs(secs));
        }

        info!("Using main stylesheet: {}", options.main_style_path.display());
        info!("Using base directory: {}", options.base_dir.display());
        debug!("Resolved options: {:?}", options);
        Ok(options)
    }
}

/// `startWithDir` accepts either a single name or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StartWithDir {
    One(String),
    Many(Vec<String>),
}

impl StartWithDir {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            StartWithDir::One(name) => vec![name],
            StartWithDir::Many(names) => names,
        }
    }
}

/// Options as written in a JSON configuration file.
///
/// Keys follow the camelCase names used by the bundler plugin this tool
/// replaces, so an existing options object can be pasted in unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileConfig {
    pub main_style_path: Option<PathBuf>,
    pub base_dir: Option<PathBuf>,
    pub start_with_dir: Option<StartWithDir>,
    pub end_with_file: Option<String>,
    pub full_match: bool,
    pub debug: bool,
    pub compress: bool,
    pub strategy: Option<DedupStrategy>,
    pub fail_fast: bool,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Reads a JSON config file. Relative paths inside it are resolved against
    /// the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading config file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut cfg: FileConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.main_style_path = cfg.main_style_path.map(|p| dir.join(p).clean());
        cfg.base_dir = cfg.base_dir.map(|p| dir.join(p).clean());
        Ok(cfg)
    }
}

/// Drops empty names and falls back to the default start directory when
/// nothing is left, so the list is never empty.
pub fn normalize_start_dirs<I, S>(dirs: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let dirs: Vec<String> =
        dirs.into_iter().map(Into::into).filter(|d| !d.trim().is_empty()).collect();
    if dirs.is_empty() { vec![DEFAULT_START_DIR.to_string()] } else { dirs }
}

/// Immutable options for a single detach run.
#[derive(Debug, Clone)]
pub struct DetachOptions {
    main_style_path: PathBuf,
    base_dir: PathBuf,
    start_with_dir: Vec<String>,
    end_with_file: String,
    full_match: bool,
    debug: bool,
    compress: bool,
    strategy: DedupStrategy,
    fail_fast: bool,
    jobs: usize,
    timeout: Option<Duration>,
}

impl DetachOptions {
    pub fn new(main_style_path: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            main_style_path: main_style_path.into().clean(),
            base_dir: base_dir.into().clean(),
            start_with_dir: vec![DEFAULT_START_DIR.to_string()],
            end_with_file: DEFAULT_STYLE_SUFFIX.to_string(),
            full_match: false,
            debug: false,
            compress: false,
            strategy: DedupStrategy::default(),
            fail_fast: false,
            jobs: 0,
            timeout: None,
        }
    }

    pub fn with_start_with_dir<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_with_dir = normalize_start_dirs(dirs);
        self
    }

    /// An empty suffix keeps the default.
    pub fn with_end_with_file(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if !suffix.is_empty() {
            self.end_with_file = suffix;
        }
        self
    }

    pub fn with_full_match(mut self, full_match: bool) -> Self {
        self.full_match = full_match;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_strategy(mut self, strategy: DedupStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn main_style_path(&self) -> &Path {
        &self.main_style_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn start_with_dir(&self) -> &[String] {
        &self.start_with_dir
    }

    pub fn end_with_file(&self) -> &str {
        &self.end_with_file
    }

    pub fn full_match(&self) -> bool {
        self.full_match
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn compress(&self) -> bool {
        self.compress
    }

    pub fn strategy(&self) -> DedupStrategy {
        self.strategy
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            start_with_dir: self.start_with_dir.clone(),
            end_with_file: self.end_with_file.clone(),
            full_match: self.full_match,
        }
    }
}
