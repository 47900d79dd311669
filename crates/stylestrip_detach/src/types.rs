use std::{path::PathBuf, time::Duration};

use stylestrip_core::StyleError;

#[derive(Debug)]
pub enum FileStatus {
    Deduplicated { bytes_before: usize, bytes_after: usize },
    Failed(StyleError),
}

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The main stylesheet was missing; no file was touched
    MainStyleNotFound,
}

#[derive(Debug)]
pub struct RunReport {
    pub main_style: PathBuf,
    /// Root the stylesheets were collected from
    pub base_dir: PathBuf,
    pub status: RunStatus,
    /// One outcome per collected stylesheet, in collection order
    pub files: Vec<FileOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn deduplicated_count(&self) -> usize {
        self.files.iter().filter(|f| matches!(f.status, FileStatus::Deduplicated { .. })).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &StyleError)> {
        self.files.iter().filter_map(|f| match &f.status {
            FileStatus::Failed(err) => Some((&f.path, err)),
            FileStatus::Deduplicated { .. } => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn bytes_saved(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.status {
                FileStatus::Deduplicated { bytes_before, bytes_after } => {
                    bytes_before.saturating_sub(bytes_after)
                }
                FileStatus::Failed(_) => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn report() -> RunReport {
        RunReport {
            main_style: PathBuf::from("common/main.wxss"),
            base_dir: PathBuf::from("."),
            status: RunStatus::Completed,
            files: vec![
                FileOutcome {
                    path: PathBuf::from("pages/a.wxss"),
                    status: FileStatus::Deduplicated { bytes_before: 120, bytes_after: 20 },
                },
                FileOutcome {
                    path: PathBuf::from("pages/b.wxss"),
                    status: FileStatus::Failed(StyleError::fs(
                        "pages/b.wxss",
                        io::Error::from(io::ErrorKind::PermissionDenied),
                    )),
                },
                FileOutcome {
                    path: PathBuf::from("pages/c.wxss"),
                    status: FileStatus::Deduplicated { bytes_before: 10, bytes_after: 15 },
                },
            ],
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.deduplicated_count(), 2);
        assert!(report.has_failures());
        let failed: Vec<_> = report.failures().map(|(p, _)| p.clone()).collect();
        assert_eq!(failed, vec![PathBuf::from("pages/b.wxss")]);
    }

    #[test]
    fn test_bytes_saved_ignores_growth() {
        assert_eq!(report().bytes_saved(), 100);
    }
}
