//! Errors raised while generating or checking workflows.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::matrix::MatrixError;
use crate::naming::JobId;
use crate::platform::PlatformError;
use crate::template::ReleaseBodyError;

/// Violations of the job graph's registration rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  #[error("job {0} registered twice")]
  DuplicateJob(JobId),

  #[error("job {0} depends on itself")]
  SelfDependency(JobId),

  #[error("job {job} needs {need}, which is not registered before it")]
  UnknownDependency { job: JobId, need: JobId },

  #[error("dependency cycle detected")]
  CycleDetected,
}

/// A committed workflow that differs from freshly generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftedFile {
  pub path: PathBuf,
  /// SHA-256 of the committed file, `None` when it is missing.
  pub committed: Option<String>,
  /// SHA-256 of the generated content.
  pub generated: String,
}

impl fmt::Display for DriftedFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.committed {
      Some(committed) => write!(
        f,
        "{} (committed {}, generated {})",
        self.path.display(),
        committed,
        self.generated
      ),
      None => write!(f, "{} (missing, generated {})", self.path.display(), self.generated),
    }
  }
}

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Platform(#[from] PlatformError),

  #[error("invalid matrix: {0}")]
  Matrix(#[from] MatrixError),

  #[error("invalid job graph: {0}")]
  Graph(#[from] GraphError),

  #[error("invalid release body template: {0}")]
  ReleaseBody(#[from] ReleaseBodyError),

  #[error("failed to serialize workflow: {0}")]
  Yaml(#[from] serde_yaml::Error),

  #[error("failed to write {}: {source}", path.display())]
  Write { path: PathBuf, source: std::io::Error },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("generated workflows are out of date, run `musl-ci generate`: {}", display_drift(.0))]
  Drift(Vec<DriftedFile>),
}

fn display_drift(files: &[DriftedFile]) -> String {
  files.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
