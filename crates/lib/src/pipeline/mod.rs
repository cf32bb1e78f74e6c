//! Workflow generation: job graph expansion, rendering and drift checks.

pub mod dag;
pub mod error;
pub mod graph;
pub mod steps;
pub mod types;
pub mod writer;

use serde::Serialize;

use crate::consts::{PRE_MERGE_FILE, RELEASE_FILE};

pub use dag::JobDag;
pub use error::{DriftedFile, GenerateError, GraphError};
pub use graph::{Expansion, JobEntry, JobGraph, JobGraphBuilder, version_for};
pub use types::{Job, JobKind, Step};
pub use writer::{GeneratedFile, Pipeline, check_files, generate, write_files};

/// The two workflows generated from one matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
  /// Runs on pull requests: build, test and check the workflows are fresh.
  PreMerge,
  /// Runs on tag pushes: build, test, package and publish.
  Release,
}

impl PipelineKind {
  /// Workflow `name`.
  pub fn name(&self) -> &'static str {
    match self {
      PipelineKind::PreMerge => "PR",
      PipelineKind::Release => "Release",
    }
  }

  pub fn file_name(&self) -> &'static str {
    match self {
      PipelineKind::PreMerge => PRE_MERGE_FILE,
      PipelineKind::Release => RELEASE_FILE,
    }
  }
}
