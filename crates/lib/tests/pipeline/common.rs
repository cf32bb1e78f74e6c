//! Shared helpers for pipeline integration tests.

use musl_ci_lib::matrix::{Matrix, SourcePlatform, TargetArch, runners};
use musl_ci_lib::pipeline::{Pipeline, PipelineKind, Step};
use musl_ci_lib::platform::Arch;

/// Every source the runner catalogue supports, building and testing both targets.
pub fn full_matrix() -> Matrix {
  Matrix {
    sources: vec![
      SourcePlatform::new(runners::linux_x86_64()),
      SourcePlatform::new(runners::linux_aarch64()),
      SourcePlatform::new(runners::macos_x86_64()),
      SourcePlatform::new(runners::macos_aarch64()),
    ],
    targets: vec![
      TargetArch::tested(Arch::X86_64, runners::linux_x86_64()),
      TargetArch::tested(Arch::Aarch64, runners::linux_aarch64()),
    ],
    ..Matrix::default()
  }
}

pub fn release(matrix: &Matrix, version: &str) -> Pipeline {
  Pipeline::build(matrix, PipelineKind::Release, version).unwrap()
}

pub fn pre_merge(matrix: &Matrix) -> Pipeline {
  Pipeline::build(matrix, PipelineKind::PreMerge, "v0.0.0-dev").unwrap()
}

/// Every `run` command of the pipeline, in job then step order.
pub fn commands(pipeline: &Pipeline) -> Vec<&str> {
  pipeline
    .jobs
    .entries()
    .iter()
    .flat_map(|entry| entry.job.steps.iter())
    .filter_map(Step::command)
    .collect()
}
