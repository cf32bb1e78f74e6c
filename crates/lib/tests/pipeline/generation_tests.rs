//! Rendered workflows and generation failures.

use musl_ci_lib::consts::{GENERATED_HEADER, WORKFLOWS_DIR};
use musl_ci_lib::matrix::{Matrix, TargetArch};
use musl_ci_lib::naming::JobId;
use musl_ci_lib::pipeline::{GenerateError, PipelineKind, Step, check_files, generate, write_files};
use musl_ci_lib::platform::{Arch, PlatformError};
use musl_ci_lib::template::release_body;
use tempfile::TempDir;

use super::common::{commands, full_matrix, release};

fn riscv_matrix() -> Matrix {
  let mut matrix = Matrix::default();
  matrix
    .targets
    .push(TargetArch::release_only(Arch::Riscv64, "no bazelisk asset"));
  matrix
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn regeneration_is_byte_identical() {
  let first = generate(&Matrix::default()).unwrap();
  let second = generate(&Matrix::default()).unwrap();
  assert_eq!(first, second);

  let full_first = generate(&full_matrix()).unwrap();
  let full_second = generate(&full_matrix()).unwrap();
  assert_eq!(full_first, full_second);
}

#[test]
fn documents_carry_header_and_kind_name() {
  for (file, kind) in generate(&Matrix::default())
    .unwrap()
    .iter()
    .zip([PipelineKind::PreMerge, PipelineKind::Release])
  {
    assert!(file.contents.starts_with(GENERATED_HEADER));
    assert!(file.contents.contains(&format!("name: {}\n", kind.name())));
    assert!(file.path.ends_with(kind.file_name()));
  }
}

#[test]
fn written_workflows_pass_the_check() {
  let temp = TempDir::new().unwrap();
  let files = generate(&Matrix::default()).unwrap();
  write_files(temp.path(), &files).unwrap();

  check_files(temp.path(), &generate(&Matrix::default()).unwrap()).unwrap();

  // A different matrix is drift.
  let err = check_files(temp.path(), &generate(&full_matrix()).unwrap()).unwrap_err();
  assert!(matches!(err, GenerateError::Drift(ref files) if files.len() == 2));
}

// =============================================================================
// Deferred checksums
// =============================================================================

#[test]
fn no_sha256_attribute_carries_a_literal_digest() {
  let pipeline = release(&full_matrix(), "v1.0.0");
  let mut attributes = 0;

  for command in commands(&pipeline) {
    for (offset, _) in command.match_indices("sha256 = \"") {
      attributes += 1;
      let value = &command[offset + "sha256 = \"".len()..];
      assert!(value.starts_with("$("), "literal digest in: {command}");
    }
  }

  // 4 builder workspaces per tested target, one tester file per binary, one
  // archive per artifact in repositories.bzl.
  assert_eq!(attributes, 8 + 8 + 8);
  assert_eq!(pipeline.pending.len(), 8 + 8 + 8 + 1);
}

#[test]
fn release_body_is_filled_by_sed() {
  let pipeline = release(&Matrix::default(), "v1.0.0");
  let release = pipeline.jobs.get(&JobId::named(JobId::RELEASE)).unwrap();
  let body = release
    .job
    .steps
    .iter()
    .find(|s| s.name() == Some("Generate release body"))
    .and_then(Step::command)
    .unwrap();

  assert!(body.contains("sha256=$(sha256sum musl_toolchain-v1.0.0.tar.gz | awk '{print $1}')"));
  assert!(body.contains(release_body::RELEASE_BODY_TEMPLATE_PATH));
  assert!(release_body::parse(release_body::RELEASE_BODY_TEMPLATE).is_ok());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn unmapped_download_suffix_aborts_and_writes_nothing() {
  let temp = TempDir::new().unwrap();

  let err = generate(&riscv_matrix())
    .and_then(|files| write_files(temp.path(), &files))
    .unwrap_err();
  assert!(matches!(
    err,
    GenerateError::Platform(PlatformError::UnknownPlatform { convention: "download", .. })
  ));
  assert!(!temp.path().join(WORKFLOWS_DIR).exists());
}

#[test]
fn duplicate_source_is_rejected() {
  let mut matrix = Matrix::default();
  matrix.sources.push(matrix.sources[0].clone());
  assert!(matches!(generate(&matrix), Err(GenerateError::Matrix(_))));
}
