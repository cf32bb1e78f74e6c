//! Shape and ordering of expanded job graphs.

use std::collections::HashSet;

use musl_ci_lib::matrix::Matrix;
use musl_ci_lib::naming::JobId;
use musl_ci_lib::pipeline::{JobDag, JobKind};

use super::common::{full_matrix, pre_merge, release};

// =============================================================================
// Identity and ordering
// =============================================================================

#[test]
fn build_job_ids_are_unique() {
  let pipeline = release(&full_matrix(), "v1.0.0");
  let builds = pipeline.jobs.ids_of(JobKind::Build);
  let unique: HashSet<_> = builds.iter().collect();
  assert_eq!(unique.len(), builds.len());
}

#[test]
fn needs_only_reference_earlier_jobs() {
  for pipeline in [pre_merge(&full_matrix()), release(&full_matrix(), "v1.0.0")] {
    for (position, entry) in pipeline.jobs.entries().iter().enumerate() {
      for need in &entry.job.needs {
        let need_position = pipeline.jobs.position(need).unwrap();
        assert!(need_position < position, "{} needs later job {}", entry.id, need);
      }
    }
  }
}

#[test]
fn release_needs_every_build_and_test() {
  let pipeline = release(&full_matrix(), "v1.0.0");
  let release = pipeline.jobs.get(&JobId::named(JobId::RELEASE)).unwrap();

  let needs: HashSet<_> = release.job.needs.iter().cloned().collect();
  let expected: HashSet<_> = pipeline
    .jobs
    .ids_of(JobKind::Build)
    .into_iter()
    .chain(pipeline.jobs.ids_of(JobKind::Test))
    .collect();
  assert_eq!(needs, expected);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn four_sources_two_tested_targets() {
  let pipeline = release(&full_matrix(), "v1.0.0");
  let jobs = &pipeline.jobs;

  assert_eq!(jobs.ids_of(JobKind::Build).len(), 8);
  assert_eq!(jobs.ids_of(JobKind::TestBuild).len(), 8);
  assert_eq!(jobs.ids_of(JobKind::Test), vec![JobId::named("test-x86_64"), JobId::named("test-aarch64")]);
  assert_eq!(jobs.ids_of(JobKind::Release).len(), 1);
  assert_eq!(jobs.ids_of(JobKind::Publish).len(), 1);
  assert!(jobs.ids_of(JobKind::SelfCheck).is_empty());
  assert_eq!(pipeline.artifacts.len(), 8);
}

#[test]
fn release_only_target_is_built_but_never_tested() {
  let pipeline = pre_merge(&Matrix::default());
  let jobs = &pipeline.jobs;

  assert!(jobs.get(&JobId::named("unknown-linux-gnu-x86_64-aarch64")).is_some());
  assert!(
    jobs
      .get(&JobId::named("unknown-linux-gnu-x86_64-aarch64-test-build"))
      .is_none()
  );
  assert!(jobs.get(&JobId::named("test-aarch64")).is_none());
}

#[test]
fn pre_merge_has_self_check_and_no_release() {
  let pipeline = pre_merge(&Matrix::default());
  let check = pipeline.jobs.get(&JobId::named(JobId::CHECK_GENERATED)).unwrap();

  assert!(check.job.needs.is_empty());
  assert!(pipeline.jobs.get(&JobId::named(JobId::RELEASE)).is_none());
  assert!(pipeline.jobs.get(&JobId::named(JobId::PUBLISH)).is_none());
}

// =============================================================================
// DAG view
// =============================================================================

#[test]
fn waves_of_default_release() {
  let pipeline = release(&Matrix::default(), "v1.0.0");
  let dag = JobDag::from_graph(&pipeline.jobs).unwrap();
  let waves = dag.waves().unwrap();

  assert_eq!(dag.job_count(), pipeline.jobs.len());
  assert_eq!(waves.len(), 5);
  assert_eq!(waves[0].len(), 6);
  assert_eq!(waves[1].len(), 3);
  assert_eq!(waves[2], vec![JobId::named("test-x86_64")]);
  assert_eq!(waves[3], vec![JobId::named(JobId::RELEASE)]);
  assert_eq!(waves[4], vec![JobId::named(JobId::PUBLISH)]);
}

#[test]
fn failed_build_blocks_release() {
  let pipeline = release(&Matrix::default(), "v1.0.0");
  let dag = JobDag::from_graph(&pipeline.jobs).unwrap();

  let blocked = dag.blocked_by(&JobId::named("apple-darwin-aarch64-aarch64"));
  assert_eq!(blocked, vec![JobId::named(JobId::RELEASE), JobId::named(JobId::PUBLISH)]);
}
