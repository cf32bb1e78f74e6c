//! Identifier derivation across platforms and release versions.

use musl_ci_lib::naming::{ArtifactNamer, JobId};
use musl_ci_lib::pipeline::JobKind;
use musl_ci_lib::platform::{Arch, Os, Platform, PlatformError};
use proptest::prelude::*;

use super::common::{full_matrix, release};

fn os() -> impl Strategy<Value = Os> {
  prop::sample::select(vec![Os::Linux, Os::MacOs])
}

fn arch() -> impl Strategy<Value = Arch> {
  prop::sample::select(vec![Arch::X86_64, Arch::Aarch64, Arch::Riscv64])
}

fn version() -> impl Strategy<Value = String> {
  "v[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}(-rc[0-9])?"
}

#[test]
fn linux_arm64_identifiers() {
  let platform = Platform::new(Os::Linux, Arch::Aarch64);
  assert_eq!(platform.musl_triple(), "aarch64-unknown-linux-gnu");
  assert_eq!(platform.bazel_constraints()[0], "@platforms//cpu:arm64");
  assert_eq!(platform.download_suffix().unwrap(), "linux-arm64");
  assert_eq!(Arch::Aarch64.for_download().unwrap(), "arm64");
}

#[test]
fn riscv64_has_no_download_suffix() {
  let err = Platform::new(Os::Linux, Arch::Riscv64).download_suffix().unwrap_err();
  assert!(matches!(err, PlatformError::UnknownPlatform { convention: "download", .. }));
}

proptest! {
  #[test]
  fn build_ids_embed_both_triples(src_os in os(), src_arch in arch(), target in arch()) {
    let id = JobId::build(Platform::new(src_os, src_arch), target);
    prop_assert_eq!(
      id.as_str(),
      format!("{}-{}-{}", src_os.for_musl(), src_arch.for_musl(), target.for_musl())
    );
    let test_build_id = JobId::test_build(Platform::new(src_os, src_arch), target);
    prop_assert_eq!(
      test_build_id.as_str(),
      format!("{}-test-build", id)
    );
  }

  #[test]
  fn archive_names_ignore_release_version(
    src_os in os(),
    src_arch in arch(),
    target in arch(),
    a in version(),
    b in version(),
  ) {
    let source = Platform::new(src_os, src_arch);
    let first = ArtifactNamer::new("1.2.3", a.clone());
    let second = ArtifactNamer::new("1.2.3", b.clone());

    prop_assert_eq!(first.toolchain_archive(source, target), second.toolchain_archive(source, target));
    prop_assert_eq!(first.test_binary(source, target), second.test_binary(source, target));
    prop_assert_eq!(first.release_archive() == second.release_archive(), a == b);
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(16))]

  #[test]
  fn version_only_changes_release_jobs(a in version(), b in version()) {
    let matrix = full_matrix();
    let first = release(&matrix, &a);
    let second = release(&matrix, &b);

    let ids = |p: &musl_ci_lib::pipeline::Pipeline| {
      p.jobs.entries().iter().map(|e| e.id.clone()).collect::<Vec<_>>()
    };
    prop_assert_eq!(ids(&first), ids(&second));
    prop_assert_eq!(&first.artifacts, &second.artifacts);

    for (x, y) in first.jobs.entries().iter().zip(second.jobs.entries()) {
      match x.kind {
        JobKind::Release | JobKind::Publish => {
          prop_assert_eq!(&x.job.needs, &y.job.needs);
        }
        _ => {
          prop_assert_eq!(&x.job, &y.job);
        }
      }
    }
  }
}
