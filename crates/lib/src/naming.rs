//! Deterministic names for jobs, artifacts and Bazel repositories.
//!
//! Everything here is a pure function of platforms and version strings. The
//! same inputs always give the same names, and distinct inputs never share a
//! name, so regenerated workflows are stable and artifact hand-off between
//! jobs cannot mix up two toolchains.

use std::fmt;

use serde::Serialize;

use crate::consts::RELEASE_REPOSITORY;
use crate::platform::{Arch, Os, Platform};

/// Identity of a job within a workflow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
  pub const RELEASE: &'static str = "release";
  pub const PUBLISH: &'static str = "publish";
  pub const CHECK_GENERATED: &'static str = "check-generated";

  /// Job compiling the toolchain on `source` for `target`.
  pub fn build(source: Platform, target: Arch) -> Self {
    Self(format!(
      "{}-{}-{}",
      source.os.for_musl(),
      source.arch.for_musl(),
      target.for_musl()
    ))
  }

  /// Job compiling a test binary with the toolchain from [`JobId::build`].
  pub fn test_build(source: Platform, target: Arch) -> Self {
    Self(format!("{}-test-build", Self::build(source, target).0))
  }

  /// Job running every test binary built for `target`.
  pub fn test(target: Arch) -> Self {
    Self(format!("test-{}", target.for_musl()))
  }

  pub fn named(name: &str) -> Self {
    Self(name.to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for JobId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Derives file names and URLs from the musl and release versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNamer {
  musl_version: String,
  release_version: String,
}

impl ArtifactNamer {
  pub fn new(musl_version: impl Into<String>, release_version: impl Into<String>) -> Self {
    Self {
      musl_version: musl_version.into(),
      release_version: release_version.into(),
    }
  }

  pub fn release_version(&self) -> &str {
    &self.release_version
  }

  /// Compressed toolchain produced by a build job.
  pub fn toolchain_archive(&self, source: Platform, target: Arch) -> String {
    format!(
      "musl-{}-platform-{}-{}-target-{}-linux-musl.tar.gz",
      self.musl_version,
      source.arch.for_musl(),
      source.os.for_musl(),
      target.for_musl()
    )
  }

  /// Binary produced by a test-build job.
  pub fn test_binary(&self, source: Platform, target: Arch) -> String {
    format!(
      "test-binary-platform-{}-{}-target-{}-linux-musl",
      source.arch.for_musl(),
      source.os.for_musl(),
      target.for_musl()
    )
  }

  /// Archive bundling the Bazel integration files.
  pub fn release_archive(&self) -> String {
    format!("musl_toolchain-{}.tar.gz", self.release_version)
  }

  pub fn download_url(&self, filename: &str) -> String {
    format!(
      "https://github.com/{}/releases/download/{}/{}",
      RELEASE_REPOSITORY, self.release_version, filename
    )
  }
}

/// Bazel repository name for a toolchain archive.
pub fn repo_name(archive: &str) -> String {
  archive.strip_suffix(".tar.gz").unwrap_or(archive).replace('.', "_")
}

/// Repository name for a test binary inside the tester workspace.
pub fn test_binary_repo(source: Platform) -> String {
  format!("built_binary_{}-{}", source.arch.for_musl(), source.os.for_musl())
}

/// A toolchain archive that ends up in a release, tested or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasableArtifact {
  pub build_job: JobId,
  pub source: Platform,
  pub target_arch: Arch,
  pub target_os: Os,
  pub filename: String,
}

impl ReleasableArtifact {
  pub fn target(&self) -> Platform {
    Platform::new(self.target_os, self.target_arch)
  }

  pub fn repo_name(&self) -> String {
    repo_name(&self.filename)
  }
}
