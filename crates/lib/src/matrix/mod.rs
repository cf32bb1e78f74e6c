//! The build matrix: which platforms build toolchains for which targets.
//!
//! A [`Matrix`] is a plain value handed to the graph builder, so alternative
//! matrices (a reduced one in tests, a wider one when runners appear) can be
//! expanded side by side.

pub mod runners;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::consts::MUSL_VERSION;
use crate::platform::{Arch, Os, Platform, PlatformError};

pub use runners::Runner;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
  #[error("matrix has no source platforms")]
  NoSources,

  #[error("matrix has no target architectures")]
  NoTargets,

  #[error("source platform {0} listed more than once")]
  DuplicateSource(Platform),

  #[error("target architecture {0} listed more than once")]
  DuplicateTarget(Arch),

  #[error("tests for {arch} would run on {tester}, expected {expected}")]
  TesterMismatch {
    arch: Arch,
    tester: Platform,
    expected: Platform,
  },
}

/// Whether toolchains for a target architecture are tested before release.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum Testing {
  /// Test binaries run on this runner, which executes the target architecture.
  Enabled { runner: Runner },

  /// Built and released without tests.
  ReleaseOnly { reason: String },
}

/// A machine toolchains are built on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePlatform {
  pub platform: Platform,
  pub runner: Runner,
}

impl SourcePlatform {
  pub fn new(runner: Runner) -> Self {
    Self {
      platform: runner.platform,
      runner,
    }
  }
}

/// An architecture toolchains generate code for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetArch {
  pub arch: Arch,
  pub testing: Testing,
}

impl TargetArch {
  pub fn tested(arch: Arch, runner: Runner) -> Self {
    Self {
      arch,
      testing: Testing::Enabled { runner },
    }
  }

  pub fn release_only(arch: Arch, reason: impl Into<String>) -> Self {
    Self {
      arch,
      testing: Testing::ReleaseOnly { reason: reason.into() },
    }
  }

  /// The runner executing tests, if this target is tested.
  pub fn tester(&self) -> Option<&Runner> {
    match &self.testing {
      Testing::Enabled { runner } => Some(runner),
      Testing::ReleaseOnly { .. } => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
  pub sources: Vec<SourcePlatform>,
  pub targets: Vec<TargetArch>,
  pub target_os: Os,
  pub musl_version: String,
}

impl Default for Matrix {
  fn default() -> Self {
    Self {
      sources: vec![
        SourcePlatform::new(runners::linux_x86_64()),
        SourcePlatform::new(runners::macos_x86_64()),
        SourcePlatform::new(runners::macos_aarch64()),
      ],
      targets: vec![
        TargetArch::tested(Arch::X86_64, runners::linux_x86_64()),
        TargetArch::release_only(Arch::Aarch64, "no Linux arm64 runner is provisioned for tests"),
      ],
      target_os: Os::Linux,
      musl_version: MUSL_VERSION.to_string(),
    }
  }
}

impl Matrix {
  /// Checks the matrix can be expanded into a well-formed graph.
  pub fn validate(&self) -> Result<(), MatrixError> {
    if self.sources.is_empty() {
      return Err(MatrixError::NoSources);
    }
    if self.targets.is_empty() {
      return Err(MatrixError::NoTargets);
    }

    let mut seen = HashSet::new();
    for source in &self.sources {
      if !seen.insert(source.platform) {
        return Err(MatrixError::DuplicateSource(source.platform));
      }
    }

    let mut seen = HashSet::new();
    for target in &self.targets {
      if !seen.insert(target.arch) {
        return Err(MatrixError::DuplicateTarget(target.arch));
      }
      if let Some(tester) = target.tester() {
        let expected = self.target_platform(target.arch);
        if tester.platform != expected {
          return Err(MatrixError::TesterMismatch {
            arch: target.arch,
            tester: tester.platform,
            expected,
          });
        }
      }
    }

    Ok(())
  }

  /// Checks every platform the matrix mentions has all its identifiers.
  pub fn ensure_mapped(&self) -> Result<(), PlatformError> {
    for source in &self.sources {
      source.platform.ensure_mapped()?;
      source.runner.platform.ensure_mapped()?;
    }
    for target in &self.targets {
      self.target_platform(target.arch).ensure_mapped()?;
      if let Some(tester) = target.tester() {
        tester.platform.ensure_mapped()?;
      }
    }
    Ok(())
  }

  /// Every (source, target) pair, targets outer and sources inner.
  pub fn pairs(&self) -> impl Iterator<Item = (&SourcePlatform, &TargetArch)> {
    self
      .targets
      .iter()
      .flat_map(move |target| self.sources.iter().map(move |source| (source, target)))
  }

  pub fn target_platform(&self, arch: Arch) -> Platform {
    Platform::new(self.target_os, arch)
  }
}
