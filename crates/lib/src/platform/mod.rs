//! Platforms of the build matrix and their naming conventions.
//!
//! Every [`Os`] and [`Arch`] value is spelled three ways: the musl triple form,
//! the Bazel constraint form and the bazelisk download form. The download form
//! of [`Arch`] is fallible so that extending the architecture set without
//! wiring every convention stops generation.

pub mod arch;
pub mod os;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub use arch::Arch;
pub use os::Os;

/// Errors raised while deriving platform identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  #[error("unknown platform: no {convention} name for '{value}'")]
  UnknownPlatform { convention: &'static str, value: String },

  #[error("no CI runner available for {0}")]
  NoRunner(Platform),
}

/// An (OS, architecture) pair, e.g. the machine a toolchain is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

impl Platform {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Returns the musl-style triple (e.g. "aarch64-unknown-linux-gnu")
  pub fn musl_triple(&self) -> String {
    format!("{}-{}", self.arch.for_musl(), self.os.for_musl())
  }

  /// Bazel constraint labels matching this platform, cpu first.
  pub fn bazel_constraints(&self) -> [String; 2] {
    [
      format!("@platforms//cpu:{}", self.arch.for_bazel_platform()),
      format!("@platforms//os:{}", self.os.for_bazel_platform()),
    ]
  }

  /// Returns the `{os}-{arch}` suffix of bazelisk release assets.
  pub fn download_suffix(&self) -> Result<String, PlatformError> {
    Ok(format!("{}-{}", self.os.for_download(), self.arch.for_download()?))
  }

  /// Checks every naming convention has a value for this platform.
  ///
  /// Only the download form is partial, so this fails exactly when
  /// [`Platform::download_suffix`] does.
  pub fn ensure_mapped(&self) -> Result<(), PlatformError> {
    self.download_suffix().map(|_| ())
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn linux_arm64_identifiers() {
    let platform = Platform::new(Os::Linux, Arch::Aarch64);
    assert_eq!(platform.musl_triple(), "aarch64-unknown-linux-gnu");
    assert_eq!(platform.arch.for_bazel_platform(), "arm64");
    assert_eq!(platform.arch.for_download().unwrap(), "arm64");
    assert_eq!(platform.download_suffix().unwrap(), "linux-arm64");
  }

  #[test]
  fn bazel_constraints_are_cpu_then_os() {
    let platform = Platform::new(Os::MacOs, Arch::X86_64);
    assert_eq!(
      platform.bazel_constraints(),
      ["@platforms//cpu:x86_64".to_string(), "@platforms//os:osx".to_string()]
    );
  }

  #[test]
  fn ensure_mapped_rejects_unmapped_arch_on_any_os() {
    for os in Os::ALL {
      assert!(Platform::new(os, Arch::X86_64).ensure_mapped().is_ok());
      assert!(matches!(
        Platform::new(os, Arch::Riscv64).ensure_mapped(),
        Err(PlatformError::UnknownPlatform { convention: "download", .. })
      ));
    }
  }

  #[test]
  fn download_suffix_propagates_unknown_arch() {
    let platform = Platform::new(Os::Linux, Arch::Riscv64);
    assert!(matches!(
      platform.download_suffix(),
      Err(PlatformError::UnknownPlatform { .. })
    ));
  }
}
