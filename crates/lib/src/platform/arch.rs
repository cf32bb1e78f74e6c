use std::fmt;

use serde::Serialize;

use super::PlatformError;

/// CPU architectures that appear as source or target in the build matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86_64,
  Aarch64,
  Riscv64,
}

impl Arch {
  pub const ALL: [Arch; 3] = [Arch::X86_64, Arch::Aarch64, Arch::Riscv64];

  /// Architecture part of musl target triples.
  pub fn for_musl(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::Riscv64 => "riscv64",
    }
  }

  /// Name of the `@platforms//cpu:*` constraint value.
  pub fn for_bazel_platform(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "arm64",
      Self::Riscv64 => "riscv64",
    }
  }

  /// Architecture part of release asset names published by bazelisk.
  ///
  /// Partial: architectures without a published asset fail.
  pub fn for_download(&self) -> Result<&'static str, PlatformError> {
    match self {
      Self::X86_64 => Ok("amd64"),
      Self::Aarch64 => Ok("arm64"),
      Self::Riscv64 => Err(PlatformError::UnknownPlatform {
        convention: "download",
        value: self.as_str().to_string(),
      }),
    }
  }

  /// Returns the lowercase string identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    self.for_musl()
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
