use std::fmt;

use serde::Serialize;

/// Operating systems a toolchain can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  MacOs,
}

impl Os {
  pub const ALL: [Os; 2] = [Os::Linux, Os::MacOs];

  /// Vendor/OS part of the triple used in musl-cross-make style names.
  pub fn for_musl(&self) -> &'static str {
    match self {
      Self::Linux => "unknown-linux-gnu",
      Self::MacOs => "apple-darwin",
    }
  }

  /// Name of the `@platforms//os:*` constraint value.
  pub fn for_bazel_platform(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "osx",
    }
  }

  /// OS part of release asset names published by bazelisk.
  pub fn for_download(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
    }
  }

  /// Returns the lowercase string identifier for this OS
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
