//! Deferred checksums.
//!
//! Toolchain archives and test binaries do not exist when workflows are
//! generated, so their SHA-256 cannot be written into the Bazel files up
//! front. Instead the generator embeds a [`PendingDigest`]: a shell command
//! substitution that hashes a locally staged copy of the artifact when the
//! step writing the file runs. A [`ResolvedDigest`] only comes into existence
//! from a value observed at execution time; nothing in the generator can
//! produce one from an artifact.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::platform::Os;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
  #[error("invalid sha256 digest for {artifact}: expected 64 hex characters, got '{value}'")]
  Invalid { artifact: String, value: String },
}

/// SHA-256 command available on a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashCommand {
  Sha256sum,
  Shasum256,
}

impl HashCommand {
  pub fn for_os(os: Os) -> Self {
    match os {
      Os::Linux => Self::Sha256sum,
      Os::MacOs => Self::Shasum256,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sha256sum => "sha256sum",
      Self::Shasum256 => "shasum -a 256",
    }
  }
}

impl fmt::Display for HashCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where a deferred digest ends up once it is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "repo")]
pub enum DigestSite {
  /// `sha256` of an `http_archive` repository.
  HttpArchive(String),
  /// `sha256` of an `http_file` repository.
  HttpFile(String),
  /// The `{sha256}` placeholder of the release notes.
  ReleaseBody,
}

impl fmt::Display for DigestSite {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DigestSite::HttpArchive(repo) => write!(f, "http_archive {repo}"),
      DigestSite::HttpFile(repo) => write!(f, "http_file {repo}"),
      DigestSite::ReleaseBody => write!(f, "release body"),
    }
  }
}

/// A checksum computed by the pipeline, not by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PendingDigest {
  artifact: String,
  hasher: HashCommand,
  site: DigestSite,
}

impl PendingDigest {
  pub fn new(artifact: impl Into<String>, hasher: HashCommand, site: DigestSite) -> Self {
    Self {
      artifact: artifact.into(),
      hasher,
      site,
    }
  }

  pub fn artifact(&self) -> &str {
    &self.artifact
  }

  pub fn hasher(&self) -> HashCommand {
    self.hasher
  }

  pub fn site(&self) -> &DigestSite {
    &self.site
  }

  /// Shell command substitution printing the hex digest of the artifact.
  pub fn shell_expr(&self) -> String {
    format!("$({} {} | awk '{{print $1}}')", self.hasher, self.artifact)
  }

  /// Binds the value the pipeline computed for this digest.
  pub fn resolve(&self, value: &str) -> Result<ResolvedDigest, DigestError> {
    ResolvedDigest::parse(&self.artifact, value)
  }
}

/// A SHA-256 observed at execution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedDigest {
  artifact: String,
  hex: String,
}

impl ResolvedDigest {
  /// Validates a digest printed by `sha256sum` or `shasum -a 256`.
  pub fn parse(artifact: &str, value: &str) -> Result<Self, DigestError> {
    let value = value.trim();
    if value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
      return Err(DigestError::Invalid {
        artifact: artifact.to_string(),
        value: value.to_string(),
      });
    }
    Ok(Self {
      artifact: artifact.to_string(),
      hex: value.to_ascii_lowercase(),
    })
  }

  pub fn artifact(&self) -> &str {
    &self.artifact
  }

  pub fn as_str(&self) -> &str {
    &self.hex
  }
}

impl fmt::Display for ResolvedDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.hex)
  }
}

/// Rendered file text plus the digests deferred inside it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
  pub text: String,
  pub pending: Vec<PendingDigest>,
}

impl Rendered {
  pub fn plain(text: String) -> Self {
    Self {
      text,
      pending: Vec::new(),
    }
  }
}
