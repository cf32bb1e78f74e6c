//! Text emitted into workflow steps: Bazel workspace files, the release
//! archive contents and the release notes.
//!
//! Checksums of artifacts are never computed here. Every `sha256` attribute
//! is a [`PendingDigest`] rendered as a shell command substitution, and every
//! rendered file lists the digests it defers.

pub mod digest;
pub mod release;
pub mod release_body;
pub mod starlark;
pub mod workspace;

pub use digest::{DigestError, DigestSite, HashCommand, PendingDigest, Rendered, ResolvedDigest};
pub use release::{ReleaseFile, release_files};
pub use release_body::ReleaseBodyError;
