//! Files for the test workspaces under `test-workspaces/`.
//!
//! The builder workspace compiles a binary using a freshly built toolchain
//! archive; the tester workspace downloads every binary built for one target
//! and runs them.

use crate::naming::test_binary_repo;
use crate::platform::Platform;

use super::digest::{DigestSite, HashCommand, PendingDigest, Rendered};
use super::starlark::{self, Extensions, ToolchainDecl};

pub const BUILDER_WORKSPACE: &str = "test-workspaces/builder/WORKSPACE.bazel";
pub const BUILDER_CONFIG_BUILD: &str = "test-workspaces/builder/config/BUILD.bazel";
pub const TESTER_WORKSPACE: &str = "test-workspaces/tester/WORKSPACE.bazel";

/// Repository the builder workspace loads the toolchain archive into.
const BUILDER_REPO: &str = "musl_toolchain";

const HTTP_LOAD_ARCHIVE: &str = "load(\"@bazel_tools//tools/build_defs/repo:http.bzl\", \"http_archive\")\n";
const HTTP_LOAD_FILE: &str = "load(\"@bazel_tools//tools/build_defs/repo:http.bzl\", \"http_file\")\n";

/// `WORKSPACE.bazel` loading the staged toolchain archive as `@musl_toolchain`.
pub fn builder_workspace(archive: &str, hasher: HashCommand) -> Rendered {
  let digest = PendingDigest::new(archive, hasher, DigestSite::HttpArchive(BUILDER_REPO.to_string()));
  let text = format!(
    "{HTTP_LOAD_ARCHIVE}\n{}",
    starlark::http_archive(BUILDER_REPO, &digest, &format!("file://$(pwd)/{archive}"))
  );
  Rendered {
    text,
    pending: vec![digest],
  }
}

/// `config/BUILD.bazel` with the test toolchain and the platform to build for.
pub fn builder_config(source: Platform, target: Platform) -> String {
  let decl = ToolchainDecl {
    name: BUILDER_REPO.to_string(),
    repo: BUILDER_REPO.to_string(),
    exec: source,
    target,
    extensions: Extensions::Fixed,
  };
  format!("{}\n{}", starlark::toolchain(&decl), starlark::platform("platform", target))
}

/// A binary uploaded by a test-build job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBinary {
  pub source: Platform,
  pub filename: String,
}

/// `WORKSPACE.bazel` exposing each test binary as an `http_file`.
pub fn tester_workspace(binaries: &[TestBinary], hasher: HashCommand) -> Rendered {
  let mut rendered = Rendered::plain(HTTP_LOAD_FILE.to_string());
  for binary in binaries {
    let repo = test_binary_repo(binary.source);
    let digest = PendingDigest::new(&binary.filename, hasher, DigestSite::HttpFile(repo.clone()));
    rendered.text.push('\n');
    rendered.text.push_str(&starlark::http_file(
      &repo,
      &digest,
      &format!("file://$(pwd)/{}", binary.filename),
    ));
    rendered.pending.push(digest);
  }
  rendered
}
