//! Fixed values shared by the generator.

/// Version of musl compiled by `build.sh`.
pub const MUSL_VERSION: &str = "1.2.3";

/// GitHub repository the release assets are published to.
pub const RELEASE_REPOSITORY: &str = "bazel-contrib/musl-toolchain";

/// Version used by the pre-merge pipeline, which never publishes anything.
pub const DEV_VERSION: &str = "v0.0.0-dev";

/// Expression GitHub Actions resolves to the pushed tag.
pub const RELEASE_VERSION_EXPR: &str = "${{ github.ref_name }}";

/// bazelisk release installed as `bazel` on Linux runners.
pub const BAZELISK_VERSION: &str = "v1.18.0";

/// Directory (relative to the repository root) holding the workflows.
pub const WORKFLOWS_DIR: &str = ".github/workflows";

pub const PRE_MERGE_FILE: &str = "build.yaml";
pub const RELEASE_FILE: &str = "release.yaml";

/// First line of every generated workflow.
pub const GENERATED_HEADER: &str =
  "# This file was generated by running `musl-ci generate` - it should not be manually modified\n\n";

/// Bazel module name of the published toolchain package.
pub const MODULE_NAME: &str = "toolchains_musl";

/// Repository holding every toolchain declaration in the release archive.
pub const HUB_REPO: &str = "musl_toolchains_hub";
