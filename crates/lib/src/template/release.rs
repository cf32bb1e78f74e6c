//! Bazel integration files bundled into the release archive.
//!
//! Consumers either load `repositories.bzl`/`toolchains.bzl` from a WORKSPACE
//! or depend on the module and use the `toolchains_musl` extension. Both
//! routes end in the `musl_toolchains_hub` repository rule, which declares
//! one toolchain per released archive and splices in the extra constraints
//! and target settings the consumer injected.

use crate::consts::{HUB_REPO, MODULE_NAME};
use crate::naming::{ArtifactNamer, ReleasableArtifact};

use super::digest::{DigestSite, HashCommand, PendingDigest, Rendered};
use super::starlark::{self, Extensions, ToolchainDecl};

/// A file of the release archive, relative to the archive root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFile {
  pub path: &'static str,
  pub rendered: Rendered,
}

const TOOLCHAINS_BZL: &str = r#"def register_musl_toolchains():
    native.register_toolchains("@musl_toolchains_hub//:all")
"#;

const BUILD_BAZEL: &str = r#"exports_files([
    "extensions.bzl",
    "musl_toolchains_hub.bzl",
    "repositories.bzl",
    "toolchains.bzl",
])
"#;

const EXTENSIONS_BZL: &str = r#"load(":repositories.bzl", "load_musl_toolchains")

_config = tag_class(
    attrs = {
        "extra_exec_compatible_with": attr.string_list(),
        "extra_target_compatible_with": attr.string_list(),
        "target_settings": attr.string_list(),
    },
)

def _toolchains_musl_impl(module_ctx):
    extra_exec_compatible_with = []
    extra_target_compatible_with = []
    target_settings = []
    for mod in module_ctx.modules:
        for config in mod.tags.config:
            extra_exec_compatible_with += config.extra_exec_compatible_with
            extra_target_compatible_with += config.extra_target_compatible_with
            target_settings += config.target_settings
    load_musl_toolchains(
        extra_exec_compatible_with = extra_exec_compatible_with,
        extra_target_compatible_with = extra_target_compatible_with,
        target_settings = target_settings,
    )

toolchains_musl = module_extension(
    implementation = _toolchains_musl_impl,
    tag_classes = {"config": _config},
)
"#;

/// Repository rule; `{toolchains}` is replaced by the toolchain declarations.
const HUB_RULE_TEMPLATE: &str = r#"_EXTRA_BZL = """EXTRA_EXEC_COMPATIBLE_WITH = {exec}
EXTRA_TARGET_COMPATIBLE_WITH = {target}
TARGET_SETTINGS = {settings}
"""

_BUILD_BAZEL = """load(":extra.bzl", "EXTRA_EXEC_COMPATIBLE_WITH", "EXTRA_TARGET_COMPATIBLE_WITH", "TARGET_SETTINGS")

{toolchains}"""

def _musl_toolchains_hub_impl(rctx):
    rctx.file("extra.bzl", _EXTRA_BZL.format(
        exec = repr(rctx.attr.extra_exec_compatible_with),
        target = repr(rctx.attr.extra_target_compatible_with),
        settings = repr(rctx.attr.target_settings),
    ))
    rctx.file("BUILD.bazel", _BUILD_BAZEL)

musl_toolchains_hub = repository_rule(
    implementation = _musl_toolchains_hub_impl,
    attrs = {
        "extra_exec_compatible_with": attr.string_list(),
        "extra_target_compatible_with": attr.string_list(),
        "target_settings": attr.string_list(),
    },
)
"#;

fn module_bazel(version: &str) -> String {
  format!(
    r#"module(
    name = "{MODULE_NAME}",
    version = "{version}",
)

bazel_dep(name = "platforms", version = "0.0.8")

toolchains_musl = use_extension("//:extensions.bzl", "toolchains_musl")
use_repo(toolchains_musl, "{HUB_REPO}")

register_toolchains("@{HUB_REPO}//:all")
"#
  )
}

fn hub_rule(artifacts: &[ReleasableArtifact]) -> String {
  let toolchains = artifacts
    .iter()
    .map(|artifact| {
      let repo = artifact.repo_name();
      starlark::toolchain(&ToolchainDecl {
        name: repo.clone(),
        repo,
        exec: artifact.source,
        target: artifact.target(),
        extensions: Extensions::Injected,
      })
    })
    .collect::<Vec<_>>()
    .join("\n");
  HUB_RULE_TEMPLATE.replace("{toolchains}", &toolchains)
}

fn repositories(artifacts: &[ReleasableArtifact], namer: &ArtifactNamer, hasher: HashCommand) -> Rendered {
  let mut body = String::new();
  let mut pending = Vec::with_capacity(artifacts.len());
  for artifact in artifacts {
    let repo = artifact.repo_name();
    let digest = PendingDigest::new(&artifact.filename, hasher, DigestSite::HttpArchive(repo.clone()));
    body.push_str(&starlark::http_archive(&repo, &digest, &namer.download_url(&artifact.filename)));
    body.push('\n');
    pending.push(digest);
  }
  body.push_str(&format!(
    r#"{HUB_REPO}(
    name = "{HUB_REPO}",
    extra_exec_compatible_with = extra_exec_compatible_with,
    extra_target_compatible_with = extra_target_compatible_with,
    target_settings = target_settings,
)
"#
  ));

  let text = format!(
    r#"load("@bazel_tools//tools/build_defs/repo:http.bzl", "http_archive")
load("//:musl_toolchains_hub.bzl", "{HUB_REPO}")

def load_musl_toolchains(extra_exec_compatible_with = [], extra_target_compatible_with = [], target_settings = []):
{}"#,
    starlark::indent(&body, 4)
  );
  Rendered { text, pending }
}

/// Renders every file of the release archive, in archive order.
///
/// `hasher` must be the hash command of the runner writing the files, which
/// is also where the toolchain archives are staged.
pub fn release_files(
  artifacts: &[ReleasableArtifact],
  namer: &ArtifactNamer,
  hasher: HashCommand,
) -> Vec<ReleaseFile> {
  vec![
    ReleaseFile {
      path: "MODULE.bazel",
      rendered: Rendered::plain(module_bazel(namer.release_version())),
    },
    ReleaseFile {
      path: "BUILD.bazel",
      rendered: Rendered::plain(BUILD_BAZEL.to_string()),
    },
    ReleaseFile {
      path: "extensions.bzl",
      rendered: Rendered::plain(EXTENSIONS_BZL.to_string()),
    },
    ReleaseFile {
      path: "musl_toolchains_hub.bzl",
      rendered: Rendered::plain(hub_rule(artifacts)),
    },
    ReleaseFile {
      path: "repositories.bzl",
      rendered: repositories(artifacts, namer, hasher),
    },
    ReleaseFile {
      path: "toolchains.bzl",
      rendered: Rendered::plain(TOOLCHAINS_BZL.to_string()),
    },
  ]
}
