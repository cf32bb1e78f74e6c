//! Starlark snippets shared by the workspace and release files.

use crate::platform::Platform;

use super::digest::PendingDigest;

/// Where a toolchain declaration takes its extra constraints from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extensions {
  /// Constraints are exactly the platform constraints.
  Fixed,
  /// Constraints are extended with lists injected by the consuming repository.
  Injected,
}

/// Names of the Starlark globals carrying injected constraints.
pub const EXTRA_EXEC: &str = "EXTRA_EXEC_COMPATIBLE_WITH";
pub const EXTRA_TARGET: &str = "EXTRA_TARGET_COMPATIBLE_WITH";
pub const TARGET_SETTINGS: &str = "TARGET_SETTINGS";

/// A `toolchain()` rule registering a musl toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainDecl {
  pub name: String,
  pub repo: String,
  pub exec: Platform,
  pub target: Platform,
  pub extensions: Extensions,
}

fn constraint_list(out: &mut String, attr: &str, platform: Platform, extra: Option<&str>) {
  out.push_str(&format!("    {attr} = [\n"));
  for constraint in platform.bazel_constraints() {
    out.push_str(&format!("        \"{constraint}\",\n"));
  }
  match extra {
    Some(global) => out.push_str(&format!("    ] + {global},\n")),
    None => out.push_str("    ],\n"),
  }
}

pub fn toolchain(decl: &ToolchainDecl) -> String {
  let injected = decl.extensions == Extensions::Injected;
  let mut out = String::new();
  out.push_str("toolchain(\n");
  out.push_str(&format!("    name = \"{}\",\n", decl.name));
  constraint_list(&mut out, "exec_compatible_with", decl.exec, injected.then_some(EXTRA_EXEC));
  constraint_list(&mut out, "target_compatible_with", decl.target, injected.then_some(EXTRA_TARGET));
  if injected {
    out.push_str(&format!("    target_settings = {TARGET_SETTINGS},\n"));
  }
  out.push_str(&format!("    toolchain = \"@{}//:musl_toolchain\",\n", decl.repo));
  out.push_str("    toolchain_type = \"@bazel_tools//tools/cpp:toolchain_type\",\n");
  out.push_str(")\n");
  out
}

/// A `platform()` rule for the given target.
pub fn platform(name: &str, target: Platform) -> String {
  let mut out = String::new();
  out.push_str("platform(\n");
  out.push_str(&format!("    name = \"{name}\",\n"));
  out.push_str("    constraint_values = [\n");
  for constraint in target.bazel_constraints() {
    out.push_str(&format!("        \"{constraint}\",\n"));
  }
  out.push_str("    ],\n)\n");
  out
}

/// An `http_archive()` whose checksum is computed when the file is written.
pub fn http_archive(name: &str, digest: &PendingDigest, url: &str) -> String {
  format!(
    "http_archive(\n    name = \"{name}\",\n    sha256 = \"{}\",\n    url = \"{url}\",\n)\n",
    digest.shell_expr()
  )
}

/// An executable `http_file()` whose checksum is computed when the file is written.
pub fn http_file(name: &str, digest: &PendingDigest, url: &str) -> String {
  format!(
    "http_file(\n    name = \"{name}\",\n    executable = True,\n    sha256 = \"{}\",\n    url = \"{url}\",\n)\n",
    digest.shell_expr()
  )
}

/// Indents every non-empty line by `width` spaces.
pub fn indent(text: &str, width: usize) -> String {
  let pad = " ".repeat(width);
  text
    .lines()
    .map(|line| if line.is_empty() { String::new() } else { format!("{pad}{line}") })
    .collect::<Vec<_>>()
    .join("\n")
    + "\n"
}
