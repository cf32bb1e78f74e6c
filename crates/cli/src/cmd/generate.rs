//! Implementation of the `musl-ci generate` command.
//!
//! Renders both workflows from the default matrix, then either writes them
//! under `--root` or, with `--check`, fails when the committed copies differ.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use musl_ci_lib::matrix::Matrix;
use musl_ci_lib::pipeline::{check_files, generate, write_files};

use crate::output::{print_stat, print_success, truncate_hash};

pub fn cmd_generate(root: &Path, check: bool) -> Result<()> {
  debug!(root = %root.display(), check, "generating workflows");
  let files = generate(&Matrix::default()).context("Failed to generate workflows")?;

  if check {
    check_files(root, &files).with_context(|| format!("Workflows under {} are stale", root.display()))?;
    print_success("Workflows are up to date");
    for file in &files {
      print_stat(&file.path.display().to_string(), "unchanged");
    }
    return Ok(());
  }

  write_files(root, &files).with_context(|| format!("Failed to write workflows under {}", root.display()))?;
  for file in &files {
    let digest = file.sha256();
    print_success(&format!(
      "Wrote {} ({})",
      root.join(&file.path).display(),
      truncate_hash(&digest)
    ));
  }
  Ok(())
}
