//! Implementation of the `musl-ci release-body` command.
//!
//! Renders the release notes the way the release job does with `sed`, but
//! with values supplied on the command line.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use musl_ci_lib::consts::MUSL_VERSION;
use musl_ci_lib::naming::ArtifactNamer;
use musl_ci_lib::template::ResolvedDigest;
use musl_ci_lib::template::release_body::{RELEASE_BODY_TEMPLATE, ResolvedValues, render};

pub fn cmd_release_body(template: Option<&Path>, sha256: &str, url: &str, version: &str) -> Result<()> {
  let text = match template {
    Some(path) => {
      fs::read_to_string(path).with_context(|| format!("Failed to read template: {}", path.display()))?
    }
    None => RELEASE_BODY_TEMPLATE.to_string(),
  };

  let archive = ArtifactNamer::new(MUSL_VERSION, version).release_archive();
  let digest = ResolvedDigest::parse(&archive, sha256).context("Invalid --sha256")?;

  let body = render(
    &text,
    &ResolvedValues {
      sha256: &digest,
      url,
      version,
    },
  )
  .context("Failed to render release body")?;

  print!("{body}");
  Ok(())
}
