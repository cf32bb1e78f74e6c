//! Implementation of the `musl-ci matrix` command.

use anyhow::Result;
use serde_json::json;

use musl_ci_lib::matrix::{Matrix, Testing, runners};
use musl_ci_lib::platform::{Arch, Os, Platform};

use crate::output::{OutputFormat, print_info, print_json, print_stat, symbols};

const UNMAPPED: &str = "n/a";

pub fn cmd_matrix(format: OutputFormat) -> Result<()> {
  let matrix = Matrix::default();
  let platforms: Vec<Platform> = Os::ALL
    .iter()
    .flat_map(|&os| Arch::ALL.iter().map(move |&arch| Platform::new(os, arch)))
    .collect();

  if format.is_json() {
    let identifiers: Vec<_> = platforms
      .iter()
      .map(|p| {
        json!({
          "os": p.os,
          "arch": p.arch,
          "musl": p.musl_triple(),
          "bazel": p.bazel_constraints(),
          "download": p.download_suffix().ok(),
          "runner": runners::for_platform(*p).ok().map(|r| r.runs_on),
        })
      })
      .collect();
    return print_json(&json!({ "matrix": matrix, "platforms": identifiers }));
  }

  print_info(&format!("musl {} for {}", matrix.musl_version, matrix.target_os));
  println!();
  println!("Sources:");
  for source in &matrix.sources {
    println!("  {} {} [{}]", symbols::INFO, source.platform, source.runner.runs_on);
  }

  println!();
  println!("Targets:");
  for target in &matrix.targets {
    match &target.testing {
      Testing::Enabled { runner } => println!("  {} {} tested on {}", symbols::INFO, target.arch, runner.runs_on),
      Testing::ReleaseOnly { reason } => println!("  {} {} release only ({})", symbols::INFO, target.arch, reason),
    }
  }

  println!();
  println!("Platforms:");
  for platform in &platforms {
    let download = platform.download_suffix().unwrap_or_else(|_| UNMAPPED.to_string());
    let runner = runners::for_platform(*platform).map_or_else(|_| UNMAPPED.to_string(), |r| r.runs_on);
    println!("  {} {}", symbols::INFO, platform);
    print_stat("  musl", &platform.musl_triple());
    print_stat("  bazel", &platform.bazel_constraints().join(" "));
    print_stat("  download", &download);
    print_stat("  runner", &runner);
  }

  Ok(())
}
