//! Implementation of the `musl-ci graph` command.

use anyhow::{Context, Result, bail};
use serde_json::json;

use musl_ci_lib::matrix::Matrix;
use musl_ci_lib::naming::JobId;
use musl_ci_lib::pipeline::{JobDag, Pipeline, PipelineKind, version_for};

use crate::output::{OutputFormat, print_info, print_json, print_stat, symbols};

pub fn cmd_graph(release: bool, blocked_by: Option<&str>, format: OutputFormat) -> Result<()> {
  let kind = if release {
    PipelineKind::Release
  } else {
    PipelineKind::PreMerge
  };

  let pipeline = Pipeline::build(&Matrix::default(), kind, version_for(kind))
    .with_context(|| format!("Failed to expand the {} workflow", kind.name()))?;
  let dag = JobDag::from_graph(&pipeline.jobs).context("Invalid job graph")?;
  let waves = dag.waves().context("Failed to compute execution waves")?;

  if let Some(job) = blocked_by {
    let id = JobId::named(job);
    if pipeline.jobs.get(&id).is_none() {
      bail!("No job named '{}' in the {} workflow", job, kind.name());
    }
    let blocked = dag.blocked_by(&id);

    if format.is_json() {
      return print_json(&json!({ "job": id, "blocked": blocked }));
    }
    print_info(&format!("{} blocked if {} fails", blocked.len(), id));
    for job in &blocked {
      println!("  {} {}", symbols::ARROW, job);
    }
    return Ok(());
  }

  if format.is_json() {
    let jobs: Vec<_> = pipeline
      .jobs
      .entries()
      .iter()
      .map(|e| json!({ "id": e.id, "kind": e.kind, "runs_on": e.job.runs_on, "needs": e.job.needs }))
      .collect();
    return print_json(&json!({
      "name": kind.name(),
      "file": kind.file_name(),
      "version": pipeline.version,
      "jobs": jobs,
      "waves": waves,
      "deferred_checksums": pipeline.pending.len(),
    }));
  }

  print_info(&format!("{} ({})", kind.name(), kind.file_name()));
  print_stat("Jobs", &pipeline.jobs.len().to_string());
  print_stat("Deferred checksums", &pipeline.pending.len().to_string());
  println!();

  for entry in pipeline.jobs.entries() {
    println!("  {} {} [{}]", symbols::INFO, entry.id, entry.job.runs_on);
    for need in &entry.job.needs {
      println!("      {} {}", symbols::ARROW, need);
    }
  }

  println!();
  println!("Waves:");
  for (i, wave) in waves.iter().enumerate() {
    let ids: Vec<_> = wave.iter().map(ToString::to_string).collect();
    print_stat(&(i + 1).to_string(), &ids.join(", "));
  }

  Ok(())
}
