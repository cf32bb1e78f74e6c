//! Rendering, writing and checking the workflow documents.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::consts::{GENERATED_HEADER, WORKFLOWS_DIR};
use crate::matrix::Matrix;
use crate::naming::{ArtifactNamer, ReleasableArtifact};
use crate::template::PendingDigest;

use super::error::{DriftedFile, GenerateError};
use super::graph::{JobGraph, JobGraphBuilder, version_for};
use super::dag::JobDag;
use super::PipelineKind;

/// A fully expanded workflow.
#[derive(Debug, Clone)]
pub struct Pipeline {
  pub kind: PipelineKind,
  pub version: String,
  pub jobs: JobGraph,
  pub artifacts: Vec<ReleasableArtifact>,
  pub pending: Vec<PendingDigest>,
}

#[derive(Serialize)]
struct Document<'a> {
  name: &'static str,
  on: Mapping,
  jobs: &'a JobGraph,
}

fn triggers(kind: PipelineKind) -> Mapping {
  let mut on = Mapping::new();
  match kind {
    PipelineKind::PreMerge => {
      on.insert("pull_request".into(), Value::Null);
      on.insert("workflow_dispatch".into(), Value::Null);
    }
    PipelineKind::Release => {
      let mut push = Mapping::new();
      push.insert("tags".into(), vec!["v*"].into());
      on.insert("push".into(), push.into());
    }
  }
  on
}

impl Pipeline {
  /// Expands `matrix` into the workflow of `kind`, versioned with `version`.
  pub fn build(matrix: &Matrix, kind: PipelineKind, version: &str) -> Result<Self, GenerateError> {
    let namer = ArtifactNamer::new(&matrix.musl_version, version);
    let expansion = JobGraphBuilder::new(matrix, &namer, kind).expand()?;
    JobDag::from_graph(&expansion.graph)?;

    info!(
      pipeline = kind.name(),
      jobs = expansion.graph.len(),
      deferred_checksums = expansion.pending.len(),
      "expanded matrix"
    );
    for digest in &expansion.pending {
      debug!(
        artifact = digest.artifact(),
        hasher = %digest.hasher(),
        site = %digest.site(),
        "deferred checksum"
      );
    }

    Ok(Self {
      kind,
      version: version.to_string(),
      jobs: expansion.graph,
      artifacts: expansion.artifacts,
      pending: expansion.pending,
    })
  }

  /// Renders the workflow as YAML behind the generated-file header.
  pub fn render(&self) -> Result<String, GenerateError> {
    let document = Document {
      name: self.kind.name(),
      on: triggers(self.kind),
      jobs: &self.jobs,
    };
    let yaml = serde_yaml::to_string(&document)?;
    Ok(format!("{GENERATED_HEADER}{yaml}"))
  }
}

/// A rendered workflow and where it belongs, relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
  pub path: PathBuf,
  pub contents: String,
}

impl GeneratedFile {
  /// Hex SHA-256 of the contents.
  pub fn sha256(&self) -> String {
    sha256_hex(self.contents.as_bytes())
  }
}

/// Renders both workflows in memory.
///
/// Nothing is written here, so an error leaves the repository untouched.
pub fn generate(matrix: &Matrix) -> Result<Vec<GeneratedFile>, GenerateError> {
  let mut files = Vec::new();
  for kind in [PipelineKind::PreMerge, PipelineKind::Release] {
    let pipeline = Pipeline::build(matrix, kind, version_for(kind))?;
    files.push(GeneratedFile {
      path: Path::new(WORKFLOWS_DIR).join(kind.file_name()),
      contents: pipeline.render()?,
    });
  }
  Ok(files)
}

/// Writes generated files below `root`.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<(), GenerateError> {
  for file in files {
    let path = root.join(&file.path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
        path: parent.to_path_buf(),
        source,
      })?;
    }
    fs::write(&path, &file.contents).map_err(|source| GenerateError::Write {
      path: path.clone(),
      source,
    })?;
    info!(path = %path.display(), bytes = file.contents.len(), "wrote workflow");
  }
  Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
  hex::encode(Sha256::digest(bytes))
}

/// Compares generated files with the ones committed below `root`.
pub fn check_files(root: &Path, files: &[GeneratedFile]) -> Result<(), GenerateError> {
  let mut drifted = Vec::new();

  for file in files {
    let path = root.join(&file.path);
    let committed = match fs::read(&path) {
      Ok(bytes) => Some(bytes),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(source) => return Err(GenerateError::Read { path, source }),
    };

    if committed.as_deref() != Some(file.contents.as_bytes()) {
      debug!(path = %path.display(), "workflow differs from generated output");
      drifted.push(DriftedFile {
        path: file.path.clone(),
        committed: committed.as_deref().map(sha256_hex),
        generated: sha256_hex(file.contents.as_bytes()),
      });
    }
  }

  if drifted.is_empty() {
    Ok(())
  } else {
    Err(GenerateError::Drift(drifted))
  }
}
