//! Expansion of a [`Matrix`] into the job graph of a workflow.
//!
//! Jobs are registered in a fixed order: for each target architecture, for
//! each source platform, the build job and then its test-build job; after the
//! last source, the target's test job. Release-only jobs come after every
//! target. A job may only name jobs registered before it in `needs`, so the
//! registration order is a topological order and the graph cannot contain a
//! cycle.

use std::collections::HashMap;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::consts::RELEASE_VERSION_EXPR;
use crate::matrix::{Matrix, Runner, SourcePlatform, TargetArch, runners};
use crate::naming::{ArtifactNamer, JobId, ReleasableArtifact};
use crate::template::release_body;
use crate::template::workspace::{self, TestBinary};
use crate::template::{HashCommand, PendingDigest, DigestSite, release_files};

use super::error::{GenerateError, GraphError};
use super::steps::{checkout, download, install_bazel, upload, write_file};
use super::types::{Job, JobKind, Step};
use super::PipelineKind;

const RELEASE_NOTES: &str = "release-notes.txt";

/// Regenerates the workflows and fails when the committed copies differ.
pub const SELF_CHECK_COMMAND: &str = "cargo run -p musl-ci-cli -- generate --check";

/// A registered job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobEntry {
  pub id: JobId,
  pub kind: JobKind,
  pub job: Job,
}

/// Jobs of one workflow in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobGraph {
  entries: Vec<JobEntry>,
  index: HashMap<JobId, usize>,
}

impl JobGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends a job, rejecting duplicates, self references and forward references.
  pub fn register(&mut self, id: JobId, kind: JobKind, job: Job) -> Result<(), GraphError> {
    if self.index.contains_key(&id) {
      return Err(GraphError::DuplicateJob(id));
    }
    for need in &job.needs {
      if *need == id {
        return Err(GraphError::SelfDependency(id));
      }
      if !self.index.contains_key(need) {
        return Err(GraphError::UnknownDependency {
          job: id,
          need: need.clone(),
        });
      }
    }

    debug!(job = %id, kind = ?kind, needs = job.needs.len(), "registered job");
    self.index.insert(id.clone(), self.entries.len());
    self.entries.push(JobEntry { id, kind, job });
    Ok(())
  }

  pub fn get(&self, id: &JobId) -> Option<&JobEntry> {
    self.index.get(id).map(|&i| &self.entries[i])
  }

  /// Position of a job in registration order.
  pub fn position(&self, id: &JobId) -> Option<usize> {
    self.index.get(id).copied()
  }

  pub fn entries(&self) -> &[JobEntry] {
    &self.entries
  }

  /// Ids of every job of `kind`, in registration order.
  pub fn ids_of(&self, kind: JobKind) -> Vec<JobId> {
    self
      .entries
      .iter()
      .filter(|e| e.kind == kind)
      .map(|e| e.id.clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Serialize for JobGraph {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(self.entries.iter().map(|e| (&e.id, &e.job)))
  }
}

/// Result of expanding a matrix.
#[derive(Debug, Clone)]
pub struct Expansion {
  pub graph: JobGraph,
  /// One per build job, tested or not.
  pub artifacts: Vec<ReleasableArtifact>,
  /// Every checksum the emitted files leave to execution time.
  pub pending: Vec<PendingDigest>,
}

pub struct JobGraphBuilder<'a> {
  matrix: &'a Matrix,
  namer: &'a ArtifactNamer,
  kind: PipelineKind,
  graph: JobGraph,
  artifacts: Vec<ReleasableArtifact>,
  test_jobs: Vec<JobId>,
  pending: Vec<PendingDigest>,
}

impl<'a> JobGraphBuilder<'a> {
  pub fn new(matrix: &'a Matrix, namer: &'a ArtifactNamer, kind: PipelineKind) -> Self {
    Self {
      matrix,
      namer,
      kind,
      graph: JobGraph::new(),
      artifacts: Vec::new(),
      test_jobs: Vec::new(),
      pending: Vec::new(),
    }
  }

  /// Expands the matrix into the complete job graph of the workflow.
  pub fn expand(mut self) -> Result<Expansion, GenerateError> {
    let matrix = self.matrix;
    matrix.validate()?;
    matrix.ensure_mapped()?;

    for target in &matrix.targets {
      let mut test_builds = Vec::new();
      let mut binaries = Vec::new();

      for source in &matrix.sources {
        let build = self.add_build(source, target)?;
        if target.tester().is_some() {
          let (test_build, binary) = self.add_test_build(source, target, build)?;
          test_builds.push(test_build);
          binaries.push(binary);
        }
      }

      if let Some(tester) = target.tester() {
        self.add_test(target, tester, test_builds, &binaries)?;
      }
    }

    match self.kind {
      PipelineKind::PreMerge => self.add_self_check()?,
      PipelineKind::Release => {
        let release = self.add_release()?;
        self.add_publish(release)?;
      }
    }

    Ok(Expansion {
      graph: self.graph,
      artifacts: self.artifacts,
      pending: self.pending,
    })
  }

  fn add_build(&mut self, source: &SourcePlatform, target: &TargetArch) -> Result<JobId, GenerateError> {
    let id = JobId::build(source.platform, target.arch);
    let archive = self.namer.toolchain_archive(source.platform, target.arch);

    let mut steps = vec![checkout()];
    steps.extend(source.runner.setup_steps.iter().cloned());
    steps.push(Step::run("Build musl", format!("./build.sh {}", target.arch.for_musl())));
    steps.push(upload(&archive, &format!("output/{archive}")));

    self.graph.register(id.clone(), JobKind::Build, source.runner.job(Vec::new(), steps))?;
    self.artifacts.push(ReleasableArtifact {
      build_job: id.clone(),
      source: source.platform,
      target_arch: target.arch,
      target_os: self.matrix.target_os,
      filename: archive,
    });
    Ok(id)
  }

  /// Builds a binary with the fresh toolchain, nested inside a Bazel build.
  fn add_test_build(
    &mut self,
    source: &SourcePlatform,
    target: &TargetArch,
    build: JobId,
  ) -> Result<(JobId, TestBinary), GenerateError> {
    let id = JobId::test_build(source.platform, target.arch);
    let archive = self.namer.toolchain_archive(source.platform, target.arch);
    let binary = self.namer.test_binary(source.platform, target.arch);
    let hasher = HashCommand::for_os(source.runner.platform.os);

    let builder_workspace = workspace::builder_workspace(&archive, hasher);
    let builder_config = workspace::builder_config(source.platform, self.matrix.target_platform(target.arch));

    let steps = vec![
      checkout(),
      download(&archive),
      install_bazel(source.runner.platform)?,
      write_file(
        "Generate builder workspace file",
        workspace::BUILDER_WORKSPACE,
        &builder_workspace.text,
      ),
      write_file(
        "Generate builder workspace config BUILD.bazel file",
        workspace::BUILDER_CONFIG_BUILD,
        &builder_config,
      ),
      Step::run(
        "Build test binary with musl",
        "cd test-workspaces/builder && BAZEL_DO_NOT_DETECT_CPP_TOOLCHAIN=1 bazel build //:binary \
         --platforms=//config:platform --extra_toolchains=//config:musl_toolchain \
         --incompatible_enable_cc_toolchain_resolution",
      ),
      Step::run(
        "Move test binary",
        format!("mkdir output && cp test-workspaces/builder/bazel-bin/binary output/{binary}"),
      ),
      upload(&binary, &format!("output/{binary}")),
    ];

    self
      .graph
      .register(id.clone(), JobKind::TestBuild, source.runner.job(vec![build], steps))?;
    self.pending.extend(builder_workspace.pending);
    Ok((
      id,
      TestBinary {
        source: source.platform,
        filename: binary,
      },
    ))
  }

  fn add_test(
    &mut self,
    target: &TargetArch,
    tester: &Runner,
    test_builds: Vec<JobId>,
    binaries: &[TestBinary],
  ) -> Result<(), GenerateError> {
    let id = JobId::test(target.arch);
    let tester_workspace = workspace::tester_workspace(binaries, HashCommand::for_os(tester.platform.os));

    let mut steps = vec![checkout()];
    steps.extend(binaries.iter().map(|b| download(&b.filename)));
    steps.push(install_bazel(tester.platform)?);
    steps.push(write_file(
      "Generate tester workspace file",
      workspace::TESTER_WORKSPACE,
      &tester_workspace.text,
    ));
    steps.push(Step::unnamed(
      "cd test-workspaces/tester && CC=/bin/false bazel test ... --test_output=all",
    ));

    self.graph.register(id.clone(), JobKind::Test, tester.job(test_builds, steps))?;
    self.pending.extend(tester_workspace.pending);
    self.test_jobs.push(id);
    Ok(())
  }

  /// Packages the Bazel integration files once everything is built and tested.
  fn add_release(&mut self) -> Result<JobId, GenerateError> {
    release_body::parse(release_body::RELEASE_BODY_TEMPLATE)?;

    let id = JobId::named(JobId::RELEASE);
    let runner = runners::ubuntu();
    let hasher = HashCommand::for_os(runner.platform.os);
    let archive = self.namer.release_archive();
    let files = release_files(&self.artifacts, self.namer, hasher);

    let mut steps = vec![checkout(), Step::unnamed("sudo ln -s /usr/bin/tar /usr/bin/gnutar")];
    steps.extend(self.artifacts.iter().map(|a| download(&a.filename)));
    for file in &files {
      steps.push(write_file(&format!("Generate {}", file.path), file.path, &file.rendered.text));
    }
    let paths = files.iter().map(|f| f.path).collect::<Vec<_>>().join(" ");
    steps.push(Step::run(
      "Generate release archive",
      format!("./deterministic-tar.sh {archive} {paths}"),
    ));

    let archive_digest = PendingDigest::new(&archive, hasher, DigestSite::ReleaseBody);
    steps.push(Step::run(
      "Generate release body",
      release_body::sed_command(
        &archive_digest,
        &self.namer.download_url(&archive),
        self.namer.release_version(),
        RELEASE_NOTES,
      ),
    ));
    steps.push(upload(&archive, &archive));
    steps.push(upload(RELEASE_NOTES, RELEASE_NOTES));

    let needs = self
      .artifacts
      .iter()
      .map(|a| a.build_job.clone())
      .chain(self.test_jobs.iter().cloned())
      .collect();

    self.graph.register(id.clone(), JobKind::Release, runner.job(needs, steps))?;
    self.pending.extend(files.into_iter().flat_map(|f| f.rendered.pending));
    self.pending.push(archive_digest);
    Ok(id)
  }

  /// Creates the GitHub release and attaches every archive to it.
  fn add_publish(&mut self, release: JobId) -> Result<(), GenerateError> {
    let archive = self.namer.release_archive();
    let mut assets = vec![archive.clone()];
    assets.extend(self.artifacts.iter().map(|a| a.filename.clone()));

    let mut steps = vec![download(&archive), download(RELEASE_NOTES)];
    steps.extend(self.artifacts.iter().map(|a| download(&a.filename)));
    steps.push(
      Step::uses("Create release", "softprops/action-gh-release@v2")
        .with_id("create_release")
        .with_env("GITHUB_TOKEN", "${{ secrets.GITHUB_TOKEN }}")
        .with_param("tag_name", self.namer.release_version())
        .with_param("body_path", RELEASE_NOTES)
        .with_param("generate_release_notes", true)
        .with_param("fail_on_unmatched_files", true)
        .with_param("files", assets.join("\n")),
    );

    self.graph.register(
      JobId::named(JobId::PUBLISH),
      JobKind::Publish,
      runners::ubuntu().job(vec![release], steps),
    )?;
    Ok(())
  }

  /// Fails the pre-merge workflow when committed workflows are stale.
  fn add_self_check(&mut self) -> Result<(), GenerateError> {
    let steps = vec![
      checkout(),
      Step::uses("Install Rust toolchain", "dtolnay/rust-toolchain@stable"),
      Step::run(
        "Check generated workflows are up to date",
        SELF_CHECK_COMMAND,
      ),
    ];
    self.graph.register(
      JobId::named(JobId::CHECK_GENERATED),
      JobKind::SelfCheck,
      runners::ubuntu().job(Vec::new(), steps),
    )?;
    Ok(())
  }
}

/// The version string a pipeline of `kind` is generated with.
pub fn version_for(kind: PipelineKind) -> &'static str {
  match kind {
    PipelineKind::PreMerge => crate::consts::DEV_VERSION,
    PipelineKind::Release => RELEASE_VERSION_EXPR,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{Arch, PlatformError};

  fn job(needs: Vec<JobId>) -> Job {
    runners::ubuntu().job(needs, Vec::new())
  }

  #[test]
  fn register_rejects_duplicates() {
    let mut graph = JobGraph::new();
    graph.register(JobId::named("a"), JobKind::Build, job(vec![])).unwrap();
    assert_eq!(
      graph.register(JobId::named("a"), JobKind::Build, job(vec![])),
      Err(GraphError::DuplicateJob(JobId::named("a")))
    );
  }

  #[test]
  fn register_rejects_forward_and_self_references() {
    let mut graph = JobGraph::new();
    assert_eq!(
      graph.register(JobId::named("a"), JobKind::Test, job(vec![JobId::named("b")])),
      Err(GraphError::UnknownDependency {
        job: JobId::named("a"),
        need: JobId::named("b"),
      })
    );
    assert_eq!(
      graph.register(JobId::named("a"), JobKind::Test, job(vec![JobId::named("a")])),
      Err(GraphError::SelfDependency(JobId::named("a")))
    );
    assert!(graph.is_empty());
  }

  #[test]
  fn serializes_as_ordered_mapping() {
    let mut graph = JobGraph::new();
    graph.register(JobId::named("zeta"), JobKind::Build, job(vec![])).unwrap();
    graph
      .register(JobId::named("alpha"), JobKind::Test, job(vec![JobId::named("zeta")]))
      .unwrap();

    let yaml = serde_yaml::to_string(&graph).unwrap();
    let zeta = yaml.find("zeta:").unwrap();
    let alpha = yaml.find("alpha:").unwrap();
    assert!(zeta < alpha);
  }

  #[test]
  fn default_pre_merge_graph_shape() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, version_for(PipelineKind::PreMerge));
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::PreMerge)
      .expand()
      .unwrap();
    let graph = &expansion.graph;

    // Two targets from three sources; only x86_64 is tested.
    assert_eq!(graph.ids_of(JobKind::Build).len(), 6);
    assert_eq!(graph.ids_of(JobKind::TestBuild).len(), 3);
    assert_eq!(graph.ids_of(JobKind::Test), vec![JobId::named("test-x86_64")]);
    assert_eq!(graph.ids_of(JobKind::SelfCheck).len(), 1);
    assert!(graph.ids_of(JobKind::Release).is_empty());
    assert_eq!(expansion.artifacts.len(), 6);
  }

  #[test]
  fn test_build_needs_only_its_build() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::PreMerge)
      .expand()
      .unwrap();

    for id in expansion.graph.ids_of(JobKind::TestBuild) {
      let entry = expansion.graph.get(&id).unwrap();
      let build = id.as_str().strip_suffix("-test-build").unwrap();
      assert_eq!(entry.job.needs, vec![JobId::named(build)]);
    }
  }

  #[test]
  fn release_needs_builds_then_tests() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::Release)
      .expand()
      .unwrap();
    let graph = &expansion.graph;

    let mut expected = graph.ids_of(JobKind::Build);
    expected.extend(graph.ids_of(JobKind::Test));
    let release = graph.get(&JobId::named(JobId::RELEASE)).unwrap();
    assert_eq!(release.job.needs, expected);

    let publish = graph.get(&JobId::named(JobId::PUBLISH)).unwrap();
    assert_eq!(publish.job.needs, vec![JobId::named(JobId::RELEASE)]);
    assert_eq!(graph.entries().last().unwrap().kind, JobKind::Publish);
  }

  #[test]
  fn test_build_runs_on_source_runner() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::PreMerge)
      .expand()
      .unwrap();

    let source = &matrix.sources[2];
    let id = JobId::test_build(source.platform, matrix.targets[0].arch);
    let entry = expansion.graph.get(&id).unwrap();
    assert_eq!(entry.job.runs_on, source.runner.runs_on);

    // macOS runners hash with shasum.
    let workspace_step = entry
      .job
      .steps
      .iter()
      .find(|s| s.name() == Some("Generate builder workspace file"))
      .unwrap();
    assert!(workspace_step.command().unwrap().contains("$(shasum -a 256 musl-"));
  }

  #[test]
  fn pending_digests_cover_every_deferred_checksum() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::Release)
      .expand()
      .unwrap();

    // 3 builder workspaces + 3 tester files + 6 release archives + release body.
    assert_eq!(expansion.pending.len(), 13);
    assert_eq!(
      expansion
        .pending
        .iter()
        .filter(|d| *d.site() == DigestSite::ReleaseBody)
        .count(),
      1
    );
  }

  #[test]
  fn self_check_regenerates_without_a_lockfile() {
    let matrix = Matrix::default();
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");
    let expansion = JobGraphBuilder::new(&matrix, &namer, PipelineKind::PreMerge)
      .expand()
      .unwrap();

    let entry = expansion.graph.get(&JobId::named(JobId::CHECK_GENERATED)).unwrap();
    let step = entry
      .job
      .steps
      .iter()
      .find(|s| s.name() == Some("Check generated workflows are up to date"))
      .unwrap();
    assert_eq!(step.command(), Some(SELF_CHECK_COMMAND));
    assert!(!SELF_CHECK_COMMAND.contains("--locked"));
  }

  #[test]
  fn release_only_unmapped_target_fails_expansion() {
    let mut matrix = Matrix::default();
    matrix.targets.push(TargetArch::release_only(Arch::Riscv64, "no bazelisk asset"));
    let namer = ArtifactNamer::new(&matrix.musl_version, "v1");

    for kind in [PipelineKind::PreMerge, PipelineKind::Release] {
      let err = JobGraphBuilder::new(&matrix, &namer, kind).expand().unwrap_err();
      assert!(matches!(
        err,
        GenerateError::Platform(PlatformError::UnknownPlatform { convention: "download", .. })
      ));
    }
  }
}
