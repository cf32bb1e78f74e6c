//! Job and step specifications as they appear in a workflow document.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::naming::JobId;

/// One entry of a job's `steps` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Step {
  /// A shell command, optionally named.
  Run {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    run: String,
  },

  /// An invocation of an external action with named parameters.
  Uses {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    uses: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<Mapping>,
    #[serde(rename = "with", skip_serializing_if = "Option::is_none")]
    with: Option<Mapping>,
  },
}

impl Step {
  pub fn run(name: impl Into<String>, run: impl Into<String>) -> Self {
    Step::Run {
      name: Some(name.into()),
      run: run.into(),
    }
  }

  pub fn unnamed(run: impl Into<String>) -> Self {
    Step::Run {
      name: None,
      run: run.into(),
    }
  }

  pub fn uses(name: impl Into<String>, uses: impl Into<String>) -> Self {
    Step::Uses {
      id: None,
      name: name.into(),
      uses: uses.into(),
      env: None,
      with: None,
    }
  }

  pub fn with_id(mut self, step_id: &str) -> Self {
    if let Step::Uses { id, .. } = &mut self {
      *id = Some(step_id.to_string());
    }
    self
  }

  /// Adds an input parameter; ignored on `run` steps.
  pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
    if let Step::Uses { with, .. } = &mut self {
      with.get_or_insert_with(Mapping::new).insert(key.into(), value.into());
    }
    self
  }

  /// Adds an environment variable; ignored on `run` steps.
  pub fn with_env(mut self, key: &str, value: impl Into<Value>) -> Self {
    if let Step::Uses { env, .. } = &mut self {
      env.get_or_insert_with(Mapping::new).insert(key.into(), value.into());
    }
    self
  }

  pub fn name(&self) -> Option<&str> {
    match self {
      Step::Run { name, .. } => name.as_deref(),
      Step::Uses { name, .. } => Some(name),
    }
  }

  /// The shell command of a `run` step.
  pub fn command(&self) -> Option<&str> {
    match self {
      Step::Run { run, .. } => Some(run),
      Step::Uses { .. } => None,
    }
  }
}

/// A job specification: runner selector, prerequisites and steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
  #[serde(rename = "runs-on")]
  pub runs_on: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub container: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub needs: Vec<JobId>,
  pub steps: Vec<Step>,
}

/// What role a job plays in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
  Build,
  TestBuild,
  Test,
  Release,
  Publish,
  SelfCheck,
}
