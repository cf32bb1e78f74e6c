//! Dependency DAG over a generated job graph.
//!
//! The CI runtime decides what runs when; this view answers the same
//! questions ahead of time: which jobs can run in parallel, and which jobs a
//! failure takes down with it.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use crate::naming::JobId;

use super::error::GraphError;
use super::graph::JobGraph;

pub struct JobDag {
  /// Edges point from a prerequisite to the job needing it.
  graph: DiGraph<JobId, ()>,
  nodes: HashMap<JobId, NodeIndex>,
}

impl JobDag {
  /// Builds the DAG, adding nodes in registration order.
  pub fn from_graph(jobs: &JobGraph) -> Result<Self, GraphError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for entry in jobs.entries() {
      let idx = graph.add_node(entry.id.clone());
      nodes.insert(entry.id.clone(), idx);
    }

    for entry in jobs.entries() {
      let dependent = nodes[&entry.id];
      for need in &entry.job.needs {
        let Some(&dep) = nodes.get(need) else {
          return Err(GraphError::UnknownDependency {
            job: entry.id.clone(),
            need: need.clone(),
          });
        };
        graph.add_edge(dep, dependent, ());
      }
    }

    let dag = Self { graph, nodes };
    dag.verify_acyclic()?;
    Ok(dag)
  }

  fn verify_acyclic(&self) -> Result<(), GraphError> {
    toposort(&self.graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(())
  }

  pub fn job_count(&self) -> usize {
    self.nodes.len()
  }

  /// Jobs grouped into stages; every job's prerequisites are in earlier stages.
  ///
  /// Within a stage jobs keep their registration order.
  pub fn waves(&self) -> Result<Vec<Vec<JobId>>, GraphError> {
    let mut in_degree: Vec<usize> = self
      .graph
      .node_indices()
      .map(|idx| self.graph.neighbors_directed(idx, Direction::Incoming).count())
      .collect();
    let mut done = vec![false; in_degree.len()];
    let mut waves = Vec::new();

    while done.iter().any(|d| !d) {
      let ready: Vec<NodeIndex> = self
        .graph
        .node_indices()
        .filter(|idx| !done[idx.index()] && in_degree[idx.index()] == 0)
        .collect();

      if ready.is_empty() {
        return Err(GraphError::CycleDetected);
      }

      for &idx in &ready {
        done[idx.index()] = true;
        for neighbor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
          in_degree[neighbor.index()] = in_degree[neighbor.index()].saturating_sub(1);
        }
      }

      waves.push(ready.into_iter().map(|idx| self.graph[idx].clone()).collect());
    }

    Ok(waves)
  }

  /// Every job that cannot run if `id` fails, in registration order.
  pub fn blocked_by(&self, id: &JobId) -> Vec<JobId> {
    let Some(&start) = self.nodes.get(id) else {
      return Vec::new();
    };

    let mut reached = vec![false; self.graph.node_count()];
    let mut bfs = Bfs::new(&self.graph, start);
    while let Some(idx) = bfs.next(&self.graph) {
      if idx != start {
        reached[idx.index()] = true;
      }
    }

    self
      .graph
      .node_indices()
      .filter(|idx| reached[idx.index()])
      .map(|idx| self.graph[idx].clone())
      .collect()
  }
}
