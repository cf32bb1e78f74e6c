//! musl-ci-lib: generation of the CI workflows for the musl toolchain repository
//!
//! This crate expands a build matrix into GitHub Actions workflows:
//! - `Matrix`: source platforms, target architectures and their runners
//! - `JobGraph`: build, test-build, test and release jobs in dependency order
//! - `template`: Bazel files written into the workflow, with deferred checksums
//! - `pipeline::writer`: rendering, writing and drift checks of the YAML documents

pub mod consts;
pub mod matrix;
pub mod naming;
pub mod pipeline;
pub mod platform;
pub mod template;
