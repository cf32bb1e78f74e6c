//! Integration tests for workflow generation.

mod common;
mod generation_tests;
mod graph_tests;
mod naming_tests;
