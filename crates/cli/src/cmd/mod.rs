mod generate;
mod graph;
mod matrix;
mod release_body;

pub use generate::cmd_generate;
pub use graph::cmd_graph;
pub use matrix::cmd_matrix;
pub use release_body::cmd_release_body;
