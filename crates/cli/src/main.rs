mod cmd;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// Generator for the CI workflows of the musl toolchain repository
#[derive(Parser)]
#[command(name = "musl-ci")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write the pre-merge and release workflows
  Generate {
    /// Repository root the workflow directory lives in
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Compare committed workflows with generated output instead of writing
    #[arg(long)]
    check: bool,
  },

  /// Show the jobs of a workflow, their dependencies and execution waves
  Graph {
    /// Show the release workflow instead of the pre-merge one
    #[arg(long)]
    release: bool,

    /// List the jobs that cannot run if this job fails
    #[arg(long, value_name = "JOB")]
    blocked_by: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Show the build matrix and the identifiers of every platform
  Matrix {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Render the release notes with resolved values
  ReleaseBody {
    /// Template to render (default: the embedded release.txt.template)
    #[arg(long)]
    template: Option<PathBuf>,

    /// SHA-256 of the release archive
    #[arg(long)]
    sha256: String,

    /// Download URL of the release archive
    #[arg(long)]
    url: String,

    /// Release version, e.g. v1.0.0
    #[arg(long = "version", value_name = "VERSION")]
    release_version: String,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Generate { root, check } => cmd::cmd_generate(&root, check),
    Commands::Graph {
      release,
      blocked_by,
      format,
    } => cmd::cmd_graph(release, blocked_by.as_deref(), format),
    Commands::Matrix { format } => cmd::cmd_matrix(format),
    Commands::ReleaseBody {
      template,
      sha256,
      url,
      release_version,
    } => cmd::cmd_release_body(template.as_deref(), &sha256, &url, &release_version),
  };

  if let Err(err) = result {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}
