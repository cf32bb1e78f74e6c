//! Step constructors shared by every job.

use std::path::Path;

use crate::consts::BAZELISK_VERSION;
use crate::platform::{Os, Platform, PlatformError};

use super::types::Step;

pub fn checkout() -> Step {
  Step::uses("Checkout repo", "actions/checkout@v4")
}

/// Publishes `path` as a workflow artifact called `name`.
pub fn upload(name: &str, path: &str) -> Step {
  Step::uses(format!("Upload {name}"), "actions/upload-artifact@v4")
    .with_param("name", name)
    .with_param("path", path)
    .with_param("if-no-files-found", "error")
}

/// Fetches the workflow artifact `name` into the working directory.
pub fn download(name: &str) -> Step {
  Step::uses(format!("Download {name}"), "actions/download-artifact@v4")
    .with_param("name", name)
    .with_param("path", ".")
}

/// Makes `bazel` available on a runner of the given platform.
///
/// Linux runners download bazelisk, which needs the platform's download
/// suffix; macOS runner images already ship it.
pub fn install_bazel(platform: Platform) -> Result<Step, PlatformError> {
  match platform.os {
    Os::Linux => Ok(Step::run(
      "Download bazelisk as bazel",
      format!(
        "curl --fail -L -o /usr/local/bin/bazel https://github.com/bazelbuild/bazelisk/releases/download/{}/bazelisk-{} && chmod 0755 /usr/local/bin/bazel",
        BAZELISK_VERSION,
        platform.download_suffix()?
      ),
    )),
    Os::MacOs => Ok(Step::run(
      "Skipping downloading bazelisk - already installed",
      "bazel --version",
    )),
  }
}

/// Writes `content` to `path` through an unquoted heredoc.
///
/// Command substitutions in `content` (deferred checksums, `$(pwd)`) run when
/// the step executes, so `content` must not contain backslashes or backticks.
pub fn write_file(name: &str, path: &str, content: &str) -> Step {
  let mkdir = match Path::new(path).parent() {
    Some(dir) if !dir.as_os_str().is_empty() => format!("mkdir -p {} && ", dir.display()),
    _ => String::new(),
  };
  Step::run(name, format!("{mkdir}cat >{path} <<EOF\n{content}\nEOF\n"))
}
