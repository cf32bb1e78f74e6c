//! CI runners able to execute jobs for a given platform.

use serde::Serialize;

use crate::pipeline::types::{Job, Step};
use crate::naming::JobId;
use crate::platform::{Arch, Os, Platform, PlatformError};

/// Top-level job properties plus the steps preparing a fresh machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Runner {
  pub platform: Platform,
  pub runs_on: String,
  pub container: Option<String>,
  #[serde(skip)]
  pub setup_steps: Vec<Step>,
}

impl Runner {
  /// Creates a job on this runner with the given prerequisites and steps.
  pub fn job(&self, needs: Vec<JobId>, steps: Vec<Step>) -> Job {
    Job {
      runs_on: self.runs_on.clone(),
      container: self.container.clone(),
      needs,
      steps,
    }
  }
}

fn centos_setup() -> Vec<Step> {
  vec![
    Step::unnamed("sed -i 's|mirrorlist|#mirrorlist|g' /etc/yum.repos.d/CentOS-*"),
    Step::unnamed("sed -i 's|#baseurl=http://mirror.centos.org|baseurl=http://vault.centos.org|g' /etc/yum.repos.d/CentOS-*"),
    Step::unnamed("yum install -y bzip2 git make patch wget"),
    Step::unnamed("dnf group install -y \"Development Tools\""),
    Step::unnamed("ln -s /usr/bin/tar /usr/bin/gnutar"),
  ]
}

fn darwin_setup() -> Vec<Step> {
  vec![Step::unnamed("brew install wget md5sha1sum gnu-tar")]
}

pub fn linux_x86_64() -> Runner {
  Runner {
    platform: Platform::new(Os::Linux, Arch::X86_64),
    runs_on: "ubuntu-latest".to_string(),
    container: Some("centos:centos8".to_string()),
    setup_steps: centos_setup(),
  }
}

pub fn linux_aarch64() -> Runner {
  Runner {
    platform: Platform::new(Os::Linux, Arch::Aarch64),
    runs_on: "ubuntu-24.04-arm".to_string(),
    container: Some("centos:centos8".to_string()),
    setup_steps: centos_setup(),
  }
}

pub fn macos_x86_64() -> Runner {
  Runner {
    platform: Platform::new(Os::MacOs, Arch::X86_64),
    runs_on: "macos-13".to_string(),
    container: None,
    setup_steps: darwin_setup(),
  }
}

pub fn macos_aarch64() -> Runner {
  Runner {
    platform: Platform::new(Os::MacOs, Arch::Aarch64),
    runs_on: "macos-14".to_string(),
    container: None,
    setup_steps: darwin_setup(),
  }
}

/// Plain Ubuntu runner for jobs that only shuffle files around.
pub fn ubuntu() -> Runner {
  Runner {
    platform: Platform::new(Os::Linux, Arch::X86_64),
    runs_on: "ubuntu-latest".to_string(),
    container: None,
    setup_steps: Vec::new(),
  }
}

/// Looks up the runner for `platform`.
pub fn for_platform(platform: Platform) -> Result<Runner, PlatformError> {
  match (platform.os, platform.arch) {
    (Os::Linux, Arch::X86_64) => Ok(linux_x86_64()),
    (Os::Linux, Arch::Aarch64) => Ok(linux_aarch64()),
    (Os::MacOs, Arch::X86_64) => Ok(macos_x86_64()),
    (Os::MacOs, Arch::Aarch64) => Ok(macos_aarch64()),
    (_, Arch::Riscv64) => Err(PlatformError::NoRunner(platform)),
  }
}
