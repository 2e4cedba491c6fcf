use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::Ds8rError;
use crate::invocation::{default_api_path, Invocation};

/// Seam between a validated profile and whatever carries it to the device.
pub trait Launcher {
    /// Executable placed at the head of every invocation.
    fn program(&self) -> &Path;

    fn launch(&mut self, invocation: &Invocation) -> Result<(), Ds8rError>;
}

/// Whether [`ProcessLauncher`] waits for `DS8R_API` to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Block until the vendor tool exits. Consecutive triggers stay ordered.
    #[default]
    Wait,
    /// Return as soon as the process is spawned. The child is never
    /// reaped, so on Unix it stays a zombie until this process exits.
    Detach,
}

/// Spawns the vendor executable directly with an argument vector.
/// The exit status is logged and otherwise discarded.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    wait: WaitPolicy,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            wait: WaitPolicy::default(),
        }
    }

    pub fn from_default_path() -> Result<Self, Ds8rError> {
        Ok(Self::new(default_api_path()?))
    }

    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }
}

impl Launcher for ProcessLauncher {
    fn program(&self) -> &Path {
        &self.program
    }

    fn launch(&mut self, invocation: &Invocation) -> Result<(), Ds8rError> {
        let launch_error = |source| Ds8rError::Launch {
            program: invocation.program().to_path_buf(),
            source,
        };

        let mut child = Command::new(invocation.program())
            .args(invocation.args())
            .stdin(Stdio::null())
            .spawn()
            .map_err(launch_error)?;
        info!(command = %invocation, pid = child.id(), "triggered DS8R");

        match self.wait {
            WaitPolicy::Wait => {
                let status = child.wait().map_err(launch_error)?;
                debug!(%status, "DS8R_API exited");
            }
            WaitPolicy::Detach => debug!(pid = child.id(), "not waiting for DS8R_API"),
        }
        Ok(())
    }
}

/// Records invocations instead of spawning them.
#[derive(Debug, Clone, Default)]
pub struct DryRunLauncher {
    program: PathBuf,
    issued: Vec<Invocation>,
}

impl DryRunLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            issued: Vec::new(),
        }
    }

    pub fn issued(&self) -> &[Invocation] {
        &self.issued
    }
}

impl Launcher for DryRunLauncher {
    fn program(&self) -> &Path {
        &self.program
    }

    fn launch(&mut self, invocation: &Invocation) -> Result<(), Ds8rError> {
        info!(command = %invocation, "dry run, not launching");
        self.issued.push(invocation.clone());
        Ok(())
    }
}
