use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Ds8rError;
use crate::launcher::ProcessLauncher;
use crate::limits::Ds8rLimits;
use crate::profile::{ProfileConfig, StimulationProfile};
use crate::sequence::StimulationSequence;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    pub name: String,
    #[serde(default)]
    pub pause_ms: u64,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// JSON session file: where `DS8R_API` lives, an optional site-specific
/// limits table, and the steps to run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Ds8rLimits>,
    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, Ds8rError> {
        let text = fs::read_to_string(path).map_err(|source| Ds8rError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| Ds8rError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded session file");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, Ds8rError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn limits(&self) -> Ds8rLimits {
        self.limits.unwrap_or(Ds8rLimits::CANONICAL)
    }

    /// Validate every step and build the sequence. Fails on the first
    /// invalid step, naming it.
    pub fn to_sequence(&self) -> Result<StimulationSequence, Ds8rError> {
        let limits = self.limits();
        limits.validate()?;
        let mut sequence = StimulationSequence::new();
        for step in &self.steps {
            let profile = StimulationProfile::from_config_with_limits(&step.profile, limits)
                .map_err(|e| e.in_step(&step.name))?;
            sequence.push(step.name.clone(), profile, Duration::from_millis(step.pause_ms));
        }
        Ok(sequence)
    }

    /// Launcher for the session's executable, falling back to the
    /// process-wide default path.
    pub fn launcher(&self) -> Result<ProcessLauncher, Ds8rError> {
        match &self.api_path {
            Some(path) => Ok(ProcessLauncher::new(path.clone())),
            None => ProcessLauncher::from_default_path(),
        }
    }
}
