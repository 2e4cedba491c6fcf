use std::thread;
use std::time::Duration;

use tracing::info;

use crate::error::Ds8rError;
use crate::launcher::Launcher;
use crate::profile::StimulationProfile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStep {
    pub name: String,
    pub profile: StimulationProfile,
    /// Pause after this step, skipped after the last one.
    pub pause: Duration,
}

/// Profiles applied one after another, e.g. a descending ladder of
/// intensity levels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StimulationSequence {
    steps: Vec<SequenceStep>,
}

impl StimulationSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, profile: StimulationProfile, pause: Duration) {
        self.steps.push(SequenceStep {
            name: name.into(),
            profile,
            pause,
        });
    }

    pub fn with_step(
        mut self,
        name: impl Into<String>,
        profile: StimulationProfile,
        pause: Duration,
    ) -> Self {
        self.push(name, profile, pause);
        self
    }

    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Safety gate over every step, so a dangerous step late in the
    /// sequence stops it before the first trigger.
    pub fn check_safety(&self, force: bool) -> Result<(), Ds8rError> {
        for step in &self.steps {
            step.profile
                .check_safety(force)
                .map_err(|e| e.in_step(&step.name))?;
        }
        Ok(())
    }

    pub fn run<L: Launcher + ?Sized>(&self, launcher: &mut L, force: bool) -> Result<(), Ds8rError> {
        if !force {
            self.check_safety(false)?;
        }
        let last = self.steps.len().saturating_sub(1);
        for (i, step) in self.steps.iter().enumerate() {
            info!(step = %step.name, demand = step.profile.demand(), "running sequence step");
            step.profile
                .run(launcher, force)
                .map_err(|e| e.in_step(&step.name))?;
            if i < last && !step.pause.is_zero() {
                thread::sleep(step.pause);
            }
        }
        Ok(())
    }
}
