use std::path::Path;

use ds8r_core::{Ds8rError, Invocation, Launcher};

use crate::{TriggerMetrics, TriggerOutcome};

/// Counts launched and failed invocations of the wrapped launcher.
pub struct MeteredLauncher<'m, L> {
    inner: L,
    metrics: &'m TriggerMetrics,
}

impl<'m, L: Launcher> MeteredLauncher<'m, L> {
    pub fn new(inner: L, metrics: &'m TriggerMetrics) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: Launcher> Launcher for MeteredLauncher<'_, L> {
    fn program(&self) -> &Path {
        self.inner.program()
    }

    fn launch(&mut self, invocation: &Invocation) -> Result<(), Ds8rError> {
        match self.inner.launch(invocation) {
            Ok(()) => {
                self.metrics.observe_launch(invocation.demand());
                Ok(())
            }
            Err(e) => {
                self.metrics.observe(TriggerOutcome::Failed);
                Err(e)
            }
        }
    }
}
