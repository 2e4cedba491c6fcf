use ds8r_core::{Ds8rError, ErrorKind};
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Launched,
    /// Blocked by the danger-threshold gate.
    Refused,
    /// The vendor executable could not be spawned or waited on.
    Failed,
}

impl TriggerOutcome {
    pub fn label(self) -> &'static str {
        match self {
            TriggerOutcome::Launched => "launched",
            TriggerOutcome::Refused => "refused",
            TriggerOutcome::Failed => "failed",
        }
    }

    /// Outcome implied by an error from `run` that the launcher never saw.
    /// Launch failures are counted by [`MeteredLauncher`](crate::MeteredLauncher).
    pub fn from_error(err: &Ds8rError) -> Option<Self> {
        match err.kind() {
            ErrorKind::Safety => Some(TriggerOutcome::Refused),
            _ => None,
        }
    }
}

pub struct TriggerMetrics {
    registry: Registry,
    pub triggers_total: IntCounterVec,
    pub last_demand: IntGauge,
}

impl TriggerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let triggers_total = IntCounterVec::new(
            Opts::new("ds8r_triggers_total", "DS8R trigger attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(triggers_total.clone()))?;

        let last_demand = IntGauge::new(
            "ds8r_last_demand",
            "Demand of the last launched trigger, in 0.1 mA",
        )?;
        registry.register(Box::new(last_demand.clone()))?;

        Ok(Self {
            registry,
            triggers_total,
            last_demand,
        })
    }

    pub fn observe(&self, outcome: TriggerOutcome) {
        self.triggers_total
            .with_label_values(&[outcome.label()])
            .inc();
    }

    pub fn observe_launch(&self, demand: u32) {
        self.observe(TriggerOutcome::Launched);
        self.last_demand.set(i64::from(demand));
    }

    /// Count a `run` that was refused before reaching the launcher.
    pub fn observe_error(&self, err: &Ds8rError) {
        match TriggerOutcome::from_error(err) {
            Some(outcome) => self.observe(outcome),
            None => debug!(error = %err, "not counting error"),
        }
    }

    pub fn count(&self, outcome: TriggerOutcome) -> u64 {
        self.triggers_total
            .with_label_values(&[outcome.label()])
            .get()
    }

    /// Prometheus text exposition of every metric in this set.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
