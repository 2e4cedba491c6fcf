mod metered;
mod metrics;
#[cfg(test)]
mod tests;

pub use metered::MeteredLauncher;
pub use metrics::{TriggerMetrics, TriggerOutcome};
