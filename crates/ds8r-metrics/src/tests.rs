use ds8r_core::{DryRunLauncher, ProcessLauncher, StimulationProfile};

use crate::{MeteredLauncher, TriggerMetrics, TriggerOutcome};

#[test]
fn counts_launched_refused_and_failed() {
    let metrics = TriggerMetrics::new().unwrap();

    let mut profile = StimulationProfile::new();
    profile.set_demand(42).unwrap();

    let mut launcher = MeteredLauncher::new(DryRunLauncher::new("DS8R_API"), &metrics);
    profile.run(&mut launcher, false).unwrap();
    profile.run(&mut launcher, false).unwrap();

    profile.set_demand(180).unwrap();
    let err = profile.run(&mut launcher, false).unwrap_err();
    metrics.observe_error(&err);

    let mut broken = MeteredLauncher::new(ProcessLauncher::new("/nonexistent/DS8R_API"), &metrics);
    let err = StimulationProfile::new().run(&mut broken, false).unwrap_err();
    metrics.observe_error(&err);

    assert_eq!(metrics.count(TriggerOutcome::Launched), 2);
    assert_eq!(metrics.count(TriggerOutcome::Refused), 1);
    assert_eq!(metrics.count(TriggerOutcome::Failed), 1);
    assert_eq!(metrics.last_demand.get(), 42);
    assert_eq!(launcher.inner().issued().len(), 2);
}

#[test]
fn validation_errors_are_not_trigger_attempts() {
    let metrics = TriggerMetrics::new().unwrap();
    let err = StimulationProfile::new().set_dwell(0).unwrap_err();
    metrics.observe_error(&err);

    for outcome in [
        TriggerOutcome::Launched,
        TriggerOutcome::Refused,
        TriggerOutcome::Failed,
    ] {
        assert_eq!(metrics.count(outcome), 0);
    }
}

#[test]
fn renders_text_exposition() {
    let metrics = TriggerMetrics::new().unwrap();
    metrics.observe_launch(25);

    let text = metrics.render().unwrap();
    assert!(text.contains("ds8r_triggers_total{outcome=\"launched\"} 1"), "{text}");
    assert!(text.contains("ds8r_last_demand 25"), "{text}");
}
