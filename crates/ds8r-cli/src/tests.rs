use std::path::{Path, PathBuf};

use ds8r_core::{ErrorKind, Ds8rError, Parameter, ParamValue, SessionConfig, StimulationProfile};
use ds8r_metrics::{TriggerMetrics, TriggerOutcome};

use crate::cli::{build_cli, flag};
use crate::commands::{describe, execute, profile_config, LaunchOptions, Plan};
use crate::logging::parse_level;

fn dry_run(force: bool) -> LaunchOptions {
    LaunchOptions {
        force,
        dry_run: true,
        wait: Default::default(),
        api_path: None,
    }
}

#[test]
fn trigger_flags_map_to_profile_options() {
    let matches = build_cli()
        .try_get_matches_from([
            "ds8r", "trigger", "--demand", "24", "--pulse-width", "200", "--mode", "2",
        ])
        .unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "trigger");

    let config = profile_config(sub);
    assert_eq!(config.get(Parameter::Demand), Some(&ParamValue::Integer(24)));
    assert_eq!(config.get(Parameter::PulseWidth), Some(&ParamValue::Integer(200)));
    assert_eq!(config.get(Parameter::Dwell), None);

    let profile = StimulationProfile::from_config(&config).unwrap();
    assert_eq!(profile.codes(), [2, 1, 1, 24, 200, 1, 100, 1]);
}

#[test]
fn fractional_demand_flag_is_a_type_error() {
    let matches = build_cli()
        .try_get_matches_from(["ds8r", "trigger", "--demand", "20.5"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    let err = StimulationProfile::from_config(&profile_config(sub)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn every_parameter_has_a_flag() {
    let cli = build_cli();
    let trigger = cli.find_subcommand("trigger").unwrap();
    for param in Parameter::ALL {
        let arg = trigger
            .get_arguments()
            .find(|a| a.get_id() == param.name())
            .unwrap_or_else(|| panic!("no flag for {param}"));
        assert_eq!(arg.get_long(), Some(flag(param)));
    }
}

#[test]
fn subcommand_is_required() {
    assert!(build_cli().try_get_matches_from(["ds8r"]).is_err());
    assert!(build_cli()
        .try_get_matches_from(["ds8r", "sequence"])
        .is_err());
}

#[test]
fn launch_flags_are_parsed() {
    let matches = build_cli()
        .try_get_matches_from([
            "ds8r",
            "--log-level",
            "debug",
            "sequence",
            "--session",
            "levels.json",
            "--force",
            "--detach",
            "--api-path",
            "/opt/ds8r/DS8R_API",
        ])
        .unwrap();
    assert_eq!(
        matches.get_one::<String>("log-level").map(String::as_str),
        Some("debug")
    );
    let (_, sub) = matches.subcommand().unwrap();
    let opts = LaunchOptions::from_matches(sub);
    assert!(opts.force);
    assert!(!opts.dry_run);
    assert_eq!(opts.wait, ds8r_core::WaitPolicy::Detach);
    assert_eq!(opts.api_path, Some(PathBuf::from("/opt/ds8r/DS8R_API")));
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(build_cli()
        .try_get_matches_from(["ds8r", "--log-level", "loud", "check", "--session", "s.json"])
        .is_err());
    assert_eq!(parse_level("WARN"), tracing::Level::WARN);
}

#[test]
fn dry_run_prints_command_lines() {
    let metrics = TriggerMetrics::new().unwrap();
    let mut profile = StimulationProfile::new();
    profile.set_demand(24).unwrap();

    let lines = execute(
        &Plan::Profile(&profile),
        PathBuf::from("DS8R_API"),
        &dry_run(false),
        &metrics,
    )
    .unwrap();
    assert_eq!(lines, vec!["\"DS8R_API\" 1 1 1 24 100 1 100 1".to_string()]);
    assert_eq!(metrics.count(TriggerOutcome::Launched), 0);
}

#[test]
fn dry_run_still_needs_force_above_threshold() {
    let metrics = TriggerMetrics::new().unwrap();
    let mut profile = StimulationProfile::new();
    profile.set_demand(200).unwrap();

    let err = execute(
        &Plan::Profile(&profile),
        PathBuf::from("DS8R_API"),
        &dry_run(false),
        &metrics,
    )
    .unwrap_err();
    let cause = err.downcast_ref::<Ds8rError>().unwrap();
    assert_eq!(cause.kind(), ErrorKind::Safety);
    assert_eq!(metrics.count(TriggerOutcome::Refused), 1);

    let lines = execute(
        &Plan::Profile(&profile),
        PathBuf::from("DS8R_API"),
        &dry_run(true),
        &metrics,
    )
    .unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(metrics.count(TriggerOutcome::Launched), 0);
}

#[test]
fn failed_launch_is_metered() {
    let metrics = TriggerMetrics::new().unwrap();
    let profile = StimulationProfile::new();
    let opts = LaunchOptions {
        dry_run: false,
        ..dry_run(false)
    };
    let result = execute(
        &Plan::Profile(&profile),
        PathBuf::from("/nonexistent/DS8R_API"),
        &opts,
        &metrics,
    );
    assert!(result.is_err());
    assert_eq!(metrics.count(TriggerOutcome::Failed), 1);
    assert_eq!(metrics.count(TriggerOutcome::Refused), 0);
}

#[test]
fn check_describes_each_step() {
    let session = SessionConfig::from_json(
        r#"{
            "steps": [
                { "name": "low", "profile": { "demand": 5 } },
                { "name": "high", "pause_ms": 500, "profile": { "demand": 200, "pulse_width": 600 } }
            ]
        }"#,
    )
    .unwrap();
    let sequence = session.to_sequence().unwrap();
    let lines = describe(&sequence, Path::new("DS8R_API"));

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("low: \"DS8R_API\" 1 1 1 5 100 1 100 1"));
    assert!(lines[0].contains("may not be correctly implemented"));
    assert!(!lines[0].contains("--force"));
    assert!(lines[1].starts_with("high: \"DS8R_API\" 1 1 1 200 600 1 100 1"));
    assert!(lines[1].contains("needs --force"));
}

#[test]
fn sequence_dry_run_issues_every_step() {
    let session = SessionConfig::from_json(
        r#"{ "steps": [
            { "name": "a", "profile": { "demand": 20 } },
            { "name": "b", "profile": { "demand": 30 } }
        ] }"#,
    )
    .unwrap();
    let sequence = session.to_sequence().unwrap();
    let metrics = TriggerMetrics::new().unwrap();
    let lines = execute(
        &Plan::Sequence(&sequence),
        PathBuf::from("DS8R_API"),
        &dry_run(false),
        &metrics,
    )
    .unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains(" 30 "));
}
