use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::ArgMatches;
use ds8r_core::{
    default_api_path, Ds8rError, DryRunLauncher, Launcher, ParamValue, Parameter,
    ProcessLauncher, ProfileConfig, SessionConfig, StimulationProfile, StimulationSequence,
    WaitPolicy,
};
use ds8r_metrics::{MeteredLauncher, TriggerMetrics};
use tracing::info;

pub struct LaunchOptions {
    pub force: bool,
    pub dry_run: bool,
    pub wait: WaitPolicy,
    pub api_path: Option<PathBuf>,
}

impl LaunchOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            force: matches.get_flag("force"),
            dry_run: matches.get_flag("dry-run"),
            wait: if matches.get_flag("detach") {
                WaitPolicy::Detach
            } else {
                WaitPolicy::Wait
            },
            api_path: matches.get_one::<PathBuf>("api-path").cloned(),
        }
    }

    /// Explicit flag first, then the session file, then the process default.
    fn program(&self, session: Option<&SessionConfig>) -> anyhow::Result<PathBuf> {
        if let Some(path) = &self.api_path {
            return Ok(path.clone());
        }
        if let Some(path) = session.and_then(|s| s.api_path.as_ref()) {
            return Ok(path.clone());
        }
        let path = default_api_path().context("could not locate DS8R_API")?;
        Ok(path.to_path_buf())
    }
}

pub enum Plan<'a> {
    Profile(&'a StimulationProfile),
    Sequence(&'a StimulationSequence),
}

impl Plan<'_> {
    fn run<L: Launcher>(&self, launcher: &mut L, force: bool) -> Result<(), Ds8rError> {
        match self {
            Plan::Profile(profile) => profile.run(launcher, force),
            Plan::Sequence(sequence) => sequence.run(launcher, force),
        }
    }
}

/// Collect the parameter flags of `trigger` into constructor options.
pub fn profile_config(matches: &ArgMatches) -> ProfileConfig {
    let mut config = ProfileConfig::default();
    for param in Parameter::ALL {
        if let Some(text) = matches.get_one::<String>(param.name()) {
            config.set(param, ParamValue::parse(text));
        }
    }
    config
}

pub fn dispatch(matches: &ArgMatches, metrics: &TriggerMetrics) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("trigger", sub)) => trigger(sub, metrics),
        Some(("sequence", sub)) => sequence(sub, metrics),
        Some(("check", sub)) => check(sub),
        Some((other, _)) => bail!("unknown subcommand {other}"),
        None => bail!("no subcommand given"),
    }
}

fn trigger(matches: &ArgMatches, metrics: &TriggerMetrics) -> anyhow::Result<()> {
    let profile = StimulationProfile::from_config(&profile_config(matches))
        .context("invalid stimulation profile")?;
    let opts = LaunchOptions::from_matches(matches);
    let program = opts.program(None)?;
    for line in execute(&Plan::Profile(&profile), program, &opts, metrics)? {
        println!("{line}");
    }
    Ok(())
}

fn load_session(matches: &ArgMatches) -> anyhow::Result<(SessionConfig, StimulationSequence)> {
    let path = matches
        .get_one::<PathBuf>("session")
        .context("--session is required")?;
    let session = SessionConfig::load(path)?;
    let sequence = session
        .to_sequence()
        .with_context(|| format!("invalid session {}", path.display()))?;
    Ok((session, sequence))
}

fn sequence(matches: &ArgMatches, metrics: &TriggerMetrics) -> anyhow::Result<()> {
    let (session, sequence) = load_session(matches)?;
    let opts = LaunchOptions::from_matches(matches);
    let program = opts.program(Some(&session))?;
    info!(steps = sequence.len(), program = %program.display(), "running session");
    for line in execute(&Plan::Sequence(&sequence), program, &opts, metrics)? {
        println!("{line}");
    }
    Ok(())
}

fn check(matches: &ArgMatches) -> anyhow::Result<()> {
    let (session, sequence) = load_session(matches)?;
    let program = match &session.api_path {
        Some(path) => path.clone(),
        None => default_api_path()
            .context("could not locate DS8R_API")?
            .to_path_buf(),
    };
    for line in describe(&sequence, &program) {
        println!("{line}");
    }
    Ok(())
}

/// One line per step: name, command line, and any notes a reviewer of the
/// session should see before running it.
pub fn describe(sequence: &StimulationSequence, program: &Path) -> Vec<String> {
    sequence
        .steps()
        .iter()
        .map(|step| {
            let mut line = format!("{}: {}", step.name, step.profile.invocation(program));
            if step.profile.is_dangerous() {
                line.push_str("  [above danger threshold, needs --force]");
            }
            if let Some(advisory) = step.profile.limits().demand_advisory(step.profile.demand()) {
                line.push_str(&format!("  [{advisory}]"));
            }
            line
        })
        .collect()
}

/// Run the plan and return the command lines to print. Only dry runs
/// produce output; only real launches are counted as launched or failed.
/// Refusals are counted either way.
pub fn execute(
    plan: &Plan<'_>,
    program: PathBuf,
    opts: &LaunchOptions,
    metrics: &TriggerMetrics,
) -> anyhow::Result<Vec<String>> {
    if opts.dry_run {
        let mut launcher = DryRunLauncher::new(program);
        if let Err(e) = plan.run(&mut launcher, opts.force) {
            metrics.observe_error(&e);
            return Err(e).context("stimulation was not applied");
        }
        return Ok(launcher.issued().iter().map(|i| i.command_line()).collect());
    }

    let inner = ProcessLauncher::new(program).with_wait_policy(opts.wait);
    let mut launcher = MeteredLauncher::new(inner, metrics);
    if let Err(e) = plan.run(&mut launcher, opts.force) {
        metrics.observe_error(&e);
        return Err(e).context("stimulation was not applied");
    }
    Ok(Vec::new())
}
