use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use ds8r_core::Parameter;

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Long flag for a device parameter.
pub fn flag(param: Parameter) -> &'static str {
    match param {
        Parameter::Mode => "mode",
        Parameter::Polarity => "polarity",
        Parameter::Source => "source",
        Parameter::Demand => "demand",
        Parameter::PulseWidth => "pulse-width",
        Parameter::Dwell => "dwell",
        Parameter::Recovery => "recovery",
        Parameter::Enabled => "enabled",
    }
}

fn help(param: Parameter) -> &'static str {
    match param {
        Parameter::Mode => "1 = mono-phasic, 2 = bi-phasic [default: 1]",
        Parameter::Polarity => "1 = positive, 2 = negative, 3 = alternating [default: 1]",
        Parameter::Source => "1 = internal, 2 = external [default: 1]",
        Parameter::Demand => "Output current in 0.1 mA, e.g. 24 = 2.4 mA [default: 20]",
        Parameter::PulseWidth => "Pulse duration in µs, multiple of 10 [default: 100]",
        Parameter::Dwell => "Interphase interval in µs (bi-phasic) [default: 1]",
        Parameter::Recovery => "Recovery phase ratio in percent (bi-phasic) [default: 100]",
        Parameter::Enabled => "0 = disabled, 1 = enabled [default: 1]",
    }
}

fn launch_args() -> [Arg; 4] {
    [
        Arg::new("force")
            .long("force")
            .action(ArgAction::SetTrue)
            .help("Apply demand values above the danger threshold"),
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Print the DS8R_API command lines instead of running them"),
        Arg::new("detach")
            .long("detach")
            .action(ArgAction::SetTrue)
            .help("Do not wait for DS8R_API to exit after each trigger"),
        Arg::new("api-path")
            .long("api-path")
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .help("Path to the DS8R_API executable"),
    ]
}

fn session_arg() -> Arg {
    Arg::new("session")
        .long("session")
        .required(true)
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("JSON session file with the steps to run")
}

pub fn build_cli() -> Command {
    let trigger = Parameter::ALL
        .into_iter()
        .fold(
            Command::new("trigger").about("Apply one stimulation profile and trigger an output"),
            |cmd, param| {
                cmd.arg(
                    Arg::new(param.name())
                        .long(flag(param))
                        .value_name("N")
                        .allow_negative_numbers(true)
                        .help(help(param)),
                )
            },
        )
        .args(launch_args());

    let sequence = Command::new("sequence")
        .about("Run every step of a session file in order")
        .arg(session_arg())
        .args(launch_args());

    let check = Command::new("check")
        .about("Validate a session file and print its command lines without launching")
        .arg(session_arg());

    Command::new("ds8r")
        .about("Digitimer DS8R stimulation through the vendor DS8R_API executable")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("info")
                .value_parser(LOG_LEVELS)
                .help("Logging verbosity"),
        )
        .arg(
            Arg::new("metrics")
                .long("metrics")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print trigger metrics in Prometheus text format on exit"),
        )
        .subcommand(trigger)
        .subcommand(sequence)
        .subcommand(check)
}
