use std::path::PathBuf;

use thiserror::Error;

use crate::param::Parameter;

/// Coarse classification of [`Ds8rError`], used by callers that only care
/// about which guard tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input was not an integral value.
    Type,
    /// Value outside its bounds, or off its step grid.
    Range,
    /// Discrete code outside its allowed set.
    Enum,
    /// Demand above the danger threshold without override.
    Safety,
    /// Session files, limits tables, option names.
    Config,
    /// Spawning or waiting on the vendor executable.
    Launch,
}

/// Errors raised while validating, configuring or applying a stimulation
/// profile.
#[derive(Debug, Error)]
pub enum Ds8rError {
    #[error("parameter \"{param}\" must be an integer, got {value}")]
    NotAnInteger { param: Parameter, value: String },

    #[error("parameter \"{param}\" must be in the range of {min} to {max}, got {value}")]
    OutOfRange {
        param: Parameter,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("parameter \"{param}\" must be a multiple of {step}, got {value}")]
    NotOnStep {
        param: Parameter,
        value: i64,
        step: i64,
    },

    #[error("parameter \"{param}\" must be one of {allowed:?}, got {value}")]
    NotInSet {
        param: Parameter,
        value: i64,
        allowed: &'static [i64],
    },

    #[error(
        "demand {demand} exceeds the danger threshold of {threshold} ({:.1} mA); pass the force override to apply it",
        milliamps(.threshold)
    )]
    DemandAboveThreshold { demand: u32, threshold: i64 },

    #[error("invalid limits table: {0}")]
    InvalidLimits(String),

    #[error("unknown parameter \"{0}\"")]
    UnknownParameter(String),

    #[error("failed to read session file {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session file {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch {program}: {source}")]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step \"{step}\": {source}")]
    Step {
        step: String,
        #[source]
        source: Box<Ds8rError>,
    },
}

fn milliamps(tenths: &i64) -> f64 {
    *tenths as f64 / 10.0
}

impl Ds8rError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Ds8rError::NotAnInteger { .. } => ErrorKind::Type,
            Ds8rError::OutOfRange { .. } | Ds8rError::NotOnStep { .. } => ErrorKind::Range,
            Ds8rError::NotInSet { .. } => ErrorKind::Enum,
            Ds8rError::DemandAboveThreshold { .. } => ErrorKind::Safety,
            Ds8rError::InvalidLimits(_)
            | Ds8rError::UnknownParameter(_)
            | Ds8rError::ReadConfig { .. }
            | Ds8rError::ParseConfig { .. }
            | Ds8rError::Json(_)
            | Ds8rError::Io(_) => ErrorKind::Config,
            Ds8rError::Launch { .. } => ErrorKind::Launch,
            Ds8rError::Step { source, .. } => source.kind(),
        }
    }

    pub(crate) fn in_step(self, step: &str) -> Self {
        Ds8rError::Step {
            step: step.to_string(),
            source: Box::new(self),
        }
    }
}
