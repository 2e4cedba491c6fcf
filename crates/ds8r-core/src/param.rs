use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Ds8rError;

/// The eight DS8R settings, in the order `DS8R_API` expects them on its
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Mode,
    Polarity,
    Source,
    Demand,
    PulseWidth,
    Dwell,
    Recovery,
    Enabled,
}

impl Parameter {
    /// Command-line order.
    pub const ALL: [Parameter; 8] = [
        Parameter::Mode,
        Parameter::Polarity,
        Parameter::Source,
        Parameter::Demand,
        Parameter::PulseWidth,
        Parameter::Dwell,
        Parameter::Recovery,
        Parameter::Enabled,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Mode => "mode",
            Parameter::Polarity => "polarity",
            Parameter::Source => "source",
            Parameter::Demand => "demand",
            Parameter::PulseWidth => "pulse_width",
            Parameter::Dwell => "dwell",
            Parameter::Recovery => "recovery",
            Parameter::Enabled => "enabled",
        }
    }

    /// Position of this parameter's token after the executable path.
    pub fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = Ds8rError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| Ds8rError::UnknownParameter(s.to_string()))
    }
}

/// An untyped parameter value as it arrives from JSON or the command line.
///
/// Only `Integer` passes the validators' type check. The other variants exist
/// so the check can reject them with a useful message; command-line text is
/// classified with [`ParamValue::parse`] first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
    Text(String),
    /// Any other JSON value: `null`, booleans, arrays, objects.
    Other(serde_json::Value),
}

impl ParamValue {
    /// Classify command-line text. Base-10 integers become `Integer`,
    /// anything else that parses as a float becomes `Real`.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(v) = trimmed.parse::<i64>() {
            ParamValue::Integer(v)
        } else if let Ok(v) = trimmed.parse::<f64>() {
            ParamValue::Real(v)
        } else {
            ParamValue::Text(text.to_string())
        }
    }

    pub fn as_integer(&self, param: Parameter) -> Result<i64, Ds8rError> {
        match self {
            ParamValue::Integer(v) => Ok(*v),
            ParamValue::Text(text) => Err(Ds8rError::NotAnInteger {
                param,
                value: format!("{text:?}"),
            }),
            ParamValue::Real(v) => Err(Ds8rError::NotAnInteger {
                param,
                value: v.to_string(),
            }),
            ParamValue::Other(v) => Err(Ds8rError::NotAnInteger {
                param,
                value: v.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v}"),
            ParamValue::Text(v) => write!(f, "{v:?}"),
            ParamValue::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// A parameter that only takes values from a small discrete set of codes.
pub trait ParameterCode: Sized + Copy {
    const PARAM: Parameter;
    const CODES: &'static [i64];

    fn code(self) -> u32;
    fn from_code(code: i64) -> Option<Self>;

    fn decode(value: i64) -> Result<Self, Ds8rError> {
        Self::from_code(value).ok_or(Ds8rError::NotInSet {
            param: Self::PARAM,
            value,
            allowed: Self::CODES,
        })
    }
}

/// Pulse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Only positive or only negative current.
    #[default]
    MonoPhasic,
    /// Stimulus phase followed by an opposite recovery phase.
    BiPhasic,
}

impl ParameterCode for Mode {
    const PARAM: Parameter = Parameter::Mode;
    const CODES: &'static [i64] = &[1, 2];

    fn code(self) -> u32 {
        match self {
            Mode::MonoPhasic => 1,
            Mode::BiPhasic => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Mode::MonoPhasic),
            2 => Some(Mode::BiPhasic),
            _ => None,
        }
    }
}

/// Pulse polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Polarity {
    #[default]
    Positive,
    /// Reverses every pulse.
    Negative,
    /// Reverses on each successive trigger.
    Alternating,
}

impl ParameterCode for Polarity {
    const PARAM: Parameter = Parameter::Polarity;
    const CODES: &'static [i64] = &[1, 2, 3];

    fn code(self) -> u32 {
        match self {
            Polarity::Positive => 1,
            Polarity::Negative => 2,
            Polarity::Alternating => 3,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Polarity::Positive),
            2 => Some(Polarity::Negative),
            3 => Some(Polarity::Alternating),
            _ => None,
        }
    }
}

/// Where the pulse amplitude is controlled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Source {
    /// Front panel or software demand.
    #[default]
    Internal,
    /// External analogue voltage.
    External,
}

impl ParameterCode for Source {
    const PARAM: Parameter = Parameter::Source;
    const CODES: &'static [i64] = &[1, 2];

    fn code(self) -> u32 {
        match self {
            Source::Internal => 1,
            Source::External => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Source::Internal),
            2 => Some(Source::External),
            _ => None,
        }
    }
}

/// Output stage state. A disabled output is configured but never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Output {
    Disabled,
    #[default]
    Enabled,
}

impl ParameterCode for Output {
    const PARAM: Parameter = Parameter::Enabled;
    const CODES: &'static [i64] = &[0, 1];

    fn code(self) -> u32 {
        match self {
            Output::Disabled => 0,
            Output::Enabled => 1,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Output::Disabled),
            1 => Some(Output::Enabled),
            _ => None,
        }
    }
}
