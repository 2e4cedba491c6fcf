use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Ds8rError;
use crate::param::{Mode, Output, Parameter, ParameterCode, Polarity, Source};

fn unit_step() -> i64 {
    1
}

/// Inclusive bounds for an integer parameter, with an optional step grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeRule {
    pub min: i64,
    pub max: i64,
    #[serde(default = "unit_step")]
    pub step: i64,
}

impl RangeRule {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max, step: 1 }
    }

    pub const fn stepped(min: i64, max: i64, step: i64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    fn check(&self, param: Parameter, value: i64) -> Result<u32, Ds8rError> {
        let out_of_range = || Ds8rError::OutOfRange {
            param,
            value,
            min: self.min,
            max: self.max,
        };
        if self.step < 1 {
            return Err(Ds8rError::InvalidLimits(format!(
                "{param}: step must be at least 1, got {}",
                self.step
            )));
        }
        if !self.contains(value) {
            return Err(out_of_range());
        }
        if value % self.step != 0 {
            return Err(Ds8rError::NotOnStep {
                param,
                value,
                step: self.step,
            });
        }
        u32::try_from(value).map_err(|_| out_of_range())
    }

    fn ensure_consistent(&self, name: &str) -> Result<(), Ds8rError> {
        if self.min > self.max {
            return Err(Ds8rError::InvalidLimits(format!(
                "{name}: min {} is above max {}",
                self.min, self.max
            )));
        }
        if self.min < 0 || self.max > i64::from(u32::MAX) {
            return Err(Ds8rError::InvalidLimits(format!(
                "{name}: bounds must lie within 0..={}",
                u32::MAX
            )));
        }
        if self.step < 1 {
            return Err(Ds8rError::InvalidLimits(format!(
                "{name}: step must be at least 1, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

impl fmt::Display for RangeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "{}..={}", self.min, self.max)
        } else {
            write!(f, "{}..={} step {}", self.min, self.max, self.step)
        }
    }
}

/// Non-fatal notice that a demand value sits in the range the device may
/// not reproduce accurately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    pub demand: u32,
    pub range: RangeRule,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "demand values from {} to {} may not be correctly implemented due to the limitations of the device (got {})",
            self.range.min, self.range.max, self.demand
        )
    }
}

/// Bound table for the integer-valued DS8R settings plus the safety gate.
///
/// Units follow the device: demand in 0.1 mA, pulse width and dwell in µs,
/// recovery in percent. `CANONICAL` is the table shipped with the toolkit;
/// sites running older firmware variants can load their own through a
/// session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ds8rLimits {
    pub demand: RangeRule,
    pub pulse_width: RangeRule,
    pub dwell: RangeRule,
    pub recovery: RangeRule,
    #[serde(default)]
    pub low_demand_advisory: Option<RangeRule>,
    /// `run` refuses demands strictly above this without an override.
    pub danger_threshold: i64,
}

impl Ds8rLimits {
    pub const CANONICAL: Ds8rLimits = Ds8rLimits {
        demand: RangeRule::new(1, 300),
        pulse_width: RangeRule::stepped(50, 2000, 10),
        dwell: RangeRule::new(1, 990),
        recovery: RangeRule::new(10, 100),
        low_demand_advisory: Some(RangeRule::new(1, 19)),
        danger_threshold: 150,
    };

    pub fn validate(&self) -> Result<(), Ds8rError> {
        self.demand.ensure_consistent("demand")?;
        self.pulse_width.ensure_consistent("pulse_width")?;
        self.dwell.ensure_consistent("dwell")?;
        self.recovery.ensure_consistent("recovery")?;

        if let Some(advisory) = self.low_demand_advisory {
            advisory.ensure_consistent("low_demand_advisory")?;
            if !self.demand.contains(advisory.min) || !self.demand.contains(advisory.max) {
                return Err(Ds8rError::InvalidLimits(format!(
                    "low_demand_advisory {advisory} is not inside demand {}",
                    self.demand
                )));
            }
        }

        if !self.demand.contains(self.danger_threshold) {
            return Err(Ds8rError::InvalidLimits(format!(
                "danger_threshold {} is not inside demand {}",
                self.danger_threshold, self.demand
            )));
        }
        Ok(())
    }

    /// Validate `value` for `param` and return it as the device code.
    pub fn check(&self, param: Parameter, value: i64) -> Result<u32, Ds8rError> {
        match param {
            Parameter::Mode => Mode::decode(value).map(Mode::code),
            Parameter::Polarity => Polarity::decode(value).map(Polarity::code),
            Parameter::Source => Source::decode(value).map(Source::code),
            Parameter::Enabled => Output::decode(value).map(Output::code),
            Parameter::Demand => self.demand.check(param, value),
            Parameter::PulseWidth => self.pulse_width.check(param, value),
            Parameter::Dwell => self.dwell.check(param, value),
            Parameter::Recovery => self.recovery.check(param, value),
        }
    }

    pub fn demand_advisory(&self, demand: u32) -> Option<Advisory> {
        self.low_demand_advisory
            .filter(|range| range.contains(i64::from(demand)))
            .map(|range| Advisory { demand, range })
    }

    pub fn is_dangerous(&self, demand: u32) -> bool {
        i64::from(demand) > self.danger_threshold
    }
}

impl Default for Ds8rLimits {
    fn default() -> Self {
        Self::CANONICAL
    }
}
