use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::error::Ds8rError;
use crate::invocation::Invocation;
use crate::launcher::Launcher;
use crate::limits::Ds8rLimits;
use crate::param::{Mode, Output, ParamValue, Parameter, ParameterCode, Polarity, Source};

pub const DEFAULT_DEMAND: u32 = 20;
pub const DEFAULT_PULSE_WIDTH: u32 = 100;
pub const DEFAULT_DWELL: u32 = 1;
pub const DEFAULT_RECOVERY: u32 = 100;

/// Constructor options for a [`StimulationProfile`]. Omitted options take
/// their defaults; values stay untyped until the profile validates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub mode: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub polarity: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub demand: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub pulse_width: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub dwell: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub recovery: Option<ParamValue>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub enabled: Option<ParamValue>,
}

/// A key that is present is always `Some`, so an explicit `null` reaches the
/// type check instead of silently taking the default.
fn present<'de, D>(deserializer: D) -> Result<Option<ParamValue>, D::Error>
where
    D: Deserializer<'de>,
{
    ParamValue::deserialize(deserializer).map(Some)
}

impl ProfileConfig {
    pub fn get(&self, param: Parameter) -> Option<&ParamValue> {
        self.slot(param).as_ref()
    }

    pub fn set(&mut self, param: Parameter, value: impl Into<ParamValue>) -> &mut Self {
        *self.slot_mut(param) = Some(value.into());
        self
    }

    fn slot(&self, param: Parameter) -> &Option<ParamValue> {
        match param {
            Parameter::Mode => &self.mode,
            Parameter::Polarity => &self.polarity,
            Parameter::Source => &self.source,
            Parameter::Demand => &self.demand,
            Parameter::PulseWidth => &self.pulse_width,
            Parameter::Dwell => &self.dwell,
            Parameter::Recovery => &self.recovery,
            Parameter::Enabled => &self.enabled,
        }
    }

    fn slot_mut(&mut self, param: Parameter) -> &mut Option<ParamValue> {
        match param {
            Parameter::Mode => &mut self.mode,
            Parameter::Polarity => &mut self.polarity,
            Parameter::Source => &mut self.source,
            Parameter::Demand => &mut self.demand,
            Parameter::PulseWidth => &mut self.pulse_width,
            Parameter::Dwell => &mut self.dwell,
            Parameter::Recovery => &mut self.recovery,
            Parameter::Enabled => &mut self.enabled,
        }
    }
}

/// The eight DS8R settings, each holding a value that passed its validator.
///
/// Nothing reaches the device until [`StimulationProfile::run`] is called.
/// A rejected assignment leaves every field as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StimulationProfile {
    limits: Ds8rLimits,
    mode: Mode,
    polarity: Polarity,
    source: Source,
    demand: u32,
    pulse_width: u32,
    dwell: u32,
    recovery: u32,
    enabled: Output,
}

impl Default for StimulationProfile {
    fn default() -> Self {
        Self {
            limits: Ds8rLimits::CANONICAL,
            mode: Mode::default(),
            polarity: Polarity::default(),
            source: Source::default(),
            demand: DEFAULT_DEMAND,
            pulse_width: DEFAULT_PULSE_WIDTH,
            dwell: DEFAULT_DWELL,
            recovery: DEFAULT_RECOVERY,
            enabled: Output::default(),
        }
    }
}

impl StimulationProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ProfileConfig) -> Result<Self, Ds8rError> {
        Self::from_config_with_limits(config, Ds8rLimits::CANONICAL)
    }

    /// Build a profile against a custom limits table. Every option, given
    /// or defaulted, is checked against `limits`; the first failure wins
    /// and no profile is returned.
    pub fn from_config_with_limits(
        config: &ProfileConfig,
        limits: Ds8rLimits,
    ) -> Result<Self, Ds8rError> {
        limits.validate()?;
        let defaults = Self::default();
        let mut profile = Self { limits, ..defaults };
        for param in Parameter::ALL {
            match config.get(param) {
                Some(value) => profile.assign(param, value)?,
                None => profile.set(param, i64::from(defaults.get(param)))?,
            }
        }
        Ok(profile)
    }

    pub fn limits(&self) -> &Ds8rLimits {
        &self.limits
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Output current in 0.1 mA.
    pub fn demand(&self) -> u32 {
        self.demand
    }

    /// Pulse duration in µs.
    pub fn pulse_width(&self) -> u32 {
        self.pulse_width
    }

    /// Interphase interval in µs.
    pub fn dwell(&self) -> u32 {
        self.dwell
    }

    /// Recovery phase ratio in percent.
    pub fn recovery(&self) -> u32 {
        self.recovery
    }

    pub fn enabled(&self) -> Output {
        self.enabled
    }

    pub fn set_mode(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.mode = Mode::decode(value)?;
        Ok(())
    }

    pub fn set_polarity(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.polarity = Polarity::decode(value)?;
        Ok(())
    }

    pub fn set_source(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.source = Source::decode(value)?;
        Ok(())
    }

    /// Values in the limits' low-demand range are accepted but logged as an
    /// advisory.
    pub fn set_demand(&mut self, value: i64) -> Result<(), Ds8rError> {
        let demand = self.limits.check(Parameter::Demand, value)?;
        if let Some(advisory) = self.limits.demand_advisory(demand) {
            warn!(demand, "{advisory}");
        }
        self.demand = demand;
        Ok(())
    }

    pub fn set_pulse_width(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.pulse_width = self.limits.check(Parameter::PulseWidth, value)?;
        Ok(())
    }

    pub fn set_dwell(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.dwell = self.limits.check(Parameter::Dwell, value)?;
        Ok(())
    }

    pub fn set_recovery(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.recovery = self.limits.check(Parameter::Recovery, value)?;
        Ok(())
    }

    pub fn set_enabled(&mut self, value: i64) -> Result<(), Ds8rError> {
        self.enabled = Output::decode(value)?;
        Ok(())
    }

    pub fn set(&mut self, param: Parameter, value: i64) -> Result<(), Ds8rError> {
        match param {
            Parameter::Mode => self.set_mode(value),
            Parameter::Polarity => self.set_polarity(value),
            Parameter::Source => self.set_source(value),
            Parameter::Demand => self.set_demand(value),
            Parameter::PulseWidth => self.set_pulse_width(value),
            Parameter::Dwell => self.set_dwell(value),
            Parameter::Recovery => self.set_recovery(value),
            Parameter::Enabled => self.set_enabled(value),
        }
    }

    /// Type-check an untyped value, then validate and commit it.
    pub fn assign(&mut self, param: Parameter, value: &ParamValue) -> Result<(), Ds8rError> {
        let value = value.as_integer(param)?;
        self.set(param, value)
    }

    /// Current device code for `param`.
    pub fn get(&self, param: Parameter) -> u32 {
        match param {
            Parameter::Mode => self.mode.code(),
            Parameter::Polarity => self.polarity.code(),
            Parameter::Source => self.source.code(),
            Parameter::Demand => self.demand,
            Parameter::PulseWidth => self.pulse_width,
            Parameter::Dwell => self.dwell,
            Parameter::Recovery => self.recovery,
            Parameter::Enabled => self.enabled.code(),
        }
    }

    /// All codes in command-line order.
    pub fn codes(&self) -> [u32; 8] {
        Parameter::ALL.map(|param| self.get(param))
    }

    pub fn config(&self) -> ProfileConfig {
        let mut config = ProfileConfig::default();
        for param in Parameter::ALL {
            config.set(param, i64::from(self.get(param)));
        }
        config
    }

    pub fn is_dangerous(&self) -> bool {
        self.limits.is_dangerous(self.demand)
    }

    /// The safety gate applied by [`run`](Self::run).
    pub fn check_safety(&self, force: bool) -> Result<(), Ds8rError> {
        if !self.is_dangerous() {
            return Ok(());
        }
        if !force {
            return Err(Ds8rError::DemandAboveThreshold {
                demand: self.demand,
                threshold: self.limits.danger_threshold,
            });
        }
        warn!(
            demand = self.demand,
            threshold = self.limits.danger_threshold,
            "forcing demand above the danger threshold"
        );
        Ok(())
    }

    pub fn invocation(&self, program: &Path) -> Invocation {
        Invocation::new(program, self.codes())
    }

    /// Apply the settings to the device and trigger an output.
    ///
    /// Fails without spawning anything when demand is above the danger
    /// threshold and `force` is false.
    pub fn run<L: Launcher + ?Sized>(&self, launcher: &mut L, force: bool) -> Result<(), Ds8rError> {
        self.check_safety(force)?;
        let invocation = self.invocation(launcher.program());
        debug!(command = %invocation, "applying stimulation profile");
        launcher.launch(&invocation)
    }
}
