//! Validated stimulation profiles for the Digitimer DS8R current stimulator.
//!
//! A [`StimulationProfile`] holds the eight device settings, each checked
//! against a [`Ds8rLimits`] table when assigned. [`StimulationProfile::run`]
//! passes the settings to the vendor's `DS8R_API` executable, which does the
//! actual device communication.

pub mod error;
pub mod invocation;
pub mod launcher;
pub mod limits;
pub mod param;
pub mod profile;
pub mod sequence;
pub mod session;


pub use error::{Ds8rError, ErrorKind};
pub use invocation::{default_api_path, Invocation, API_FILE_STEM, API_PATH_ENV};
pub use launcher::{DryRunLauncher, Launcher, ProcessLauncher, WaitPolicy};
pub use limits::{Advisory, Ds8rLimits, RangeRule};
pub use param::{Mode, Output, ParamValue, Parameter, ParameterCode, Polarity, Source};
pub use profile::{ProfileConfig, StimulationProfile};
pub use sequence::{SequenceStep, StimulationSequence};
pub use session::{SessionConfig, StepConfig};
