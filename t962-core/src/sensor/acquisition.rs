//! Thermocouple acquisition and feedback selection
//!
//! Every cycle runs exactly one of three modes, in priority order:
//!
//! 1. [`AcquisitionMode::ExtendedTc`] - both built-in probes and at least one
//!    extra probe answer on the external interface and the user enabled
//!    external feedback. The extra probe(s) drive the feedback.
//! 2. [`AcquisitionMode::DualBuiltIn`] - both built-in probes answer on the
//!    external interface. Their mean drives the feedback.
//! 3. [`AcquisitionMode::AdcFallback`] - the built-in thermocouples are read
//!    through the on-chip ADC and compensated with the ambient sensor.

use t962_hal::{AdcReader, NvKey, NvStore};

use super::calibration::AdcCalibration;
use super::state::SensorState;
use crate::traits::{ProbeBackend, TC_CHANNELS};

/// The ADC accumulates this many conversions per reading (4 extra bits)
pub const OVERSAMPLE_FACTOR: f32 = 16.0;

/// Ambient readings at or above this are not a real sensor (°C)
pub const AMBIENT_CEILING_C: f32 = 127.0;

/// Cold junction assumed when no ambient sensor is fitted (°C)
pub const ASSUMED_AMBIENT_C: f32 = 25.0;

/// ADC input of the left thermocouple amplifier
pub const ADC_CHANNEL_LEFT: u8 = 1;

/// ADC input of the right thermocouple amplifier
pub const ADC_CHANNEL_RIGHT: u8 = 2;

/// Channels driving the feedback temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FeedbackSource {
    /// No acquisition cycle has run yet
    None = 0x00,
    /// Extra 2 only
    Extra2 = 0x01,
    /// Extra 1 only
    Extra1 = 0x02,
    /// Mean of both extras
    BothExtras = 0x03,
    /// Mean of the built-in left/right pair
    BuiltIn = 0x0c,
}

impl FeedbackSource {
    /// Bitmask reported to the control loop and the console
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Acquisition mode chosen by a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AcquisitionMode {
    /// Extra thermocouples drive the feedback
    ExtendedTc,
    /// Built-in thermocouples on the external interface
    DualBuiltIn,
    /// Built-in thermocouples through the on-chip ADC
    AdcFallback,
}

/// One probe's reading for the current cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProbeReading {
    /// Thermocouple channel (0..=3)
    pub channel: usize,
    /// Hot junction temperature (°C)
    pub temperature: f32,
    /// Converter-local cold junction temperature (°C)
    pub cold_junction: f32,
}

/// Temperature acquisition
///
/// Owns the probe backend and the ADC, and publishes a [`SensorState`]
/// each time [`run_cycle`](Self::run_cycle) is called.
pub struct TemperatureAcquisition<P, A> {
    probes: P,
    adc: A,
    calibration: AdcCalibration,
    state: SensorState,
}

impl<P: ProbeBackend, A: AdcReader> TemperatureAcquisition<P, A> {
    /// Create an acquisition with identity ADC calibration
    pub fn new(probes: P, adc: A) -> Self {
        Self {
            probes,
            adc,
            calibration: AdcCalibration::IDENTITY,
            state: SensorState::new(),
        }
    }

    /// Replace the ADC gain/offset trim
    pub fn set_calibration(&mut self, calibration: AdcCalibration) {
        self.calibration = calibration;
    }

    /// Current ADC gain/offset trim
    pub fn calibration(&self) -> &AdcCalibration {
        &self.calibration
    }

    /// Last published state
    pub fn state(&self) -> &SensorState {
        &self.state
    }

    /// Probe backend, e.g. to trigger a bus conversion before a cycle
    pub fn probes_mut(&mut self) -> &mut P {
        &mut self.probes
    }

    /// Run one acquisition cycle and publish the result
    ///
    /// `config` supplies the external-feedback flag ([`NvKey::UseExtTc`]).
    pub fn run_cycle<S: NvStore + ?Sized>(&mut self, config: &S) -> &SensorState {
        let use_ext_tc = config.get_config(NvKey::UseExtTc) != 0;
        let readings = self.poll_probes();
        let previous = self.state.mode;

        let state = &mut self.state;
        state.valid_mask = 0;

        // Extras are recorded whatever drives the feedback
        for reading in readings.iter().flatten().filter(|r| r.channel > 1) {
            state.temperature[reading.channel] = reading.temperature;
            state.valid_mask |= 1 << reading.channel;
        }

        state.cold_junction_present = false;

        let mode = match (readings[0], readings[1]) {
            (Some(left), Some(right)) => {
                let extended = if use_ext_tc {
                    extended_feedback(&left, &right, readings[2], readings[3])
                } else {
                    None
                };

                let (average, cold_junction, feedback, mode) = match extended {
                    Some((average, cold_junction, feedback)) => {
                        (average, cold_junction, feedback, AcquisitionMode::ExtendedTc)
                    }
                    None => (
                        (left.temperature + right.temperature) / 2.0,
                        (left.cold_junction + right.cold_junction) / 2.0,
                        FeedbackSource::BuiltIn,
                        AcquisitionMode::DualBuiltIn,
                    ),
                };

                state.temperature[0] = left.temperature;
                state.temperature[1] = right.temperature;
                state.average = average;
                state.inner_average = inner_average(left.temperature, right.temperature);
                state.cold_junction = cold_junction;
                state.cold_junction_present = true;
                state.feedback = feedback;
                state.valid_mask |= 0x03;
                mode
            }
            _ => {
                let ambient = self.probes.read_ambient_sensor();
                if ambient < AMBIENT_CEILING_C {
                    state.cold_junction = ambient;
                    state.cold_junction_present = true;
                } else {
                    state.cold_junction = ASSUMED_AMBIENT_C;
                }

                for (channel, input) in [ADC_CHANNEL_LEFT, ADC_CHANNEL_RIGHT]
                    .into_iter()
                    .enumerate()
                {
                    let raw = f32::from(self.adc.read_raw(input)) / OVERSAMPLE_FACTOR;
                    state.temperature[channel] =
                        self.calibration.apply(channel, raw) + state.cold_junction;
                }

                state.valid_mask |= 0x03;
                state.average = (state.temperature[0] + state.temperature[1]) / 2.0;
                state.inner_average = inner_average(state.temperature[0], state.temperature[1]);
                state.feedback = FeedbackSource::BuiltIn;
                AcquisitionMode::AdcFallback
            }
        };

        if previous != Some(mode) {
            #[cfg(feature = "defmt")]
            defmt::info!("Temperature feedback: {} -> {}", previous, mode);
        }
        state.mode = Some(mode);

        &self.state
    }

    fn poll_probes(&self) -> [Option<ProbeReading>; TC_CHANNELS] {
        core::array::from_fn(|channel| {
            self.probes
                .is_channel_present(channel)
                .then(|| ProbeReading {
                    channel,
                    temperature: self.probes.read_temperature(channel),
                    cold_junction: self.probes.read_local_cold_junction(channel),
                })
        })
    }
}

/// Feedback value, cold junction and source when extra probes take over
///
/// Returns `None` when neither extra probe is present.
fn extended_feedback(
    left: &ProbeReading,
    right: &ProbeReading,
    extra1: Option<ProbeReading>,
    extra2: Option<ProbeReading>,
) -> Option<(f32, f32, FeedbackSource)> {
    match (extra1, extra2) {
        (Some(e1), Some(e2)) => Some((
            (e1.temperature + e2.temperature) / 2.0,
            (left.cold_junction + right.cold_junction + e1.cold_junction + e2.cold_junction)
                / 4.0,
            FeedbackSource::BothExtras,
        )),
        (Some(e1), None) => Some((
            e1.temperature,
            (left.cold_junction + right.cold_junction + e1.cold_junction) / 3.0,
            FeedbackSource::Extra1,
        )),
        (None, Some(e2)) => Some((
            e2.temperature,
            (left.cold_junction + right.cold_junction + e2.cold_junction) / 3.0,
            FeedbackSource::Extra2,
        )),
        (None, None) => None,
    }
}

/// Inner average of the built-in pair
///
/// NOTE: evaluates as `left + right / 2`, not the mean of the pair. Left as
/// is pending confirmation of the intended formula.
fn inner_average(left: f32, right: f32) -> f32 {
    left + right / 2.0
}
