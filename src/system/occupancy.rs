//! Occupancy decision
//!
//! A spot is occupied when the ultrasonic sensor sees something closer than
//! `OCCUPIED_THRESHOLD_CM`. The comparison is strict and has no hysteresis, so
//! a car parked right at the threshold may flip the state from one sample to
//! the next.
//!
//! The IR sensor is read alongside every sample and reported to the dashboard,
//! but it does not take part in the decision.

use embedded_hal::digital::InputPin;

/// Distance below which the spot counts as occupied (tune to the mounting height)
pub const OCCUPIED_THRESHOLD_CM: f32 = 25.0;

/// Decides occupancy from one distance reading
pub fn evaluate_occupancy(distance_cm: f32) -> bool {
    distance_cm < OCCUPIED_THRESHOLD_CM
}

/// Output of the digital IR obstacle sensor
///
/// The sensor pulls its output low when it sees an object; the input pin is
/// pulled up, so an idle line reads high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrStatus {
    /// Line low, something in front of the sensor
    Detected,
    /// Line high, nothing seen
    Clear,
}

impl IrStatus {
    /// Maps a pin level to a status (active low)
    pub fn from_level(is_high: bool) -> Self {
        if is_high {
            IrStatus::Clear
        } else {
            IrStatus::Detected
        }
    }

    /// Raw pin level as reported on the wire (0 = detected, 1 = clear)
    pub fn raw(self) -> u8 {
        match self {
            IrStatus::Detected => 0,
            IrStatus::Clear => 1,
        }
    }
}

/// Reads the IR sensor
///
/// A pin that cannot be read is reported at its pulled-up idle level.
pub fn read_ir<P: InputPin>(pin: &mut P) -> IrStatus {
    IrStatus::from_level(pin.is_high().unwrap_or(true))
}
