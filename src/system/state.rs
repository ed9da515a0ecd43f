//! System State
//!
//! The parking monitor's runtime record:
//! - Gate position (commanded, not observed)
//! - Spot occupancy from the last evaluation
//! - Timestamp of the last periodic sample
//!
//! The record is owned by the parking monitor. The sampler writes occupancy
//! and the timestamp, the gate actuator writes the position, the request layer
//! only reads.
//!
//! # Invariants
//! The gate is stored as a two-valued position, so `is_gate_open()` and
//! `current_angle()` cannot disagree and the angle is always either
//! `OPEN_ANGLE` or `CLOSED_ANGLE`.

use crate::system::gate::GatePosition;

/// Parking monitor state
///
/// Initialized to:
/// - Gate closed
/// - Spot free
/// - No sample taken yet (timestamp 0)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemState {
    /// Last commanded gate position
    gate: GatePosition,
    /// Occupancy decision of the last sample
    /// - true: something closer than the threshold
    /// - false: spot free, or nothing sampled yet
    spot_occupied: bool,
    /// Uptime in ms of the last periodic sample, gates the sampling cadence
    last_sample_ms: u64,
}

impl SystemState {
    pub const fn new() -> Self {
        Self {
            gate: GatePosition::Closed,
            spot_occupied: false,
            last_sample_ms: 0,
        }
    }

    pub fn gate(&self) -> GatePosition {
        self.gate
    }

    /// True iff the gate was last commanded open
    pub fn is_gate_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Last angle commanded to the servo
    pub fn current_angle(&self) -> u16 {
        self.gate.angle()
    }

    pub fn is_spot_occupied(&self) -> bool {
        self.spot_occupied
    }

    pub fn last_sample_ms(&self) -> u64 {
        self.last_sample_ms
    }

    /// Only the gate actuator records positions
    pub(crate) fn set_gate(&mut self, position: GatePosition) {
        self.gate = position;
    }

    pub(crate) fn set_spot_occupied(&mut self, occupied: bool) {
        self.spot_occupied = occupied;
    }

    pub(crate) fn set_last_sample_ms(&mut self, now_ms: u64) {
        self.last_sample_ms = now_ms;
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}
