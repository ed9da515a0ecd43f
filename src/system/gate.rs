//! Barrier gate
//!
//! The gate is a servo that is only ever sent to one of two angles. Its state
//! is the commanded one: there is no position feedback, so a jammed barrier
//! still reports the last angle it was told to go to.
//!
//! # State Machine
//! - States: `Open` (90°) and `Closed` (0°)
//! - Commanding the current position again is a no-op for the state, the
//!   angle is still rewritten and the settle delay still applies
//! - Start-up always commands `Closed`, whatever the barrier did before reset
//!
//! # Timing
//! Every command waits `SETTLE_DELAY_MS` after writing the angle so the
//! barrier is in place before anything else runs.

use embedded_hal_async::delay::DelayNs;

use crate::system::state::SystemState;

/// Servo angle with the barrier raised
pub const OPEN_ANGLE: u16 = 90;

/// Servo angle with the barrier lowered
pub const CLOSED_ANGLE: u16 = 0;

/// Time given to the servo to reach its position (SG90 needs ~300ms for 90°)
pub const SETTLE_DELAY_MS: u32 = 500;

/// Commanded barrier position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatePosition {
    Open,
    Closed,
}

impl GatePosition {
    pub fn from_open(open: bool) -> Self {
        if open {
            GatePosition::Open
        } else {
            GatePosition::Closed
        }
    }

    /// Servo angle for this position
    pub fn angle(self) -> u16 {
        match self {
            GatePosition::Open => OPEN_ANGLE,
            GatePosition::Closed => CLOSED_ANGLE,
        }
    }

    pub fn is_open(self) -> bool {
        self == GatePosition::Open
    }
}

/// Gate command as accepted by the request layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateAction {
    Open,
    Close,
}

impl GateAction {
    /// Parses the `action` argument, exact match only
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "open" => Some(GateAction::Open),
            "close" => Some(GateAction::Close),
            _ => None,
        }
    }
}

/// Angle output driving the barrier servo
pub trait Servo {
    /// Sends the servo to `degrees`. Cannot fail at this level.
    fn write_angle(&mut self, degrees: u16);
}

/// Pulse width calibration of a hobby servo
///
/// Pulse width maps linearly onto the rotation range, angles past the end of
/// the range are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseRange {
    pub min_us: u32,
    pub max_us: u32,
    pub max_degrees: u16,
}

impl PulseRange {
    /// SG90 style micro servo
    pub const SG90: Self = Self {
        min_us: 500,
        max_us: 2400,
        max_degrees: 180,
    };

    /// Pulse width in µs that sends the servo to `degrees`
    pub fn pulse_us(&self, degrees: u16) -> u32 {
        if self.max_degrees == 0 {
            return self.min_us;
        }
        let degrees = u32::from(degrees.min(self.max_degrees));
        let span = self.max_us.saturating_sub(self.min_us);
        self.min_us + degrees * span / u32::from(self.max_degrees)
    }
}

/// Barrier gate actuator
pub struct Gate<S, D> {
    servo: S,
    delay: D,
}

impl<S: Servo, D: DelayNs> Gate<S, D> {
    pub fn new(servo: S, delay: D) -> Self {
        Self { servo, delay }
    }

    /// Drives the barrier open or closed and records the commanded position
    ///
    /// Returns only after the settle delay.
    pub async fn command(&mut self, state: &mut SystemState, open: bool) {
        let position = GatePosition::from_open(open);
        self.servo.write_angle(position.angle());
        state.set_gate(position);
        info!("Gate: {}", if open { "OPEN" } else { "CLOSED" });

        self.delay.delay_ms(SETTLE_DELAY_MS).await;
    }

    pub async fn open(&mut self, state: &mut SystemState) {
        self.command(state, true).await;
    }

    pub async fn close(&mut self, state: &mut SystemState) {
        self.command(state, false).await;
    }
}

#[cfg(test)]
impl<S, D> Gate<S, D> {
    pub(crate) fn servo(&self) -> &S {
        &self.servo
    }

    pub(crate) fn delay(&self) -> &D {
        &self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fake::{FakeDelay, FakeServo};
    use embassy_futures::block_on;

    fn gate() -> Gate<FakeServo, FakeDelay> {
        Gate::new(FakeServo::default(), FakeDelay::default())
    }

    #[test]
    fn opening_twice_stays_open() {
        let mut gate = gate();
        let mut state = SystemState::new();

        block_on(gate.open(&mut state));
        assert!(state.is_gate_open());
        assert_eq!(state.current_angle(), OPEN_ANGLE);

        block_on(gate.open(&mut state));
        assert!(state.is_gate_open());
        assert_eq!(state.current_angle(), OPEN_ANGLE);
        assert_eq!(gate.servo.angles, [OPEN_ANGLE, OPEN_ANGLE]);
    }

    #[test]
    fn open_then_close_returns_to_closed() {
        let mut gate = gate();
        let mut state = SystemState::new();

        block_on(gate.command(&mut state, true));
        block_on(gate.command(&mut state, false));

        assert!(!state.is_gate_open());
        assert_eq!(state.current_angle(), CLOSED_ANGLE);
        assert_eq!(gate.servo.angles, [OPEN_ANGLE, CLOSED_ANGLE]);
    }

    #[test]
    fn every_command_waits_one_settle_delay() {
        let mut gate = gate();
        let mut state = SystemState::new();

        block_on(gate.open(&mut state));
        block_on(gate.close(&mut state));
        block_on(gate.close(&mut state));

        assert_eq!(gate.delay.total_ms(), 3 * u64::from(SETTLE_DELAY_MS));
    }

    #[test]
    fn sg90_pulse_covers_both_gate_angles() {
        let range = PulseRange::SG90;

        assert_eq!(range.pulse_us(CLOSED_ANGLE), 500);
        assert_eq!(range.pulse_us(OPEN_ANGLE), 1450);
        assert_eq!(range.pulse_us(180), 2400);
    }

    #[test]
    fn pulse_is_clamped_to_the_rotation_range() {
        let range = PulseRange::SG90;
        assert_eq!(range.pulse_us(270), range.max_us);
        assert_eq!(range.pulse_us(u16::MAX), range.max_us);

        let stuck = PulseRange {
            max_degrees: 0,
            ..PulseRange::SG90
        };
        assert_eq!(stuck.pulse_us(OPEN_ANGLE), stuck.min_us);
    }

    #[test]
    fn parses_only_exact_actions() {
        assert_eq!(GateAction::parse("open"), Some(GateAction::Open));
        assert_eq!(GateAction::parse("close"), Some(GateAction::Close));
        for action in ["", "foo", "OPEN", "opened", " open"] {
            assert_eq!(GateAction::parse(action), None, "{action:?}");
        }
    }
}
