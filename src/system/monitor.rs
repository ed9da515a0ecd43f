//! Parking Monitor
//!
//! Owns the system state together with the hardware it is derived from: the
//! ultrasonic sensor, the IR sensor and the barrier gate. Both the periodic
//! sampler and the request layer go through this type, so there is exactly one
//! writer of the state.
//!
//! # Sampling
//! - `poll` is the periodic check. It is level triggered: it samples when at
//!   least `SAMPLE_INTERVAL_MS` passed since the last periodic sample and does
//!   not try to make up for missed intervals.
//! - `status` always takes a fresh sample for the request it answers. It
//!   updates occupancy but leaves the periodic timestamp alone.
//!
//! # Blocking
//! A sample blocks for the echo wait, a gate command for the settle delay.
//! Whoever holds the monitor holds it for that long.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;

use crate::system::{
    distance::{measure_distance, EchoSensor},
    gate::{Gate, Servo},
    occupancy::{evaluate_occupancy, read_ir, IrStatus},
    state::SystemState,
};

/// Minimum time between two periodic samples
pub const SAMPLE_INTERVAL_MS: u64 = 500;

/// Result of one sample-and-evaluate cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Clamped distance in centimeters
    pub distance_cm: f32,
    /// Occupancy decision for `distance_cm`
    pub occupied: bool,
    /// IR sensor reading taken with the same sample (informational)
    pub ir: IrStatus,
}

/// Snapshot answered on the status endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub is_occupied: bool,
    pub distance_cm: f32,
    pub ir_status: IrStatus,
    pub is_gate_open: bool,
    pub current_angle: u16,
}

/// Parking spot monitor
pub struct ParkingMonitor<E, I, S, D> {
    state: SystemState,
    sensor: E,
    ir: I,
    gate: Gate<S, D>,
}

impl<E, I, S, D> ParkingMonitor<E, I, S, D>
where
    E: EchoSensor,
    I: InputPin,
    S: Servo,
    D: DelayNs,
{
    /// Takes ownership of the hardware and homes the gate to closed
    pub async fn start(sensor: E, ir: I, gate: Gate<S, D>) -> Self {
        let mut monitor = Self {
            state: SystemState::new(),
            sensor,
            ir,
            gate,
        };
        // whatever the barrier did before reset, it starts closed
        monitor.close_gate().await;
        info!("Parking monitor started");
        monitor
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    /// Measures, evaluates and stores occupancy
    pub async fn sample(&mut self) -> Sample {
        let distance_cm = measure_distance(&mut self.sensor).await;
        let ir = read_ir(&mut self.ir);
        let occupied = evaluate_occupancy(distance_cm);
        self.state.set_spot_occupied(occupied);

        info!(
            "Distance: {} cm | Occupied: {} | IR Status: {}",
            distance_cm,
            if occupied { "YES" } else { "NO" },
            if ir == IrStatus::Detected { "DETECTED" } else { "CLEAR" }
        );

        Sample {
            distance_cm,
            occupied,
            ir,
        }
    }

    /// Periodic check, returns the sample if one was due
    pub async fn poll(&mut self, now_ms: u64) -> Option<Sample> {
        if now_ms.saturating_sub(self.state.last_sample_ms()) < SAMPLE_INTERVAL_MS {
            return None;
        }

        let sample = self.sample().await;
        self.state.set_last_sample_ms(now_ms);
        Some(sample)
    }

    /// Takes a fresh sample and reports it together with the gate state
    pub async fn status(&mut self) -> StatusReport {
        let sample = self.sample().await;
        StatusReport {
            is_occupied: sample.occupied,
            distance_cm: sample.distance_cm,
            ir_status: sample.ir,
            is_gate_open: self.state.is_gate_open(),
            current_angle: self.state.current_angle(),
        }
    }

    pub async fn command_gate(&mut self, open: bool) {
        self.gate.command(&mut self.state, open).await;
    }

    pub async fn open_gate(&mut self) {
        self.command_gate(true).await;
    }

    pub async fn close_gate(&mut self) {
        self.command_gate(false).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{
        distance::{EchoTimeout, MAX_RANGE_CM},
        fake::{FakeDelay, FakeEcho, FakeIr, FakeMonitor, FakeServo},
        gate::{CLOSED_ANGLE, OPEN_ANGLE, SETTLE_DELAY_MS},
    };
    use embassy_futures::block_on;

    fn monitor(replies: &[Result<u32, EchoTimeout>]) -> FakeMonitor {
        block_on(ParkingMonitor::start(
            FakeEcho::replying(replies),
            FakeIr::high(),
            Gate::new(FakeServo::default(), FakeDelay::default()),
        ))
    }

    #[test]
    fn start_homes_the_gate_closed() {
        let monitor = monitor(&[]);

        assert!(!monitor.state().is_gate_open());
        assert_eq!(monitor.state().current_angle(), CLOSED_ANGLE);
        assert_eq!(monitor.gate.servo().angles, [CLOSED_ANGLE]);
        assert_eq!(monitor.gate.delay().total_ms(), u64::from(SETTLE_DELAY_MS));
    }

    #[test]
    fn sample_stores_occupancy() {
        let mut monitor = monitor(&[Ok(874), Err(EchoTimeout)]);

        let sample = block_on(monitor.sample());
        assert!(sample.occupied);
        assert!((sample.distance_cm - 15.0).abs() < 0.1);
        assert_eq!(sample.ir, IrStatus::Clear);
        assert!(monitor.state().is_spot_occupied());

        let sample = block_on(monitor.sample());
        assert!(!sample.occupied);
        assert_eq!(sample.distance_cm, MAX_RANGE_CM);
        assert!(!monitor.state().is_spot_occupied());
    }

    #[test]
    fn poll_waits_for_the_interval() {
        let mut monitor = monitor(&[Ok(874), Ok(874), Ok(874)]);

        assert!(block_on(monitor.poll(SAMPLE_INTERVAL_MS - 1)).is_none());
        assert!(block_on(monitor.poll(SAMPLE_INTERVAL_MS)).is_some());
        assert_eq!(monitor.state().last_sample_ms(), SAMPLE_INTERVAL_MS);

        assert!(block_on(monitor.poll(SAMPLE_INTERVAL_MS + 499)).is_none());
        assert!(block_on(monitor.poll(2 * SAMPLE_INTERVAL_MS)).is_some());
        assert_eq!(monitor.sensor.pings(), 2);
    }

    #[test]
    fn poll_does_not_catch_up_missed_intervals() {
        let mut monitor = monitor(&[Ok(874), Ok(874), Ok(874)]);

        // five intervals late: one sample, then the cadence restarts from here
        assert!(block_on(monitor.poll(5 * SAMPLE_INTERVAL_MS)).is_some());
        assert!(block_on(monitor.poll(5 * SAMPLE_INTERVAL_MS + 1)).is_none());
        assert_eq!(monitor.sensor.pings(), 1);
    }

    #[test]
    fn status_samples_fresh_without_moving_the_cadence() {
        let mut monitor = monitor(&[Err(EchoTimeout), Ok(874)]);

        let first = block_on(monitor.status());
        assert!(!first.is_occupied);
        assert_eq!(first.distance_cm, MAX_RANGE_CM);

        let second = block_on(monitor.status());
        assert!(second.is_occupied);
        assert_eq!(monitor.sensor.pings(), 2);
        assert_eq!(monitor.state().last_sample_ms(), 0);
    }

    #[test]
    fn status_reports_gate_state() {
        let mut monitor = monitor(&[]);
        block_on(monitor.open_gate());

        let report = block_on(monitor.status());
        assert!(report.is_gate_open);
        assert_eq!(report.current_angle, OPEN_ANGLE);
        assert_eq!(report.ir_status, IrStatus::Clear);
    }

    #[test]
    fn gate_round_trip() {
        let mut monitor = monitor(&[]);

        block_on(monitor.command_gate(true));
        assert!(monitor.state().is_gate_open());
        block_on(monitor.command_gate(false));

        assert!(!monitor.state().is_gate_open());
        assert_eq!(monitor.state().current_angle(), CLOSED_ANGLE);
    }
}
