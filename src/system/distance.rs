//! Ultrasonic distance sampling
//!
//! Converts the echo pulse of an HC-SR04 style sensor into a distance in
//! centimeters.
//!
//! # Sensor Operation
//! - Trigger line is held low for 2µs, then pulsed high for 10µs
//! - The sensor answers with an echo pulse as wide as the sound round trip
//! - Distance = round trip time * speed of sound / 2
//!
//! # Signal Conditioning
//! There is no filtering. A reading is either inside `[0, MAX_RANGE_CM]` or it
//! is replaced by `MAX_RANGE_CM`:
//! - Echo timeout (nothing in range, or sensor fault)
//! - Computed distance beyond the rated range
//!
//! "No echo" therefore reads exactly like "very far away", which the occupancy
//! decision treats as a free spot. Every measurement ends in a finite value.

/// Speed of sound in centimeters per microsecond (343 m/s at room temperature)
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.0343;

/// Rated maximum range of the HC-SR04, also the value reported when nothing answers
pub const MAX_RANGE_CM: f32 = 400.0;

/// Time the trigger line is held low before the pulse
pub const TRIGGER_SETTLE_US: u32 = 2;

/// Width of the trigger pulse
pub const TRIGGER_PULSE_US: u32 = 10;

/// Ceiling for the whole echo wait (400cm needs ~23.3ms round trip)
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// The echo pulse did not start or end within `ECHO_TIMEOUT_US`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoTimeout;

/// Ultrasonic ranging hardware
///
/// Implementations own the trigger and echo lines. A call may block the caller
/// for up to `ECHO_TIMEOUT_US` while waiting for the echo, but must never wait
/// longer.
#[allow(async_fn_in_trait)]
pub trait EchoSensor {
    /// Fires one trigger pulse and returns the width of the echo pulse in microseconds
    async fn round_trip_us(&mut self) -> Result<u32, EchoTimeout>;
}

/// Converts an echo pulse width into a distance clamped to the sensor range
pub fn distance_from_echo(round_trip_us: u32) -> f32 {
    let distance_cm = round_trip_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0;

    // written so that NaN also lands on the clamp
    if (0.0..=MAX_RANGE_CM).contains(&distance_cm) {
        distance_cm
    } else {
        MAX_RANGE_CM
    }
}

/// Takes one measurement and returns the distance in centimeters
///
/// Never fails: a timeout is reported as `MAX_RANGE_CM`.
pub async fn measure_distance<S: EchoSensor>(sensor: &mut S) -> f32 {
    match sensor.round_trip_us().await {
        Ok(round_trip_us) => distance_from_echo(round_trip_us),
        Err(EchoTimeout) => {
            debug!("echo timed out, reporting max range");
            MAX_RANGE_CM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::fake::FakeEcho;
    use embassy_futures::block_on;

    #[test]
    fn converts_round_trip_to_centimeters() {
        // 874µs * 0.0343 / 2 = 14.989cm
        let distance = distance_from_echo(874);
        assert!((distance - 15.0).abs() < 0.1, "got {distance}");

        assert_eq!(distance_from_echo(0), 0.0);
    }

    #[test]
    fn distance_stays_inside_sensor_range() {
        let durations = [0, 1, 58, 874, 1_457, 23_323, 23_324, 30_000, 1_000_000, u32::MAX];
        for round_trip_us in durations {
            let distance = distance_from_echo(round_trip_us);
            assert!(
                (0.0..=MAX_RANGE_CM).contains(&distance),
                "{round_trip_us}us gave {distance}"
            );
        }
    }

    #[test]
    fn readings_beyond_range_are_clamped_to_max() {
        // 23_400µs would be ~401cm
        assert_eq!(distance_from_echo(23_400), MAX_RANGE_CM);
        assert_eq!(distance_from_echo(u32::MAX), MAX_RANGE_CM);
    }

    #[test]
    fn timeout_reads_as_max_range() {
        let mut sensor = FakeEcho::silent();
        assert_eq!(block_on(measure_distance(&mut sensor)), MAX_RANGE_CM);
    }

    #[test]
    fn measure_uses_sensor_reply() {
        let mut sensor = FakeEcho::replying(&[Ok(583)]);
        let distance = block_on(measure_distance(&mut sensor));
        assert!((distance - 10.0).abs() < 0.1, "got {distance}");
    }
}
