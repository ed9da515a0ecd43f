//! Gate servo driver
//!
//! Drives the barrier servo from a PIO state machine acting as PWM, which
//! leaves the PWM slices free. The servo expects a 50Hz signal, the pulse width
//! for an angle comes from its `PulseRange`.

use core::time::Duration;
use defmt::debug;
use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::pwm::PioPwm;
use smart_parking::system::gate::{PulseRange, Servo};

/// The period of each PWM cycle
const REFRESH_INTERVAL: Duration = Duration::from_millis(20);

pub struct GateServo<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    range: PulseRange,
}

impl<'d, T: Instance, const SM: usize> GateServo<'d, T, SM> {
    /// Sets the servo period and starts the output
    pub fn new(mut pwm: PioPwm<'d, T, SM>, range: PulseRange) -> Self {
        pwm.set_period(REFRESH_INTERVAL);
        pwm.start();
        Self { pwm, range }
    }
}

impl<'d, T: Instance, const SM: usize> Servo for GateServo<'d, T, SM> {
    fn write_angle(&mut self, degrees: u16) {
        let pulse_us = self.range.pulse_us(degrees);
        debug!("degree {} duration {}", degrees, pulse_us);

        self.pwm.write(Duration::from_micros(u64::from(pulse_us)));
    }
}
