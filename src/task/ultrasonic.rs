//! HC-SR04 ultrasonic sensor driver
//!
//! Implements the trigger/echo sequence on embassy-rp GPIO. The echo pulse is
//! timed with the embassy time driver (1µs ticks), the whole wait runs against
//! one deadline so a missing or stuck echo can never hang the caller.
//!
//! The trigger pulse itself is timed with `block_for`: a 10µs async timer
//! would mostly measure executor latency.

use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{block_for, with_deadline, Duration, Instant};
use smart_parking::system::distance::{
    EchoSensor, EchoTimeout, ECHO_TIMEOUT_US, TRIGGER_PULSE_US, TRIGGER_SETTLE_US,
};

use crate::task::resources::UltrasonicDistanceSensorResources;

pub struct Hcsr04<'d> {
    trigger: Output<'d>,
    echo: Input<'d>,
}

impl Hcsr04<'static> {
    pub fn new(r: UltrasonicDistanceSensorResources) -> Self {
        Self {
            trigger: Output::new(r.trigger_pin, Level::Low),
            echo: Input::new(r.echo_pin, Pull::None),
        }
    }
}

impl EchoSensor for Hcsr04<'_> {
    async fn round_trip_us(&mut self) -> Result<u32, EchoTimeout> {
        let deadline = Instant::now() + Duration::from_micros(ECHO_TIMEOUT_US.into());

        // an echo from the previous ping may still be running
        with_deadline(deadline, self.echo.wait_for_low())
            .await
            .map_err(|_| EchoTimeout)?;

        self.trigger.set_low();
        block_for(Duration::from_micros(TRIGGER_SETTLE_US.into()));
        self.trigger.set_high();
        block_for(Duration::from_micros(TRIGGER_PULSE_US.into()));
        self.trigger.set_low();

        with_deadline(deadline, self.echo.wait_for_high())
            .await
            .map_err(|_| EchoTimeout)?;
        let rise = Instant::now();
        with_deadline(deadline, self.echo.wait_for_low())
            .await
            .map_err(|_| EchoTimeout)?;

        Ok(rise.elapsed().as_micros() as u32)
    }
}
