//! Parking monitor firmware entry point
//!
//! Initializes the hardware, homes the gate, starts the periodic sampler and
//! then serves the dashboard for as long as the board runs.

#![no_std]
#![no_main]

use crate::task::{
    gate_servo::GateServo,
    http_server,
    network,
    resources::{
        AssignedResources, EthernetResources, GateServoResources, IRSensorResources, Irqs,
        UltrasonicDistanceSensorResources,
    },
    sample::sample_periodically,
    ultrasonic::Hcsr04,
    SharedMonitor,
};
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::pwm::{PioPwm, PioPwmProgram};
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use smart_parking::system::{
    gate::{Gate, PulseRange},
    monitor::ParkingMonitor,
};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Hardware tasks and drivers
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    // The PIO block has to outlive the servo, main never returns so keeping it here is enough.
    let Pio { mut common, sm0, .. } = Pio::new(r.gate_servo.pio, Irqs);
    let program = PioPwmProgram::new(&mut common);
    let pwm = PioPwm::new(&mut common, sm0, r.gate_servo.pin, &program);
    let servo = GateServo::new(pwm, PulseRange::SG90);

    // Gate is forced closed here, before anything can ask for its state
    let monitor = ParkingMonitor::start(
        Hcsr04::new(r.us_distance_sensor),
        Input::new(r.ir_sensor.ir_pin, Pull::Up),
        Gate::new(servo, Delay),
    )
    .await;

    static MONITOR: StaticCell<SharedMonitor> = StaticCell::new();
    let monitor: &'static SharedMonitor = MONITOR.init(Mutex::new(monitor));

    spawner.spawn(sample_periodically(monitor)).unwrap();

    let stack = network::start(spawner, r.ethernet).await;
    info!("Network up, serving dashboard");

    http_server::serve(stack, monitor).await
}
