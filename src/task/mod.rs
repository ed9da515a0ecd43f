//! Hardware tasks and drivers
use embassy_rp::gpio::Input;
use embassy_rp::peripherals::PIO0;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::Delay;
use smart_parking::system::monitor::ParkingMonitor;

use crate::task::{gate_servo::GateServo, ultrasonic::Hcsr04};

pub mod gate_servo;
pub mod http_server;
pub mod network;
pub mod resources;
pub mod sample;
pub mod ultrasonic;

/// The parking monitor on the real hardware
pub type Monitor =
    ParkingMonitor<Hcsr04<'static>, Input<'static>, GateServo<'static, PIO0, 0>, Delay>;

/// Monitor shared by the sampler task and the HTTP server
pub type SharedMonitor = Mutex<CriticalSectionRawMutex, Monitor>;
