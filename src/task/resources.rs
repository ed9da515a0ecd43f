//! Hardware Resource Management
//!
//! Assigns the RP2350 pins and peripherals to the parts of the firmware that
//! own them. Each group is handed over whole, so no two parts can drive the
//! same pin.
//!
//! # Resource Groups
//! - Ultrasonic Sensor: HC-SR04 trigger and echo pins
//! - IR Sensor: digital obstacle sensor input
//! - Gate Servo: servo signal pin, driven by a PIO state machine as PWM
//! - Ethernet: W5500 on SPI0 with its interrupt and reset lines

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;

assign_resources! {
    /// HC-SR04 ultrasonic distance sensor pins
    us_distance_sensor: UltrasonicDistanceSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
    /// IR obstacle sensor - digital output, active low
    ir_sensor: IRSensorResources {
        ir_pin: PIN_26,
    },
    /// Barrier gate servo
    gate_servo: GateServoResources {
        pin: PIN_5,
        pio: PIO0,
    },
    /// W5500 Ethernet controller
    ethernet: EthernetResources {
        spi: SPI0,
        clk_pin: PIN_18,
        mosi_pin: PIN_19,
        miso_pin: PIN_16,
        cs_pin: PIN_17,
        int_pin: PIN_21,
        reset_pin: PIN_20,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});
