//! Smart parking spot monitor
//!
//! Hardware independent core of the parking firmware. Everything that decides
//! something lives here and talks to the hardware only through small capability
//! traits, so it runs unchanged on the RP2350 and in host tests:
//! - Ultrasonic distance sampling with a hard clamp to the sensor range
//! - Occupancy decision from the measured distance
//! - Two-position barrier gate driven by a servo
//! - The shared monitor state and its periodic sampling check
//! - HTTP routing and response rendering for the dashboard
//!
//! The firmware binary (`firmware` feature) wires these to embassy-rp drivers.

#![cfg_attr(not(test), no_std)]

// Must stay first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

/// Core parking components
pub mod system;
