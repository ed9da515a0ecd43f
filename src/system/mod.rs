//! Core parking components
pub mod distance;
pub mod gate;
pub mod http;
pub mod monitor;
pub mod occupancy;
pub mod state;

#[cfg(test)]
pub(crate) mod fake;
