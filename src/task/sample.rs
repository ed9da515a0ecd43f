//! Periodic sampling
//!
//! Keeps the occupancy state current even when nobody is looking at the
//! dashboard. The task checks the monitor every `POLL_PERIOD`; the monitor
//! itself decides whether a sample is due, so the effective cadence is
//! `SAMPLE_INTERVAL_MS` rounded up to the next check.

use defmt::info;
use embassy_time::{Duration, Instant, Timer};

use crate::task::SharedMonitor;

/// How often the monitor is asked whether a sample is due
const POLL_PERIOD: Duration = Duration::from_millis(10);

#[embassy_executor::task]
pub async fn sample_periodically(monitor: &'static SharedMonitor) {
    info!("Periodic sampler started");

    loop {
        {
            // held through the echo wait, requests queue up behind it
            let mut monitor = monitor.lock().await;
            monitor.poll(Instant::now().as_millis()).await;
        }

        Timer::after(POLL_PERIOD).await;
    }
}
