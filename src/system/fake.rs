//! Test doubles for the hardware capability traits

use std::collections::VecDeque;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin};
use embedded_hal_async::delay::DelayNs;

use crate::system::{
    distance::{EchoSensor, EchoTimeout},
    gate::Servo,
    monitor::ParkingMonitor,
};

pub type FakeMonitor = ParkingMonitor<FakeEcho, FakeIr, FakeServo, FakeDelay>;

/// Ultrasonic sensor answering from a script, timing out once it runs dry
pub struct FakeEcho {
    replies: VecDeque<Result<u32, EchoTimeout>>,
    pings: usize,
}

impl FakeEcho {
    pub fn replying(replies: &[Result<u32, EchoTimeout>]) -> Self {
        Self {
            replies: replies.iter().copied().collect(),
            pings: 0,
        }
    }

    pub fn silent() -> Self {
        Self::replying(&[])
    }

    pub fn pings(&self) -> usize {
        self.pings
    }
}

impl EchoSensor for FakeEcho {
    async fn round_trip_us(&mut self) -> Result<u32, EchoTimeout> {
        self.pings += 1;
        self.replies.pop_front().unwrap_or(Err(EchoTimeout))
    }
}

#[derive(Debug)]
pub struct FakePinError;

impl digital::Error for FakePinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// IR input stuck at one level, or failing every read
pub struct FakeIr {
    level: Option<bool>,
}

impl FakeIr {
    pub fn high() -> Self {
        Self { level: Some(true) }
    }

    pub fn low() -> Self {
        Self { level: Some(false) }
    }

    pub fn broken() -> Self {
        Self { level: None }
    }
}

impl ErrorType for FakeIr {
    type Error = FakePinError;
}

impl InputPin for FakeIr {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.level.ok_or(FakePinError)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.level.map(|high| !high).ok_or(FakePinError)
    }
}

/// Servo recording every angle written to it
#[derive(Default)]
pub struct FakeServo {
    pub angles: Vec<u16>,
}

impl Servo for FakeServo {
    fn write_angle(&mut self, degrees: u16) {
        self.angles.push(degrees);
    }
}

/// Delay that returns immediately and adds up what it was asked to wait
#[derive(Default)]
pub struct FakeDelay {
    total_ns: u64,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
