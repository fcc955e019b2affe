//! Board-agnostic core logic for the pirdrive firmware
//!
//! A motion/presence sensor gates a fixed-duty PWM motor output. This crate
//! contains everything that does not depend on real hardware:
//!
//! - Board configuration types and validation
//! - Boot-time initialization routines
//! - Main sequencer state machine
//! - Sensor edge interrupt handler
//! - PWM waveform model
//! - Simulated register file and event-driven harness for host testing

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod handler;
pub mod harness;
pub mod init;
pub mod level;
pub mod pwm;
pub mod sequencer;
pub mod sim;

pub use config::{BoardConfig, ConfigError, PinId, PwmConfig};
pub use handler::{handle_sensor_edge, EdgeOutcome, PwmRoute};
pub use level::{Edge, Level};
pub use sequencer::{boot, Sequencer, State};
