//! pirdrive Hardware Abstraction Layer
//!
//! This crate defines the register-file traits the firmware logic is written
//! against. A chip-specific crate maps them onto memory-mapped registers; the
//! simulated register file in `pirdrive-core` maps them onto plain memory so
//! the same logic runs in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pirdrive-core (sequencer, handler)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pirdrive-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pirdrive-hal- │       │ SimRegisters  │
//! │  msp430g2553  │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`port::PortRegisters`] - One digital I/O port register set
//! - [`timer::TimerRegisters`] - Timer_A with capture/compare channels
//! - [`system::SystemRegisters`] - Watchdog, DCO calibration, status register
//! - [`RegisterFile`] - Everything above, addressed as one unit

#![no_std]
#![deny(unsafe_code)]

pub mod port;
pub mod system;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use port::{PortId, PortReg, PortRegisters};
pub use system::{DcoCalibration, LowPowerMode, SystemRegisters};
pub use timer::{CaptureCompare, ClockSource, CountMode, OutputMode, TimerRegisters};

/// The complete set of registers the firmware touches
///
/// Implementations hand out mutable access to one register group at a time.
/// There is exactly one instance per device; nothing is created or destroyed
/// after reset.
pub trait RegisterFile {
    /// Digital I/O port register set
    type Port: PortRegisters;
    /// Timer unit driving the PWM output
    type Timer: TimerRegisters;
    /// Watchdog, clock and processor status registers
    type System: SystemRegisters;

    /// Access the register set of one I/O port
    fn port(&mut self, id: PortId) -> &mut Self::Port;

    /// Access the PWM timer
    fn timer(&mut self) -> &mut Self::Timer;

    /// Access the system registers
    fn system(&mut self) -> &mut Self::System;
}
