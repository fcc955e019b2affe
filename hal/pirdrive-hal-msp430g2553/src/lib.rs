//! MSP430G2553-specific HAL for the pirdrive firmware
//!
//! Implements the `pirdrive-hal` register-file traits with volatile accesses
//! to the device's fixed register addresses:
//!
//! - Ports 1-3 (port 3 without interrupt registers)
//! - Timer0_A3
//! - Watchdog, DCO calibration and status register low-power entry

#![no_std]
#![cfg_attr(target_arch = "msp430", feature(asm_experimental_arch))]

pub mod port;
pub mod regs;
pub mod system;
pub mod timer;

use pirdrive_hal::{PortId, RegisterFile};
use portable_atomic::{AtomicBool, Ordering};

pub use port::Port;
pub use system::System;
pub use timer::Timer;

// Re-export shared traits from pirdrive-hal for convenience
pub use pirdrive_hal::{PortRegisters, SystemRegisters, TimerRegisters};

static TAKEN: AtomicBool = AtomicBool::new(false);

/// The device register file
///
/// Holds no state of its own; every access goes straight to hardware.
pub struct Registers {
    ports: [Port; 3],
    timer: Timer,
    system: System,
}

impl Registers {
    /// Take the register file
    ///
    /// Returns `None` if it has already been taken.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            // SAFETY: first and only safe hand-out
            Some(unsafe { Self::steal() })
        }
    }

    /// Obtain the register file without checking ownership
    ///
    /// # Safety
    ///
    /// Callers must not use two instances concurrently. Interrupt handlers
    /// on this core run to completion and never nest, so a handler may steal
    /// the register file while the main context is asleep.
    pub unsafe fn steal() -> Self {
        Self {
            ports: [Port::new(PortId::P1), Port::new(PortId::P2), Port::new(PortId::P3)],
            timer: Timer::new(),
            system: System::new(),
        }
    }
}

impl RegisterFile for Registers {
    type Port = Port;
    type Timer = Timer;
    type System = System;

    fn port(&mut self, id: PortId) -> &mut Port {
        &mut self.ports[id.index()]
    }

    fn timer(&mut self) -> &mut Timer {
        &mut self.timer
    }

    fn system(&mut self) -> &mut System {
        &mut self.system
    }
}
