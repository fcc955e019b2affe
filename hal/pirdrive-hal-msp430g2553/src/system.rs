//! Watchdog, basic clock system and status register

use core::ptr;

use pirdrive_hal::system::{SR_GIE, WDTHOLD, WDTPW};
use pirdrive_hal::{DcoCalibration, LowPowerMode, SystemRegisters};

use crate::regs::{BCSCTL1, CALBC1_1MHZ, CALDCO_1MHZ, DCOCTL, WDTCTL};

/// System registers
pub struct System {
    _private: (),
}

impl System {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

/// Set bits in the status register (R2)
///
/// With CPUOFF among the bits the core halts here; the status register is
/// restored on every interrupt return, so execution does not continue past
/// this point until an interrupt handler clears the low-power bits.
#[cfg(target_arch = "msp430")]
fn bis_status(bits: u16) {
    // SAFETY: only GIE and low-power bits are ever passed in
    unsafe {
        core::arch::asm!(
            "bis.w {bits}, r2",
            "nop",
            bits = in(reg) bits,
            options(nostack),
        );
    }
}

#[cfg(not(target_arch = "msp430"))]
fn bis_status(_bits: u16) {}

impl SystemRegisters for System {
    fn hold_watchdog(&mut self) {
        // SAFETY: WDTCTL is a 16-bit register; the password is mandatory
        unsafe { ptr::write_volatile(WDTCTL as *mut u16, WDTPW | WDTHOLD) }
    }

    fn dco_calibration_1mhz(&self) -> DcoCalibration {
        // SAFETY: info segment A is readable flash
        unsafe {
            DcoCalibration {
                dcoctl: ptr::read_volatile(CALDCO_1MHZ as *const u8),
                bcsctl1: ptr::read_volatile(CALBC1_1MHZ as *const u8),
            }
        }
    }

    fn set_dcoctl(&mut self, value: u8) {
        // SAFETY: byte-wide clock register
        unsafe { ptr::write_volatile(DCOCTL as *mut u8, value) }
    }

    fn set_bcsctl1(&mut self, value: u8) {
        // SAFETY: byte-wide clock register
        unsafe { ptr::write_volatile(BCSCTL1 as *mut u8, value) }
    }

    fn enter_low_power(&mut self, mode: LowPowerMode) {
        bis_status(mode.status_bits() | SR_GIE);
    }
}
