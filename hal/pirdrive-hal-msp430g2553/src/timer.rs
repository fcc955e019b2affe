//! Memory-mapped Timer0_A3

use core::ptr;

use pirdrive_hal::{CaptureCompare, TimerRegisters};

use crate::regs::{ta0ccr, ta0cctl, TA0CTL, TA0R};

/// Timer0_A3 register set
pub struct Timer {
    _private: (),
}

impl Timer {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

// SAFETY (all accessors): addresses come from the device memory map and are
// word-aligned 16-bit Timer_A registers.
#[inline(always)]
fn read16(addr: usize) -> u16 {
    unsafe { ptr::read_volatile(addr as *const u16) }
}

#[inline(always)]
fn write16(addr: usize, value: u16) {
    unsafe { ptr::write_volatile(addr as *mut u16, value) }
}

impl TimerRegisters for Timer {
    fn control(&self) -> u16 {
        read16(TA0CTL)
    }

    fn set_control(&mut self, value: u16) {
        write16(TA0CTL, value);
    }

    fn capture_control(&self, channel: CaptureCompare) -> u16 {
        read16(ta0cctl(channel))
    }

    fn set_capture_control(&mut self, channel: CaptureCompare, value: u16) {
        write16(ta0cctl(channel), value);
    }

    fn compare(&self, channel: CaptureCompare) -> u16 {
        read16(ta0ccr(channel))
    }

    fn set_compare(&mut self, channel: CaptureCompare, value: u16) {
        write16(ta0ccr(channel), value);
    }

    fn counter(&self) -> u16 {
        read16(TA0R)
    }
}
