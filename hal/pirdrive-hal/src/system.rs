//! System register abstractions
//!
//! Watchdog control, DCO clock calibration and the processor status
//! register's interrupt/low-power bits.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status register: global interrupt enable
pub const SR_GIE: u16 = 0x0008;
/// Status register: CPU off
pub const SR_CPUOFF: u16 = 0x0010;
/// Status register: LFXT1 oscillator off
pub const SR_OSCOFF: u16 = 0x0020;
/// Status register: DCO off when not used for MCLK/SMCLK
pub const SR_SCG0: u16 = 0x0040;
/// Status register: SMCLK off
pub const SR_SCG1: u16 = 0x0080;

/// Mask of all low-power bits in the status register
pub const SR_LPM_MASK: u16 = SR_CPUOFF | SR_OSCOFF | SR_SCG0 | SR_SCG1;

/// Watchdog password, required in the upper byte of every write
pub const WDTPW: u16 = 0x5A00;
/// Watchdog hold bit
pub const WDTHOLD: u16 = 0x0080;

/// Processor low-power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LowPowerMode {
    /// CPU and MCLK off
    Lpm0,
    /// CPU and MCLK off, DCO off unless it sources SMCLK
    #[default]
    Lpm1,
    /// CPU, MCLK and SMCLK off, DC generator on
    Lpm2,
    /// Only ACLK active
    Lpm3,
    /// All clocks off
    Lpm4,
}

impl LowPowerMode {
    /// Status register bits selecting this mode
    pub const fn status_bits(self) -> u16 {
        match self {
            LowPowerMode::Lpm0 => SR_CPUOFF,
            LowPowerMode::Lpm1 => SR_SCG0 | SR_CPUOFF,
            LowPowerMode::Lpm2 => SR_SCG1 | SR_CPUOFF,
            LowPowerMode::Lpm3 => SR_SCG1 | SR_SCG0 | SR_CPUOFF,
            LowPowerMode::Lpm4 => SR_SCG1 | SR_SCG0 | SR_OSCOFF | SR_CPUOFF,
        }
    }

    /// Decode the low-power mode from a status register value
    ///
    /// Returns `None` when the CPU is active.
    pub const fn from_status(status: u16) -> Option<Self> {
        match status & SR_LPM_MASK {
            SR_CPUOFF => Some(LowPowerMode::Lpm0),
            x if x == SR_SCG0 | SR_CPUOFF => Some(LowPowerMode::Lpm1),
            x if x == SR_SCG1 | SR_CPUOFF => Some(LowPowerMode::Lpm2),
            x if x == SR_SCG1 | SR_SCG0 | SR_CPUOFF => Some(LowPowerMode::Lpm3),
            x if x == SR_LPM_MASK => Some(LowPowerMode::Lpm4),
            _ => None,
        }
    }

    /// Check if SMCLK keeps running in this mode
    pub const fn keeps_smclk(self) -> bool {
        matches!(self, LowPowerMode::Lpm0 | LowPowerMode::Lpm1)
    }
}

/// Factory-trimmed DCO calibration for one frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DcoCalibration {
    /// Value for the DCO control register
    pub dcoctl: u8,
    /// Value for basic clock system control register 1
    pub bcsctl1: u8,
}

impl DcoCalibration {
    /// Check if the calibration segment has been erased
    ///
    /// Erased flash reads back as all ones; loading it yields an undefined
    /// DCO frequency.
    pub const fn is_erased(&self) -> bool {
        self.dcoctl == 0xFF && self.bcsctl1 == 0xFF
    }
}

/// Watchdog, clock system and status register
pub trait SystemRegisters {
    /// Stop the watchdog timer
    fn hold_watchdog(&mut self);

    /// Read the factory 1 MHz DCO calibration constants
    fn dco_calibration_1mhz(&self) -> DcoCalibration;

    /// Write the DCO control register
    fn set_dcoctl(&mut self, value: u8);

    /// Write basic clock system control register 1
    fn set_bcsctl1(&mut self, value: u8);

    /// Enable global interrupts and enter a low-power mode
    ///
    /// On hardware execution only continues in interrupt handlers; the
    /// mode is restored automatically on every interrupt return.
    fn enter_low_power(&mut self, mode: LowPowerMode);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lpm1_bits() {
        // LPM1_bits + GIE
        assert_eq!(LowPowerMode::Lpm1.status_bits() | SR_GIE, 0x0058);
    }

    #[test]
    fn test_status_decode_roundtrip() {
        let modes = [
            LowPowerMode::Lpm0,
            LowPowerMode::Lpm1,
            LowPowerMode::Lpm2,
            LowPowerMode::Lpm3,
            LowPowerMode::Lpm4,
        ];
        for mode in modes {
            assert_eq!(LowPowerMode::from_status(mode.status_bits() | SR_GIE), Some(mode));
        }
        assert_eq!(LowPowerMode::from_status(SR_GIE), None);
    }

    #[test]
    fn test_smclk_availability() {
        assert!(LowPowerMode::Lpm1.keeps_smclk());
        assert!(!LowPowerMode::Lpm3.keeps_smclk());
    }

    #[test]
    fn test_erased_calibration() {
        assert!(DcoCalibration { dcoctl: 0xFF, bcsctl1: 0xFF }.is_erased());
        assert!(!DcoCalibration { dcoctl: 0xD1, bcsctl1: 0x86 }.is_erased());
    }
}
