//! Timer_A register abstractions
//!
//! The timer has a 16-bit counter, a control register selecting the clock
//! source and counting mode, and capture/compare channels. In up mode CCR0
//! holds the period and CCR1 the PWM compare threshold.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bit offset of the clock source field in the control register
const TASSEL_SHIFT: u16 = 8;
/// Bit offset of the counting mode field in the control register
const MC_SHIFT: u16 = 4;
/// Bit offset of the output mode field in a capture/compare control register
const OUTMOD_SHIFT: u16 = 5;

/// Mask of the clock source field
pub const TASSEL_MASK: u16 = 0b11 << TASSEL_SHIFT;
/// Mask of the counting mode field
pub const MC_MASK: u16 = 0b11 << MC_SHIFT;
/// Mask of the output mode field
pub const OUTMOD_MASK: u16 = 0b111 << OUTMOD_SHIFT;
/// Output bit of a capture/compare control register (used in output mode 0)
pub const CCTL_OUT: u16 = 1 << 2;

/// Timer clock source (TASSEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClockSource {
    /// External TACLK pin
    Taclk,
    /// Auxiliary clock
    Aclk,
    /// Sub-main clock
    #[default]
    Smclk,
    /// Inverted TACLK
    Inclk,
}

impl ClockSource {
    /// Control register bits for this clock source
    pub const fn bits(self) -> u16 {
        (self as u16) << TASSEL_SHIFT
    }
}

/// Timer counting mode (MC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountMode {
    /// Timer halted
    #[default]
    Stop,
    /// Count up to CCR0, then wrap to zero
    Up,
    /// Count up to 0xFFFF, then wrap to zero
    Continuous,
    /// Count up to CCR0, then back down to zero
    UpDown,
}

impl CountMode {
    /// Control register bits for this counting mode
    pub const fn bits(self) -> u16 {
        (self as u16) << MC_SHIFT
    }

    /// Decode the counting mode from a control register value
    pub const fn from_control(control: u16) -> Self {
        match (control & MC_MASK) >> MC_SHIFT {
            0 => CountMode::Stop,
            1 => CountMode::Up,
            2 => CountMode::Continuous,
            _ => CountMode::UpDown,
        }
    }
}

/// Capture/compare output mode (OUTMOD)
///
/// Names follow the order of the two actions: the first happens at the
/// channel's compare match, the second when the counter rolls over (CCR0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutputMode {
    /// Output follows the OUT bit
    #[default]
    OutBit,
    /// Set at compare match
    Set,
    /// Toggle at compare match, reset at rollover
    ToggleReset,
    /// Set at compare match, reset at rollover
    SetReset,
    /// Toggle at compare match
    Toggle,
    /// Reset at compare match
    Reset,
    /// Toggle at compare match, set at rollover
    ToggleSet,
    /// Reset at compare match, set at rollover
    ResetSet,
}

impl OutputMode {
    /// Capture/compare control register bits for this output mode
    pub const fn bits(self) -> u16 {
        (self as u16) << OUTMOD_SHIFT
    }

    /// Decode the output mode from a capture/compare control register value
    pub const fn from_control(control: u16) -> Self {
        match (control & OUTMOD_MASK) >> OUTMOD_SHIFT {
            0 => OutputMode::OutBit,
            1 => OutputMode::Set,
            2 => OutputMode::ToggleReset,
            3 => OutputMode::SetReset,
            4 => OutputMode::Toggle,
            5 => OutputMode::Reset,
            6 => OutputMode::ToggleSet,
            _ => OutputMode::ResetSet,
        }
    }
}

/// Capture/compare channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureCompare {
    /// Channel 0 (period in up mode)
    Ccr0,
    /// Channel 1
    Ccr1,
    /// Channel 2
    Ccr2,
}

impl CaptureCompare {
    /// Number of channels
    pub const COUNT: usize = 3;

    /// Array index of this channel (0-based)
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Compose a control register value from clock source and counting mode
pub const fn control_bits(clock: ClockSource, mode: CountMode) -> u16 {
    clock.bits() | mode.bits()
}

/// Timer_A register set
pub trait TimerRegisters {
    /// Read the control register
    fn control(&self) -> u16;

    /// Write the control register
    fn set_control(&mut self, value: u16);

    /// Read a capture/compare control register
    fn capture_control(&self, channel: CaptureCompare) -> u16;

    /// Write a capture/compare control register
    fn set_capture_control(&mut self, channel: CaptureCompare, value: u16);

    /// Read a capture/compare register
    fn compare(&self, channel: CaptureCompare) -> u16;

    /// Write a capture/compare register
    fn set_compare(&mut self, channel: CaptureCompare, value: u16);

    /// Read the free-running counter
    fn counter(&self) -> u16;

    /// Current counting mode
    fn count_mode(&self) -> CountMode {
        CountMode::from_control(self.control())
    }

    /// Check if the timer is counting
    fn is_running(&self) -> bool {
        self.count_mode() != CountMode::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smclk_up_control_bits() {
        // TASSEL_2 + MC_1
        assert_eq!(control_bits(ClockSource::Smclk, CountMode::Up), 0x0210);
    }

    #[test]
    fn test_output_mode_bits() {
        assert_eq!(OutputMode::ResetSet.bits(), 0x00E0);
        assert_eq!(OutputMode::SetReset.bits(), 0x0060);
        assert_eq!(OutputMode::OutBit.bits(), 0);
    }

    #[test]
    fn test_output_mode_decode() {
        let modes = [
            OutputMode::OutBit,
            OutputMode::Set,
            OutputMode::ToggleReset,
            OutputMode::SetReset,
            OutputMode::Toggle,
            OutputMode::Reset,
            OutputMode::ToggleSet,
            OutputMode::ResetSet,
        ];

        for mode in modes {
            // Unrelated bits (CCIE, OUT) must not affect decoding
            let control = mode.bits() | 0x0010 | CCTL_OUT;
            assert_eq!(OutputMode::from_control(control), mode);
        }
    }

    #[test]
    fn test_count_mode_decode() {
        assert_eq!(CountMode::from_control(0x0210), CountMode::Up);
        assert_eq!(CountMode::from_control(0x0200), CountMode::Stop);
        assert_eq!(CountMode::from_control(0x0030), CountMode::UpDown);
    }
}
