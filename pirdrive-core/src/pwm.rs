//! PWM waveform model
//!
//! Computes the steady-state level of a Timer_A compare output in up mode.
//!
//! # Timing model
//!
//! One period spans `period` ticks with counter phases `0..period`. The
//! hardware's extra count at CCR0 is folded into the rollover, so a
//! `1000`-tick period with compare `750` is exactly 75%. The simulated timer
//! counter uses the same model.
//!
//! - `compare < period`: the channel matches at phase `compare`.
//! - `compare == period`: the channel matches at the rollover instant, before
//!   the rollover action. Modes with a rollover action (set or reset at
//!   rollover) end up at that action's level; `Set` and `Toggle` see one
//!   match per period.
//! - `compare > period`: the channel never matches.
//!
//! # Duty cycle
//!
//! With [`OutputMode::ResetSet`] the output is set at rollover and reset at
//! the compare match, so it is high for the first `compare` ticks of every
//! period:
//!
//! ```text
//! phase: 0          compare        period
//!        ┌──────────────┐              ┌──
//!        │              │              │
//!  ──────┘              └──────────────┘
//! ```

use pirdrive_hal::timer::CCTL_OUT;
use pirdrive_hal::{CaptureCompare, OutputMode, TimerRegisters};

use crate::config::PwmConfig;
use crate::level::Level;

/// Waveform produced by one compare channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waveform {
    mode: OutputMode,
    period: u16,
    compare: u16,
    /// Static level used by [`OutputMode::OutBit`]
    out_bit: bool,
}

impl Waveform {
    /// Create a waveform from explicit parameters
    pub const fn new(mode: OutputMode, period: u16, compare: u16) -> Self {
        Self {
            mode,
            period,
            compare,
            out_bit: false,
        }
    }

    /// Waveform described by a PWM configuration
    pub const fn from_config(pwm: &PwmConfig) -> Self {
        Self::new(pwm.output_mode, pwm.period, pwm.compare)
    }

    /// Waveform currently programmed into a timer channel
    pub fn from_timer<T: TimerRegisters>(timer: &T, channel: CaptureCompare) -> Self {
        let control = timer.capture_control(channel);
        Self {
            mode: OutputMode::from_control(control),
            period: timer.compare(CaptureCompare::Ccr0),
            compare: timer.compare(channel),
            out_bit: control & CCTL_OUT != 0,
        }
    }

    /// Output mode of this waveform
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Level of the output at an absolute tick count
    pub fn level_at(&self, tick: u32) -> Level {
        if self.period == 0 {
            return Level::from(self.mode == OutputMode::OutBit && self.out_bit);
        }
        let period = self.period as u32;
        self.level_in_cycle(tick / period, tick % period)
    }

    /// Level at `phase` ticks into period number `cycle` (0-based)
    fn level_in_cycle(&self, cycle: u32, phase: u32) -> Level {
        let period = self.period as u32;
        let compare = self.compare as u32;

        // One match per completed period, unless the compare is out of reach
        let earlier = compare <= period && cycle > 0;
        let earlier_odd = compare <= period && cycle % 2 == 1;
        let now = compare < period && phase >= compare;

        let high = match self.mode {
            OutputMode::OutBit => self.out_bit,
            OutputMode::Set => earlier || now,
            OutputMode::Reset => false,
            OutputMode::SetReset | OutputMode::ToggleReset => now,
            OutputMode::ResetSet | OutputMode::ToggleSet => !now,
            OutputMode::Toggle => earlier_odd != now,
        };
        Level::from(high)
    }

    /// Number of high ticks within one period
    ///
    /// `cycle` selects which period is counted (0-based).
    pub fn high_ticks_in_cycle(&self, cycle: u32) -> u32 {
        (0..self.period as u32)
            .filter(|&phase| self.level_in_cycle(cycle, phase).is_high())
            .count() as u32
    }

    /// Steady-state duty cycle in parts per thousand
    ///
    /// Averaged over two periods so toggle mode is measured correctly.
    pub fn duty_permille(&self) -> u16 {
        if self.period == 0 {
            return if self.level_at(0).is_high() { 1000 } else { 0 };
        }
        let high = self.high_ticks_in_cycle(1) + self.high_ticks_in_cycle(2);
        (high * 1000 / (2 * self.period as u32)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_set_duty() {
        let wave = Waveform::from_config(&PwmConfig::DEFAULT);

        assert_eq!(wave.level_at(0), Level::High);
        assert_eq!(wave.level_at(749), Level::High);
        assert_eq!(wave.level_at(750), Level::Low);
        assert_eq!(wave.level_at(999), Level::Low);
        assert_eq!(wave.level_at(1000), Level::High);
        assert_eq!(wave.high_ticks_in_cycle(0), 750);
        assert_eq!(wave.duty_permille(), 750);
    }

    #[test]
    fn test_set_reset_is_complement() {
        let wave = Waveform::new(OutputMode::SetReset, 1000, 750);

        assert_eq!(wave.level_at(0), Level::Low);
        assert_eq!(wave.level_at(750), Level::High);
        assert_eq!(wave.duty_permille(), 250);
    }

    #[test]
    fn test_toggle_halves_frequency() {
        let wave = Waveform::new(OutputMode::Toggle, 100, 30);

        assert_eq!(wave.level_at(29), Level::Low);
        assert_eq!(wave.level_at(30), Level::High);
        assert_eq!(wave.level_at(129), Level::High);
        assert_eq!(wave.level_at(130), Level::Low);
        assert_eq!(wave.duty_permille(), 500);
    }

    #[test]
    fn test_compare_edges() {
        // Compare at zero never lets the output rise in reset/set
        assert_eq!(Waveform::new(OutputMode::ResetSet, 1000, 0).duty_permille(), 0);
        // Match at the period coincides with the set at rollover
        assert_eq!(Waveform::new(OutputMode::ResetSet, 1000, 1000).duty_permille(), 1000);
    }

    #[test]
    fn test_set_waits_for_first_match() {
        let wave = Waveform::new(OutputMode::Set, 100, 30);
        assert_eq!(wave.level_at(29), Level::Low);
        assert_eq!(wave.level_at(30), Level::High);
        assert_eq!(wave.level_at(150), Level::High);

        // Compare out of reach: never set
        let never = Waveform::new(OutputMode::Set, 100, 150);
        assert_eq!(never.level_at(150), Level::Low);
        assert_eq!(never.level_at(10_000), Level::Low);
        assert_eq!(Waveform::new(OutputMode::Toggle, 100, 150).duty_permille(), 0);
    }

    #[test]
    fn test_compare_at_period_matches_at_rollover() {
        let set = Waveform::new(OutputMode::Set, 100, 100);
        assert_eq!(set.level_at(99), Level::Low);
        assert_eq!(set.level_at(100), Level::High);
        assert_eq!(set.level_at(150), Level::High);

        let toggle = Waveform::new(OutputMode::Toggle, 100, 100);
        assert_eq!(toggle.level_at(50), Level::Low);
        assert_eq!(toggle.level_at(150), Level::High);
        assert_eq!(toggle.level_at(250), Level::Low);
        assert_eq!(toggle.duty_permille(), 500);

        // Rollover action wins over the coincident match
        assert_eq!(Waveform::new(OutputMode::ResetSet, 100, 100).duty_permille(), 1000);
        assert_eq!(Waveform::new(OutputMode::ToggleSet, 100, 100).duty_permille(), 1000);
        assert_eq!(Waveform::new(OutputMode::SetReset, 100, 100).duty_permille(), 0);
        assert_eq!(Waveform::new(OutputMode::ToggleReset, 100, 100).duty_permille(), 0);
    }

    #[test]
    fn test_high_ticks_in_last_cycle() {
        let wave = Waveform::from_config(&PwmConfig::DEFAULT);
        assert_eq!(wave.high_ticks_in_cycle(u32::MAX), 750);
        assert_eq!(Waveform::new(OutputMode::Toggle, 100, 30).high_ticks_in_cycle(u32::MAX), 30);
    }

    #[test]
    fn test_static_modes() {
        assert_eq!(Waveform::new(OutputMode::Reset, 100, 50).duty_permille(), 0);
        assert_eq!(Waveform::new(OutputMode::Set, 100, 50).duty_permille(), 1000);
        assert_eq!(Waveform::new(OutputMode::OutBit, 100, 50).duty_permille(), 0);
    }
}
