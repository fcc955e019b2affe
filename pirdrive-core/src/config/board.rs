//! Board configuration types
//!
//! These types describe which pins the sensor and the motor are wired to and
//! how the PWM timer is programmed.

use pirdrive_hal::{ClockSource, LowPowerMode, OutputMode, PortId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pins that Timer0_A compare channel 1 can drive (TA0.1 with SEL=1, SEL2=0)
pub const TIMER_OUTPUT_PINS: [PinId; 2] = [PinId::new(PortId::P1, 2), PinId::new(PortId::P1, 6)];

/// A single pin on an I/O port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinId {
    /// Port the pin belongs to
    pub port: PortId,
    /// Bit position within the port (0-7)
    pub bit: u8,
}

impl PinId {
    /// Create a new pin identifier
    pub const fn new(port: PortId, bit: u8) -> Self {
        Self { port, bit }
    }

    /// Register mask for this pin
    ///
    /// Only the low three bits of `bit` are used, so an out-of-range bit
    /// aliases a pin in the same port. [`BoardConfig::validate`] rejects
    /// such pins; everything that takes a `BoardConfig` expects it to be
    /// validated.
    pub const fn mask(&self) -> u8 {
        1 << (self.bit & 0x07)
    }
}

/// PWM timer configuration
///
/// Period and compare are in timer ticks at the selected clock rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PwmConfig {
    /// Ticks per PWM period (loaded into CCR0)
    pub period: u16,
    /// Compare threshold (loaded into CCR1)
    pub compare: u16,
    /// Timer clock source
    pub clock: ClockSource,
    /// Output mode of the compare channel
    pub output_mode: OutputMode,
}

impl PwmConfig {
    /// 1000-tick period, 75% duty cycle, reset/set on SMCLK
    pub const DEFAULT: Self = Self {
        period: 1000,
        compare: 750,
        clock: ClockSource::Smclk,
        output_mode: OutputMode::ResetSet,
    };

    /// Nominal duty cycle in parts per thousand
    pub const fn duty_permille(&self) -> u16 {
        if self.period == 0 {
            return 0;
        }
        let permille = self.compare as u32 * 1000 / self.period as u32;
        if permille > 1000 {
            1000
        } else {
            permille as u16
        }
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Motion/presence sensor input (pulled up, asserts low)
    pub sensor_pin: PinId,
    /// Motor PWM output
    pub pwm_pin: PinId,
    /// PWM timer program
    #[cfg_attr(feature = "serde", serde(default))]
    pub pwm: PwmConfig,
    /// Low-power mode entered after boot
    #[cfg_attr(feature = "serde", serde(default))]
    pub low_power: LowPowerMode,
}

impl BoardConfig {
    /// Sensor on P1.3, motor on P1.6 (TA0.1), LPM1
    pub const DEFAULT: Self = Self {
        sensor_pin: PinId::new(PortId::P1, 3),
        pwm_pin: PinId::new(PortId::P1, 6),
        pwm: PwmConfig::DEFAULT,
        low_power: LowPowerMode::Lpm1,
    };

    /// Check the configuration for wiring and timer errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor_pin.bit > 7 || self.pwm_pin.bit > 7 {
            return Err(ConfigError::InvalidPin);
        }
        if self.sensor_pin == self.pwm_pin {
            return Err(ConfigError::PinConflict);
        }
        if !self.sensor_pin.port.has_interrupts() {
            return Err(ConfigError::SensorWithoutInterrupt);
        }
        if !TIMER_OUTPUT_PINS.contains(&self.pwm_pin) {
            return Err(ConfigError::NotTimerOutput);
        }
        if self.pwm.period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.pwm.compare > self.pwm.period {
            return Err(ConfigError::CompareExceedsPeriod);
        }
        if self.pwm.clock == ClockSource::Smclk && !self.low_power.keeps_smclk() {
            return Err(ConfigError::ClockStoppedInSleep);
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Board configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin bit outside 0-7
    InvalidPin,
    /// Sensor and PWM share a pin
    PinConflict,
    /// Sensor port has no edge interrupts
    SensorWithoutInterrupt,
    /// PWM pin cannot be driven by the timer compare unit
    NotTimerOutput,
    /// Period of zero ticks
    ZeroPeriod,
    /// Compare threshold beyond the period
    CompareExceedsPeriod,
    /// Timer clock would be gated off in the selected low-power mode
    ClockStoppedInSleep,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::InvalidPin => "pin bit must be 0-7",
            ConfigError::PinConflict => "sensor and pwm pins must differ",
            ConfigError::SensorWithoutInterrupt => "sensor pin must be on port 1 or 2",
            ConfigError::NotTimerOutput => "pwm pin must be a TA0.1 output (P1.2 or P1.6)",
            ConfigError::ZeroPeriod => "pwm period must be non-zero",
            ConfigError::CompareExceedsPeriod => "pwm compare must not exceed period",
            ConfigError::ClockStoppedInSleep => "smclk is stopped in the selected low-power mode",
        };
        f.write_str(msg)
    }
}
