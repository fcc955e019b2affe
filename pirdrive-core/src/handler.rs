//! Sensor edge interrupt handler
//!
//! The only code that runs after boot. On every qualifying edge it samples the
//! sensor line and:
//!
//! - line high: routes the PWM pin to the timer and arms the falling edge
//! - line low: returns the PWM pin to plain I/O (output bit 0, motor off)
//!   and arms the rising edge
//!
//! It then clears the whole port's interrupt flag register. Flags of other
//! pins on the same port are discarded with it; no other pin on the sensor
//! port has its interrupt enabled.

use pirdrive_hal::{PortReg, PortRegisters, RegisterFile};

use crate::config::BoardConfig;
use crate::level::{Edge, Level};

/// Who drives the PWM pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmRoute {
    /// Timer compare output (motor running)
    Timer,
    /// General-purpose output register (motor off)
    Gpio,
}

/// Result of one handler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeOutcome {
    /// Sensor level sampled by the handler
    pub level: Level,
    /// PWM pin routing after the handler
    pub route: PwmRoute,
    /// Edge armed for the next interrupt
    pub armed: Edge,
}

/// Service a sensor edge interrupt
///
/// `config` must have passed [`BoardConfig::validate`]; pin bits are not
/// checked again here.
pub fn handle_sensor_edge<R: RegisterFile>(regs: &mut R, config: &BoardConfig) -> EdgeOutcome {
    let sensor = config.sensor_pin;
    let pwm = config.pwm_pin;

    let level = Level::from_bits(regs.port(sensor.port).read(PortReg::In), sensor.mask());

    let route = match level {
        Level::High => {
            regs.port(pwm.port).set_bits(PortReg::Sel, pwm.mask());
            regs.port(sensor.port).set_bits(PortReg::Ies, sensor.mask());
            PwmRoute::Timer
        }
        Level::Low => {
            regs.port(pwm.port).clear_bits(PortReg::Sel, pwm.mask());
            regs.port(sensor.port).clear_bits(PortReg::Ies, sensor.mask());
            PwmRoute::Gpio
        }
    };

    regs.port(sensor.port).write(PortReg::Ifg, 0x00);

    let outcome = EdgeOutcome {
        level,
        route,
        armed: Edge::leaving(level),
    };

    #[cfg(feature = "defmt")]
    defmt::trace!("sensor edge: {}", outcome);

    outcome
}

/// Current routing of the PWM pin
pub fn pwm_route<R: RegisterFile>(regs: &mut R, config: &BoardConfig) -> PwmRoute {
    let pwm = config.pwm_pin;
    if regs.port(pwm.port).is_set(PortReg::Sel, pwm.mask()) {
        PwmRoute::Timer
    } else {
        PwmRoute::Gpio
    }
}

/// Edge the sensor interrupt is currently armed for
pub fn armed_edge<R: RegisterFile>(regs: &mut R, config: &BoardConfig) -> Edge {
    let sensor = config.sensor_pin;
    Edge::from_select(regs.port(sensor.port).is_set(PortReg::Ies, sensor.mask()))
}
