//! Main sequencer
//!
//! Two states only. `Booting` runs the fixed initialization order and ends by
//! enabling interrupts and entering the low-power mode; `Running` is terminal.
//! In `Running` the processor sleeps and only the edge handler executes,
//! returning to the same low-power mode each time.

use pirdrive_hal::{RegisterFile, SystemRegisters};

use crate::config::{BoardConfig, ConfigError};
use crate::handler::{handle_sensor_edge, EdgeOutcome};
use crate::init::init_all;

/// Sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Reset until the low-power mode is entered
    Booting,
    /// Asleep, waiting for sensor edges
    Running,
}

/// Events that drive the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Initialization finished and the low-power mode was requested
    BootComplete,
    /// Sensor edge serviced by the interrupt handler
    SensorEdge,
}

impl State {
    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Booting, BootComplete) => Running,
            // Edges return to the same sleep state
            (Running, SensorEdge) => Running,
            // Default: stay in current state
            _ => self,
        }
    }

    /// Check if the edge handler may run in this state
    pub fn accepts_edges(&self) -> bool {
        matches!(self, State::Running)
    }
}

/// Run the full boot sequence
///
/// Holds the watchdog, runs every init routine in order, starts the timer,
/// then enables global interrupts and requests the configured low-power mode.
/// On hardware the final step does not return until an interrupt fires.
pub fn boot<R: RegisterFile>(regs: &mut R, config: &BoardConfig) {
    #[cfg(feature = "defmt")]
    defmt::debug!("booting: sensor={} pwm={}", config.sensor_pin, config.pwm_pin);

    init_all(regs, config);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "pwm {}/{} ticks, entering {}",
        config.pwm.compare,
        config.pwm.period,
        config.low_power
    );

    regs.system().enter_low_power(config.low_power);
}

/// Owns a register file and tracks the sequencer state
///
/// Used where the register file is a value rather than a fixed set of
/// addresses, such as the host harness.
pub struct Sequencer<R: RegisterFile> {
    regs: R,
    config: BoardConfig,
    state: State,
}

impl<R: RegisterFile> Sequencer<R> {
    /// Create a sequencer over a register file
    ///
    /// The configuration is validated before any register is touched.
    pub fn new(regs: R, config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            regs,
            config,
            state: State::Booting,
        })
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Board configuration in use
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Register file
    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Mutable register file
    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Consume the sequencer and return the register file
    pub fn into_regs(self) -> R {
        self.regs
    }

    /// Boot the device
    ///
    /// Does nothing once the sequencer is running.
    pub fn boot(&mut self) {
        if self.state != State::Booting {
            return;
        }
        boot(&mut self.regs, &self.config);
        self.state = self.state.transition(Event::BootComplete);
    }

    /// Run the edge handler
    ///
    /// Returns `None` before boot, when the sensor interrupt is not armed.
    pub fn on_sensor_edge(&mut self) -> Option<EdgeOutcome> {
        if !self.state.accepts_edges() {
            return None;
        }
        let outcome = handle_sensor_edge(&mut self.regs, &self.config);
        self.state = self.state.transition(Event::SensorEdge);
        Some(outcome)
    }
}
