//! Event-driven harness over the simulated register file
//!
//! Stands in for the interrupt controller in host tests. Sensor events are
//! queued and delivered one at a time: each event changes the line level,
//! which may latch an interrupt flag, and any pending interrupt is serviced
//! to completion before the next event is applied. The handler is never
//! re-entered.
//!
//! Two hooks model edges that race the handler:
//!
//! - [`Harness::push_during_handler`] applies an event while the next handler
//!   invocation is in progress, after its flag clear and before the interrupt
//!   return. The latched flag is serviced after the return.
//! - [`Harness::send_burst`] applies several events back to back before the
//!   pending interrupt is taken. Their flags collapse into one invocation.

use heapless::Deque;
use pirdrive_hal::RegisterFile;

use crate::config::{BoardConfig, ConfigError};
use crate::handler::{armed_edge, pwm_route, EdgeOutcome, PwmRoute};
use crate::level::{Edge, Level};
use crate::sequencer::{Sequencer, State};
use crate::sim::SimRegisters;

/// Maximum number of queued sensor events
pub const EVENT_QUEUE_SIZE: usize = 16;

/// Something that happens to the sensor line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorEvent {
    /// Sensor actively drives the line to a level
    Drive(Level),
    /// Sensor lets go; the pull-up raises the line
    Release,
}

/// Harness errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HarnessError {
    /// Board configuration rejected
    Config(ConfigError),
    /// Event queue is full
    QueueFull,
    /// Device has not booted yet
    NotRunning,
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        HarnessError::Config(e)
    }
}

/// Drives a sequencer over [`SimRegisters`] with synthetic sensor events
pub struct Harness {
    sequencer: Sequencer<SimRegisters>,
    queue: Deque<SensorEvent, EVENT_QUEUE_SIZE>,
    /// Events applied while the handler runs
    during_handler: Deque<SensorEvent, EVENT_QUEUE_SIZE>,
    /// Number of handler invocations so far
    serviced: u32,
    /// Outcome of the most recent handler invocation
    last: Option<EdgeOutcome>,
}

impl Harness {
    /// Create a harness with a fresh register file
    pub fn new(config: BoardConfig) -> Result<Self, HarnessError> {
        Self::with_registers(SimRegisters::new(), config)
    }

    /// Create a harness over an existing register file
    pub fn with_registers(regs: SimRegisters, config: BoardConfig) -> Result<Self, HarnessError> {
        Ok(Self {
            sequencer: Sequencer::new(regs, config)?,
            queue: Deque::new(),
            during_handler: Deque::new(),
            serviced: 0,
            last: None,
        })
    }

    /// Create a harness and boot it
    pub fn booted(config: BoardConfig) -> Result<Self, HarnessError> {
        let mut harness = Self::new(config)?;
        harness.boot();
        Ok(harness)
    }

    /// Run the boot sequence
    pub fn boot(&mut self) {
        self.sequencer.boot();
    }

    /// Sequencer state
    pub fn state(&self) -> State {
        self.sequencer.state()
    }

    /// Simulated register file
    pub fn regs(&self) -> &SimRegisters {
        self.sequencer.regs()
    }

    /// Mutable simulated register file
    pub fn regs_mut(&mut self) -> &mut SimRegisters {
        self.sequencer.regs_mut()
    }

    /// Board configuration
    pub fn config(&self) -> &BoardConfig {
        self.sequencer.config()
    }

    /// Number of handler invocations so far
    pub fn serviced(&self) -> u32 {
        self.serviced
    }

    /// Outcome of the most recent handler invocation
    pub fn last_outcome(&self) -> Option<EdgeOutcome> {
        self.last
    }

    /// Number of events waiting for delivery
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue an event without delivering it
    pub fn push(&mut self, event: SensorEvent) -> Result<(), HarnessError> {
        self.queue
            .push_back(event)
            .map_err(|_| HarnessError::QueueFull)
    }

    /// Queue an event to apply while the next handler invocation runs
    pub fn push_during_handler(&mut self, event: SensorEvent) -> Result<(), HarnessError> {
        self.during_handler
            .push_back(event)
            .map_err(|_| HarnessError::QueueFull)
    }

    /// Apply events back to back, then service whatever interrupt is pending
    ///
    /// Queued events are delivered first. Returns the number of handler
    /// invocations this call caused.
    pub fn send_burst(&mut self, events: &[SensorEvent]) -> Result<u32, HarnessError> {
        let before = self.serviced;
        self.run()?;
        for &event in events {
            self.apply(event);
        }
        self.service_pending();
        Ok(self.serviced - before)
    }

    /// Deliver every queued event
    ///
    /// Returns the number of handler invocations this call caused.
    pub fn run(&mut self) -> Result<u32, HarnessError> {
        if self.state() != State::Running {
            return Err(HarnessError::NotRunning);
        }

        let before = self.serviced;
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
            self.service_pending();
        }
        Ok(self.serviced - before)
    }

    /// Queue one event and deliver everything queued
    pub fn send(&mut self, event: SensorEvent) -> Result<u32, HarnessError> {
        self.push(event)?;
        self.run()
    }

    /// Sensor drives the line low (presence asserted)
    pub fn assert_sensor(&mut self) -> Result<u32, HarnessError> {
        self.send(SensorEvent::Drive(Level::Low))
    }

    /// Sensor releases the line (presence cleared)
    pub fn release_sensor(&mut self) -> Result<u32, HarnessError> {
        self.send(SensorEvent::Release)
    }

    /// Current routing of the PWM pin
    pub fn pwm_route(&mut self) -> PwmRoute {
        let config = *self.sequencer.config();
        pwm_route(self.sequencer.regs_mut(), &config)
    }

    /// Edge the sensor interrupt is armed for
    pub fn armed_edge(&mut self) -> Edge {
        let config = *self.sequencer.config();
        armed_edge(self.sequencer.regs_mut(), &config)
    }

    /// Electrical level of the PWM pin at a timer tick
    pub fn pwm_level(&self, tick: u32) -> Level {
        self.regs().pin_level(self.config().pwm_pin, tick)
    }

    fn apply(&mut self, event: SensorEvent) {
        let pin = self.config().sensor_pin;
        let regs = self.sequencer.regs_mut();
        match event {
            SensorEvent::Drive(level) => regs.drive(pin, level),
            SensorEvent::Release => regs.release(pin),
        };
    }

    fn service_pending(&mut self) {
        let sensor_port = self.config().sensor_pin.port;
        // Interrupt entry masks further interrupts until return
        while self.regs().pending_interrupt() == Some(sensor_port)
            && self.sequencer.regs_mut().system().enter_interrupt()
        {
            self.last = self.sequencer.on_sensor_edge();
            self.serviced += 1;
            if let Some(event) = self.during_handler.pop_front() {
                self.apply(event);
            }
            self.sequencer.regs_mut().system().return_from_interrupt();
        }
    }
}
