//! Simulated register file
//!
//! Implements [`RegisterFile`] over plain memory so the init routines,
//! sequencer and edge handler run unchanged in host tests. The simulation
//! covers what the firmware relies on:
//!
//! - input levels derived from external drive, pull resistors and outputs
//! - interrupt flag latching on the armed edge
//! - timer counting in up mode and the compare output waveform
//! - status register save/restore around interrupt service

use pirdrive_hal::system::{SR_GIE, SR_LPM_MASK, WDTHOLD};
use pirdrive_hal::{
    CaptureCompare, CountMode, DcoCalibration, LowPowerMode, PortId, PortReg, PortRegisters,
    RegisterFile, SystemRegisters, TimerRegisters,
};

use crate::config::{PinId, TIMER_OUTPUT_PINS};
use crate::level::{Edge, Level};
use crate::pwm::Waveform;

/// One simulated I/O port
#[derive(Debug, Clone)]
pub struct SimPort {
    id: PortId,
    regs: [u8; PortReg::COUNT],
    /// Pins driven by the outside world
    driven: u8,
    /// Level applied to driven pins
    external: u8,
}

impl SimPort {
    /// Create a port with all registers cleared and nothing attached
    pub fn new(id: PortId) -> Self {
        Self {
            id,
            regs: [0; PortReg::COUNT],
            driven: 0,
            external: 0,
        }
    }

    /// Port identifier
    pub fn id(&self) -> PortId {
        self.id
    }

    fn input_levels(&self) -> u8 {
        let out = self.regs[PortReg::Out.index()];
        let dir = self.regs[PortReg::Dir.index()];
        let ren = self.regs[PortReg::Ren.index()];

        // Outputs read back what they drive; inputs read the external level,
        // else the pull resistor, else float low.
        let outputs = dir & out;
        let driven_inputs = !dir & self.driven & self.external;
        let pulled_inputs = !dir & !self.driven & ren & out;
        outputs | driven_inputs | pulled_inputs
    }

    /// Apply an external level to the masked pins, or release them
    ///
    /// Returns `true` if an interrupt flag was latched.
    pub fn set_external(&mut self, mask: u8, level: Option<Level>) -> bool {
        let before = self.input_levels();
        match level {
            Some(level) => {
                self.driven |= mask;
                if level.is_high() {
                    self.external |= mask;
                } else {
                    self.external &= !mask;
                }
            }
            None => {
                self.driven &= !mask;
                self.external &= !mask;
            }
        }
        let after = self.input_levels();

        if !self.id.has_interrupts() {
            return false;
        }

        let ies = self.regs[PortReg::Ies.index()];
        let rising = !before & after & !ies;
        let falling = before & !after & ies;
        let latched = (rising | falling) & mask;
        self.regs[PortReg::Ifg.index()] |= latched;
        latched != 0
    }

    /// Edge the masked pin is currently armed for
    pub fn armed_edge(&self, mask: u8) -> Edge {
        Edge::from_select(self.regs[PortReg::Ies.index()] & mask != 0)
    }

    /// Flags that would raise an interrupt if interrupts were enabled
    pub fn pending(&self) -> u8 {
        self.regs[PortReg::Ifg.index()] & self.regs[PortReg::Ie.index()]
    }
}

impl PortRegisters for SimPort {
    fn read(&self, reg: PortReg) -> u8 {
        if reg.is_interrupt_reg() && !self.id.has_interrupts() {
            return 0;
        }
        match reg {
            PortReg::In => self.input_levels(),
            _ => self.regs[reg.index()],
        }
    }

    fn write(&mut self, reg: PortReg, value: u8) {
        if reg == PortReg::In || (reg.is_interrupt_reg() && !self.id.has_interrupts()) {
            return;
        }
        self.regs[reg.index()] = value;
    }
}

/// Simulated Timer_A
#[derive(Debug, Clone, Default)]
pub struct SimTimer {
    control: u16,
    capture_control: [u16; CaptureCompare::COUNT],
    compare: [u16; CaptureCompare::COUNT],
    counter: u16,
}

impl SimTimer {
    /// Advance the counter by a number of input clock ticks
    ///
    /// Only up mode is simulated; other modes leave the counter unchanged.
    /// The counter wraps after CCR0 ticks, following the timing model in
    /// [`crate::pwm`].
    pub fn advance(&mut self, ticks: u32) {
        if self.count_mode() != CountMode::Up {
            return;
        }
        let period = self.compare[CaptureCompare::Ccr0.index()] as u32;
        if period == 0 {
            return;
        }
        self.counter = ((self.counter as u32 + ticks % period) % period) as u16;
    }
}

impl TimerRegisters for SimTimer {
    fn control(&self) -> u16 {
        self.control
    }

    fn set_control(&mut self, value: u16) {
        self.control = value;
    }

    fn capture_control(&self, channel: CaptureCompare) -> u16 {
        self.capture_control[channel.index()]
    }

    fn set_capture_control(&mut self, channel: CaptureCompare, value: u16) {
        self.capture_control[channel.index()] = value;
    }

    fn compare(&self, channel: CaptureCompare) -> u16 {
        self.compare[channel.index()]
    }

    fn set_compare(&mut self, channel: CaptureCompare, value: u16) {
        self.compare[channel.index()] = value;
    }

    fn counter(&self) -> u16 {
        self.counter
    }
}

/// Simulated watchdog, clock system and status register
#[derive(Debug, Clone)]
pub struct SimSystem {
    wdtctl: u16,
    dcoctl: u8,
    bcsctl1: u8,
    calibration: DcoCalibration,
    status: u16,
    /// Status register saved on interrupt entry
    saved_status: Option<u16>,
}

impl SimSystem {
    /// Calibration constants typical of a trimmed part
    pub const TYPICAL_CALIBRATION: DcoCalibration = DcoCalibration {
        dcoctl: 0x5A,
        bcsctl1: 0x86,
    };

    /// Create system registers with the given factory calibration
    pub fn new(calibration: DcoCalibration) -> Self {
        Self {
            wdtctl: 0,
            dcoctl: 0x60,
            bcsctl1: 0x87,
            calibration,
            status: 0,
            saved_status: None,
        }
    }

    /// Check if the watchdog is held
    pub fn watchdog_held(&self) -> bool {
        self.wdtctl & WDTHOLD != 0
    }

    /// Current DCO control register value
    pub fn dcoctl(&self) -> u8 {
        self.dcoctl
    }

    /// Current basic clock system control register 1 value
    pub fn bcsctl1(&self) -> u8 {
        self.bcsctl1
    }

    /// Current status register value
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if global interrupts are enabled
    pub fn interrupts_enabled(&self) -> bool {
        self.status & SR_GIE != 0
    }

    /// Current low-power mode, or `None` while the CPU runs
    pub fn low_power_mode(&self) -> Option<LowPowerMode> {
        LowPowerMode::from_status(self.status)
    }

    /// Check if an interrupt handler is executing
    pub fn in_interrupt(&self) -> bool {
        self.saved_status.is_some()
    }

    /// Save the status register and wake the CPU with interrupts masked
    ///
    /// Returns `false` if an interrupt is already being serviced.
    pub fn enter_interrupt(&mut self) -> bool {
        if self.saved_status.is_some() {
            return false;
        }
        self.saved_status = Some(self.status);
        self.status &= !(SR_GIE | SR_LPM_MASK);
        true
    }

    /// Restore the status register saved on interrupt entry
    pub fn return_from_interrupt(&mut self) {
        if let Some(status) = self.saved_status.take() {
            self.status = status;
        }
    }
}

impl Default for SimSystem {
    fn default() -> Self {
        Self::new(Self::TYPICAL_CALIBRATION)
    }
}

impl SystemRegisters for SimSystem {
    fn hold_watchdog(&mut self) {
        // Password byte is write-only
        self.wdtctl = WDTHOLD;
    }

    fn dco_calibration_1mhz(&self) -> DcoCalibration {
        self.calibration
    }

    fn set_dcoctl(&mut self, value: u8) {
        self.dcoctl = value;
    }

    fn set_bcsctl1(&mut self, value: u8) {
        self.bcsctl1 = value;
    }

    fn enter_low_power(&mut self, mode: LowPowerMode) {
        self.status |= mode.status_bits() | SR_GIE;
    }
}

/// Complete simulated register file
#[derive(Debug, Clone)]
pub struct SimRegisters {
    ports: [SimPort; 3],
    timer: SimTimer,
    system: SimSystem,
}

impl SimRegisters {
    /// Create a register file in its reset state
    pub fn new() -> Self {
        Self::with_calibration(SimSystem::TYPICAL_CALIBRATION)
    }

    /// Create a register file with specific factory calibration constants
    pub fn with_calibration(calibration: DcoCalibration) -> Self {
        Self {
            ports: [
                SimPort::new(PortId::P1),
                SimPort::new(PortId::P2),
                SimPort::new(PortId::P3),
            ],
            timer: SimTimer::default(),
            system: SimSystem::new(calibration),
        }
    }

    /// Read-only access to a port
    pub fn port_ref(&self, id: PortId) -> &SimPort {
        &self.ports[id.index()]
    }

    /// Read-only access to the timer
    pub fn timer_ref(&self) -> &SimTimer {
        &self.timer
    }

    /// Read-only access to the system registers
    pub fn system_ref(&self) -> &SimSystem {
        &self.system
    }

    /// Drive a pin from outside the chip
    ///
    /// Returns `true` if the transition latched an interrupt flag.
    pub fn drive(&mut self, pin: PinId, level: Level) -> bool {
        self.ports[pin.port.index()].set_external(pin.mask(), Some(level))
    }

    /// Stop driving a pin, leaving it to its pull resistor
    ///
    /// Returns `true` if the transition latched an interrupt flag.
    pub fn release(&mut self, pin: PinId) -> bool {
        self.ports[pin.port.index()].set_external(pin.mask(), None)
    }

    /// First port with an enabled, latched interrupt
    ///
    /// Nothing is pending while global interrupts are disabled.
    pub fn pending_interrupt(&self) -> Option<PortId> {
        if !self.system.interrupts_enabled() {
            return None;
        }
        PortId::ALL
            .into_iter()
            .find(|id| self.ports[id.index()].pending() != 0)
    }

    /// Electrical level of a pin at an absolute timer tick
    ///
    /// Pins routed to the running timer follow its compare output; plain
    /// outputs follow their output bit; inputs read their input level.
    pub fn pin_level(&self, pin: PinId, tick: u32) -> Level {
        let port = &self.ports[pin.port.index()];
        let mask = pin.mask();

        let routed_to_timer = port.is_set(PortReg::Sel, mask)
            && !port.is_set(PortReg::Sel2, mask)
            && TIMER_OUTPUT_PINS.contains(&pin);
        if routed_to_timer {
            if !self.timer.is_running() {
                return Level::Low;
            }
            return Waveform::from_timer(&self.timer, CaptureCompare::Ccr1).level_at(tick);
        }

        if port.is_set(PortReg::Dir, mask) {
            Level::from_bits(port.read(PortReg::Out), mask)
        } else {
            Level::from_bits(port.read(PortReg::In), mask)
        }
    }

    /// Mutable access to the simulated timer
    pub fn timer_mut(&mut self) -> &mut SimTimer {
        &mut self.timer
    }
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile for SimRegisters {
    type Port = SimPort;
    type Timer = SimTimer;
    type System = SimSystem;

    fn port(&mut self, id: PortId) -> &mut SimPort {
        &mut self.ports[id.index()]
    }

    fn timer(&mut self) -> &mut SimTimer {
        &mut self.timer
    }

    fn system(&mut self) -> &mut SimSystem {
        &mut self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENSOR: PinId = PinId::new(PortId::P1, 3);

    fn pulled_up_input(regs: &mut SimRegisters, falling: bool) {
        let port = regs.port(PortId::P1);
        port.write(PortReg::Dir, 0x00);
        port.write(PortReg::Ren, 0x08);
        port.write(PortReg::Out, 0x08);
        port.write(PortReg::Ies, if falling { 0x08 } else { 0x00 });
        port.write(PortReg::Ie, 0x08);
    }

    #[test]
    fn test_pull_up_reads_high() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, true);

        assert_eq!(regs.pin_level(SENSOR, 0), Level::High);
    }

    #[test]
    fn test_falling_edge_latches_flag() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, true);

        assert!(regs.drive(SENSOR, Level::Low));
        assert_eq!(regs.port_ref(PortId::P1).read(PortReg::Ifg), 0x08);
    }

    #[test]
    fn test_unarmed_edge_does_not_latch() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, false);

        assert!(!regs.drive(SENSOR, Level::Low));
        assert_eq!(regs.port_ref(PortId::P1).read(PortReg::Ifg), 0x00);

        // Releasing lets the pull-up raise the line: rising edge
        assert!(regs.release(SENSOR));
        assert_eq!(regs.port_ref(PortId::P1).read(PortReg::Ifg), 0x08);
    }

    #[test]
    fn test_same_level_does_not_latch() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, true);

        assert!(!regs.drive(SENSOR, Level::High));
        assert_eq!(regs.port_ref(PortId::P1).read(PortReg::Ifg), 0x00);
    }

    #[test]
    fn test_pending_requires_gie() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, true);
        regs.drive(SENSOR, Level::Low);

        assert_eq!(regs.pending_interrupt(), None);
        regs.system().enter_low_power(LowPowerMode::Lpm1);
        assert_eq!(regs.pending_interrupt(), Some(PortId::P1));
    }

    #[test]
    fn test_port3_has_no_interrupt_registers() {
        let mut regs = SimRegisters::new();
        regs.port(PortId::P3).write(PortReg::Ifg, 0xFF);
        regs.port(PortId::P3).write(PortReg::Ies, 0xFF);

        assert_eq!(regs.port_ref(PortId::P3).read(PortReg::Ifg), 0);
        assert_eq!(regs.port_ref(PortId::P3).read(PortReg::Ies), 0);
        assert!(!regs.drive(PinId::new(PortId::P3, 0), Level::High));
    }

    #[test]
    fn test_interrupt_entry_restores_low_power() {
        let mut regs = SimRegisters::new();
        regs.system().enter_low_power(LowPowerMode::Lpm1);

        assert!(regs.system().enter_interrupt());
        assert!(!regs.system_ref().interrupts_enabled());
        assert_eq!(regs.system_ref().low_power_mode(), None);
        assert!(!regs.system().enter_interrupt());

        regs.system().return_from_interrupt();
        assert!(regs.system_ref().interrupts_enabled());
        assert_eq!(regs.system_ref().low_power_mode(), Some(LowPowerMode::Lpm1));
    }

    #[test]
    fn test_flag_latched_in_interrupt_waits_for_return() {
        let mut regs = SimRegisters::new();
        pulled_up_input(&mut regs, true);
        regs.system().enter_low_power(LowPowerMode::Lpm1);
        regs.drive(SENSOR, Level::Low);
        assert!(regs.system().enter_interrupt());
        regs.port(PortId::P1).write(PortReg::Ifg, 0x00);
        regs.port(PortId::P1).write(PortReg::Ies, 0x00);

        // Rising edge while the handler runs: latched, not taken
        assert!(regs.release(SENSOR));
        assert_eq!(regs.pending_interrupt(), None);

        regs.system().return_from_interrupt();
        assert_eq!(regs.pending_interrupt(), Some(PortId::P1));
    }

    #[test]
    fn test_timer_wraps_at_period() {
        let mut regs = SimRegisters::new();
        regs.timer().set_compare(CaptureCompare::Ccr0, 1000);
        regs.timer_mut().advance(10);
        assert_eq!(regs.timer_ref().counter(), 0);

        regs.timer().set_control(CountMode::Up.bits());
        regs.timer_mut().advance(1001);
        assert_eq!(regs.timer_ref().counter(), 1);
        regs.timer_mut().advance(4);
        assert_eq!(regs.timer_ref().counter(), 5);
        regs.timer_mut().advance(995);
        assert_eq!(regs.timer_ref().counter(), 0);
    }

    #[test]
    fn test_counter_and_pin_share_period() {
        let mut regs = SimRegisters::new();
        let pwm = PinId::new(PortId::P1, 6);
        crate::init::init_all(&mut regs, &crate::config::BoardConfig::DEFAULT);
        let wave = Waveform::from_timer(regs.timer_ref(), CaptureCompare::Ccr1);

        let mut elapsed = 0;
        for step in [1000, 749, 1, 250, 1999] {
            regs.timer_mut().advance(step);
            elapsed += step;
            let phase = regs.timer_ref().counter() as u32;
            assert_eq!(phase, elapsed % 1000);
            assert_eq!(regs.pin_level(pwm, elapsed), wave.level_at(phase));
        }
    }
}
