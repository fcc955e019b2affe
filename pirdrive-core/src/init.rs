//! Boot-time initialization routines
//!
//! Each routine owns the registers it configures. They run once, in the
//! order the sequencer calls them, and later routines only flip the bits of
//! their own pin on top of the baseline left by [`init_pins`].

use pirdrive_hal::timer::control_bits;
use pirdrive_hal::{
    CaptureCompare, CountMode, PortId, PortReg, PortRegisters, RegisterFile, SystemRegisters,
    TimerRegisters,
};

use crate::config::{BoardConfig, PinId, PwmConfig};

/// Load the factory 1 MHz DCO calibration
///
/// Erased calibration constants are loaded as-is and leave the DCO at an
/// undefined frequency.
pub fn init_clock<R: RegisterFile>(regs: &mut R) {
    let system = regs.system();
    let cal = system.dco_calibration_1mhz();

    #[cfg(feature = "defmt")]
    if cal.is_erased() {
        defmt::warn!("DCO calibration erased, clock frequency undefined");
    }

    system.set_dcoctl(cal.dcoctl);
    system.set_bcsctl1(cal.bcsctl1);
}

/// Reset every I/O port to the safe baseline
///
/// Outputs low, all lines outputs, pull resistors enabled, low-to-high edge
/// select, plain I/O function, interrupt flags cleared. Interrupt enables are
/// left untouched. Running this more than once has no further effect.
pub fn init_pins<R: RegisterFile>(regs: &mut R) {
    for id in PortId::ALL {
        let port = regs.port(id);
        port.write(PortReg::Out, 0x00);
        port.write(PortReg::Dir, 0xFF);
        port.write(PortReg::Ren, 0xFF);
        if id.has_interrupts() {
            port.write(PortReg::Ies, 0x00);
        }
        port.write(PortReg::Sel, 0x00);
        port.write(PortReg::Sel2, 0x00);
        if id.has_interrupts() {
            port.write(PortReg::Ifg, 0x00);
        }
    }
}

/// Configure the sensor pin as a pulled-up input armed for a falling edge
pub fn setup_sensor_pin<R: RegisterFile>(regs: &mut R, pin: PinId) {
    let mask = pin.mask();
    let port = regs.port(pin.port);
    port.clear_bits(PortReg::Dir, mask);
    port.set_bits(PortReg::Ren, mask);
    // Out selects pull-up when the resistor is enabled
    port.set_bits(PortReg::Out, mask);
    port.set_bits(PortReg::Ies, mask);
    port.clear_bits(PortReg::Ifg, mask);
    port.set_bits(PortReg::Ie, mask);
}

/// Hand the PWM pin to the timer compare unit
pub fn setup_pwm_pin<R: RegisterFile>(regs: &mut R, pin: PinId) {
    let mask = pin.mask();
    let port = regs.port(pin.port);
    port.set_bits(PortReg::Dir, mask);
    port.clear_bits(PortReg::Ren, mask);
    port.set_bits(PortReg::Sel, mask);
}

/// Load period, compare threshold and output mode
pub fn setup_pwm_timer<R: RegisterFile>(regs: &mut R, pwm: &PwmConfig) {
    let timer = regs.timer();
    timer.set_compare(CaptureCompare::Ccr0, pwm.period);
    timer.set_compare(CaptureCompare::Ccr1, pwm.compare);
    timer.set_capture_control(CaptureCompare::Ccr1, pwm.output_mode.bits());
}

/// Start the timer counting up from the configured clock source
pub fn start_timer<R: RegisterFile>(regs: &mut R, pwm: &PwmConfig) {
    regs.timer().set_control(control_bits(pwm.clock, CountMode::Up));
}

/// Run every initialization routine in boot order
///
/// The watchdog is held first so it cannot reset the device mid-way.
pub fn init_all<R: RegisterFile>(regs: &mut R, config: &BoardConfig) {
    regs.system().hold_watchdog();
    init_clock(regs);
    init_pins(regs);
    setup_sensor_pin(regs, config.sensor_pin);
    setup_pwm_pin(regs, config.pwm_pin);
    setup_pwm_timer(regs, &config.pwm);
    start_timer(regs, &config.pwm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRegisters;
    use pirdrive_hal::{ClockSource, DcoCalibration, OutputMode};
    use proptest::prelude::*;

    fn snapshot(regs: &SimRegisters) -> [[u8; PortReg::COUNT]; 3] {
        let mut out = [[0; PortReg::COUNT]; 3];
        for id in PortId::ALL {
            for reg in PortReg::ALL {
                out[id.index()][reg.index()] = regs.port_ref(id).read(reg);
            }
        }
        out
    }

    #[test]
    fn test_init_clock_loads_calibration() {
        let cal = DcoCalibration {
            dcoctl: 0xD1,
            bcsctl1: 0x86,
        };
        let mut regs = SimRegisters::with_calibration(cal);
        init_clock(&mut regs);

        assert_eq!(regs.system_ref().dcoctl(), 0xD1);
        assert_eq!(regs.system_ref().bcsctl1(), 0x86);
    }

    #[test]
    fn test_init_clock_loads_erased_calibration_unchanged() {
        let cal = DcoCalibration {
            dcoctl: 0xFF,
            bcsctl1: 0xFF,
        };
        let mut regs = SimRegisters::with_calibration(cal);
        init_clock(&mut regs);

        assert_eq!(regs.system_ref().dcoctl(), 0xFF);
        assert_eq!(regs.system_ref().bcsctl1(), 0xFF);
    }

    #[test]
    fn test_init_pins_baseline() {
        let mut regs = SimRegisters::new();
        init_pins(&mut regs);

        for id in PortId::ALL {
            let port = regs.port_ref(id);
            assert_eq!(port.read(PortReg::Out), 0x00);
            assert_eq!(port.read(PortReg::Dir), 0xFF);
            assert_eq!(port.read(PortReg::Ren), 0xFF);
            assert_eq!(port.read(PortReg::Ies), 0x00);
            assert_eq!(port.read(PortReg::Sel), 0x00);
            assert_eq!(port.read(PortReg::Sel2), 0x00);
            assert_eq!(port.read(PortReg::Ifg), 0x00);
        }
    }

    #[test]
    fn test_init_pins_leaves_interrupt_enable() {
        let mut regs = SimRegisters::new();
        regs.port(PortId::P1).write(PortReg::Ie, 0x08);
        init_pins(&mut regs);

        assert_eq!(regs.port_ref(PortId::P1).read(PortReg::Ie), 0x08);
    }

    #[test]
    fn test_sensor_pin_setup() {
        let mut regs = SimRegisters::new();
        init_pins(&mut regs);
        let pin = BoardConfig::DEFAULT.sensor_pin;
        setup_sensor_pin(&mut regs, pin);

        let port = regs.port_ref(PortId::P1);
        assert!(!port.is_set(PortReg::Dir, 0x08));
        assert!(port.is_set(PortReg::Ren, 0x08));
        assert!(port.is_set(PortReg::Out, 0x08));
        assert!(port.is_set(PortReg::Ies, 0x08));
        assert!(!port.is_set(PortReg::Ifg, 0x08));
        assert!(port.is_set(PortReg::Ie, 0x08));
        // Other pins keep the baseline
        assert_eq!(port.read(PortReg::Dir), 0xF7);
        assert_eq!(port.read(PortReg::Ies), 0x08);
    }

    #[test]
    fn test_pwm_pin_setup() {
        let mut regs = SimRegisters::new();
        init_pins(&mut regs);
        setup_pwm_pin(&mut regs, BoardConfig::DEFAULT.pwm_pin);

        let port = regs.port_ref(PortId::P1);
        assert!(port.is_set(PortReg::Dir, 0x40));
        assert!(!port.is_set(PortReg::Ren, 0x40));
        assert_eq!(port.read(PortReg::Sel), 0x40);
        assert_eq!(port.read(PortReg::Sel2), 0x00);
    }

    #[test]
    fn test_pwm_timer_program() {
        let mut regs = SimRegisters::new();
        setup_pwm_timer(&mut regs, &PwmConfig::DEFAULT);

        let timer = regs.timer_ref();
        assert_eq!(timer.compare(CaptureCompare::Ccr0), 1000);
        assert_eq!(timer.compare(CaptureCompare::Ccr1), 750);
        assert_eq!(timer.capture_control(CaptureCompare::Ccr1), OutputMode::ResetSet.bits());
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_timer() {
        let mut regs = SimRegisters::new();
        start_timer(&mut regs, &PwmConfig::DEFAULT);

        assert_eq!(regs.timer_ref().control(), 0x0210);
        assert_eq!(regs.timer_ref().count_mode(), CountMode::Up);

        let aclk = PwmConfig {
            clock: ClockSource::Aclk,
            ..PwmConfig::DEFAULT
        };
        start_timer(&mut regs, &aclk);
        assert_eq!(regs.timer_ref().control(), 0x0110);
    }

    #[test]
    fn test_init_all_holds_watchdog() {
        let mut regs = SimRegisters::new();
        init_all(&mut regs, &BoardConfig::DEFAULT);

        assert!(regs.system_ref().watchdog_held());
        assert!(regs.timer_ref().is_running());
    }

    proptest! {
        #[test]
        fn prop_init_pins_idempotent(
            initial in proptest::collection::vec(any::<u8>(), 3 * PortReg::COUNT)
        ) {
            let mut regs = SimRegisters::new();
            for id in PortId::ALL {
                for reg in PortReg::ALL {
                    regs.port(id).write(reg, initial[id.index() * PortReg::COUNT + reg.index()]);
                }
            }

            init_pins(&mut regs);
            let once = snapshot(&regs);
            init_pins(&mut regs);
            let twice = snapshot(&regs);

            prop_assert_eq!(once, twice);
        }
    }
}
