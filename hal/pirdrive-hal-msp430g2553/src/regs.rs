//! MSP430G2553 peripheral register addresses
//!
//! Taken from the device datasheet memory map. Port and clock registers are
//! 8-bit, watchdog and Timer_A registers are 16-bit.

use pirdrive_hal::{CaptureCompare, PortId, PortReg};

/// DCO control register
pub const DCOCTL: usize = 0x0056;
/// Basic clock system control register 1
pub const BCSCTL1: usize = 0x0057;
/// Factory DCO calibration for 1 MHz (info segment A)
pub const CALDCO_1MHZ: usize = 0x10FE;
/// Factory BCSCTL1 calibration for 1 MHz (info segment A)
pub const CALBC1_1MHZ: usize = 0x10FF;

/// Watchdog timer control
pub const WDTCTL: usize = 0x0120;

/// Timer0_A3 control
pub const TA0CTL: usize = 0x0160;
/// Timer0_A3 counter
pub const TA0R: usize = 0x0170;
const TA0CCTL: [usize; CaptureCompare::COUNT] = [0x0162, 0x0164, 0x0166];
const TA0CCR: [usize; CaptureCompare::COUNT] = [0x0172, 0x0174, 0x0176];

/// Capture/compare control register address of a channel
pub const fn ta0cctl(channel: CaptureCompare) -> usize {
    TA0CCTL[channel.index()]
}

/// Capture/compare register address of a channel
pub const fn ta0ccr(channel: CaptureCompare) -> usize {
    TA0CCR[channel.index()]
}

/// Register addresses of one port, indexed by [`PortReg::index`]
///
/// `None` marks registers the port does not have.
pub type PortMap = [Option<usize>; PortReg::COUNT];

// Order: In, Out, Dir, Ifg, Ies, Ie, Sel, Sel2, Ren
const P1_MAP: PortMap = [
    Some(0x0020),
    Some(0x0021),
    Some(0x0022),
    Some(0x0023),
    Some(0x0024),
    Some(0x0025),
    Some(0x0026),
    Some(0x0041),
    Some(0x0027),
];

const P2_MAP: PortMap = [
    Some(0x0028),
    Some(0x0029),
    Some(0x002A),
    Some(0x002B),
    Some(0x002C),
    Some(0x002D),
    Some(0x002E),
    Some(0x0042),
    Some(0x002F),
];

const P3_MAP: PortMap = [
    Some(0x0018),
    Some(0x0019),
    Some(0x001A),
    None,
    None,
    None,
    Some(0x001B),
    Some(0x0043),
    Some(0x0010),
];

/// Register map of a port
pub const fn port_map(id: PortId) -> &'static PortMap {
    match id {
        PortId::P1 => &P1_MAP,
        PortId::P2 => &P2_MAP,
        PortId::P3 => &P3_MAP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_registers_match_capability() {
        for id in PortId::ALL {
            for reg in PortReg::ALL {
                let present = port_map(id)[reg.index()].is_some();
                if reg.is_interrupt_reg() {
                    assert_eq!(present, id.has_interrupts());
                } else {
                    assert!(present);
                }
            }
        }
    }

    #[test]
    fn test_port1_addresses() {
        let p1 = port_map(PortId::P1);
        assert_eq!(p1[PortReg::In.index()], Some(0x0020));
        assert_eq!(p1[PortReg::Sel.index()], Some(0x0026));
        assert_eq!(p1[PortReg::Sel2.index()], Some(0x0041));
        assert_eq!(p1[PortReg::Ren.index()], Some(0x0027));
    }

    #[test]
    fn test_timer_addresses() {
        assert_eq!(ta0cctl(CaptureCompare::Ccr1), 0x0164);
        assert_eq!(ta0ccr(CaptureCompare::Ccr0), 0x0172);
        assert_eq!(ta0ccr(CaptureCompare::Ccr1), 0x0174);
    }
}
