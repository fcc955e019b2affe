//! Digital I/O port register abstractions
//!
//! Every port is a bank of 8-bit registers with one bit per physical pin.
//! Implementations perform the actual register access for the specific chip.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one I/O port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PortId {
    /// Port 1 (interrupt capable)
    P1,
    /// Port 2 (interrupt capable)
    P2,
    /// Port 3 (no edge-select, enable or flag registers)
    P3,
}

impl PortId {
    /// All ports, in reset order
    pub const ALL: [PortId; 3] = [PortId::P1, PortId::P2, PortId::P3];

    /// Check if this port has the edge-select/enable/flag registers
    pub const fn has_interrupts(self) -> bool {
        matches!(self, PortId::P1 | PortId::P2)
    }

    /// Array index of this port (0-based)
    pub const fn index(self) -> usize {
        match self {
            PortId::P1 => 0,
            PortId::P2 => 1,
            PortId::P3 => 2,
        }
    }
}

/// One register of a port register set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortReg {
    /// Input level (read-only)
    In,
    /// Output value, or pull direction when the resistor is enabled
    Out,
    /// Direction (1 = output)
    Dir,
    /// Interrupt flags
    Ifg,
    /// Edge select (1 = high-to-low)
    Ies,
    /// Interrupt enable
    Ie,
    /// Function select
    Sel,
    /// Function select, second bit
    Sel2,
    /// Pull resistor enable
    Ren,
}

impl PortReg {
    /// Number of distinct port registers
    pub const COUNT: usize = 9;

    /// All registers
    pub const ALL: [PortReg; Self::COUNT] = [
        PortReg::In,
        PortReg::Out,
        PortReg::Dir,
        PortReg::Ifg,
        PortReg::Ies,
        PortReg::Ie,
        PortReg::Sel,
        PortReg::Sel2,
        PortReg::Ren,
    ];

    /// Array index of this register (0-based)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Check if this register only exists on interrupt-capable ports
    pub const fn is_interrupt_reg(self) -> bool {
        matches!(self, PortReg::Ifg | PortReg::Ies | PortReg::Ie)
    }
}

/// One I/O port register set
///
/// Writes to [`PortReg::In`] are ignored. On ports without interrupt support
/// the interrupt registers read as zero and ignore writes.
pub trait PortRegisters {
    /// Read a register
    fn read(&self, reg: PortReg) -> u8;

    /// Write a register
    fn write(&mut self, reg: PortReg, value: u8);

    /// Read-modify-write a register
    fn modify<F>(&mut self, reg: PortReg, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set the masked bits of a register
    fn set_bits(&mut self, reg: PortReg, mask: u8) {
        self.modify(reg, |v| v | mask);
    }

    /// Clear the masked bits of a register
    fn clear_bits(&mut self, reg: PortReg, mask: u8) {
        self.modify(reg, |v| v & !mask);
    }

    /// Check if any of the masked bits are set
    fn is_set(&self, reg: PortReg, mask: u8) -> bool {
        self.read(reg) & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bank([u8; PortReg::COUNT]);

    impl PortRegisters for Bank {
        fn read(&self, reg: PortReg) -> u8 {
            self.0[reg.index()]
        }

        fn write(&mut self, reg: PortReg, value: u8) {
            self.0[reg.index()] = value;
        }
    }

    #[test]
    fn test_set_and_clear_bits() {
        let mut bank = Bank([0; PortReg::COUNT]);

        bank.set_bits(PortReg::Sel, 0x40);
        bank.set_bits(PortReg::Sel, 0x01);
        assert_eq!(bank.read(PortReg::Sel), 0x41);

        bank.clear_bits(PortReg::Sel, 0x40);
        assert_eq!(bank.read(PortReg::Sel), 0x01);
        assert!(bank.is_set(PortReg::Sel, 0x01));
        assert!(!bank.is_set(PortReg::Sel, 0x40));
    }

    #[test]
    fn test_register_indices_are_distinct() {
        for (i, reg) in PortReg::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn test_port_interrupt_capability() {
        assert!(PortId::P1.has_interrupts());
        assert!(PortId::P2.has_interrupts());
        assert!(!PortId::P3.has_interrupts());
    }
}
