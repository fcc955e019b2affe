//! Memory-mapped I/O port

use core::ptr;

use pirdrive_hal::{PortId, PortReg, PortRegisters};

use crate::regs::{port_map, PortMap};

/// One I/O port's register set
pub struct Port {
    id: PortId,
    map: &'static PortMap,
}

impl Port {
    pub(crate) const fn new(id: PortId) -> Self {
        Self {
            id,
            map: port_map(id),
        }
    }

    /// Port identifier
    pub fn id(&self) -> PortId {
        self.id
    }
}

impl PortRegisters for Port {
    fn read(&self, reg: PortReg) -> u8 {
        match self.map[reg.index()] {
            // SAFETY: address comes from the device memory map and is a
            // byte-wide peripheral register
            Some(addr) => unsafe { ptr::read_volatile(addr as *const u8) },
            None => 0,
        }
    }

    fn write(&mut self, reg: PortReg, value: u8) {
        if reg == PortReg::In {
            return;
        }
        if let Some(addr) = self.map[reg.index()] {
            // SAFETY: see `read`; `Port` is only reachable through the
            // register file, which hands out one `&mut` at a time
            unsafe { ptr::write_volatile(addr as *mut u8, value) }
        }
    }
}
