//! pirdrive - motion-gated PWM motor firmware
//!
//! Boots the MSP430G2553, starts a fixed-duty PWM on the motor pin and sleeps.
//! Every sensor edge wakes the port interrupt, which connects the motor pin
//! to the timer while the sensor reads high and disconnects it while low.

#![no_std]
#![no_main]
#![feature(abi_msp430_interrupt)]

use msp430_rt::entry;
use msp430g2553::interrupt;
use panic_msp430 as _;

use pirdrive_core::{boot, handle_sensor_edge};
use pirdrive_hal::PortId;
use pirdrive_hal_msp430g2553::Registers;

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

#[entry]
fn main() -> ! {
    let mut regs = Registers::take().unwrap();

    // Returns only if an interrupt clears the low-power bits
    boot(&mut regs, &BOARD);

    loop {
        msp430::asm::nop();
    }
}

/// Service a sensor edge on `port` if the sensor lives there
fn sensor_interrupt(port: PortId) {
    if BOARD.sensor_pin.port != port {
        return;
    }
    // SAFETY: handlers do not nest and main only touches registers before
    // entering low-power mode
    let mut regs = unsafe { Registers::steal() };
    handle_sensor_edge(&mut regs, &BOARD);
}

#[interrupt]
fn PORT1() {
    sensor_interrupt(PortId::P1);
}

#[interrupt]
fn PORT2() {
    sensor_interrupt(PortId::P2);
}

// Debug builds emit calls to abort(), which the target does not provide
#[no_mangle]
extern "C" fn abort() -> ! {
    panic!();
}
