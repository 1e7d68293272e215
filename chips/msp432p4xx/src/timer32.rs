// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! 32-bit down counters (Timer32)
//!
//! The module holds two identical counters 0x20 apart, each with a 0x1C byte
//! register block.

use crate::debug;
use crate::memory_map::TIMER32_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};
use core::fmt::Write;
use core::mem::offset_of;

pub const TIMER32_1_BASE: StaticRef<Timer32Registers> =
    unsafe { StaticRef::new(TIMER32_BASE_ADDR as *const Timer32Registers) };
pub const TIMER32_2_BASE: StaticRef<Timer32Registers> =
    unsafe { StaticRef::new((TIMER32_BASE_ADDR + 0x20) as *const Timer32Registers) };

register_structs! {
    pub Timer32Registers {
        /// Reload value; writing restarts the count
        (0x00 => pub load: ReadWrite<u32>),
        (0x04 => pub value: ReadOnly<u32>),
        (0x08 => pub control: ReadWrite<u32, CONTROL::Register>),
        /// Any write clears the interrupt
        (0x0C => pub intclr: WriteOnly<u32>),
        (0x10 => pub ris: ReadOnly<u32, INT::Register>),
        (0x14 => pub mis: ReadOnly<u32, INT::Register>),
        /// Reload value taken at the next wrap
        (0x18 => pub bgload: ReadWrite<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CONTROL [
        ONESHOT OFFSET(0) NUMBITS(1) [],
        /// 32-bit counter instead of 16-bit
        SIZE OFFSET(1) NUMBITS(1) [],
        PRESCALE OFFSET(2) NUMBITS(2) [
            Div1 = 0,
            Div16 = 1,
            Div256 = 2
        ],
        IE OFFSET(5) NUMBITS(1) [],
        /// Periodic instead of free-running
        MODE OFFSET(6) NUMBITS(1) [],
        ENABLE OFFSET(7) NUMBITS(1) []
    ],
    pub INT [
        IFG OFFSET(0) NUMBITS(1) []
    ]
];

pub type Prescale = CONTROL::PRESCALE::Value;

impl Prescale {
    pub const fn divider(self) -> u32 {
        match self {
            Prescale::Div1 => 1,
            Prescale::Div16 => 16,
            Prescale::Div256 => 256,
        }
    }
}

impl Timer32Registers {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "TIMER32");
        debug::write_register(
            writer,
            "LOAD",
            offset_of!(Timer32Registers, load),
            self.load.get(),
        );
        debug::write_register(
            writer,
            "VALUE",
            offset_of!(Timer32Registers, value),
            self.value.get(),
        );
        debug::write_register(
            writer,
            "CONTROL",
            offset_of!(Timer32Registers, control),
            self.control.get(),
        );
        debug::write_flag(writer, "enabled", self.control.is_set(CONTROL::ENABLE));
        debug::write_flag(writer, "pending", self.ris.is_set(INT::IFG));
    }
}

pub struct Timer32 {
    registers: StaticRef<Timer32Registers>,
}

impl Timer32 {
    pub const fn new(base: StaticRef<Timer32Registers>) -> Timer32 {
        Timer32 { registers: base }
    }

    pub fn registers(&self) -> &Timer32Registers {
        &self.registers
    }

    /// Count down from `load` as a 32-bit counter, either once or reloading
    /// after every wrap. A zero load never raises an interrupt.
    pub fn start(&self, load: u32, prescale: Prescale, one_shot: bool) -> Result<(), ErrorCode> {
        if load == 0 {
            return Err(ErrorCode::INVAL);
        }
        if self.is_running() {
            return Err(ErrorCode::BUSY);
        }
        self.registers.control.write(
            CONTROL::SIZE::SET
                + CONTROL::PRESCALE.val(prescale as u32)
                + CONTROL::ONESHOT.val(one_shot.into())
                + CONTROL::MODE.val((!one_shot).into()),
        );
        self.registers.load.set(load);
        self.registers
            .control
            .modify(CONTROL::IE::SET + CONTROL::ENABLE::SET);
        Ok(())
    }

    pub fn stop(&self) {
        self.registers.control.modify(CONTROL::ENABLE::CLEAR);
    }

    pub fn is_running(&self) -> bool {
        self.registers.control.is_set(CONTROL::ENABLE)
    }

    pub fn prescale(&self) -> Option<Prescale> {
        self.registers.control.read_as_enum(CONTROL::PRESCALE)
    }

    pub fn remaining(&self) -> u32 {
        self.registers.value.get()
    }

    pub fn is_pending(&self) -> bool {
        self.registers.mis.is_set(INT::IFG)
    }

    pub fn clear_interrupt(&self) {
        self.registers.intclr.set(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, peek, poke};
    use std::string::String;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<Timer32Registers>(), 0x1C);
        assert_eq!(offset_of!(Timer32Registers, intclr), 0x0C);
        assert_eq!(offset_of!(Timer32Registers, bgload), 0x18);
        assert_eq!(TIMER32_1_BASE.address(), 0x4000_C000);
        assert_eq!(TIMER32_2_BASE.address(), 0x4000_C020);
    }

    #[test]
    fn prescale_dividers() {
        assert_eq!(Prescale::Div1.divider(), 1);
        assert_eq!(Prescale::Div16.divider(), 16);
        assert_eq!(Prescale::Div256.divider(), 256);
    }

    #[test]
    fn periodic_start() {
        let timer = Timer32::new(fake_block());
        assert_eq!(timer.start(48_000, Prescale::Div16, false), Ok(()));
        assert_eq!(timer.registers().load.get(), 48_000);
        assert_eq!(timer.registers().control.get(), 0xE6);
        assert_eq!(timer.prescale(), Some(Prescale::Div16));
        assert_eq!(timer.start(1, Prescale::Div1, true), Err(ErrorCode::BUSY));
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn one_shot_start() {
        let timer = Timer32::new(fake_block());
        assert_eq!(timer.start(0, Prescale::Div1, true), Err(ErrorCode::INVAL));
        assert_eq!(timer.start(10, Prescale::Div256, true), Ok(()));
        assert_eq!(timer.registers().control.get(), 0xAB);
    }

    #[test]
    fn interrupt_flags() {
        let timer = Timer32::new(fake_block());
        assert!(!timer.is_pending());
        poke(timer.registers, offset_of!(Timer32Registers, mis), 1u32);
        assert!(timer.is_pending());
        timer.clear_interrupt();
        assert_eq!(peek::<_, u32>(&timer.registers().intclr), 1);
    }

    #[test]
    fn dump_shows_state() {
        let timer = Timer32::new(fake_block());
        assert_eq!(timer.start(5, Prescale::Div1, false), Ok(()));
        poke(timer.registers, offset_of!(Timer32Registers, ris), 1u32);
        let mut out = String::new();
        timer.registers().print_state(&mut out);
        assert!(out.contains("LOAD               [+0x000] 0x00000005"));
        assert!(out.contains("enabled"));
        assert!(out.contains("pending"));
    }
}
