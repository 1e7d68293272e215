// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Segment LCD controller (LCD_F), MSP432P4x1xl only.
//!
//! Up to 4-mux, each byte of LCD memory holds two segment pins, the even pin
//! in the low nibble. From 5-mux on, each byte holds one pin and bit n is
//! COMn.

use crate::memory_map::LCD_F_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};

pub const LCD_F_BASE: StaticRef<LcdFRegisters> =
    unsafe { StaticRef::new(LCD_F_BASE_ADDR as *const LcdFRegisters) };

/// Segment pins L0 to L63.
pub const LCD_PINS: usize = 64;

register_structs! {
    pub LcdFRegisters {
        (0x000 => pub ctl: ReadWrite<u32, CTL::Register>),
        /// Blinking and memory control
        (0x004 => pub bmctl: ReadWrite<u32, BMCTL::Register>),
        /// Voltage control
        (0x008 => pub vctl: ReadWrite<u32, VCTL::Register>),
        /// Pin enables for L0 to L31 and L32 to L63
        (0x00C => pub pctl0: ReadWrite<u32>),
        (0x010 => pub pctl1: ReadWrite<u32>),
        /// COM/segment selection for the same pins
        (0x014 => pub cssel0: ReadWrite<u32>),
        (0x018 => pub cssel1: ReadWrite<u32>),
        /// Animation control
        (0x01C => pub anmctl: ReadWrite<u32, ANMCTL::Register>),
        (0x020 => _reserved0),
        (0x100 => pub ie: ReadWrite<u32, INT::Register>),
        (0x104 => pub ifg: ReadOnly<u32, INT::Register>),
        (0x108 => pub setifg: WriteOnly<u32, INT::Register>),
        (0x10C => pub clrifg: WriteOnly<u32, INT::Register>),
        (0x110 => _reserved1),
        /// LCD memory
        (0x200 => pub m: [ReadWrite<u8>; 64]),
        (0x240 => _reserved2),
        /// Blinking memory
        (0x400 => pub bm: [ReadWrite<u8>; 64]),
        (0x440 => @END),
    }
}

register_bitfields![u32,
    pub CTL [
        LCDON OFFSET(0) NUMBITS(1) [],
        /// Low-power waveforms
        LCDLP OFFSET(1) NUMBITS(1) [],
        /// Segments on
        LCDSON OFFSET(2) NUMBITS(1) [],
        LCDMX OFFSET(3) NUMBITS(3) [
            Static = 0,
            Mux2 = 1,
            Mux3 = 2,
            Mux4 = 3,
            Mux5 = 4,
            Mux6 = 5,
            Mux7 = 6,
            Mux8 = 7
        ],
        /// Frequency prescaler
        LCDPRE OFFSET(8) NUMBITS(3) [],
        /// Frequency divider
        LCDDIV OFFSET(11) NUMBITS(5) [],
        LCDSSEL OFFSET(16) NUMBITS(2) [
            ACLK = 0,
            VLOCLK = 1,
            REFOCLK = 2,
            LFXTCLK = 3
        ]
    ],
    pub BMCTL [
        LCDBLKMOD OFFSET(0) NUMBITS(2) [
            Off = 0,
            Individual = 1,
            All = 2,
            SwitchMemories = 3
        ],
        LCDBLKPRE OFFSET(2) NUMBITS(3) [],
        LCDBLKDIV OFFSET(5) NUMBITS(3) [],
        /// Display the blinking memory
        LCDDISP OFFSET(16) NUMBITS(1) [],
        /// Clear LCD memory
        LCDCLRM OFFSET(17) NUMBITS(1) [],
        /// Clear blinking memory
        LCDCLRBM OFFSET(18) NUMBITS(1) []
    ],
    pub VCTL [
        /// 1/2 bias instead of 1/3
        LCD2B OFFSET(1) NUMBITS(1) [],
        LCDREXT OFFSET(2) NUMBITS(1) [],
        LCDEXTBIAS OFFSET(3) NUMBITS(1) [],
        R03EXT OFFSET(4) NUMBITS(1) []
    ],
    pub ANMCTL [
        LCDANMEN OFFSET(0) NUMBITS(1) [],
        /// Animation frames minus one
        LCDANMSTP OFFSET(1) NUMBITS(3) [],
        LCDANMDIV OFFSET(8) NUMBITS(3) [],
        LCDANMPRE OFFSET(11) NUMBITS(3) []
    ],
    pub INT [
        /// Animation loop done
        LCDANM OFFSET(0) NUMBITS(1) [],
        /// Frame boundary
        LCDFRM OFFSET(1) NUMBITS(1) [],
        LCDBLKOFF OFFSET(2) NUMBITS(1) [],
        LCDBLKON OFFSET(3) NUMBITS(1) []
    ]
];

/// Byte of LCD memory and bit within it for segment pin `pin` on `com`,
/// in the two-pins-per-byte layout of static to 4-mux operation.
pub const fn segment_memory_index(pin: usize, com: usize) -> Result<(usize, u8), ErrorCode> {
    if pin >= LCD_PINS || com >= 4 {
        return Err(ErrorCode::INVAL);
    }
    Ok((pin / 2, ((pin % 2) * 4 + com) as u8))
}

/// Same for the one-pin-per-byte layout of 5-mux to 8-mux operation.
pub const fn segment_memory_index_high_mux(
    pin: usize,
    com: usize,
) -> Result<(usize, u8), ErrorCode> {
    if pin >= LCD_PINS || com >= 8 {
        return Err(ErrorCode::INVAL);
    }
    Ok((pin, com as u8))
}

pub struct LcdF {
    registers: StaticRef<LcdFRegisters>,
}

impl LcdF {
    pub const fn new(base: StaticRef<LcdFRegisters>) -> LcdF {
        LcdF { registers: base }
    }

    pub fn registers(&self) -> &LcdFRegisters {
        &self.registers
    }

    /// Number of common lines the current LCDMX setting drives.
    pub fn commons(&self) -> usize {
        self.registers.ctl.read(CTL::LCDMX) as usize + 1
    }

    /// Hand pin `pin` to the LCD, as a COM line if `common`.
    pub fn enable_pin(&self, pin: usize, common: bool) -> Result<(), ErrorCode> {
        if pin >= LCD_PINS {
            return Err(ErrorCode::INVAL);
        }
        let (pctl, cssel) = if pin < 32 {
            (&self.registers.pctl0, &self.registers.cssel0)
        } else {
            (&self.registers.pctl1, &self.registers.cssel1)
        };
        let bit = 1 << (pin % 32);
        pctl.set(pctl.get() | bit);
        if common {
            cssel.set(cssel.get() | bit);
        } else {
            cssel.set(cssel.get() & !bit);
        }
        Ok(())
    }

    /// Turn one segment on or off in LCD memory, for the current mux rate.
    pub fn set_segment(&self, pin: usize, com: usize, on: bool) -> Result<(), ErrorCode> {
        if com >= self.commons() {
            return Err(ErrorCode::INVAL);
        }
        let (index, bit) = if self.commons() <= 4 {
            segment_memory_index(pin, com)?
        } else {
            segment_memory_index_high_mux(pin, com)?
        };
        let cell = &self.registers.m[index];
        if on {
            cell.set(cell.get() | (1 << bit));
        } else {
            cell.set(cell.get() & !(1 << bit));
        }
        Ok(())
    }

    pub fn clear_memory(&self) {
        self.registers.bmctl.modify(BMCTL::LCDCLRM::SET);
    }

    pub fn enable(&self) {
        self.registers
            .ctl
            .modify(CTL::LCDON::SET + CTL::LCDSON::SET);
    }

    pub fn disable(&self) {
        self.registers.ctl.modify(CTL::LCDON::CLEAR);
    }

    pub fn clear_interrupts(&self) {
        self.registers.clrifg.write(
            INT::LCDANM::SET + INT::LCDFRM::SET + INT::LCDBLKOFF::SET + INT::LCDBLKON::SET,
        );
    }
}
