// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Voltage reference (REF_A)

use crate::memory_map::REF_A_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable};
use crate::registers::{register_bitfields, register_structs, ReadWrite};
use crate::{ErrorCode, StaticRef};

pub const REF_A_BASE: StaticRef<RefARegisters> =
    unsafe { StaticRef::new(REF_A_BASE_ADDR as *const RefARegisters) };

register_structs! {
    pub RefARegisters {
        (0x00 => pub ctl0: ReadWrite<u16, CTL0::Register>),
        (0x02 => @END),
    }
}

register_bitfields![u16,
    pub CTL0 [
        REFON OFFSET(0) NUMBITS(1) [],
        /// Buffer the reference onto the output pin
        REFOUT OFFSET(1) NUMBITS(1) [],
        /// Temperature sensor off
        REFTCOFF OFFSET(3) NUMBITS(1) [],
        REFVSEL OFFSET(4) NUMBITS(2) [
            V1_2 = 0,
            V1_45 = 1,
            V2_5 = 3
        ],
        /// Force the reference generator on
        REFGENOT OFFSET(6) NUMBITS(1) [],
        /// Force the bandgap on
        REFBGOT OFFSET(7) NUMBITS(1) [],
        REFGENACT OFFSET(8) NUMBITS(1) [],
        REFBGACT OFFSET(9) NUMBITS(1) [],
        /// A conversion is using the reference; REFVSEL and REFON cannot change
        REFGENBUSY OFFSET(10) NUMBITS(1) [],
        /// Bandgap is sampled
        BGMODE OFFSET(11) NUMBITS(1) [],
        REFGENRDY OFFSET(12) NUMBITS(1) [],
        REFBGRDY OFFSET(13) NUMBITS(1) []
    ]
];

pub type Voltage = CTL0::REFVSEL::Value;

impl Voltage {
    pub const fn millivolts(self) -> u32 {
        match self {
            Voltage::V1_2 => 1200,
            Voltage::V1_45 => 1450,
            Voltage::V2_5 => 2500,
        }
    }
}

pub struct Reference {
    registers: StaticRef<RefARegisters>,
}

impl Reference {
    pub const fn new(base: StaticRef<RefARegisters>) -> Reference {
        Reference { registers: base }
    }

    pub fn registers(&self) -> &RefARegisters {
        &self.registers
    }

    /// Switch the reference on at `voltage`.
    pub fn enable(&self, voltage: Voltage) -> Result<(), ErrorCode> {
        if self.registers.ctl0.is_set(CTL0::REFGENBUSY) {
            return Err(ErrorCode::BUSY);
        }
        self.registers
            .ctl0
            .modify(CTL0::REFVSEL.val(voltage as u16) + CTL0::REFON::SET);
        Ok(())
    }

    pub fn disable(&self) -> Result<(), ErrorCode> {
        if self.registers.ctl0.is_set(CTL0::REFGENBUSY) {
            return Err(ErrorCode::BUSY);
        }
        self.registers.ctl0.modify(CTL0::REFON::CLEAR);
        Ok(())
    }

    pub fn voltage(&self) -> Option<Voltage> {
        self.registers.ctl0.read_as_enum(CTL0::REFVSEL)
    }

    pub fn is_ready(&self) -> bool {
        self.registers.ctl0.is_set(CTL0::REFGENRDY)
    }
}
