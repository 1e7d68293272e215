// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Reset Controller (RSTCTL)
//!
//! Records which sources caused the last resets and lets software request
//! a hard or soft reset. Each source class has a sticky status register and a
//! matching clear register.

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::RSTCTL_BASE_ADDR;
use crate::registers::interfaces::{Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::StaticRef;

pub const RSTCTL_BASE: StaticRef<RstCtlRegisters> =
    unsafe { StaticRef::new(RSTCTL_BASE_ADDR as *const RstCtlRegisters) };

/// Written to RESET_REQ[15:8] together with the request bit.
pub const RESET_KEY: u32 = 0x69;

register_structs! {
    pub RstCtlRegisters {
        /// Reset Request Register
        (0x000 => pub reset_req: ReadWrite<u32, RESET_REQ::Register>),
        /// Hard Reset Status Register
        (0x004 => pub hardreset_stat: ReadOnly<u32, SOURCES::Register>),
        /// Hard Reset Status Clear Register
        (0x008 => pub hardreset_clr: WriteOnly<u32, SOURCES::Register>),
        /// Hard Reset Status Set Register
        (0x00C => pub hardreset_set: WriteOnly<u32, SOURCES::Register>),
        /// Soft Reset Status Register
        (0x010 => pub softreset_stat: ReadOnly<u32, SOURCES::Register>),
        /// Soft Reset Status Clear Register
        (0x014 => pub softreset_clr: WriteOnly<u32, SOURCES::Register>),
        /// Soft Reset Status Set Register
        (0x018 => pub softreset_set: WriteOnly<u32, SOURCES::Register>),
        (0x01C => _reserved0),
        /// PSS Reset Status Register
        (0x100 => pub pssreset_stat: ReadOnly<u32, PSSRESET_STAT::Register>),
        /// PSS Reset Status Clear Register
        (0x104 => pub pssreset_clr: WriteOnly<u32, CLR::Register>),
        /// PCM Reset Status Register
        (0x108 => pub pcmreset_stat: ReadOnly<u32, PCMRESET_STAT::Register>),
        /// PCM Reset Status Clear Register
        (0x10C => pub pcmreset_clr: WriteOnly<u32, CLR::Register>),
        /// Pin Reset Status Register
        (0x110 => pub pinreset_stat: ReadOnly<u32, PINRESET_STAT::Register>),
        /// Pin Reset Status Clear Register
        (0x114 => pub pinreset_clr: WriteOnly<u32, CLR::Register>),
        /// Reboot Reset Status Register
        (0x118 => pub rebootreset_stat: ReadOnly<u32, REBOOTRESET_STAT::Register>),
        /// Reboot Reset Status Clear Register
        (0x11C => pub rebootreset_clr: WriteOnly<u32, CLR::Register>),
        /// CS Reset Status Register
        (0x120 => pub csreset_stat: ReadOnly<u32, CSRESET_STAT::Register>),
        /// CS Reset Status Clear Register
        (0x124 => pub csreset_clr: WriteOnly<u32, CLR::Register>),
        (0x128 => @END),
    }
}

register_bitfields![u32,
    pub RESET_REQ [
        /// Soft reset request
        SOFT_REQ OFFSET(0) NUMBITS(1) [],
        /// Hard reset request
        HARD_REQ OFFSET(1) NUMBITS(1) [],
        /// Write key, 0x69
        RSTKEY OFFSET(8) NUMBITS(8) []
    ],
    /// Hard and soft reset sources share one layout: one bit per source.
    pub SOURCES [
        SRC OFFSET(0) NUMBITS(16) []
    ],
    pub CLR [
        CLR OFFSET(0) NUMBITS(1) []
    ],
    pub PSSRESET_STAT [
        /// SVSL supervisor
        SVSL OFFSET(0) NUMBITS(1) [],
        /// SVSMH supervisor or monitor
        SVSMH OFFSET(1) NUMBITS(1) [],
        /// Bandgap reference
        BGREF OFFSET(2) NUMBITS(1) [],
        /// VCC detector trip
        VCCDET OFFSET(3) NUMBITS(1) []
    ],
    pub PCMRESET_STAT [
        /// Wake-up from LPM3.5
        LPM35 OFFSET(0) NUMBITS(1) [],
        /// Wake-up from LPM4.5
        LPM45 OFFSET(1) NUMBITS(1) []
    ],
    pub PINRESET_STAT [
        /// RSTn/NMI pin
        RSTNMI OFFSET(0) NUMBITS(1) []
    ],
    pub REBOOTRESET_STAT [
        /// SYSCTL reboot
        REBOOT OFFSET(0) NUMBITS(1) []
    ],
    pub CSRESET_STAT [
        /// DCO external resistor short circuit
        DCOR_SHT OFFSET(0) NUMBITS(1) []
    ]
];

/// Hard reset source bits as wired on this device.
pub mod hard_source {
    pub const SYSRESETREQ: u16 = 1 << 0;
    pub const WDT_TIMEOUT: u16 = 1 << 1;
    pub const WDT_PASSWORD: u16 = 1 << 2;
    pub const FLCTL: u16 = 1 << 3;
    pub const CS: u16 = 1 << 14;
    pub const PCM: u16 = 1 << 15;
}

/// Soft reset source bits as wired on this device.
pub mod soft_source {
    pub const CPU_LOCKUP: u16 = 1 << 0;
    pub const WDT_TIMEOUT: u16 = 1 << 1;
    pub const WDT_PASSWORD: u16 = 1 << 2;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetKind {
    /// Resets the CPU and most peripherals, keeping the debug session.
    Soft,
    /// Resets everything except the debug logic and the PSS.
    Hard,
}

/// Snapshot of every reset status register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResetCauses {
    pub hard: u16,
    pub soft: u16,
    pub svsl: bool,
    pub svsmh: bool,
    pub bgref: bool,
    pub vccdet: bool,
    pub lpm35: bool,
    pub lpm45: bool,
    pub pin: bool,
    pub reboot: bool,
    pub dco_short: bool,
}

impl ResetCauses {
    pub fn is_empty(&self) -> bool {
        *self == ResetCauses::default()
    }

    /// Any of the power supply supervisors tripped.
    pub fn power_fault(&self) -> bool {
        self.svsl || self.svsmh || self.bgref || self.vccdet
    }

    pub fn watchdog(&self) -> bool {
        let mask = hard_source::WDT_TIMEOUT | hard_source::WDT_PASSWORD;
        self.hard & mask != 0 || self.soft & mask != 0
    }
}

impl RstCtlRegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "RSTCTL");
        let regs = [
            ("HARDRESET_STAT", offset_of!(Self, hardreset_stat), self.hardreset_stat.get()),
            ("SOFTRESET_STAT", offset_of!(Self, softreset_stat), self.softreset_stat.get()),
            ("PSSRESET_STAT", offset_of!(Self, pssreset_stat), self.pssreset_stat.get()),
            ("PCMRESET_STAT", offset_of!(Self, pcmreset_stat), self.pcmreset_stat.get()),
            ("PINRESET_STAT", offset_of!(Self, pinreset_stat), self.pinreset_stat.get()),
            (
                "REBOOTRESET_STAT",
                offset_of!(Self, rebootreset_stat),
                self.rebootreset_stat.get(),
            ),
            ("CSRESET_STAT", offset_of!(Self, csreset_stat), self.csreset_stat.get()),
        ];
        for (name, offset, value) in regs {
            debug::write_register(writer, name, offset, value);
        }
    }
}

pub struct ResetController {
    registers: StaticRef<RstCtlRegisters>,
}

impl ResetController {
    pub const fn new(base: StaticRef<RstCtlRegisters>) -> ResetController {
        ResetController { registers: base }
    }

    pub fn registers(&self) -> &RstCtlRegisters {
        &self.registers
    }

    /// Trigger a reset. On hardware this does not return.
    pub fn request(&self, kind: ResetKind) {
        let req = match kind {
            ResetKind::Soft => RESET_REQ::SOFT_REQ::SET,
            ResetKind::Hard => RESET_REQ::HARD_REQ::SET,
        };
        self.registers
            .reset_req
            .write(RESET_REQ::RSTKEY.val(RESET_KEY) + req);
    }

    pub fn reset_causes(&self) -> ResetCauses {
        let regs = &self.registers;
        let pss = regs.pssreset_stat.extract();
        let pcm = regs.pcmreset_stat.extract();
        ResetCauses {
            hard: regs.hardreset_stat.read(SOURCES::SRC) as u16,
            soft: regs.softreset_stat.read(SOURCES::SRC) as u16,
            svsl: pss.is_set(PSSRESET_STAT::SVSL),
            svsmh: pss.is_set(PSSRESET_STAT::SVSMH),
            bgref: pss.is_set(PSSRESET_STAT::BGREF),
            vccdet: pss.is_set(PSSRESET_STAT::VCCDET),
            lpm35: pcm.is_set(PCMRESET_STAT::LPM35),
            lpm45: pcm.is_set(PCMRESET_STAT::LPM45),
            pin: regs.pinreset_stat.is_set(PINRESET_STAT::RSTNMI),
            reboot: regs.rebootreset_stat.is_set(REBOOTRESET_STAT::REBOOT),
            dco_short: regs.csreset_stat.is_set(CSRESET_STAT::DCOR_SHT),
        }
    }

    /// Clear every sticky reset status bit.
    pub fn clear_all(&self) {
        let regs = &self.registers;
        regs.hardreset_clr.write(SOURCES::SRC.val(0xFFFF));
        regs.softreset_clr.write(SOURCES::SRC.val(0xFFFF));
        regs.pssreset_clr.write(CLR::CLR::SET);
        regs.pcmreset_clr.write(CLR::CLR::SET);
        regs.pinreset_clr.write(CLR::CLR::SET);
        regs.rebootreset_clr.write(CLR::CLR::SET);
        regs.csreset_clr.write(CLR::CLR::SET);
    }
}
