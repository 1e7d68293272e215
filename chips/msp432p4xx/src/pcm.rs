// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Power Control Manager (PCM)

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::PCM_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};

pub const PCM_BASE: StaticRef<PcmRegisters> =
    unsafe { StaticRef::new(PCM_BASE_ADDR as *const PcmRegisters) };

/// Key for changing AMR, LPMR and the CTL1 lock bits. It has to accompany
/// every write to CTL0 or CTL1.
pub const PCM_KEY_VAL: u32 = 0x695A;

register_structs! {
    pub PcmRegisters {
        /// Control 0 Register
        (0x00 => pub ctl0: ReadWrite<u32, CTL0::Register>),
        /// Control 1 Register
        (0x04 => pub ctl1: ReadWrite<u32, CTL1::Register>),
        /// Interrupt Enable Register
        (0x08 => pub ie: ReadWrite<u32, IE::Register>),
        /// Interrupt Flag Register
        (0x0C => pub ifg: ReadOnly<u32, IFG::Register>),
        /// Clear Interrupt Flag Register
        (0x10 => pub clrifg: WriteOnly<u32, CLRIFG::Register>),
        (0x14 => @END),
    }
}

register_bitfields![u32,
    pub CTL0 [
        /// Active mode request
        AMR OFFSET(0) NUMBITS(4) [
            AM_LDO_VCORE0 = 0x0,
            AM_LDO_VCORE1 = 0x1,
            AM_DCDC_VCORE0 = 0x4,
            AM_DCDC_VCORE1 = 0x5,
            AM_LF_VCORE0 = 0x8,
            AM_LF_VCORE1 = 0x9
        ],
        /// Low power mode request
        LPMR OFFSET(4) NUMBITS(4) [
            LPM3 = 0x0,
            LPM3_5 = 0xA,
            LPM4_5 = 0xC
        ],
        /// Current power mode
        CPM OFFSET(8) NUMBITS(6) [
            AM_LDO_VCORE0 = 0x00,
            AM_LDO_VCORE1 = 0x01,
            AM_DCDC_VCORE0 = 0x04,
            AM_DCDC_VCORE1 = 0x05,
            AM_LF_VCORE0 = 0x08,
            AM_LF_VCORE1 = 0x09,
            LPM0_LDO_VCORE0 = 0x10,
            LPM0_LDO_VCORE1 = 0x11,
            LPM0_DCDC_VCORE0 = 0x14,
            LPM0_DCDC_VCORE1 = 0x15,
            LPM0_LF_VCORE0 = 0x18,
            LPM0_LF_VCORE1 = 0x19,
            LPM3 = 0x20
        ],
        /// Reads 0xA596, write 0x695A to change the other fields
        PCMKEY OFFSET(16) NUMBITS(16) []
    ],
    pub CTL1 [
        /// Lock LPM5
        LOCKLPM5 OFFSET(0) NUMBITS(1) [],
        /// Lock backup
        LOCKBKUP OFFSET(1) NUMBITS(1) [],
        /// Force entry into LPM3 or LPMx.5 regardless of peripheral state
        FORCE_LPM_ENTRY OFFSET(2) NUMBITS(1) [],
        /// Power mode request busy
        PMR_BUSY OFFSET(8) NUMBITS(1) [],
        PCMKEY OFFSET(16) NUMBITS(16) []
    ],
    pub IE [
        /// Invalid transition from active mode to a low-power mode
        LPM_INVALID_TR_IE OFFSET(0) NUMBITS(1) [],
        /// Invalid clock setting during a LPM3/LPMx.5 transition
        LPM_INVALID_CLK_IE OFFSET(1) NUMBITS(1) [],
        /// Invalid active mode request
        AM_INVALID_TR_IE OFFSET(2) NUMBITS(1) [],
        /// DC-DC operation cannot be achieved or maintained
        DCDC_ERROR_IE OFFSET(6) NUMBITS(1) []
    ],
    pub IFG [
        LPM_INVALID_TR_IFG OFFSET(0) NUMBITS(1) [],
        LPM_INVALID_CLK_IFG OFFSET(1) NUMBITS(1) [],
        AM_INVALID_TR_IFG OFFSET(2) NUMBITS(1) [],
        DCDC_ERROR_IFG OFFSET(6) NUMBITS(1) []
    ],
    pub CLRIFG [
        CLR_LPM_INVALID_TR_IFG OFFSET(0) NUMBITS(1) [],
        CLR_LPM_INVALID_CLK_IFG OFFSET(1) NUMBITS(1) [],
        CLR_AM_INVALID_TR_IFG OFFSET(2) NUMBITS(1) [],
        CLR_DCDC_ERROR_IFG OFFSET(6) NUMBITS(1) []
    ]
];

/// Active modes that can be requested through AMR.
pub type ActiveMode = CTL0::AMR::Value;

/// Power modes reported by CPM.
pub type PowerMode = CTL0::CPM::Value;

impl PcmRegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "PCM");
        debug::write_register(writer, "CTL0", offset_of!(PcmRegisters, ctl0), self.ctl0.get());
        debug::write_register(writer, "CTL1", offset_of!(PcmRegisters, ctl1), self.ctl1.get());
        debug::write_register(writer, "IFG", offset_of!(PcmRegisters, ifg), self.ifg.get());
        debug::write_flag(writer, "request busy", self.ctl1.is_set(CTL1::PMR_BUSY));
        debug::write_flag(writer, "invalid AM transition", self.ifg.is_set(IFG::AM_INVALID_TR_IFG));
        debug::write_flag(writer, "DC-DC error", self.ifg.is_set(IFG::DCDC_ERROR_IFG));
    }
}

pub struct Pcm {
    registers: StaticRef<PcmRegisters>,
}

impl Pcm {
    pub const fn new(base: StaticRef<PcmRegisters>) -> Pcm {
        Pcm { registers: base }
    }

    pub fn registers(&self) -> &PcmRegisters {
        &self.registers
    }

    pub fn is_busy(&self) -> bool {
        self.registers.ctl1.is_set(CTL1::PMR_BUSY)
    }

    /// The power mode the device is in right now, or `None` while the
    /// controller reports an encoding outside the documented set.
    pub fn current_mode(&self) -> Option<PowerMode> {
        self.registers.ctl0.read_as_enum(CTL0::CPM)
    }

    /// Ask for a transition to another active mode. The request is only
    /// accepted while no other request is in progress; completion is signalled
    /// by PMR_BUSY clearing and CPM changing.
    pub fn request_active_mode(&self, mode: ActiveMode) -> Result<(), ErrorCode> {
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        if self.registers.ctl0.read(CTL0::CPM) == mode as u32 {
            return Err(ErrorCode::ALREADY);
        }
        self.registers
            .ctl0
            .modify(CTL0::PCMKEY.val(PCM_KEY_VAL) + CTL0::AMR.val(mode as u32));
        Ok(())
    }

    /// Select the low-power mode entered on the next deep sleep.
    pub fn set_low_power_mode(&self, mode: CTL0::LPMR::Value) -> Result<(), ErrorCode> {
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        self.registers
            .ctl0
            .modify(CTL0::PCMKEY.val(PCM_KEY_VAL) + CTL0::LPMR.val(mode as u32));
        Ok(())
    }

    /// Whether the controller rejected the last active mode request.
    pub fn transition_failed(&self) -> bool {
        self.registers.ifg.is_set(IFG::AM_INVALID_TR_IFG)
    }

    pub fn clear_interrupts(&self) {
        self.registers.clrifg.write(
            CLRIFG::CLR_LPM_INVALID_TR_IFG::SET
                + CLRIFG::CLR_LPM_INVALID_CLK_IFG::SET
                + CLRIFG::CLR_AM_INVALID_TR_IFG::SET
                + CLRIFG::CLR_DCDC_ERROR_IFG::SET,
        );
    }
}
