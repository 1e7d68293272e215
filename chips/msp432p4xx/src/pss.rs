// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Power Supply System (PSS)

use crate::memory_map::PSS_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};

pub const PSS_BASE: StaticRef<PssRegisters> =
    unsafe { StaticRef::new(PSS_BASE_ADDR as *const PssRegisters) };

pub const PSS_KEY_VAL: u32 = 0x695A;
/// KEY read-back while unlocked; zero while locked.
pub const PSS_KEY_UNLOCKED: u32 = 0xA596;

register_structs! {
    pub PssRegisters {
        (0x00 => pub key: ReadWrite<u32, KEY::Register>),
        (0x04 => pub ctl0: ReadWrite<u32, CTL0::Register>),
        (0x08 => _reserved0),
        (0x34 => pub ie: ReadWrite<u32, INT::Register>),
        (0x38 => pub ifg: ReadOnly<u32, INT::Register>),
        (0x3C => pub clrifg: WriteOnly<u32, INT::Register>),
        (0x40 => @END),
    }
}

register_bitfields![u32,
    pub KEY [
        PSSKEY OFFSET(0) NUMBITS(16) []
    ],
    pub CTL0 [
        /// High-side supervisor and monitor off
        SVSMHOFF OFFSET(0) NUMBITS(1) [],
        /// High-side supervisor in low-power (slow) mode
        SVSMHLP OFFSET(1) NUMBITS(1) [],
        /// Monitor instead of supervisor
        SVSMHS OFFSET(2) NUMBITS(1) [],
        /// High-side threshold level
        SVSMHTH OFFSET(3) NUMBITS(3) [],
        /// Drive the monitor output onto SVMHOUT
        SVMHOE OFFSET(6) NUMBITS(1) [],
        SVMHOUTPOLAL OFFSET(7) NUMBITS(1) [],
        /// Fail instead of falling back to LDO when DC-DC cannot start
        DCDC_FORCE OFFSET(10) NUMBITS(1) [],
        VCORETRAN OFFSET(12) NUMBITS(2) [
            Ns32PerMv = 0,
            Ns64PerMv = 1,
            Ns128PerMv = 2,
            Ns256PerMv = 3
        ]
    ],
    pub INT [
        /// High-side supervisor/monitor event
        SVSMH OFFSET(1) NUMBITS(1) []
    ]
];

pub struct Pss {
    registers: StaticRef<PssRegisters>,
}

impl Pss {
    pub const fn new(base: StaticRef<PssRegisters>) -> Pss {
        Pss { registers: base }
    }

    pub fn registers(&self) -> &PssRegisters {
        &self.registers
    }

    pub fn unlock(&self) {
        self.registers.key.write(KEY::PSSKEY.val(PSS_KEY_VAL));
    }

    pub fn lock(&self) {
        self.registers.key.write(KEY::PSSKEY.val(0));
    }

    pub fn is_locked(&self) -> bool {
        self.registers.key.read(KEY::PSSKEY) != PSS_KEY_UNLOCKED
    }

    pub fn with_unlocked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PssRegisters) -> R,
    {
        self.unlock();
        let result = f(&self.registers);
        self.lock();
        result
    }

    /// Turn the high-side supervisor off, saving its current in LPM3 and LPM4.
    pub fn disable_high_side_supervisor(&self) {
        self.with_unlocked(|regs| regs.ctl0.modify(CTL0::SVSMHOFF::SET));
    }

    pub fn enable_high_side_supervisor(&self, threshold: u32) -> Result<(), ErrorCode> {
        if threshold > 7 {
            return Err(ErrorCode::INVAL);
        }
        self.with_unlocked(|regs| {
            regs.ctl0
                .modify(CTL0::SVSMHOFF::CLEAR + CTL0::SVSMHTH.val(threshold))
        });
        Ok(())
    }

    pub fn supervisor_tripped(&self) -> bool {
        self.registers.ifg.is_set(INT::SVSMH)
    }

    pub fn clear_interrupt(&self) {
        self.registers.clrifg.write(INT::SVSMH::SET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, peek, poke};
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<PssRegisters>(), 0x40);
        assert_eq!(offset_of!(PssRegisters, ctl0), 0x04);
        assert_eq!(offset_of!(PssRegisters, ie), 0x34);
        assert_eq!(offset_of!(PssRegisters, ifg), 0x38);
        assert_eq!(offset_of!(PssRegisters, clrifg), 0x3C);
        assert_eq!(PSS_BASE.address(), 0x4001_0800);
    }

    #[test]
    fn supervisor_writes_are_keyed() {
        let pss = Pss::new(fake_block());
        let seen = pss.with_unlocked(|regs| regs.key.get());
        assert_eq!(seen, PSS_KEY_VAL);
        assert!(pss.is_locked());

        pss.disable_high_side_supervisor();
        assert_eq!(pss.registers().ctl0.get(), 0x1);
        assert_eq!(pss.enable_high_side_supervisor(5), Ok(()));
        assert_eq!(pss.registers().ctl0.get(), 0x28);
        assert_eq!(pss.enable_high_side_supervisor(8), Err(ErrorCode::INVAL));
        assert!(pss.is_locked());
    }

    #[test]
    fn lock_state_follows_key_read_back() {
        let pss = Pss::new(fake_block());
        assert!(pss.is_locked());
        poke(pss.registers, offset_of!(PssRegisters, key), PSS_KEY_UNLOCKED);
        assert!(!pss.is_locked());
        pss.lock();
        assert!(pss.is_locked());
    }

    #[test]
    fn interrupt_flag() {
        let pss = Pss::new(fake_block());
        assert!(!pss.supervisor_tripped());
        poke(pss.registers, offset_of!(PssRegisters, ifg), 0x2u32);
        assert!(pss.supervisor_tripped());
        pss.clear_interrupt();
        assert_eq!(peek::<_, u32>(&pss.registers().clrifg), 0x2);
    }
}
