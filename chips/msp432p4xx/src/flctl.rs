// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Flash Controller (FLCTL)

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::{
    FLASH_BANK_SIZE, FLASH_BASE, FLASH_MAIN_SIZE, FLASH_SECTOR_SIZE, FLCTL_BASE_ADDR,
};
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};

pub const FLCTL_BASE: StaticRef<FlCtlRegisters> =
    unsafe { StaticRef::new(FLCTL_BASE_ADDR as *const FlCtlRegisters) };

/// Main-memory sectors per bank covered by one protection register.
pub const SECTORS_PER_BANK: usize = 32;

register_structs! {
    pub FlCtlRegisters {
        /// Power Status Register
        (0x000 => pub power_stat: ReadOnly<u32, POWER_STAT::Register>),
        (0x004 => _reserved0),
        /// Bank 0 and bank 1 Read Control Registers
        (0x010 => pub bank_rdctl: [ReadWrite<u32, RDCTL::Register>; 2]),
        (0x018 => _reserved1),
        /// Read Burst/Compare Control and Status Register
        (0x020 => pub rdbrst_ctlstat: ReadWrite<u32, RDBRST_CTLSTAT::Register>),
        (0x024 => pub rdbrst_startaddr: ReadWrite<u32>),
        (0x028 => pub rdbrst_len: ReadWrite<u32>),
        (0x02C => _reserved2),
        (0x03C => pub rdbrst_failaddr: ReadWrite<u32>),
        (0x040 => pub rdbrst_failcnt: ReadWrite<u32>),
        (0x044 => _reserved3),
        /// Program Control and Status Register
        (0x050 => pub prg_ctlstat: ReadWrite<u32, PRG_CTLSTAT::Register>),
        /// Program Burst Control and Status Register
        (0x054 => pub prgbrst_ctlstat: ReadWrite<u32, PRGBRST_CTLSTAT::Register>),
        (0x058 => pub prgbrst_startaddr: ReadWrite<u32>),
        (0x05C => _reserved4),
        /// Program Burst Data, four 128-bit words
        (0x060 => pub prgbrst_data: [[ReadWrite<u32>; 4]; 4]),
        /// Erase Control and Status Register
        (0x0A0 => pub erase_ctlstat: ReadWrite<u32, ERASE_CTLSTAT::Register>),
        (0x0A4 => pub erase_sectaddr: ReadWrite<u32>),
        (0x0A8 => _reserved5),
        /// Bank 0 Information Memory Write/Erase Protection Register
        (0x0B0 => pub bank0_info_weprot: ReadWrite<u32, INFO_WEPROT::Register>),
        /// Bank 0 Main Memory Write/Erase Protection Register
        (0x0B4 => pub bank0_main_weprot: ReadWrite<u32, MAIN_WEPROT::Register>),
        (0x0B8 => _reserved6),
        (0x0C0 => pub bank1_info_weprot: ReadWrite<u32, INFO_WEPROT::Register>),
        (0x0C4 => pub bank1_main_weprot: ReadWrite<u32, MAIN_WEPROT::Register>),
        (0x0C8 => _reserved7),
        /// Benchmark Control and Status Register
        (0x0D0 => pub bmrk_ctlstat: ReadWrite<u32, BMRK_CTLSTAT::Register>),
        (0x0D4 => pub bmrk_ifetch: ReadWrite<u32>),
        (0x0D8 => pub bmrk_dread: ReadWrite<u32>),
        (0x0DC => pub bmrk_cmp: ReadWrite<u32>),
        (0x0E0 => _reserved8),
        (0x0F0 => pub ifg: ReadOnly<u32, INT::Register>),
        (0x0F4 => pub ie: ReadWrite<u32, INT::Register>),
        (0x0F8 => pub clrifg: WriteOnly<u32, INT::Register>),
        (0x0FC => pub setifg: WriteOnly<u32, INT::Register>),
        /// Timing control registers, set by the boot code
        (0x100 => pub read_timctl: ReadOnly<u32, READ_TIMCTL::Register>),
        (0x104 => pub readmargin_timctl: ReadOnly<u32>),
        (0x108 => pub prgver_timctl: ReadOnly<u32, PHASE_TIMCTL::Register>),
        (0x10C => pub ersver_timctl: ReadOnly<u32>),
        (0x110 => pub lkgver_timctl: ReadOnly<u32>),
        (0x114 => pub program_timctl: ReadOnly<u32, LONG_PHASE_TIMCTL::Register>),
        (0x118 => pub erase_timctl: ReadOnly<u32, LONG_PHASE_TIMCTL::Register>),
        (0x11C => pub masserase_timctl: ReadOnly<u32, MASSERASE_TIMCTL::Register>),
        (0x120 => pub burstprg_timctl: ReadOnly<u32>),
        (0x124 => @END),
    }
}

register_bitfields![u32,
    pub POWER_STAT [
        PSTAT OFFSET(0) NUMBITS(3) [
            PowerDown = 0,
            VddPowerUp = 1,
            PssCheck = 2,
            SafeLvCheck = 3,
            Active = 4,
            LowFrequencyActive = 5,
            Standby = 6,
            CurrentMirrorBoost = 7
        ],
        /// Flash LDO good
        LDOSTAT OFFSET(3) NUMBITS(1) [],
        VREFSTAT OFFSET(4) NUMBITS(1) [],
        IREFSTAT OFFSET(5) NUMBITS(1) [],
        TRIMSTAT OFFSET(6) NUMBITS(1) [],
        /// Reads take two cycles
        RD_2T OFFSET(7) NUMBITS(1) []
    ],
    pub RDCTL [
        RD_MODE OFFSET(0) NUMBITS(4) [
            Normal = 0,
            ReadMargin0 = 1,
            ReadMargin1 = 2,
            ProgramVerify = 3,
            EraseVerify = 4,
            LeakageVerify = 5,
            ReadMargin0B = 9,
            ReadMargin1B = 10
        ],
        /// Buffer instruction fetches
        BUFI OFFSET(4) NUMBITS(1) [],
        /// Buffer data reads
        BUFD OFFSET(5) NUMBITS(1) [],
        /// Read wait states
        WAIT OFFSET(12) NUMBITS(4) [],
        RD_MODE_STATUS OFFSET(16) NUMBITS(4) []
    ],
    pub RDBRST_CTLSTAT [
        START OFFSET(0) NUMBITS(1) [],
        MEM_TYPE OFFSET(1) NUMBITS(2) [
            Main = 0,
            Information = 1,
            Engineering = 3
        ],
        STOP_FAIL OFFSET(3) NUMBITS(1) [],
        /// Compare against all ones instead of all zeros
        DATA_CMP OFFSET(4) NUMBITS(1) [],
        TEST_EN OFFSET(6) NUMBITS(1) [],
        BRST_STAT OFFSET(16) NUMBITS(2) [
            Idle = 0,
            Pending = 1,
            InProgress = 2,
            Complete = 3
        ],
        CMP_ERR OFFSET(18) NUMBITS(1) [],
        ADDR_ERR OFFSET(19) NUMBITS(1) [],
        CLR_STAT OFFSET(23) NUMBITS(1) []
    ],
    pub PRG_CTLSTAT [
        ENABLE OFFSET(0) NUMBITS(1) [],
        /// Full word write mode
        MODE OFFSET(1) NUMBITS(1) [],
        VER_PRE OFFSET(2) NUMBITS(1) [],
        VER_PST OFFSET(3) NUMBITS(1) [],
        STATUS OFFSET(16) NUMBITS(2) [
            Idle = 0,
            Pending = 1,
            InProgress = 2
        ],
        /// Bank of the word being programmed
        BNK_ACT OFFSET(18) NUMBITS(1) []
    ],
    pub PRGBRST_CTLSTAT [
        START OFFSET(0) NUMBITS(1) [],
        TYPE OFFSET(1) NUMBITS(2) [
            Main = 0,
            Information = 1,
            Engineering = 3
        ],
        /// Number of 128-bit words
        LEN OFFSET(3) NUMBITS(3) [],
        AUTO_PRE OFFSET(6) NUMBITS(1) [],
        AUTO_PST OFFSET(7) NUMBITS(1) [],
        BURST_STATUS OFFSET(16) NUMBITS(3) [
            Idle = 0,
            Pending = 1,
            Word1 = 2,
            Word2 = 3,
            Word3 = 4,
            Word4 = 5,
            Complete = 7
        ],
        PRE_ERR OFFSET(19) NUMBITS(1) [],
        PST_ERR OFFSET(20) NUMBITS(1) [],
        ADDR_ERR OFFSET(21) NUMBITS(1) [],
        CLR_STAT OFFSET(23) NUMBITS(1) []
    ],
    pub ERASE_CTLSTAT [
        START OFFSET(0) NUMBITS(1) [],
        MODE OFFSET(1) NUMBITS(1) [
            Sector = 0,
            Mass = 1
        ],
        TYPE OFFSET(2) NUMBITS(2) [
            Main = 0,
            Information = 1,
            Engineering = 3
        ],
        STATUS OFFSET(16) NUMBITS(2) [
            Idle = 0,
            Pending = 1,
            InProgress = 2,
            Complete = 3
        ],
        ADDR_ERR OFFSET(18) NUMBITS(1) [],
        CLR_STAT OFFSET(19) NUMBITS(1) []
    ],
    pub INFO_WEPROT [
        PROT0 OFFSET(0) NUMBITS(1) [],
        PROT1 OFFSET(1) NUMBITS(1) []
    ],
    pub MAIN_WEPROT [
        /// One bit per sector, set to protect
        PROT OFFSET(0) NUMBITS(32) []
    ],
    pub BMRK_CTLSTAT [
        I_BMRK OFFSET(0) NUMBITS(1) [],
        D_BMRK OFFSET(1) NUMBITS(1) [],
        CMP_EN OFFSET(2) NUMBITS(1) [],
        /// Compare the data counter instead of the instruction counter
        CMP_SEL OFFSET(3) NUMBITS(1) []
    ],
    pub INT [
        RDBRST OFFSET(0) NUMBITS(1) [],
        AVPRE OFFSET(1) NUMBITS(1) [],
        AVPST OFFSET(2) NUMBITS(1) [],
        PRG OFFSET(3) NUMBITS(1) [],
        PRGB OFFSET(4) NUMBITS(1) [],
        ERASE OFFSET(5) NUMBITS(1) [],
        BMRK OFFSET(8) NUMBITS(1) [],
        PRG_ERR OFFSET(9) NUMBITS(1) []
    ],
    pub READ_TIMCTL [
        SETUP OFFSET(0) NUMBITS(8) [],
        IREF_BOOST1 OFFSET(12) NUMBITS(4) [],
        SETUP_LONG OFFSET(16) NUMBITS(8) []
    ],
    pub PHASE_TIMCTL [
        SETUP OFFSET(0) NUMBITS(8) [],
        ACTIVE OFFSET(8) NUMBITS(4) [],
        HOLD OFFSET(12) NUMBITS(4) []
    ],
    pub LONG_PHASE_TIMCTL [
        SETUP OFFSET(0) NUMBITS(8) [],
        ACTIVE OFFSET(8) NUMBITS(20) [],
        HOLD OFFSET(28) NUMBITS(4) []
    ],
    pub MASSERASE_TIMCTL [
        BOOST_ACTIVE OFFSET(0) NUMBITS(8) [],
        BOOST_HOLD OFFSET(8) NUMBITS(8) []
    ]
];

/// Minimum read wait states for MCLK at `mclk_hz`.
///
/// The limits are 12 and 24 MHz at core voltage level 0, and 16, 32 and
/// 48 MHz at level 1.
pub const fn read_wait_states(mclk_hz: u32, vcore1: bool) -> Result<u32, ErrorCode> {
    const MHZ: u32 = 1_000_000;
    let limits: &[u32] = if vcore1 {
        &[16 * MHZ, 32 * MHZ, 48 * MHZ]
    } else {
        &[12 * MHZ, 24 * MHZ]
    };
    let mut wait_states = 0;
    while wait_states < limits.len() {
        if mclk_hz <= limits[wait_states] {
            return Ok(wait_states as u32);
        }
        wait_states += 1;
    }
    Err(ErrorCode::INVAL)
}

/// Bank and sector holding main-memory address `addr`.
pub const fn sector_of(addr: usize) -> Result<(usize, usize), ErrorCode> {
    let offset = match addr.checked_sub(FLASH_BASE) {
        Some(offset) if offset < FLASH_MAIN_SIZE => offset,
        _ => return Err(ErrorCode::INVAL),
    };
    Ok((
        offset / FLASH_BANK_SIZE,
        (offset % FLASH_BANK_SIZE) / FLASH_SECTOR_SIZE,
    ))
}

/// MAIN_WEPROT bit for `sector` of a bank.
pub const fn main_protection_mask(sector: usize) -> Result<u32, ErrorCode> {
    if sector >= SECTORS_PER_BANK {
        return Err(ErrorCode::INVAL);
    }
    Ok(1 << sector)
}

impl FlCtlRegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "FLCTL");
        debug::write_register(
            writer,
            "POWER_STAT",
            offset_of!(FlCtlRegisters, power_stat),
            self.power_stat.get(),
        );
        debug::write_register(
            writer,
            "BANK0_RDCTL",
            offset_of!(FlCtlRegisters, bank_rdctl),
            self.bank_rdctl[0].get(),
        );
        debug::write_register(
            writer,
            "BANK1_RDCTL",
            offset_of!(FlCtlRegisters, bank_rdctl) + 4,
            self.bank_rdctl[1].get(),
        );
        debug::write_register(writer, "IFG", offset_of!(FlCtlRegisters, ifg), self.ifg.get());
        debug::write_flag(writer, "program error", self.ifg.is_set(INT::PRG_ERR));
    }
}

pub struct FlCtl {
    registers: StaticRef<FlCtlRegisters>,
}

impl FlCtl {
    pub const fn new(base: StaticRef<FlCtlRegisters>) -> FlCtl {
        FlCtl { registers: base }
    }

    pub fn registers(&self) -> &FlCtlRegisters {
        &self.registers
    }

    pub fn set_wait_states(&self, wait_states: u32) -> Result<(), ErrorCode> {
        if wait_states > 15 {
            return Err(ErrorCode::INVAL);
        }
        for bank in self.registers.bank_rdctl.iter() {
            bank.modify(RDCTL::WAIT.val(wait_states));
        }
        Ok(())
    }

    /// Program the wait states MCLK at `mclk_hz` needs. Call this before
    /// raising the clock.
    pub fn configure_for(&self, mclk_hz: u32, vcore1: bool) -> Result<(), ErrorCode> {
        self.set_wait_states(read_wait_states(mclk_hz, vcore1)?)
    }

    pub fn set_buffering(&self, enable: bool) {
        let enable = u32::from(enable);
        for bank in self.registers.bank_rdctl.iter() {
            bank.modify(RDCTL::BUFD.val(enable) + RDCTL::BUFI.val(enable));
        }
    }

    fn main_weprot(&self, bank: usize) -> Result<&ReadWrite<u32, MAIN_WEPROT::Register>, ErrorCode> {
        match bank {
            0 => Ok(&self.registers.bank0_main_weprot),
            1 => Ok(&self.registers.bank1_main_weprot),
            _ => Err(ErrorCode::INVAL),
        }
    }

    /// Allow program and erase of the sector holding `addr`.
    pub fn unprotect(&self, addr: usize) -> Result<(), ErrorCode> {
        let (bank, sector) = sector_of(addr)?;
        let mask = main_protection_mask(sector)?;
        let reg = self.main_weprot(bank)?;
        reg.set(reg.get() & !mask);
        Ok(())
    }

    pub fn protect(&self, addr: usize) -> Result<(), ErrorCode> {
        let (bank, sector) = sector_of(addr)?;
        let mask = main_protection_mask(sector)?;
        let reg = self.main_weprot(bank)?;
        reg.set(reg.get() | mask);
        Ok(())
    }

    pub fn is_protected(&self, addr: usize) -> Result<bool, ErrorCode> {
        let (bank, sector) = sector_of(addr)?;
        let mask = main_protection_mask(sector)?;
        Ok(self.main_weprot(bank)?.get() & mask != 0)
    }

    pub fn clear_interrupts(&self) {
        self.registers.clrifg.write(
            INT::RDBRST::SET
                + INT::AVPRE::SET
                + INT::AVPST::SET
                + INT::PRG::SET
                + INT::PRGB::SET
                + INT::ERASE::SET
                + INT::BMRK::SET
                + INT::PRG_ERR::SET,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, peek};
    use std::string::String;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<FlCtlRegisters>(), 0x124);
        assert_eq!(offset_of!(FlCtlRegisters, bank_rdctl), 0x010);
        assert_eq!(offset_of!(FlCtlRegisters, rdbrst_failaddr), 0x03C);
        assert_eq!(offset_of!(FlCtlRegisters, prgbrst_data), 0x060);
        assert_eq!(offset_of!(FlCtlRegisters, erase_ctlstat), 0x0A0);
        assert_eq!(offset_of!(FlCtlRegisters, bank1_main_weprot), 0x0C4);
        assert_eq!(offset_of!(FlCtlRegisters, ifg), 0x0F0);
        assert_eq!(offset_of!(FlCtlRegisters, masserase_timctl), 0x11C);
        assert_eq!(offset_of!(FlCtlRegisters, burstprg_timctl), 0x120);
        assert_eq!(FLCTL_BASE.address(), 0x4001_1000);
    }

    #[test]
    fn wait_states_at_vcore0() {
        assert_eq!(read_wait_states(3_000_000, false), Ok(0));
        assert_eq!(read_wait_states(12_000_000, false), Ok(0));
        assert_eq!(read_wait_states(12_000_001, false), Ok(1));
        assert_eq!(read_wait_states(24_000_000, false), Ok(1));
        assert_eq!(read_wait_states(24_000_001, false), Err(ErrorCode::INVAL));
    }

    #[test]
    fn wait_states_at_vcore1() {
        assert_eq!(read_wait_states(16_000_000, true), Ok(0));
        assert_eq!(read_wait_states(24_000_000, true), Ok(1));
        assert_eq!(read_wait_states(32_000_000, true), Ok(1));
        assert_eq!(read_wait_states(48_000_000, true), Ok(2));
        assert_eq!(read_wait_states(48_000_001, true), Err(ErrorCode::INVAL));
    }

    #[cfg(not(feature = "msp432p4x1xl"))]
    #[test]
    fn sectors() {
        assert_eq!(sector_of(0x0000_0000), Ok((0, 0)));
        assert_eq!(sector_of(0x0000_1000), Ok((0, 1)));
        assert_eq!(sector_of(0x0001_FFFF), Ok((0, 31)));
        assert_eq!(sector_of(0x0002_0000), Ok((1, 0)));
        assert_eq!(sector_of(0x0003_F000), Ok((1, 31)));
        assert_eq!(sector_of(0x0004_0000), Err(ErrorCode::INVAL));
    }

    #[test]
    fn protection_masks() {
        assert_eq!(main_protection_mask(0), Ok(0x0000_0001));
        assert_eq!(main_protection_mask(31), Ok(0x8000_0000));
        assert_eq!(main_protection_mask(32), Err(ErrorCode::INVAL));
    }

    #[test]
    fn wait_states_land_in_both_banks() {
        let flctl = FlCtl::new(fake_block());
        flctl.registers().bank_rdctl[1].write(RDCTL::BUFI::SET);
        assert_eq!(flctl.configure_for(48_000_000, true), Ok(()));
        assert_eq!(flctl.registers().bank_rdctl[0].get(), 0x2000);
        assert_eq!(flctl.registers().bank_rdctl[1].get(), 0x2010);
        assert_eq!(flctl.configure_for(30_000_000, false), Err(ErrorCode::INVAL));
        assert_eq!(flctl.set_wait_states(16), Err(ErrorCode::INVAL));
        flctl.set_buffering(true);
        assert_eq!(flctl.registers().bank_rdctl[0].get(), 0x2030);
    }

    #[cfg(not(feature = "msp432p4x1xl"))]
    #[test]
    fn sector_protection() {
        let flctl = FlCtl::new(fake_block());
        flctl.registers().bank1_main_weprot.set(0xFFFF_FFFF);
        assert_eq!(flctl.is_protected(0x0002_3000), Ok(true));
        assert_eq!(flctl.unprotect(0x0002_3000), Ok(()));
        assert_eq!(flctl.registers().bank1_main_weprot.get(), 0xFFFF_FFF7);
        assert_eq!(flctl.is_protected(0x0002_3000), Ok(false));
        assert_eq!(flctl.protect(0x0000_0000), Ok(()));
        assert_eq!(flctl.registers().bank0_main_weprot.get(), 0x0000_0001);
        assert_eq!(flctl.protect(0x0010_0000), Err(ErrorCode::INVAL));
    }

    #[test]
    fn clear_all_flags() {
        let flctl = FlCtl::new(fake_block());
        flctl.clear_interrupts();
        assert_eq!(peek::<_, u32>(&flctl.registers().clrifg), 0x33F);
        let mut out = String::new();
        flctl.registers().print_state(&mut out);
        assert!(out.contains("BANK1_RDCTL        [+0x014]"));
    }
}
