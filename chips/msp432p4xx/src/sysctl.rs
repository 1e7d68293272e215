// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! System Controller (SYSCTL)

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::{SYSCTL_BASE_ADDR, SYSCTL_BOOT_BASE_ADDR};
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{
    register_bitfields, register_structs, FieldValue, ReadOnly, ReadWrite, WriteOnly,
};
use crate::StaticRef;

pub const SYSCTL_BASE: StaticRef<SysCtlRegisters> =
    unsafe { StaticRef::new(SYSCTL_BASE_ADDR as *const SysCtlRegisters) };

pub const SYSCTL_BOOT_BASE: StaticRef<SysCtlBootRegisters> =
    unsafe { StaticRef::new(SYSCTL_BOOT_BASE_ADDR as *const SysCtlBootRegisters) };

/// Key for REBOOT_CTL[15:8] and the boot block RESET_REQ[15:8].
pub const REBOOT_KEY: u32 = 0x69;
/// Unlocks access to the secure data area for the debugger.
pub const SECDATA_UNLOCK_KEY: u32 = 0x695A;
/// Unlocks the registers of the boot block.
pub const MASTER_UNLOCK_KEY: u32 = 0x695A;

/// Number of SRAM banks the enable and retention registers control.
pub const SRAM_BANKS: u32 = 8;

register_structs! {
    pub SysCtlRegisters {
        /// Reboot Control Register
        (0x00 => pub reboot_ctl: WriteOnly<u32, REBOOT_CTL::Register>),
        /// NMI Control and Status Register
        (0x04 => pub nmi_ctlstat: ReadWrite<u32, NMI_CTLSTAT::Register>),
        /// Watchdog Reset Control Register
        (0x08 => pub wdtreset_ctl: ReadWrite<u32, WDTRESET_CTL::Register>),
        /// Peripheral Halt Control Register
        (0x0C => pub perihalt_ctl: ReadWrite<u32, PERIHALT_CTL::Register>),
        /// SRAM Size Register
        (0x10 => pub sram_size: ReadOnly<u32>),
        /// SRAM Bank Enable Register
        (0x14 => pub sram_banken: ReadWrite<u32, SRAM_BANKEN::Register>),
        /// SRAM Bank Retention Control Register
        (0x18 => pub sram_bankret: ReadWrite<u32, SRAM_BANKRET::Register>),
        (0x1C => _reserved0),
        /// Flash Size Register
        (0x20 => pub flash_size: ReadOnly<u32>),
        (0x24 => _reserved1),
        /// Digital I/O Glitch Filter Control Register
        (0x30 => pub dio_gltflt_ctl: ReadWrite<u32, DIO_GLTFLT_CTL::Register>),
        (0x34 => _reserved2),
        /// IP Protected Secure Zone Data Access Unlock Register
        (0x40 => pub secdata_unlock: ReadWrite<u32, UNLOCK::Register>),
        (0x44 => @END),
    },

    pub SysCtlBootRegisters {
        /// Master Unlock Register
        (0x00 => pub master_unlock: ReadWrite<u32, UNLOCK::Register>),
        /// Boot Override Request Registers
        (0x04 => pub bootover_req: [ReadWrite<u32>; 2]),
        /// Boot Override Acknowledge Register
        (0x0C => pub bootover_ack: ReadWrite<u32>),
        /// Reset Request Register
        (0x10 => pub reset_req: WriteOnly<u32, BOOT_RESET_REQ::Register>),
        /// Reset Status and Override Register
        (0x14 => pub reset_statover: ReadWrite<u32, RESET_STATOVER::Register>),
        (0x18 => _reserved0),
        /// System Status Register
        (0x20 => pub system_stat: ReadOnly<u32, SYSTEM_STAT::Register>),
        (0x24 => @END),
    }
}

register_bitfields![u32,
    pub REBOOT_CTL [
        /// Initiate a reboot
        REBOOT OFFSET(0) NUMBITS(1) [],
        /// Key, must be 0x69 for the reboot to happen
        WKEY OFFSET(8) NUMBITS(8) []
    ],
    pub NMI_CTLSTAT [
        /// CS interrupt routed to NMI
        CS_SRC OFFSET(0) NUMBITS(1) [],
        /// PSS interrupt routed to NMI
        PSS_SRC OFFSET(1) NUMBITS(1) [],
        /// PCM interrupt routed to NMI
        PCM_SRC OFFSET(2) NUMBITS(1) [],
        /// RSTn/NMI pin configured as NMI
        PIN_SRC OFFSET(3) NUMBITS(1) [],
        CS_FLG OFFSET(16) NUMBITS(1) [],
        PSS_FLG OFFSET(17) NUMBITS(1) [],
        PCM_FLG OFFSET(18) NUMBITS(1) [],
        PIN_FLG OFFSET(19) NUMBITS(1) []
    ],
    pub WDTRESET_CTL [
        /// WDT time-out causes a hard (1) or soft (0) reset
        TIMEOUT OFFSET(0) NUMBITS(1) [
            SoftReset = 0,
            HardReset = 1
        ],
        /// WDT password violation causes a hard (1) or soft (0) reset
        VIOLATION OFFSET(1) NUMBITS(1) [
            SoftReset = 0,
            HardReset = 1
        ]
    ],
    /// Freeze a peripheral while the CPU is halted by the debugger.
    pub PERIHALT_CTL [
        HALT_T16_0 OFFSET(0) NUMBITS(1) [],
        HALT_T16_1 OFFSET(1) NUMBITS(1) [],
        HALT_T16_2 OFFSET(2) NUMBITS(1) [],
        HALT_T16_3 OFFSET(3) NUMBITS(1) [],
        HALT_T32_0 OFFSET(4) NUMBITS(1) [],
        HALT_EUA0 OFFSET(5) NUMBITS(1) [],
        HALT_EUA1 OFFSET(6) NUMBITS(1) [],
        HALT_EUA2 OFFSET(7) NUMBITS(1) [],
        HALT_EUA3 OFFSET(8) NUMBITS(1) [],
        HALT_EUB0 OFFSET(9) NUMBITS(1) [],
        HALT_EUB1 OFFSET(10) NUMBITS(1) [],
        HALT_EUB2 OFFSET(11) NUMBITS(1) [],
        HALT_EUB3 OFFSET(12) NUMBITS(1) [],
        HALT_ADC OFFSET(13) NUMBITS(1) [],
        HALT_WDT OFFSET(14) NUMBITS(1) [],
        HALT_DMA OFFSET(15) NUMBITS(1) []
    ],
    pub SRAM_BANKEN [
        /// Bank n enable; enabling a bank also enables every lower bank
        BNK_EN OFFSET(0) NUMBITS(8) [],
        /// SRAM ready after a bank enable change
        SRAM_RDY OFFSET(16) NUMBITS(1) []
    ],
    pub SRAM_BANKRET [
        /// Bank n retention in LPM3 and LPM4; bank 0 is always retained
        BNK_RET OFFSET(0) NUMBITS(8) [],
        SRAM_RDY OFFSET(16) NUMBITS(1) []
    ],
    pub DIO_GLTFLT_CTL [
        /// Glitch filter enable on the digital I/O
        GLTCH_EN OFFSET(0) NUMBITS(1) []
    ],
    pub UNLOCK [
        UNLKEY OFFSET(0) NUMBITS(16) []
    ],
    pub BOOT_RESET_REQ [
        /// Power-on reset
        POR OFFSET(0) NUMBITS(1) [],
        /// Reboot reset
        REBOOT OFFSET(1) NUMBITS(1) [],
        WKEY OFFSET(8) NUMBITS(8) []
    ],
    pub RESET_STATOVER [
        SOFT OFFSET(0) NUMBITS(1) [],
        HARD OFFSET(1) NUMBITS(1) [],
        REBOOT OFFSET(2) NUMBITS(1) [],
        SOFT_OVER OFFSET(8) NUMBITS(1) [],
        HARD_OVER OFFSET(9) NUMBITS(1) [],
        RBT_OVER OFFSET(10) NUMBITS(1) []
    ],
    pub SYSTEM_STAT [
        /// Debug security active
        DBG_SEC_ACT OFFSET(3) NUMBITS(1) [],
        /// JTAG and SWD lockout active
        JTAG_SWD_LOCK_ACT OFFSET(4) NUMBITS(1) [],
        /// IP protection active
        IP_PROT_ACT OFFSET(5) NUMBITS(1) []
    ]
];

impl SysCtlRegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "SYSCTL");
        debug::write_register(
            writer,
            "NMI_CTLSTAT",
            offset_of!(SysCtlRegisters, nmi_ctlstat),
            self.nmi_ctlstat.get(),
        );
        debug::write_register(
            writer,
            "WDTRESET_CTL",
            offset_of!(SysCtlRegisters, wdtreset_ctl),
            self.wdtreset_ctl.get(),
        );
        debug::write_register(
            writer,
            "SRAM_BANKEN",
            offset_of!(SysCtlRegisters, sram_banken),
            self.sram_banken.get(),
        );
        debug::write_flag(writer, "NMI from CS", self.nmi_ctlstat.is_set(NMI_CTLSTAT::CS_FLG));
        debug::write_flag(writer, "NMI from PSS", self.nmi_ctlstat.is_set(NMI_CTLSTAT::PSS_FLG));
        debug::write_flag(writer, "NMI from PCM", self.nmi_ctlstat.is_set(NMI_CTLSTAT::PCM_FLG));
        debug::write_flag(writer, "NMI from pin", self.nmi_ctlstat.is_set(NMI_CTLSTAT::PIN_FLG));
    }
}

pub struct SysCtl {
    registers: StaticRef<SysCtlRegisters>,
    boot: StaticRef<SysCtlBootRegisters>,
}

impl SysCtl {
    pub const fn new(
        base: StaticRef<SysCtlRegisters>,
        boot: StaticRef<SysCtlBootRegisters>,
    ) -> SysCtl {
        SysCtl {
            registers: base,
            boot,
        }
    }

    pub fn registers(&self) -> &SysCtlRegisters {
        &self.registers
    }

    pub fn boot_registers(&self) -> &SysCtlBootRegisters {
        &self.boot
    }

    /// Reboot the device through the boot code. On hardware this does not
    /// return.
    pub fn reboot(&self) {
        self.registers
            .reboot_ctl
            .write(REBOOT_CTL::WKEY.val(REBOOT_KEY) + REBOOT_CTL::REBOOT::SET);
    }

    /// Choose which peripherals freeze while the CPU is halted by a debugger.
    /// Peripherals not named in `halted` keep running.
    pub fn halt_in_debug(&self, halted: FieldValue<u32, PERIHALT_CTL::Register>) {
        self.registers.perihalt_ctl.write(halted);
    }

    /// Number of powered SRAM banks.
    pub fn enabled_sram_banks(&self) -> u32 {
        self.registers.sram_banken.read(SRAM_BANKEN::BNK_EN).count_ones()
    }

    /// Size in bytes of one SRAM bank.
    pub fn sram_bank_size(&self) -> u32 {
        self.registers.sram_size.get() / SRAM_BANKS
    }

    pub fn flash_size(&self) -> u32 {
        self.registers.flash_size.get()
    }

    pub fn set_glitch_filter(&self, enabled: bool) {
        let value = if enabled {
            DIO_GLTFLT_CTL::GLTCH_EN::SET
        } else {
            DIO_GLTFLT_CTL::GLTCH_EN::CLEAR
        };
        self.registers.dio_gltflt_ctl.modify(value);
    }

    /// Let the debugger read the IP protected secure zone.
    pub fn unlock_secure_data(&self) {
        self.registers
            .secdata_unlock
            .write(UNLOCK::UNLKEY.val(SECDATA_UNLOCK_KEY));
    }

    /// Open the boot block registers for writing.
    pub fn master_unlock(&self) {
        self.boot
            .master_unlock
            .write(UNLOCK::UNLKEY.val(MASTER_UNLOCK_KEY));
    }

    pub fn jtag_locked(&self) -> bool {
        self.boot.system_stat.is_set(SYSTEM_STAT::JTAG_SWD_LOCK_ACT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, peek, poke};
    use std::string::String;

    fn sysctl() -> SysCtl {
        SysCtl::new(fake_block(), fake_block())
    }

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<SysCtlRegisters>(), 0x44);
        assert_eq!(offset_of!(SysCtlRegisters, flash_size), 0x20);
        assert_eq!(offset_of!(SysCtlRegisters, dio_gltflt_ctl), 0x30);
        assert_eq!(offset_of!(SysCtlRegisters, secdata_unlock), 0x40);
        assert_eq!(core::mem::size_of::<SysCtlBootRegisters>(), 0x24);
        assert_eq!(offset_of!(SysCtlBootRegisters, bootover_ack), 0x0C);
        assert_eq!(offset_of!(SysCtlBootRegisters, reset_statover), 0x14);
        assert_eq!(offset_of!(SysCtlBootRegisters, system_stat), 0x20);
        assert_eq!(SYSCTL_BASE.address(), 0xE004_3000);
        assert_eq!(SYSCTL_BOOT_BASE.address(), 0xE004_4000);
    }

    #[test]
    fn reboot_carries_the_key() {
        let sys = sysctl();
        sys.reboot();
        assert_eq!(peek::<_, u32>(&sys.registers().reboot_ctl), 0x6901);
    }

    #[test]
    fn halt_in_debug_replaces_the_set() {
        let sys = sysctl();
        sys.halt_in_debug(PERIHALT_CTL::HALT_WDT::SET + PERIHALT_CTL::HALT_T32_0::SET);
        assert_eq!(sys.registers().perihalt_ctl.get(), (1 << 14) | (1 << 4));
        sys.halt_in_debug(PERIHALT_CTL::HALT_DMA::SET);
        assert_eq!(sys.registers().perihalt_ctl.get(), 1 << 15);
    }

    #[test]
    fn sram_banks() {
        let sys = sysctl();
        poke(sys.registers, offset_of!(SysCtlRegisters, sram_size), 0x1_0000u32);
        sys.registers()
            .sram_banken
            .write(SRAM_BANKEN::BNK_EN.val(0x0F) + SRAM_BANKEN::SRAM_RDY::SET);
        assert_eq!(sys.enabled_sram_banks(), 4);
        assert_eq!(sys.sram_bank_size(), 0x2000);
    }

    #[test]
    fn keyed_unlocks() {
        let sys = sysctl();
        sys.unlock_secure_data();
        sys.master_unlock();
        assert_eq!(sys.registers().secdata_unlock.get(), 0x695A);
        assert_eq!(sys.boot_registers().master_unlock.get(), 0x695A);
    }

    #[test]
    fn glitch_filter_toggles() {
        let sys = sysctl();
        sys.set_glitch_filter(true);
        assert_eq!(sys.registers().dio_gltflt_ctl.get(), 1);
        sys.set_glitch_filter(false);
        assert_eq!(sys.registers().dio_gltflt_ctl.get(), 0);
    }

    #[test]
    fn jtag_lock_status() {
        let sys = sysctl();
        assert!(!sys.jtag_locked());
        poke(sys.boot, offset_of!(SysCtlBootRegisters, system_stat), 0x10u32);
        assert!(sys.jtag_locked());
    }

    #[test]
    fn state_dump_names_nmi_sources() {
        let regs = fake_block::<SysCtlRegisters>();
        regs.nmi_ctlstat.write(NMI_CTLSTAT::PIN_FLG::SET);
        let mut out = String::new();
        regs.print_state(&mut out);
        assert!(out.contains("NMI from pin"));
        assert!(!out.contains("NMI from CS"));
    }
}
