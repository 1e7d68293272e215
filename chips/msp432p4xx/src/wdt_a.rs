// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Watchdog Timer (WDT_A)

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::WDT_A_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadWrite};
use crate::StaticRef;

pub const WDT_A_BASE: StaticRef<WdtARegisters> =
    unsafe { StaticRef::new(WDT_A_BASE_ADDR as *const WdtARegisters) };

/// Every write access has to set this password in the upper 8 bit of the
/// register, otherwise the watchdog resets the whole system.
pub const WDT_A_CTL_PW: u16 = 0x5A;

register_structs! {
    pub WdtARegisters {
        (0x00 => _reserved0),
        /// Watchdog Timer Control Register
        (0x0C => pub ctl: ReadWrite<u16, CTL::Register>),
        (0x0E => @END),
    }
}

register_bitfields! [u16,
    pub CTL [
        /// Watchdog timer interval select
        WDTIS OFFSET(0) NUMBITS(3) [
            Clocks2G = 0,
            Clocks128M = 1,
            Clocks8192K = 2,
            Clocks512K = 3,
            Clocks32K = 4,
            Clocks8192 = 5,
            Clocks512 = 6,
            Clocks64 = 7
        ],
        /// Watchdog timer counter clear
        WDTCNTCL OFFSET(3) NUMBITS(1) [],
        /// Watchdog timer mode select
        WDTTMSEL OFFSET(4) NUMBITS(1) [
            Watchdog = 0,
            IntervalTimer = 1
        ],
        /// Watchdog timer clock source select
        WDTSSEL OFFSET(5) NUMBITS(2) [
            SMCLK = 0,
            ACLK = 1,
            VLOCLK = 2,
            BCLK = 3
        ],
        /// Watchdog timer hold
        WDTHOLD OFFSET(7) NUMBITS(1) [],
        /// Watchdog timer password, reads as 0x69
        WDTPW OFFSET(8) NUMBITS(8) []
    ]
];

/// Number of source clock cycles before the watchdog fires.
pub type Interval = CTL::WDTIS::Value;

/// Clock driving the watchdog counter.
pub type ClockSource = CTL::WDTSSEL::Value;

/// The interval's length in source clock cycles.
pub const fn cycles(interval: Interval) -> u32 {
    match interval {
        Interval::Clocks2G => 1 << 31,
        Interval::Clocks128M => 1 << 27,
        Interval::Clocks8192K => 1 << 23,
        Interval::Clocks512K => 1 << 19,
        Interval::Clocks32K => 1 << 15,
        Interval::Clocks8192 => 1 << 13,
        Interval::Clocks512 => 1 << 9,
        Interval::Clocks64 => 1 << 6,
    }
}

impl WdtARegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "WDT_A");
        debug::write_register(
            writer,
            "CTL",
            offset_of!(WdtARegisters, ctl),
            u32::from(self.ctl.get()),
        );
        debug::write_flag(writer, "held", self.ctl.is_set(CTL::WDTHOLD));
    }
}

pub struct Watchdog {
    registers: StaticRef<WdtARegisters>,
}

impl Watchdog {
    pub const fn new(base: StaticRef<WdtARegisters>) -> Watchdog {
        Watchdog { registers: base }
    }

    pub fn registers(&self) -> &WdtARegisters {
        &self.registers
    }

    /// Stop the counter. Boards do this first thing after reset.
    pub fn hold(&self) {
        self.registers
            .ctl
            .modify(CTL::WDTPW.val(WDT_A_CTL_PW) + CTL::WDTHOLD::SET);
    }

    /// Restart the counter in watchdog mode with the given timeout.
    pub fn start(&self, interval: Interval, clock: ClockSource) {
        self.registers.ctl.write(
            CTL::WDTPW.val(WDT_A_CTL_PW)
                + CTL::WDTHOLD::CLEAR
                + CTL::WDTTMSEL::Watchdog
                + CTL::WDTCNTCL::SET
                + CTL::WDTSSEL.val(clock as u16)
                + CTL::WDTIS.val(interval as u16),
        );
    }

    /// Reset the counter before it expires.
    pub fn tickle(&self) {
        self.registers
            .ctl
            .modify(CTL::WDTPW.val(WDT_A_CTL_PW) + CTL::WDTCNTCL::SET);
    }

    pub fn is_held(&self) -> bool {
        self.registers.ctl.is_set(CTL::WDTHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_block;
    use std::string::String;

    #[test]
    fn control_register_offset() {
        assert_eq!(offset_of!(WdtARegisters, ctl), 0x0C);
        assert_eq!(core::mem::size_of::<WdtARegisters>(), 0x0E);
        assert_eq!(WDT_A_BASE.address(), 0x4000_4800);
    }

    #[test]
    fn hold_writes_password() {
        let wdt = Watchdog::new(fake_block::<WdtARegisters>());
        wdt.hold();
        assert_eq!(wdt.registers().ctl.get(), 0x5A80);
        assert!(wdt.is_held());
    }

    #[test]
    fn start_releases_and_clears() {
        let wdt = Watchdog::new(fake_block::<WdtARegisters>());
        wdt.hold();
        wdt.start(Interval::Clocks32K, ClockSource::ACLK);
        assert!(!wdt.is_held());
        assert_eq!(wdt.registers().ctl.get(), 0x5A00 | 0x20 | 0x08 | 0x04);
    }

    #[test]
    fn tickle_keeps_configuration() {
        let wdt = Watchdog::new(fake_block::<WdtARegisters>());
        wdt.start(Interval::Clocks512, ClockSource::VLOCLK);
        wdt.registers().ctl.modify(CTL::WDTCNTCL::CLEAR);
        wdt.tickle();
        let ctl = wdt.registers().ctl.extract();
        assert!(ctl.is_set(CTL::WDTCNTCL));
        assert_eq!(ctl.read(CTL::WDTIS), 6);
        assert_eq!(ctl.read(CTL::WDTSSEL), 2);
        assert_eq!(ctl.read(CTL::WDTPW), WDT_A_CTL_PW);
    }

    #[test]
    fn interval_lengths() {
        assert_eq!(cycles(Interval::Clocks2G), 2_147_483_648);
        assert_eq!(cycles(Interval::Clocks64), 64);
        assert_eq!(cycles(Interval::Clocks8192), 8192);
    }

    #[test]
    fn state_dump_reports_hold() {
        let regs = fake_block::<WdtARegisters>();
        regs.ctl.set(0x6980);
        let mut out = String::new();
        regs.print_state(&mut out);
        assert!(out.contains("CTL                [+0x00C] 0x00006980"));
        assert!(out.contains("held"));
    }
}
