// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Timer (TIMER_Ax)

use crate::debug;
use crate::memory_map::{
    TIMER_A0_BASE_ADDR, TIMER_A1_BASE_ADDR, TIMER_A2_BASE_ADDR, TIMER_A3_BASE_ADDR,
};
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use crate::{ErrorCode, StaticRef};
use core::fmt::Write;
use core::mem::offset_of;

pub const TIMER_A0_BASE: StaticRef<TimerARegisters> =
    unsafe { StaticRef::new(TIMER_A0_BASE_ADDR as *const TimerARegisters) };
pub const TIMER_A1_BASE: StaticRef<TimerARegisters> =
    unsafe { StaticRef::new(TIMER_A1_BASE_ADDR as *const TimerARegisters) };
pub const TIMER_A2_BASE: StaticRef<TimerARegisters> =
    unsafe { StaticRef::new(TIMER_A2_BASE_ADDR as *const TimerARegisters) };
pub const TIMER_A3_BASE: StaticRef<TimerARegisters> =
    unsafe { StaticRef::new(TIMER_A3_BASE_ADDR as *const TimerARegisters) };

/// Capture/compare blocks per timer.
pub const CAPTURE_COMPARE_CHANNELS: usize = 5;

register_structs! {
    /// Timer_Ax
    pub TimerARegisters {
        /// Timer_Ax Control
        (0x00 => pub ctl: ReadWrite<u16, CTL::Register>),
        /// Timer_Ax Capture/Compare Control 0-4
        (0x02 => pub cctl: [ReadWrite<u16, CCTL::Register>; CAPTURE_COMPARE_CHANNELS]),
        (0x0C => _reserved0),
        /// Timer_Ax Counter
        (0x10 => pub r: ReadWrite<u16>),
        /// Timer_Ax Capture/Compare 0-4
        (0x12 => pub ccr: [ReadWrite<u16>; CAPTURE_COMPARE_CHANNELS]),
        (0x1C => _reserved1),
        /// Timer_Ax Expansion 0
        (0x20 => pub ex0: ReadWrite<u16, EX0::Register>),
        (0x22 => _reserved2),
        /// Timer_Ax Interrupt Vector
        (0x2E => pub iv: ReadOnly<u16>),
        (0x30 => @END),
    }
}

register_bitfields![u16,
    /// Timer_Ax Control Register
    pub CTL [
        /// Timer_A interrupt flag
        TAIFG OFFSET(0) NUMBITS(1) [],
        /// Timer_A interrupt enable
        TAIE OFFSET(1) NUMBITS(1) [],
        /// Resets TAxR, the clock divider logic and the count direction
        TACLR OFFSET(2) NUMBITS(1) [],
        /// Mode control
        MC OFFSET(4) NUMBITS(2) [
            /// Timer is halted
            StopMode = 0,
            /// Counts up to TAxCCR0
            UpMode = 1,
            /// Counts up to 0xFFFF
            ContinuousMode = 2,
            /// Counts up to TAxCCR0 then down to 0x0000
            UpDownMode = 3
        ],
        /// Input divider, combined with TAIDEX
        ID OFFSET(6) NUMBITS(2) [
            DividedBy1 = 0,
            DividedBy2 = 1,
            DividedBy4 = 2,
            DividedBy8 = 3
        ],
        /// Timer_A clock source select
        TASSEL OFFSET(8) NUMBITS(2) [
            TAxCLK = 0,
            ACLK = 1,
            SMCLK = 2,
            INCLK = 3
        ]
    ],
    /// Timer_Ax Capture/Compare Control Register
    pub CCTL [
        /// Capture/compare interrupt flag
        CCIFG OFFSET(0) NUMBITS(1) [],
        /// Capture overflow, reset by software
        COV OFFSET(1) NUMBITS(1) [],
        /// Output level for output mode 0
        OUT OFFSET(2) NUMBITS(1) [],
        /// Capture/compare input
        CCI OFFSET(3) NUMBITS(1) [],
        /// Capture/compare interrupt enable
        CCIE OFFSET(4) NUMBITS(1) [],
        /// Output mode. Modes 2, 3, 6 and 7 are not useful for TAxCCR0
        OUTMOD OFFSET(5) NUMBITS(3) [
            OutBit = 0,
            Set = 1,
            ToggleReset = 2,
            SetReset = 3,
            Toggle = 4,
            Reset = 5,
            ToggleSet = 6,
            ResetSet = 7
        ],
        /// Capture mode
        CAP OFFSET(8) NUMBITS(1) [],
        /// Synchronized capture/compare input
        SCCI OFFSET(10) NUMBITS(1) [],
        /// Synchronize capture source
        SCS OFFSET(11) NUMBITS(1) [
            Asynchronous = 0,
            Synchronous = 1
        ],
        /// Capture/compare input select
        CCIS OFFSET(12) NUMBITS(2) [
            CCIxA = 0,
            CCIxB = 1,
            GND = 2,
            VCC = 3
        ],
        /// Capture mode
        CM OFFSET(14) NUMBITS(2) [
            NoCapture = 0,
            CaptureRisingEdge = 1,
            CaptureFallingEdge = 2,
            CaptureBothEdges = 3
        ]
    ],
    /// Timer_Ax Expansion 0 Register
    pub EX0 [
        /// Input divider expansion, divide by TAIDEX + 1
        TAIDEX OFFSET(0) NUMBITS(3) []
    ]
];

pub type Mode = CTL::MC::Value;
pub type ClockSource = CTL::TASSEL::Value;

/// Effective input clock divider for the ID and TAIDEX field values.
pub const fn input_divider(id: u16, idex: u16) -> u16 {
    (1 << (id & 0x3)) * ((idex & 0x7) + 1)
}

/// ID and TAIDEX values that divide the input clock by `divider`.
pub const fn divider_settings(divider: u16) -> Result<(u16, u16), ErrorCode> {
    let mut id = 0;
    while id < 4 {
        let step = 1 << id;
        if divider % step == 0 && matches!(divider / step, 1..=8) {
            return Ok((id, divider / step - 1));
        }
        id += 1;
    }
    Err(ErrorCode::INVAL)
}

/// Decoded TAxIV. CCR0 has its own interrupt line and never shows up here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptVector {
    None,
    CaptureCompare(u8),
    Overflow,
}

impl InterruptVector {
    pub const fn decode(iv: u16) -> Option<InterruptVector> {
        match iv {
            0x00 => Some(InterruptVector::None),
            0x02 | 0x04 | 0x06 | 0x08 => Some(InterruptVector::CaptureCompare((iv / 2) as u8)),
            0x0E => Some(InterruptVector::Overflow),
            _ => None,
        }
    }
}

impl TimerARegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "TIMER_A");
        debug::write_register(
            writer,
            "CTL",
            offset_of!(TimerARegisters, ctl),
            u32::from(self.ctl.get()),
        );
        debug::write_register(
            writer,
            "R",
            offset_of!(TimerARegisters, r),
            u32::from(self.r.get()),
        );
        debug::write_register(
            writer,
            "EX0",
            offset_of!(TimerARegisters, ex0),
            u32::from(self.ex0.get()),
        );
        debug::write_flag(writer, "overflow", self.ctl.is_set(CTL::TAIFG));
    }
}

pub struct TimerA {
    registers: StaticRef<TimerARegisters>,
}

impl TimerA {
    pub const fn new(base: StaticRef<TimerARegisters>) -> TimerA {
        TimerA { registers: base }
    }

    pub fn registers(&self) -> &TimerARegisters {
        &self.registers
    }

    /// Stop the timer, select its clock and divider, and clear the counter.
    pub fn configure(&self, source: ClockSource, divider: u16) -> Result<(), ErrorCode> {
        let (id, idex) = divider_settings(divider)?;
        self.registers.ctl.write(
            CTL::MC::StopMode
                + CTL::TASSEL.val(source as u16)
                + CTL::ID.val(id)
                + CTL::TACLR::SET,
        );
        self.registers.ex0.write(EX0::TAIDEX.val(idex));
        Ok(())
    }

    pub fn divider(&self) -> u16 {
        input_divider(
            self.registers.ctl.read(CTL::ID),
            self.registers.ex0.read(EX0::TAIDEX),
        )
    }

    pub fn start(&self, mode: Mode) {
        self.registers.ctl.modify(CTL::MC.val(mode as u16));
    }

    pub fn stop(&self) {
        self.registers.ctl.modify(CTL::MC::StopMode);
    }

    pub fn mode(&self) -> Option<Mode> {
        self.registers.ctl.read_as_enum(CTL::MC)
    }

    pub fn counter(&self) -> u16 {
        self.registers.r.get()
    }

    /// Load a compare value and enable its interrupt.
    pub fn set_compare(&self, channel: usize, value: u16) -> Result<(), ErrorCode> {
        let cctl = self.registers.cctl.get(channel).ok_or(ErrorCode::INVAL)?;
        self.registers.ccr[channel].set(value);
        cctl.modify(CCTL::CAP::CLEAR + CCTL::CCIFG::CLEAR + CCTL::CCIE::SET);
        Ok(())
    }

    pub fn pending_interrupt(&self) -> Option<InterruptVector> {
        InterruptVector::decode(self.registers.iv.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, poke};
    use std::string::String;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<TimerARegisters>(), 0x30);
        assert_eq!(offset_of!(TimerARegisters, cctl), 0x02);
        assert_eq!(offset_of!(TimerARegisters, r), 0x10);
        assert_eq!(offset_of!(TimerARegisters, ccr), 0x12);
        assert_eq!(offset_of!(TimerARegisters, ex0), 0x20);
        assert_eq!(offset_of!(TimerARegisters, iv), 0x2E);
        assert_eq!(TIMER_A3_BASE.address(), 0x4000_0C00);
    }

    #[test]
    fn divider_range() {
        assert_eq!(input_divider(0, 0), 1);
        assert_eq!(input_divider(3, 7), 64);
        assert_eq!(input_divider(1, 2), 6);
        assert_eq!(divider_settings(1), Ok((0, 0)));
        assert_eq!(divider_settings(64), Ok((3, 7)));
        assert_eq!(divider_settings(12), Ok((1, 5)));
        assert_eq!(divider_settings(0), Err(ErrorCode::INVAL));
        assert_eq!(divider_settings(9), Err(ErrorCode::INVAL));
        assert_eq!(divider_settings(128), Err(ErrorCode::INVAL));
    }

    #[test]
    fn every_setting_round_trips() {
        for divider in 1..=64 {
            if let Ok((id, idex)) = divider_settings(divider) {
                assert_eq!(input_divider(id, idex), divider);
            }
        }
    }

    #[test]
    fn interrupt_vector() {
        assert_eq!(InterruptVector::decode(0), Some(InterruptVector::None));
        assert_eq!(
            InterruptVector::decode(0x06),
            Some(InterruptVector::CaptureCompare(3))
        );
        assert_eq!(InterruptVector::decode(0x0E), Some(InterruptVector::Overflow));
        assert_eq!(InterruptVector::decode(0x0A), None);
    }

    #[test]
    fn configure_and_run() {
        let timer = TimerA::new(fake_block());
        assert_eq!(timer.configure(ClockSource::SMCLK, 24), Ok(()));
        assert_eq!(timer.registers().ctl.get(), 0x0284);
        assert_eq!(timer.registers().ex0.get(), 5);
        assert_eq!(timer.divider(), 24);
        assert_eq!(timer.mode(), Some(Mode::StopMode));
        timer.start(Mode::UpMode);
        assert_eq!(timer.mode(), Some(Mode::UpMode));
        timer.stop();
        assert_eq!(timer.mode(), Some(Mode::StopMode));
        assert_eq!(timer.configure(ClockSource::ACLK, 9), Err(ErrorCode::INVAL));
    }

    #[test]
    fn compare_channels() {
        let timer = TimerA::new(fake_block());
        assert_eq!(timer.set_compare(4, 1000), Ok(()));
        assert_eq!(timer.registers().ccr[4].get(), 1000);
        assert!(timer.registers().cctl[4].is_set(CCTL::CCIE));
        assert_eq!(timer.set_compare(5, 1), Err(ErrorCode::INVAL));
        poke(timer.registers, offset_of!(TimerARegisters, iv), 0x0008u16);
        assert_eq!(
            timer.pending_interrupt(),
            Some(InterruptVector::CaptureCompare(4))
        );
    }

    #[test]
    fn dump_shows_counter() {
        let timer = TimerA::new(fake_block());
        timer.registers().r.set(0x1234);
        let mut out = String::new();
        timer.registers().print_state(&mut out);
        assert!(out.contains("R                  [+0x010] 0x00001234"));
        assert!(!out.contains("overflow"));
    }
}
