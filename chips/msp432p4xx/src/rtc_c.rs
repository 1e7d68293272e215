// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Real-Time Clock (RTC_C)
//!
//! CTL0 and CTL13 are write-protected by the key in the upper byte of CTL0.
//! The key byte always reads back as [`RTC_C_KEY_LOCKED`], so lock state
//! cannot be read back from it.

use crate::memory_map::RTC_C_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use crate::{ErrorCode, StaticRef};

pub const RTC_C_BASE: StaticRef<RtcCRegisters> =
    unsafe { StaticRef::new(RTC_C_BASE_ADDR as *const RtcCRegisters) };

pub const RTC_C_KEY: u16 = 0xA5;
pub const RTC_C_KEY_LOCKED: u16 = 0x96;

register_structs! {
    pub RtcCRegisters {
        (0x00 => pub ctl0: ReadWrite<u16, CTL0::Register>),
        (0x02 => pub ctl13: ReadWrite<u16, CTL13::Register>),
        /// Crystal offset calibration
        (0x04 => pub ocal: ReadWrite<u16, OCAL::Register>),
        /// Temperature compensation
        (0x06 => pub tcmp: ReadWrite<u16, TCMP::Register>),
        (0x08 => pub ps0ctl: ReadWrite<u16, PSCTL::Register>),
        (0x0A => pub ps1ctl: ReadWrite<u16, PSCTL::Register>),
        /// Prescale timer counters
        (0x0C => pub ps: ReadWrite<u16, PS::Register>),
        (0x0E => pub iv: ReadOnly<u16>),
        (0x10 => pub tim0: ReadWrite<u16, TIM0::Register>),
        (0x12 => pub tim1: ReadWrite<u16, TIM1::Register>),
        (0x14 => pub date: ReadWrite<u16, DATE::Register>),
        (0x16 => pub year: ReadWrite<u16, YEAR::Register>),
        /// Minute and hour alarm
        (0x18 => pub aminhr: ReadWrite<u16, AMINHR::Register>),
        /// Day-of-week and day-of-month alarm
        (0x1A => pub adowday: ReadWrite<u16, ADOWDAY::Register>),
        /// Binary-to-BCD conversion
        (0x1C => pub bin2bcd: ReadWrite<u16>),
        /// BCD-to-binary conversion
        (0x1E => pub bcd2bin: ReadWrite<u16>),
        (0x20 => @END),
    }
}

register_bitfields![u16,
    pub CTL0 [
        RTCRDYIFG OFFSET(0) NUMBITS(1) [],
        RTCAIFG OFFSET(1) NUMBITS(1) [],
        RTCTEVIFG OFFSET(2) NUMBITS(1) [],
        RTCOFIFG OFFSET(3) NUMBITS(1) [],
        RTCRDYIE OFFSET(4) NUMBITS(1) [],
        RTCAIE OFFSET(5) NUMBITS(1) [],
        RTCTEVIE OFFSET(6) NUMBITS(1) [],
        RTCOFIE OFFSET(7) NUMBITS(1) [],
        RTCKEY OFFSET(8) NUMBITS(8) []
    ],
    pub CTL13 [
        /// Time event
        RTCTEV OFFSET(0) NUMBITS(2) [
            MinuteChange = 0,
            HourChange = 1,
            Midnight = 2,
            Noon = 3
        ],
        RTCSSEL OFFSET(2) NUMBITS(2) [],
        /// Time registers are safe to read
        RTCRDY OFFSET(4) NUMBITS(1) [],
        /// Calendar mode, always set
        RTCMODE OFFSET(5) NUMBITS(1) [],
        RTCHOLD OFFSET(6) NUMBITS(1) [],
        /// BCD instead of binary
        RTCBCD OFFSET(7) NUMBITS(1) [],
        /// Calibration frequency on RTCCLK
        CALF OFFSET(8) NUMBITS(2) [
            None = 0,
            Hz512 = 1,
            Hz256 = 2,
            Hz1 = 3
        ]
    ],
    pub OCAL [
        RTCOCAL OFFSET(0) NUMBITS(8) [],
        /// Up calibration
        RTCOCALS OFFSET(15) NUMBITS(1) []
    ],
    pub TCMP [
        RTCTCMP OFFSET(0) NUMBITS(8) [],
        RTCTCOK OFFSET(13) NUMBITS(1) [],
        RTCTCRDY OFFSET(14) NUMBITS(1) [],
        RTCTCMPS OFFSET(15) NUMBITS(1) []
    ],
    pub PSCTL [
        RTPSIFG OFFSET(0) NUMBITS(1) [],
        RTPSIE OFFSET(1) NUMBITS(1) [],
        /// Interrupt interval, divide by 2^(n+1)
        RTIP OFFSET(2) NUMBITS(3) []
    ],
    pub PS [
        RT0PS OFFSET(0) NUMBITS(8) [],
        RT1PS OFFSET(8) NUMBITS(8) []
    ],
    pub TIM0 [
        SECONDS OFFSET(0) NUMBITS(6) [],
        MINUTES OFFSET(8) NUMBITS(6) []
    ],
    pub TIM1 [
        HOURS OFFSET(0) NUMBITS(5) [],
        DAY_OF_WEEK OFFSET(8) NUMBITS(3) []
    ],
    pub DATE [
        DAY OFFSET(0) NUMBITS(5) [],
        MONTH OFFSET(8) NUMBITS(4) []
    ],
    pub YEAR [
        YEAR OFFSET(0) NUMBITS(12) []
    ],
    pub AMINHR [
        MINUTES OFFSET(0) NUMBITS(6) [],
        MINAE OFFSET(7) NUMBITS(1) [],
        HOURS OFFSET(8) NUMBITS(5) [],
        HOURAE OFFSET(15) NUMBITS(1) []
    ],
    pub ADOWDAY [
        DAY_OF_WEEK OFFSET(0) NUMBITS(3) [],
        DOWAE OFFSET(7) NUMBITS(1) [],
        DAY_OF_MONTH OFFSET(8) NUMBITS(5) [],
        DAYAE OFFSET(15) NUMBITS(1) []
    ]
];

/// BCD conversion for values the RTC keeps in BCD mode.
pub mod bcd {
    use crate::ErrorCode;

    pub const fn to_bcd(value: u8) -> Result<u8, ErrorCode> {
        if value > 99 {
            return Err(ErrorCode::INVAL);
        }
        Ok(((value / 10) << 4) | (value % 10))
    }

    pub const fn from_bcd(value: u8) -> Result<u8, ErrorCode> {
        let (tens, ones) = (value >> 4, value & 0x0F);
        if tens > 9 || ones > 9 {
            return Err(ErrorCode::INVAL);
        }
        Ok(tens * 10 + ones)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptVector {
    None,
    OscillatorFault,
    Ready,
    TimeEvent,
    Alarm,
    Prescaler0,
    Prescaler1,
}

impl InterruptVector {
    pub const fn decode(iv: u16) -> Option<InterruptVector> {
        Some(match iv {
            0x00 => InterruptVector::None,
            0x02 => InterruptVector::OscillatorFault,
            0x04 => InterruptVector::Ready,
            0x06 => InterruptVector::TimeEvent,
            0x08 => InterruptVector::Alarm,
            0x0A => InterruptVector::Prescaler0,
            0x0C => InterruptVector::Prescaler1,
            _ => return None,
        })
    }
}

/// Calendar time in binary. `day_of_week` runs 0 to 6, `month` and `day`
/// count from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Calendar {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub day_of_week: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl Calendar {
    pub const fn validate(&self) -> Result<(), ErrorCode> {
        if self.year > 4095
            || !matches!(self.month, 1..=12)
            || self.day == 0
            || self.day > days_in_month(self.year, self.month)
            || self.day_of_week > 6
            || self.hour > 23
            || self.minute > 59
            || self.second > 59
        {
            return Err(ErrorCode::INVAL);
        }
        Ok(())
    }
}

pub struct Rtc {
    registers: StaticRef<RtcCRegisters>,
}

impl Rtc {
    pub const fn new(base: StaticRef<RtcCRegisters>) -> Rtc {
        Rtc { registers: base }
    }

    pub fn registers(&self) -> &RtcCRegisters {
        &self.registers
    }

    pub fn unlock(&self) {
        self.registers.ctl0.modify(CTL0::RTCKEY.val(RTC_C_KEY));
    }

    pub fn lock(&self) {
        self.registers.ctl0.modify(CTL0::RTCKEY.val(0));
    }

    pub fn is_holding(&self) -> bool {
        self.registers.ctl13.is_set(CTL13::RTCHOLD)
    }

    /// Read the calendar. The clock must be in binary mode, and the time
    /// registers are only consistent while RTCRDY is set.
    pub fn read_calendar(&self) -> Result<Calendar, ErrorCode> {
        let ctl13 = self.registers.ctl13.extract();
        if ctl13.is_set(CTL13::RTCBCD) {
            return Err(ErrorCode::NOSUPPORT);
        }
        if !ctl13.is_set(CTL13::RTCRDY) {
            return Err(ErrorCode::BUSY);
        }
        let tim0 = self.registers.tim0.extract();
        let tim1 = self.registers.tim1.extract();
        let date = self.registers.date.extract();
        Ok(Calendar {
            year: self.registers.year.read(YEAR::YEAR),
            month: date.read(DATE::MONTH) as u8,
            day: date.read(DATE::DAY) as u8,
            day_of_week: tim1.read(TIM1::DAY_OF_WEEK) as u8,
            hour: tim1.read(TIM1::HOURS) as u8,
            minute: tim0.read(TIM0::MINUTES) as u8,
            second: tim0.read(TIM0::SECONDS) as u8,
        })
    }

    /// Stop the clock, load `calendar` in binary mode, and restart it.
    pub fn set_calendar(&self, calendar: &Calendar) -> Result<(), ErrorCode> {
        calendar.validate()?;
        self.unlock();
        self.registers
            .ctl13
            .modify(CTL13::RTCHOLD::SET + CTL13::RTCBCD::CLEAR);
        self.registers.tim0.write(
            TIM0::SECONDS.val(calendar.second.into()) + TIM0::MINUTES.val(calendar.minute.into()),
        );
        self.registers.tim1.write(
            TIM1::HOURS.val(calendar.hour.into())
                + TIM1::DAY_OF_WEEK.val(calendar.day_of_week.into()),
        );
        self.registers
            .date
            .write(DATE::DAY.val(calendar.day.into()) + DATE::MONTH.val(calendar.month.into()));
        self.registers.year.write(YEAR::YEAR.val(calendar.year));
        self.registers.ctl13.modify(CTL13::RTCHOLD::CLEAR);
        self.lock();
        Ok(())
    }

    /// Alarm at `hour`:`minute`. The alarm fires when every enabled field
    /// matches.
    pub fn set_alarm(&self, hour: Option<u8>, minute: Option<u8>) -> Result<(), ErrorCode> {
        if hour.is_some_and(|h| h > 23) || minute.is_some_and(|m| m > 59) {
            return Err(ErrorCode::INVAL);
        }
        self.registers.aminhr.write(
            AMINHR::HOURS.val(hour.unwrap_or(0).into())
                + AMINHR::HOURAE.val(hour.is_some().into())
                + AMINHR::MINUTES.val(minute.unwrap_or(0).into())
                + AMINHR::MINAE.val(minute.is_some().into()),
        );
        Ok(())
    }

    pub fn pending_interrupt(&self) -> Option<InterruptVector> {
        InterruptVector::decode(self.registers.iv.get())
    }
}
