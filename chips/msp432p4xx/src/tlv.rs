// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Device descriptor table (TLV)
//!
//! Factory-programmed information memory holding calibration constants and
//! device identification. The table starts with a checksum word followed by
//! records of the form `tag, length, data[length]`, with lengths counted in
//! words. A [`TLV_TAG_END`] tag terminates the table.
//!
//! ```rust,ignore
//! let tlv = unsafe { msp432p4xx::tlv::Tlv::device() };
//! let info = tlv.device_info()?;
//! ```

use crate::memory_map::TLV_BASE;
use crate::ErrorCode;

/// Bytes reserved for the table in information memory.
pub const TLV_SIZE: usize = 0x1000;

pub const TLV_TAG_RESERVED1: u32 = 1;
pub const TLV_TAG_RESERVED2: u32 = 2;
pub const TLV_TAG_CS: u32 = 3;
pub const TLV_TAG_FLASHCTL: u32 = 4;
pub const TLV_TAG_ADC14: u32 = 5;
pub const TLV_TAG_RESERVED6: u32 = 6;
pub const TLV_TAG_RESERVED7: u32 = 7;
pub const TLV_TAG_REF: u32 = 8;
pub const TLV_TAG_RESERVED9: u32 = 9;
pub const TLV_TAG_RESERVED10: u32 = 10;
pub const TLV_TAG_DEVINFO: u32 = 11;
pub const TLV_TAG_DIEREC: u32 = 12;
pub const TLV_TAG_RANDNUM: u32 = 13;
pub const TLV_TAG_RESERVED14: u32 = 14;
pub const TLV_TAG_BSL: u32 = 15;
pub const TLV_TAG_END: u32 = 0x0BD0_E11D;

/// One record of the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlvEntry<'a> {
    pub tag: u32,
    pub data: &'a [u32],
}

/// Walks the records that follow the checksum word.
///
/// Iteration ends at the end tag or when the slice runs out. A record whose
/// length points past the slice yields `Err(SIZE)` once and ends iteration.
pub struct TlvIter<'a> {
    words: &'a [u32],
}

impl<'a> TlvIter<'a> {
    pub const fn new(records: &'a [u32]) -> TlvIter<'a> {
        TlvIter { words: records }
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = Result<TlvEntry<'a>, ErrorCode>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&tag, rest) = self.words.split_first()?;
        if tag == TLV_TAG_END {
            self.words = &[];
            return None;
        }
        let Some((&len, rest)) = rest.split_first() else {
            self.words = &[];
            return Some(Err(ErrorCode::SIZE));
        };
        let len = len as usize;
        if len > rest.len() {
            self.words = &[];
            return Some(Err(ErrorCode::SIZE));
        }
        let (data, rest) = rest.split_at(len);
        self.words = rest;
        Some(Ok(TlvEntry { tag, data }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_id: u32,
    pub hardware_revision: u32,
    pub boot_code_revision: u32,
    pub rom_driver_library_revision: u32,
}

/// Wafer position and lot of the die.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DieRecord {
    pub x_position: u32,
    pub y_position: u32,
    pub wafer_id: u32,
    pub lot_id: u32,
    pub test_results: u32,
}

/// Pulse limits the flash controller must be programmed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashInfo {
    pub max_program_pulses: u32,
    pub max_erase_pulses: u32,
}

/// 128-bit per-device random number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomNumber(pub [u32; 4]);

fn words<const N: usize>(entry: &TlvEntry) -> Result<[u32; N], ErrorCode> {
    entry
        .data
        .get(..N)
        .and_then(|data| data.try_into().ok())
        .ok_or(ErrorCode::SIZE)
}

impl DeviceInfo {
    pub fn decode(entry: &TlvEntry) -> Result<DeviceInfo, ErrorCode> {
        let [device_id, hardware_revision, boot_code_revision, rom_driver_library_revision] =
            words::<4>(entry)?;
        Ok(DeviceInfo {
            device_id,
            hardware_revision,
            boot_code_revision,
            rom_driver_library_revision,
        })
    }
}

impl DieRecord {
    pub fn decode(entry: &TlvEntry) -> Result<DieRecord, ErrorCode> {
        let [x_position, y_position, wafer_id, lot_id, _, _, _, test_results] =
            words::<8>(entry)?;
        Ok(DieRecord {
            x_position,
            y_position,
            wafer_id,
            lot_id,
            test_results,
        })
    }
}

impl FlashInfo {
    pub fn decode(entry: &TlvEntry) -> Result<FlashInfo, ErrorCode> {
        let [max_program_pulses, max_erase_pulses] = words::<2>(entry)?;
        Ok(FlashInfo {
            max_program_pulses,
            max_erase_pulses,
        })
    }
}

impl RandomNumber {
    pub fn decode(entry: &TlvEntry) -> Result<RandomNumber, ErrorCode> {
        words::<4>(entry).map(RandomNumber)
    }
}

/// A device descriptor table held in `words`, checksum word first.
#[derive(Clone, Copy)]
pub struct Tlv<'a> {
    words: &'a [u32],
}

impl<'a> Tlv<'a> {
    pub const fn new(words: &'a [u32]) -> Tlv<'a> {
        Tlv { words }
    }

    /// The table programmed into information memory.
    ///
    /// ## Safety
    ///
    /// Only valid on the device, where the table is mapped at `TLV_BASE`.
    pub unsafe fn device() -> Tlv<'static> {
        Tlv::new(unsafe { core::slice::from_raw_parts(TLV_BASE as *const u32, TLV_SIZE / 4) })
    }

    pub fn checksum(&self) -> Option<u32> {
        self.words.first().copied()
    }

    pub fn entries(&self) -> TlvIter<'a> {
        TlvIter::new(self.words.get(1..).unwrap_or(&[]))
    }

    /// First record carrying `tag`. `FAIL` if no record has it.
    pub fn find(&self, tag: u32) -> Result<TlvEntry<'a>, ErrorCode> {
        for entry in self.entries() {
            let entry = entry?;
            if entry.tag == tag {
                return Ok(entry);
            }
        }
        Err(ErrorCode::FAIL)
    }

    pub fn device_info(&self) -> Result<DeviceInfo, ErrorCode> {
        DeviceInfo::decode(&self.find(TLV_TAG_DEVINFO)?)
    }

    pub fn die_record(&self) -> Result<DieRecord, ErrorCode> {
        DieRecord::decode(&self.find(TLV_TAG_DIEREC)?)
    }

    pub fn flash_info(&self) -> Result<FlashInfo, ErrorCode> {
        FlashInfo::decode(&self.find(TLV_TAG_FLASHCTL)?)
    }

    pub fn random_number(&self) -> Result<RandomNumber, ErrorCode> {
        RandomNumber::decode(&self.find(TLV_TAG_RANDNUM)?)
    }
}
