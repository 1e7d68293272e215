// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! CRC32 module
//!
//! The engine computes CRC-32 (ISO-HDLC polynomial) and CRC-16-CCITT
//! checksums in parallel register sets. [`Crc32`] and [`Crc16`] are software
//! models of the same computations, used to check results and to verify data
//! such as the device descriptor without touching the peripheral.

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::CRC32_BASE_ADDR;
use crate::registers::interfaces::{Readable, Writeable};
use crate::registers::{register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::StaticRef;

pub const CRC32_BASE: StaticRef<Crc32Registers> =
    unsafe { StaticRef::new(CRC32_BASE_ADDR as *const Crc32Registers) };

/// Reflected form of the CRC-32 polynomial 0x04C1_1DB7.
pub const CRC32_POLY_REFLECTED: u32 = 0xEDB8_8320;
/// CRC-16-CCITT polynomial.
pub const CRC16_POLY: u16 = 0x1021;

register_structs! {
    pub Crc32Registers {
        /// Data Input for CRC32 Signature Computation
        (0x00 => pub di32: WriteOnly<u16>),
        (0x02 => _reserved0),
        /// Data In Reverse for CRC32 Computation
        (0x04 => pub dirb32: WriteOnly<u16>),
        (0x06 => _reserved1),
        /// CRC32 Initialization and Result, lower 16 bits
        (0x08 => pub inires32_lo: ReadWrite<u16>),
        /// CRC32 Initialization and Result, upper 16 bits
        (0x0A => pub inires32_hi: ReadWrite<u16>),
        /// CRC32 Result Reverse, lower 16 bits
        (0x0C => pub resr32_lo: ReadOnly<u16>),
        /// CRC32 Result Reverse, upper 16 bits
        (0x0E => pub resr32_hi: ReadOnly<u16>),
        /// Data Input for CRC16 Computation
        (0x10 => pub di16: WriteOnly<u16>),
        (0x12 => _reserved2),
        /// Data In Reverse for CRC16 Computation
        (0x14 => pub dirb16: WriteOnly<u16>),
        (0x16 => _reserved3),
        /// CRC16 Initialization and Result
        (0x18 => pub inires16: ReadWrite<u16>),
        (0x1A => _reserved4),
        /// CRC16 Result Reverse
        (0x1E => pub resr16: ReadOnly<u16>),
        (0x20 => @END),
    }
}

impl Crc32Registers {
    pub fn seed32(&self, seed: u32) {
        self.inires32_lo.set(seed as u16);
        self.inires32_hi.set((seed >> 16) as u16);
    }

    pub fn result32(&self) -> u32 {
        (u32::from(self.inires32_hi.get()) << 16) | u32::from(self.inires32_lo.get())
    }

    pub fn result32_reversed(&self) -> u32 {
        (u32::from(self.resr32_hi.get()) << 16) | u32::from(self.resr32_lo.get())
    }

    pub fn seed16(&self, seed: u16) {
        self.inires16.set(seed);
    }

    pub fn result16(&self) -> u16 {
        self.inires16.get()
    }

    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "CRC32");
        debug::write_register(
            writer,
            "INIRES32",
            offset_of!(Crc32Registers, inires32_lo),
            self.result32(),
        );
        debug::write_register(
            writer,
            "INIRES16",
            offset_of!(Crc32Registers, inires16),
            u32::from(self.result16()),
        );
    }
}

/// CRC-32/ISO-HDLC, bit-reflected, as used by Ethernet and zlib.
#[derive(Clone, Copy, Debug)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Start a computation from `seed`, usually `0xFFFF_FFFF`.
    pub const fn new(seed: u32) -> Crc32 {
        Crc32 { state: seed }
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (self.state & 1).wrapping_neg();
                self.state = (self.state >> 1) ^ (CRC32_POLY_REFLECTED & mask);
            }
        }
    }

    /// The register contents before the final inversion.
    pub const fn state(&self) -> u32 {
        self.state
    }

    pub const fn finish(&self) -> u32 {
        !self.state
    }

    pub fn checksum(data: &[u8]) -> u32 {
        let mut crc = Crc32::new(0xFFFF_FFFF);
        crc.update(data);
        crc.finish()
    }
}

/// CRC-16 with the CCITT polynomial, most significant bit first, no final
/// inversion.
#[derive(Clone, Copy, Debug)]
pub struct Crc16 {
    state: u16,
}

impl Crc16 {
    pub const fn new(seed: u16) -> Crc16 {
        Crc16 { state: seed }
    }

    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state ^= u16::from(byte) << 8;
            for _ in 0..8 {
                self.state = if self.state & 0x8000 != 0 {
                    (self.state << 1) ^ CRC16_POLY
                } else {
                    self.state << 1
                };
            }
        }
    }

    pub const fn finish(&self) -> u16 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, poke};
    use std::string::String;

    const CHECK: &[u8] = b"123456789";

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<Crc32Registers>(), 0x20);
        assert_eq!(offset_of!(Crc32Registers, dirb32), 0x04);
        assert_eq!(offset_of!(Crc32Registers, inires32_hi), 0x0A);
        assert_eq!(offset_of!(Crc32Registers, resr32_hi), 0x0E);
        assert_eq!(offset_of!(Crc32Registers, dirb16), 0x14);
        assert_eq!(offset_of!(Crc32Registers, inires16), 0x18);
        assert_eq!(offset_of!(Crc32Registers, resr16), 0x1E);
        assert_eq!(CRC32_BASE.address(), 0x4000_4000);
    }

    #[test]
    fn crc32_check_value() {
        assert_eq!(Crc32::checksum(CHECK), 0xCBF4_3926);
        assert_eq!(Crc32::checksum(&[]), 0);
    }

    #[test]
    fn crc32_streams() {
        let mut crc = Crc32::new(0xFFFF_FFFF);
        crc.update(&CHECK[..4]);
        crc.update(&CHECK[4..]);
        assert_eq!(crc.finish(), 0xCBF4_3926);
        assert_eq!(crc.state(), !0xCBF4_3926);
    }

    #[test]
    fn crc16_check_value() {
        let mut crc = Crc16::new(0xFFFF);
        crc.update(CHECK);
        assert_eq!(crc.finish(), 0x29B1);

        let mut crc = Crc16::new(0);
        crc.update(CHECK);
        assert_eq!(crc.finish(), 0x31C3);
    }

    #[test]
    fn seed_splits_across_halves() {
        let crc = fake_block::<Crc32Registers>();
        crc.seed32(0x1234_5678);
        assert_eq!(crc.inires32_lo.get(), 0x5678);
        assert_eq!(crc.inires32_hi.get(), 0x1234);
        assert_eq!(crc.result32(), 0x1234_5678);
        poke(crc, offset_of!(Crc32Registers, resr32_lo), 0x1E6Au16);
        poke(crc, offset_of!(Crc32Registers, resr32_hi), 0x2C48u16);
        assert_eq!(crc.result32_reversed(), 0x2C48_1E6A);
    }

    #[test]
    fn state_dump() {
        let crc = fake_block::<Crc32Registers>();
        crc.seed32(0xFFFF_FFFF);
        let mut out = String::new();
        crc.print_state(&mut out);
        assert!(out.contains("INIRES32           [+0x008] 0xFFFFFFFF"));
    }
}
