// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! AES256 accelerator

use crate::memory_map::AES256_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::{ErrorCode, StaticRef};

pub const AES256_BASE: StaticRef<Aes256Registers> =
    unsafe { StaticRef::new(AES256_BASE_ADDR as *const Aes256Registers) };

/// One AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

register_structs! {
    pub Aes256Registers {
        /// Control Register 0
        (0x00 => pub ctl0: ReadWrite<u16, CTL0::Register>),
        /// Control Register 1
        (0x02 => pub ctl1: ReadWrite<u16, CTL1::Register>),
        /// Status Register
        (0x04 => pub stat: ReadWrite<u16, STAT::Register>),
        /// Key Register
        (0x06 => pub key: WriteOnly<u16>),
        /// Data In Register
        (0x08 => pub din: WriteOnly<u16>),
        /// Data Out Register
        (0x0A => pub dout: ReadOnly<u16>),
        /// XORed Data In Register
        (0x0C => pub xdin: WriteOnly<u16>),
        /// XORed Data In Register, no trigger
        (0x0E => pub xin: WriteOnly<u16>),
        (0x10 => @END),
    }
}

register_bitfields![u16,
    pub CTL0 [
        /// Operation
        OP OFFSET(0) NUMBITS(2) [
            Encrypt = 0,
            Decrypt = 1,
            /// Generate the first round key for a later decryption
            GenerateDecryptKey = 2,
            /// Decrypt with a previously generated first round key
            DecryptWithRoundKey = 3
        ],
        /// Key length
        KL OFFSET(2) NUMBITS(2) [
            Bits128 = 0,
            Bits192 = 1,
            Bits256 = 2
        ],
        /// Cipher mode for DMA driven operation
        CM OFFSET(5) NUMBITS(2) [
            ECB = 0,
            CBC = 1,
            OFB = 2,
            CFB = 3
        ],
        /// Software reset
        SWRST OFFSET(7) NUMBITS(1) [],
        /// Ready interrupt flag
        RDYIFG OFFSET(8) NUMBITS(1) [],
        /// Error flag
        ERRFG OFFSET(11) NUMBITS(1) [],
        /// Ready interrupt enable
        RDYIE OFFSET(12) NUMBITS(1) [],
        /// Cipher mode enable
        CMEN OFFSET(15) NUMBITS(1) []
    ],
    pub CTL1 [
        /// Number of blocks for a DMA cipher mode run
        BLKCNT OFFSET(0) NUMBITS(8) []
    ],
    pub STAT [
        /// Module busy
        BUSY OFFSET(0) NUMBITS(1) [],
        /// All key words written
        KEYWR OFFSET(1) NUMBITS(1) [],
        /// All data-in words written
        DINWR OFFSET(2) NUMBITS(1) [],
        /// All data-out words read
        DOUTRD OFFSET(3) NUMBITS(1) [],
        /// Key words written so far
        KEYCNT OFFSET(4) NUMBITS(4) [],
        /// Data-in words written so far
        DINCNT OFFSET(8) NUMBITS(4) [],
        /// Data-out words read so far
        DOUTCNT OFFSET(12) NUMBITS(4) []
    ]
];

pub type KeyLength = CTL0::KL::Value;

impl KeyLength {
    /// Number of 16-bit writes to KEY that load a key of this length.
    pub const fn words(self) -> usize {
        match self {
            KeyLength::Bits128 => 8,
            KeyLength::Bits192 => 12,
            KeyLength::Bits256 => 16,
        }
    }

    pub const fn bytes(self) -> usize {
        self.words() * 2
    }

    pub const fn from_bytes(len: usize) -> Option<KeyLength> {
        match len {
            16 => Some(KeyLength::Bits128),
            24 => Some(KeyLength::Bits192),
            32 => Some(KeyLength::Bits256),
            _ => None,
        }
    }
}

pub struct Aes256 {
    registers: StaticRef<Aes256Registers>,
}

impl Aes256 {
    pub const fn new(base: StaticRef<Aes256Registers>) -> Aes256 {
        Aes256 { registers: base }
    }

    pub fn registers(&self) -> &Aes256Registers {
        &self.registers
    }

    pub fn is_busy(&self) -> bool {
        self.registers.stat.is_set(STAT::BUSY)
    }

    /// Select the key length from `key` and load it, low byte first.
    pub fn load_key(&self, key: &[u8]) -> Result<KeyLength, ErrorCode> {
        let length = KeyLength::from_bytes(key.len()).ok_or(ErrorCode::SIZE)?;
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        self.registers.ctl0.modify(CTL0::KL.val(length as u16));
        for pair in key.chunks_exact(2) {
            self.registers.key.set(u16::from_le_bytes([pair[0], pair[1]]));
        }
        Ok(length)
    }

    /// Feed one block. The eighth write starts the operation.
    pub fn write_block(&self, block: &[u8; BLOCK_SIZE]) -> Result<(), ErrorCode> {
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        for pair in block.chunks_exact(2) {
            self.registers.din.set(u16::from_le_bytes([pair[0], pair[1]]));
        }
        Ok(())
    }

    /// Collect the result of the last operation.
    pub fn read_block(&self) -> Result<[u8; BLOCK_SIZE], ErrorCode> {
        if self.is_busy() {
            return Err(ErrorCode::BUSY);
        }
        let mut out = [0; BLOCK_SIZE];
        for pair in out.chunks_exact_mut(2) {
            pair.copy_from_slice(&self.registers.dout.get().to_le_bytes());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, peek, poke};
    use core::mem::offset_of;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<Aes256Registers>(), 0x10);
        assert_eq!(offset_of!(Aes256Registers, key), 0x06);
        assert_eq!(offset_of!(Aes256Registers, dout), 0x0A);
        assert_eq!(offset_of!(Aes256Registers, xin), 0x0E);
        assert_eq!(AES256_BASE.address(), 0x4000_3C00);
    }

    #[test]
    fn key_lengths() {
        assert_eq!(KeyLength::Bits128.words(), 8);
        assert_eq!(KeyLength::Bits192.words(), 12);
        assert_eq!(KeyLength::Bits256.words(), 16);
        assert_eq!(KeyLength::from_bytes(24), Some(KeyLength::Bits192));
        assert_eq!(KeyLength::from_bytes(20), None);
        assert_eq!(CTL0::KL::Bits256.value, 0x8);
        assert_eq!(CTL0::CM::CFB.value, 0x60);
    }

    #[test]
    fn load_key_selects_length() {
        let aes = Aes256::new(fake_block::<Aes256Registers>());
        let key = [0u8; 32];
        assert_eq!(aes.load_key(&key), Ok(KeyLength::Bits256));
        assert_eq!(aes.registers().ctl0.read(CTL0::KL), 2);
        assert_eq!(aes.load_key(&key[..15]), Err(ErrorCode::SIZE));
    }

    #[test]
    fn key_words_are_little_endian() {
        let aes = Aes256::new(fake_block::<Aes256Registers>());
        let mut key = [0u8; 16];
        key[14] = 0x34;
        key[15] = 0x12;
        assert!(aes.load_key(&key).is_ok());
        // The register keeps the last word written.
        assert_eq!(peek::<_, u16>(&aes.registers().key), 0x1234);
    }

    #[test]
    fn busy_engine_refuses_data() {
        let aes = Aes256::new(fake_block::<Aes256Registers>());
        aes.registers().stat.write(STAT::BUSY::SET);
        assert_eq!(aes.write_block(&[0; BLOCK_SIZE]), Err(ErrorCode::BUSY));
        assert_eq!(aes.read_block(), Err(ErrorCode::BUSY));
        assert_eq!(aes.load_key(&[0; 16]), Err(ErrorCode::BUSY));
    }

    #[test]
    fn read_block_drains_dout() {
        let aes = Aes256::new(fake_block::<Aes256Registers>());
        poke(aes.registers, offset_of!(Aes256Registers, dout), 0xBEEFu16);
        let block = aes.read_block().unwrap();
        assert_eq!(&block[..4], &[0xEF, 0xBE, 0xEF, 0xBE]);
    }
}
