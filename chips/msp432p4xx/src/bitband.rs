// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Bit-band alias regions.
//!
//! The Cortex-M4 maps every bit of the first MiB of SRAM and of the
//! peripheral region onto its own word in an alias region. Writing bit 0 of
//! an alias word sets or clears the corresponding bit with a single bus
//! transaction, so no read-modify-write sequence is needed to change one
//! bit of a register shared with an interrupt handler.
//!
//! ```text
//! alias = alias_base + (byte_address - region_base) * 32 + bit * 4
//! ```

use core::ptr;

use crate::memory_map::{
    BITBAND_PERI_BASE, BITBAND_REGION_SIZE, BITBAND_SRAM_BASE, PERIPH_BASE, SRAM_BASE,
};
use crate::ErrorCode;

const fn translate(
    addr: usize,
    bit: usize,
    region_base: usize,
    alias_base: usize,
) -> Result<usize, ErrorCode> {
    if bit >= 32 {
        return Err(ErrorCode::SIZE);
    }
    // The bit may reach into the following bytes of the word; the byte that
    // actually holds it has to be inside the region.
    let byte = match addr.checked_add(bit / 8) {
        Some(byte) => byte,
        None => return Err(ErrorCode::INVAL),
    };
    if addr < region_base || byte >= region_base + BITBAND_REGION_SIZE {
        return Err(ErrorCode::INVAL);
    }
    Ok(alias_base + (addr - region_base) * 32 + bit * 4)
}

/// Alias word for `bit` of the SRAM word at `addr`.
pub const fn sram_alias(addr: usize, bit: usize) -> Result<usize, ErrorCode> {
    translate(addr, bit, SRAM_BASE, BITBAND_SRAM_BASE)
}

/// Alias word for `bit` of the peripheral register at `addr`.
pub const fn peripheral_alias(addr: usize, bit: usize) -> Result<usize, ErrorCode> {
    translate(addr, bit, PERIPH_BASE, BITBAND_PERI_BASE)
}

/// Alias word for `bit` at `addr`, whichever bit-band region `addr` is in.
pub const fn alias(addr: usize, bit: usize) -> Result<usize, ErrorCode> {
    if addr >= PERIPH_BASE {
        peripheral_alias(addr, bit)
    } else {
        sram_alias(addr, bit)
    }
}

/// A single bit reached through its bit-band alias word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitBandBit {
    alias: usize,
}

impl BitBandBit {
    /// Resolve the alias for `bit` of the word at `addr`.
    ///
    /// ## Safety
    ///
    /// Writes through the returned handle modify the memory at `addr` behind
    /// the compiler's back. The caller must own that memory or it must be a
    /// hardware register.
    pub const unsafe fn new(addr: usize, bit: usize) -> Result<BitBandBit, ErrorCode> {
        match alias(addr, bit) {
            Ok(alias) => Ok(BitBandBit { alias }),
            Err(e) => Err(e),
        }
    }

    /// Resolve the alias for `bit` of a memory-mapped register.
    pub fn for_register<R>(reg: &R, bit: usize) -> Result<BitBandBit, ErrorCode> {
        if bit >= 8 * core::mem::size_of::<R>() {
            return Err(ErrorCode::SIZE);
        }
        alias(ptr::from_ref(reg) as usize, bit).map(|alias| BitBandBit { alias })
    }

    /// Address of the alias word.
    pub fn address(&self) -> usize {
        self.alias
    }

    pub fn set(&self) {
        self.write(true);
    }

    pub fn clear(&self) {
        self.write(false);
    }

    pub fn write(&self, value: bool) {
        unsafe { ptr::write_volatile(self.alias as *mut u32, value as u32) }
    }

    pub fn is_set(&self) -> bool {
        unsafe { ptr::read_volatile(self.alias as *const u32) & 1 == 1 }
    }
}
