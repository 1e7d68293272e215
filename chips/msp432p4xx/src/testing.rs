// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Host-side helpers for exercising register blocks in unit tests.

use crate::StaticRef;
use std::boxed::Box;
use std::vec;

/// Allocate a zeroed, word-aligned block of ordinary memory large enough for
/// `T` and hand it out as if it were the peripheral. The memory is leaked so
/// the reference stays valid for the rest of the test binary.
pub fn fake_block<T>() -> StaticRef<T> {
    let words = core::mem::size_of::<T>().div_ceil(4).max(1);
    let memory: &'static mut [u32] = Box::leak(vec![0u32; words].into_boxed_slice());
    unsafe { StaticRef::new(memory.as_mut_ptr().cast::<T>()) }
}

/// Overwrite the register at byte `offset` of a fake block, standing in for
/// the hardware updating a status bit. The write goes through the address of
/// the allocation itself, so registers software can only read work too.
pub fn poke<T, V: Copy>(block: StaticRef<T>, offset: usize, value: V) {
    assert!(offset + core::mem::size_of::<V>() <= core::mem::size_of::<T>());
    unsafe { core::ptr::write_volatile((block.address() + offset) as *mut V, value) }
}

/// Read back whatever the last access left in a register, including write-only
/// registers.
pub fn peek<R, V: Copy>(reg: &R) -> V {
    assert_eq!(core::mem::size_of::<R>(), core::mem::size_of::<V>());
    unsafe { core::ptr::read_volatile(core::ptr::from_ref(reg).cast::<V>()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::interfaces::Readable;
    use crate::registers::{ReadOnly, ReadWrite};
    use core::mem::offset_of;
    use tock_registers::register_structs;

    register_structs! {
        Block {
            (0x00 => status: ReadOnly<u16>),
            (0x02 => control: ReadWrite<u16>),
            (0x04 => count: ReadOnly<u32>),
            (0x08 => @END),
        }
    }

    #[test]
    fn poke_updates_read_only_registers() {
        let block = fake_block::<Block>();
        poke(block, offset_of!(Block, status), 0x8001u16);
        poke(block, offset_of!(Block, count), 0xDEAD_BEEFu32);
        assert_eq!(block.status.get(), 0x8001);
        assert_eq!(block.count.get(), 0xDEAD_BEEF);
        assert_eq!(block.control.get(), 0);
    }

    #[test]
    fn peek_reads_back_written_value() {
        let block = fake_block::<Block>();
        poke(block, offset_of!(Block, control), 0x1234u16);
        assert_eq!(peek::<_, u16>(&block.control), 0x1234);
    }

    #[test]
    #[should_panic]
    fn poke_past_the_block_panics() {
        let block = fake_block::<Block>();
        poke(block, offset_of!(Block, count), 0u64);
    }
}
