// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Register definitions for the TI MSP432P4xx family.
//!
//! MSP432P401R: <https://www.ti.com/product/MSP432P401R>
//!
//! Every peripheral is described as a `register_structs!` block laid over its
//! fixed address, with `register_bitfields!` definitions for the fields of
//! each register. The blocks are reachable through the `*_BASE` constants of
//! each module or all at once through [`peripherals::Msp432Peripherals`].
//! Enabling the `msp432p4x1xl` feature switches to the memory sizes of the
//! larger parts and adds the segment LCD controller.

#![crate_name = "msp432p4xx"]
#![crate_type = "rlib"]
#![no_std]

#[cfg(test)]
extern crate std;

mod errorcode;
mod static_ref;

#[cfg(test)]
mod testing;

pub mod bitband;
pub mod debug;
pub mod memory_map;
pub mod nvic;
pub mod peripherals;

// Peripherals
pub mod adc14;
pub mod aes256;
pub mod comp_e;
pub mod crc32;
pub mod cs;
pub mod dio;
pub mod dma;
pub mod eusci;
pub mod fl_bootover_mailbox;
pub mod flctl;
#[cfg(feature = "msp432p4x1xl")]
pub mod lcd_f;
pub mod pcm;
pub mod pmap;
pub mod pss;
pub mod ref_a;
pub mod rstctl;
pub mod rtc_c;
pub mod sysctl;
pub mod timer32;
pub mod timer_a;
pub mod tlv;
pub mod wdt_a;

pub use crate::errorcode::ErrorCode;
pub use crate::static_ref::StaticRef;

/// The register interface every block in this crate is written against.
pub mod registers {
    pub use tock_registers::fields::{Field, FieldValue};
    pub use tock_registers::interfaces;
    pub use tock_registers::registers::{InMemoryRegister, ReadOnly, ReadWrite, WriteOnly};
    pub use tock_registers::{register_bitfields, register_structs, LocalRegisterCopy};
}
