// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Comparator (COMP_E)

use crate::memory_map::{COMP_E0_BASE_ADDR, COMP_E1_BASE_ADDR};
use crate::registers::interfaces::Readable;
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use crate::StaticRef;

pub const COMP_E0_BASE: StaticRef<CompERegisters> =
    unsafe { StaticRef::new(COMP_E0_BASE_ADDR as *const CompERegisters) };
pub const COMP_E1_BASE: StaticRef<CompERegisters> =
    unsafe { StaticRef::new(COMP_E1_BASE_ADDR as *const CompERegisters) };

register_structs! {
    pub CompERegisters {
        /// Control Register 0
        (0x00 => pub ctl0: ReadWrite<u16, CTL0::Register>),
        /// Control Register 1
        (0x02 => pub ctl1: ReadWrite<u16, CTL1::Register>),
        /// Control Register 2
        (0x04 => pub ctl2: ReadWrite<u16, CTL2::Register>),
        /// Control Register 3
        (0x06 => pub ctl3: ReadWrite<u16, CTL3::Register>),
        (0x08 => _reserved0),
        /// Interrupt Control Register
        (0x0C => pub int: ReadWrite<u16, INT::Register>),
        /// Interrupt Vector Word Register
        (0x0E => pub iv: ReadOnly<u16>),
        (0x10 => @END),
    }
}

register_bitfields![u16,
    pub CTL0 [
        /// Channel input selected for the V+ terminal
        IPSEL OFFSET(0) NUMBITS(4) [],
        /// Channel input enable for the V+ terminal
        IPEN OFFSET(7) NUMBITS(1) [],
        /// Channel input selected for the V- terminal
        IMSEL OFFSET(8) NUMBITS(4) [],
        /// Channel input enable for the V- terminal
        IMEN OFFSET(15) NUMBITS(1) []
    ],
    pub CTL1 [
        /// Comparator output value
        OUT OFFSET(0) NUMBITS(1) [],
        /// Output polarity inverted
        OUTPOL OFFSET(1) NUMBITS(1) [],
        /// Output filter enable
        F OFFSET(2) NUMBITS(1) [],
        /// Interrupt edge select for IFG and IIFG
        IES OFFSET(3) NUMBITS(1) [],
        /// Input short
        SHORT OFFSET(4) NUMBITS(1) [],
        /// Exchange the inputs and invert the output
        EX OFFSET(5) NUMBITS(1) [],
        /// Filter delay
        FDLY OFFSET(6) NUMBITS(2) [
            Typical450ns = 0,
            Typical900ns = 1,
            Typical1800ns = 2,
            Typical3600ns = 3
        ],
        /// Power mode
        PWRMD OFFSET(8) NUMBITS(2) [
            HighSpeed = 0,
            Normal = 1,
            UltraLowPower = 2
        ],
        /// Comparator on
        ON OFFSET(10) NUMBITS(1) [],
        /// Reference voltage level used while MRVS selects it
        MRVL OFFSET(11) NUMBITS(1) [],
        /// Reference voltage select: output state (0) or MRVL (1)
        MRVS OFFSET(12) NUMBITS(1) []
    ],
    pub CTL2 [
        /// Reference resistor tap 0
        REF0 OFFSET(0) NUMBITS(5) [],
        /// Reference select: V+ (0) or V- (1) terminal
        RSEL OFFSET(5) NUMBITS(1) [],
        /// Reference source
        RS OFFSET(6) NUMBITS(2) [
            NoCurrent = 0,
            Vcc = 1,
            SharedReference = 2,
            SharedReferenceNoLadder = 3
        ],
        /// Reference resistor tap 1
        REF1 OFFSET(8) NUMBITS(5) [],
        /// Reference voltage level
        REFL OFFSET(13) NUMBITS(2) [
            Off = 0,
            V1_2 = 1,
            V2_0 = 2,
            V2_5 = 3
        ],
        /// Reference accuracy: static (0) or clocked (1)
        REFACC OFFSET(15) NUMBITS(1) []
    ],
    pub CTL3 [
        /// Port disable, one bit per input channel
        PD OFFSET(0) NUMBITS(16) []
    ],
    pub INT [
        /// Output interrupt flag
        IFG OFFSET(0) NUMBITS(1) [],
        /// Output inverted polarity interrupt flag
        IIFG OFFSET(1) NUMBITS(1) [],
        /// Comparator ready interrupt flag
        RDYIFG OFFSET(4) NUMBITS(1) [],
        /// Output interrupt enable
        IE OFFSET(8) NUMBITS(1) [],
        /// Output interrupt enable, inverted polarity
        IIE OFFSET(9) NUMBITS(1) [],
        /// Comparator ready interrupt enable
        RDYIE OFFSET(12) NUMBITS(1) []
    ]
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptVector {
    None,
    Output,
    InvertedOutput,
    Ready,
}

impl InterruptVector {
    pub const fn decode(iv: u16) -> Option<InterruptVector> {
        match iv {
            0x00 => Some(InterruptVector::None),
            0x02 => Some(InterruptVector::Output),
            0x04 => Some(InterruptVector::InvertedOutput),
            0x0A => Some(InterruptVector::Ready),
            _ => None,
        }
    }
}

impl CompERegisters {
    pub fn output(&self) -> bool {
        self.ctl1.is_set(CTL1::OUT)
    }

    pub fn pending_interrupt(&self) -> Option<InterruptVector> {
        InterruptVector::decode(self.iv.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::interfaces::Writeable;
    use crate::testing::{fake_block, poke};
    use core::mem::offset_of;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<CompERegisters>(), 0x10);
        assert_eq!(offset_of!(CompERegisters, ctl3), 0x06);
        assert_eq!(offset_of!(CompERegisters, int), 0x0C);
        assert_eq!(offset_of!(CompERegisters, iv), 0x0E);
        assert_eq!(COMP_E0_BASE.address(), 0x4000_3400);
        assert_eq!(COMP_E1_BASE.address(), 0x4000_3800);
    }

    #[test]
    fn reference_ladder_encoding() {
        let comp = fake_block::<CompERegisters>();
        comp.ctl2.write(
            CTL2::REFL::V2_5 + CTL2::RS::SharedReference + CTL2::REF0.val(7) + CTL2::REF1.val(0x1F),
        );
        assert_eq!(comp.ctl2.get(), 0x6000 | 0x0080 | 0x0007 | 0x1F00);
    }

    #[test]
    fn interrupt_vector() {
        assert_eq!(InterruptVector::decode(0x0A), Some(InterruptVector::Ready));
        assert_eq!(InterruptVector::decode(0x06), None);
        let comp = fake_block::<CompERegisters>();
        poke(comp, offset_of!(CompERegisters, iv), 0x04u16);
        assert_eq!(comp.pending_interrupt(), Some(InterruptVector::InvertedOutput));
    }

    #[test]
    fn output_follows_ctl1() {
        let comp = fake_block::<CompERegisters>();
        assert!(!comp.output());
        comp.ctl1.write(CTL1::ON::SET + CTL1::OUT::SET);
        assert!(comp.output());
    }
}
