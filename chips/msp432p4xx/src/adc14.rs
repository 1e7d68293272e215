// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Precision ADC (ADC14)

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::ADC14_BASE_ADDR;
use crate::registers::interfaces::Readable;
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly};
use crate::StaticRef;

pub const ADC14_BASE: StaticRef<Adc14Registers> =
    unsafe { StaticRef::new(ADC14_BASE_ADDR as *const Adc14Registers) };

/// Number of conversion memory slots.
pub const NUM_MEMORIES: usize = 32;

register_structs! {
    /// ADC14
    pub Adc14Registers {
        /// Control 0 Register
        (0x000 => pub ctl0: ReadWrite<u32, CTL0::Register>),
        /// Control 1 Register
        (0x004 => pub ctl1: ReadWrite<u32, CTL1::Register>),
        /// Window Comparator Low Threshold 0 Register
        (0x008 => pub lo0: ReadWrite<u32, THRESHOLD::Register>),
        /// Window Comparator High Threshold 0 Register
        (0x00C => pub hi0: ReadWrite<u32, THRESHOLD::Register>),
        /// Window Comparator Low Threshold 1 Register
        (0x010 => pub lo1: ReadWrite<u32, THRESHOLD::Register>),
        /// Window Comparator High Threshold 1 Register
        (0x014 => pub hi1: ReadWrite<u32, THRESHOLD::Register>),
        /// Memory Control Registers
        (0x018 => pub mctl: [ReadWrite<u32, MCTL::Register>; NUM_MEMORIES]),
        /// Memory Registers
        (0x098 => pub mem: [ReadWrite<u32, MEM::Register>; NUM_MEMORIES]),
        (0x118 => _reserved0),
        /// Interrupt Enable 0 Register, one bit per memory slot
        (0x13C => pub ier0: ReadWrite<u32>),
        /// Interrupt Enable 1 Register
        (0x140 => pub ier1: ReadWrite<u32, IER1::Register>),
        /// Interrupt Flag 0 Register, one bit per memory slot
        (0x144 => pub ifgr0: ReadOnly<u32>),
        /// Interrupt Flag 1 Register
        (0x148 => pub ifgr1: ReadOnly<u32, IFGR1::Register>),
        /// Clear Interrupt Flag 0 Register
        (0x14C => pub clrifgr0: WriteOnly<u32>),
        /// Clear Interrupt Flag 1 Register
        (0x150 => pub clrifgr1: WriteOnly<u32, CLRIFGR1::Register>),
        /// Interrupt Vector Register
        (0x154 => pub iv: ReadOnly<u32>),
        (0x158 => @END),
    }
}

register_bitfields![u32,
    pub CTL0 [
        /// Start conversion
        SC OFFSET(0) NUMBITS(1) [],
        /// Enable conversion
        ENC OFFSET(1) NUMBITS(1) [],
        /// ADC14 on
        ON OFFSET(4) NUMBITS(1) [],
        /// Multiple sample and conversion
        MSC OFFSET(7) NUMBITS(1) [],
        /// Sample-and-hold time for MEM0 to MEM7 and MEM24 to MEM31
        SHT0 OFFSET(8) NUMBITS(4) [
            Cycles4 = 0,
            Cycles8 = 1,
            Cycles16 = 2,
            Cycles32 = 3,
            Cycles64 = 4,
            Cycles96 = 5,
            Cycles128 = 6,
            Cycles192 = 7
        ],
        /// Sample-and-hold time for MEM8 to MEM23
        SHT1 OFFSET(12) NUMBITS(4) [
            Cycles4 = 0,
            Cycles8 = 1,
            Cycles16 = 2,
            Cycles32 = 3,
            Cycles64 = 4,
            Cycles96 = 5,
            Cycles128 = 6,
            Cycles192 = 7
        ],
        /// A sample or conversion is active
        BUSY OFFSET(16) NUMBITS(1) [],
        /// Conversion sequence mode
        CONSEQ OFFSET(17) NUMBITS(2) [
            SingleChannel = 0,
            Sequence = 1,
            RepeatSingleChannel = 2,
            RepeatSequence = 3
        ],
        /// Clock source
        SSEL OFFSET(19) NUMBITS(3) [
            MODCLK = 0,
            SYSCLK = 1,
            ACLK = 2,
            MCLK = 3,
            SMCLK = 4,
            HSMCLK = 5
        ],
        /// Clock divider, divide by value + 1
        DIV OFFSET(22) NUMBITS(3) [],
        /// Invert sample-and-hold signal
        ISSH OFFSET(25) NUMBITS(1) [],
        /// Sample-and-hold pulse mode select
        SHP OFFSET(26) NUMBITS(1) [],
        /// Sample-and-hold source select
        SHS OFFSET(27) NUMBITS(3) [
            SoftwareStart = 0,
            Source1 = 1,
            Source2 = 2,
            Source3 = 3,
            Source4 = 4,
            Source5 = 5,
            Source6 = 6,
            Source7 = 7
        ],
        /// Clock pre-divider
        PDIV OFFSET(30) NUMBITS(2) [
            DivideBy1 = 0,
            DivideBy4 = 1,
            DivideBy32 = 2,
            DivideBy64 = 3
        ]
    ],
    pub CTL1 [
        /// Power mode
        PWRMD OFFSET(0) NUMBITS(2) [
            Regular = 0,
            /// 12, 10 and 8 bit resolution only, up to 200 ksps
            LowPower = 2
        ],
        /// Reference buffer on only while sampling and converting
        REFBURST OFFSET(2) NUMBITS(1) [],
        /// Read-back format
        DF OFFSET(3) NUMBITS(1) [
            Unsigned = 0,
            Signed = 1
        ],
        /// Resolution
        RES OFFSET(4) NUMBITS(2) [
            Bits8 = 0,
            Bits10 = 1,
            Bits12 = 2,
            Bits14 = 3
        ],
        /// Conversion start address, MEM0 to MEM31
        CSTARTADD OFFSET(16) NUMBITS(5) [],
        /// Internal 1/2 AVCC on input channel MAX
        BATMAP OFFSET(22) NUMBITS(1) [],
        /// Temperature sensor on input channel MAX - 1
        TCMAP OFFSET(23) NUMBITS(1) [],
        /// Internal channel 0 on input channel MAX - 2
        CH0MAP OFFSET(24) NUMBITS(1) [],
        /// Internal channel 1 on input channel MAX - 3
        CH1MAP OFFSET(25) NUMBITS(1) [],
        /// Internal channel 2 on input channel MAX - 4
        CH2MAP OFFSET(26) NUMBITS(1) [],
        /// Internal channel 3 on input channel MAX - 5
        CH3MAP OFFSET(27) NUMBITS(1) []
    ],
    pub THRESHOLD [
        LEVEL OFFSET(0) NUMBITS(16) []
    ],
    pub MCTL [
        /// Input channel. In differential mode the odd channel of the even
        /// pair is the negative input.
        INCH OFFSET(0) NUMBITS(5) [],
        /// End of sequence
        EOS OFFSET(7) NUMBITS(1) [],
        /// Reference selection
        VRSEL OFFSET(8) NUMBITS(4) [
            AvccAvss = 0,
            VrefBufferedAvss = 1,
            VeRefPlusVeRefMinus = 14,
            VeRefPlusBufferedVeRefMinus = 15
        ],
        /// Differential mode
        DIF OFFSET(13) NUMBITS(1) [],
        /// Window comparator enable
        WINC OFFSET(14) NUMBITS(1) [],
        /// Window comparator threshold pair
        WINCTH OFFSET(15) NUMBITS(1) [
            Threshold0 = 0,
            Threshold1 = 1
        ]
    ],
    pub MEM [
        CONVRES OFFSET(0) NUMBITS(16) []
    ],
    pub IER1 [
        /// In-window interrupt enable
        INIE OFFSET(1) NUMBITS(1) [],
        /// Below low threshold interrupt enable
        LOIE OFFSET(2) NUMBITS(1) [],
        /// Above high threshold interrupt enable
        HIIE OFFSET(3) NUMBITS(1) [],
        /// Memory overflow interrupt enable
        OVIE OFFSET(4) NUMBITS(1) [],
        /// Conversion time overflow interrupt enable
        TOVIE OFFSET(5) NUMBITS(1) [],
        /// Local buffered reference ready interrupt enable
        RDYIE OFFSET(6) NUMBITS(1) []
    ],
    pub IFGR1 [
        INIFG OFFSET(1) NUMBITS(1) [],
        LOIFG OFFSET(2) NUMBITS(1) [],
        HIIFG OFFSET(3) NUMBITS(1) [],
        OVIFG OFFSET(4) NUMBITS(1) [],
        TOVIFG OFFSET(5) NUMBITS(1) [],
        RDYIFG OFFSET(6) NUMBITS(1) []
    ],
    pub CLRIFGR1 [
        CLRINIFG OFFSET(1) NUMBITS(1) [],
        CLRLOIFG OFFSET(2) NUMBITS(1) [],
        CLRHIIFG OFFSET(3) NUMBITS(1) [],
        CLROVIFG OFFSET(4) NUMBITS(1) [],
        CLRTOVIFG OFFSET(5) NUMBITS(1) [],
        CLRRDYIFG OFFSET(6) NUMBITS(1) []
    ]
];

/// Highest priority pending ADC14 interrupt, as reported by IV.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptVector {
    None,
    Overflow,
    TimeOverflow,
    High,
    Low,
    InWindow,
    Memory(u8),
    Ready,
}

impl InterruptVector {
    /// Decode an IV value. Values the hardware never produces give `None`.
    pub const fn decode(iv: u32) -> Option<InterruptVector> {
        Some(match iv {
            0x00 => InterruptVector::None,
            0x02 => InterruptVector::Overflow,
            0x04 => InterruptVector::TimeOverflow,
            0x06 => InterruptVector::High,
            0x08 => InterruptVector::Low,
            0x0A => InterruptVector::InWindow,
            0x0C..=0x4A if iv % 2 == 0 => InterruptVector::Memory(((iv - 0x0C) / 2) as u8),
            0x4C => InterruptVector::Ready,
            _ => return None,
        })
    }
}

/// Number of result bits for a RES setting.
pub const fn resolution_bits(res: CTL1::RES::Value) -> u32 {
    match res {
        CTL1::RES::Value::Bits8 => 8,
        CTL1::RES::Value::Bits10 => 10,
        CTL1::RES::Value::Bits12 => 12,
        CTL1::RES::Value::Bits14 => 14,
    }
}

impl Adc14Registers {
    pub fn pending_interrupt(&self) -> Option<InterruptVector> {
        InterruptVector::decode(self.iv.get())
    }

    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "ADC14");
        debug::write_register(writer, "CTL0", offset_of!(Adc14Registers, ctl0), self.ctl0.get());
        debug::write_register(writer, "CTL1", offset_of!(Adc14Registers, ctl1), self.ctl1.get());
        debug::write_register(writer, "IFGR0", offset_of!(Adc14Registers, ifgr0), self.ifgr0.get());
        debug::write_register(writer, "IFGR1", offset_of!(Adc14Registers, ifgr1), self.ifgr1.get());
        debug::write_flag(writer, "busy", self.ctl0.is_set(CTL0::BUSY));
        debug::write_flag(writer, "overflow", self.ifgr1.is_set(IFGR1::OVIFG));
        debug::write_flag(writer, "time overflow", self.ifgr1.is_set(IFGR1::TOVIFG));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::interfaces::{ReadWriteable, Writeable};
    use crate::testing::{fake_block, poke};
    use std::string::String;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<Adc14Registers>(), 0x158);
        assert_eq!(offset_of!(Adc14Registers, hi1), 0x014);
        assert_eq!(offset_of!(Adc14Registers, mctl), 0x018);
        assert_eq!(offset_of!(Adc14Registers, mem), 0x098);
        assert_eq!(offset_of!(Adc14Registers, ier0), 0x13C);
        assert_eq!(offset_of!(Adc14Registers, clrifgr1), 0x150);
        assert_eq!(offset_of!(Adc14Registers, iv), 0x154);
        assert_eq!(ADC14_BASE.address(), 0x4001_2000);
    }

    #[test]
    fn control_encodings() {
        assert_eq!(CTL0::SHT0::Cycles192.value, 0x0000_0700);
        assert_eq!(CTL0::CONSEQ::RepeatSequence.value, 0x0006_0000);
        assert_eq!(CTL0::SSEL::HSMCLK.value, 0x0028_0000);
        assert_eq!(CTL0::PDIV::DivideBy64.value, 0xC000_0000);
        assert_eq!(CTL1::RES::Bits14.value, 0x30);
        assert_eq!(MCTL::VRSEL::VeRefPlusBufferedVeRefMinus.value, 0x0F00);
    }

    #[test]
    fn sequence_setup() {
        let adc = fake_block::<Adc14Registers>();
        adc.ctl0.write(CTL0::ON::SET + CTL0::SHP::SET + CTL0::CONSEQ::Sequence);
        adc.mctl[0].write(MCTL::INCH.val(6));
        adc.mctl[1].write(MCTL::INCH.val(7) + MCTL::EOS::SET);
        adc.ctl0.modify(CTL0::ENC::SET + CTL0::SC::SET);
        assert_eq!(adc.ctl0.get(), 0x0402_0013);
        assert_eq!(adc.mctl[1].get(), 0x87);
    }

    #[test]
    fn interrupt_vector() {
        assert_eq!(InterruptVector::decode(0), Some(InterruptVector::None));
        assert_eq!(InterruptVector::decode(0x02), Some(InterruptVector::Overflow));
        assert_eq!(InterruptVector::decode(0x0A), Some(InterruptVector::InWindow));
        assert_eq!(InterruptVector::decode(0x0C), Some(InterruptVector::Memory(0)));
        assert_eq!(InterruptVector::decode(0x4A), Some(InterruptVector::Memory(31)));
        assert_eq!(InterruptVector::decode(0x4C), Some(InterruptVector::Ready));
        assert_eq!(InterruptVector::decode(0x0D), None);
        assert_eq!(InterruptVector::decode(0x4E), None);

        let adc = fake_block::<Adc14Registers>();
        poke(adc, offset_of!(Adc14Registers, iv), 0x12u32);
        assert_eq!(adc.pending_interrupt(), Some(InterruptVector::Memory(3)));
    }

    #[test]
    fn resolutions() {
        assert_eq!(resolution_bits(CTL1::RES::Value::Bits8), 8);
        assert_eq!(resolution_bits(CTL1::RES::Value::Bits14), 14);
    }

    #[test]
    fn state_dump() {
        let adc = fake_block::<Adc14Registers>();
        poke(adc, offset_of!(Adc14Registers, ifgr1), 0x10u32);
        let mut out = String::new();
        adc.print_state(&mut out);
        assert!(out.contains("---| ADC14 |---"));
        assert!(out.contains("overflow"));
        assert!(!out.contains("busy"));
    }
}
