// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Direct Memory Access (DMA)
//!
//! The controller is split over two register blocks: the device-specific
//! channel routing at `0x4000_E000` and the Arm µDMA core at `0x4000_F000`.
//! Transfer descriptors do not live in registers at all but in a table in
//! SRAM whose address is written to CTLBASE; [`ControlTable`] describes it.

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::DMA_BASE_ADDR;
use crate::registers::interfaces::{Readable, Writeable};
use crate::registers::{
    register_bitfields, register_structs, InMemoryRegister, ReadOnly, ReadWrite, WriteOnly,
};
use crate::{ErrorCode, StaticRef};

pub const DMA_CHANNEL_BASE: StaticRef<DmaChannelRegisters> =
    unsafe { StaticRef::new(DMA_BASE_ADDR as *const DmaChannelRegisters) };

pub const DMA_CONTROL_BASE: StaticRef<DmaControlRegisters> =
    unsafe { StaticRef::new((DMA_BASE_ADDR + 0x1000) as *const DmaControlRegisters) };

/// The MSP432P4xx implements 8 of the 32 channels the register map has room for.
pub const AVAILABLE_DMA_CHANNELS: usize = 8;

/// Sources 1 to 7 are peripheral triggers; 0 is reserved.
pub const MAX_SRC_NR: u8 = 7;

/// A single cycle moves at most 1024 items.
pub const MAX_TRANSFERS_LEN: usize = 1024;

register_structs! {
    /// Channel routing and interrupt mapping
    pub DmaChannelRegisters {
        /// Device Configuration Status
        (0x000 => pub device_cfg: ReadOnly<u32, DEVICE_CFG::Register>),
        /// Software Channel Trigger Register
        (0x004 => pub sw_chtrig: ReadWrite<u32>),
        (0x008 => _reserved0),
        /// Channel n Source Configuration Registers
        (0x010 => pub ch_srccfg: [ReadWrite<u32, CH_SRCCFG::Register>; 32]),
        (0x090 => _reserved1),
        /// Interrupt 1 Source Channel Configuration
        (0x100 => pub int1_srccfg: ReadWrite<u32, INT_SRCCFG::Register>),
        /// Interrupt 2 Source Channel Configuration
        (0x104 => pub int2_srccfg: ReadWrite<u32, INT_SRCCFG::Register>),
        /// Interrupt 3 Source Channel Configuration
        (0x108 => pub int3_srccfg: ReadWrite<u32, INT_SRCCFG::Register>),
        (0x10C => _reserved2),
        /// Interrupt 0 Source Channel Flag Register, one bit per channel
        (0x110 => pub int0_srcflg: ReadOnly<u32>),
        /// Interrupt 0 Source Channel Clear Flag Register
        (0x114 => pub int0_clrflg: WriteOnly<u32>),
        (0x118 => @END),
    },

    /// µDMA controller core
    pub DmaControlRegisters {
        /// Status Register
        (0x00 => pub stat: ReadOnly<u32, STAT::Register>),
        /// Configuration Register
        (0x04 => pub cfg: WriteOnly<u32, CFG::Register>),
        /// Channel Control Data Base Pointer Register
        (0x08 => pub ctlbase: ReadWrite<u32>),
        /// Channel Alternate Control Data Base Pointer Register
        (0x0C => pub altbase: ReadOnly<u32>),
        /// Channel Wait on Request Status Register
        (0x10 => pub waitstat: ReadOnly<u32>),
        /// Channel Software Request Register
        (0x14 => pub swreq: WriteOnly<u32>),
        /// Channel Useburst Set Register
        (0x18 => pub useburstset: ReadWrite<u32>),
        /// Channel Useburst Clear Register
        (0x1C => pub useburstclr: WriteOnly<u32>),
        /// Channel Request Mask Set Register
        (0x20 => pub reqmaskset: ReadWrite<u32>),
        /// Channel Request Mask Clear Register
        (0x24 => pub reqmaskclr: WriteOnly<u32>),
        /// Channel Enable Set Register
        (0x28 => pub enaset: ReadWrite<u32>),
        /// Channel Enable Clear Register
        (0x2C => pub enaclr: WriteOnly<u32>),
        /// Channel Primary-Alternate Set Register
        (0x30 => pub altset: ReadWrite<u32>),
        /// Channel Primary-Alternate Clear Register
        (0x34 => pub altclr: WriteOnly<u32>),
        /// Channel Priority Set Register
        (0x38 => pub prioset: ReadWrite<u32>),
        /// Channel Priority Clear Register
        (0x3C => pub prioclr: WriteOnly<u32>),
        (0x40 => _reserved0),
        /// Bus Error Clear Register
        (0x4C => pub errclr: ReadWrite<u32, ERRCLR::Register>),
        (0x50 => @END),
    }
}

register_bitfields![u32,
    pub DEVICE_CFG [
        /// Number of DMA channels available
        NUM_DMA_CHANNELS OFFSET(0) NUMBITS(8) [],
        /// Number of DMA sources per channel
        NUM_SRC_PER_CHANNEL OFFSET(8) NUMBITS(8) []
    ],
    pub CH_SRCCFG [
        /// Trigger source selection, see [`trigger_source`]
        DMASRC OFFSET(0) NUMBITS(8) []
    ],
    pub INT_SRCCFG [
        /// Channel whose completion raises this interrupt
        INT_SRC OFFSET(0) NUMBITS(5) [],
        /// Enables the mapping
        EN OFFSET(5) NUMBITS(1) []
    ],
    pub STAT [
        /// Controller enabled
        MASTEN OFFSET(0) NUMBITS(1) [],
        /// State of the control state machine
        STATE OFFSET(4) NUMBITS(4) [
            Idle = 0,
            ReadingChannelControlData = 1,
            ReadingSourceEndPointer = 2,
            ReadingDestinationEndPointer = 3,
            ReadingSourceData = 4,
            WritingDestinationData = 5,
            WaitingForRequestToClear = 6,
            WritingChannelControlData = 7,
            Stalled = 8,
            Done = 9,
            PeripheralScatterGatherTransition = 10
        ],
        /// Number of channels minus one
        DMACHANS OFFSET(16) NUMBITS(5) [],
        /// Integration test logic present
        TESTSTAT OFFSET(28) NUMBITS(4) []
    ],
    pub CFG [
        /// Enable the controller
        MASTEN OFFSET(0) NUMBITS(1) [],
        /// HPROT[3:1] levels for control data accesses
        CHPROTCTRL OFFSET(5) NUMBITS(3) []
    ],
    pub ERRCLR [
        /// Bus error flag, write 1 to clear
        ERRCLR OFFSET(0) NUMBITS(1) []
    ]
];

register_bitfields![u32,
    /// Channel control word of a transfer descriptor
    pub DMA_CTRL [
        /// Cycle type
        CYCLE_CTRL OFFSET(0) NUMBITS(3) [
            /// The descriptor is invalid
            Stop = 0,
            Basic = 1,
            Auto = 2,
            PingPong = 3,
            MemoryScatterGatherPrimary = 4,
            MemoryScatterGatherAlternate = 5,
            PeripheralScatterGatherPrimary = 6,
            PeripheralScatterGatherAlternate = 7
        ],
        /// Set the channel's useburst bit at the end of a scatter-gather cycle
        NEXT_USEBURST OFFSET(3) NUMBITS(1) [],
        /// Number of transfers minus one
        N_MINUS_1 OFFSET(4) NUMBITS(10) [],
        /// Transfers between bus rearbitrations, as a power of two
        R_POWER OFFSET(14) NUMBITS(4) [],
        /// HPROT[3:1] when reading; no effect on this device
        SRC_PROT_CTRL OFFSET(18) NUMBITS(3) [],
        /// HPROT[3:1] when writing; no effect on this device
        DST_PROT_CTRL OFFSET(21) NUMBITS(3) [],
        SRC_SIZE OFFSET(24) NUMBITS(2) [
            Byte = 0,
            HalfWord = 1,
            Word = 2
        ],
        SRC_INC OFFSET(26) NUMBITS(2) [
            Byte = 0,
            HalfWord = 1,
            Word = 2,
            NoIncrement = 3
        ],
        /// Must equal SRC_SIZE
        DST_SIZE OFFSET(28) NUMBITS(2) [
            Byte = 0,
            HalfWord = 1,
            Word = 2
        ],
        DST_INC OFFSET(30) NUMBITS(2) [
            Byte = 0,
            HalfWord = 1,
            Word = 2,
            NoIncrement = 3
        ]
    ]
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataWidth {
    Width8Bit = 0,
    Width16Bit = 1,
    Width32Bit = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PtrIncrement {
    Incr8Bit = 0,
    Incr16Bit = 1,
    Incr32Bit = 2,
    NoIncr = 3,
}

impl PtrIncrement {
    pub const fn bytes(self) -> u32 {
        match self {
            PtrIncrement::Incr8Bit => 1,
            PtrIncrement::Incr16Bit => 2,
            PtrIncrement::Incr32Bit => 4,
            PtrIncrement::NoIncr => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Basic = 1,
    AutoRequest = 2,
    PingPong = 3,
    MemoryScatterGather = 4,
    PeripheralScatterGather = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferConfig {
    pub mode: Mode,
    pub src_width: DataWidth,
    pub dst_width: DataWidth,
    pub src_incr: PtrIncrement,
    pub dst_incr: PtrIncrement,
    /// Rearbitrate after 2^n transfers, 0 to 10.
    pub arbitration: u8,
}

impl TransferConfig {
    /// Memory to peripheral, one byte at a time.
    pub const fn to_peripheral() -> TransferConfig {
        TransferConfig {
            mode: Mode::Basic,
            src_width: DataWidth::Width8Bit,
            dst_width: DataWidth::Width8Bit,
            src_incr: PtrIncrement::Incr8Bit,
            dst_incr: PtrIncrement::NoIncr,
            arbitration: 0,
        }
    }

    /// Peripheral to memory, one byte at a time.
    pub const fn from_peripheral() -> TransferConfig {
        TransferConfig {
            src_incr: PtrIncrement::NoIncr,
            dst_incr: PtrIncrement::Incr8Bit,
            ..TransferConfig::to_peripheral()
        }
    }
}

/// One transfer descriptor. The hardware reads the pointers as the address of
/// the last item, not the first.
#[repr(C, align(16))]
pub struct ChannelControl {
    pub src_end_ptr: InMemoryRegister<u32>,
    pub dst_end_ptr: InMemoryRegister<u32>,
    pub ctrl: InMemoryRegister<u32, DMA_CTRL::Register>,
    _unused: InMemoryRegister<u32>,
}

impl ChannelControl {
    pub const fn new() -> ChannelControl {
        ChannelControl {
            src_end_ptr: InMemoryRegister::new(0),
            dst_end_ptr: InMemoryRegister::new(0),
            ctrl: InMemoryRegister::new(0),
            _unused: InMemoryRegister::new(0),
        }
    }

    /// Fill the descriptor for `count` items from `src` to `dst`.
    pub fn configure(
        &self,
        config: &TransferConfig,
        src: u32,
        dst: u32,
        count: usize,
    ) -> Result<(), ErrorCode> {
        if count == 0 || config.src_width != config.dst_width {
            return Err(ErrorCode::INVAL);
        }
        if count > MAX_TRANSFERS_LEN {
            return Err(ErrorCode::SIZE);
        }
        if config.arbitration > 10 {
            return Err(ErrorCode::INVAL);
        }
        let last = (count - 1) as u32;
        self.src_end_ptr
            .set(src.wrapping_add(last * config.src_incr.bytes()));
        self.dst_end_ptr
            .set(dst.wrapping_add(last * config.dst_incr.bytes()));
        self.ctrl.write(
            DMA_CTRL::CYCLE_CTRL.val(config.mode as u32)
                + DMA_CTRL::N_MINUS_1.val(last)
                + DMA_CTRL::R_POWER.val(u32::from(config.arbitration))
                + DMA_CTRL::SRC_SIZE.val(config.src_width as u32)
                + DMA_CTRL::SRC_INC.val(config.src_incr as u32)
                + DMA_CTRL::DST_SIZE.val(config.dst_width as u32)
                + DMA_CTRL::DST_INC.val(config.dst_incr as u32),
        );
        Ok(())
    }

    /// Items still to be moved. The controller counts N_MINUS_1 down and sets
    /// the cycle type to stop when it is done.
    pub fn remaining(&self) -> usize {
        if self.ctrl.read(DMA_CTRL::CYCLE_CTRL) == 0 {
            0
        } else {
            self.ctrl.read(DMA_CTRL::N_MINUS_1) as usize + 1
        }
    }
}

impl Default for ChannelControl {
    fn default() -> Self {
        ChannelControl::new()
    }
}

/// Primary and alternate descriptors for every channel. With 8 channels the
/// alternate set starts 0x80 bytes after the primary one.
#[repr(C, align(1024))]
pub struct ControlTable {
    pub primary: [ChannelControl; AVAILABLE_DMA_CHANNELS],
    pub alternate: [ChannelControl; AVAILABLE_DMA_CHANNELS],
}

// The controller owns the table while a channel is enabled; software only
// touches a descriptor while its channel is disabled.
unsafe impl Sync for ControlTable {}

impl ControlTable {
    pub const fn new() -> ControlTable {
        ControlTable {
            primary: [const { ChannelControl::new() }; AVAILABLE_DMA_CHANNELS],
            alternate: [const { ChannelControl::new() }; AVAILABLE_DMA_CHANNELS],
        }
    }
}

impl Default for ControlTable {
    fn default() -> Self {
        ControlTable::new()
    }
}

/// Peripheral triggers that can be routed to a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    Reserved,
    EusciATx(u8),
    EusciARx(u8),
    /// eUSCI_B module and trigger index (I2C slave address 0 to 3)
    EusciBTx(u8, u8),
    EusciBRx(u8, u8),
    TimerACcr0(u8),
    TimerACcr2(u8),
    AesTrigger(u8),
    /// External DMAE0 pin
    ExternalPin,
    Adc14,
}

use TriggerSource as T;

#[rustfmt::skip]
const TRIGGER_MAP: [[TriggerSource; 8]; AVAILABLE_DMA_CHANNELS] = [
    [T::Reserved, T::EusciATx(0), T::EusciBTx(0, 0), T::EusciBTx(3, 1), T::EusciBTx(2, 2), T::EusciBTx(1, 3), T::TimerACcr0(0), T::AesTrigger(0)],
    [T::Reserved, T::EusciARx(0), T::EusciBRx(0, 0), T::EusciBRx(3, 1), T::EusciBRx(2, 2), T::EusciBRx(1, 3), T::TimerACcr2(0), T::AesTrigger(1)],
    [T::Reserved, T::EusciATx(1), T::EusciBTx(1, 0), T::EusciBTx(0, 1), T::EusciBTx(3, 2), T::EusciBTx(2, 3), T::TimerACcr0(1), T::AesTrigger(2)],
    [T::Reserved, T::EusciARx(1), T::EusciBRx(1, 0), T::EusciBRx(0, 1), T::EusciBRx(3, 2), T::EusciBRx(2, 3), T::TimerACcr2(1), T::Reserved],
    [T::Reserved, T::EusciATx(2), T::EusciBTx(2, 0), T::EusciBTx(1, 1), T::EusciBTx(0, 2), T::EusciBTx(3, 3), T::TimerACcr0(2), T::Reserved],
    [T::Reserved, T::EusciARx(2), T::EusciBRx(2, 0), T::EusciBRx(1, 1), T::EusciBRx(0, 2), T::EusciBRx(3, 3), T::TimerACcr2(2), T::Reserved],
    [T::Reserved, T::EusciATx(3), T::EusciBTx(3, 0), T::EusciBTx(2, 1), T::EusciBTx(1, 2), T::EusciBTx(0, 3), T::TimerACcr0(3), T::ExternalPin],
    [T::Reserved, T::EusciARx(3), T::EusciBRx(3, 0), T::EusciBRx(2, 1), T::EusciBRx(1, 2), T::EusciBRx(0, 3), T::TimerACcr2(3), T::Adc14],
];

/// The trigger that source `srccfg` selects on `channel`.
pub const fn trigger_source(channel: usize, srccfg: u8) -> Result<TriggerSource, ErrorCode> {
    if channel >= AVAILABLE_DMA_CHANNELS || srccfg > MAX_SRC_NR {
        return Err(ErrorCode::INVAL);
    }
    Ok(TRIGGER_MAP[channel][srccfg as usize])
}

/// The channel and source number that route `source`, if any.
pub fn find_trigger(source: TriggerSource) -> Option<(usize, u8)> {
    if source == TriggerSource::Reserved {
        return None;
    }
    TRIGGER_MAP.iter().enumerate().find_map(|(channel, row)| {
        row.iter()
            .position(|s| *s == source)
            .map(|src| (channel, src as u8))
    })
}

impl DmaControlRegisters {
    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "DMA");
        debug::write_register(writer, "STAT", offset_of!(DmaControlRegisters, stat), self.stat.get());
        debug::write_register(
            writer,
            "CTLBASE",
            offset_of!(DmaControlRegisters, ctlbase),
            self.ctlbase.get(),
        );
        debug::write_register(
            writer,
            "ENASET",
            offset_of!(DmaControlRegisters, enaset),
            self.enaset.get(),
        );
        debug::write_flag(writer, "bus error", self.errclr.is_set(ERRCLR::ERRCLR));
    }
}

/// The two register blocks of the controller together.
pub struct Dma {
    channels: StaticRef<DmaChannelRegisters>,
    control: StaticRef<DmaControlRegisters>,
}

impl Dma {
    pub const fn new(
        channels: StaticRef<DmaChannelRegisters>,
        control: StaticRef<DmaControlRegisters>,
    ) -> Dma {
        Dma { channels, control }
    }

    pub fn channel_registers(&self) -> &DmaChannelRegisters {
        &self.channels
    }

    pub fn control_registers(&self) -> &DmaControlRegisters {
        &self.control
    }

    /// Point the controller at `table` and switch it on.
    pub fn enable(&self, table: &'static ControlTable) {
        self.control
            .ctlbase
            .set(core::ptr::from_ref(table) as usize as u32);
        self.control.cfg.write(CFG::MASTEN::SET);
    }

    pub fn disable(&self) {
        self.control.cfg.write(CFG::MASTEN::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.control.stat.is_set(STAT::MASTEN)
    }

    fn check_channel(channel: usize) -> Result<u32, ErrorCode> {
        if channel < AVAILABLE_DMA_CHANNELS {
            Ok(1 << channel)
        } else {
            Err(ErrorCode::INVAL)
        }
    }

    /// Route peripheral trigger `src` (1 to 7) to `channel`.
    pub fn select_source(&self, channel: usize, src: u8) -> Result<(), ErrorCode> {
        Dma::check_channel(channel)?;
        if src > MAX_SRC_NR {
            return Err(ErrorCode::INVAL);
        }
        self.channels.ch_srccfg[channel].write(CH_SRCCFG::DMASRC.val(u32::from(src)));
        Ok(())
    }

    pub fn enable_channel(&self, channel: usize) -> Result<(), ErrorCode> {
        let bit = Dma::check_channel(channel)?;
        self.control.altclr.set(bit);
        self.control.enaset.set(bit);
        Ok(())
    }

    pub fn disable_channel(&self, channel: usize) -> Result<(), ErrorCode> {
        let bit = Dma::check_channel(channel)?;
        self.control.enaclr.set(bit);
        Ok(())
    }

    /// Start a channel without a peripheral request.
    pub fn software_trigger(&self, channel: usize) -> Result<(), ErrorCode> {
        let bit = Dma::check_channel(channel)?;
        self.channels.sw_chtrig.set(bit);
        Ok(())
    }

    /// Give `channel` a dedicated completion interrupt (DMA_INT1 to DMA_INT3).
    /// Channels without one report through DMA_INT0.
    pub fn route_interrupt(&self, line: usize, channel: usize) -> Result<(), ErrorCode> {
        Dma::check_channel(channel)?;
        let reg = match line {
            1 => &self.channels.int1_srccfg,
            2 => &self.channels.int2_srccfg,
            3 => &self.channels.int3_srccfg,
            _ => return Err(ErrorCode::INVAL),
        };
        reg.write(INT_SRCCFG::INT_SRC.val(channel as u32) + INT_SRCCFG::EN::SET);
        Ok(())
    }

    /// Channels that completed and are reported through DMA_INT0.
    pub fn completed_channels(&self) -> u32 {
        self.channels.int0_srcflg.get()
    }

    pub fn clear_completed(&self, channels: u32) {
        self.channels.int0_clrflg.set(channels);
    }

    pub fn bus_error(&self) -> bool {
        self.control.errclr.is_set(ERRCLR::ERRCLR)
    }

    pub fn clear_bus_error(&self) {
        self.control.errclr.write(ERRCLR::ERRCLR::SET);
    }
}

#[cfg(test)]
mod tests {
    use super::TriggerSource::*;
    use super::*;
    use crate::testing::{fake_block, peek, poke};
    use std::boxed::Box;
    use std::string::String;

    fn dma() -> Dma {
        Dma::new(fake_block(), fake_block())
    }

    #[test]
    fn layouts() {
        assert_eq!(core::mem::size_of::<DmaChannelRegisters>(), 0x118);
        assert_eq!(offset_of!(DmaChannelRegisters, ch_srccfg), 0x010);
        assert_eq!(offset_of!(DmaChannelRegisters, int1_srccfg), 0x100);
        assert_eq!(offset_of!(DmaChannelRegisters, int0_srcflg), 0x110);
        assert_eq!(offset_of!(DmaChannelRegisters, int0_clrflg), 0x114);
        assert_eq!(core::mem::size_of::<DmaControlRegisters>(), 0x50);
        assert_eq!(offset_of!(DmaControlRegisters, swreq), 0x14);
        assert_eq!(offset_of!(DmaControlRegisters, prioclr), 0x3C);
        assert_eq!(offset_of!(DmaControlRegisters, errclr), 0x4C);
        assert_eq!(DMA_CHANNEL_BASE.address(), 0x4000_E000);
        assert_eq!(DMA_CONTROL_BASE.address(), 0x4000_F000);
    }

    #[test]
    fn control_table_shape() {
        assert_eq!(core::mem::size_of::<ChannelControl>(), 16);
        assert_eq!(core::mem::align_of::<ControlTable>(), 1024);
        assert_eq!(offset_of!(ControlTable, alternate), 0x80);
    }

    #[test]
    fn table_descriptors_are_independent() {
        static TABLE: ControlTable = ControlTable::new();
        let config = TransferConfig::to_peripheral();
        assert_eq!(TABLE.primary[3].configure(&config, 0x2000_0000, 0x4000_100E, 4), Ok(()));
        assert_eq!(TABLE.primary[3].remaining(), 4);
        for (channel, desc) in TABLE.primary.iter().enumerate().filter(|(c, _)| *c != 3) {
            assert_eq!(desc.ctrl.get(), 0, "channel {}", channel);
        }
        assert!(TABLE.alternate.iter().all(|desc| desc.ctrl.get() == 0));
    }

    #[test]
    fn configure_to_peripheral() {
        let desc = ChannelControl::new();
        let result = desc.configure(&TransferConfig::to_peripheral(), 0x2000_0000, 0x4000_100E, 16);
        assert_eq!(result, Ok(()));
        assert_eq!(desc.src_end_ptr.get(), 0x2000_000F);
        assert_eq!(desc.dst_end_ptr.get(), 0x4000_100E);
        assert_eq!(desc.ctrl.get(), 0xC000_00F1);
        assert_eq!(desc.remaining(), 16);
    }

    #[test]
    fn configure_word_copy() {
        let desc = ChannelControl::new();
        let config = TransferConfig {
            mode: Mode::AutoRequest,
            src_width: DataWidth::Width32Bit,
            dst_width: DataWidth::Width32Bit,
            src_incr: PtrIncrement::Incr32Bit,
            dst_incr: PtrIncrement::Incr32Bit,
            arbitration: 2,
        };
        assert_eq!(desc.configure(&config, 0x2000_0100, 0x2000_0200, 4), Ok(()));
        assert_eq!(desc.src_end_ptr.get(), 0x2000_010C);
        assert_eq!(desc.dst_end_ptr.get(), 0x2000_020C);
        assert_eq!(desc.ctrl.read(DMA_CTRL::R_POWER), 2);
        assert_eq!(desc.ctrl.read(DMA_CTRL::N_MINUS_1), 3);
        assert_eq!(desc.ctrl.read(DMA_CTRL::SRC_SIZE), 2);
    }

    #[test]
    fn configure_rejects_bad_requests() {
        let desc = ChannelControl::new();
        let mut config = TransferConfig::from_peripheral();
        assert_eq!(desc.configure(&config, 0, 0, 0), Err(ErrorCode::INVAL));
        assert_eq!(desc.configure(&config, 0, 0, 1025), Err(ErrorCode::SIZE));
        assert_eq!(desc.configure(&config, 0, 0, 1024), Ok(()));
        config.dst_width = DataWidth::Width16Bit;
        assert_eq!(desc.configure(&config, 0, 0, 1), Err(ErrorCode::INVAL));
        config.dst_width = DataWidth::Width8Bit;
        config.arbitration = 11;
        assert_eq!(desc.configure(&config, 0, 0, 1), Err(ErrorCode::INVAL));
    }

    #[test]
    fn stopped_descriptor_has_nothing_left() {
        let desc = ChannelControl::new();
        desc.ctrl.write(DMA_CTRL::N_MINUS_1.val(7));
        assert_eq!(desc.remaining(), 0);
    }

    #[test]
    fn trigger_map() {
        assert_eq!(trigger_source(0, 1), Ok(EusciATx(0)));
        assert_eq!(trigger_source(1, 2), Ok(EusciBRx(0, 0)));
        assert_eq!(trigger_source(5, 6), Ok(TimerACcr2(2)));
        assert_eq!(trigger_source(6, 7), Ok(ExternalPin));
        assert_eq!(trigger_source(7, 7), Ok(Adc14));
        assert_eq!(trigger_source(3, 7), Ok(Reserved));
        assert_eq!(trigger_source(4, 0), Ok(Reserved));
        assert_eq!(trigger_source(8, 1), Err(ErrorCode::INVAL));
        assert_eq!(trigger_source(0, 8), Err(ErrorCode::INVAL));
    }

    #[test]
    fn every_trigger_appears_once() {
        for channel in 0..AVAILABLE_DMA_CHANNELS {
            for src in 1..=MAX_SRC_NR {
                let source = trigger_source(channel, src).unwrap();
                if source != Reserved {
                    assert_eq!(find_trigger(source), Some((channel, src)));
                }
            }
        }
        assert_eq!(find_trigger(Reserved), None);
        assert_eq!(find_trigger(EusciATx(4)), None);
    }

    #[test]
    fn channel_control() {
        let dma = dma();
        assert_eq!(dma.select_source(2, 4), Ok(()));
        assert_eq!(dma.channel_registers().ch_srccfg[2].get(), 4);
        assert_eq!(dma.select_source(2, 8), Err(ErrorCode::INVAL));
        assert_eq!(dma.enable_channel(2), Ok(()));
        assert_eq!(dma.control_registers().enaset.get(), 1 << 2);
        assert_eq!(peek::<_, u32>(&dma.control_registers().altclr), 1 << 2);
        assert_eq!(dma.disable_channel(9), Err(ErrorCode::INVAL));
        assert_eq!(dma.software_trigger(5), Ok(()));
        assert_eq!(dma.channel_registers().sw_chtrig.get(), 1 << 5);
    }

    #[test]
    fn interrupt_routing() {
        let dma = dma();
        assert_eq!(dma.route_interrupt(3, 6), Ok(()));
        assert_eq!(dma.channel_registers().int3_srccfg.get(), 0x26);
        assert_eq!(dma.route_interrupt(0, 6), Err(ErrorCode::INVAL));
        assert_eq!(dma.route_interrupt(1, 8), Err(ErrorCode::INVAL));

        poke(dma.channels, offset_of!(DmaChannelRegisters, int0_srcflg), 0x81u32);
        assert_eq!(dma.completed_channels(), 0x81);
        dma.clear_completed(0x01);
        assert_eq!(peek::<_, u32>(&dma.channel_registers().int0_clrflg), 0x01);
    }

    #[test]
    fn enable_points_at_table() {
        let dma = dma();
        let table: &'static ControlTable = Box::leak(Box::new(ControlTable::new()));
        dma.enable(table);
        assert_eq!(
            dma.control_registers().ctlbase.get(),
            core::ptr::from_ref(table) as usize as u32
        );
        assert_eq!(dma.control_registers().ctlbase.get() % 1024, 0);
        assert_eq!(peek::<_, u32>(&dma.control_registers().cfg), 1);
    }

    #[test]
    fn bus_error_and_dump() {
        let dma = dma();
        dma.clear_bus_error();
        assert!(dma.bus_error());
        let mut out = String::new();
        dma.control_registers().print_state(&mut out);
        assert!(out.contains("---| DMA |---"));
        assert!(out.contains("bus error"));
    }
}
