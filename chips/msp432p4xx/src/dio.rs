// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Digital I/O (DIO)
//!
//! Ports are wired in pairs: P1 and P2 share one 16-bit register set, as do
//! P3/P4, P5/P6, P7/P8 and P9/P10. The odd port is the low byte of every
//! 16-bit register and the even port the high byte. Each pair can be
//! accessed through two overlays at the same address:
//!
//! - [`PortPairRegisters`] for 16-bit accesses touching both ports,
//! - [`PortByteRegisters`] for 8-bit accesses to one port, selected by
//!   [`Lane`].
//!
//! PJ has no interrupt logic and only the first register group.

use crate::bitband::BitBandBit;
use crate::memory_map::DIO_BASE_ADDR;
use crate::registers::interfaces::{Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use crate::{ErrorCode, StaticRef};

pub const PINS_PER_PORT: usize = 8;

pub const DIO_PA_BASE_ADDR: usize = DIO_BASE_ADDR;
pub const DIO_PB_BASE_ADDR: usize = DIO_BASE_ADDR + 0x20;
pub const DIO_PC_BASE_ADDR: usize = DIO_BASE_ADDR + 0x40;
pub const DIO_PD_BASE_ADDR: usize = DIO_BASE_ADDR + 0x60;
pub const DIO_PE_BASE_ADDR: usize = DIO_BASE_ADDR + 0x80;
pub const DIO_PJ_BASE_ADDR: usize = DIO_BASE_ADDR + 0x120;

const PAIR_BASES: [usize; 5] = [
    DIO_PA_BASE_ADDR,
    DIO_PB_BASE_ADDR,
    DIO_PC_BASE_ADDR,
    DIO_PD_BASE_ADDR,
    DIO_PE_BASE_ADDR,
];

pub const PA_BASE: StaticRef<PortPairRegisters> =
    unsafe { StaticRef::new(DIO_PA_BASE_ADDR as *const PortPairRegisters) };
pub const PB_BASE: StaticRef<PortPairRegisters> =
    unsafe { StaticRef::new(DIO_PB_BASE_ADDR as *const PortPairRegisters) };
pub const PC_BASE: StaticRef<PortPairRegisters> =
    unsafe { StaticRef::new(DIO_PC_BASE_ADDR as *const PortPairRegisters) };
pub const PD_BASE: StaticRef<PortPairRegisters> =
    unsafe { StaticRef::new(DIO_PD_BASE_ADDR as *const PortPairRegisters) };
pub const PE_BASE: StaticRef<PortPairRegisters> =
    unsafe { StaticRef::new(DIO_PE_BASE_ADDR as *const PortPairRegisters) };
pub const PJ_BASE: StaticRef<PortJRegisters> =
    unsafe { StaticRef::new(DIO_PJ_BASE_ADDR as *const PortJRegisters) };

register_structs! {
    /// One port pair as 16-bit registers.
    pub PortPairRegisters {
        (0x00 => pub input: ReadOnly<u16, PAIR::Register>),
        (0x02 => pub out: ReadWrite<u16, PAIR::Register>),
        (0x04 => pub dir: ReadWrite<u16, PAIR::Register>),
        (0x06 => pub ren: ReadWrite<u16, PAIR::Register>),
        (0x08 => pub ds: ReadWrite<u16, PAIR::Register>),
        (0x0A => pub sel0: ReadWrite<u16, PAIR::Register>),
        (0x0C => pub sel1: ReadWrite<u16, PAIR::Register>),
        /// Interrupt vector of the odd port
        (0x0E => pub iv_odd: ReadOnly<u16>),
        (0x10 => _reserved0),
        (0x16 => pub selc: ReadWrite<u16, PAIR::Register>),
        (0x18 => pub ies: ReadWrite<u16, PAIR::Register>),
        (0x1A => pub ie: ReadWrite<u16, PAIR::Register>),
        (0x1C => pub ifg: ReadWrite<u16, PAIR::Register>),
        /// Interrupt vector of the even port
        (0x1E => pub iv_even: ReadOnly<u16>),
        (0x20 => @END),
    },

    /// The first seven registers of a port pair, one byte per port.
    pub PortLanes {
        (0x00 => pub input: [ReadOnly<u8, PIN::Register>; 2]),
        (0x02 => pub out: [ReadWrite<u8, PIN::Register>; 2]),
        (0x04 => pub dir: [ReadWrite<u8, PIN::Register>; 2]),
        (0x06 => pub ren: [ReadWrite<u8, PIN::Register>; 2]),
        (0x08 => pub ds: [ReadWrite<u8, PIN::Register>; 2]),
        (0x0A => pub sel0: [ReadWrite<u8, PIN::Register>; 2]),
        (0x0C => pub sel1: [ReadWrite<u8, PIN::Register>; 2]),
        (0x0E => @END),
    },

    /// One port pair as 8-bit registers.
    pub PortByteRegisters {
        (0x00 => pub lanes: PortLanes),
        (0x0E => pub iv_odd: ReadOnly<u16>),
        (0x10 => _reserved0),
        (0x16 => pub selc: [ReadWrite<u8, PIN::Register>; 2]),
        (0x18 => pub ies: [ReadWrite<u8, PIN::Register>; 2]),
        (0x1A => pub ie: [ReadWrite<u8, PIN::Register>; 2]),
        (0x1C => pub ifg: [ReadWrite<u8, PIN::Register>; 2]),
        (0x1E => pub iv_even: ReadOnly<u16>),
        (0x20 => @END),
    },

    /// Port J, which has no interrupt logic.
    pub PortJRegisters {
        (0x00 => pub lanes: PortLanes),
        (0x0E => _reserved0),
        (0x16 => pub selc: [ReadWrite<u8, PIN::Register>; 2]),
        (0x18 => @END),
    }
}

register_bitfields! [u8,
    pub PIN [
        PIN0 OFFSET(0) NUMBITS(1) [],
        PIN1 OFFSET(1) NUMBITS(1) [],
        PIN2 OFFSET(2) NUMBITS(1) [],
        PIN3 OFFSET(3) NUMBITS(1) [],
        PIN4 OFFSET(4) NUMBITS(1) [],
        PIN5 OFFSET(5) NUMBITS(1) [],
        PIN6 OFFSET(6) NUMBITS(1) [],
        PIN7 OFFSET(7) NUMBITS(1) []
    ]
];

register_bitfields! [u16,
    pub PAIR [
        /// P1, P3, P5, P7, P9
        ODD OFFSET(0) NUMBITS(8) [],
        /// P2, P4, P6, P8, P10
        EVEN OFFSET(8) NUMBITS(8) []
    ]
];

impl PortByteRegisters {
    /// Interrupt vector of one lane.
    pub fn interrupt_vector(&self, lane: Lane) -> u16 {
        match lane {
            Lane::Odd => self.iv_odd.get(),
            Lane::Even => self.iv_even.get(),
        }
    }
}

/// Which half of a port pair a port occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lane {
    /// Low byte: P1, P3, P5, P7, P9 and PJ
    Odd = 0,
    /// High byte: P2, P4, P6, P8, P10
    Even = 1,
}

impl Lane {
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn shift(self) -> u32 {
        8 * self as u32
    }

    /// The byte this lane occupies in a 16-bit pair value.
    pub const fn extract(self, pair: u16) -> u8 {
        (pair >> self.shift()) as u8
    }

    /// Replace this lane's byte in a 16-bit pair value.
    pub const fn insert(self, pair: u16, value: u8) -> u16 {
        (pair & !(0xFF << self.shift())) | ((value as u16) << self.shift())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
    P9,
    P10,
    PJ,
}

impl Port {
    pub const fn lane(self) -> Lane {
        match self {
            Port::P2 | Port::P4 | Port::P6 | Port::P8 | Port::P10 => Lane::Even,
            _ => Lane::Odd,
        }
    }

    pub const fn is_interruptible(self) -> bool {
        !matches!(self, Port::PJ)
    }

    /// Base address of the register group holding this port.
    pub const fn base_address(self) -> usize {
        match self {
            Port::PJ => DIO_PJ_BASE_ADDR,
            _ => PAIR_BASES[(self as usize) / 2],
        }
    }
}

/// SEL1:SEL0 function selection of one pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Gpio = 0,
    Primary = 1,
    Secondary = 2,
    Tertiary = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

#[derive(Clone, Copy)]
enum PortBlock {
    Pair(StaticRef<PortByteRegisters>),
    J(StaticRef<PortJRegisters>),
}

/// Byte-wide access to one port.
#[derive(Clone, Copy)]
pub struct DioPort {
    block: PortBlock,
    lane: Lane,
}

impl DioPort {
    /// The port at its fixed address.
    pub const fn new(port: Port) -> DioPort {
        let addr = port.base_address();
        match port {
            Port::PJ => DioPort::port_j(unsafe { StaticRef::new(addr as *const PortJRegisters) }),
            _ => DioPort::from_pair(
                unsafe { StaticRef::new(addr as *const PortByteRegisters) },
                port.lane(),
            ),
        }
    }

    pub const fn from_pair(base: StaticRef<PortByteRegisters>, lane: Lane) -> DioPort {
        DioPort {
            block: PortBlock::Pair(base),
            lane,
        }
    }

    pub const fn port_j(base: StaticRef<PortJRegisters>) -> DioPort {
        DioPort {
            block: PortBlock::J(base),
            lane: Lane::Odd,
        }
    }

    fn lanes(&self) -> &PortLanes {
        match &self.block {
            PortBlock::Pair(regs) => &regs.lanes,
            PortBlock::J(regs) => &regs.lanes,
        }
    }

    fn selc(&self) -> &ReadWrite<u8, PIN::Register> {
        match &self.block {
            PortBlock::Pair(regs) => &regs.selc[self.lane.index()],
            PortBlock::J(regs) => &regs.selc[self.lane.index()],
        }
    }

    fn interrupt_block(&self) -> Result<&PortByteRegisters, ErrorCode> {
        match &self.block {
            PortBlock::Pair(regs) => Ok(regs),
            PortBlock::J(_) => Err(ErrorCode::NOSUPPORT),
        }
    }

    fn check_pin(pin: usize) -> Result<(), ErrorCode> {
        if pin < PINS_PER_PORT {
            Ok(())
        } else {
            Err(ErrorCode::INVAL)
        }
    }

    pub fn input(&self) -> u8 {
        self.lanes().input[self.lane.index()].get()
    }

    pub fn output(&self) -> u8 {
        self.lanes().out[self.lane.index()].get()
    }

    pub fn set_output(&self, value: u8) {
        self.lanes().out[self.lane.index()].set(value);
    }

    pub fn set_pins(&self, pins: u8) {
        let out = &self.lanes().out[self.lane.index()];
        out.set(out.get() | pins);
    }

    pub fn clear_pins(&self, pins: u8) {
        let out = &self.lanes().out[self.lane.index()];
        out.set(out.get() & !pins);
    }

    pub fn toggle_pins(&self, pins: u8) {
        let out = &self.lanes().out[self.lane.index()];
        out.set(out.get() ^ pins);
    }

    pub fn set_direction(&self, pins: u8, direction: Direction) {
        let dir = &self.lanes().dir[self.lane.index()];
        match direction {
            Direction::Output => dir.set(dir.get() | pins),
            Direction::Input => dir.set(dir.get() & !pins),
        }
    }

    pub fn direction(&self, pin: usize) -> Result<Direction, ErrorCode> {
        DioPort::check_pin(pin)?;
        if self.lanes().dir[self.lane.index()].get() & (1 << pin) != 0 {
            Ok(Direction::Output)
        } else {
            Ok(Direction::Input)
        }
    }

    /// Pull resistors use OUT to choose between pull-up and pull-down.
    pub fn set_pull(&self, pins: u8, pull: Pull) {
        let lanes = self.lanes();
        let ren = &lanes.ren[self.lane.index()];
        match pull {
            Pull::None => ren.set(ren.get() & !pins),
            Pull::Up => {
                ren.set(ren.get() | pins);
                self.set_pins(pins);
            }
            Pull::Down => {
                ren.set(ren.get() | pins);
                self.clear_pins(pins);
            }
        }
    }

    pub fn set_high_drive(&self, pins: u8, high: bool) {
        let ds = &self.lanes().ds[self.lane.index()];
        if high {
            ds.set(ds.get() | pins);
        } else {
            ds.set(ds.get() & !pins);
        }
    }

    pub fn function_select(&self, pin: usize) -> Result<Function, ErrorCode> {
        DioPort::check_pin(pin)?;
        let lanes = self.lanes();
        let sel0 = (lanes.sel0[self.lane.index()].get() >> pin) & 1;
        let sel1 = (lanes.sel1[self.lane.index()].get() >> pin) & 1;
        Ok(match (sel1 << 1) | sel0 {
            0 => Function::Gpio,
            1 => Function::Primary,
            2 => Function::Secondary,
            _ => Function::Tertiary,
        })
    }

    /// Route `pins` to a module function. Pins whose SEL0 and SEL1 bits both
    /// change are switched through SELC so they never pass through an
    /// intermediate function.
    pub fn set_function(&self, pins: u8, function: Function) {
        let lanes = self.lanes();
        let sel0 = &lanes.sel0[self.lane.index()];
        let sel1 = &lanes.sel1[self.lane.index()];
        let want0 = if function as u8 & 1 != 0 { pins } else { 0 };
        let want1 = if function as u8 & 2 != 0 { pins } else { 0 };

        let flip0 = (sel0.get() ^ want0) & pins;
        let flip1 = (sel1.get() ^ want1) & pins;
        let both = flip0 & flip1;
        if both != 0 {
            self.selc().set(both);
        }
        if flip0 & !both != 0 {
            sel0.set(sel0.get() ^ (flip0 & !both));
        }
        if flip1 & !both != 0 {
            sel1.set(sel1.get() ^ (flip1 & !both));
        }
    }

    /// Bit-band handle for one output pin.
    pub fn output_bit(&self, pin: usize) -> Result<BitBandBit, ErrorCode> {
        DioPort::check_pin(pin)?;
        BitBandBit::for_register(&self.lanes().out[self.lane.index()], pin)
    }

    pub fn set_interrupt_edge(&self, pins: u8, edge: Edge) -> Result<(), ErrorCode> {
        let ies = &self.interrupt_block()?.ies[self.lane.index()];
        match edge {
            Edge::Rising => ies.set(ies.get() & !pins),
            Edge::Falling => ies.set(ies.get() | pins),
        }
        Ok(())
    }

    pub fn enable_interrupts(&self, pins: u8) -> Result<(), ErrorCode> {
        let ie = &self.interrupt_block()?.ie[self.lane.index()];
        ie.set(ie.get() | pins);
        Ok(())
    }

    pub fn disable_interrupts(&self, pins: u8) -> Result<(), ErrorCode> {
        let ie = &self.interrupt_block()?.ie[self.lane.index()];
        ie.set(ie.get() & !pins);
        Ok(())
    }

    pub fn interrupt_flags(&self) -> Result<u8, ErrorCode> {
        Ok(self.interrupt_block()?.ifg[self.lane.index()].get())
    }

    pub fn clear_interrupt_flags(&self, pins: u8) -> Result<(), ErrorCode> {
        let ifg = &self.interrupt_block()?.ifg[self.lane.index()];
        ifg.set(ifg.get() & !pins);
        Ok(())
    }

    /// Highest priority pending pin, decoded from PxIV. On hardware the read
    /// also clears that pin's flag.
    pub fn pending_interrupt(&self) -> Result<Option<usize>, ErrorCode> {
        let iv = self.interrupt_block()?.interrupt_vector(self.lane);
        match iv {
            0 => Ok(None),
            2..=0x10 if iv % 2 == 0 => Ok(Some(usize::from(iv / 2 - 1))),
            _ => Err(ErrorCode::FAIL),
        }
    }
}
