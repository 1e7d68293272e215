// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Port Mapping Controller (PMAP)
//!
//! Routes peripheral signals to the pins of the mappable ports. Every byte
//! register in a port block selects the function of one pin by `PM_*` ID.
//! The map can only be written while unlocked, and only once per reset unless
//! it was unlocked as reconfigurable.

use crate::memory_map::PMAP_BASE_ADDR;
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadWrite};
use crate::{ErrorCode, StaticRef};

pub const PMAP_BASE: StaticRef<PmapCommonRegisters> =
    unsafe { StaticRef::new(PMAP_BASE_ADDR as *const PmapCommonRegisters) };

/// Port blocks P1 to P7, one after the other.
pub const PMAP_PORTS_BASE: StaticRef<[PmapPortRegisters; PMAP_PORTS]> = unsafe {
    StaticRef::new((PMAP_BASE_ADDR + 0x08) as *const [PmapPortRegisters; PMAP_PORTS])
};

pub const PMAP_KEY_VAL: u16 = 0x2D52;

pub const PMAP_PORTS: usize = 7;

// Mapping IDs. Pairs sharing a value are the UART and SPI names of one signal.
pub const PM_NONE: u8 = 0;
pub const PM_UCA0CLK: u8 = 1;
pub const PM_UCA0RXD: u8 = 2;
pub const PM_UCA0SOMI: u8 = 2;
pub const PM_UCA0TXD: u8 = 3;
pub const PM_UCA0SIMO: u8 = 3;
pub const PM_UCB0CLK: u8 = 4;
pub const PM_UCB0SDA: u8 = 5;
pub const PM_UCB0SIMO: u8 = 5;
pub const PM_UCB0SCL: u8 = 6;
pub const PM_UCB0SOMI: u8 = 6;
pub const PM_UCA1STE: u8 = 7;
pub const PM_UCA1CLK: u8 = 8;
pub const PM_UCA1RXD: u8 = 9;
pub const PM_UCA1SOMI: u8 = 9;
pub const PM_UCA1TXD: u8 = 10;
pub const PM_UCA1SIMO: u8 = 10;
pub const PM_UCA2STE: u8 = 11;
pub const PM_UCA2CLK: u8 = 12;
pub const PM_UCA2RXD: u8 = 13;
pub const PM_UCA2SOMI: u8 = 13;
pub const PM_UCA2TXD: u8 = 14;
pub const PM_UCA2SIMO: u8 = 14;
pub const PM_UCB2STE: u8 = 15;
pub const PM_UCB2CLK: u8 = 16;
pub const PM_UCB2SDA: u8 = 17;
pub const PM_UCB2SIMO: u8 = 17;
pub const PM_UCB2SCL: u8 = 18;
pub const PM_UCB2SOMI: u8 = 18;
pub const PM_TA0CCR0A: u8 = 19;
pub const PM_TA0CCR1A: u8 = 20;
pub const PM_TA0CCR2A: u8 = 21;
pub const PM_TA0CCR3A: u8 = 22;
pub const PM_TA0CCR4A: u8 = 23;
pub const PM_TA1CCR1A: u8 = 24;
pub const PM_TA1CCR2A: u8 = 25;
pub const PM_TA1CCR3A: u8 = 26;
pub const PM_TA1CCR4A: u8 = 27;
pub const PM_TA0CLK: u8 = 28;
pub const PM_C0OUT: u8 = 28;
pub const PM_TA1CLK: u8 = 29;
pub const PM_C1OUT: u8 = 29;
pub const PM_DMAE0: u8 = 30;
pub const PM_SMCLK: u8 = 30;
/// Hands the pin to an analog function
pub const PM_ANALOG: u8 = 31;

register_structs! {
    pub PmapCommonRegisters {
        (0x00 => pub keyid: ReadWrite<u16>),
        (0x02 => pub ctl: ReadWrite<u16, CTL::Register>),
        (0x04 => _reserved0),
        (0x08 => @END),
    },

    pub PmapPortRegisters {
        (0x00 => pub map: [ReadWrite<u8>; 8]),
        (0x08 => @END),
    }
}

register_bitfields![u16,
    pub CTL [
        /// Read-only, cleared while the key is written
        PMAPLOCKED OFFSET(0) NUMBITS(1) [],
        /// Allow more than one configuration per reset
        PMAPRECFG OFFSET(1) NUMBITS(1) []
    ]
];

pub struct PortMapper {
    common: StaticRef<PmapCommonRegisters>,
    ports: StaticRef<[PmapPortRegisters; PMAP_PORTS]>,
}

impl PortMapper {
    pub const fn new(
        common: StaticRef<PmapCommonRegisters>,
        ports: StaticRef<[PmapPortRegisters; PMAP_PORTS]>,
    ) -> PortMapper {
        PortMapper { common, ports }
    }

    pub fn registers(&self) -> &PmapCommonRegisters {
        &self.common
    }

    /// Registers of port `port`, counted from 1.
    pub fn port(&self, port: usize) -> Result<&PmapPortRegisters, ErrorCode> {
        port.checked_sub(1)
            .and_then(|index| self.ports.get(index))
            .ok_or(ErrorCode::INVAL)
    }

    pub fn is_locked(&self) -> bool {
        self.common.ctl.is_set(CTL::PMAPLOCKED)
    }

    pub fn unlock(&self) {
        self.common.keyid.set(PMAP_KEY_VAL);
    }

    /// Any value but the key locks the controller again.
    pub fn lock(&self) {
        self.common.keyid.set(0);
    }

    /// Unlock, run `f`, and lock again. With `reconfigurable` the map may be
    /// written again after this call.
    pub fn with_unlocked<F, R>(&self, reconfigurable: bool, f: F) -> R
    where
        F: FnOnce(&PortMapper) -> R,
    {
        self.unlock();
        self.common
            .ctl
            .modify(CTL::PMAPRECFG.val(u16::from(reconfigurable)));
        let result = f(self);
        self.lock();
        result
    }

    /// Give pin `pin` of port `port` the function `id`.
    pub fn map(&self, port: usize, pin: usize, id: u8) -> Result<(), ErrorCode> {
        if id > PM_ANALOG {
            return Err(ErrorCode::INVAL);
        }
        let cell = self.port(port)?.map.get(pin).ok_or(ErrorCode::INVAL)?;
        cell.set(id);
        Ok(())
    }

    pub fn mapping(&self, port: usize, pin: usize) -> Result<u8, ErrorCode> {
        let cell = self.port(port)?.map.get(pin).ok_or(ErrorCode::INVAL)?;
        Ok(cell.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_block;
    use core::mem::{offset_of, size_of};

    fn mapper() -> PortMapper {
        PortMapper::new(fake_block(), fake_block())
    }

    #[test]
    fn layout() {
        assert_eq!(size_of::<PmapCommonRegisters>(), 0x08);
        assert_eq!(offset_of!(PmapCommonRegisters, ctl), 0x02);
        assert_eq!(size_of::<PmapPortRegisters>(), 0x08);
        assert_eq!(PMAP_BASE.address(), 0x4000_5000);
        assert_eq!(PMAP_PORTS_BASE.address(), 0x4000_5008);
        let p3 = PMAP_PORTS_BASE.address() + 2 * size_of::<PmapPortRegisters>();
        assert_eq!(p3, 0x4000_5018);
    }

    #[test]
    fn unlocked_section() {
        let pmap = mapper();
        let result = pmap.with_unlocked(true, |pmap| {
            assert_eq!(pmap.registers().keyid.get(), PMAP_KEY_VAL);
            pmap.map(2, 1, PM_TA0CCR1A)
        });
        assert_eq!(result, Ok(()));
        assert_eq!(pmap.registers().keyid.get(), 0);
        assert!(pmap.registers().ctl.is_set(CTL::PMAPRECFG));
        assert_eq!(pmap.port(2).unwrap().map[1].get(), 20);
        assert_eq!(pmap.mapping(2, 1), Ok(PM_TA0CCR1A));

        pmap.with_unlocked(false, |_| ());
        assert!(!pmap.registers().ctl.is_set(CTL::PMAPRECFG));
    }

    #[test]
    fn bad_coordinates() {
        let pmap = mapper();
        assert_eq!(pmap.map(0, 0, PM_NONE), Err(ErrorCode::INVAL));
        assert_eq!(pmap.map(8, 0, PM_NONE), Err(ErrorCode::INVAL));
        assert_eq!(pmap.map(7, 8, PM_NONE), Err(ErrorCode::INVAL));
        assert_eq!(pmap.map(7, 7, 32), Err(ErrorCode::INVAL));
        assert_eq!(pmap.map(7, 7, PM_ANALOG), Ok(()));
        assert_eq!(pmap.mapping(7, 7), Ok(31));
    }

    #[test]
    fn lock_state_comes_from_hardware() {
        let pmap = mapper();
        assert!(!pmap.is_locked());
        pmap.registers().ctl.set(1);
        assert!(pmap.is_locked());
    }
}
