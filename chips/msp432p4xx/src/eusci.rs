// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Enhanced Universal Serial Communication Interface (eUSCI)
//!
//! eUSCI_A modules do UART and SPI, eUSCI_B modules do I2C and SPI. The mode
//! is chosen by UCSYNC and UCMODE in CTLW0, and it changes the meaning of most
//! registers, so every mode gets its own overlay of the same memory. The SPI
//! views of A and B differ only in where STATW and the interrupt registers
//! sit; [`SpiRegisters`] hides that difference.

use core::fmt::Write;
use core::mem::offset_of;

use crate::debug;
use crate::memory_map::{
    EUSCI_A0_BASE_ADDR, EUSCI_A1_BASE_ADDR, EUSCI_A2_BASE_ADDR, EUSCI_A3_BASE_ADDR,
    EUSCI_B0_BASE_ADDR, EUSCI_B1_BASE_ADDR, EUSCI_B2_BASE_ADDR, EUSCI_B3_BASE_ADDR,
};
use crate::registers::interfaces::{ReadWriteable, Readable, Writeable};
use crate::registers::{register_bitfields, register_structs, ReadOnly, ReadWrite};
use crate::{ErrorCode, StaticRef};

pub const EUSCI_A0_BASE: StaticRef<EusciAUartRegisters> =
    unsafe { StaticRef::new(EUSCI_A0_BASE_ADDR as *const EusciAUartRegisters) };
pub const EUSCI_A1_BASE: StaticRef<EusciAUartRegisters> =
    unsafe { StaticRef::new(EUSCI_A1_BASE_ADDR as *const EusciAUartRegisters) };
pub const EUSCI_A2_BASE: StaticRef<EusciAUartRegisters> =
    unsafe { StaticRef::new(EUSCI_A2_BASE_ADDR as *const EusciAUartRegisters) };
pub const EUSCI_A3_BASE: StaticRef<EusciAUartRegisters> =
    unsafe { StaticRef::new(EUSCI_A3_BASE_ADDR as *const EusciAUartRegisters) };

pub const EUSCI_A0_SPI_BASE: StaticRef<EusciASpiRegisters> =
    unsafe { StaticRef::new(EUSCI_A0_BASE_ADDR as *const EusciASpiRegisters) };
pub const EUSCI_A1_SPI_BASE: StaticRef<EusciASpiRegisters> =
    unsafe { StaticRef::new(EUSCI_A1_BASE_ADDR as *const EusciASpiRegisters) };
pub const EUSCI_A2_SPI_BASE: StaticRef<EusciASpiRegisters> =
    unsafe { StaticRef::new(EUSCI_A2_BASE_ADDR as *const EusciASpiRegisters) };
pub const EUSCI_A3_SPI_BASE: StaticRef<EusciASpiRegisters> =
    unsafe { StaticRef::new(EUSCI_A3_BASE_ADDR as *const EusciASpiRegisters) };

pub const EUSCI_B0_BASE: StaticRef<EusciBI2cRegisters> =
    unsafe { StaticRef::new(EUSCI_B0_BASE_ADDR as *const EusciBI2cRegisters) };
pub const EUSCI_B1_BASE: StaticRef<EusciBI2cRegisters> =
    unsafe { StaticRef::new(EUSCI_B1_BASE_ADDR as *const EusciBI2cRegisters) };
pub const EUSCI_B2_BASE: StaticRef<EusciBI2cRegisters> =
    unsafe { StaticRef::new(EUSCI_B2_BASE_ADDR as *const EusciBI2cRegisters) };
pub const EUSCI_B3_BASE: StaticRef<EusciBI2cRegisters> =
    unsafe { StaticRef::new(EUSCI_B3_BASE_ADDR as *const EusciBI2cRegisters) };

pub const EUSCI_B0_SPI_BASE: StaticRef<EusciBSpiRegisters> =
    unsafe { StaticRef::new(EUSCI_B0_BASE_ADDR as *const EusciBSpiRegisters) };
pub const EUSCI_B1_SPI_BASE: StaticRef<EusciBSpiRegisters> =
    unsafe { StaticRef::new(EUSCI_B1_BASE_ADDR as *const EusciBSpiRegisters) };
pub const EUSCI_B2_SPI_BASE: StaticRef<EusciBSpiRegisters> =
    unsafe { StaticRef::new(EUSCI_B2_BASE_ADDR as *const EusciBSpiRegisters) };
pub const EUSCI_B3_SPI_BASE: StaticRef<EusciBSpiRegisters> =
    unsafe { StaticRef::new(EUSCI_B3_BASE_ADDR as *const EusciBSpiRegisters) };

register_structs! {
    /// eUSCI_A in UART mode
    pub EusciAUartRegisters {
        /// Control Word Register 0
        (0x00 => pub ctlw0: ReadWrite<u16, UCAxCTLW0::Register>),
        /// Control Word Register 1
        (0x02 => pub ctlw1: ReadWrite<u16, UCAxCTLW1::Register>),
        (0x04 => _reserved0),
        /// Baud Rate Control Word Register
        (0x06 => pub brw: ReadWrite<u16>),
        /// Modulation Control Word Register
        (0x08 => pub mctlw: ReadWrite<u16, UCAxMCTLW::Register>),
        /// Status Register
        (0x0A => pub statw: ReadWrite<u16, UCAxSTATW::Register>),
        /// Receive Buffer Register
        (0x0C => pub rxbuf: ReadOnly<u16>),
        /// Transmit Buffer Register
        (0x0E => pub txbuf: ReadWrite<u16>),
        /// Auto Baud Rate Control Register
        (0x10 => pub abctl: ReadWrite<u16, UCAxABCTL::Register>),
        /// IrDA Control Word Register
        (0x12 => pub irctl: ReadWrite<u16, UCAxIRCTL::Register>),
        (0x14 => _reserved1),
        /// Interrupt Enable Register
        (0x1A => pub ie: ReadWrite<u16, UCAxIE::Register>),
        /// Interrupt Flag Register
        (0x1C => pub ifg: ReadWrite<u16, UCAxIFG::Register>),
        /// Interrupt Vector Register
        (0x1E => pub iv: ReadOnly<u16>),
        (0x20 => @END),
    },

    /// eUSCI_A in SPI mode
    pub EusciASpiRegisters {
        (0x00 => pub ctlw0: ReadWrite<u16, UCSPIxCTLW0::Register>),
        (0x02 => _reserved0),
        (0x06 => pub brw: ReadWrite<u16>),
        (0x08 => _reserved1),
        (0x0A => pub statw: ReadWrite<u16, UCSPIxSTATW::Register>),
        (0x0C => pub rxbuf: ReadOnly<u16>),
        (0x0E => pub txbuf: ReadWrite<u16>),
        (0x10 => _reserved2),
        (0x1A => pub ie: ReadWrite<u16, UCSPIxIE::Register>),
        (0x1C => pub ifg: ReadWrite<u16, UCSPIxIFG::Register>),
        (0x1E => pub iv: ReadOnly<u16>),
        (0x20 => @END),
    },

    /// eUSCI_B in I2C mode
    pub EusciBI2cRegisters {
        /// Control Word Register 0
        (0x00 => pub ctlw0: ReadWrite<u16, UCBxCTLW0::Register>),
        /// Control Word Register 1
        (0x02 => pub ctlw1: ReadWrite<u16, UCBxCTLW1::Register>),
        (0x04 => _reserved0),
        /// Bit Rate Control Word Register
        (0x06 => pub brw: ReadWrite<u16>),
        /// Status Register
        (0x08 => pub statw: ReadOnly<u16, UCBxSTATW::Register>),
        /// Byte Counter Threshold Register
        (0x0A => pub tbcnt: ReadWrite<u16, UCBxTBCNT::Register>),
        /// Receive Buffer Register
        (0x0C => pub rxbuf: ReadOnly<u16>),
        /// Transmit Buffer Register
        (0x0E => pub txbuf: ReadWrite<u16>),
        (0x10 => _reserved1),
        /// Own Address 0 Register
        (0x14 => pub i2coa0: ReadWrite<u16, UCBxI2COA0::Register>),
        /// Own Address 1 to 3 Registers
        (0x16 => pub i2coa: [ReadWrite<u16, UCBxI2COA::Register>; 3]),
        /// Received Address Register
        (0x1C => pub addrx: ReadOnly<u16, UCBxADDR::Register>),
        /// Address Mask Register
        (0x1E => pub addmask: ReadWrite<u16, UCBxADDR::Register>),
        /// Slave Address Register
        (0x20 => pub i2csa: ReadWrite<u16, UCBxADDR::Register>),
        (0x22 => _reserved2),
        /// Interrupt Enable Register
        (0x2A => pub ie: ReadWrite<u16, UCBxIE::Register>),
        /// Interrupt Flag Register
        (0x2C => pub ifg: ReadWrite<u16, UCBxIFG::Register>),
        /// Interrupt Vector Register
        (0x2E => pub iv: ReadOnly<u16>),
        (0x30 => @END),
    },

    /// eUSCI_B in SPI mode
    pub EusciBSpiRegisters {
        (0x00 => pub ctlw0: ReadWrite<u16, UCSPIxCTLW0::Register>),
        (0x02 => _reserved0),
        (0x06 => pub brw: ReadWrite<u16>),
        (0x08 => pub statw: ReadWrite<u16, UCSPIxSTATW::Register>),
        (0x0A => _reserved1),
        (0x0C => pub rxbuf: ReadOnly<u16>),
        (0x0E => pub txbuf: ReadWrite<u16>),
        (0x10 => _reserved2),
        (0x2A => pub ie: ReadWrite<u16, UCSPIxIE::Register>),
        (0x2C => pub ifg: ReadWrite<u16, UCSPIxIFG::Register>),
        (0x2E => pub iv: ReadOnly<u16>),
        (0x30 => @END),
    }
}

register_bitfields![u16,
    pub UCAxCTLW0 [
        /// Software reset enable
        UCSWRST OFFSET(0) NUMBITS(1) [],
        /// Transmit break
        UCTXBRK OFFSET(1) NUMBITS(1) [],
        /// Transmit address
        UCTXADDR OFFSET(2) NUMBITS(1) [],
        /// Dormant
        UCDORM OFFSET(3) NUMBITS(1) [],
        /// Receive break character interrupt enable
        UCBRKIE OFFSET(4) NUMBITS(1) [],
        /// Receive erroneous-character interrupt enable
        UCRXEIE OFFSET(5) NUMBITS(1) [],
        UCSSEL OFFSET(6) NUMBITS(2) [
            UCLK = 0,
            ACLK = 1,
            SMCLK = 2
        ],
        /// Synchronous mode enable, clear for UART
        UCSYNC OFFSET(8) NUMBITS(1) [],
        UCMODE OFFSET(9) NUMBITS(2) [
            UARTMode = 0,
            IdleLineMultiprocessor = 1,
            AddressBitMultiprocessor = 2,
            AutomaticBaudRateDetection = 3
        ],
        /// Two stop bits
        UCSPB OFFSET(11) NUMBITS(1) [],
        /// 7-bit character length
        UC7BIT OFFSET(12) NUMBITS(1) [],
        /// MSB first
        UCMSB OFFSET(13) NUMBITS(1) [],
        /// Even parity
        UCPAR OFFSET(14) NUMBITS(1) [],
        /// Parity enable
        UCPEN OFFSET(15) NUMBITS(1) []
    ],
    pub UCAxCTLW1 [
        /// Deglitch time
        UCGLIT OFFSET(0) NUMBITS(2) [
            Approx2ns = 0,
            Approx50ns = 1,
            Approx100ns = 2,
            Approx200ns = 3
        ]
    ],
    pub UCAxMCTLW [
        /// Oversampling mode
        UCOS16 OFFSET(0) NUMBITS(1) [],
        /// First modulation stage
        UCBRF OFFSET(4) NUMBITS(4) [],
        /// Second modulation stage
        UCBRS OFFSET(8) NUMBITS(8) []
    ],
    pub UCAxSTATW [
        UCBUSY OFFSET(0) NUMBITS(1) [],
        /// Address received, or idle line detected
        UCADDR_UCIDLE OFFSET(1) NUMBITS(1) [],
        UCRXERR OFFSET(2) NUMBITS(1) [],
        UCBRK OFFSET(3) NUMBITS(1) [],
        UCPE OFFSET(4) NUMBITS(1) [],
        UCOE OFFSET(5) NUMBITS(1) [],
        UCFE OFFSET(6) NUMBITS(1) [],
        /// Loopback
        UCLISTEN OFFSET(7) NUMBITS(1) []
    ],
    pub UCAxABCTL [
        UCABDEN OFFSET(0) NUMBITS(1) [],
        /// Break time out
        UCBTOE OFFSET(2) NUMBITS(1) [],
        /// Synch field time out
        UCSTOE OFFSET(3) NUMBITS(1) [],
        /// Break/synch delimiter length
        UCDELIM OFFSET(4) NUMBITS(2) [
            Bits1 = 0,
            Bits2 = 1,
            Bits3 = 2,
            Bits4 = 3
        ]
    ],
    pub UCAxIRCTL [
        UCIREN OFFSET(0) NUMBITS(1) [],
        /// Use BITCLK16 for the IrDA transmit pulse
        UCIRTXCLK OFFSET(1) NUMBITS(1) [],
        /// Transmit pulse length
        UCIRTXPL OFFSET(2) NUMBITS(6) [],
        /// Receive filter enable
        UCIRRXFE OFFSET(8) NUMBITS(1) [],
        /// Receive input polarity
        UCIRRXPL OFFSET(9) NUMBITS(1) [],
        /// Receive filter length
        UCIRRXFL OFFSET(10) NUMBITS(4) []
    ],
    pub UCAxIE [
        UCRXIE OFFSET(0) NUMBITS(1) [],
        UCTXIE OFFSET(1) NUMBITS(1) [],
        /// Start bit
        UCSTTIE OFFSET(2) NUMBITS(1) [],
        /// Transmit complete
        UCTXCPTIE OFFSET(3) NUMBITS(1) []
    ],
    pub UCAxIFG [
        UCRXIFG OFFSET(0) NUMBITS(1) [],
        UCTXIFG OFFSET(1) NUMBITS(1) [],
        UCSTTIFG OFFSET(2) NUMBITS(1) [],
        UCTXCPTIFG OFFSET(3) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    pub UCSPIxCTLW0 [
        UCSWRST OFFSET(0) NUMBITS(1) [],
        /// STE pin drives the slave enable instead of acting as an input
        UCSTEM OFFSET(1) NUMBITS(1) [],
        UCSSEL OFFSET(6) NUMBITS(2) [
            UCLK = 0,
            ACLK = 1,
            SMCLK = 2
        ],
        /// Must be set for SPI
        UCSYNC OFFSET(8) NUMBITS(1) [],
        UCMODE OFFSET(9) NUMBITS(2) [
            ThreePinSPI = 0,
            FourPinSPI1Enabled = 1,
            FourPinSPI0Enabled = 2
        ],
        UCMST OFFSET(11) NUMBITS(1) [],
        UC7BIT OFFSET(12) NUMBITS(1) [],
        UCMSB OFFSET(13) NUMBITS(1) [],
        /// Clock polarity, set for inactive high
        UCCKPL OFFSET(14) NUMBITS(1) [],
        /// Clock phase, set to capture on the first edge
        UCCKPH OFFSET(15) NUMBITS(1) []
    ],
    pub UCSPIxSTATW [
        UCBUSY OFFSET(0) NUMBITS(1) [],
        UCOE OFFSET(5) NUMBITS(1) [],
        /// Bus conflict in 4-wire master mode
        UCFE OFFSET(6) NUMBITS(1) [],
        UCLISTEN OFFSET(7) NUMBITS(1) []
    ],
    pub UCSPIxIE [
        UCRXIE OFFSET(0) NUMBITS(1) [],
        UCTXIE OFFSET(1) NUMBITS(1) []
    ],
    pub UCSPIxIFG [
        UCRXIFG OFFSET(0) NUMBITS(1) [],
        UCTXIFG OFFSET(1) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    pub UCBxCTLW0 [
        UCSWRST OFFSET(0) NUMBITS(1) [],
        /// Generate a (repeated) START
        UCTXSTT OFFSET(1) NUMBITS(1) [],
        /// Generate a STOP
        UCTXSTP OFFSET(2) NUMBITS(1) [],
        /// Send a NACK in slave receiver mode
        UCTXNACK OFFSET(3) NUMBITS(1) [],
        /// Transmitter
        UCTR OFFSET(4) NUMBITS(1) [],
        /// Acknowledge the slave address
        UCTXACK OFFSET(5) NUMBITS(1) [],
        UCSSEL OFFSET(6) NUMBITS(2) [
            UCLKI = 0,
            ACLK = 1,
            SMCLK = 2
        ],
        UCSYNC OFFSET(8) NUMBITS(1) [],
        UCMODE OFFSET(9) NUMBITS(2) [
            ThreePinSPI = 0,
            FourPinSPI1Enabled = 1,
            FourPinSPI0Enabled = 2,
            I2CMode = 3
        ],
        UCMST OFFSET(11) NUMBITS(1) [
            SlaveMode = 0,
            MasterMode = 1
        ],
        UCMM OFFSET(13) NUMBITS(1) [
            SingleMasterEnvironment = 0,
            MultiMasterEnvironment = 1
        ],
        UCSLA10 OFFSET(14) NUMBITS(1) [
            AddressSlaveWith7BitAddress = 0,
            AddressSlaveWith10BitAddress = 1
        ],
        /// Own address is 10 bits
        UCA10 OFFSET(15) NUMBITS(1) []
    ],
    pub UCBxCTLW1 [
        UCGLIT OFFSET(0) NUMBITS(2) [
            Max50ns = 0,
            Max25ns = 1,
            Max12_5ns = 2,
            Max6_25ns = 3
        ],
        /// Automatic STOP generation
        UCASTP OFFSET(2) NUMBITS(2) [
            NoAutomaticStop = 0,
            ByteCounterInterrupt = 1,
            StopAfterByteCounter = 2
        ],
        UCSWACK OFFSET(4) NUMBITS(1) [
            HardwareTriggered = 0,
            SoftwareTriggered = 1
        ],
        UCSTPNACK OFFSET(5) NUMBITS(1) [
            AckBeforeStop = 0,
            NackBeforeStop = 1
        ],
        /// Clock low timeout
        UCCLTO OFFSET(6) NUMBITS(2) [
            Disabled = 0,
            Cycles165000 = 1,
            Cycles195000 = 2,
            Cycles225000 = 3
        ],
        /// Early UCTXIFG0 in slave mode
        UCETXINT OFFSET(8) NUMBITS(1) []
    ],
    pub UCBxSTATW [
        /// Bus busy
        UCBBUSY OFFSET(4) NUMBITS(1) [],
        /// General call address received
        UCGC OFFSET(5) NUMBITS(1) [],
        /// SCL held low
        UCSCLLOW OFFSET(6) NUMBITS(1) [],
        /// Bytes received or transmitted since the last START
        UCBCNT OFFSET(8) NUMBITS(8) []
    ],
    pub UCBxTBCNT [
        UCTBCNT OFFSET(0) NUMBITS(8) []
    ],
    pub UCBxI2COA0 [
        I2COA OFFSET(0) NUMBITS(10) [],
        UCOAEN OFFSET(10) NUMBITS(1) [],
        /// Respond to the general call address
        UCGCEN OFFSET(15) NUMBITS(1) []
    ],
    pub UCBxI2COA [
        I2COA OFFSET(0) NUMBITS(10) [],
        UCOAEN OFFSET(10) NUMBITS(1) []
    ],
    pub UCBxADDR [
        ADDR OFFSET(0) NUMBITS(10) []
    ],
    pub UCBxIE [
        UCRXIE0 OFFSET(0) NUMBITS(1) [],
        UCTXIE0 OFFSET(1) NUMBITS(1) [],
        UCSTTIE OFFSET(2) NUMBITS(1) [],
        UCSTPIE OFFSET(3) NUMBITS(1) [],
        UCNACKIE OFFSET(4) NUMBITS(1) [],
        /// Arbitration lost
        UCALIE OFFSET(5) NUMBITS(1) [],
        UCRXIE1 OFFSET(6) NUMBITS(1) [],
        UCTXIE1 OFFSET(7) NUMBITS(1) [],
        UCRXIE2 OFFSET(8) NUMBITS(1) [],
        UCTXIE2 OFFSET(9) NUMBITS(1) [],
        UCRXIE3 OFFSET(10) NUMBITS(1) [],
        UCTXIE3 OFFSET(11) NUMBITS(1) [],
        /// Byte counter
        UCBCNTIE OFFSET(12) NUMBITS(1) [],
        /// Clock low timeout
        UCCLTOIE OFFSET(13) NUMBITS(1) [],
        /// Ninth bit position
        UCBIT9IE OFFSET(14) NUMBITS(1) []
    ],
    pub UCBxIFG [
        UCRXIFG0 OFFSET(0) NUMBITS(1) [],
        UCTXIFG0 OFFSET(1) NUMBITS(1) [],
        UCSTTIFG OFFSET(2) NUMBITS(1) [],
        UCSTPIFG OFFSET(3) NUMBITS(1) [],
        UCNACKIFG OFFSET(4) NUMBITS(1) [],
        UCALIFG OFFSET(5) NUMBITS(1) [],
        UCRXIFG1 OFFSET(6) NUMBITS(1) [],
        UCTXIFG1 OFFSET(7) NUMBITS(1) [],
        UCRXIFG2 OFFSET(8) NUMBITS(1) [],
        UCTXIFG2 OFFSET(9) NUMBITS(1) [],
        UCRXIFG3 OFFSET(10) NUMBITS(1) [],
        UCTXIFG3 OFFSET(11) NUMBITS(1) [],
        UCBCNTIFG OFFSET(12) NUMBITS(1) [],
        UCCLTOIFG OFFSET(13) NUMBITS(1) [],
        UCBIT9IFG OFFSET(14) NUMBITS(1) []
    ]
];

/// The registers the two SPI views have in common.
pub trait SpiRegisters {
    fn ctlw0(&self) -> &ReadWrite<u16, UCSPIxCTLW0::Register>;
    fn brw(&self) -> &ReadWrite<u16>;
    fn statw(&self) -> &ReadWrite<u16, UCSPIxSTATW::Register>;
    fn rxbuf(&self) -> &ReadOnly<u16>;
    fn txbuf(&self) -> &ReadWrite<u16>;
    fn ie(&self) -> &ReadWrite<u16, UCSPIxIE::Register>;
    fn ifg(&self) -> &ReadWrite<u16, UCSPIxIFG::Register>;
    fn iv(&self) -> &ReadOnly<u16>;

    fn pending_interrupt(&self) -> Option<SpiInterrupt> {
        SpiInterrupt::decode(self.iv().get())
    }
}

macro_rules! spi_registers {
    ($name:ident) => {
        impl SpiRegisters for $name {
            fn ctlw0(&self) -> &ReadWrite<u16, UCSPIxCTLW0::Register> {
                &self.ctlw0
            }

            fn brw(&self) -> &ReadWrite<u16> {
                &self.brw
            }

            fn statw(&self) -> &ReadWrite<u16, UCSPIxSTATW::Register> {
                &self.statw
            }

            fn rxbuf(&self) -> &ReadOnly<u16> {
                &self.rxbuf
            }

            fn txbuf(&self) -> &ReadWrite<u16> {
                &self.txbuf
            }

            fn ie(&self) -> &ReadWrite<u16, UCSPIxIE::Register> {
                &self.ie
            }

            fn ifg(&self) -> &ReadWrite<u16, UCSPIxIFG::Register> {
                &self.ifg
            }

            fn iv(&self) -> &ReadOnly<u16> {
                &self.iv
            }
        }
    };
}

spi_registers!(EusciASpiRegisters);
spi_registers!(EusciBSpiRegisters);

/// Second modulation stage settings, indexed by the fractional part of
/// clock / baud in units of 1/10000.
#[rustfmt::skip]
const BAUD_FRACTIONS: [(u32, u8); 36] = [
    (0, 0x00), (529, 0x01), (715, 0x02), (835, 0x04),
    (1001, 0x08), (1252, 0x10), (1430, 0x20), (1670, 0x11),
    (2147, 0x21), (2224, 0x22), (2503, 0x44), (3000, 0x25),
    (3335, 0x49), (3575, 0x4A), (3753, 0x52), (4003, 0x92),
    (4286, 0x53), (4378, 0x55), (5002, 0xAA), (5715, 0x6B),
    (6003, 0xAD), (6254, 0xB5), (6432, 0xB6), (6667, 0xD6),
    (7001, 0xB7), (7147, 0xBB), (7503, 0xDD), (7861, 0xED),
    (8004, 0xEE), (8333, 0xBF), (8464, 0xDF), (8572, 0xEF),
    (8751, 0xF7), (9004, 0xFB), (9170, 0xFD), (9288, 0xFE),
];

/// Divider and modulation settings for one UART baud rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartBaudConfig {
    pub brw: u16,
    pub brf: u8,
    pub brs: u8,
    pub oversampling: bool,
}

impl UartBaudConfig {
    /// Settings for `baud` from a BRCLK of `clock_hz`.
    pub fn compute(clock_hz: u32, baud: u32) -> Result<UartBaudConfig, ErrorCode> {
        if baud == 0 || clock_hz < baud {
            return Err(ErrorCode::INVAL);
        }
        let n = clock_hz / baud;
        let frac = (u64::from(clock_hz % baud) * 10_000 / u64::from(baud)) as u32;

        // The next smaller table entry, not the closest one.
        let mut brs = BAUD_FRACTIONS[0].1;
        for &(threshold, value) in BAUD_FRACTIONS.iter() {
            if threshold > frac {
                break;
            }
            brs = value;
        }

        let oversampling = n >= 16;
        let (brw, brf) = if oversampling {
            (n / 16, (n % 16) as u8)
        } else {
            (n, 0)
        };
        let brw = u16::try_from(brw).map_err(|_| ErrorCode::INVAL)?;

        Ok(UartBaudConfig {
            brw,
            brf,
            brs,
            oversampling,
        })
    }

    /// The value for MCTLW.
    pub fn mctlw(&self) -> u16 {
        (UCAxMCTLW::UCOS16.val(u16::from(self.oversampling))
            + UCAxMCTLW::UCBRF.val(u16::from(self.brf))
            + UCAxMCTLW::UCBRS.val(u16::from(self.brs)))
        .value
    }

    /// Program BRW and MCTLW. The module has to be held in reset.
    pub fn apply(&self, registers: &EusciAUartRegisters) -> Result<(), ErrorCode> {
        if !registers.ctlw0.is_set(UCAxCTLW0::UCSWRST) {
            return Err(ErrorCode::BUSY);
        }
        registers.brw.set(self.brw);
        registers.mctlw.set(self.mctlw());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UartInterrupt {
    None,
    Receive,
    Transmit,
    StartBit,
    TransmitComplete,
}

impl UartInterrupt {
    pub const fn decode(iv: u16) -> Option<UartInterrupt> {
        Some(match iv {
            0x00 => UartInterrupt::None,
            0x02 => UartInterrupt::Receive,
            0x04 => UartInterrupt::Transmit,
            0x06 => UartInterrupt::StartBit,
            0x08 => UartInterrupt::TransmitComplete,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiInterrupt {
    None,
    Receive,
    Transmit,
}

impl SpiInterrupt {
    pub const fn decode(iv: u16) -> Option<SpiInterrupt> {
        Some(match iv {
            0x00 => SpiInterrupt::None,
            0x02 => SpiInterrupt::Receive,
            0x04 => SpiInterrupt::Transmit,
            _ => return None,
        })
    }
}

/// I2C interrupt sources, highest priority first. Receive and transmit carry
/// the own-address slot (0 to 3) they belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum I2cInterrupt {
    None,
    ArbitrationLost,
    Nack,
    Start,
    Stop,
    Receive(u8),
    Transmit(u8),
    ByteCount,
    ClockLowTimeout,
    NinthBit,
}

impl I2cInterrupt {
    pub const fn decode(iv: u16) -> Option<I2cInterrupt> {
        Some(match iv {
            0x00 => I2cInterrupt::None,
            0x02 => I2cInterrupt::ArbitrationLost,
            0x04 => I2cInterrupt::Nack,
            0x06 => I2cInterrupt::Start,
            0x08 => I2cInterrupt::Stop,
            // 0x0A is slot 3 receive, 0x18 slot 0 transmit
            0x0A..=0x18 if iv % 4 == 2 => I2cInterrupt::Receive(3 - ((iv - 0x0A) / 4) as u8),
            0x0C..=0x18 if iv % 4 == 0 => I2cInterrupt::Transmit(3 - ((iv - 0x0C) / 4) as u8),
            0x1A => I2cInterrupt::ByteCount,
            0x1C => I2cInterrupt::ClockLowTimeout,
            0x1E => I2cInterrupt::NinthBit,
            _ => return None,
        })
    }
}

impl EusciAUartRegisters {
    pub fn pending_interrupt(&self) -> Option<UartInterrupt> {
        UartInterrupt::decode(self.iv.get())
    }

    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "eUSCI_A UART");
        debug::write_register(
            writer,
            "CTLW0",
            offset_of!(EusciAUartRegisters, ctlw0),
            self.ctlw0.get().into(),
        );
        debug::write_register(writer, "BRW", offset_of!(EusciAUartRegisters, brw), self.brw.get().into());
        debug::write_register(
            writer,
            "MCTLW",
            offset_of!(EusciAUartRegisters, mctlw),
            self.mctlw.get().into(),
        );
        debug::write_register(
            writer,
            "STATW",
            offset_of!(EusciAUartRegisters, statw),
            self.statw.get().into(),
        );
        debug::write_flag(writer, "in reset", self.ctlw0.is_set(UCAxCTLW0::UCSWRST));
        debug::write_flag(writer, "busy", self.statw.is_set(UCAxSTATW::UCBUSY));
        debug::write_flag(writer, "overrun", self.statw.is_set(UCAxSTATW::UCOE));
        debug::write_flag(writer, "framing error", self.statw.is_set(UCAxSTATW::UCFE));
    }
}

impl EusciBI2cRegisters {
    pub fn pending_interrupt(&self) -> Option<I2cInterrupt> {
        I2cInterrupt::decode(self.iv.get())
    }

    /// Address the next master transfer to the 7-bit `address`.
    pub fn set_slave_address(&self, address: u8) -> Result<(), ErrorCode> {
        if address > 0x7F {
            return Err(ErrorCode::INVAL);
        }
        self.ctlw0
            .modify(UCBxCTLW0::UCSLA10::AddressSlaveWith7BitAddress);
        self.i2csa.write(UCBxADDR::ADDR.val(u16::from(address)));
        Ok(())
    }

    pub fn print_state(&self, writer: &mut dyn Write) {
        debug::write_header(writer, "eUSCI_B I2C");
        debug::write_register(
            writer,
            "CTLW0",
            offset_of!(EusciBI2cRegisters, ctlw0),
            self.ctlw0.get().into(),
        );
        debug::write_register(
            writer,
            "STATW",
            offset_of!(EusciBI2cRegisters, statw),
            self.statw.get().into(),
        );
        debug::write_register(
            writer,
            "I2CSA",
            offset_of!(EusciBI2cRegisters, i2csa),
            self.i2csa.get().into(),
        );
        debug::write_register(writer, "IFG", offset_of!(EusciBI2cRegisters, ifg), self.ifg.get().into());
        debug::write_flag(writer, "bus busy", self.statw.is_set(UCBxSTATW::UCBBUSY));
        debug::write_flag(writer, "SCL low", self.statw.is_set(UCBxSTATW::UCSCLLOW));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fake_block, poke};
    use std::string::String;

    #[test]
    fn uart_layout() {
        assert_eq!(core::mem::size_of::<EusciAUartRegisters>(), 0x20);
        assert_eq!(offset_of!(EusciAUartRegisters, brw), 0x06);
        assert_eq!(offset_of!(EusciAUartRegisters, mctlw), 0x08);
        assert_eq!(offset_of!(EusciAUartRegisters, abctl), 0x10);
        assert_eq!(offset_of!(EusciAUartRegisters, irctl), 0x12);
        assert_eq!(offset_of!(EusciAUartRegisters, ie), 0x1A);
        assert_eq!(offset_of!(EusciAUartRegisters, iv), 0x1E);
    }

    #[test]
    fn spi_layouts() {
        assert_eq!(core::mem::size_of::<EusciASpiRegisters>(), 0x20);
        assert_eq!(offset_of!(EusciASpiRegisters, statw), 0x0A);
        assert_eq!(offset_of!(EusciASpiRegisters, ifg), 0x1C);
        assert_eq!(core::mem::size_of::<EusciBSpiRegisters>(), 0x30);
        assert_eq!(offset_of!(EusciBSpiRegisters, statw), 0x08);
        assert_eq!(offset_of!(EusciBSpiRegisters, ie), 0x2A);
        assert_eq!(offset_of!(EusciBSpiRegisters, iv), 0x2E);
    }

    #[test]
    fn i2c_layout() {
        assert_eq!(core::mem::size_of::<EusciBI2cRegisters>(), 0x30);
        assert_eq!(offset_of!(EusciBI2cRegisters, statw), 0x08);
        assert_eq!(offset_of!(EusciBI2cRegisters, tbcnt), 0x0A);
        assert_eq!(offset_of!(EusciBI2cRegisters, i2coa0), 0x14);
        assert_eq!(offset_of!(EusciBI2cRegisters, i2coa), 0x16);
        assert_eq!(offset_of!(EusciBI2cRegisters, addrx), 0x1C);
        assert_eq!(offset_of!(EusciBI2cRegisters, addmask), 0x1E);
        assert_eq!(offset_of!(EusciBI2cRegisters, i2csa), 0x20);
        assert_eq!(offset_of!(EusciBI2cRegisters, ie), 0x2A);
        assert_eq!(offset_of!(EusciBI2cRegisters, iv), 0x2E);
    }

    #[test]
    fn instance_addresses() {
        assert_eq!(EUSCI_A0_BASE.address(), 0x4000_1000);
        assert_eq!(EUSCI_A3_SPI_BASE.address(), 0x4000_1C00);
        assert_eq!(EUSCI_B0_BASE.address(), 0x4000_2000);
        assert_eq!(EUSCI_B2_SPI_BASE.address(), 0x4000_2800);
        assert_eq!(EUSCI_B3_BASE.address(), 0x4000_2C00);
    }

    #[test]
    fn field_encodings() {
        assert_eq!(UCAxCTLW0::UCSSEL::SMCLK.value, 0x0080);
        assert_eq!(UCAxCTLW0::UCPEN::SET.value, 0x8000);
        assert_eq!(UCSPIxCTLW0::UCMODE::FourPinSPI0Enabled.value, 0x0400);
        assert_eq!(UCBxCTLW0::UCMODE::I2CMode.value, 0x0600);
        assert_eq!(UCBxCTLW0::UCSLA10::AddressSlaveWith10BitAddress.value, 0x4000);
        assert_eq!(UCBxCTLW1::UCASTP::StopAfterByteCounter.value, 0x0008);
        assert_eq!(UCBxIE::UCNACKIE::SET.value, 0x0010);
    }

    #[test]
    fn baud_with_oversampling() {
        assert_eq!(
            UartBaudConfig::compute(12_000_000, 9600),
            Ok(UartBaudConfig {
                brw: 78,
                brf: 2,
                brs: 0x00,
                oversampling: true
            })
        );
        assert_eq!(
            UartBaudConfig::compute(12_000_000, 115_200),
            Ok(UartBaudConfig {
                brw: 6,
                brf: 8,
                brs: 0x20,
                oversampling: true
            })
        );
        assert_eq!(
            UartBaudConfig::compute(3_000_000, 115_200),
            Ok(UartBaudConfig {
                brw: 1,
                brf: 10,
                brs: 0x00,
                oversampling: true
            })
        );
    }

    #[test]
    fn baud_without_oversampling() {
        let config = UartBaudConfig::compute(32_768, 9600).unwrap();
        assert_eq!(
            config,
            UartBaudConfig {
                brw: 3,
                brf: 0,
                brs: 0x92,
                oversampling: false
            }
        );
        assert_eq!(config.mctlw(), 0x9200);
    }

    #[test]
    fn baud_rejects_impossible_rates() {
        assert_eq!(UartBaudConfig::compute(12_000_000, 0), Err(ErrorCode::INVAL));
        assert_eq!(UartBaudConfig::compute(9600, 115_200), Err(ErrorCode::INVAL));
    }

    #[test]
    fn apply_needs_reset() {
        let regs = fake_block::<EusciAUartRegisters>();
        let config = UartBaudConfig::compute(12_000_000, 9600).unwrap();
        assert_eq!(config.apply(&regs), Err(ErrorCode::BUSY));
        regs.ctlw0.write(UCAxCTLW0::UCSWRST::SET);
        assert_eq!(config.apply(&regs), Ok(()));
        assert_eq!(regs.brw.get(), 78);
        assert_eq!(regs.mctlw.get(), 0x0021);
    }

    #[test]
    fn uart_and_spi_vectors() {
        assert_eq!(UartInterrupt::decode(0x02), Some(UartInterrupt::Receive));
        assert_eq!(UartInterrupt::decode(0x08), Some(UartInterrupt::TransmitComplete));
        assert_eq!(UartInterrupt::decode(0x0A), None);
        assert_eq!(SpiInterrupt::decode(0x04), Some(SpiInterrupt::Transmit));
        assert_eq!(SpiInterrupt::decode(0x06), None);
    }

    #[test]
    fn i2c_vectors() {
        assert_eq!(I2cInterrupt::decode(0x02), Some(I2cInterrupt::ArbitrationLost));
        assert_eq!(I2cInterrupt::decode(0x08), Some(I2cInterrupt::Stop));
        assert_eq!(I2cInterrupt::decode(0x0A), Some(I2cInterrupt::Receive(3)));
        assert_eq!(I2cInterrupt::decode(0x0C), Some(I2cInterrupt::Transmit(3)));
        assert_eq!(I2cInterrupt::decode(0x12), Some(I2cInterrupt::Receive(1)));
        assert_eq!(I2cInterrupt::decode(0x16), Some(I2cInterrupt::Receive(0)));
        assert_eq!(I2cInterrupt::decode(0x18), Some(I2cInterrupt::Transmit(0)));
        assert_eq!(I2cInterrupt::decode(0x1E), Some(I2cInterrupt::NinthBit));
        assert_eq!(I2cInterrupt::decode(0x20), None);
        assert_eq!(I2cInterrupt::decode(0x03), None);
    }

    #[test]
    fn spi_views_share_access() {
        fn busy<S: SpiRegisters>(regs: &S) -> bool {
            regs.statw().is_set(UCSPIxSTATW::UCBUSY)
        }
        let a = fake_block::<EusciASpiRegisters>();
        let b = fake_block::<EusciBSpiRegisters>();
        poke(a, offset_of!(EusciASpiRegisters, statw), 0x0001u16);
        assert!(busy(&*a));
        assert!(!busy(&*b));
        poke(b, offset_of!(EusciBSpiRegisters, iv), 0x0002u16);
        assert_eq!(b.pending_interrupt(), Some(SpiInterrupt::Receive));
    }

    #[test]
    fn slave_address() {
        let regs = fake_block::<EusciBI2cRegisters>();
        regs.ctlw0.write(UCBxCTLW0::UCSLA10::AddressSlaveWith10BitAddress);
        assert_eq!(regs.set_slave_address(0x48), Ok(()));
        assert_eq!(regs.i2csa.get(), 0x48);
        assert_eq!(regs.ctlw0.get(), 0);
        assert_eq!(regs.set_slave_address(0x80), Err(ErrorCode::INVAL));
    }

    #[test]
    fn dumps() {
        let uart = fake_block::<EusciAUartRegisters>();
        poke(uart, offset_of!(EusciAUartRegisters, statw), 0x0021u16);
        let mut out = String::new();
        uart.print_state(&mut out);
        assert!(out.contains("busy"));
        assert!(out.contains("overrun"));
        assert!(!out.contains("framing error"));

        let i2c = fake_block::<EusciBI2cRegisters>();
        let mut out = String::new();
        i2c.print_state(&mut out);
        assert!(out.contains("I2CSA"));
    }
}
