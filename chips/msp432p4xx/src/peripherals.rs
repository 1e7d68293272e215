// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Every peripheral instance of the device in one place.
//!
//! Blocks with helpers come wrapped in their driver type. The rest are plain
//! [`StaticRef`]s to the register block.

use crate::adc14::{Adc14Registers, ADC14_BASE};
use crate::aes256::{Aes256, AES256_BASE};
use crate::comp_e::{CompERegisters, COMP_E0_BASE, COMP_E1_BASE};
use crate::crc32::{Crc32Registers, CRC32_BASE};
use crate::cs::{ClockSystem, CS_BASE};
use crate::dio::{DioPort, Port};
use crate::dma::{Dma, DMA_CHANNEL_BASE, DMA_CONTROL_BASE};
use crate::eusci::{
    EusciAUartRegisters, EusciBI2cRegisters, EUSCI_A0_BASE, EUSCI_A1_BASE, EUSCI_A2_BASE,
    EUSCI_A3_BASE, EUSCI_B0_BASE, EUSCI_B1_BASE, EUSCI_B2_BASE, EUSCI_B3_BASE,
};
use crate::fl_bootover_mailbox::{BootOverrideMailbox, FL_BOOTOVER_MAILBOX};
use crate::flctl::{FlCtl, FLCTL_BASE};
#[cfg(feature = "msp432p4x1xl")]
use crate::lcd_f::{LcdF, LCD_F_BASE};
use crate::pcm::{Pcm, PCM_BASE};
use crate::pmap::{PortMapper, PMAP_BASE, PMAP_PORTS_BASE};
use crate::pss::{Pss, PSS_BASE};
use crate::ref_a::{Reference, REF_A_BASE};
use crate::rstctl::{ResetController, RSTCTL_BASE};
use crate::rtc_c::{Rtc, RTC_C_BASE};
use crate::sysctl::{SysCtl, SYSCTL_BASE, SYSCTL_BOOT_BASE};
use crate::timer32::{Timer32, TIMER32_1_BASE, TIMER32_2_BASE};
use crate::timer_a::{TimerA, TIMER_A0_BASE, TIMER_A1_BASE, TIMER_A2_BASE, TIMER_A3_BASE};
use crate::wdt_a::{Watchdog, WDT_A_BASE};
use crate::StaticRef;

pub struct Msp432Peripherals {
    pub adc14: StaticRef<Adc14Registers>,
    pub aes256: Aes256,
    pub comp_e0: StaticRef<CompERegisters>,
    pub comp_e1: StaticRef<CompERegisters>,
    pub crc32: StaticRef<Crc32Registers>,
    pub cs: ClockSystem,
    /// P1 to P10 followed by PJ.
    pub dio: [DioPort; 11],
    pub dma: Dma,
    /// eUSCI_A instances in their UART view.
    pub eusci_a: [StaticRef<EusciAUartRegisters>; 4],
    /// eUSCI_B instances in their I2C view.
    pub eusci_b: [StaticRef<EusciBI2cRegisters>; 4],
    pub boot_override: StaticRef<BootOverrideMailbox>,
    pub flctl: FlCtl,
    #[cfg(feature = "msp432p4x1xl")]
    pub lcd_f: LcdF,
    pub pcm: Pcm,
    pub pmap: PortMapper,
    pub pss: Pss,
    pub ref_a: Reference,
    pub rstctl: ResetController,
    pub rtc_c: Rtc,
    pub sysctl: SysCtl,
    pub timer32_1: Timer32,
    pub timer32_2: Timer32,
    pub timer_a0: TimerA,
    pub timer_a1: TimerA,
    pub timer_a2: TimerA,
    pub timer_a3: TimerA,
    pub wdt_a: Watchdog,
}

impl Msp432Peripherals {
    pub const fn new() -> Self {
        Self {
            adc14: ADC14_BASE,
            aes256: Aes256::new(AES256_BASE),
            comp_e0: COMP_E0_BASE,
            comp_e1: COMP_E1_BASE,
            crc32: CRC32_BASE,
            cs: ClockSystem::new(CS_BASE),
            dio: [
                DioPort::new(Port::P1),
                DioPort::new(Port::P2),
                DioPort::new(Port::P3),
                DioPort::new(Port::P4),
                DioPort::new(Port::P5),
                DioPort::new(Port::P6),
                DioPort::new(Port::P7),
                DioPort::new(Port::P8),
                DioPort::new(Port::P9),
                DioPort::new(Port::P10),
                DioPort::new(Port::PJ),
            ],
            dma: Dma::new(DMA_CHANNEL_BASE, DMA_CONTROL_BASE),
            eusci_a: [EUSCI_A0_BASE, EUSCI_A1_BASE, EUSCI_A2_BASE, EUSCI_A3_BASE],
            eusci_b: [EUSCI_B0_BASE, EUSCI_B1_BASE, EUSCI_B2_BASE, EUSCI_B3_BASE],
            boot_override: FL_BOOTOVER_MAILBOX,
            flctl: FlCtl::new(FLCTL_BASE),
            #[cfg(feature = "msp432p4x1xl")]
            lcd_f: LcdF::new(LCD_F_BASE),
            pcm: Pcm::new(PCM_BASE),
            pmap: PortMapper::new(PMAP_BASE, PMAP_PORTS_BASE),
            pss: Pss::new(PSS_BASE),
            ref_a: Reference::new(REF_A_BASE),
            rstctl: ResetController::new(RSTCTL_BASE),
            rtc_c: Rtc::new(RTC_C_BASE),
            sysctl: SysCtl::new(SYSCTL_BASE, SYSCTL_BOOT_BASE),
            timer32_1: Timer32::new(TIMER32_1_BASE),
            timer32_2: Timer32::new(TIMER32_2_BASE),
            timer_a0: TimerA::new(TIMER_A0_BASE),
            timer_a1: TimerA::new(TIMER_A1_BASE),
            timer_a2: TimerA::new(TIMER_A2_BASE),
            timer_a3: TimerA::new(TIMER_A3_BASE),
            wdt_a: Watchdog::new(WDT_A_BASE),
        }
    }
}

impl Default for Msp432Peripherals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIPHERALS: Msp432Peripherals = Msp432Peripherals::new();

    #[test]
    fn plain_blocks_sit_at_their_bases() {
        assert_eq!(PERIPHERALS.adc14.address(), 0x4001_2000);
        assert_eq!(PERIPHERALS.comp_e0.address(), 0x4000_3400);
        assert_eq!(PERIPHERALS.comp_e1.address(), 0x4000_3800);
        assert_eq!(PERIPHERALS.crc32.address(), 0x4000_4000);
        assert_eq!(PERIPHERALS.boot_override.address(), 0x0020_0000);
    }

    #[test]
    fn serial_instances_are_0x400_apart() {
        for (n, a) in PERIPHERALS.eusci_a.iter().enumerate() {
            assert_eq!(a.address(), 0x4000_1000 + n * 0x400);
        }
        for (n, b) in PERIPHERALS.eusci_b.iter().enumerate() {
            assert_eq!(b.address(), 0x4000_2000 + n * 0x400);
        }
    }
}
