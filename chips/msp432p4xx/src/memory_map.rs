// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Device memory map.
//!
//! Region bases and the base address of every peripheral instance. The
//! register blocks in the peripheral modules are laid over these addresses.

/// Main flash memory (code region).
pub const FLASH_BASE: usize = 0x0000_0000;
/// Flash information memory; holds the boot-override mailbox and the TLV.
pub const FLASH_INFO_BASE: usize = 0x0020_0000;
/// SRAM alias in the code region, used for instruction fetches from SRAM.
pub const SRAM_CODE_BASE: usize = 0x0100_0000;
/// SRAM in the data region.
pub const SRAM_BASE: usize = 0x2000_0000;
/// Start of the SRAM bit-band alias region.
pub const BITBAND_SRAM_BASE: usize = 0x2200_0000;
/// Peripherals on the AHB/APB buses.
pub const PERIPH_BASE: usize = 0x4000_0000;
/// Start of the peripheral bit-band alias region.
pub const BITBAND_PERI_BASE: usize = 0x4200_0000;
/// Private peripheral bus; the reset controller and system controller live
/// here next to the Cortex-M core peripherals.
pub const PERIPH_BASE2: usize = 0xE000_0000;

/// Both bit-band capable regions span one MiB.
pub const BITBAND_REGION_SIZE: usize = 0x0010_0000;

#[cfg(not(feature = "msp432p4x1xl"))]
pub const FLASH_MAIN_SIZE: usize = 256 * 1024;
#[cfg(feature = "msp432p4x1xl")]
pub const FLASH_MAIN_SIZE: usize = 2 * 1024 * 1024;

#[cfg(not(feature = "msp432p4x1xl"))]
pub const SRAM_SIZE: usize = 64 * 1024;
#[cfg(feature = "msp432p4x1xl")]
pub const SRAM_SIZE: usize = 256 * 1024;

/// Main flash is split into two equally sized banks.
pub const FLASH_BANK_SIZE: usize = FLASH_MAIN_SIZE / 2;
/// Erase granularity of main and information memory.
pub const FLASH_SECTOR_SIZE: usize = 4 * 1024;

pub const TLV_BASE: usize = FLASH_INFO_BASE + 0x1000;
pub const FL_BOOTOVER_MAILBOX_BASE: usize = FLASH_INFO_BASE;

// Peripheral region (PERIPH_BASE)
pub const TIMER_A0_BASE_ADDR: usize = PERIPH_BASE + 0x0000;
pub const TIMER_A1_BASE_ADDR: usize = PERIPH_BASE + 0x0400;
pub const TIMER_A2_BASE_ADDR: usize = PERIPH_BASE + 0x0800;
pub const TIMER_A3_BASE_ADDR: usize = PERIPH_BASE + 0x0C00;
pub const EUSCI_A0_BASE_ADDR: usize = PERIPH_BASE + 0x1000;
pub const EUSCI_A1_BASE_ADDR: usize = PERIPH_BASE + 0x1400;
pub const EUSCI_A2_BASE_ADDR: usize = PERIPH_BASE + 0x1800;
pub const EUSCI_A3_BASE_ADDR: usize = PERIPH_BASE + 0x1C00;
pub const EUSCI_B0_BASE_ADDR: usize = PERIPH_BASE + 0x2000;
pub const EUSCI_B1_BASE_ADDR: usize = PERIPH_BASE + 0x2400;
pub const EUSCI_B2_BASE_ADDR: usize = PERIPH_BASE + 0x2800;
pub const EUSCI_B3_BASE_ADDR: usize = PERIPH_BASE + 0x2C00;
pub const REF_A_BASE_ADDR: usize = PERIPH_BASE + 0x3000;
pub const COMP_E0_BASE_ADDR: usize = PERIPH_BASE + 0x3400;
pub const COMP_E1_BASE_ADDR: usize = PERIPH_BASE + 0x3800;
pub const AES256_BASE_ADDR: usize = PERIPH_BASE + 0x3C00;
pub const CRC32_BASE_ADDR: usize = PERIPH_BASE + 0x4000;
pub const RTC_C_BASE_ADDR: usize = PERIPH_BASE + 0x4400;
pub const WDT_A_BASE_ADDR: usize = PERIPH_BASE + 0x4800;
pub const DIO_BASE_ADDR: usize = PERIPH_BASE + 0x4C00;
pub const PMAP_BASE_ADDR: usize = PERIPH_BASE + 0x5000;
pub const TIMER32_BASE_ADDR: usize = PERIPH_BASE + 0xC000;
pub const DMA_BASE_ADDR: usize = PERIPH_BASE + 0xE000;
pub const PCM_BASE_ADDR: usize = PERIPH_BASE + 0x1_0000;
pub const CS_BASE_ADDR: usize = PERIPH_BASE + 0x1_0400;
pub const PSS_BASE_ADDR: usize = PERIPH_BASE + 0x1_0800;
pub const FLCTL_BASE_ADDR: usize = PERIPH_BASE + 0x1_1000;
pub const ADC14_BASE_ADDR: usize = PERIPH_BASE + 0x1_2000;
#[cfg(feature = "msp432p4x1xl")]
pub const LCD_F_BASE_ADDR: usize = PERIPH_BASE + 0x1_2400;

// Private peripheral bus (PERIPH_BASE2)
pub const RSTCTL_BASE_ADDR: usize = PERIPH_BASE2 + 0x4_2000;
pub const SYSCTL_BASE_ADDR: usize = PERIPH_BASE2 + 0x4_3000;
pub const SYSCTL_BOOT_BASE_ADDR: usize = PERIPH_BASE2 + 0x4_4000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_do_not_overlap_their_aliases() {
        assert!(SRAM_BASE + BITBAND_REGION_SIZE <= BITBAND_SRAM_BASE);
        assert!(PERIPH_BASE + BITBAND_REGION_SIZE <= BITBAND_PERI_BASE);
        assert!(SRAM_BASE + SRAM_SIZE <= SRAM_BASE + BITBAND_REGION_SIZE);
    }

    #[test]
    fn peripheral_bases_match_device_header() {
        assert_eq!(ADC14_BASE_ADDR, 0x4001_2000);
        assert_eq!(CS_BASE_ADDR, 0x4001_0400);
        assert_eq!(DMA_BASE_ADDR, 0x4000_E000);
        assert_eq!(EUSCI_B3_BASE_ADDR, 0x4000_2C00);
        assert_eq!(WDT_A_BASE_ADDR, 0x4000_4800);
        assert_eq!(RSTCTL_BASE_ADDR, 0xE004_2000);
        assert_eq!(SYSCTL_BOOT_BASE_ADDR, 0xE004_4000);
        assert_eq!(TLV_BASE, 0x0020_1000);
    }

    #[test]
    fn every_peripheral_sits_in_a_bit_band_region() {
        for base in [
            TIMER_A0_BASE_ADDR,
            EUSCI_A0_BASE_ADDR,
            CRC32_BASE_ADDR,
            DIO_BASE_ADDR,
            DMA_BASE_ADDR,
            FLCTL_BASE_ADDR,
            ADC14_BASE_ADDR,
        ] {
            assert!(base >= PERIPH_BASE && base < PERIPH_BASE + BITBAND_REGION_SIZE);
        }
    }
}
