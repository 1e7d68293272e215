// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Named constants for NVIC ids

pub const PSS: u32 = 0;
pub const CS: u32 = 1;
pub const PCM: u32 = 2;
pub const WDT_A: u32 = 3;
pub const FPU: u32 = 4;
pub const FLCTL: u32 = 5;
pub const COMP_E0: u32 = 6;
pub const COMP_E1: u32 = 7;
pub const TIMER_A0_0: u32 = 8;
pub const TIMER_A0_N: u32 = 9;
pub const TIMER_A1_0: u32 = 10;
pub const TIMER_A1_N: u32 = 11;
pub const TIMER_A2_0: u32 = 12;
pub const TIMER_A2_N: u32 = 13;
pub const TIMER_A3_0: u32 = 14;
pub const TIMER_A3_N: u32 = 15;
pub const EUSCI_A0: u32 = 16;
pub const EUSCI_A1: u32 = 17;
pub const EUSCI_A2: u32 = 18;
pub const EUSCI_A3: u32 = 19;
pub const EUSCI_B0: u32 = 20;
pub const EUSCI_B1: u32 = 21;
pub const EUSCI_B2: u32 = 22;
pub const EUSCI_B3: u32 = 23;
pub const ADC14: u32 = 24;
pub const TIMER32_INT1: u32 = 25;
pub const TIMER32_INT2: u32 = 26;
pub const TIMER32_INTC: u32 = 27;
pub const AES256: u32 = 28;
pub const RTC_C: u32 = 29;
pub const DMA_ERR: u32 = 30;
pub const DMA_INT3: u32 = 31;
pub const DMA_INT2: u32 = 32;
pub const DMA_INT1: u32 = 33;
pub const DMA_INT0: u32 = 34;
pub const PORT1: u32 = 35;
pub const PORT2: u32 = 36;
pub const PORT3: u32 = 37;
pub const PORT4: u32 = 38;
pub const PORT5: u32 = 39;
pub const PORT6: u32 = 40;
#[cfg(feature = "msp432p4x1xl")]
pub const LCD_F: u32 = 41;

#[cfg(not(feature = "msp432p4x1xl"))]
pub const NUM_INTERRUPTS: u32 = 41;
#[cfg(feature = "msp432p4x1xl")]
pub const NUM_INTERRUPTS: u32 = 42;

/// Interrupt line of the port with the given number (1-6). Ports 7 to 10 and
/// PJ cannot raise interrupts.
pub const fn port(number: u8) -> Option<u32> {
    match number {
        1..=6 => Some(PORT1 + number as u32 - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_lines_are_contiguous() {
        assert_eq!(port(1), Some(PORT1));
        assert_eq!(port(6), Some(PORT6));
        assert_eq!(port(0), None);
        assert_eq!(port(7), None);
    }

    #[test]
    fn last_line_is_below_count() {
        assert!(PORT6 < NUM_INTERRUPTS);
        assert_eq!(TIMER_A3_N - TIMER_A0_0 + 1, 8);
    }
}
