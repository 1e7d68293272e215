// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Register dumps for panic handlers and debugging consoles.
//!
//! Output goes to any `core::fmt::Write`, the same way the Cortex-M crates
//! print their fault state. Write errors are dropped: there is nowhere to
//! report them while a board is panicking.

use core::fmt::Write;

/// Print a section title.
pub fn write_header(writer: &mut dyn Write, title: &str) {
    let _ = writer.write_fmt(format_args!("\r\n---| {} |---\r\n", title));
}

/// Print one register as `NAME [+0xOFF] 0xVALUE`.
pub fn write_register(writer: &mut dyn Write, name: &str, offset: usize, value: u32) {
    let _ = writer.write_fmt(format_args!(
        "{:<18} [+0x{:03X}] 0x{:08X}\r\n",
        name, offset, value
    ));
}

/// Print one named flag, only when it is set.
pub fn write_flag(writer: &mut dyn Write, name: &str, set: bool) {
    if set {
        let _ = writer.write_fmt(format_args!("  {}\r\n", name));
    }
}

/// Dump the clock, power, reset, system-control and watchdog registers.
///
/// ## Safety
///
/// Reads the live peripherals at their fixed addresses; only call this on
/// the device.
pub unsafe fn print_msp432_state(writer: &mut dyn Write) {
    crate::cs::CS_BASE.print_state(writer);
    crate::pcm::PCM_BASE.print_state(writer);
    crate::rstctl::RSTCTL_BASE.print_state(writer);
    crate::sysctl::SYSCTL_BASE.print_state(writer);
    crate::wdt_a::WDT_A_BASE.print_state(writer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;

    #[test]
    fn register_line_is_aligned() {
        let mut out = String::new();
        write_register(&mut out, "CTL0", 0x4, 0x0001_0000);
        assert_eq!(out, "CTL0               [+0x004] 0x00010000\r\n");
    }

    #[test]
    fn flags_only_print_when_set() {
        let mut out = String::new();
        write_flag(&mut out, "BUSY", false);
        assert!(out.is_empty());
        write_flag(&mut out, "BUSY", true);
        assert_eq!(out, "  BUSY\r\n");
    }

    #[test]
    fn header_is_framed() {
        let mut out = String::new();
        write_header(&mut out, "CS");
        assert_eq!(out, "\r\n---| CS |---\r\n");
    }
}
