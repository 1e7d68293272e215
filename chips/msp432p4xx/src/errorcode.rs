// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for register-level operations

use core::fmt;

/// Errors reported by the helpers of this crate.
///
/// The variants and their numbering follow the error codes used across Tock,
/// so a board crate can pass them through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 0,
    /// Underlying system is busy; retry
    BUSY = 1,
    /// The state requested is already set
    ALREADY = 2,
    /// An invalid parameter was passed
    INVAL = 5,
    /// Parameter passed was too large
    SIZE = 6,
    /// Operation or command is unsupported
    NOSUPPORT = 9,
    /// Device does not exist
    NODEVICE = 10,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorCode::FAIL => "generic failure",
            ErrorCode::BUSY => "hardware busy",
            ErrorCode::ALREADY => "already in requested state",
            ErrorCode::INVAL => "invalid parameter",
            ErrorCode::SIZE => "parameter out of range",
            ErrorCode::NOSUPPORT => "not supported by this peripheral",
            ErrorCode::NODEVICE => "peripheral not present",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::string::ToString;

    #[test]
    fn numeric_values_match_tock() {
        assert_eq!(usize::from(ErrorCode::FAIL), 0);
        assert_eq!(usize::from(ErrorCode::BUSY), 1);
        assert_eq!(usize::from(ErrorCode::ALREADY), 2);
        assert_eq!(usize::from(ErrorCode::INVAL), 5);
        assert_eq!(usize::from(ErrorCode::SIZE), 6);
        assert_eq!(usize::from(ErrorCode::NOSUPPORT), 9);
        assert_eq!(usize::from(ErrorCode::NODEVICE), 10);
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(ErrorCode::BUSY.to_string(), "hardware busy");
    }
}
