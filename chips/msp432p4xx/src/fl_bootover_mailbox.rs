// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Flash boot-override mailbox.
//!
//! The mailbox is not a peripheral. It is a structure in information memory
//! that the boot code reads after a boot-override request (see
//! `SysCtlBootRegisters::bootover_req`). Firmware programs an image built
//! with [`MailboxImage`] into flash, and the boot code acknowledges each
//! command in the matching `*_ack` word.

use crate::memory_map::{FLASH_SECTOR_SIZE, FL_BOOTOVER_MAILBOX_BASE};
use crate::{ErrorCode, StaticRef};

pub const FL_BOOTOVER_MAILBOX: StaticRef<BootOverrideMailbox> =
    unsafe { StaticRef::new(FL_BOOTOVER_MAILBOX_BASE as *const BootOverrideMailbox) };

pub const MB_START: u32 = 0x0115_ACF6;
pub const MB_END: u32 = 0x0011_E11D;

/// Value of an enable word that turns its section on.
pub const SECTION_ENABLED: u32 = 0x0000_0001;

/// Value of erased flash.
const ERASED: u32 = 0xFFFF_FFFF;

/// Command bits for the CMD word.
pub mod command {
    pub const JTAG_SWD_LOCK_SECEN: u32 = 0x0001;
    pub const IP_PROT_SECEN1: u32 = 0x0002;
    pub const IP_PROT_SECEN2: u32 = 0x0004;
    pub const IP_PROT_SECEN3: u32 = 0x0008;
    pub const IP_PROT_SECEN4: u32 = 0x0010;
    pub const BSL_CONFIG: u32 = 0x0020;
    pub const JTAG_SWD_LOCK_ENC_UPDATE: u32 = 0x0040;
    pub const FACTORY_RESET: u32 = 0x0080;

    pub const ALL: u32 = JTAG_SWD_LOCK_SECEN
        | IP_PROT_SECEN1
        | IP_PROT_SECEN2
        | IP_PROT_SECEN3
        | IP_PROT_SECEN4
        | BSL_CONFIG
        | JTAG_SWD_LOCK_ENC_UPDATE
        | FACTORY_RESET;

    /// The IP-protection command for secure zone `zone`.
    pub const fn ip_protection(zone: usize) -> u32 {
        IP_PROT_SECEN1 << zone
    }
}

/// JTAG/SWD lock section.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JtagSwdLock {
    pub secen: u32,
    pub aes_init_vect: [u32; 4],
    pub aes_seckeys: [u32; 8],
    pub unlock_pwd: [u32; 4],
}

/// One IP-protected secure zone.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecureZone {
    pub secen: u32,
    pub start_addr: u32,
    pub length: u32,
    pub aes_init_vect: [u32; 4],
    pub seckeys: [u32; 8],
    pub unenc_pwd: [u32; 4],
    pub encupdate_en: u32,
    pub data_en: u32,
    pub ack: u32,
    _reserved: [u32; 2],
}

/// Bootstrap loader configuration section.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BslConfig {
    pub enable: u32,
    pub start_address: u32,
    pub parameters: u32,
    _reserved: [u32; 2],
    pub ack: u32,
}

/// Encrypted update of the JTAG/SWD lock section.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JtagSwdLockEncUpdate {
    pub payload_addr: u32,
    pub payload_len: u32,
    pub dst_addr: u32,
    pub ack: u32,
    _reserved: u32,
}

/// Factory reset section.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactoryReset {
    pub enable: u32,
    pub pwden: u32,
    pub pwd: [u32; 4],
    pub ack: u32,
    _reserved: [u32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootOverrideMailbox {
    pub mb_start: u32,
    pub cmd: u32,
    _reserved0: [u32; 2],
    pub jtag_swd_lock: JtagSwdLock,
    _reserved1: [u32; 6],
    pub sec_zone: [SecureZone; 4],
    pub bsl: BslConfig,
    pub enc_update: JtagSwdLockEncUpdate,
    pub factory_reset: FactoryReset,
    pub mb_end: u32,
}

impl BootOverrideMailbox {
    /// Check the sentinels and that only known commands are requested.
    pub fn validate(&self) -> Result<(), ErrorCode> {
        if self.mb_start != MB_START || self.mb_end != MB_END {
            return Err(ErrorCode::INVAL);
        }
        if self.cmd & !command::ALL != 0 {
            return Err(ErrorCode::INVAL);
        }
        Ok(())
    }

    pub fn requests(&self, cmd: u32) -> bool {
        self.cmd & cmd == cmd
    }
}

const fn erased<const N: usize>() -> [u32; N] {
    [ERASED; N]
}

const ERASED_ZONE: SecureZone = SecureZone {
    secen: ERASED,
    start_addr: ERASED,
    length: ERASED,
    aes_init_vect: erased(),
    seckeys: erased(),
    unenc_pwd: erased(),
    encupdate_en: ERASED,
    data_en: ERASED,
    ack: ERASED,
    _reserved: erased(),
};

/// Builds a mailbox image. Sections that are not configured keep the erased
/// flash value.
pub struct MailboxImage {
    mailbox: BootOverrideMailbox,
}

impl MailboxImage {
    pub const fn new() -> MailboxImage {
        MailboxImage {
            mailbox: BootOverrideMailbox {
                mb_start: MB_START,
                cmd: 0,
                _reserved0: erased(),
                jtag_swd_lock: JtagSwdLock {
                    secen: ERASED,
                    aes_init_vect: erased(),
                    aes_seckeys: erased(),
                    unlock_pwd: erased(),
                },
                _reserved1: erased(),
                sec_zone: [ERASED_ZONE; 4],
                bsl: BslConfig {
                    enable: ERASED,
                    start_address: ERASED,
                    parameters: ERASED,
                    _reserved: erased(),
                    ack: ERASED,
                },
                enc_update: JtagSwdLockEncUpdate {
                    payload_addr: ERASED,
                    payload_len: ERASED,
                    dst_addr: ERASED,
                    ack: ERASED,
                    _reserved: ERASED,
                },
                factory_reset: FactoryReset {
                    enable: ERASED,
                    pwden: ERASED,
                    pwd: erased(),
                    ack: ERASED,
                    _reserved: erased(),
                },
                mb_end: MB_END,
            },
        }
    }

    /// Lock the debug port, unlockable with `unlock_pwd`.
    pub fn jtag_swd_lock(
        mut self,
        aes_init_vect: [u32; 4],
        aes_seckeys: [u32; 8],
        unlock_pwd: [u32; 4],
    ) -> MailboxImage {
        self.mailbox.cmd |= command::JTAG_SWD_LOCK_SECEN;
        self.mailbox.jtag_swd_lock = JtagSwdLock {
            secen: SECTION_ENABLED,
            aes_init_vect,
            aes_seckeys,
            unlock_pwd,
        };
        self
    }

    /// Make `length` bytes from `start_addr` secure zone `zone` (0 to 3). The
    /// zone must cover whole flash sectors.
    pub fn ip_protection(
        mut self,
        zone: usize,
        start_addr: u32,
        length: u32,
        aes_init_vect: [u32; 4],
        seckeys: [u32; 8],
        unenc_pwd: [u32; 4],
    ) -> Result<MailboxImage, ErrorCode> {
        let sector = FLASH_SECTOR_SIZE as u32;
        if zone >= self.mailbox.sec_zone.len()
            || length == 0
            || start_addr % sector != 0
            || length % sector != 0
        {
            return Err(ErrorCode::INVAL);
        }
        self.mailbox.cmd |= command::ip_protection(zone);
        self.mailbox.sec_zone[zone] = SecureZone {
            secen: SECTION_ENABLED,
            start_addr,
            length,
            aes_init_vect,
            seckeys,
            unenc_pwd,
            encupdate_en: 0,
            data_en: 0,
            ..ERASED_ZONE
        };
        Ok(self)
    }

    pub fn bsl_config(mut self, start_address: u32, parameters: u32) -> MailboxImage {
        self.mailbox.cmd |= command::BSL_CONFIG;
        self.mailbox.bsl.enable = SECTION_ENABLED;
        self.mailbox.bsl.start_address = start_address;
        self.mailbox.bsl.parameters = parameters;
        self
    }

    pub fn jtag_swd_lock_enc_update(
        mut self,
        payload_addr: u32,
        payload_len: u32,
        dst_addr: u32,
    ) -> MailboxImage {
        self.mailbox.cmd |= command::JTAG_SWD_LOCK_ENC_UPDATE;
        self.mailbox.enc_update.payload_addr = payload_addr;
        self.mailbox.enc_update.payload_len = payload_len;
        self.mailbox.enc_update.dst_addr = dst_addr;
        self
    }

    /// Erase all of main and information memory, optionally guarded by a
    /// password.
    pub fn factory_reset(mut self, password: Option<[u32; 4]>) -> MailboxImage {
        self.mailbox.cmd |= command::FACTORY_RESET;
        self.mailbox.factory_reset.enable = SECTION_ENABLED;
        match password {
            Some(pwd) => {
                self.mailbox.factory_reset.pwden = SECTION_ENABLED;
                self.mailbox.factory_reset.pwd = pwd;
            }
            None => self.mailbox.factory_reset.pwden = 0,
        }
        self
    }

    pub fn build(self) -> BootOverrideMailbox {
        self.mailbox
    }

    /// The image as the words to program into information memory.
    pub fn words(&self) -> &[u32] {
        let len = core::mem::size_of::<BootOverrideMailbox>() / 4;
        // The mailbox is `repr(C)` and made only of `u32`s.
        let words = core::ptr::from_ref(&self.mailbox).cast::<u32>();
        unsafe { core::slice::from_raw_parts(words, len) }
    }
}

impl Default for MailboxImage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn layout() {
        assert_eq!(size_of::<JtagSwdLock>(), 0x44);
        assert_eq!(size_of::<SecureZone>(), 0x60);
        assert_eq!(offset_of!(BootOverrideMailbox, cmd), 0x004);
        assert_eq!(offset_of!(BootOverrideMailbox, jtag_swd_lock), 0x010);
        assert_eq!(offset_of!(BootOverrideMailbox, sec_zone), 0x06C);
        assert_eq!(offset_of!(BootOverrideMailbox, bsl), 0x1EC);
        assert_eq!(offset_of!(BootOverrideMailbox, enc_update), 0x204);
        assert_eq!(offset_of!(BootOverrideMailbox, factory_reset), 0x218);
        assert_eq!(offset_of!(BootOverrideMailbox, mb_end), 0x23C);
        assert_eq!(size_of::<BootOverrideMailbox>(), 0x240);
        assert_eq!(FL_BOOTOVER_MAILBOX.address(), 0x0020_0000);
    }

    #[test]
    fn empty_image_is_valid() {
        let mailbox = MailboxImage::new().build();
        assert_eq!(mailbox.validate(), Ok(()));
        assert_eq!(mailbox.cmd, 0);
        assert_eq!(mailbox.bsl.enable, 0xFFFF_FFFF);
    }

    #[test]
    fn commands_accumulate() {
        let mailbox = MailboxImage::new()
            .bsl_config(0x0003_0000, 0xFC48_FFFF)
            .factory_reset(None)
            .ip_protection(2, 0x0001_0000, 0x2000, [1; 4], [2; 8], [3; 4])
            .unwrap()
            .build();
        assert_eq!(mailbox.validate(), Ok(()));
        assert_eq!(mailbox.cmd, 0x00A8);
        assert!(mailbox.requests(command::ip_protection(2)));
        assert!(!mailbox.requests(command::JTAG_SWD_LOCK_SECEN));
        assert_eq!(mailbox.sec_zone[2].secen, SECTION_ENABLED);
        assert_eq!(mailbox.sec_zone[2].ack, 0xFFFF_FFFF);
        assert_eq!(mailbox.sec_zone[1].secen, 0xFFFF_FFFF);
        assert_eq!(mailbox.factory_reset.pwden, 0);
    }

    #[test]
    fn secure_zones_cover_whole_sectors() {
        let key = [0; 8];
        let iv = [0; 4];
        assert!(MailboxImage::new().ip_protection(4, 0, 0x1000, iv, key, iv).is_err());
        assert!(MailboxImage::new().ip_protection(0, 0x0800, 0x1000, iv, key, iv).is_err());
        assert!(MailboxImage::new().ip_protection(0, 0x1000, 0x0800, iv, key, iv).is_err());
        assert!(MailboxImage::new().ip_protection(0, 0x1000, 0, iv, key, iv).is_err());
        assert!(MailboxImage::new().ip_protection(3, 0x1000, 0x1000, iv, key, iv).is_ok());
    }

    #[test]
    fn validate_rejects_corruption() {
        let mut mailbox = MailboxImage::new().jtag_swd_lock([0; 4], [0; 8], [7; 4]).build();
        assert_eq!(mailbox.validate(), Ok(()));
        mailbox.cmd |= 0x0100;
        assert_eq!(mailbox.validate(), Err(ErrorCode::INVAL));
        mailbox.cmd = command::JTAG_SWD_LOCK_SECEN;
        mailbox.mb_end = 0xFFFF_FFFF;
        assert_eq!(mailbox.validate(), Err(ErrorCode::INVAL));
        mailbox.mb_end = MB_END;
        mailbox.mb_start = 0;
        assert_eq!(mailbox.validate(), Err(ErrorCode::INVAL));
    }

    #[test]
    fn words_frame_the_image() {
        let image = MailboxImage::new().factory_reset(Some([0xA, 0xB, 0xC, 0xD]));
        let words = image.words();
        assert_eq!(words.len(), 0x90);
        assert_eq!(words[0], MB_START);
        assert_eq!(words[1], command::FACTORY_RESET);
        assert_eq!(words[0x220 / 4], 0xA);
        assert_eq!(words[0x8F], MB_END);
    }
}
