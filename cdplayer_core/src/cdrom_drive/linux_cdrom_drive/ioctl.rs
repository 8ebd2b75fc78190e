// SPDX-License-Identifier: GPL-3.0
// ioctl.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Request numbers and structures from <linux/cdrom.h>. These predate the _IOR/_IOW
// encoding, so they are plain constants.

pub const CDROMPAUSE: u32 = 0x5301;
pub const CDROMRESUME: u32 = 0x5302;
pub const CDROMPLAYTRKIND: u32 = 0x5304;
pub const CDROMREADTOCHDR: u32 = 0x5305;
pub const CDROMREADTOCENTRY: u32 = 0x5306;
pub const CDROMSTOP: u32 = 0x5307;
pub const CDROMEJECT: u32 = 0x5309;
pub const CDROMVOLCTRL: u32 = 0x530a;
pub const CDROMSUBCHNL: u32 = 0x530b;
pub const CDROMVOLREAD: u32 = 0x5313;
pub const CDROMCLOSETRAY: u32 = 0x5319;

/// Address format selector for logical block addressing.
pub const CDROM_LBA: u8 = 0x01;

/// Control nibble bit marking a data track.
pub const CDROM_DATA_TRACK: u8 = 0x04;

/// Pseudo track number of the lead-out area.
pub const CDROM_LEADOUT: u8 = 0xAA;

// Audio status codes returned in cdrom_subchnl.
pub const CDROM_AUDIO_PLAY: u8 = 0x11;
pub const CDROM_AUDIO_PAUSED: u8 = 0x12;
pub const CDROM_AUDIO_COMPLETED: u8 = 0x13;
pub const CDROM_AUDIO_ERROR: u8 = 0x14;
pub const CDROM_AUDIO_NO_STATUS: u8 = 0x15;

/// struct cdrom_tochdr.
#[repr(C)]
#[derive(Default)]
pub struct CdromTocHdr {
    pub cdth_trk0: u8,
    pub cdth_trk1: u8,
}

/// struct cdrom_tocentry. The address is a union of an MSF triple and an LBA
/// int, we only ever request LBA so it is declared as the int.
#[repr(C)]
#[derive(Default)]
pub struct CdromTocEntry {
    pub cdte_track: u8,
    pub cdte_adr_ctrl: u8,
    pub cdte_format: u8,
    pub cdte_addr: i32,
    pub cdte_datamode: u8,
}

impl CdromTocEntry {

    /// Returns the 4-bit control field, which shares a byte with the address field.
    pub fn ctrl(&self) -> u8 {
        control_nibble(self.cdte_adr_ctrl)
    }
}

/// struct cdrom_ti.
#[repr(C)]
#[derive(Default)]
pub struct CdromTi {
    pub cdti_trk0: u8,
    pub cdti_ind0: u8,
    pub cdti_trk1: u8,
    pub cdti_ind1: u8,
}

/// struct cdrom_subchnl, again with both address unions declared as LBA ints.
#[repr(C)]
#[derive(Default)]
pub struct CdromSubchnl {
    pub cdsc_format: u8,
    pub cdsc_audiostatus: u8,
    pub cdsc_adr_ctrl: u8,
    pub cdsc_trk: u8,
    pub cdsc_ind: u8,
    pub cdsc_absaddr: i32,
    pub cdsc_reladdr: i32,
}

/// struct cdrom_volctrl.
#[repr(C)]
#[derive(Default)]
pub struct CdromVolctrl {
    pub channel0: u8,
    pub channel1: u8,
    pub channel2: u8,
    pub channel3: u8,
}

// The kernel declares adr and ctrl as 4-bit bitfields, whose placement within
// the byte follows the target's bit order.
#[cfg(target_endian = "little")]
fn control_nibble(adr_ctrl: u8) -> u8 {
    adr_ctrl >> 4
}

#[cfg(target_endian = "big")]
fn control_nibble(adr_ctrl: u8) -> u8 {
    adr_ctrl & 0xF
}
