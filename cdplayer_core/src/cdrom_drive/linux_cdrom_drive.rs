// SPDX-License-Identifier: GPL-3.0
// linux_cdrom_drive.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// This module contains the raw kernel request numbers and structures.
mod ioctl;

use super::{AudioState, CdromDrive, CdromError, DriveStatus, DriveVolume};
use ioctl::*;
use log::debug;
use std::{
    ffi::c_void,
    fs::{File, OpenOptions},
    os::unix::{fs::OpenOptionsExt, io::AsRawFd},
    path::Path,
};

/// This struct models a physical drive driven through the kernel's CD-ROM ioctls.
/// The device is held open for the lifetime of the struct and closed on drop.
pub struct LinuxCdromDrive {

    // Open handle to the device node.
    device: File,

    // Path used to open the device, for log output.
    name: String,
}

/// Implementation functions for the Linux drive itself.
impl LinuxCdromDrive {

    /// Opens the given device node read-only and non-blocking, so the open succeeds
    /// with an empty tray.
    pub fn open(path: &Path) -> Result<Self, CdromError> {

        let device = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|source| CdromError::Io { operation: "open", source })?;

        Ok(LinuxCdromDrive {
            device,
            name: path.display().to_string(),
        })
    }

    /// Issues a request that carries no argument.
    fn request(&self, operation: &'static str, request: u32) -> Result<(), CdromError> {

        // SAFETY: the descriptor is owned by self.device and these requests
        // take no argument.
        let result = unsafe { libc::ioctl(self.device.as_raw_fd(), request as _) };
        self.check(operation, result)
    }

    /// Issues a request that reads or writes the supplied structure.
    fn request_with<T>(
        &self,
        operation: &'static str,
        request: u32,
        argument: &mut T
    ) -> Result<(), CdromError> {

        // SAFETY: the descriptor is owned by self.device, and every T used with this
        // function is a #[repr(C)] mirror of the structure the request expects.
        let result = unsafe {
            libc::ioctl(
                self.device.as_raw_fd(),
                request as _,
                argument as *mut T as *mut c_void
            )
        };
        self.check(operation, result)
    }

    /// Turns an ioctl return value into a result, capturing errno on failure.
    fn check(&self, operation: &'static str, result: libc::c_int) -> Result<(), CdromError> {

        if result == -1 {
            let error = CdromError::last_os_error(operation);
            debug!("{}: ioctl {}", self.name, error);
            Err(error)
        } else {
            Ok(())
        }
    }

    /// Reads the LBA start address of a track (or of the lead-out).
    fn track_start(&self, track: u8) -> Result<CdromTocEntry, CdromError> {

        let mut entry = CdromTocEntry {
            cdte_track: track,
            cdte_format: CDROM_LBA,
            ..Default::default()
        };
        self.request_with("CDROMREADTOCENTRY", CDROMREADTOCENTRY, &mut entry)?;

        Ok(entry)
    }

    /// Reads the table of contents header.
    fn toc_header(&self) -> Result<CdromTocHdr, CdromError> {

        let mut header = CdromTocHdr::default();
        self.request_with("CDROMREADTOCHDR", CDROMREADTOCHDR, &mut header)?;

        Ok(header)
    }
}

/// Implementation functions to be called from anything that understands what
/// a CdromDrive object is.
impl CdromDrive for LinuxCdromDrive {

    fn name(&self) -> &str {
        &self.name
    }

    fn eject(&mut self) -> Result<(), CdromError> {
        self.request("CDROMEJECT", CDROMEJECT)
    }

    fn close_tray(&mut self) -> Result<(), CdromError> {
        self.request("CDROMCLOSETRAY", CDROMCLOSETRAY)
    }

    fn read_disc_info(&mut self) -> Result<u8, CdromError> {

        let header = self.toc_header()?;

        if header.cdth_trk0 < 1 {
            debug!("{}: no music tracks", self.name);
            return Ok(0);
        }

        Ok(header.cdth_trk1)
    }

    fn is_audio_track(&mut self, track: u8) -> Result<bool, CdromError> {

        let entry = self.track_start(track)?;

        Ok(entry.ctrl() & CDROM_DATA_TRACK == 0)
    }

    fn track_length(&mut self, track: u8) -> Result<u32, CdromError> {

        // A track ends where the next one (or the lead-out) begins.
        let last_track = self.toc_header()?.cdth_trk1;
        if track < 1 || track > last_track {
            return Err(CdromError::NoSuchTrack(track));
        }
        let next = if track == last_track { CDROM_LEADOUT } else { track + 1 };

        let start = self.track_start(track)?.cdte_addr;
        let end = self.track_start(next)?.cdte_addr;

        Ok(end.saturating_sub(start).max(0) as u32)
    }

    fn play_track(&mut self, track: u8) -> Result<(), CdromError> {

        // Play exactly one track, every index within it.
        let mut track_index = CdromTi {
            cdti_trk0: track,
            cdti_ind0: 1,
            cdti_trk1: track,
            cdti_ind1: 99,
        };
        self.request_with("CDROMPLAYTRKIND", CDROMPLAYTRKIND, &mut track_index)?;

        // Some drives come out of PLAYTRKIND paused.
        self.request("CDROMRESUME", CDROMRESUME)
    }

    fn stop(&mut self) -> Result<(), CdromError> {
        self.request("CDROMSTOP", CDROMSTOP)
    }

    fn pause(&mut self) -> Result<(), CdromError> {
        self.request("CDROMPAUSE", CDROMPAUSE)
    }

    fn resume(&mut self) -> Result<(), CdromError> {
        self.request("CDROMRESUME", CDROMRESUME)
    }

    fn query_status(&mut self) -> Result<DriveStatus, CdromError> {

        let mut subchannel = CdromSubchnl {
            cdsc_format: CDROM_LBA,
            ..Default::default()
        };
        self.request_with("CDROMSUBCHNL", CDROMSUBCHNL, &mut subchannel)?;

        let state = match subchannel.cdsc_audiostatus {
            CDROM_AUDIO_PLAY => AudioState::Playing,
            CDROM_AUDIO_PAUSED => AudioState::Paused,
            CDROM_AUDIO_COMPLETED | CDROM_AUDIO_ERROR | CDROM_AUDIO_NO_STATUS => AudioState::Stopped,
            _ => AudioState::Unknown,
        };

        Ok(DriveStatus {
            state,
            track: subchannel.cdsc_trk,
            position: u32::try_from(subchannel.cdsc_reladdr).ok(),
        })
    }

    fn volume(&mut self) -> Result<DriveVolume, CdromError> {

        let mut volume = CdromVolctrl::default();
        self.request_with("CDROMVOLREAD", CDROMVOLREAD, &mut volume)?;

        Ok(DriveVolume {
            channels: [volume.channel0, volume.channel1, volume.channel2, volume.channel3],
        })
    }

    fn set_volume(&mut self, volume: DriveVolume) -> Result<(), CdromError> {

        let [channel0, channel1, channel2, channel3] = volume.channels;
        let mut control = CdromVolctrl { channel0, channel1, channel2, channel3 };

        self.request_with("CDROMVOLCTRL", CDROMVOLCTRL, &mut control)
    }
}
