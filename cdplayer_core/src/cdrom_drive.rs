// SPDX-License-Identifier: GPL-3.0
// cdrom_drive.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::io;
use thiserror::Error;

/// This module contains the Linux kernel CD-ROM backend, which drives a physical
/// drive through its ioctl interface.
#[cfg(target_os = "linux")]
pub mod linux_cdrom_drive;

/// This module contains a disc image backend, which behaves like a drive with a
/// cue sheet loaded into it.
pub mod image_cdrom_drive;

/// Errors a drive backend can report. None of these are ever fatal to the engine,
/// the transport decides whether to roll back, retry or ignore them.
#[derive(Debug, Error)]
pub enum CdromError {

    #[error("no disc in drive")]
    NoDisc,

    #[error("operation not supported by this drive")]
    Unsupported,

    #[error("track {0} is not on the disc")]
    NoSuchTrack(u8),

    #[error("{operation} failed: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("cue sheet line {line}: {reason}")]
    CueSheet {
        line: usize,
        reason: String,
    },
}

impl CdromError {

    /// Wraps the last OS error, tagged with the name of the operation that failed.
    pub fn last_os_error(operation: &'static str) -> Self {
        CdromError::Io {
            operation,
            source: io::Error::last_os_error(),
        }
    }
}

/// The audio status reported by a drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioState {
    Playing,
    Paused,
    Stopped,
    Unknown,
}

/// A snapshot of what the drive believes it is doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DriveStatus {
    pub state: AudioState,

    // Physical track the drive is positioned on (0 if unknown).
    pub track: u8,

    // Frames into the current track, if the drive can tell us.
    pub position: Option<u32>,
}

/// Hardware volume for the four audio output channels of a drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DriveVolume {
    pub channels: [u8; 4],
}

impl DriveVolume {

    /// Builds a volume with every channel set from a level between 0.0 and 1.0.
    pub fn from_level(level: f32) -> Self {

        let value = (level.clamp(0.0, 1.0) * 255.0) as u8;

        DriveVolume { channels: [value; 4] }
    }
}

/// This trait provides an implementation-opaque way of calling CD-ROM drive methods
/// from the transport. Track numbers are always physical, 1-based track numbers.
pub trait CdromDrive {

    /// Implementations must return a name for the drive suitable for log output.
    fn name(&self) -> &str;

    /// Implementations must eject the disc tray.
    fn eject(&mut self) -> Result<(), CdromError>;

    /// Implementations may close the disc tray, if the hardware supports it.
    fn close_tray(&mut self) -> Result<(), CdromError> {
        Err(CdromError::Unsupported)
    }

    /// Implementations must read the table of contents and return the number of the
    /// last track on the disc, or 0 if there are no usable tracks.
    fn read_disc_info(&mut self) -> Result<u8, CdromError>;

    /// Implementations must report whether the given track holds audio rather than data.
    fn is_audio_track(&mut self, track: u8) -> Result<bool, CdromError>;

    /// Implementations may return the length of the given track in frames.
    fn track_length(&mut self, _track: u8) -> Result<u32, CdromError> {
        Err(CdromError::Unsupported)
    }

    /// Implementations must begin playing the given track from its start, and stop
    /// at its end.
    fn play_track(&mut self, track: u8) -> Result<(), CdromError>;

    /// Implementations must stop playback.
    fn stop(&mut self) -> Result<(), CdromError>;

    /// Implementations must pause playback.
    fn pause(&mut self) -> Result<(), CdromError>;

    /// Implementations must resume paused playback, and do nothing otherwise.
    fn resume(&mut self) -> Result<(), CdromError>;

    /// Implementations must report the current audio status.
    fn query_status(&mut self) -> Result<DriveStatus, CdromError>;

    /// Implementations may read the hardware volume.
    fn volume(&mut self) -> Result<DriveVolume, CdromError> {
        Err(CdromError::Unsupported)
    }

    /// Implementations may set the hardware volume.
    fn set_volume(&mut self, _volume: DriveVolume) -> Result<(), CdromError> {
        Err(CdromError::Unsupported)
    }
}
