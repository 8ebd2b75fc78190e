// SPDX-License-Identifier: GPL-3.0
// cd_audio.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::cdrom_drive::CdromError;
use std::path::PathBuf;
use thiserror::Error;

/// This module contains the default CD audio implementation: the transport state
/// machine, written against the CdromDrive trait.
pub mod cd_player;

/// Errors raised by transport operations. Only opening the player hands one of these
/// to the engine; everything else ends up as a log or console line.
#[derive(Debug, Error)]
pub enum CdAudioError {

    #[error("CD audio disabled by configuration")]
    Disabled,

    #[error("unable to open CD-ROM drive {}: {source}", .device.display())]
    Unavailable {
        device: PathBuf,
        #[source]
        source: CdromError,
    },

    #[error("No CD in player.")]
    NoDisc,

    #[error("CDAudio: bad track number {0}.")]
    BadTrack(u8),

    #[error("CDAudio: track {0} is not audio")]
    DataTrack(u8),

    #[error(transparent)]
    Drive(#[from] CdromError),
}

/// This trait provides an implementation-opaque way for the engine to drive CD
/// music. None of these calls can fail from the engine's point of view.
pub trait CdAudio {

    /// Implementations must start the requested track, optionally looping it.
    fn play(&mut self, track: u8, looping: bool);

    /// Implementations must stop playback.
    fn stop(&mut self);

    /// Implementations must pause playback.
    fn pause(&mut self);

    /// Implementations must resume paused playback.
    fn resume(&mut self);

    /// This must be called once per engine frame with the current volume setting.
    fn update(&mut self, volume: f32);

    /// This must be called when the game window gains or loses focus.
    fn activate(&mut self, active: bool);

    /// Implementations must report whether a track is currently playing.
    fn active(&self) -> bool;

    /// Implementations must stop playback and release the drive.
    fn shutdown(&mut self);
}
