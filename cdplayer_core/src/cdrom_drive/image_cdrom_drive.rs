// SPDX-License-Identifier: GPL-3.0
// image_cdrom_drive.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// This module contains the cue sheet parser, which describes the 'disc' held by
/// the image drive.
pub mod cue_sheet;

use super::{AudioState, CdromDrive, CdromError, DriveStatus, DriveVolume};
use cdplayer_utility::CD_FRAMES_PER_SECOND;
use cue_sheet::{CueSheet, TrackType};
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

/// Where the simulated transport is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Playback {
    Stopped,
    Playing { track: u8, resumed_at: Instant, played_before: Duration },
    Paused { track: u8, played: Duration },
}

/// This struct models a drive with a disc image loaded in it. Playback runs against
/// the wall clock: a track reports as finished once its length has elapsed.
pub struct ImageCdromDrive {

    // The cue sheet to (re)load whenever the tray closes.
    cue_path: PathBuf,

    // The loaded disc, absent while the tray is open.
    disc: Option<CueSheet>,

    // Transport position.
    playback: Playback,

    // Output volume, kept so it can be read back.
    volume: DriveVolume,

    // Name for log output.
    name: String,
}

/// Implementation functions for the image drive itself.
impl ImageCdromDrive {

    /// Creates a new image drive with the given cue sheet loaded.
    pub fn open(cue_path: &Path) -> Result<Self, CdromError> {

        let disc = CueSheet::load(cue_path)?;
        info!("Loaded {} ({} tracks)", cue_path.display(), disc.last_track());

        Ok(ImageCdromDrive {
            cue_path: cue_path.to_path_buf(),
            disc: Some(disc),
            playback: Playback::Stopped,
            volume: DriveVolume::from_level(1.0),
            name: format!("image {}", cue_path.display()),
        })
    }

    /// Returns the loaded disc, or NoDisc while the tray is open.
    fn disc(&self) -> Result<&CueSheet, CdromError> {
        self.disc.as_ref().ok_or(CdromError::NoDisc)
    }

    /// Returns the length in frames of a track on the loaded disc.
    fn length_of(&self, track: u8) -> Result<u32, CdromError> {
        self.disc()?
            .track(track)
            .map(|image_track| image_track.length)
            .ok_or(CdromError::NoSuchTrack(track))
    }

    /// Converts elapsed time into frames played.
    fn frames_in(elapsed: Duration) -> u32 {
        (elapsed.as_millis() * CD_FRAMES_PER_SECOND as u128 / 1000) as u32
    }
}

/// Implementation functions to be called from anything that understands what
/// a CdromDrive object is.
impl CdromDrive for ImageCdromDrive {

    fn name(&self) -> &str {
        &self.name
    }

    fn eject(&mut self) -> Result<(), CdromError> {

        self.playback = Playback::Stopped;
        self.disc = None;
        debug!("{}: tray opened", self.name);

        Ok(())
    }

    fn close_tray(&mut self) -> Result<(), CdromError> {

        if self.disc.is_none() {
            self.disc = Some(CueSheet::load(&self.cue_path)?);
            debug!("{}: tray closed", self.name);
        }

        Ok(())
    }

    fn read_disc_info(&mut self) -> Result<u8, CdromError> {
        Ok(self.disc()?.last_track())
    }

    fn is_audio_track(&mut self, track: u8) -> Result<bool, CdromError> {
        self.disc()?
            .track(track)
            .map(|image_track| image_track.track_type == TrackType::Audio)
            .ok_or(CdromError::NoSuchTrack(track))
    }

    fn track_length(&mut self, track: u8) -> Result<u32, CdromError> {
        self.length_of(track)
    }

    fn play_track(&mut self, track: u8) -> Result<(), CdromError> {

        // Validate the track exists before moving the transport.
        self.length_of(track)?;

        self.playback = Playback::Playing {
            track,
            resumed_at: Instant::now(),
            played_before: Duration::ZERO,
        };

        Ok(())
    }

    fn stop(&mut self) -> Result<(), CdromError> {

        self.disc()?;
        self.playback = Playback::Stopped;

        Ok(())
    }

    fn pause(&mut self) -> Result<(), CdromError> {

        if let Playback::Playing { track, resumed_at, played_before } = self.playback {
            self.playback = Playback::Paused {
                track,
                played: played_before + resumed_at.elapsed(),
            };
        }

        Ok(())
    }

    fn resume(&mut self) -> Result<(), CdromError> {

        if let Playback::Paused { track, played } = self.playback {
            self.playback = Playback::Playing {
                track,
                resumed_at: Instant::now(),
                played_before: played,
            };
        }

        Ok(())
    }

    fn query_status(&mut self) -> Result<DriveStatus, CdromError> {

        self.disc()?;

        let (state, track, played) = match self.playback {
            Playback::Stopped => return Ok(DriveStatus {
                state: AudioState::Stopped,
                track: 0,
                position: None,
            }),
            Playback::Playing { track, resumed_at, played_before } => {
                (AudioState::Playing, track, played_before + resumed_at.elapsed())
            },
            Playback::Paused { track, played } => (AudioState::Paused, track, played),
        };

        // Reaching the end of the track stops the transport.
        let position = Self::frames_in(played);
        if position >= self.length_of(track)? {
            self.playback = Playback::Stopped;
            return Ok(DriveStatus {
                state: AudioState::Stopped,
                track,
                position: None,
            });
        }

        Ok(DriveStatus {
            state,
            track,
            position: Some(position),
        })
    }

    fn volume(&mut self) -> Result<DriveVolume, CdromError> {
        Ok(self.volume)
    }

    fn set_volume(&mut self, volume: DriveVolume) -> Result<(), CdromError> {

        self.volume = volume;

        Ok(())
    }
}
