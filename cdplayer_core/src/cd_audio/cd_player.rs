// SPDX-License-Identifier: GPL-3.0
// cd_player.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{CdAudio, CdAudioError};
use crate::{
    cdrom_drive::{
        image_cdrom_drive::ImageCdromDrive,
        AudioState,
        CdromDrive,
        CdromError,
        DriveVolume,
    },
    config::{CdAudioConfig, CdBackend},
};
use log::{debug, info, warn};
use std::{
    path::Path,
    time::{Duration, Instant},
};

/// Size of the remap table. Entry 0 exists only so track numbers can index it.
pub const REMAP_SIZE: usize = 100;

/// How often the poller asks the drive what it is doing while a track plays.
const STATUS_CHECK_INTERVAL: Duration = Duration::from_secs(2);

/// This struct holds everything the transport knows about the drive and disc.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportState {

    // Operator kill switch, when false every transport operation does nothing.
    pub enabled: bool,

    // Whether the last table of contents read found at least one track.
    pub disc_valid: bool,

    // Live playback status, and whether playback was paused rather than stopped.
    pub playing: bool,
    pub was_playing: bool,

    // Whether the current track restarts when it ends.
    pub looping: bool,

    // Physical track being played, and the last track on the disc.
    pub current_track: u8,
    pub max_track: u8,

    // Requested track number to physical track number.
    pub remap: [u8; REMAP_SIZE],

    // Last volume applied, compared against the configured value every tick.
    pub volume: f32,

    // Whether the drive accepted a hardware volume change at start-up.
    pub hardware_volume_supported: bool,
}

impl TransportState {

    /// Creates the initial state: enabled, identity remap, no disc known yet.
    pub fn new(volume: f32) -> Self {
        TransportState {
            enabled: true,
            disc_valid: false,
            playing: false,
            was_playing: false,
            looping: false,
            current_track: 0,
            max_track: 0,
            remap: identity_remap(),
            volume,
            hardware_volume_supported: false,
        }
    }

    /// Maps a requested track number to a physical one. Track 0 is never valid and
    /// numbers past the table are left as they are, so range checks reject both.
    pub fn resolve(&self, track: u8) -> u8 {

        match track {
            0 => 0,
            _ => self.remap.get(track as usize).copied().unwrap_or(track),
        }
    }
}

/// The transport as the outside world sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    Disabled,
    NoDisc,
    Stopped,
    Playing { track: u8, looping: bool },
    Paused { track: u8, looping: bool },
}

/// This struct is the CD player: the transport state machine bound to one drive.
pub struct CdPlayer {

    // The backend doing the actual work.
    drive: Box<dyn CdromDrive>,

    // Transport state.
    state: TransportState,

    // Drive volume found at start-up, put back at shutdown.
    saved_volume: Option<DriveVolume>,

    // Earliest time the poller may next query the drive.
    next_status_check: Option<Instant>,

    // Set once the drive has been released.
    shut_down: bool,
}

/// Implementation functions for the CD player itself.
impl CdPlayer {

    /// Opens the drive named by the configuration and builds a player around it.
    /// This is the only operation whose failure the engine ever sees: if it fails,
    /// CD audio stays off for the session.
    pub fn open(config: &CdAudioConfig) -> Result<Self, CdAudioError> {

        if config.no_cd {
            return Err(CdAudioError::Disabled);
        }

        let drive = match config.backend {
            CdBackend::Ioctl => open_ioctl_drive(&config.device),
            CdBackend::Image => ImageCdromDrive::open(&config.device)
                .map(|drive| Box::new(drive) as Box<dyn CdromDrive>),
        };

        match drive {
            Ok(drive) => Ok(CdPlayer::new(drive, config.volume)),
            Err(source) => Err(CdAudioError::Unavailable {
                device: config.device.clone(),
                source,
            }),
        }
    }

    /// Creates a new player around an already opened drive, probing the disc and
    /// the drive's hardware volume control.
    pub fn new(drive: Box<dyn CdromDrive>, volume: f32) -> Self {

        let mut player = CdPlayer {
            drive,
            state: TransportState::new(volume),
            saved_volume: None,
            next_status_check: None,
            shut_down: false,
        };

        info!("CD audio initialised (using {})", player.drive.name());

        if player.refresh_disc_info().is_err() {
            info!("No CD in drive {}", player.drive.name());
        }

        // Only claim hardware volume if we can both read it (to restore it later)
        // and set it.
        match player.drive.volume() {
            Ok(original) => {
                player.saved_volume = Some(original);
                player.state.hardware_volume_supported = player
                    .drive
                    .set_volume(DriveVolume::from_level(volume))
                    .is_ok();
            },
            Err(error) => debug!("{}: no hardware volume ({})", player.drive.name(), error),
        }

        player
    }

    /// Returns the current transport state.
    pub fn state(&self) -> &TransportState {
        &self.state
    }

    /// Returns the name of the drive in use.
    pub fn drive_name(&self) -> &str {
        self.drive.name()
    }

    /// Summarises the transport state.
    pub fn status(&self) -> TransportStatus {

        let track = self.state.current_track;
        let looping = self.state.looping;

        if !self.state.enabled {
            TransportStatus::Disabled
        } else if !self.state.disc_valid {
            TransportStatus::NoDisc
        } else if self.state.playing {
            TransportStatus::Playing { track, looping }
        } else if self.state.was_playing {
            TransportStatus::Paused { track, looping }
        } else {
            TransportStatus::Stopped
        }
    }

    /// True while the drive is open and the operator has not switched us off.
    fn usable(&self) -> bool {
        self.state.enabled && !self.shut_down
    }

    /// Re-reads the table of contents. The disc is invalid until this succeeds with
    /// at least one track.
    pub fn refresh_disc_info(&mut self) -> Result<u8, CdAudioError> {

        self.state.disc_valid = false;

        match self.drive.read_disc_info() {
            Ok(0) => {
                debug!("{}: no music tracks", self.drive.name());
                Err(CdAudioError::NoDisc)
            },
            Ok(last_track) => {
                self.state.disc_valid = true;
                self.state.max_track = last_track;
                Ok(last_track)
            },
            Err(CdromError::NoDisc) => Err(CdAudioError::NoDisc),
            Err(error) => {
                debug!("{}: unable to read disc info ({})", self.drive.name(), error);
                Err(CdAudioError::NoDisc)
            },
        }
    }

    /// Makes sure a readable disc is present, re-reading the table of contents once
    /// if the last read found nothing.
    pub fn ensure_disc(&mut self) -> Result<(), CdAudioError> {

        if !self.state.disc_valid {
            self.refresh_disc_info()?;
        }

        Ok(())
    }

    /// Plays a track, after passing it through the remap table.
    pub fn try_play(&mut self, track: u8, looping: bool) -> Result<(), CdAudioError> {

        if !self.usable() {
            return Ok(());
        }

        self.ensure_disc()?;

        let resolved = self.state.resolve(track);
        self.start_track(resolved, looping)
    }

    /// Plays a physical track. Asking for the track that is already playing does
    /// nothing; asking for another one stops the current one first.
    fn start_track(&mut self, track: u8, looping: bool) -> Result<(), CdAudioError> {

        if track < 1 || track > self.state.max_track {
            return Err(CdAudioError::BadTrack(track));
        }

        if !self.drive.is_audio_track(track)? {
            return Err(CdAudioError::DataTrack(track));
        }

        if self.state.playing {
            if self.state.current_track == track {
                return Ok(());
            }
            if let Err(error) = self.try_stop() {
                debug!("{}: stop before track change failed ({})", self.drive.name(), error);
            }
        }

        self.drive.play_track(track)?;

        self.state.looping = looping;
        self.state.current_track = track;
        self.state.playing = true;
        self.state.was_playing = false;

        // Don't let the disc advance while muted.
        if self.state.volume == 0.0 {
            self.try_pause()?;
        }

        Ok(())
    }

    /// Stops playback, whether playing or paused. The software state is updated even
    /// if the drive reports a failure.
    pub fn try_stop(&mut self) -> Result<(), CdAudioError> {

        if !self.usable() || !(self.state.playing || self.state.was_playing) {
            return Ok(());
        }

        let result = self.drive.stop();

        self.state.playing = false;
        self.state.was_playing = false;

        result.map_err(CdAudioError::from)
    }

    /// Pauses playback, remembering that something was playing.
    pub fn try_pause(&mut self) -> Result<(), CdAudioError> {

        if !self.usable() || !self.state.playing {
            return Ok(());
        }

        let result = self.drive.pause();

        self.state.was_playing = true;
        self.state.playing = false;

        result.map_err(CdAudioError::from)
    }

    /// Resumes playback, only if it was paused.
    pub fn try_resume(&mut self) -> Result<(), CdAudioError> {

        if !self.usable() || !self.state.disc_valid || !self.state.was_playing {
            return Ok(());
        }

        let result = self.drive.resume();

        self.state.playing = true;
        self.state.was_playing = false;

        result.map_err(CdAudioError::from)
    }

    /// Stops playback, ejects the disc and forgets about it.
    pub fn try_eject(&mut self) -> Result<(), CdAudioError> {

        self.state.disc_valid = false;

        if !self.usable() {
            return Ok(());
        }

        if let Err(error) = self.try_stop() {
            debug!("{}: stop before eject failed ({})", self.drive.name(), error);
        }

        self.drive.eject().map_err(CdAudioError::from)
    }

    /// Closes the disc tray, on drives that can.
    pub fn try_close_tray(&mut self) -> Result<(), CdAudioError> {

        if !self.usable() {
            return Ok(());
        }

        self.drive.close_tray().map_err(CdAudioError::from)
    }

    /// Applies a new volume. Silence pauses the disc and anything else resumes it;
    /// the level then goes to the drive if it has hardware volume control.
    pub fn try_set_volume(&mut self, level: f32) -> Result<(), CdAudioError> {

        if !self.usable() {
            return Ok(());
        }

        self.state.volume = level;

        let transport = if level == 0.0 {
            self.try_pause()
        } else {
            self.try_resume()
        };

        if self.state.hardware_volume_supported {
            self.drive.set_volume(DriveVolume::from_level(level))?;
        }

        transport
    }

    /// Switches the transport on. Playback does not resume by itself.
    pub fn enable(&mut self) {
        self.state.enabled = true;
    }

    /// Stops playback and switches the transport off.
    pub fn disable(&mut self) {

        if let Err(error) = self.try_stop() {
            debug!("{}: stop before disable failed ({})", self.drive.name(), error);
        }
        self.state.enabled = false;
    }

    /// Switches the transport on, stops playback, restores the identity remap and
    /// re-reads the disc.
    pub fn reset(&mut self) {

        self.state.enabled = true;

        if let Err(error) = self.try_stop() {
            debug!("{}: stop before reset failed ({})", self.drive.name(), error);
        }

        self.state.remap = identity_remap();

        if self.refresh_disc_info().is_err() {
            debug!("{}: no disc after reset", self.drive.name());
        }
    }

    /// Overwrites the remap table from track 1 onwards. Returns how many entries were
    /// written, which is less than supplied if the table runs out.
    pub fn set_remap(&mut self, targets: &[u8]) -> usize {

        let slots = &mut self.state.remap[1..];
        let count = targets.len().min(slots.len());
        slots[..count].copy_from_slice(&targets[..count]);

        count
    }

    /// Lists every remap entry that is not the identity, as (requested, physical).
    pub fn remapped_tracks(&self) -> Vec<(u8, u8)> {

        (1..REMAP_SIZE as u8)
            .filter(|&track| self.state.remap[track as usize] != track)
            .map(|track| (track, self.state.remap[track as usize]))
            .collect()
    }

    /// Returns the position within, and length of, the current track in frames, when
    /// something is playing or paused and the drive can report them.
    pub fn track_position(&mut self) -> Option<(u32, u32)> {

        if !self.state.playing && !self.state.was_playing {
            return None;
        }

        let position = self.drive.query_status().ok()?.position?;
        let length = self.drive.track_length(self.state.current_track).ok()?;

        Some((position, length))
    }

    /// Runs one poll with an explicit clock reading. Volume changes are picked up
    /// every call; the drive itself is only queried every couple of seconds while
    /// playing.
    pub fn update_at(&mut self, now: Instant, volume: f32) {

        if !self.usable() {
            return;
        }

        if volume != self.state.volume {
            if let Err(error) = self.try_set_volume(volume) {
                debug!("{}: volume change failed ({})", self.drive.name(), error);
            }
        }

        if !self.state.playing {
            return;
        }

        if self.next_status_check.is_some_and(|next| now < next) {
            return;
        }
        self.next_status_check = Some(now + STATUS_CHECK_INTERVAL);

        let status = match self.drive.query_status() {
            Ok(status) => status,
            Err(error) => {
                debug!("{}: status query failed ({})", self.drive.name(), error);
                self.state.playing = false;
                return;
            },
        };

        match status.state {
            AudioState::Playing | AudioState::Paused => {

                // Keep up with drives that move on to another track by themselves.
                if (1..=self.state.max_track).contains(&status.track) {
                    self.state.current_track = status.track;
                }
            },
            AudioState::Stopped | AudioState::Unknown => {

                self.state.playing = false;

                // Looping restarts the same physical track from its beginning.
                if self.state.looping {
                    // Already physical, so the remap table is not applied again.
                    let track = self.state.current_track;
                    let restart = self
                        .ensure_disc()
                        .and_then(|_| self.start_track(track, true));
                    if let Err(error) = restart {
                        log_failure("loop", &error);
                    }
                }
            },
        }
    }

    /// Stops playback, puts the drive volume back how we found it and releases the
    /// transport. Safe to call more than once.
    pub fn close(&mut self) {

        if self.shut_down {
            return;
        }

        // Stop regardless of the operator switch.
        self.state.enabled = true;
        if let Err(error) = self.try_stop() {
            debug!("{}: stop at shutdown failed ({})", self.drive.name(), error);
        }

        if self.state.hardware_volume_supported {
            if let Some(original) = self.saved_volume {
                if let Err(error) = self.drive.set_volume(original) {
                    debug!("{}: unable to restore volume ({})", self.drive.name(), error);
                }
            }
        }

        self.shut_down = true;
        info!("CD audio shut down ({})", self.drive.name());
    }
}

/// Implementation functions to be called from anything that understands what
/// a CdAudio object is.
impl CdAudio for CdPlayer {

    fn play(&mut self, track: u8, looping: bool) {
        if let Err(error) = self.try_play(track, looping) {
            log_failure("play", &error);
        }
    }

    fn stop(&mut self) {
        if let Err(error) = self.try_stop() {
            log_failure("stop", &error);
        }
    }

    fn pause(&mut self) {
        if let Err(error) = self.try_pause() {
            log_failure("pause", &error);
        }
    }

    fn resume(&mut self) {
        if let Err(error) = self.try_resume() {
            log_failure("resume", &error);
        }
    }

    fn update(&mut self, volume: f32) {
        self.update_at(Instant::now(), volume);
    }

    fn activate(&mut self, active: bool) {
        if active {
            CdAudio::resume(self);
        } else {
            CdAudio::pause(self);
        }
    }

    fn active(&self) -> bool {
        self.state.playing
    }

    fn shutdown(&mut self) {
        self.close();
    }
}

impl Drop for CdPlayer {

    fn drop(&mut self) {
        self.close();
    }
}

/// Logs a transport failure at a level matching how much the player cares.
fn log_failure(operation: &str, error: &CdAudioError) {

    match error {
        CdAudioError::BadTrack(_) | CdAudioError::DataTrack(_) => warn!("{}", error),
        _ => debug!("CD {} failed: {}", operation, error),
    }
}

/// Builds a remap table that maps every track to itself.
fn identity_remap() -> [u8; REMAP_SIZE] {
    std::array::from_fn(|index| index as u8)
}

/// Opens a physical drive through the kernel interface.
#[cfg(target_os = "linux")]
fn open_ioctl_drive(device: &Path) -> Result<Box<dyn CdromDrive>, CdromError> {

    use crate::cdrom_drive::linux_cdrom_drive::LinuxCdromDrive;

    Ok(Box::new(LinuxCdromDrive::open(device)?))
}

/// There is no kernel CD-ROM interface to open on this platform.
#[cfg(not(target_os = "linux"))]
fn open_ioctl_drive(_device: &Path) -> Result<Box<dyn CdromDrive>, CdromError> {
    Err(CdromError::Unsupported)
}

#[cfg(test)]
pub(crate) mod tests;
