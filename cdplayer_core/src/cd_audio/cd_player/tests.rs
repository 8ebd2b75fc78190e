// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{CdPlayer, TransportStatus, REMAP_SIZE};
use crate::{
    cd_audio::{CdAudio, CdAudioError},
    cdrom_drive::{AudioState, CdromDrive, CdromError, DriveStatus, DriveVolume},
    config::{CdAudioConfig, CdBackend},
};
use std::{
    cell::RefCell,
    io,
    rc::Rc,
    time::{Duration, Instant},
};

// Tests for the CD player transport, driven against a recording mock drive.

/// Every drive call the mock sees.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Eject,
    CloseTray,
    ReadDiscInfo,
    Play(u8),
    Stop,
    Pause,
    Resume,
    QueryStatus,
    SetVolume(DriveVolume),
}

/// What the mock drive pretends is going on, shared with the test.
pub struct MockDisc {
    pub tracks: Vec<bool>,
    pub disc_present: bool,
    pub status: AudioState,
    pub status_track: u8,
    pub volume: Option<DriveVolume>,
    pub fail_play: bool,
    pub fail_status: bool,
    pub calls: Vec<Call>,
}

/// A drive that records every call into shared state.
pub struct MockDrive {
    disc: Rc<RefCell<MockDisc>>,
}

impl CdromDrive for MockDrive {

    fn name(&self) -> &str {
        "mock"
    }

    fn eject(&mut self) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::Eject);
        disc.disc_present = false;
        Ok(())
    }

    fn close_tray(&mut self) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::CloseTray);
        disc.disc_present = true;
        Ok(())
    }

    fn read_disc_info(&mut self) -> Result<u8, CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::ReadDiscInfo);
        if disc.disc_present {
            Ok(disc.tracks.len() as u8)
        } else {
            Err(CdromError::NoDisc)
        }
    }

    fn is_audio_track(&mut self, track: u8) -> Result<bool, CdromError> {
        let disc = self.disc.borrow();
        disc.tracks
            .get(track as usize - 1)
            .copied()
            .ok_or(CdromError::NoSuchTrack(track))
    }

    fn track_length(&mut self, _track: u8) -> Result<u32, CdromError> {
        Ok(75 * 60)
    }

    fn play_track(&mut self, track: u8) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::Play(track));
        if disc.fail_play {
            return Err(CdromError::Io {
                operation: "CDROMPLAYTRKIND",
                source: io::Error::other("drive fell over"),
            });
        }
        disc.status = AudioState::Playing;
        disc.status_track = track;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::Stop);
        disc.status = AudioState::Stopped;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::Pause);
        disc.status = AudioState::Paused;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::Resume);
        disc.status = AudioState::Playing;
        Ok(())
    }

    fn query_status(&mut self) -> Result<DriveStatus, CdromError> {
        let mut disc = self.disc.borrow_mut();
        disc.calls.push(Call::QueryStatus);
        if disc.fail_status {
            return Err(CdromError::NoDisc);
        }
        Ok(DriveStatus {
            state: disc.status,
            track: disc.status_track,
            position: Some(75 * 30 + 15),
        })
    }

    fn volume(&mut self) -> Result<DriveVolume, CdromError> {
        self.disc.borrow().volume.ok_or(CdromError::Unsupported)
    }

    fn set_volume(&mut self, volume: DriveVolume) -> Result<(), CdromError> {
        let mut disc = self.disc.borrow_mut();
        if disc.volume.is_none() {
            return Err(CdromError::Unsupported);
        }
        disc.calls.push(Call::SetVolume(volume));
        disc.volume = Some(volume);
        Ok(())
    }
}

/// Builds a shared mock disc with the given audio/data layout (true is audio).
pub fn mock_disc(tracks: &[bool]) -> Rc<RefCell<MockDisc>> {
    Rc::new(RefCell::new(MockDisc {
        tracks: tracks.to_vec(),
        disc_present: true,
        status: AudioState::Stopped,
        status_track: 0,
        volume: None,
        fail_play: false,
        fail_status: false,
        calls: vec![],
    }))
}

/// Builds a player on top of a mock disc, then forgets the start-up calls.
pub fn player_with(disc: &Rc<RefCell<MockDisc>>, volume: f32) -> CdPlayer {
    let player = CdPlayer::new(Box::new(MockDrive { disc: Rc::clone(disc) }), volume);
    disc.borrow_mut().calls.clear();
    player
}

/// Counts calls matching the given one.
fn count(disc: &Rc<RefCell<MockDisc>>, call: &Call) -> usize {
    disc.borrow().calls.iter().filter(|seen| *seen == call).count()
}

#[test]
fn new_player_should_start_enabled_with_identity_remap() {

    let disc = mock_disc(&[true; 10]);
    let player = player_with(&disc, 1.0);

    assert!(player.state().enabled);
    assert!(player.state().disc_valid);
    assert_eq!(player.state().max_track, 10);
    assert!(!player.state().hardware_volume_supported);
    for track in 0..REMAP_SIZE {
        assert_eq!(player.state().remap[track] as usize, track);
    }
    assert_eq!(player.status(), TransportStatus::Stopped);
}

#[test]
fn new_player_without_disc_should_report_no_disc() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().disc_present = false;
    let player = player_with(&disc, 1.0);

    assert_eq!(player.status(), TransportStatus::NoDisc);
}

#[test]
fn play_should_start_requested_track() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    player.try_play(3, false).unwrap();

    assert_eq!(player.status(), TransportStatus::Playing { track: 3, looping: false });
    assert_eq!(disc.borrow().calls, vec![Call::Play(3)]);
}

#[test]
fn play_of_same_track_should_start_it_only_once() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    player.try_play(4, false).unwrap();
    player.try_play(4, true).unwrap();

    assert_eq!(count(&disc, &Call::Play(4)), 1);
    assert!(!player.state().looping);
}

#[test]
fn play_of_different_track_should_stop_first() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    player.try_play(2, false).unwrap();
    player.try_play(5, true).unwrap();

    assert_eq!(disc.borrow().calls, vec![Call::Play(2), Call::Stop, Call::Play(5)]);
    assert_eq!(player.status(), TransportStatus::Playing { track: 5, looping: true });
}

#[test]
fn play_out_of_range_should_be_rejected_without_state_change() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(3, false).unwrap();
    let before = player.state().clone();

    let result = player.try_play(11, false);

    assert!(matches!(result, Err(CdAudioError::BadTrack(11))));
    assert_eq!(player.state(), &before);

    let result = player.try_play(0, false);

    assert!(matches!(result, Err(CdAudioError::BadTrack(0))));
    assert_eq!(player.state(), &before);
}

#[test]
fn play_should_remap_before_range_check() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    player.set_remap(&[1, 2, 7]);
    player.try_play(3, false).unwrap();

    assert_eq!(player.state().current_track, 7);
    assert_eq!(disc.borrow().calls, vec![Call::Play(7)]);

    // The bad number reported is the remapped one.
    player.set_remap(&[12]);
    assert!(matches!(player.try_play(1, false), Err(CdAudioError::BadTrack(12))));
}

#[test]
fn play_of_data_track_should_be_rejected() {

    let disc = mock_disc(&[false, true, true]);
    let mut player = player_with(&disc, 1.0);

    let result = player.try_play(1, false);

    assert!(matches!(result, Err(CdAudioError::DataTrack(1))));
    assert!(!player.state().playing);
    assert!(disc.borrow().calls.is_empty());
}

#[test]
fn failed_start_should_leave_playing_unset() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().fail_play = true;
    let mut player = player_with(&disc, 1.0);

    let result = player.try_play(2, false);

    assert!(matches!(result, Err(CdAudioError::Drive(_))));
    assert!(!player.state().playing);
}

#[test]
fn play_at_zero_volume_should_pause_straight_away() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 0.0);

    player.try_play(2, true).unwrap();

    assert_eq!(disc.borrow().calls, vec![Call::Play(2), Call::Pause]);
    assert_eq!(player.status(), TransportStatus::Paused { track: 2, looping: true });
}

#[test]
fn play_should_refresh_disc_info_once_when_disc_invalid() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().disc_present = false;
    let mut player = player_with(&disc, 1.0);

    assert!(matches!(player.try_play(1, false), Err(CdAudioError::NoDisc)));
    assert_eq!(disc.borrow().calls, vec![Call::ReadDiscInfo]);

    // Insert a disc, the next play picks it up.
    disc.borrow_mut().disc_present = true;
    player.try_play(1, false).unwrap();

    assert!(player.state().disc_valid);
    assert!(player.state().playing);
}

#[test]
fn pause_then_resume_should_restore_playback() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(6, true).unwrap();

    player.try_pause().unwrap();

    assert_eq!(player.status(), TransportStatus::Paused { track: 6, looping: true });
    assert!(player.state().was_playing && !player.state().playing);

    player.try_resume().unwrap();

    assert_eq!(player.status(), TransportStatus::Playing { track: 6, looping: true });
    assert!(!player.state().was_playing);
}

#[test]
fn resume_without_pause_should_do_nothing() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    player.try_resume().unwrap();

    assert!(!player.state().playing);
    assert!(disc.borrow().calls.is_empty());
}

#[test]
fn stop_while_paused_should_forget_the_pause() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();
    player.try_pause().unwrap();

    player.try_stop().unwrap();
    player.try_resume().unwrap();

    assert_eq!(player.status(), TransportStatus::Stopped);
    assert_eq!(count(&disc, &Call::Resume), 0);
}

#[test]
fn zero_volume_should_pause_and_volume_should_resume() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();

    player.try_set_volume(0.0).unwrap();
    assert!(!player.state().playing);

    player.try_set_volume(0.5).unwrap();
    assert!(player.state().playing);
    assert_eq!(player.state().current_track, 2);
}

#[test]
fn volume_should_reach_hardware_when_supported() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().volume = Some(DriveVolume { channels: [200; 4] });
    let mut player = player_with(&disc, 1.0);

    assert!(player.state().hardware_volume_supported);

    player.try_set_volume(0.5).unwrap();

    assert_eq!(disc.borrow().calls, vec![Call::SetVolume(DriveVolume::from_level(0.5))]);
}

#[test]
fn reset_should_restore_identity_remap_and_stop() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.set_remap(&[9, 8, 7]);
    player.try_play(1, false).unwrap();
    player.disable();

    player.reset();

    assert!(player.state().enabled);
    assert!(!player.state().playing);
    assert!(player.remapped_tracks().is_empty());
    for track in 1..REMAP_SIZE {
        assert_eq!(player.state().resolve(track as u8) as usize, track);
    }
}

#[test]
fn set_remap_should_ignore_entries_past_the_table() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);

    let written = player.set_remap(&[5; 120]);

    assert_eq!(written, 99);
    assert_eq!(player.remapped_tracks().len(), 98);
}

#[test]
fn disable_should_stop_and_block_play() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(5, false).unwrap();

    player.disable();

    assert!(!player.state().playing);
    assert!(!player.state().enabled);
    assert_eq!(player.status(), TransportStatus::Disabled);

    player.try_play(5, false).unwrap();
    assert!(!player.state().playing);
    assert_eq!(count(&disc, &Call::Play(5)), 1);

    // Coming back on does not restart anything.
    player.enable();
    assert!(!player.state().playing);
}

#[test]
fn eject_should_stop_and_invalidate_disc() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(3, false).unwrap();

    player.try_eject().unwrap();

    assert_eq!(disc.borrow().calls, vec![Call::Play(3), Call::Stop, Call::Eject]);
    assert!(!player.state().disc_valid);
    assert_eq!(player.status(), TransportStatus::NoDisc);
}

#[test]
fn eject_while_disabled_should_forget_disc_without_touching_drive() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.disable();
    disc.borrow_mut().calls.clear();

    player.try_eject().unwrap();

    assert!(!player.state().disc_valid);
    assert!(disc.borrow().calls.is_empty());
}

#[test]
fn poller_should_restart_a_looping_track_when_it_ends() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, true).unwrap();

    disc.borrow_mut().status = AudioState::Stopped;
    player.update_at(Instant::now(), 1.0);

    assert_eq!(disc.borrow().calls, vec![Call::Play(2), Call::QueryStatus, Call::Play(2)]);
    assert_eq!(player.status(), TransportStatus::Playing { track: 2, looping: true });
}

#[test]
fn poller_should_not_remap_a_looping_track_twice() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.set_remap(&[4, 2, 3, 6]);
    player.try_play(1, true).unwrap();

    disc.borrow_mut().status = AudioState::Stopped;
    player.update_at(Instant::now(), 1.0);

    assert_eq!(count(&disc, &Call::Play(4)), 2);
    assert_eq!(player.state().current_track, 4);
}

#[test]
fn poller_should_stop_when_a_track_ends_without_looping() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();

    disc.borrow_mut().status = AudioState::Stopped;
    player.update_at(Instant::now(), 1.0);

    assert!(!CdAudio::active(&player));
    assert_eq!(count(&disc, &Call::Play(2)), 1);
}

#[test]
fn poller_should_follow_the_drive_onto_another_track() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();

    disc.borrow_mut().status_track = 3;
    player.update_at(Instant::now(), 1.0);

    assert_eq!(player.state().current_track, 3);
}

#[test]
fn poller_should_query_at_most_every_two_seconds() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();
    let start = Instant::now();

    player.update_at(start, 1.0);
    player.update_at(start + Duration::from_millis(500), 1.0);
    player.update_at(start + Duration::from_millis(1999), 1.0);
    assert_eq!(count(&disc, &Call::QueryStatus), 1);

    player.update_at(start + Duration::from_secs(2), 1.0);
    assert_eq!(count(&disc, &Call::QueryStatus), 2);
}

#[test]
fn poller_should_stop_when_status_query_fails() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, true).unwrap();

    disc.borrow_mut().fail_status = true;
    player.update_at(Instant::now(), 1.0);

    assert!(!player.state().playing);
    assert_eq!(count(&disc, &Call::Play(2)), 1);
}

#[test]
fn poller_should_apply_volume_changes_once() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().volume = Some(DriveVolume { channels: [255; 4] });
    let mut player = player_with(&disc, 1.0);
    let now = Instant::now();

    player.update_at(now, 0.25);
    player.update_at(now, 0.25);

    assert_eq!(count(&disc, &Call::SetVolume(DriveVolume::from_level(0.25))), 1);
    assert_eq!(player.state().volume, 0.25);
}

#[test]
fn activate_should_pause_and_resume() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    CdAudio::play(&mut player, 2, false);

    player.activate(false);
    assert!(!player.active());

    player.activate(true);
    assert!(player.active());
}

#[test]
fn shutdown_should_stop_and_restore_volume_once() {

    let disc = mock_disc(&[true; 10]);
    disc.borrow_mut().volume = Some(DriveVolume { channels: [200; 4] });
    let mut player = player_with(&disc, 0.5);
    player.try_play(2, false).unwrap();

    player.shutdown();
    player.shutdown();

    let restore = Call::SetVolume(DriveVolume { channels: [200; 4] });
    assert_eq!(count(&disc, &Call::Stop), 1);
    assert_eq!(count(&disc, &restore), 1);

    // Nothing reaches the drive once it is released.
    CdAudio::play(&mut player, 3, false);
    drop(player);
    assert_eq!(count(&disc, &Call::Play(3)), 0);
    assert_eq!(count(&disc, &restore), 1);
}

#[test]
fn drop_should_shut_down() {

    let disc = mock_disc(&[true; 10]);
    let mut player = player_with(&disc, 1.0);
    player.try_play(2, false).unwrap();

    drop(player);

    assert_eq!(count(&disc, &Call::Stop), 1);
}

#[test]
fn open_should_refuse_when_disabled_by_configuration() {

    let mut config = CdAudioConfig::new();
    config.no_cd = true;

    assert!(matches!(CdPlayer::open(&config), Err(CdAudioError::Disabled)));
}

#[test]
fn open_should_report_unavailable_drive() {

    let mut config = CdAudioConfig::new();
    config.backend = CdBackend::Image;
    config.device = "/nonexistent/disc.cue".into();

    assert!(matches!(CdPlayer::open(&config), Err(CdAudioError::Unavailable { .. })));
}
