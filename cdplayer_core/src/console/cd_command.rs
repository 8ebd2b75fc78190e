// SPDX-License-Identifier: GPL-3.0
// cd_command.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::ConsoleOutput;
use crate::{
    cd_audio::{
        cd_player::{CdPlayer, TransportStatus},
        CdAudioError,
    },
    cdrom_drive::CdromError,
};
use cdplayer_utility::{parse_track_number, Msf};
use log::{debug, warn};

/// The name the command is registered under.
pub const COMMAND_NAME: &str = "cdplayer";

/// One parsed `cdplayer` subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CdCommand {
    On,
    Off,
    Reset,
    Remap(Vec<u8>),
    Play(u8),
    Loop(u8),
    Stop,
    Pause,
    Resume,
    Eject,
    Close,
    Info,
}

impl CdCommand {

    /// Parses the arguments following the command name. The first argument picks
    /// the subcommand, ignoring case; unknown subcommands give None.
    pub fn parse(args: &[&str]) -> Option<Self> {

        let (name, rest) = args.split_first()?;
        let track = || rest.first().map_or(0, |arg| parse_track_number(arg));

        let command = match name.to_ascii_lowercase().as_str() {
            "on" => CdCommand::On,
            "off" => CdCommand::Off,
            "reset" => CdCommand::Reset,
            "remap" => CdCommand::Remap(rest.iter().map(|arg| parse_track_number(arg)).collect()),
            "play" => CdCommand::Play(track()),
            "loop" => CdCommand::Loop(track()),
            "stop" => CdCommand::Stop,
            "pause" => CdCommand::Pause,
            "resume" => CdCommand::Resume,
            "eject" => CdCommand::Eject,
            "close" => CdCommand::Close,
            "info" => CdCommand::Info,
            _ => return None,
        };

        Some(command)
    }

    /// Whether the subcommand needs a readable disc before it can run.
    fn needs_disc(&self) -> bool {
        !matches!(
            self,
            CdCommand::On | CdCommand::Off | CdCommand::Reset | CdCommand::Remap(_) | CdCommand::Close
        )
    }
}

/// Runs the `cdplayer` console command against a player. Nothing here fails: every
/// problem ends up as a line of console output or a log message.
pub fn cd_command(player: &mut CdPlayer, args: &[&str], out: &mut dyn ConsoleOutput) {

    if args.is_empty() {
        out.print("commands: on, off, reset, remap,");
        out.print("play, stop, loop, pause, resume");
        out.print("eject, close, info");
        return;
    }

    let Some(command) = CdCommand::parse(args) else {
        debug!("{}: ignoring unknown subcommand {}", COMMAND_NAME, args[0]);
        return;
    };

    if command.needs_disc() && player.ensure_disc().is_err() {
        out.print(&CdAudioError::NoDisc.to_string());
        return;
    }

    let result = match command {
        CdCommand::On => {
            player.enable();
            Ok(())
        },
        CdCommand::Off => {
            player.disable();
            Ok(())
        },
        CdCommand::Reset => {
            player.reset();
            Ok(())
        },
        CdCommand::Remap(targets) => {
            remap(player, &targets, out);
            Ok(())
        },
        CdCommand::Play(track) => player.try_play(track, false),
        CdCommand::Loop(track) => player.try_play(track, true),
        CdCommand::Stop => player.try_stop(),
        CdCommand::Pause => player.try_pause(),
        CdCommand::Resume => player.try_resume(),
        CdCommand::Eject => player.try_eject(),
        CdCommand::Close => player.try_close_tray(),
        CdCommand::Info => {
            info(player, out);
            Ok(())
        },
    };

    if let Err(error) = result {
        report(player, args[0], error, out);
    }
}

/// Lists the remap table, or overwrites it from track 1 onwards.
fn remap(player: &mut CdPlayer, targets: &[u8], out: &mut dyn ConsoleOutput) {

    if targets.is_empty() {
        for (track, physical) in player.remapped_tracks() {
            out.print(&format!("  {} -> {}", track, physical));
        }
        return;
    }

    let written = player.set_remap(targets);
    if written < targets.len() {
        warn!(
            "{} remap: only {} tracks can be remapped, ignored {}",
            COMMAND_NAME,
            written,
            targets.len() - written
        );
    }
}

/// Prints the disc and transport summary.
fn info(player: &mut CdPlayer, out: &mut dyn ConsoleOutput) {

    out.print(&format!("{} tracks", player.state().max_track));

    match player.status() {
        TransportStatus::Playing { track, looping } => {
            out.print(&format!("Currently {} track {}", loop_word(looping), track));
        },
        TransportStatus::Paused { track, looping } => {
            out.print(&format!("Paused {} track {}", loop_word(looping), track));
        },
        _ => (),
    }

    if let Some((position, length)) = player.track_position() {
        out.print(&format!(
            "Current position: {} (of {})",
            Msf::from_frames(position),
            Msf::from_frames(length)
        ));
    }

    out.print(&format!("Volume is {:.6}", player.state().volume));
}

fn loop_word(looping: bool) -> &'static str {
    if looping { "looping" } else { "playing" }
}

/// Turns a failed subcommand into output. Operator mistakes go to the console,
/// drive trouble only to the log.
fn report(player: &CdPlayer, subcommand: &str, error: CdAudioError, out: &mut dyn ConsoleOutput) {

    match error {
        CdAudioError::BadTrack(_) | CdAudioError::DataTrack(_) | CdAudioError::NoDisc => {
            out.print(&error.to_string());
        },
        CdAudioError::Drive(CdromError::Unsupported) => {
            out.print(&format!(
                "CDAudio: {} not supported by {}",
                subcommand.to_ascii_lowercase(),
                player.drive_name()
            ));
        },
        _ => debug!("{} {}: {}", COMMAND_NAME, subcommand, error),
    }
}
