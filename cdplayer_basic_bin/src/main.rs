// SPDX-License-Identifier: GPL-3.0
// main.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    ffi::OsString,
    io::{self, BufRead},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

// This file is the core of the basic client - it exists merely as a CLI-based
// program to drive the CD player from a console, standing in for the engine's
// own console and frame loop.

use clap::{Parser, ValueEnum};
use cdplayer_core::{
    cd_audio::{cd_player::CdPlayer, CdAudio},
    config::{CdAudioConfig, CdBackend},
    console::{
        cd_command::{cd_command, COMMAND_NAME},
        ConsoleOutput,
    },
};
use log::{error, info, LevelFilter};

/// How long one 'frame' of the main loop waits for console input.
const FRAME_TIME: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, ValueEnum)]
enum BackendArg {
    Ioctl,
    Image,
}

#[derive(Parser)]
#[command(
    version,
    about = "A basic barebones console for the cdplayer CD audio transport",
    long_about = None
)]
struct CdPlayerArgs {
    #[arg(
        long = "dev",
        help = "The CD-ROM device node, or cue sheet for the image backend",
        default_value = "/dev/cdrom",
        id = "device"
    )]
    device: OsString,

    #[arg(
        long = "backend",
        help = "Which drive backend to use",
        value_enum,
        default_value = "ioctl"
    )]
    backend: BackendArg,

    #[arg(
        long = "volume",
        help = "Initial CD volume, from 0.0 to 1.0",
        default_value_t = 1.0
    )]
    volume: f32,

    #[arg(
        long = "nocd",
        help = "Disable CD audio entirely"
    )]
    no_cd: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Show drive-level diagnostics"
    )]
    verbose: bool,
}

/// Console output that just goes to stdout.
struct StdoutConsole;

impl ConsoleOutput for StdoutConsole {

    fn print(&mut self, line: &str) {
        println!("{}", line);
    }
}

fn main() {
    let args = CdPlayerArgs::parse();

    let mut log_builder = colog::default_builder();
    log_builder.filter(None, if args.verbose { LevelFilter::Debug } else { LevelFilter::Info });
    log_builder.init();

    let mut config = CdAudioConfig::new();
    config.no_cd = args.no_cd;
    config.device = args.device.into();
    config.backend = match args.backend {
        BackendArg::Ioctl => CdBackend::Ioctl,
        BackendArg::Image => CdBackend::Image,
    };
    config.set_volume(args.volume);

    // Without a player the cdplayer command simply doesn't exist.
    let mut player = match CdPlayer::open(&config) {
        Ok(player) => Some(player),
        Err(err) => {
            error!("{}", err);
            None
        },
    };

    // Read the console on its own thread so the frame loop keeps ticking.
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    let mut console = StdoutConsole;
    info!("Type '{} <subcommand>', 'volume <level>' or 'quit'", COMMAND_NAME);

    loop {
        match receiver.recv_timeout(FRAME_TIME) {
            Ok(line) => {
                let words: Vec<&str> = line.split_whitespace().collect();
                match words.split_first() {
                    Some((&"quit" | &"exit", _)) => break,
                    Some((&"volume", rest)) => match rest.first().map(|level| level.parse::<f32>()) {
                        Some(Ok(level)) => config.set_volume(level),
                        _ => console.print(&format!("volume is {}", config.volume)),
                    },
                    Some((&name, rest)) if name == COMMAND_NAME => match player.as_mut() {
                        Some(player) => cd_command(player, rest, &mut console),
                        None => console.print(&format!("Unknown command \"{}\"", name)),
                    },
                    Some((&name, _)) => console.print(&format!("Unknown command \"{}\"", name)),
                    None => (),
                }
            },
            Err(RecvTimeoutError::Timeout) => (),
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(player) = player.as_mut() {
            player.update(config.volume);
        }
    }

    if let Some(player) = player.as_mut() {
        player.shutdown();
    }
}
