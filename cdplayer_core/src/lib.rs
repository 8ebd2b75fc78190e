// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Crate-wide lines to disable specific lints:

// Constructors here open devices or take collaborators, so a Default
// implementation would not make sense for most types.
#![allow(clippy::new_without_default)]

/// This module contains CD-ROM drive backends, and the trait the transport
/// uses to talk to them.
pub mod cdrom_drive;

/// This module contains the CD audio transport that the engine drives.
pub mod cd_audio;

/// This module contains the console command surface for the CD player.
pub mod console;

/// This module contains the externally supplied CD audio settings.
pub mod config;
