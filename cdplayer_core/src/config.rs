// SPDX-License-Identifier: GPL-3.0
// config.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::path::PathBuf;

/// Which drive backend the CD player should open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CdBackend {

    /// A physical drive, through the kernel ioctl interface.
    Ioctl,

    /// A cue sheet disc image.
    Image,
}

/// This struct holds the settings the CD player reads when it is opened. The volume
/// is also re-read by the engine every tick and handed to the poller.
#[derive(Clone, Debug, PartialEq)]
pub struct CdAudioConfig {

    // Persisted kill switch, when set the drive is never opened.
    pub no_cd: bool,

    // Device node, or cue sheet path for the image backend.
    pub device: PathBuf,

    pub backend: CdBackend,

    // Playback volume between 0.0 and 1.0.
    pub volume: f32,
}

impl CdAudioConfig {

    /// Creates the default configuration: enabled, full volume, default device.
    pub fn new() -> Self {
        CdAudioConfig {
            no_cd: false,
            device: PathBuf::from("/dev/cdrom"),
            backend: CdBackend::Ioctl,
            volume: 1.0,
        }
    }

    /// Sets the volume, clamped into range. NaN is treated as silence.
    pub fn set_volume(&mut self, volume: f32) {

        self.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }
}

#[cfg(test)]
mod tests {

    use super::{CdAudioConfig, CdBackend};

    #[test]
    fn new_should_enable_full_volume_on_default_device() {

        let config = CdAudioConfig::new();

        assert!(!config.no_cd);
        assert_eq!(config.backend, CdBackend::Ioctl);
        assert_eq!(config.volume, 1.0);
        assert_eq!(config.device.to_str(), Some("/dev/cdrom"));
    }

    #[test]
    fn set_volume_should_clamp_into_range() {

        let mut config = CdAudioConfig::new();

        config.set_volume(1.5);
        assert_eq!(config.volume, 1.0);

        config.set_volume(-0.5);
        assert_eq!(config.volume, 0.0);

        config.set_volume(f32::NAN);
        assert_eq!(config.volume, 0.0);
    }
}
