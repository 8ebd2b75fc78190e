// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2025, under GPLv3 only.

// This crate contains useful utility functions that can be used throughout the codebase.

use std::fmt;

/// The number of CD frames (sectors) played per second of audio.
pub const CD_FRAMES_PER_SECOND: u32 = 75;

/// The size in bytes of one raw CD sector.
pub const CD_SECTOR_BYTES: u64 = 2352;

/// This struct represents a minute/second/frame address or duration on a CD, in the
/// same way the FRAMES_TO_MSF and MSF_TO_FRAMES macros do for C code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Msf {
    pub minute: u32,
    pub second: u32,
    pub frame: u32,
}

impl Msf {

    /// Splits a frame count into minutes, seconds and frames.
    pub fn from_frames(frames: u32) -> Self {

        let total_seconds = frames / CD_FRAMES_PER_SECOND;

        Msf {
            minute: total_seconds / 60,
            second: total_seconds % 60,
            frame: frames % CD_FRAMES_PER_SECOND,
        }
    }

    /// Converts this address back into a flat frame count.
    pub fn to_frames(self) -> u32 {
        (self.minute * 60 + self.second) * CD_FRAMES_PER_SECOND + self.frame
    }

    /// Parses an address in the `mm:ss:ff` form used by cue sheets. Seconds and frames
    /// must be in range, minutes may exceed 99 as some tools write them that way.
    pub fn parse(text: &str) -> Option<Self> {

        let mut parts = text.trim().split(':');
        let minute = parts.next()?.parse::<u32>().ok()?;
        let second = parts.next()?.parse::<u32>().ok()?;
        let frame = parts.next()?.parse::<u32>().ok()?;

        if parts.next().is_some() || second >= 60 || frame >= CD_FRAMES_PER_SECOND {
            return None;
        }

        Some(Msf { minute, second, frame })
    }
}

/// Displays the address as `m:ss.ff`, where the last field is hundredths of a second
/// rather than raw frames, which is how positions are shown to the player.
impl fmt::Display for Msf {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}.{:02}",
            self.minute,
            self.second,
            self.frame * 100 / CD_FRAMES_PER_SECOND
        )
    }
}

/// Parses the leading integer of a string the way C's `atoi` does: leading whitespace
/// is skipped, an optional sign is accepted, and parsing stops at the first non-digit.
/// Anything unparseable yields 0, and overflow wraps rather than failing.
pub fn atoi(text: &str) -> i32 {

    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i32 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.wrapping_mul(10).wrapping_add((digit - b'0') as i32);
    }

    if negative {
        value.wrapping_neg()
    } else {
        value
    }
}

/// Parses a track argument: `atoi` followed by truncation to a byte, matching how
/// console arguments were always squeezed into a track number.
pub fn parse_track_number(text: &str) -> u8 {
    atoi(text) as u8
}


#[cfg(test)]
mod tests {

    use super::{atoi, parse_track_number, Msf};

    #[test]
    fn from_frames_should_split_into_minutes_seconds_and_frames() {

        let output = Msf::from_frames(4 * 60 * 75 + 33 * 75 + 12);

        assert_eq!(output, Msf { minute: 4, second: 33, frame: 12 });
    }

    #[test]
    fn to_frames_should_undo_from_frames() {

        let input = Msf { minute: 71, second: 59, frame: 74 };

        assert_eq!(Msf::from_frames(input.to_frames()), input);
    }

    #[test]
    fn parse_should_accept_cue_sheet_addresses() {

        let output = Msf::parse("03:12:45");

        assert_eq!(output, Some(Msf { minute: 3, second: 12, frame: 45 }));
    }

    #[test]
    fn parse_should_reject_out_of_range_fields() {

        assert_eq!(Msf::parse("00:60:00"), None);
        assert_eq!(Msf::parse("00:00:75"), None);
        assert_eq!(Msf::parse("00:00"), None);
        assert_eq!(Msf::parse("00:00:00:00"), None);
        assert_eq!(Msf::parse("aa:00:00"), None);
    }

    #[test]
    fn display_should_show_hundredths_of_a_second() {

        let input = Msf { minute: 2, second: 5, frame: 74 };

        assert_eq!(input.to_string(), "2:05.98");
    }

    #[test]
    fn atoi_should_stop_at_first_non_digit() {

        assert_eq!(atoi("12abc"), 12);
        assert_eq!(atoi("  -7"), -7);
        assert_eq!(atoi("+3"), 3);
        assert_eq!(atoi("abc"), 0);
        assert_eq!(atoi(""), 0);
    }

    #[test]
    fn parse_track_number_should_truncate_to_a_byte() {

        assert_eq!(parse_track_number("3"), 3);
        assert_eq!(parse_track_number("300"), 44);
        assert_eq!(parse_track_number("-1"), 255);
    }
}
