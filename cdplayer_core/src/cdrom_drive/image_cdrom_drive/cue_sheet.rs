// SPDX-License-Identifier: GPL-3.0
// cue_sheet.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::cdrom_drive::CdromError;
use cdplayer_utility::{Msf, CD_SECTOR_BYTES};
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Whether a track holds audio or data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackType {
    Audio,
    Data,
}

/// This struct models one track of a disc image. The length is in frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageTrack {
    pub number: u8,
    pub track_type: TrackType,
    pub length: u32,
}

/// This struct models the disc described by a cue sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CueSheet {
    tracks: Vec<ImageTrack>,
}

// A track as seen while parsing, before its length is known.
struct PendingTrack {
    number: u8,
    track_type: TrackType,
    file: usize,
    start: Option<u32>,
}

impl CueSheet {

    /// Reads and parses the cue sheet at the given path. Files named by the sheet are
    /// resolved relative to the sheet's own directory. Sheets written in a legacy
    /// 8-bit encoding still load, as only the titles would be mangled.
    pub fn load(path: &Path) -> Result<Self, CdromError> {

        let bytes = fs::read(path)
            .map_err(|source| CdromError::Io { operation: "read cue sheet", source })?;
        let text = String::from_utf8_lossy(&bytes);
        let base = path.parent().unwrap_or(Path::new("."));

        CueSheet::parse(&text, base, |file| {
            fs::metadata(file)
                .map(|metadata| (metadata.len() / CD_SECTOR_BYTES) as u32)
                .map_err(|source| CdromError::Io { operation: "read image size", source })
        })
    }

    /// Parses cue sheet text. The supplied function must return the size in frames of
    /// each referenced file, and is what bounds the length of each file's last track.
    pub fn parse<F>(text: &str, base: &Path, mut file_frames: F) -> Result<Self, CdromError>
    where
        F: FnMut(&Path) -> Result<u32, CdromError>
    {
        let mut files: Vec<PathBuf> = vec![];
        let mut pending: Vec<PendingTrack> = vec![];

        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        for (index, raw_line) in text.lines().enumerate() {

            let line_number = index + 1;
            let line = raw_line.trim();
            let bad_line = |reason: &str| CdromError::CueSheet {
                line: line_number,
                reason: reason.to_string(),
            };

            let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();

            match keyword.to_ascii_uppercase().as_str() {

                "FILE" => {
                    let name = parse_file_name(rest).ok_or_else(|| bad_line("missing file name"))?;
                    files.push(base.join(name));
                },

                "TRACK" => {
                    if files.is_empty() {
                        return Err(bad_line("TRACK before FILE"));
                    }

                    let mut fields = rest.split_whitespace();
                    let number = fields
                        .next()
                        .and_then(|field| field.parse::<u8>().ok())
                        .filter(|number| (1..=99).contains(number))
                        .ok_or_else(|| bad_line("bad track number"))?;
                    let mode = fields.next().ok_or_else(|| bad_line("missing track mode"))?;
                    let track_type = if mode.eq_ignore_ascii_case("AUDIO") {
                        TrackType::Audio
                    } else {
                        TrackType::Data
                    };

                    if pending.last().is_some_and(|track| track.number >= number) {
                        return Err(bad_line("track numbers must increase"));
                    }

                    pending.push(PendingTrack {
                        number,
                        track_type,
                        file: files.len() - 1,
                        start: None,
                    });
                },

                "INDEX" => {
                    let mut fields = rest.split_whitespace();
                    let index_number = fields
                        .next()
                        .and_then(|field| field.parse::<u8>().ok())
                        .ok_or_else(|| bad_line("bad index number"))?;
                    let address = fields
                        .next()
                        .and_then(Msf::parse)
                        .ok_or_else(|| bad_line("bad index address"))?;

                    let track = pending.last_mut().ok_or_else(|| bad_line("INDEX before TRACK"))?;

                    // Only index 1 marks where a track's audio begins, index 0 is pregap.
                    if index_number == 1 {
                        track.start = Some(address.to_frames());
                    }
                },

                "" | "REM" | "CATALOG" | "CDTEXTFILE" | "TITLE" | "PERFORMER" | "SONGWRITER"
                | "FLAGS" | "ISRC" | "PREGAP" | "POSTGAP" => (),

                _ => debug!("cue sheet line {}: skipping {}", line_number, keyword),
            }
        }

        // Resolve lengths: a track runs until the next track in the same file starts,
        // or until the end of the file.
        let mut file_sizes: Vec<Option<u32>> = vec![None; files.len()];
        let mut tracks = Vec::with_capacity(pending.len());

        for (position, track) in pending.iter().enumerate() {

            let start = track.start.ok_or_else(|| CdromError::CueSheet {
                line: 0,
                reason: format!("track {} has no INDEX 01", track.number),
            })?;

            let end = match pending.get(position + 1) {
                Some(next) if next.file == track.file => next.start.unwrap_or(start),
                _ => match file_sizes[track.file] {
                    Some(size) => size,
                    None => {
                        let size = file_frames(&files[track.file])?;
                        file_sizes[track.file] = Some(size);
                        size
                    },
                },
            };

            tracks.push(ImageTrack {
                number: track.number,
                track_type: track.track_type,
                length: end.saturating_sub(start),
            });
        }

        Ok(CueSheet { tracks })
    }

    /// Returns the number of the last track, or 0 for an empty sheet.
    pub fn last_track(&self) -> u8 {
        self.tracks.last().map_or(0, |track| track.number)
    }

    /// Looks up a track by number.
    pub fn track(&self, number: u8) -> Option<&ImageTrack> {
        self.tracks.iter().find(|track| track.number == number)
    }
}

/// Extracts the file name from the arguments of a FILE command, which may or may not
/// be quoted, and is followed by the file type.
fn parse_file_name(arguments: &str) -> Option<&str> {

    if let Some(quoted) = arguments.strip_prefix('"') {
        let end = quoted.find('"')?;
        Some(&quoted[..end])
    } else {
        arguments.split_whitespace().next()
    }
}
