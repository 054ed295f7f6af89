// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
/// Errors opening or decoding an audio file.
///
/// These surface to callers of load/play operations. A decode error on a
/// source that is already mixing is downgraded to exhaustion by the mixer
/// instead of being propagated.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported or corrupt media in {0}")]
    UnsupportedMedia(String),

    #[error("no audio track found in {0}")]
    NoAudioTrack(String),

    #[error("sample rate not specified in {0}")]
    UnknownSampleRate(String),

    #[error("channel count not specified in {0}")]
    UnknownChannelCount(String),

    #[error("codec error: {0}")]
    Codec(#[from] symphonia::core::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
