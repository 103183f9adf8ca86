//! Setup-phase selections: which avatar walks the user through the routine
//! and what plays in the background.
//!
//! The core never inspects either value beyond building asset names; an
//! absent audio source simply means playback calls are skipped.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::RoutineError;

/// Opaque avatar identifier, e.g. `"unicorn"`. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Surrounding whitespace is trimmed; nothing left is an error.
    pub fn new(id: impl Into<String>) -> Result<Self, RoutineError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(RoutineError::EmptyIdentity);
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Track {
    pub title: &'static str,
    pub file: &'static str,
    pub icon: &'static str,
}

/// Built-in background tracks, shipped under the track directory.
pub const TRACKS: &[Track] = &[
    Track { title: "Fresh", file: "fresh.mp3", icon: "🍃" },
    Track { title: "Gardens", file: "gardens-stylish-chill.mp3", icon: "🏡" },
    Track { title: "Goldshire", file: "goldshire.mp3", icon: "✨" },
    Track { title: "Honey Kisses", file: "honey-kisses.mp3", icon: "🍯" },
    Track { title: "Free Spirit", file: "music-free.mp3", icon: "🕊️" },
    Track { title: "Patents", file: "patents.mp3", icon: "💡" },
    Track { title: "September", file: "september.mp3", icon: "🍂" },
];

/// Look up a built-in track by title or file name, ignoring case.
pub fn find_track(name: &str) -> Option<&'static Track> {
    let name = name.trim();
    TRACKS
        .iter()
        .find(|t| t.title.eq_ignore_ascii_case(name) || t.file.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// One of [`TRACKS`].
    Track(&'static Track),
    /// A user-picked file.
    File(PathBuf),
}

impl AudioSource {
    /// Where the audio element should load from.
    pub fn location(&self, track_dir: &Path) -> PathBuf {
        match self {
            AudioSource::Track(track) => track_dir.join(track.file),
            AudioSource::File(path) => path.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            AudioSource::Track(track) => track.title.to_string(),
            AudioSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Setup {
    identity: Option<Identity>,
    audio: Option<AudioSource>,
}

impl Setup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioSource> {
        self.audio.as_ref()
    }

    /// The routine may only start once an avatar is chosen.
    pub fn is_ready(&self) -> bool {
        self.identity.is_some()
    }

    /// Choose the avatar. An empty id is rejected and the previous
    /// selection is kept.
    pub fn select_identity(&mut self, id: impl Into<String>) -> Result<&Identity, RoutineError> {
        let identity = Identity::new(id)?;
        Ok(self.identity.insert(identity))
    }

    /// Pick a built-in track. Replaces any custom file.
    pub fn select_track(&mut self, name: &str) -> Result<&'static Track, RoutineError> {
        let track = find_track(name).ok_or_else(|| RoutineError::UnknownTrack(name.to_string()))?;
        self.audio = Some(AudioSource::Track(track));
        Ok(track)
    }

    /// Pick a custom file. Replaces any built-in track.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        self.audio = Some(AudioSource::File(path.into()));
    }
}
