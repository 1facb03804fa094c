use serde::{Deserialize, Serialize};

/// A playable media reference. Two tracks are the same track when every
/// field matches; queue lookups and the restart rule both rely on that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            url: url.into(),
            artist: None,
            album: None,
        }
    }

    pub fn label(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

/// Flags consulted when the current track finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackPolicy {
    pub repeat: bool,
    pub loop_queue: bool,
    pub auto_play: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ServerProfile {
    pub endpoint: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomTracksQuery {
    pub size: u16,
    pub genre: Option<String>,
    pub music_folder_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub loop_queue: bool,
    #[serde(default)]
    pub auto_play: bool,
    #[serde(default)]
    pub auto_play_genre: Option<String>,
    #[serde(default)]
    pub auto_play_music_folder: Option<String>,
    #[serde(default = "default_auto_playlist_size")]
    pub auto_playlist_size: u16,
    #[serde(default = "default_scrobble_threshold_percent")]
    pub scrobble_threshold_percent: f64,
    #[serde(default)]
    pub server: Option<ServerProfile>,
}

fn default_auto_playlist_size() -> u16 {
    25
}

fn default_scrobble_threshold_percent() -> f64 {
    30.0
}

impl Settings {
    pub fn policy(&self) -> PlaybackPolicy {
        PlaybackPolicy {
            repeat: self.repeat,
            loop_queue: self.loop_queue,
            auto_play: self.auto_play,
        }
    }

    /// The batch requested when autoplay runs out of queue.
    pub fn auto_play_query(&self) -> RandomTracksQuery {
        RandomTracksQuery {
            size: self.auto_playlist_size,
            genre: non_empty(self.auto_play_genre.as_deref()),
            music_folder_id: non_empty(self.auto_play_music_folder.as_deref()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repeat: false,
            loop_queue: false,
            auto_play: false,
            auto_play_genre: None,
            auto_play_music_folder: None,
            auto_playlist_size: default_auto_playlist_size(),
            scrobble_threshold_percent: default_scrobble_threshold_percent(),
            server: None,
        }
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
