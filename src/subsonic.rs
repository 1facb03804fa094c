//! Subsonic REST client backing the catalog and scrobble collaborators.

use crate::model::{RandomTracksQuery, ServerProfile, Track};
use crate::remote::{Catalog, Scrobbler};
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const API_VERSION: &str = "1.16.1";
const CLIENT_ID: &str = "jamdeck";

pub struct SubsonicClient {
    profile: ServerProfile,
    agent: ureq::Agent,
}

impl SubsonicClient {
    pub fn new(profile: ServerProfile) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self { profile, agent }
    }

    fn auth_params(&self) -> Vec<(String, String)> {
        let salt = format!("{:016x}", rand::random::<u64>());
        auth_params_with_salt(&self.profile, &salt)
    }

    fn api_url(&self, method: &str, params: &[(String, String)]) -> String {
        build_url(&self.profile.endpoint, method, &self.auth_params(), params)
    }

    /// Playable URL for a song id.
    pub fn stream_url(&self, id: &str) -> String {
        self.api_url("stream", &[(String::from("id"), id.to_string())])
    }

    fn request_json(&self, method: &str, params: &[(String, String)]) -> Result<Value> {
        let url = self.api_url(method, params);
        let response = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("subsonic request failed ({method})"))?;
        let parsed: Value = response
            .into_json()
            .with_context(|| format!("subsonic response parse failed ({method})"))?;
        check_status(parsed)
    }
}

impl Catalog for SubsonicClient {
    fn random_tracks(&self, query: &RandomTracksQuery) -> Result<Vec<Track>> {
        let mut params = vec![(String::from("size"), query.size.to_string())];
        if let Some(genre) = &query.genre {
            params.push((String::from("genre"), genre.clone()));
        }
        if let Some(folder) = &query.music_folder_id {
            params.push((String::from("musicFolderId"), folder.clone()));
        }

        let body = self.request_json("getRandomSongs", &params)?;
        let songs = body
            .get("subsonic-response")
            .and_then(|value| value.get("randomSongs"))
            .and_then(|value| value.get("song"));
        let tracks: Vec<Track> = array_or_single(songs)
            .into_iter()
            .filter_map(|song| parse_track(song, |id| self.stream_url(id)))
            .collect();
        tracing::debug!(count = tracks.len(), "fetched random tracks");
        Ok(tracks)
    }
}

impl Scrobbler for SubsonicClient {
    fn report_play(&self, track: &Track) -> Result<()> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        self.request_json(
            "scrobble",
            &[
                (String::from("id"), track.id.clone()),
                (String::from("submission"), String::from("true")),
                (String::from("time"), millis.to_string()),
            ],
        )?;
        tracing::debug!(id = %track.id, "scrobbled");
        Ok(())
    }
}

fn auth_params_with_salt(profile: &ServerProfile, salt: &str) -> Vec<(String, String)> {
    let token = format!("{:x}", md5::compute(format!("{}{}", profile.password, salt)));
    vec![
        (String::from("u"), profile.username.clone()),
        (String::from("t"), token),
        (String::from("s"), salt.to_string()),
        (String::from("f"), String::from("json")),
        (String::from("v"), String::from(API_VERSION)),
        (String::from("c"), String::from(CLIENT_ID)),
    ]
}

fn build_url(
    endpoint: &str,
    method: &str,
    auth: &[(String, String)],
    params: &[(String, String)],
) -> String {
    let query = auth
        .iter()
        .chain(params)
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!(
        "{}/rest/{}.view?{}",
        endpoint.trim().trim_end_matches('/'),
        method,
        query
    )
}

fn check_status(parsed: Value) -> Result<Value> {
    let envelope = parsed
        .get("subsonic-response")
        .context("missing subsonic-response envelope")?;
    let status = envelope
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if status != "ok" {
        let message = envelope
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("subsonic returned an error");
        anyhow::bail!("{message}");
    }
    Ok(parsed)
}

fn array_or_single(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_track(song: &Value, stream_url: impl Fn(&str) -> String) -> Option<Track> {
    let id = song.get("id").and_then(scalar_string)?;
    let title = song
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Unknown Title")
        .to_string();
    let text = |key: &str| {
        song.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
    };
    Some(Track {
        url: stream_url(&id),
        id,
        title,
        artist: text("artist"),
        album: text("album"),
    })
}
