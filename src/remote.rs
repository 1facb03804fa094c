//! Collaborators the playback surface calls out to.

use crate::model::{RandomTracksQuery, Track};
use anyhow::Result;

/// Source of tracks on the media server.
pub trait Catalog {
    fn random_tracks(&self, query: &RandomTracksQuery) -> Result<Vec<Track>>;
}

/// Play-count reporting.
pub trait Scrobbler {
    fn report_play(&self, track: &Track) -> Result<()>;
}

/// Catalog for sessions without a server. Always comes back empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineCatalog;

impl Catalog for OfflineCatalog {
    fn random_tracks(&self, query: &RandomTracksQuery) -> Result<Vec<Track>> {
        tracing::debug!(?query, "offline catalog has no random tracks");
        Ok(Vec::new())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogScrobbler;

impl Scrobbler for LogScrobbler {
    fn report_play(&self, track: &Track) -> Result<()> {
        tracing::info!(id = %track.id, title = %track.title, "scrobble");
        Ok(())
    }
}

impl<T: Catalog + ?Sized> Catalog for Box<T> {
    fn random_tracks(&self, query: &RandomTracksQuery) -> Result<Vec<Track>> {
        (**self).random_tracks(query)
    }
}

impl<T: Scrobbler + ?Sized> Scrobbler for Box<T> {
    fn report_play(&self, track: &Track) -> Result<()> {
        (**self).report_play(track)
    }
}

impl<T: Catalog + ?Sized> Catalog for std::rc::Rc<T> {
    fn random_tracks(&self, query: &RandomTracksQuery) -> Result<Vec<Track>> {
        (**self).random_tracks(query)
    }
}

impl<T: Scrobbler + ?Sized> Scrobbler for std::rc::Rc<T> {
    fn report_play(&self, track: &Track) -> Result<()> {
        (**self).report_play(track)
    }
}
