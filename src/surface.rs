use crate::audio::{PlaybackWidget, WidgetEvent};
use crate::core::{Player, PlayerEvent, QueueAction};
use crate::model::{Settings, Track};
use crate::remote::{Catalog, Scrobbler};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Bridges the player to the audio widget. It watches the player through a
/// subscription, tells the widget what to load and play, and turns widget
/// events back into player calls and scrobbles.
pub struct PlaybackSurface<W> {
    widget: W,
    events: Receiver<PlayerEvent>,
    observed: Option<Track>,
    scrobbled: bool,
    catalog: Box<dyn Catalog>,
    scrobbler: Box<dyn Scrobbler>,
}

impl<W: PlaybackWidget> PlaybackSurface<W> {
    pub fn attach(
        player: &mut Player,
        widget: W,
        catalog: Box<dyn Catalog>,
        scrobbler: Box<dyn Scrobbler>,
    ) -> Self {
        let events = player.subscribe();
        let mut surface = Self {
            widget,
            events,
            observed: None,
            scrobbled: false,
            catalog,
            scrobbler,
        };
        surface.observe(player);
        surface
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn observed_track(&self) -> Option<&Track> {
        self.observed.as_ref()
    }

    pub fn scrobbled(&self) -> bool {
        self.scrobbled
    }

    /// Runs an observation cycle if the player published anything since the
    /// last one.
    pub fn sync(&mut self, player: &mut Player) {
        let mut pending = false;
        while self.events.try_recv().is_ok() {
            pending = true;
        }
        if pending {
            self.observe(player);
        }
    }

    pub fn handle_event(&mut self, event: WidgetEvent, player: &mut Player, settings: &Settings) {
        match event {
            WidgetEvent::Ended => {
                let exhausted = settings.auto_play && player.is_last_song_playing();
                player.song_ended(&settings.policy());
                if exhausted {
                    self.fetch_auto_play_batch(player, settings);
                }
            }
            WidgetEvent::Started => {
                self.widget.reveal_controls();
                self.scrobbled = false;
            }
            WidgetEvent::TimeUpdate { percent } => {
                if percent >= settings.scrobble_threshold_percent && !self.scrobbled {
                    self.scrobble_observed();
                }
            }
        }
        self.sync(player);
    }

    fn observe(&mut self, player: &mut Player) {
        let changed = player.playing_track() != self.observed.as_ref();
        if changed {
            self.observed = player.playing_track().cloned();
            self.scrobbled = false;
            self.load_observed(player);
        }

        // A freshly loaded track already starts from the top.
        if player.take_restart_request() && !changed {
            tracing::debug!("restarting current track");
            if let Err(err) = self.widget.play_at(Duration::ZERO) {
                tracing::warn!(error = %err, "widget failed to restart");
            }
        }
    }

    fn load_observed(&mut self, player: &mut Player) {
        let Some(track) = &self.observed else {
            tracing::warn!("current track is empty, nothing to load");
            player.take_load_request();
            return;
        };

        if let Err(err) = self.widget.load_media(&track.url) {
            tracing::warn!(id = %track.id, error = %err, "widget failed to load media");
        }

        if player.take_load_request() {
            tracing::debug!(id = %track.id, "track loaded without playing");
            self.widget.reveal_controls();
        } else if let Err(err) = self.widget.play() {
            tracing::warn!(id = %track.id, error = %err, "widget failed to play");
        }
    }

    fn scrobble_observed(&mut self) {
        let Some(track) = &self.observed else {
            return;
        };
        if let Err(err) = self.scrobbler.report_play(track) {
            tracing::warn!(id = %track.id, error = %err, "scrobble failed");
        }
        self.scrobbled = true;
    }

    fn fetch_auto_play_batch(&mut self, player: &mut Player, settings: &Settings) {
        let query = settings.auto_play_query();
        match self.catalog.random_tracks(&query) {
            Ok(tracks) if tracks.is_empty() => {
                tracing::info!(?query, "autoplay found no songs");
            }
            Ok(tracks) => {
                let count = player.enqueue(tracks, QueueAction::Play);
                tracing::info!(count, "autoplay queued random tracks");
            }
            Err(err) => {
                tracing::warn!(error = %err, "autoplay fetch failed");
            }
        }
    }
}
