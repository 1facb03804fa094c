use crate::audio::PlaybackWidget;
use crate::config;
use crate::core::{Player, QueueAction};
use crate::model::{RandomTracksQuery, ServerProfile, Settings, Track, non_empty};
use crate::remote::{Catalog, Scrobbler};
use crate::surface::PlaybackSurface;
use std::rc::Rc;

/// Everything one listening session needs, owned in one place and passed
/// around explicitly.
pub struct Session<W> {
    pub player: Player,
    pub surface: PlaybackSurface<W>,
    pub settings: Settings,
    pub status: String,
    catalog: Rc<dyn Catalog>,
    stored_server: Option<ServerProfile>,
}

impl<W: PlaybackWidget> Session<W> {
    pub fn new(
        settings: Settings,
        widget: W,
        catalog: Rc<dyn Catalog>,
        scrobbler: Box<dyn Scrobbler>,
    ) -> Self {
        let mut player = Player::new();
        let stored_server = settings.server.clone();
        let surface =
            PlaybackSurface::attach(&mut player, widget, Box::new(catalog.clone()), scrobbler);
        Self {
            player,
            surface,
            settings,
            status: String::from("Ready"),
            catalog,
            stored_server,
        }
    }

    /// Uses `profile` for this session without making it the stored one.
    pub fn use_server(&mut self, profile: ServerProfile) {
        self.settings.server = Some(profile);
    }

    /// Runs a controller mutation, then lets the surface react to it.
    pub fn act<T>(&mut self, action: impl FnOnce(&mut Player) -> T) -> T {
        let result = action(&mut self.player);
        self.surface.sync(&mut self.player);
        result
    }

    /// Feeds every event the widget has queued to the surface.
    pub fn pump_widget(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.surface.widget_mut().poll_event() {
            self.surface
                .handle_event(event, &mut self.player, &self.settings);
            handled += 1;
        }
        handled
    }

    pub fn request_songs(&mut self, tracks: Vec<Track>, action: QueueAction) -> usize {
        if tracks.is_empty() {
            self.set_status("No songs found");
            return 0;
        }
        let count = self.act(|player| player.enqueue(tracks, action));
        self.set_status(&format!("{count} Song(s) Added to Queue"));
        count
    }

    pub fn random_songs(
        &mut self,
        action: QueueAction,
        genre: Option<&str>,
        music_folder_id: Option<&str>,
    ) -> usize {
        let query = RandomTracksQuery {
            size: self.settings.auto_playlist_size,
            genre: non_empty(genre),
            music_folder_id: non_empty(music_folder_id),
        };
        match self.catalog.random_tracks(&query) {
            Ok(tracks) => self.request_songs(tracks, action),
            Err(err) => {
                tracing::warn!(error = %err, "random songs request failed");
                self.set_status(&format!("error: {err:#}"));
                0
            }
        }
    }

    /// Explicit save: everything, including the server in use.
    pub fn save(&mut self) -> anyhow::Result<()> {
        config::save_settings(&self.settings)?;
        self.stored_server = self.settings.server.clone();
        self.set_status("Settings saved");
        Ok(())
    }

    pub fn save_on_exit(&self) -> anyhow::Result<()> {
        config::save_settings(&self.settings_on_exit())
    }

    fn settings_on_exit(&self) -> Settings {
        config::settings_to_persist(&self.settings, self.stored_server.as_ref())
    }

    pub fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
    }
}
