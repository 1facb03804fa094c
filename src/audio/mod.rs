use anyhow::Result;
use std::collections::VecDeque;
use std::time::Duration;

/// Lifecycle events raised by the audio widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetEvent {
    Ended,
    Started,
    TimeUpdate { percent: f64 },
}

/// The external, stateful audio renderer driven by the playback surface.
pub trait PlaybackWidget {
    fn load_media(&mut self, url: &str) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn play_at(&mut self, position: Duration) -> Result<()>;
    fn reveal_controls(&mut self) {}
    fn poll_event(&mut self) -> Option<WidgetEvent> {
        None
    }
}

/// Headless widget. Keeps just enough state to answer questions about what
/// it was told, and raises the events a real renderer would.
#[derive(Debug, Default)]
pub struct NullWidget {
    media: Option<String>,
    playing: bool,
    position: Duration,
    percent: f64,
    controls_visible: bool,
    pending: VecDeque<WidgetEvent>,
}

impl NullWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media(&self) -> Option<&str> {
        self.media.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Pretends playback reached `percent` of the track.
    pub fn progress_to(&mut self, percent: f64) {
        if self.media.is_none() || !self.playing {
            return;
        }
        self.percent = percent.clamp(0.0, 100.0);
        self.pending.push_back(WidgetEvent::TimeUpdate {
            percent: self.percent,
        });
        if self.percent >= 100.0 {
            self.finish();
        }
    }

    /// Pretends the track ran out.
    pub fn finish(&mut self) {
        if self.media.is_none() || !self.playing {
            return;
        }
        self.playing = false;
        self.pending.push_back(WidgetEvent::Ended);
    }
}

impl PlaybackWidget for NullWidget {
    fn load_media(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            anyhow::bail!("cannot load empty media url");
        }
        self.media = Some(url.to_string());
        self.playing = false;
        self.position = Duration::ZERO;
        self.percent = 0.0;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.media.is_none() {
            return Err(anyhow::anyhow!("no media loaded"));
        }
        self.playing = true;
        self.pending.push_back(WidgetEvent::Started);
        Ok(())
    }

    fn play_at(&mut self, position: Duration) -> Result<()> {
        self.play()?;
        self.position = position;
        if position.is_zero() {
            self.percent = 0.0;
        }
        Ok(())
    }

    fn reveal_controls(&mut self) {
        self.controls_visible = true;
    }

    fn poll_event(&mut self) -> Option<WidgetEvent> {
        self.pending.pop_front()
    }
}
