use crate::model::{PlaybackPolicy, Track};
use crate::queue::Queue;
use rand::rngs::SmallRng;
use std::sync::mpsc::{self, Receiver, Sender};

/// Change notifications published to subscribers after a controller
/// mutation has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackChanged,
    RestartRequested,
    QueueChanged,
}

/// What to do with a batch of tracks handed to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    Add,
    Play,
}

/// Playback controller: the queue plus the single "now playing" pointer.
///
/// One instance lives for a session and is passed around explicitly. None
/// of its operations fail; an empty queue or an unknown track degrades to
/// a no-op or an empty current track.
#[derive(Debug)]
pub struct Player {
    queue: Queue,
    current_index: Option<usize>,
    current_track: Option<Track>,
    load_requested: bool,
    restart_requested: bool,
    subscribers: Vec<Sender<PlayerEvent>>,
    shuffle_rng: SmallRng,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            queue: Queue::new(),
            current_index: None,
            current_track: None,
            load_requested: false,
            restart_requested: false,
            subscribers: Vec::new(),
            shuffle_rng: rand::make_rng(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn playing_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn load_requested(&self) -> bool {
        self.load_requested
    }

    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }

    pub fn take_load_request(&mut self) -> bool {
        std::mem::take(&mut self.load_requested)
    }

    pub fn take_restart_request(&mut self) -> bool {
        std::mem::take(&mut self.restart_requested)
    }

    /// Plays `track`, which does not need to be queued. Playing the track
    /// that is already current requests a restart instead, since observers
    /// watching for a track change would otherwise see nothing happen.
    pub fn play(&mut self, track: Track) {
        self.play_entry(Some(track));
    }

    /// Like [`Player::play`], but asks the playback surface to prepare the
    /// track without starting it. Loading the current track is a plain
    /// restart and leaves no load request behind.
    pub fn load(&mut self, track: Track) {
        self.load_requested = true;
        self.play(track);
    }

    pub fn restart(&mut self) {
        self.restart_requested = true;
        self.emit(PlayerEvent::RestartRequested);
    }

    /// With an empty queue this plays the empty track, which the surface
    /// treats as a failed attempt.
    pub fn play_first_song(&mut self) {
        if self.queue.is_empty() {
            self.play_entry(None);
        } else {
            self.play_at(0);
        }
    }

    /// Plays the slot after the current one. The slot itself is played, not
    /// the first queue entry equal to its track, so `[a, b, a]` moves from
    /// slot 1 to slot 2 rather than back to slot 0.
    pub fn next_track(&mut self) {
        let next = self.current_index.map_or(0, |index| index + 1);
        if next < self.queue.len() {
            self.play_at(next);
        } else {
            tracing::debug!(next, len = self.queue.len(), "end of queue reached");
        }
    }

    pub fn previous_track(&mut self) {
        // Stepping back onto slot 0 goes through play_first_song instead.
        match self
            .current_index
            .and_then(|index| index.checked_sub(1))
            .filter(|previous| *previous > 0)
        {
            Some(previous) => self.play_at(previous),
            None if !self.queue.is_empty() => self.play_first_song(),
            None => {}
        }
    }

    /// Called when the playback surface reports the current track finished.
    pub fn song_ended(&mut self, policy: &PlaybackPolicy) {
        if policy.repeat {
            self.restart();
        } else if self.is_last_song_playing() {
            if policy.loop_queue {
                self.current_index = None;
                self.next_track();
            } else {
                tracing::debug!("queue finished, playback stops");
            }
        } else {
            self.next_track();
        }
    }

    pub fn is_last_song_playing(&self) -> bool {
        self.current_index.map_or(0, |index| index + 1) == self.queue.len()
    }

    pub fn add_track(&mut self, track: Track) -> &mut Self {
        self.queue.push(track);
        self.emit(PlayerEvent::QueueChanged);
        self
    }

    pub fn add_tracks(&mut self, tracks: impl IntoIterator<Item = Track>) -> &mut Self {
        self.queue.extend(tracks);
        self.emit(PlayerEvent::QueueChanged);
        self
    }

    pub fn remove_track(&mut self, track: &Track) -> &mut Self {
        if let Some(removed) = self.queue.remove(track) {
            self.current_index = reindex_after_removal(self.current_index, &[removed]);
            self.emit(PlayerEvent::QueueChanged);
        }
        self
    }

    pub fn remove_tracks(&mut self, tracks: &[Track]) -> &mut Self {
        let removed = self.queue.remove_all(tracks);
        if !removed.is_empty() {
            self.current_index = reindex_after_removal(self.current_index, &removed);
            self.emit(PlayerEvent::QueueChanged);
        }
        self
    }

    /// Clears the queue. The playing track stays current so replaying it
    /// still counts as a restart.
    pub fn empty_queue(&mut self) -> &mut Self {
        self.queue.clear();
        self.current_index = None;
        self.emit(PlayerEvent::QueueChanged);
        self
    }

    pub fn shuffle_queue(&mut self) -> &mut Self {
        self.queue.shuffle(&mut self.shuffle_rng);
        self.current_index = self
            .current_track
            .as_ref()
            .and_then(|track| self.queue.position(track));
        self.emit(PlayerEvent::QueueChanged);
        self
    }

    /// Applies a batch fetched from the catalog. Returns how many tracks
    /// were taken.
    pub fn enqueue(&mut self, tracks: Vec<Track>, action: QueueAction) -> usize {
        let count = tracks.len();
        match action {
            QueueAction::Add => {
                self.add_tracks(tracks);
            }
            QueueAction::Play => {
                self.empty_queue().add_tracks(tracks);
                self.play_first_song();
            }
        }
        count
    }

    fn play_at(&mut self, index: usize) {
        let track = self.queue.get(index).cloned();
        self.current_index = track.as_ref().map(|_| index);
        self.change_track(track);
    }

    fn play_entry(&mut self, track: Option<Track>) {
        self.current_index = track
            .as_ref()
            .and_then(|track| self.queue.position(track));
        self.change_track(track);
    }

    fn change_track(&mut self, track: Option<Track>) {
        if self.current_track == track {
            // Nothing will be loaded, so a pending load request would stick
            // to the next real track change and keep it from playing.
            self.load_requested = false;
            self.restart();
            return;
        }

        tracing::debug!(
            track = track.as_ref().map(|track| track.id.as_str()),
            index = self.current_index,
            "current track changed"
        );
        self.current_track = track;
        self.emit(PlayerEvent::TrackChanged);
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Maps the playing slot onto the queue left after removing `removed`
/// (ascending positions in the old queue). When the playing slot itself is
/// gone the pointer lands just before the track that took its place.
fn reindex_after_removal(current: Option<usize>, removed: &[usize]) -> Option<usize> {
    let current = current?;
    let before = removed.iter().filter(|position| **position < current).count();
    let shifted = current - before;
    if removed.contains(&current) {
        shifted.checked_sub(1)
    } else {
        Some(shifted)
    }
}
