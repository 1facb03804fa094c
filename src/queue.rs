use crate::model::Track;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Ordered session playlist. Duplicates are allowed and insertion order is
/// kept; lookups match the first structurally equal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    tracks: Vec<Track>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn position(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|queued| queued == track)
    }

    pub fn position_by_id(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|queued| queued.id == id)
    }

    pub fn push(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Removes the first entry equal to `track` and returns where it was.
    pub fn remove(&mut self, track: &Track) -> Option<usize> {
        let index = self.position(track)?;
        self.tracks.remove(index);
        Some(index)
    }

    /// Removes every entry equal to any of `tracks`. Returns the removed
    /// positions in ascending order, relative to the queue before removal.
    pub fn remove_all(&mut self, tracks: &[Track]) -> Vec<usize> {
        let mut removed = Vec::new();
        let mut index = 0;
        self.tracks.retain(|queued| {
            let keep = !tracks.contains(queued);
            if !keep {
                removed.push(index);
            }
            index += 1;
            keep
        });
        removed
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn shuffle(&mut self, rng: &mut SmallRng) {
        self.tracks.shuffle(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, format!("http://media/{id}"))
    }

    #[test]
    fn remove_takes_first_match_only() {
        let mut queue = Queue::new();
        queue.extend([track("a"), track("b"), track("a")]);

        assert_eq!(queue.remove(&track("a")), Some(0));
        assert_eq!(queue.tracks(), &[track("b"), track("a")]);
    }

    #[test]
    fn removing_missing_track_is_a_no_op() {
        let mut queue = Queue::new();
        queue.push(track("a"));

        assert_eq!(queue.remove(&track("zzz")), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn remove_all_keeps_order_of_survivors() {
        let mut queue = Queue::new();
        queue.extend([track("a"), track("b"), track("c"), track("b"), track("d")]);

        let removed = queue.remove_all(&[track("b"), track("d")]);

        assert_eq!(removed, vec![1, 3, 4]);
        assert_eq!(queue.tracks(), &[track("a"), track("c")]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut queue = Queue::new();
        queue.extend((0..20).map(|n| track(&n.to_string())));
        let mut rng: SmallRng = rand::make_rng();

        queue.shuffle(&mut rng);

        assert_eq!(queue.len(), 20);
        for n in 0..20 {
            assert!(queue.position(&track(&n.to_string())).is_some());
        }
    }
}
