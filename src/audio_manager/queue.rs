// Song queue with wraparound navigation and (title, artist) de-duplication.
use crate::api::models::Song;
use rand::Rng;
use std::collections::HashSet;

/// Songs remaining after the current one at or below which a short queue
/// asks for more.
pub const REFILL_TAIL: usize = 2;
/// Queues at least this long are never topped up.
pub const REFILL_MAX_LEN: usize = 30;

/// Keeps the first song for each (title, artist) pair, preserving order.
pub fn dedupe_songs(songs: Vec<Song>) -> Vec<Song> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(songs.len());
    songs
        .into_iter()
        .filter(|song| seen.insert((song.title.clone(), song.artist.clone())))
        .collect()
}

pub fn wrap_next(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

pub fn wrap_previous(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if index == 0 || index >= len {
        len - 1
    } else {
        index - 1
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongQueue {
    songs: Vec<Song>,
    index: usize,
}

impl SongQueue {
    pub fn new(songs: Vec<Song>) -> Self {
        Self {
            songs: dedupe_songs(songs),
            index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn current(&self) -> Option<&Song> {
        self.songs.get(self.index)
    }

    pub fn next_index(&self) -> usize {
        wrap_next(self.index, self.len())
    }

    pub fn previous_index(&self) -> usize {
        wrap_previous(self.index, self.len())
    }

    pub fn advance(&mut self) -> Option<&Song> {
        self.index = self.next_index();
        self.current()
    }

    pub fn retreat(&mut self) -> Option<&Song> {
        self.index = self.previous_index();
        self.current()
    }

    /// Moves to `index`, wrapped into range.
    pub fn jump_to(&mut self, index: usize) -> Option<&Song> {
        self.index = if self.is_empty() { 0 } else { index % self.len() };
        self.current()
    }

    pub fn random_index<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.len()))
        }
    }

    /// True when a short queue is close enough to its tail to top it up.
    pub fn needs_refill(&self) -> bool {
        !self.is_empty()
            && self.len() < REFILL_MAX_LEN
            && self.len() - (self.index + 1) <= REFILL_TAIL
    }

    /// Appends songs not already queued and returns how many were added.
    pub fn extend_unique(&mut self, more: Vec<Song>) -> usize {
        let mut seen: HashSet<(String, String)> = self
            .songs
            .iter()
            .map(|song| (song.title.clone(), song.artist.clone()))
            .collect();
        let before = self.songs.len();
        for song in more {
            if seen.insert((song.title.clone(), song.artist.clone())) {
                self.songs.push(song);
            }
        }
        self.songs.len() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn song(title: &str, artist: &str) -> Song {
        Song {
            title: title.to_string(),
            artist: artist.to_string(),
            stream_url: format!("https://stream/{title}.mp3"),
            ..Song::default()
        }
    }

    #[test]
    fn dedupe_keeps_first_of_each_title_artist_pair() {
        let songs = vec![
            song("Dreams", "Fleetwood Mac"),
            song("Dreams", "The Cranberries"),
            Song {
                album: "Live".to_string(),
                ..song("Dreams", "Fleetwood Mac")
            },
            song("Landslide", "Fleetwood Mac"),
        ];

        let unique = dedupe_songs(songs);
        let keys: Vec<_> = unique.iter().map(Song::dedup_key).collect();
        assert_eq!(
            keys,
            vec![
                ("Dreams", "Fleetwood Mac"),
                ("Dreams", "The Cranberries"),
                ("Landslide", "Fleetwood Mac"),
            ]
        );
        assert_eq!(unique[0].album, "");
    }

    #[test]
    fn next_wraps_from_last_to_first() {
        let mut queue = SongQueue::new(vec![song("a", "x"), song("b", "x"), song("c", "x")]);
        queue.jump_to(2);
        assert_eq!(queue.next_index(), 0);
        assert_eq!(queue.advance().unwrap().title, "a");
    }

    #[test]
    fn previous_wraps_from_first_to_last() {
        let mut queue = SongQueue::new(vec![song("a", "x"), song("b", "x"), song("c", "x")]);
        assert_eq!(queue.previous_index(), 2);
        assert_eq!(queue.retreat().unwrap().title, "c");
    }

    #[test]
    fn wrap_helpers_tolerate_empty_and_out_of_range() {
        assert_eq!(wrap_next(0, 0), 0);
        assert_eq!(wrap_previous(0, 0), 0);
        assert_eq!(wrap_previous(9, 3), 2);
        assert_eq!(wrap_next(1, 3), 2);
    }

    #[test]
    fn random_index_stays_in_range() {
        let queue = SongQueue::new(vec![song("a", "x"), song("b", "x"), song("c", "x")]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(queue.random_index(&mut rng).unwrap() < 3);
        }
        assert_eq!(SongQueue::default().random_index(&mut rng), None);
    }

    #[test]
    fn refill_only_near_tail_of_short_queue() {
        let mut short = SongQueue::new((0..5).map(|i| song(&i.to_string(), "x")).collect());
        assert!(!short.needs_refill());
        short.jump_to(2);
        assert!(short.needs_refill());

        let mut long = SongQueue::new((0..40).map(|i| song(&i.to_string(), "x")).collect());
        long.jump_to(39);
        assert!(!long.needs_refill());

        assert!(!SongQueue::default().needs_refill());
    }

    #[test]
    fn extend_unique_skips_already_queued_songs() {
        let mut queue = SongQueue::new(vec![song("a", "x"), song("b", "x")]);
        let added = queue.extend_unique(vec![song("b", "x"), song("c", "x"), song("c", "x")]);
        assert_eq!(added, 1);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.index(), 0);
    }
}
