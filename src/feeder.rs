//! Rotation playlist that decides which media goes on the wall next.
//!
//! The wall never stops: the playlist cycles endlessly over the scanned
//! media, optionally reshuffling at the start of every lap so long
//! sessions don't repeat the same order.

use rand::rngs::ThreadRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::models::MediaItem;

pub struct Playlist {
    items: Vec<MediaItem>,
    cursor: usize,
    shuffle: bool,
    rng: ThreadRng,
}

impl Playlist {
    pub fn new(items: Vec<MediaItem>, shuffle: bool) -> Self {
        let mut playlist = Self {
            items,
            cursor: 0,
            shuffle,
            rng: rand::rng(),
        };
        if playlist.shuffle {
            playlist.items.shuffle(&mut playlist.rng);
        }
        debug!(items = playlist.items.len(), shuffle, "playlist ready");
        playlist
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next item to feed. Wraps around at the end of a lap, reshuffling
    /// first when shuffling is on. `None` only for an empty playlist.
    pub fn next(&mut self) -> Option<MediaItem> {
        if self.items.is_empty() {
            return None;
        }
        if self.cursor >= self.items.len() {
            self.cursor = 0;
            if self.shuffle {
                self.items.shuffle(&mut self.rng);
            }
        }
        let item = self.items[self.cursor].clone();
        self.cursor += 1;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use crate::models::MediaType;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem::new(PathBuf::from(format!("{i}.jpg")), MediaType::Image))
            .collect()
    }

    #[test]
    fn test_empty_playlist_yields_nothing() {
        let mut playlist = Playlist::new(Vec::new(), false);
        assert!(playlist.is_empty());
        assert_eq!(playlist.next(), None);
    }

    #[test]
    fn test_unshuffled_playlist_cycles_in_order() {
        let mut playlist = Playlist::new(items(3), false);
        let lap: Vec<_> = (0..6).map(|_| playlist.next().unwrap().path).collect();
        assert_eq!(lap[0], PathBuf::from("0.jpg"));
        assert_eq!(lap[1], PathBuf::from("1.jpg"));
        assert_eq!(lap[2], PathBuf::from("2.jpg"));
        // Second lap repeats the same order.
        assert_eq!(&lap[3..], &lap[..3]);
    }

    #[test]
    fn test_shuffled_lap_covers_every_item_once() {
        let mut playlist = Playlist::new(items(10), true);
        let lap: HashSet<_> = (0..10).map(|_| playlist.next().unwrap().path).collect();
        assert_eq!(lap.len(), 10);
    }
}
