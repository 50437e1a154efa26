//! Ordered playback queue with a cursor
//!
//! The cursor points at the currently active track (`None` when the queue
//! is empty or nothing is selected). Mutations keep the cursor on the same
//! logical entry wherever possible; only removing the active entry itself
//! collapses it to a neighboring index.

use aria_core::Track;

use crate::error::{PlaybackError, Result};

/// Ordered sequence of tracks plus the active-track cursor
///
/// Duplicate ids are allowed; identity for cursor preservation is the
/// entry's position, not its id.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
}

impl Queue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// All tracks in queue order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index of the active track, if any
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The active track, if any
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// First position of a track id, if present
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Append a track, returning its index
    pub fn push(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Move the cursor to an existing index
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.cursor = Some(index);
        Ok(())
    }

    /// Clear the cursor without touching the tracks
    pub fn deselect(&mut self) {
        self.cursor = None;
    }

    /// Atomically replace the whole queue; the cursor resets to `None`
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.cursor = None;
    }

    /// Remove the entry at `index`
    ///
    /// Cursor adjustment:
    /// - entries before the cursor shift it down by one;
    /// - removing the cursor entry clamps it to the nearest remaining
    ///   index (which now names an adjacent track, not auto-played);
    /// - an emptied queue drops the cursor entirely.
    pub fn remove(&mut self, index: usize) -> Result<Track> {
        if index >= self.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let removed = self.tracks.remove(index);

        self.cursor = match self.cursor {
            None => None,
            Some(_) if self.tracks.is_empty() => None,
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => Some(c.min(self.tracks.len() - 1)),
            Some(c) => Some(c),
        };

        Ok(removed)
    }

    /// Move the entry at `from` so it lands at `to`
    ///
    /// The cursor is re-derived to keep pointing at the same entry it named
    /// before the move.
    pub fn move_track(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tracks.len();
        if from >= len {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= len {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if from == to {
            return Ok(());
        }

        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);

        self.cursor = self.cursor.map(|c| {
            if c == from {
                to
            } else if from < c && to >= c {
                c - 1
            } else if from > c && to <= c {
                c + 1
            } else {
                c
            }
        });

        Ok(())
    }

    /// Drop every track and the cursor
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }
}
