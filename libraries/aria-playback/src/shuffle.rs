//! Shuffle index selection

use rand::Rng;

/// Pick the next queue index under shuffle
///
/// Uniformly random among all indices except `current`. A single-entry
/// queue has only itself to offer, so `current` comes back.
pub fn pick_shuffle_index<R: Rng + ?Sized>(len: usize, current: usize, rng: &mut R) -> usize {
    debug_assert!(current < len.max(1));
    if len <= 1 {
        return current;
    }

    // Draw from len-1 slots and skip over the current index
    let pick = rng.gen_range(0..len - 1);
    if pick >= current {
        pick + 1
    } else {
        pick
    }
}
