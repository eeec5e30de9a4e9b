//! Traversal order for next/previous
//!
//! Identity order while shuffle is off, a Fisher-Yates permutation while it
//! is on. Either way the order holds every playlist index exactly once.

use rand::seq::SliceRandom;
use rand::Rng;

/// Sequence of playlist indices walked by next/previous
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOrder {
    order: Vec<usize>,
}

impl PlayOrder {
    /// Natural playlist order
    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    /// Uniformly random order
    ///
    /// When `anchor` is a valid index, that track is moved back to the slot
    /// matching its playlist position, so enabling shuffle mid-track keeps
    /// the same track sounding and next/previous stay predictable.
    pub fn shuffled<R: Rng + ?Sized>(len: usize, anchor: Option<usize>, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);

        if let Some(anchor) = anchor.filter(|&a| a < len) {
            if let Some(current) = order.iter().position(|&i| i == anchor) {
                order.remove(current);
                order.insert(anchor, anchor);
            }
        }

        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Playlist index at an order position
    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    /// Order position of a playlist index
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    /// Position after `position`, wrapping to the start
    pub fn next_position(&self, position: usize) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        Some((position + 1) % self.order.len())
    }

    /// Position before `position`, wrapping to the end
    pub fn previous_position(&self, position: usize) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        Some((position % len + len - 1) % len)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn is_permutation(order: &PlayOrder, len: usize) -> bool {
        let seen: HashSet<usize> = order.as_slice().iter().copied().collect();
        order.len() == len && seen.len() == len && seen.iter().all(|&i| i < len)
    }

    #[test]
    fn identity_walks_in_order() {
        let order = PlayOrder::identity(3);
        assert_eq!(order.as_slice(), &[0, 1, 2]);
        assert_eq!(order.next_position(2), Some(0));
        assert_eq!(order.previous_position(0), Some(2));
    }

    #[test]
    fn shuffle_preserves_all_indices() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = PlayOrder::shuffled(20, None, &mut rng);
        assert!(is_permutation(&order, 20));
    }

    #[test]
    fn shuffle_changes_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let order = PlayOrder::shuffled(10, None, &mut rng);

        // Probability of identity is 1/10!, and the seed is fixed
        assert_ne!(order, PlayOrder::identity(10));
    }

    #[test]
    fn anchor_keeps_its_slot() {
        let mut rng = StdRng::seed_from_u64(3);
        for anchor in 0..8 {
            let order = PlayOrder::shuffled(8, Some(anchor), &mut rng);
            assert!(is_permutation(&order, 8));
            assert_eq!(order.index_at(anchor), Some(anchor));
            assert_eq!(order.position_of(anchor), Some(anchor));
        }
    }

    #[test]
    fn out_of_range_anchor_is_ignored() {
        let mut rng = StdRng::seed_from_u64(3);
        let order = PlayOrder::shuffled(4, Some(9), &mut rng);
        assert!(is_permutation(&order, 4));
    }

    #[test]
    fn same_seed_same_order() {
        let a = PlayOrder::shuffled(12, Some(2), &mut StdRng::seed_from_u64(99));
        let b = PlayOrder::shuffled(12, Some(2), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_order_has_no_neighbours() {
        let order = PlayOrder::identity(0);
        assert!(order.is_empty());
        assert_eq!(order.next_position(0), None);
        assert_eq!(order.previous_position(0), None);
    }

    #[test]
    fn single_track_wraps_onto_itself() {
        let order = PlayOrder::identity(1);
        assert_eq!(order.next_position(0), Some(0));
        assert_eq!(order.previous_position(0), Some(0));
    }
}
