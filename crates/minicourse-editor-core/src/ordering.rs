//! Sibling reordering shared by the structure tree and the block list.
//!
//! A move swaps an item with its adjacent sibling. Nothing moves past either
//! end of the list.

use minicourse_common::Direction;

/// Index of the sibling `direction` of `index`, if there is one.
pub fn adjacent(len: usize, index: usize, direction: Direction) -> Option<usize> {
    if index >= len {
        return None;
    }
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|next| *next < len),
    }
}

/// Swap the item at `index` with its sibling. Returns false at a list edge.
pub fn swap_adjacent<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    match adjacent(items.len(), index, direction) {
        Some(other) => {
            items.swap(index, other);
            true
        }
        None => false,
    }
}
