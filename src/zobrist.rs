use std::collections::HashSet;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Position;
use crate::state::PuzzleState;

/// Zobrist keys for the cells of one grid.
#[derive(Debug)]
pub struct Zobrist {
    width: usize,
    box_hashes: Vec<u64>,
    character_hashes: Vec<u64>,
}

impl Zobrist {
    pub fn new(width: usize, height: usize) -> Self {
        // Use a seeded PRNG for reproducible Zobrist hashes
        let mut rng = ChaCha8Rng::seed_from_u64(0x123456789abcdef0);
        let cells = width * height;

        let box_hashes = (0..cells).map(|_| rng.next_u64()).collect();
        let character_hashes = (0..cells).map(|_| rng.next_u64()).collect();

        Zobrist {
            width,
            box_hashes,
            character_hashes,
        }
    }

    fn cell(&self, pos: Position) -> usize {
        assert!(pos.x >= 0 && pos.y >= 0, "position {} out of bounds", pos);
        pos.y as usize * self.width + pos.x as usize
    }

    /// Get hash value for a box at a specific position
    pub fn box_hash(&self, pos: Position) -> u64 {
        self.box_hashes[self.cell(pos)]
    }

    /// Get hash value for the character position
    pub fn character_hash(&self, pos: Position) -> u64 {
        self.character_hashes[self.cell(pos)]
    }

    /// Hash of a full configuration
    pub fn compute_hash<'a>(
        &self,
        character: Position,
        boxes: impl IntoIterator<Item = &'a Position>,
    ) -> u64 {
        boxes
            .into_iter()
            .fold(self.character_hash(character), |hash, &pos| {
                hash ^ self.box_hash(pos)
            })
    }
}

/// Set of configurations generated so far during a search.
///
/// States hash by their Zobrist key and compare by character position and
/// box set, so two states reached through different move orders collapse
/// into one entry.
#[derive(Debug, Default)]
pub struct VisitedSet {
    states: HashSet<PuzzleState>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `state`. Returns false if an equal state was already present.
    pub fn insert(&mut self, state: PuzzleState) -> bool {
        self.states.insert(state)
    }

    #[cfg(test)]
    pub fn contains(&self, state: &PuzzleState) -> bool {
        self.states.contains(state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
