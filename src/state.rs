use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use arrayvec::ArrayVec;

use crate::grid::{CARDINAL_DIRECTIONS, Direction, GridMap, ParseError, Position, Tile};

/// One configuration of a puzzle: where the character stands and which cells
/// hold boxes. The static layout is shared between all states of a search.
///
/// States are values. Moving produces a new state and never modifies the
/// original.
#[derive(Clone)]
pub struct PuzzleState {
    map: Rc<GridMap>,
    character: Position,
    boxes: BTreeSet<Position>,
    hash: u64,
}

impl PuzzleState {
    /// Panics if the configuration is inconsistent with `map`.
    pub fn new(map: Rc<GridMap>, character: Position, boxes: BTreeSet<Position>) -> Self {
        assert_eq!(
            boxes.len(),
            map.goals().len(),
            "box count must equal goal count"
        );
        assert!(
            !boxes.contains(&character),
            "character and box share position {}",
            character
        );
        assert!(
            map.contains(character),
            "character position {} out of bounds",
            character
        );
        for &pos in &boxes {
            assert!(map.contains(pos), "box position {} out of bounds", pos);
        }

        let hash = map.zobrist().compute_hash(character, &boxes);
        PuzzleState {
            map,
            character,
            boxes,
            hash,
        }
    }

    /// Parse a blueprint into the initial state of a fresh map.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (map, placement) = GridMap::parse(text)?;
        Ok(Self::new(
            Rc::new(map),
            placement.character,
            placement.boxes,
        ))
    }

    pub fn map(&self) -> &Rc<GridMap> {
        &self.map
    }

    pub fn character(&self) -> Position {
        self.character
    }

    pub fn boxes(&self) -> &BTreeSet<Position> {
        &self.boxes
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.contains(&pos)
    }

    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Check if all boxes are on goals (win condition)
    pub fn is_goal(&self) -> bool {
        self.boxes.iter().all(|&pos| self.map.is_goal(pos))
    }

    /// True if a box or the character could enter `pos`: it is inside the
    /// grid, not a wall, and not holding a box.
    pub fn can_through(&self, pos: Position) -> bool {
        self.map.tile(pos).is_ok_and(Tile::is_passable) && !self.has_box(pos)
    }

    /// True if whatever stands on `object` could step one cell in `dir`.
    pub fn can_move(&self, object: Position, dir: Direction) -> bool {
        self.can_through(object.step(dir))
    }

    /// True if the character can walk in `dir`, pushing a box if one is in
    /// the way. Diagonal steps are never allowed.
    pub fn can_move_chara(&self, dir: Direction) -> bool {
        if dir.is_diagonal() {
            return false;
        }
        let next = self.character.step(dir);
        self.can_move(self.character, dir) || (self.has_box(next) && self.can_move(next, dir))
    }

    /// The state after the character walks one cell in `dir`. A box in the
    /// destination cell is pushed along. If the move is blocked the state is
    /// returned unchanged.
    pub fn move_chara(&self, dir: Direction) -> PuzzleState {
        if !self.can_move_chara(dir) {
            return self.clone();
        }

        let next = self.character.step(dir);
        let mut moved = if self.has_box(next) {
            self.move_load(next, dir)
        } else {
            self.clone()
        };

        let zobrist = self.map.zobrist();
        moved.hash ^= zobrist.character_hash(moved.character) ^ zobrist.character_hash(next);
        moved.character = next;
        moved
    }

    /// The state after the box on `load` slides one cell in `dir`, with the
    /// character left where it is. Unchanged if there is no box on `load` or
    /// the destination is blocked.
    pub(crate) fn move_load(&self, load: Position, dir: Direction) -> PuzzleState {
        if !self.has_box(load) || !self.can_move(load, dir) {
            return self.clone();
        }

        let dest = load.step(dir);
        let mut moved = self.clone();
        moved.boxes.remove(&load);
        moved.boxes.insert(dest);

        let zobrist = self.map.zobrist();
        moved.hash ^= zobrist.box_hash(load) ^ zobrist.box_hash(dest);
        moved
    }

    /// Every state reachable with a single character step, in
    /// `CARDINAL_DIRECTIONS` order.
    pub fn successors(&self) -> ArrayVec<(Direction, PuzzleState), 4> {
        CARDINAL_DIRECTIONS
            .into_iter()
            .filter(|&dir| self.can_move_chara(dir))
            .map(|dir| (dir, self.move_chara(dir)))
            .collect()
    }
}

impl PartialEq for PuzzleState {
    fn eq(&self, other: &Self) -> bool {
        self.character == other.character && self.boxes == other.boxes
    }
}

impl Eq for PuzzleState {}

impl Hash for PuzzleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.zobrist_hash());
    }
}

impl fmt::Debug for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PuzzleState")
            .field("character", &self.character)
            .field("boxes", &self.boxes)
            .finish()
    }
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.map.height() {
            if y > 0 {
                writeln!(f)?;
            }
            let mut line = String::with_capacity(self.map.width());
            for x in 0..self.map.width() {
                let pos = Position::new(x as i32, y as i32);
                let is_character = pos == self.character;
                let has_box = self.has_box(pos);

                let ch = match self.map.tile(pos).map_err(|_| fmt::Error)? {
                    Tile::Wall => '#',
                    Tile::Goal if is_character => 'a',
                    Tile::Goal if has_box => '+',
                    Tile::Goal => 'G',
                    Tile::Floor if is_character => '@',
                    Tile::Floor if has_box => '*',
                    Tile::Floor => '.',
                };
                line.push(ch);
            }
            f.write_str(&line)?;
        }
        Ok(())
    }
}
