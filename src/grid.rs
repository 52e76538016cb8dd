use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::zobrist::Zobrist;

/// A cell coordinate. `x` grows to the right, `y` grows downwards.
///
/// Coordinates are signed so that neighbours of border cells can be
/// represented; the grid rejects them on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring position one step away in `dir`.
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan(self, other: Position) -> usize {
        (self.x.abs_diff(other.x) + self.y.abs_diff(other.y)) as usize
    }

    /// True if `other` shares an edge with this position.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    UpRight,
    DownRight,
    DownLeft,
    UpLeft,
}

/// The directions the character may walk in, in expansion order.
pub const CARDINAL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::UpRight,
    Direction::DownRight,
    Direction::DownLeft,
    Direction::UpLeft,
];

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::UpRight => (1, -1),
            Direction::DownRight => (1, 1),
            Direction::DownLeft => (-1, 1),
            Direction::UpLeft => (-1, -1),
        }
    }

    pub fn is_diagonal(&self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }

    /// Single-letter notation used when printing move sequences.
    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::Up => "U",
            Direction::Right => "R",
            Direction::Down => "D",
            Direction::Left => "L",
            Direction::UpRight => "UR",
            Direction::DownRight => "DR",
            Direction::DownLeft => "DL",
            Direction::UpLeft => "UL",
        }
    }

    /// The direction leading from `from` to the adjacent (8-connected) cell `to`.
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        let delta = (to.x - from.x, to.y - from.y);
        ALL_DIRECTIONS.into_iter().find(|dir| dir.delta() == delta)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Right => write!(f, "Right"),
            Direction::Down => write!(f, "Down"),
            Direction::Left => write!(f, "Left"),
            Direction::UpRight => write!(f, "UpRight"),
            Direction::DownRight => write!(f, "DownRight"),
            Direction::DownLeft => write!(f, "DownLeft"),
            Direction::UpLeft => write!(f, "UpLeft"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Goal,
}

impl Tile {
    pub fn is_passable(self) -> bool {
        self != Tile::Wall
    }
}

/// Errors raised while parsing a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty blueprint")]
    Empty,
    #[error("unrecognized symbol '{symbol}' at ({x}, {y})")]
    UnrecognizedSymbol { symbol: char, x: usize, y: usize },
    #[error("no character found in blueprint")]
    MissingCharacter,
    #[error("second character found at ({x}, {y})")]
    MultipleCharacters { x: usize, y: usize },
    #[error("blueprint contains no boxes")]
    NoBoxes,
    #[error("box count ({boxes}) does not match goal count ({goals})")]
    BoxGoalMismatch { boxes: usize, goals: usize },
    #[error("row {row} has {len} cells, expected {width}")]
    RaggedRow { row: usize, len: usize, width: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("position ({x}, {y}) is outside the grid")]
pub struct OutOfBounds {
    pub x: i32,
    pub y: i32,
}

/// The dynamic part of a parsed blueprint: where the character and the boxes start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub character: Position,
    pub boxes: BTreeSet<Position>,
}

/// The static layout of a puzzle. Immutable once parsed and shared by every
/// state of a search.
#[derive(Debug)]
pub struct GridMap {
    tiles: Vec<Tile>,
    width: usize,
    height: usize,
    goals: BTreeSet<Position>,
    zobrist: Zobrist,
}

impl GridMap {
    /// Parse a blueprint into its static layout and the initial placement.
    ///
    /// Symbols:
    /// - `.` = Floor
    /// - `#` = Wall
    /// - `*` = Box on floor
    /// - `@` = Character on floor
    /// - `a` = Character on goal
    /// - `G` = Goal
    /// - `+` = Box on goal
    pub fn parse(text: &str) -> Result<(GridMap, Placement), ParseError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Err(ParseError::Empty);
        }

        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if width == 0 {
            return Err(ParseError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut goals = BTreeSet::new();
        let mut boxes = BTreeSet::new();
        let mut character = None;

        for (y, line) in lines.iter().enumerate() {
            let mut len = 0;
            for (x, ch) in line.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let tile = match ch {
                    '.' => Tile::Floor,
                    '#' => Tile::Wall,
                    '*' => {
                        boxes.insert(pos);
                        Tile::Floor
                    }
                    '@' | 'a' => {
                        if character.is_some() {
                            return Err(ParseError::MultipleCharacters { x, y });
                        }
                        character = Some(pos);
                        if ch == 'a' { Tile::Goal } else { Tile::Floor }
                    }
                    'G' => Tile::Goal,
                    '+' => {
                        boxes.insert(pos);
                        Tile::Goal
                    }
                    _ => {
                        return Err(ParseError::UnrecognizedSymbol { symbol: ch, x, y });
                    }
                };
                if tile == Tile::Goal {
                    goals.insert(pos);
                }
                tiles.push(tile);
                len += 1;
            }
            if len != width {
                return Err(ParseError::RaggedRow { row: y, len, width });
            }
        }

        let character = character.ok_or(ParseError::MissingCharacter)?;
        if boxes.is_empty() {
            return Err(ParseError::NoBoxes);
        }
        if boxes.len() != goals.len() {
            return Err(ParseError::BoxGoalMismatch {
                boxes: boxes.len(),
                goals: goals.len(),
            });
        }

        let map = GridMap {
            tiles,
            width,
            height,
            goals,
            zobrist: Zobrist::new(width, height),
        };
        Ok((map, Placement { character, boxes }))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn goals(&self) -> &BTreeSet<Position> {
        &self.goals
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.goals.contains(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn tile(&self, pos: Position) -> Result<Tile, OutOfBounds> {
        self.index(pos)
            .map(|idx| self.tiles[idx])
            .ok_or(OutOfBounds { x: pos.x, y: pos.y })
    }

    pub fn zobrist(&self) -> &Zobrist {
        &self.zobrist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_blueprint() {
        let input = "#####\n\
                     #@*G#\n\
                     #.*.#\n\
                     #G..#\n\
                     #####";
        let (map, placement) = GridMap::parse(input).unwrap();

        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 5);
        assert_eq!(placement.character, Position::new(1, 1));
        assert_eq!(
            placement.boxes.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(2, 1), Position::new(2, 2)]
        );
        assert_eq!(
            map.goals().iter().copied().collect::<Vec<_>>(),
            vec![Position::new(1, 3), Position::new(3, 1)]
        );
        assert_eq!(map.tile(Position::new(0, 0)), Ok(Tile::Wall));
        assert_eq!(map.tile(Position::new(2, 1)), Ok(Tile::Floor));
        assert_eq!(map.tile(Position::new(3, 1)), Ok(Tile::Goal));
    }

    #[test]
    fn test_overlay_symbols_count_towards_goals() {
        let input = "#####\n\
                     #a*+#\n\
                     #####";
        let (map, placement) = GridMap::parse(input).unwrap();

        assert_eq!(map.goals().len(), 2);
        assert_eq!(map.tile(Position::new(1, 1)), Ok(Tile::Goal));
        assert_eq!(map.tile(Position::new(3, 1)), Ok(Tile::Goal));
        assert_eq!(map.tile(Position::new(2, 1)), Ok(Tile::Floor));
        assert_eq!(placement.boxes.len(), 2);
    }

    #[test]
    fn test_tile_out_of_bounds() {
        let input = "####\n\
                     #@*G\n\
                     ####";
        let (map, _) = GridMap::parse(input).unwrap();

        assert_eq!(
            map.tile(Position::new(-1, 0)),
            Err(OutOfBounds { x: -1, y: 0 })
        );
        assert_eq!(
            map.tile(Position::new(4, 1)),
            Err(OutOfBounds { x: 4, y: 1 })
        );
        assert!(map.tile(Position::new(3, 2)).is_ok());
    }

    #[test]
    fn test_unrecognized_symbol() {
        let input = "####\n\
                     #@$G\n\
                     ####";
        assert_eq!(
            GridMap::parse(input).unwrap_err(),
            ParseError::UnrecognizedSymbol {
                symbol: '$',
                x: 2,
                y: 1
            }
        );
    }

    #[test]
    fn test_no_character() {
        let input = "####\n\
                     #.*G\n\
                     ####";
        assert_eq!(
            GridMap::parse(input).unwrap_err(),
            ParseError::MissingCharacter
        );
    }

    #[test]
    fn test_multiple_characters() {
        let input = "#####\n\
                     #@*Ga\n\
                     #####";
        assert_eq!(
            GridMap::parse(input).unwrap_err(),
            ParseError::MultipleCharacters { x: 4, y: 1 }
        );
    }

    #[test]
    fn test_no_boxes() {
        let input = "####\n\
                     #@.#\n\
                     ####";
        assert_eq!(GridMap::parse(input).unwrap_err(), ParseError::NoBoxes);
    }

    #[test]
    fn test_box_goal_mismatch() {
        let no_goal = "####\n\
                       #@*#\n\
                       ####";
        assert_eq!(
            GridMap::parse(no_goal).unwrap_err(),
            ParseError::BoxGoalMismatch { boxes: 1, goals: 0 }
        );

        let extra_goal = "#####\n\
                          #@*GG\n\
                          #####";
        assert_eq!(
            GridMap::parse(extra_goal).unwrap_err(),
            ParseError::BoxGoalMismatch { boxes: 1, goals: 2 }
        );
    }

    #[test]
    fn test_ragged_row() {
        let input = "#####\n\
                     #@*G\n\
                     #####";
        assert_eq!(
            GridMap::parse(input).unwrap_err(),
            ParseError::RaggedRow {
                row: 1,
                len: 4,
                width: 5
            }
        );
    }

    #[test]
    fn test_empty_blueprint() {
        assert_eq!(GridMap::parse("").unwrap_err(), ParseError::Empty);
        assert_eq!(GridMap::parse("\n\n").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_trailing_blank_lines_ignored() {
        let (map, placement) = GridMap::parse("#####\n#@*G#\n#####\n\n\n").unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 3);
        assert_eq!(placement.character, Position::new(1, 1));
    }

    #[test]
    fn test_direction_geometry() {
        let origin = Position::new(3, 3);
        assert_eq!(origin.step(Direction::Up), Position::new(3, 2));
        assert_eq!(origin.step(Direction::DownLeft), Position::new(2, 4));
        assert!(Direction::UpLeft.is_diagonal());
        assert!(!Direction::Right.is_diagonal());
        assert_eq!(
            Direction::between(origin, Position::new(4, 3)),
            Some(Direction::Right)
        );
        assert_eq!(Direction::between(origin, Position::new(5, 3)), None);
        assert!(origin.is_adjacent(Position::new(3, 4)));
        assert!(!origin.is_adjacent(Position::new(4, 4)));
        assert_eq!(origin.manhattan(Position::new(0, 5)), 5);
    }
}
