use crate::grid::{CARDINAL_DIRECTIONS, Position};
use crate::state::PuzzleState;

/// Trait for computing heuristics that rank search states.
///
/// Lower is better. The value is only used for ordering and is not an
/// admissible distance estimate.
pub trait Heuristic {
    fn compute(&self, state: &PuzzleState) -> usize;
}

/// Ranks every state equally, so the frontier degenerates to FIFO order.
pub struct NullHeuristic;

impl NullHeuristic {
    pub fn new() -> Self {
        NullHeuristic
    }
}

impl Heuristic for NullHeuristic {
    fn compute(&self, _state: &PuzzleState) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Manhattan,
    /// Diagonal-aware distance in hundredths of a step: a diagonal costs 150.
    Octile,
}

impl DistanceMetric {
    pub fn distance(self, a: Position, b: Position) -> usize {
        match self {
            DistanceMetric::Manhattan => a.manhattan(b),
            DistanceMetric::Octile => {
                let dx = a.x.abs_diff(b.x) as usize * 100;
                let dy = a.y.abs_diff(b.y) as usize * 100;
                dx + dy - dx.min(dy) / 2
            }
        }
    }
}

/// Which point the not-adjacent branch measures the distance to `farPoint` from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApproachFrom {
    /// From the cheapest box itself.
    #[default]
    Box,
    /// From the character, which grows with how far it still has to walk.
    Character,
}

/// Tuning knobs of `ObstacleHeuristic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicWeights {
    /// Multiplier applied to the summed cost of all boxes.
    pub box_weight: usize,
    /// Multiplier of the cheapest box cost that is subtracted again.
    pub refund_weight: usize,
    /// Flat penalty while the character is not next to the cheapest box.
    pub approach_penalty: usize,
    /// Per-step weight of the character's distance to the target goal once
    /// it is next to the cheapest box.
    pub adjacent_weight: usize,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        HeuristicWeights {
            box_weight: 4,
            refund_weight: 2,
            approach_penalty: 300,
            adjacent_weight: 50,
        }
    }
}

/// Scores a state from how cluttered the way between each box and the free
/// goals is, then steers the character towards the box that is cheapest to
/// resolve.
pub struct ObstacleHeuristic {
    weights: HeuristicWeights,
    metric: DistanceMetric,
    approach: ApproachFrom,
}

impl ObstacleHeuristic {
    pub fn new(weights: HeuristicWeights, metric: DistanceMetric) -> Self {
        ObstacleHeuristic {
            weights,
            metric,
            approach: ApproachFrom::default(),
        }
    }

    pub fn with_approach(mut self, approach: ApproachFrom) -> Self {
        self.approach = approach;
        self
    }

    /// Number of walls and boxes inside the rectangle spanned by `a` and `b`,
    /// bounds included.
    fn obstacle_count(state: &PuzzleState, a: Position, b: Position) -> usize {
        let mut count = 0;
        for x in a.x.min(b.x)..=a.x.max(b.x) {
            for y in a.y.min(b.y)..=a.y.max(b.y) {
                if !state.can_through(Position::new(x, y)) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Sum over the goals not taken by another box of distance times clutter.
    /// Zero for a box that already rests on a goal.
    fn load_cost(state: &PuzzleState, load: Position) -> usize {
        if state.map().is_goal(load) {
            return 0;
        }
        state
            .map()
            .goals()
            .iter()
            .filter(|&&goal| goal == load || !state.has_box(goal))
            .map(|&goal| load.manhattan(goal) * Self::obstacle_count(state, load, goal))
            .sum()
    }

    /// Closest goal to `target` that no box occupies. Ties go to the lowest
    /// coordinate.
    fn nearest_free_goal(state: &PuzzleState, target: Position) -> Option<Position> {
        state
            .map()
            .goals()
            .iter()
            .copied()
            .filter(|&goal| !state.has_box(goal))
            .min_by_key(|&goal| target.manhattan(goal))
    }

    /// The neighbour of `target` farthest from `goal`, i.e. the side the
    /// character has to push from. Manhattan ties prefer the cell straight
    /// behind the box, then cardinal order.
    fn far_point(target: Position, goal: Position) -> Position {
        let mut best = target.step(CARDINAL_DIRECTIONS[0]);
        let mut best_key = Self::far_key(best, goal);
        for dir in &CARDINAL_DIRECTIONS[1..] {
            let neighbour = target.step(*dir);
            let key = Self::far_key(neighbour, goal);
            if key > best_key {
                best = neighbour;
                best_key = key;
            }
        }
        best
    }

    fn far_key(pos: Position, goal: Position) -> (usize, u64) {
        let dx = pos.x.abs_diff(goal.x) as u64;
        let dy = pos.y.abs_diff(goal.y) as u64;
        (pos.manhattan(goal), dx * dx + dy * dy)
    }
}

impl Default for ObstacleHeuristic {
    fn default() -> Self {
        Self::new(HeuristicWeights::default(), DistanceMetric::default())
    }
}

impl Heuristic for ObstacleHeuristic {
    fn compute(&self, state: &PuzzleState) -> usize {
        if state.is_goal() {
            return 0;
        }

        // Boxes iterate in coordinate order, so the first strict minimum wins ties.
        let mut sum = 0;
        let mut cheapest: Option<(usize, Position)> = None;
        for &load in state.boxes() {
            let cost = Self::load_cost(state, load);
            sum += cost;
            if cost != 0 && cheapest.is_none_or(|(min_cost, _)| cost < min_cost) {
                cheapest = Some((cost, load));
            }
        }

        let Some((min_cost, target)) = cheapest else {
            return 0;
        };
        let mut total = (self.weights.box_weight * sum)
            .saturating_sub(self.weights.refund_weight * min_cost);

        let Some(goal) = Self::nearest_free_goal(state, target) else {
            return total;
        };

        let character = state.character();
        if !character.is_adjacent(target) {
            let far = Self::far_point(target, goal);
            let from = match self.approach {
                ApproachFrom::Box => target,
                ApproachFrom::Character => character,
            };
            total += self.metric.distance(far, from) + self.weights.approach_penalty;
        } else {
            total += goal.manhattan(character) * self.weights.adjacent_weight;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    #[test]
    fn test_goal_state_costs_nothing() {
        let state = PuzzleState::parse("####\n#@+#\n####").unwrap();
        assert_eq!(ObstacleHeuristic::default().compute(&state), 0);
    }

    #[test]
    fn test_adjacent_character() {
        let state = PuzzleState::parse("#####\n#@*G#\n#####").unwrap();
        // load cost 1 * 1 obstacle, weighted 4 - 2, plus 2 steps * 50
        assert_eq!(ObstacleHeuristic::default().compute(&state), 102);
    }

    #[test]
    fn test_distant_character() {
        let state = PuzzleState::parse("######\n#@.*G#\n######").unwrap();
        // 2 for the box, 1 step from the box to its pushing side, 300 penalty
        assert_eq!(ObstacleHeuristic::default().compute(&state), 303);

        let closer = state.move_chara(Direction::Right);
        assert_eq!(ObstacleHeuristic::default().compute(&closer), 102);
    }

    #[test]
    fn test_approach_distance_measured_from_box() {
        // character (1,1), box (4,1), goal (5,1), pushing side (3,1)
        let state = PuzzleState::parse("#######\n#@..*G#\n#######").unwrap();
        assert_eq!(ObstacleHeuristic::default().compute(&state), 303);

        let from_character =
            ObstacleHeuristic::default().with_approach(ApproachFrom::Character);
        assert_eq!(from_character.compute(&state), 304);

        // Once the character stands on the pushing side only the adjacent
        // branch applies, whichever point the approach is measured from.
        let behind = state.move_chara(Direction::Right).move_chara(Direction::Right);
        assert_eq!(ObstacleHeuristic::default().compute(&behind), 102);
        assert_eq!(from_character.compute(&behind), 102);
    }

    #[test]
    fn test_obstacle_count_includes_walls_and_boxes() {
        let state = PuzzleState::parse("######\n#@*#G#\n#....#\n######").unwrap();
        let load = Position::new(2, 1);
        let goal = Position::new(4, 1);
        assert_eq!(ObstacleHeuristic::obstacle_count(&state, load, goal), 2);
        assert_eq!(ObstacleHeuristic::load_cost(&state, load), 4);
    }

    #[test]
    fn test_goals_taken_by_other_boxes_are_ignored() {
        let state = PuzzleState::parse("######\n#@*G+#\n######").unwrap();
        assert_eq!(ObstacleHeuristic::load_cost(&state, Position::new(2, 1)), 1);
        assert_eq!(ObstacleHeuristic::load_cost(&state, Position::new(4, 1)), 0);
        assert_eq!(
            ObstacleHeuristic::nearest_free_goal(&state, Position::new(2, 1)),
            Some(Position::new(3, 1))
        );
        assert_eq!(ObstacleHeuristic::default().compute(&state), 102);
    }

    #[test]
    fn test_cheapest_box_tie_breaks_by_coordinate() {
        let state = PuzzleState::parse("#######\n#G*@*G#\n#######").unwrap();
        // Both boxes cost 1 + 3 * 2 = 7, the left one wins the tie and the
        // character stands next to it.
        let heuristic = ObstacleHeuristic::default();
        let left = Position::new(2, 1);
        let right = Position::new(4, 1);
        assert_eq!(
            ObstacleHeuristic::load_cost(&state, left),
            ObstacleHeuristic::load_cost(&state, right)
        );
        let cost = ObstacleHeuristic::load_cost(&state, left);
        let expected = 4 * 2 * cost - 2 * cost + Position::new(1, 1).manhattan(state.character()) * 50;
        assert_eq!(heuristic.compute(&state), expected);
    }

    #[test]
    fn test_far_point_prefers_cell_behind_box() {
        let target = Position::new(3, 1);
        assert_eq!(
            ObstacleHeuristic::far_point(target, Position::new(4, 1)),
            Position::new(2, 1)
        );
        assert_eq!(
            ObstacleHeuristic::far_point(target, Position::new(3, 5)),
            Position::new(3, 0)
        );
    }

    #[test]
    fn test_custom_weights() {
        let state = PuzzleState::parse("######\n#@.*G#\n######").unwrap();
        let weights = HeuristicWeights {
            box_weight: 1,
            refund_weight: 0,
            approach_penalty: 0,
            adjacent_weight: 0,
        };
        let heuristic = ObstacleHeuristic::new(weights, DistanceMetric::Manhattan);
        assert_eq!(heuristic.compute(&state), 2);

        let octile = ObstacleHeuristic::new(weights, DistanceMetric::Octile);
        assert_eq!(octile.compute(&state), 101);
    }

    #[test]
    fn test_octile_distance() {
        let origin = Position::new(0, 0);
        assert_eq!(DistanceMetric::Octile.distance(origin, Position::new(3, 1)), 350);
        assert_eq!(DistanceMetric::Octile.distance(origin, Position::new(2, 2)), 300);
        assert_eq!(DistanceMetric::Manhattan.distance(origin, Position::new(3, 1)), 4);
    }

    #[test]
    fn test_null_heuristic() {
        let state = PuzzleState::parse("#####\n#@*G#\n#####").unwrap();
        assert_eq!(NullHeuristic::new().compute(&state), 0);
    }
}
