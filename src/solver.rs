use log::{debug, info, trace};

use crate::grid::Direction;
use crate::heuristic::Heuristic;
use crate::pqueue::{FrontierOrder, PriorityQueue};
use crate::state::PuzzleState;
use crate::zobrist::VisitedSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Give up with `SolveResult::Cutoff` after this many expansions.
    pub max_nodes_explored: usize,
    pub order: FrontierOrder,
    /// Stop as soon as a goal state is generated instead of when it is popped.
    pub early_goal_check: bool,
    /// Log progress every this many expansions; zero disables it.
    pub progress_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_nodes_explored: 5_000_000,
            order: FrontierOrder::LowestCostFirst,
            early_goal_check: false,
            progress_interval: 100_000,
        }
    }
}

/// Index of a node in the solver's arena.
pub type NodeId = usize;

/// A discovered state, the node it was reached from, and its heuristic cost.
#[derive(Debug)]
pub struct SearchNode {
    pub state: PuzzleState,
    pub parent: Option<NodeId>,
    pub cost: usize,
}

/// The states from the initial configuration to a goal configuration, and the
/// character step taken between each consecutive pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub states: Vec<PuzzleState>,
    pub moves: Vec<Direction>,
}

impl Solution {
    fn from_states(states: Vec<PuzzleState>) -> Self {
        let moves = states
            .windows(2)
            .filter_map(|pair| Direction::between(pair[0].character(), pair[1].character()))
            .collect();
        Solution { states, moves }
    }

    /// Number of character steps.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves in compact `URDL` notation.
    pub fn notation(&self) -> String {
        self.moves.iter().map(|dir| dir.symbol()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Solution),
    /// Every reachable configuration was explored without reaching a goal.
    Exhausted,
    /// The node budget ran out first.
    Cutoff,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the frontier and goal-tested.
    pub nodes_explored: usize,
    /// Successor states produced by move generation.
    pub nodes_generated: usize,
    /// Successors dropped because their configuration was already visited.
    pub duplicates: usize,
}

/// Hook called for every node the solver expands.
pub trait Tracer {
    fn trace(&self, state: &PuzzleState, nodes_explored: usize, cost: usize);
}

pub struct NoTracer;

impl Tracer for NoTracer {
    fn trace(&self, _state: &PuzzleState, _nodes_explored: usize, _cost: usize) {}
}

/// Best-first search over character moves.
pub struct Solver<H: Heuristic, T: Tracer = NoTracer> {
    initial: PuzzleState,
    heuristic: H,
    config: SolverConfig,
    tracer: Option<T>,
    nodes: Vec<SearchNode>,
    frontier: PriorityQueue<NodeId>,
    visited: VisitedSet,
    stats: SearchStats,
}

impl<H: Heuristic> Solver<H, NoTracer> {
    pub fn new(initial: PuzzleState, heuristic: H, config: SolverConfig) -> Self {
        Solver {
            initial,
            heuristic,
            config,
            tracer: None,
            nodes: Vec::new(),
            frontier: PriorityQueue::new(config.order),
            visited: VisitedSet::new(),
            stats: SearchStats::default(),
        }
    }
}

impl<H: Heuristic, T: Tracer> Solver<H, T> {
    pub fn with_tracer<U: Tracer>(self, tracer: Option<U>) -> Solver<H, U> {
        Solver {
            initial: self.initial,
            heuristic: self.heuristic,
            config: self.config,
            tracer,
            nodes: self.nodes,
            frontier: self.frontier,
            visited: self.visited,
            stats: self.stats,
        }
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn nodes_explored(&self) -> usize {
        self.stats.nodes_explored
    }

    /// Number of distinct configurations generated by the last search.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.frontier.clear();
        self.visited.clear();
        self.stats = SearchStats::default();
    }

    fn add_node(&mut self, state: PuzzleState, parent: Option<NodeId>, cost: usize) -> NodeId {
        self.nodes.push(SearchNode {
            state,
            parent,
            cost,
        });
        self.nodes.len() - 1
    }

    /// Follow parent links from `id` back to the root.
    fn reconstruct(&self, id: NodeId) -> Solution {
        let mut states = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id];
            states.push(node.state.clone());
            current = node.parent;
        }
        states.reverse();
        Solution::from_states(states)
    }

    fn finish(&self, id: NodeId) -> SolveResult {
        let solution = self.reconstruct(id);
        info!(
            "solved in {} moves: explored={} generated={} duplicates={}",
            solution.len(),
            self.stats.nodes_explored,
            self.stats.nodes_generated,
            self.stats.duplicates
        );
        SolveResult::Solved(solution)
    }

    /// Run the search from the initial state. Every call starts from scratch.
    pub fn solve(&mut self) -> SolveResult {
        self.reset();

        let initial = self.initial.clone();
        let root_cost = self.heuristic.compute(&initial);
        debug!(
            "search started: boxes={} root_cost={} order={:?}",
            initial.box_count(),
            root_cost,
            self.config.order
        );
        self.visited.insert(initial.clone());
        let root = self.add_node(initial, None, root_cost);
        self.frontier.push(root_cost, root);

        while let Some((_, id)) = self.frontier.pop() {
            if self.stats.nodes_explored >= self.config.max_nodes_explored {
                info!(
                    "node budget of {} exhausted, {} nodes left in frontier",
                    self.config.max_nodes_explored,
                    self.frontier.len() + 1
                );
                return SolveResult::Cutoff;
            }
            self.stats.nodes_explored += 1;
            let cost = self.nodes[id].cost;
            trace!(
                "expanding node {} (explored={} cost={}):\n{}",
                id,
                self.stats.nodes_explored,
                cost,
                self.nodes[id].state
            );

            if let Some(tracer) = &self.tracer {
                tracer.trace(&self.nodes[id].state, self.stats.nodes_explored, cost);
            }
            if self.config.progress_interval > 0
                && self.stats.nodes_explored % self.config.progress_interval == 0
            {
                info!(
                    "explored={} frontier={} visited={} cost={}",
                    self.stats.nodes_explored,
                    self.frontier.len(),
                    self.visited.len(),
                    cost
                );
            }

            if self.nodes[id].state.is_goal() {
                return self.finish(id);
            }

            let successors = self.nodes[id].state.successors();
            for (_, next) in successors {
                self.stats.nodes_generated += 1;
                if !self.visited.insert(next.clone()) {
                    self.stats.duplicates += 1;
                    continue;
                }

                let next_cost = self.heuristic.compute(&next);
                let is_goal = self.config.early_goal_check && next.is_goal();
                let child = self.add_node(next, Some(id), next_cost);
                if is_goal {
                    debug!("goal generated early at node {}", child);
                    return self.finish(child);
                }
                self.frontier.push(next_cost, child);
            }
        }

        info!(
            "search exhausted: explored={} visited={}",
            self.stats.nodes_explored,
            self.visited.len()
        );
        SolveResult::Exhausted
    }
}
