mod grid;
mod heuristic;
mod levels;
mod pqueue;
mod solver;
mod state;
mod zobrist;

use clap::{Parser, ValueEnum};
use heuristic::{
    ApproachFrom, DistanceMetric, Heuristic, HeuristicWeights, NullHeuristic, ObstacleHeuristic,
};
use levels::Levels;
use log::debug;
use pqueue::FrontierOrder;
use solver::{SolveResult, Solution, Solver, SolverConfig, Tracer};
use state::PuzzleState;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicType {
    Obstacle,
    Null,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Metric {
    Manhattan,
    Octile,
}

impl From<Metric> for DistanceMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Manhattan => DistanceMetric::Manhattan,
            Metric::Octile => DistanceMetric::Octile,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Approach {
    Box,
    Character,
}

impl From<Approach> for ApproachFrom {
    fn from(approach: Approach) -> Self {
        match approach {
            Approach::Box => ApproachFrom::Box,
            Approach::Character => ApproachFrom::Character,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    Lowest,
    Highest,
}

impl From<Order> for FrontierOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Lowest => FrontierOrder::LowestCostFirst,
            Order::Highest => FrontierOrder::HighestCostFirst,
        }
    }
}

fn print_solution(solution: &Solution) {
    let total = solution.len();
    if let Some(initial) = solution.states.first() {
        println!("\nStarting position:\n{}", initial);
    }
    for (count, (dir, state)) in solution
        .moves
        .iter()
        .zip(&solution.states[1..])
        .enumerate()
    {
        println!("↓ {} ({}/{})\n{}", dir, count + 1, total, state);
    }
    println!("moves: {}", solution.notation());
}

struct VerboseTracer {
    trace_start: usize,
    trace_end: usize,
}

impl VerboseTracer {
    fn new(from_node: usize, to_node: usize) -> Self {
        Self {
            trace_start: from_node,
            trace_end: to_node,
        }
    }
}

impl Tracer for VerboseTracer {
    fn trace(&self, state: &PuzzleState, nodes_explored: usize, cost: usize) {
        if self.trace_start <= nodes_explored && nodes_explored <= self.trace_end {
            println!("count={}, cost={}:\n{}", nodes_explored, cost, state);
        }
    }
}

struct LevelStats {
    solved: bool,
    steps: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

struct SolveOpts {
    level_num: usize,
    config: SolverConfig,
    print_solution: bool,
    trace_range: Option<(usize, usize)>,
}

fn solve_level_helper<H: Heuristic>(
    state: &PuzzleState,
    opts: SolveOpts,
    heuristic: H,
) -> LevelStats {
    let tracer = opts
        .trace_range
        .map(|(trace_start, trace_end)| VerboseTracer::new(trace_start, trace_end));

    let mut solver = Solver::new(state.clone(), heuristic, opts.config).with_tracer(tracer);
    let start = Instant::now();
    let result = solver.solve();
    let elapsed_ms = start.elapsed().as_millis();
    let stats = solver.stats();
    debug!(
        "level {} stats: {:?} visited={}",
        opts.level_num,
        stats,
        solver.visited_count()
    );

    let (solved_char, solution_len, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Exhausted => ('X', 0, false),
    };

    println!(
        "level: {:<3}  solved: {}  steps: {:<5}  states: {:<12}  elapsed: {} ms",
        opts.level_num,
        solved_char,
        solution_len,
        solver.nodes_explored(),
        elapsed_ms
    );

    if opts.print_solution {
        if let SolveResult::Solved(solution) = result {
            print_solution(&solution);
        }
    }

    LevelStats {
        solved,
        steps: solution_len,
        states_explored: stats.nodes_explored,
        elapsed_ms,
    }
}

fn solve_level(state: &PuzzleState, opts: SolveOpts, args: &Args) -> LevelStats {
    match args.heuristic {
        HeuristicType::Obstacle => {
            let weights = HeuristicWeights {
                box_weight: args.box_weight,
                refund_weight: args.refund_weight,
                approach_penalty: args.approach_penalty,
                adjacent_weight: args.adjacent_weight,
            };
            let heuristic = ObstacleHeuristic::new(weights, args.metric.into())
                .with_approach(args.approach.into());
            solve_level_helper(state, opts, heuristic)
        }
        HeuristicType::Null => solve_level_helper(state, opts, NullHeuristic::new()),
    }
}

#[derive(Parser)]
#[command(name = "pushbox")]
#[command(about = "A box-pushing puzzle solver", long_about = None)]
struct Args {
    /// Path to the blueprint file
    #[arg(value_name = "FILE")]
    levels_file: String,

    /// Blueprint number to solve (1-indexed), or start of range
    #[arg(value_name = "LEVEL", default_value = "1")]
    level_start: usize,

    /// Optional end of level range (inclusive, 1-indexed)
    #[arg(value_name = "LEVEL_END")]
    level_end: Option<usize>,

    /// Print the solution step-by-step
    #[arg(short, long)]
    print_solution: bool,

    /// Maximum number of nodes to explore before giving up
    #[arg(short = 'n', long, default_value = "5000000")]
    max_nodes_explored: usize,

    /// Heuristic to use for solving
    #[arg(short = 'H', long, value_enum, default_value = "obstacle")]
    heuristic: HeuristicType,

    /// Distance used to approach the pushing side of a box
    #[arg(long, value_enum, default_value = "manhattan")]
    metric: Metric,

    /// Point the distance to the pushing side is measured from
    #[arg(long, value_enum, default_value = "box")]
    approach: Approach,

    /// Which end of the cost range the frontier expands first
    #[arg(long, value_enum, default_value = "lowest")]
    order: Order,

    /// Stop as soon as a goal state is generated
    #[arg(long, default_value = "false")]
    early_goal_check: bool,

    /// Multiplier of the summed box costs
    #[arg(long, default_value = "4")]
    box_weight: usize,

    /// Multiplier of the cheapest box cost refunded from the total
    #[arg(long, default_value = "2")]
    refund_weight: usize,

    /// Penalty while the character is away from the cheapest box
    #[arg(long, default_value = "300")]
    approach_penalty: usize,

    /// Per-step weight once the character is next to the cheapest box
    #[arg(long, default_value = "50")]
    adjacent_weight: usize,

    /// Log progress every this many expanded nodes (0 disables)
    #[arg(long, default_value = "100000")]
    progress_interval: usize,

    /// Range of expanded node numbers to trace (start, end)
    #[arg(long, num_args = 2)]
    trace_range: Option<Vec<usize>>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    // Load blueprints from file
    let levels = match Levels::from_file(&args.levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    if levels.is_empty() {
        eprintln!("Error: {} contains no levels", args.levels_file);
        std::process::exit(1);
    }

    // Determine the range of levels to solve
    let level_end = args.level_end.unwrap_or(args.level_start);

    // Validate range
    if args.level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < args.level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - args.level_start + 1;
    if args.print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    // Validate trace_range
    let trace_range = args.trace_range.as_ref().map(|v| (v[0], v[1]));
    if let Some((start, end)) = trace_range {
        if start > end {
            eprintln!("Error: trace range start must be <= end");
            std::process::exit(1);
        }
    }

    let config = SolverConfig {
        max_nodes_explored: args.max_nodes_explored,
        order: args.order.into(),
        early_goal_check: args.early_goal_check,
        progress_interval: args.progress_interval,
    };

    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for (level_num, state) in (args.level_start..=level_end)
        .filter_map(|num| levels.get(num - 1).map(|state| (num, state)))
    {
        let opts = SolveOpts {
            level_num,
            config,
            print_solution: args.print_solution,
            trace_range,
        };
        let stats = solve_level(state, opts, &args);

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    // Print summary statistics if multiple levels were solved
    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_states, total_time_ms
        );
    }
}
