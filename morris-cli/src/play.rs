//! Play command - a human against the AI, or AI matches
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_interactive(), play_matches()
//! - Level 3: human_turn(), report_results()
//! - Level 4: brain loading, argument conversion

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::Rng;

use morris_core::{Brain, MinimaxAI, Player, Point, Progress, Rules, TurnBuilder};
use morris_selfplay::{
    play_learner_game, AiConfig, BrainLog, BrainSelector, FitnessSummary, GameOutcome, SelfPlayConfig,
};

use crate::create_rng;
use crate::render::render;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Player::White,
            Side::Black => Player::Black,
        }
    }
}

#[derive(Args)]
pub struct PlayArgs {
    /// Play yourself as this side
    #[arg(long, value_enum)]
    pub human: Option<Side>,

    /// Number of AI games to play (alternating colours)
    #[arg(long, default_value = "2")]
    pub games: usize,

    /// AI search depth
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Opponent search depth in AI matches
    #[arg(long, default_value = "2")]
    pub opponent_depth: u32,

    /// Use a random opponent in AI matches
    #[arg(long)]
    pub random_opponent: bool,

    /// Brain log to take the AI's weights from
    #[arg(long, value_name = "FILE", default_value = "brain.json")]
    pub brain_file: PathBuf,

    /// Games reaching this many plies are draws
    #[arg(long, default_value = "400")]
    pub max_plies: u32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let (brain, opponent) = load_brains(&args);
    match args.human {
        Some(side) => play_interactive(&args, side.into(), brain),
        None => {
            let seed = seed.unwrap_or_else(|| create_rng(None).gen());
            let games = play_matches(&args, &brain, &opponent, seed)?;
            report_results(&games);
            Ok(())
        }
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_interactive(args: &PlayArgs, human: Player, brain: Brain) -> Result<()> {
    let mut ai = MinimaxAI::new(human.opponent(), brain, args.depth);
    let mut rules = Rules::new();
    let mut builder = TurnBuilder::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You play {}. Enter one point per line (e.g. d2), `quit` to stop.", human);
    while !rules.is_terminal() {
        if rules.board().turn() != human {
            let mv = ai.best_move(&mut rules)?.context("AI found no move")?;
            rules.commit(mv)?;
            println!("AI plays {}", mv);
            continue;
        }

        println!("\n{}", render(&builder.snapshot(&rules)));
        print!("{}> ", prompt(&builder));
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("Failed to read input")?;
        if line.trim() == "quit" {
            return Ok(());
        }
        human_turn(&mut rules, &mut builder, line.trim())?;
    }

    println!("\n{}", render(&rules.snapshot()));
    match rules.result().winner() {
        Some(winner) if winner == human => println!("You win!"),
        Some(_) => println!("The AI wins."),
        None => println!("Draw."),
    }
    Ok(())
}

fn play_matches(args: &PlayArgs, brain: &Brain, opponent: &Brain, seed: u64) -> Result<Vec<(Player, GameOutcome)>> {
    let opponent_config = if args.random_opponent {
        AiConfig::random()
    } else {
        AiConfig::minimax(args.opponent_depth)
    };
    let base = SelfPlayConfig::default()
        .with_learner(AiConfig::minimax(args.depth))
        .with_opponent(opponent_config)
        .with_max_plies(args.max_plies);

    let mut games = Vec::with_capacity(args.games);
    for i in 0..args.games {
        let side = if i % 2 == 0 { Player::White } else { Player::Black };
        let config = base.clone().with_learner_side(side);
        let outcome = play_learner_game(&config, brain, opponent, seed.wrapping_add(2 * i as u64))?;
        tracing::info!("Game {}: AI as {} -> {:?} in {} plies", i + 1, side, outcome.result, outcome.plies);
        games.push((side, outcome));
    }
    Ok(games)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn prompt(builder: &TurnBuilder) -> &'static str {
    if builder.awaiting_capture() {
        "capture"
    } else if builder.selected().is_some() {
        "move to"
    } else {
        "point"
    }
}

/// Apply one line of human input; rule errors are reported, not returned
fn human_turn(rules: &mut Rules, builder: &mut TurnBuilder, input: &str) -> Result<()> {
    let point: Point = match input.parse() {
        Ok(point) => point,
        Err(err) => {
            println!("{}", err);
            return Ok(());
        }
    };
    let intent = builder.interpret(rules, point);
    match builder.submit(rules, intent) {
        Ok(Progress::Ready(mv)) => println!("You play {}", mv),
        Ok(Progress::Pending) => {}
        Err(err) if err.is_invariant_violation() => return Err(err.into()),
        Err(err) => println!("Illegal: {}", err),
    }
    Ok(())
}

fn report_results(games: &[(Player, GameOutcome)]) {
    let summary = FitnessSummary::from_games(
        games
            .iter()
            .map(|(side, game)| (game.outcome_for(*side), game.score_for(*side))),
    );
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|(_, g)| g.plies as f32).sum::<f32>() / games.len() as f32
    };

    println!("\n=== Match Results ===");
    println!("Games: {}", summary.total_games());
    println!("AI wins: {}  draws: {}  losses: {}", summary.wins, summary.draws, summary.losses);
    println!("Score: {:.1}%", summary.normalized_score() * 100.0);
    println!("Average length: {:.1} plies", avg_plies);
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// AI brain: best logged, else the default. Opponent: latest winning brain, else the default.
fn load_brains(args: &PlayArgs) -> (Brain, Brain) {
    let log = BrainLog::load_or_default(&args.brain_file);
    let brain = log.select(BrainSelector::Best).unwrap_or_default();
    let opponent = log.select(BrainSelector::LastPositive).unwrap_or_default();
    (brain, opponent)
}
