//! Integration tests for the Nine Men's Morris engine
//!
//! Tests the full stack: rules, search, evaluator, evolution and self-play

use morris_core::{
    Board, Brain, Error, Evaluator, GameResult, MinimaxAI, Move, Phase, Player, Point, RandomAI, Rules,
    BRAIN_SIZE, WIN_SCORE,
};
use morris_evolve::{EvolutionConfig, Ga};
use morris_selfplay::{
    next_elite, run_generation, AiConfig, BrainLog, BrainSelector, GameRunner, SelfPlayConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn pt(name: &str) -> Point {
    name.parse().unwrap()
}

fn pts(names: &[&str]) -> Vec<Point> {
    names.iter().map(|n| pt(n)).collect()
}

fn position(white: &[&str], black: &[&str], in_hand: [u8; 2], turn: Player) -> Rules {
    Rules::from_board(Board::setup(&pts(white), &pts(black), in_hand, turn).unwrap())
}

/// Play `plies` seeded random moves from the opening
fn random_position(seed: u64, plies: u32) -> Rules {
    let mut rules = Rules::new();
    let mut ai = RandomAI::new(seed);
    for _ in 0..plies {
        if rules.is_terminal() {
            break;
        }
        let mv = ai.select_move(&rules.legal_moves()).unwrap();
        rules.commit(mv).unwrap();
    }
    rules
}

// ============================================================================
// RULES
// ============================================================================

#[test]
fn test_mill_without_opponent_pieces_has_no_captures() {
    let rules = position(&["a1", "a4"], &[], [7, 9], Player::White);
    let moves = rules.legal_moves();

    assert!(moves.iter().all(|m| !m.is_capture()));
    assert!(moves.contains(&Move::place(pt("a7"))));
    assert_eq!(rules.validate(&Move::place(pt("a7"))), Ok(()));
}

#[test]
fn test_capture_down_to_two_pieces_is_a_loss() {
    let mut rules = position(&["a1", "a7", "b4", "d2"], &["g7", "e3", "c5", "g1"], [0, 0], Player::White);
    assert_eq!(rules.phase(), Phase::Movement);

    let first: Move = "b4-a4xg7".parse().unwrap();
    assert!(rules.legal_moves().contains(&first));
    rules.commit(first).unwrap();
    assert_eq!(rules.board().pieces_on_board(Player::Black), 3);
    assert_eq!(rules.phase(), Phase::Flying);
    assert!(!rules.is_terminal());

    // Open the mill and close it again for the second capture
    for s in ["e3-e4", "a4-b4", "e4-e3"] {
        rules.commit(s.parse().unwrap()).unwrap();
        assert!(!rules.is_terminal(), "game ended after {}", s);
    }
    let second: Move = "b4-a4xc5".parse().unwrap();
    assert!(rules.legal_moves().contains(&second));
    rules.commit(second).unwrap();

    assert_eq!(rules.board().pieces_on_board(Player::Black), 2);
    assert_eq!(rules.phase(), Phase::Loss);
    assert!(rules.is_terminal());
    assert_eq!(rules.result(), GameResult::WhiteWins);
    assert!(rules.legal_moves().is_empty());
    assert_eq!(rules.commit(Move::slide(pt("e3"), pt("e4"))), Err(Error::GameOver));
}

#[test]
fn test_flying_shuffle_draws_on_third_recurrence() {
    let mut rules = position(&["a1", "c5", "f2"], &["g7", "b4", "e3"], [0, 0], Player::White);
    assert_eq!(rules.phase(), Phase::Flying);

    let cycle: Vec<Move> = ["a1-a4", "g7-g4", "a4-a1", "g4-g7"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();

    // The position after the first move recurs at plies 1, 5 and 9
    for ply in 1..=8u32 {
        rules.commit(cycle[(ply as usize - 1) % 4]).unwrap();
        assert!(!rules.is_terminal(), "draw declared early at ply {}", ply);
    }
    rules.commit(cycle[0]).unwrap();
    assert_eq!(rules.repetitions(), 3);
    assert_eq!(rules.phase(), Phase::Draw);
    assert_eq!(rules.result(), GameResult::Draw);
}

#[test]
fn test_capture_eligibility() {
    // Black b2-b4-b6 is a closed mill, d7 is free
    let rules = position(&["a1", "a4"], &["b2", "b4", "b6", "d7"], [5, 5], Player::White);
    assert_eq!(rules.capturable(Player::Black), vec![pt("d7")]);
    assert_eq!(
        rules.validate(&Move::place(pt("a7")).capturing(pt("b4"))),
        Err(Error::ProtectedPiece(pt("b4")))
    );

    // Every black piece in a mill: all become eligible
    let rules = position(&["a1", "a4"], &["b2", "b4", "b6"], [5, 6], Player::White);
    assert_eq!(rules.capturable(Player::Black), pts(&["b2", "b4", "b6"]));
    assert_eq!(rules.validate(&Move::place(pt("a7")).capturing(pt("b4"))), Ok(()));
}

#[test]
fn test_apply_undo_round_trip_over_games() {
    let mut ai = RandomAI::new(2024);
    for _ in 0..5 {
        let mut rules = Rules::new();
        while !rules.is_terminal() && rules.board().ply() < 150 {
            let before = rules.board().clone();
            for mv in rules.legal_moves() {
                let undo = rules.apply(mv).unwrap();
                assert_ne!(rules.board().hash(), before.hash());
                rules.undo(undo).unwrap();
                assert_eq!(rules.board(), &before, "undo of {} changed the board", mv);
            }
            let mv = ai.select_move(&rules.legal_moves()).unwrap();
            rules.commit(mv).unwrap();
        }
    }
}

#[test]
fn test_hash_is_path_independent() {
    let mut a = Rules::new();
    let mut b = Rules::new();
    for s in ["a1", "g7", "d2", "b6"] {
        a.commit(s.parse().unwrap()).unwrap();
    }
    for s in ["d2", "b6", "a1", "g7"] {
        b.commit(s.parse().unwrap()).unwrap();
    }
    assert_eq!(a.board().hash(), b.board().hash());
    assert_eq!(a.board(), b.board());
}

// ============================================================================
// SEARCH AND EVALUATION
// ============================================================================

#[test]
fn test_depth_zero_is_greedy() {
    for seed in 0..4 {
        let mut rules = random_position(seed, 12);
        let me = rules.board().turn();
        let evaluator = Evaluator::new(me, Brain::default());

        let mut greedy: Option<(Move, f32)> = None;
        for mv in rules.legal_moves() {
            let guard = rules.try_move(mv).unwrap();
            let score = match guard.result() {
                GameResult::Ongoing => evaluator.evaluate(&guard),
                GameResult::Draw => 0.0,
                r if r.winner() == Some(me) => WIN_SCORE,
                _ => -WIN_SCORE,
            };
            guard.finish().unwrap();
            if greedy.map_or(true, |(_, best)| score > best) {
                greedy = Some((mv, score));
            }
        }

        let mut ai = MinimaxAI::new(me, Brain::default(), 0);
        assert_eq!(ai.best_move(&mut rules).unwrap(), greedy.map(|(mv, _)| mv));
    }
}

#[test]
fn test_weights_round_trip_keeps_evaluation() {
    let rules = random_position(5, 30);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut evaluator = Evaluator::new(Player::White, Brain::random(&mut rng));
    let before = evaluator.evaluate(&rules);

    let weights = evaluator.get_weights();
    assert_eq!(weights.len(), BRAIN_SIZE);
    evaluator.set_weights(&weights).unwrap();
    assert_eq!(evaluator.evaluate(&rules), before);

    assert_eq!(
        evaluator.set_weights(&weights[1..]),
        Err(Error::BrainSize {
            expected: BRAIN_SIZE,
            got: BRAIN_SIZE - 1
        })
    );
}

#[test]
fn test_search_leaves_game_intact() {
    let mut rules = random_position(8, 14);
    let before = rules.board().clone();
    let mut ai = MinimaxAI::new(rules.board().turn(), Brain::default(), 3);
    let mv = ai.best_move(&mut rules).unwrap().unwrap();

    assert_eq!(rules.board(), &before);
    assert!(ai.stats().nodes > 0);
    assert_eq!(rules.validate(&mv), Ok(()));
}

// ============================================================================
// EVOLUTION
// ============================================================================

#[test]
fn test_generation_feeds_brain_log() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut ga = Ga::new(EvolutionConfig::default().with_population_size(3));
    let config = SelfPlayConfig::default()
        .with_learner(AiConfig::minimax(1))
        .with_opponent(AiConfig::random())
        .with_max_plies(80)
        .with_seed(7);
    let mut runner = GameRunner::new(config);
    let elite = Brain::default();

    let report = run_generation(&mut ga, &mut runner, &elite, &elite, &mut rng).unwrap();
    let mut log = BrainLog::default();
    for record in report.records() {
        log.append(record);
    }
    assert_eq!(log.len(), 3);
    assert_eq!(log.last_generation(), Some(1));

    let path = std::env::temp_dir().join("morris_integration_brain_log.json");
    log.save(&path).unwrap();
    let loaded = BrainLog::load_or_default(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, log);

    let next = next_elite(&report, &elite);
    let best = loaded.select(BrainSelector::Best).unwrap();
    if report.members.iter().any(|m| m.score >= 0.0) {
        assert_eq!(next, best);
    } else {
        assert_eq!(next, elite);
    }
}

#[test]
fn test_missing_or_broken_log_falls_back() {
    let dir = std::env::temp_dir();
    let missing = dir.join("morris_integration_missing.json");
    let _ = std::fs::remove_file(&missing);
    assert!(BrainLog::load_or_default(&missing).is_empty());

    let broken = dir.join("morris_integration_broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    let log = BrainLog::load_or_default(&broken);
    let _ = std::fs::remove_file(&broken);
    assert!(log.is_empty());
    assert_eq!(log.select(BrainSelector::Best).unwrap_or_default(), Brain::default());
}
