use battle_core::engine::config::EngineConfig;
use battle_core::engine::search::AlphaBetaEngine;
use battle_core::engine::Move;
use battle_core::logic::board::{Board, Color, PieceKind, Position};
use battle_core::logic::event::BoardEvent;
use battle_core::logic::game::{make_turn, GameState, GameStatus};
use battle_core::logic::generator::MoveGenerator;
use battle_core::logic::rules::{apply_move, undo_move};
use std::sync::Arc;

fn pos(x: usize, y: usize) -> Position {
    Position::new(x, y)
}

fn engine() -> AlphaBetaEngine {
    AlphaBetaEngine::new(Arc::new(EngineConfig::default()))
}

#[test]
fn pawn_captures_straight_ahead() {
    let board = Board::from_fen("8/4P3/4p3/8/8/8/8/8 w").unwrap();
    let moves = MoveGenerator::new().get_moves(&board, pos(4, 1));
    assert_eq!(moves, vec![Move::new(pos(4, 1), pos(4, 2))]);
}

#[test]
fn big_unit_wraps_across_east_edge() {
    let mut board = Board::from_fen("8/8/6GH/6HH/8/8/8/8 w").unwrap();
    let east = Move::new(pos(6, 2), pos(0, 2));
    assert!(MoveGenerator::new().get_moves(&board, pos(6, 2)).contains(&east));

    let mut events: Vec<BoardEvent> = Vec::new();
    apply_move(&mut board, east, &mut events);
    assert_eq!(
        events,
        vec![BoardEvent::Warped {
            from: pos(6, 2),
            to: pos(0, 2),
        }]
    );
    assert_eq!(board.get(pos(0, 2)).kind, PieceKind::BigOrigin);
    assert_eq!(board.get(pos(1, 3)).kind, PieceKind::BigBR);
    assert!(board.get(pos(6, 2)).is_empty());
}

#[test]
fn depth_two_search_takes_the_queen() {
    // The only capture available is rook takes queen.
    let board = Board::from_fen("R7/8/8/8/8/q7/8/7p w").unwrap();
    let captures: Vec<_> = MoveGenerator::new()
        .generate_moves_for_color(&board, Color::White)
        .into_iter()
        .filter(|mv| !board.get(mv.to).is_empty())
        .collect();
    assert_eq!(captures.len(), 1);

    let (best, _) = engine().compute_move(&board, 2).unwrap();
    assert_eq!(best, captures[0]);
}

#[test]
fn king_flag_capture_ends_the_match() {
    let mut board = Board::from_fen("8/8/3k!4/8/8/8/3R4/8 w").unwrap();
    let outcome = make_turn(&mut board, &mut engine(), 2);

    assert!(outcome.match_over());
    assert_eq!(outcome.winner, Some(Color::White));
    assert_eq!(board.count_kings(Color::Black), 0);
    assert_eq!(board.get(pos(3, 2)).kind, PieceKind::Rook);

    let mut game = GameState::new(Board::from_fen("8/8/3k!4/8/8/8/3R4/8 w").unwrap());
    game.search_depth = 2;
    game.make_turn(&mut engine()).unwrap();
    assert_eq!(game.status, GameStatus::Ended { winner: Color::White });
}

#[test]
fn promotion_always_yields_a_queen() {
    for fen in ["8/8/8/8/8/8/P1P1P1P1/1r1r1r1r w", "1R1R1R1R/p1p1p1p1/8/8/8/8/8/8 b"] {
        let board = Board::from_fen(fen).unwrap();
        let color = board.color_to_move();
        for mv in MoveGenerator::new().generate_moves_for_color(&board, color) {
            let mut child = board.clone();
            apply_move(&mut child, mv, &mut ());
            let far_rank = if color == Color::White { 7 } else { 0 };
            if mv.to.y == far_rank {
                assert_eq!(child.get(mv.to).kind, PieceKind::Queen, "{fen} {mv}");
            }
        }
    }
}

mod properties {
    use super::*;
    use battle_core::logic::board::Tile;
    use battle_core::logic::rules::spawn_piece_at;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn seeded_board(seed: u64) -> Board {
        let mut rng = StdRng::seed_from_u64(seed);
        let width = rng.gen_range(3..=8);
        let height = rng.gen_range(3..=8);
        let mut board = Board::random(width, height, &mut rng);
        for color in [Color::White, Color::Black] {
            let at = pos(rng.gen_range(0..width - 1), rng.gen_range(0..height - 1));
            spawn_piece_at(&mut board, at, Tile::new(PieceKind::BigOrigin, color), &mut ())
                .unwrap();
        }
        board.turn = rng.gen_range(0..2);
        board
    }

    #[test]
    fn generated_moves_are_owned_in_bounds_and_never_self_capture() {
        let generator = MoveGenerator::new();
        for seed in 0..200 {
            let board = seeded_board(seed);
            assert!(board.validate().is_ok());
            for color in [Color::White, Color::Black] {
                for mv in generator.generate_moves_for_color(&board, color) {
                    let mover = board.get(mv.from);
                    assert_eq!(mover.color, color, "seed {seed} {mv}");
                    assert!(!mover.is_empty(), "seed {seed} {mv}");
                    assert!(board.contains(mv.to), "seed {seed} {mv}");
                    let target = board.get(mv.to);
                    let covers_self = mover.kind == PieceKind::BigOrigin
                        && Board::footprint_contains(mv.from, mv.to);
                    assert!(
                        !target.is_friend_of(color) || covers_self,
                        "seed {seed} {mv}"
                    );
                }
            }
        }
    }

    #[test]
    fn apply_then_undo_is_identity() {
        let generator = MoveGenerator::new();
        for seed in 0..100 {
            let mut board = seeded_board(seed);
            let before = board.clone();
            for mv in generator.generate_moves_for_color(&board, board.color_to_move()) {
                let undo = apply_move(&mut board, mv, &mut ());
                assert!(board.validate().is_ok(), "seed {seed} {mv}");
                undo_move(&mut board, &undo);
                assert_eq!(board, before, "seed {seed} {mv}");
            }
        }
    }

    #[test]
    fn each_capture_fires_exactly_one_removal() {
        let generator = MoveGenerator::new();
        for seed in 0..100 {
            let board = seeded_board(seed);
            let mover = board.color_to_move();
            for mv in generator.generate_moves_for_color(&board, mover) {
                let mut child = board.clone();
                let mut events: Vec<BoardEvent> = Vec::new();
                apply_move(&mut child, mv, &mut events);

                let removed: Vec<Position> = events
                    .iter()
                    .filter_map(|e| match e {
                        BoardEvent::Removed { at, .. } => Some(*at),
                        _ => None,
                    })
                    .collect();
                let unique: HashSet<Position> = removed.iter().copied().collect();
                assert_eq!(removed.len(), unique.len(), "seed {seed} {mv}");
                for at in removed {
                    assert!(board.get(at).is_enemy_of(mover), "seed {seed} {mv}");
                    let after = child.get(at);
                    assert!(after.is_empty() || after.is_friend_of(mover), "seed {seed} {mv}");
                }
            }
        }
    }

    #[test]
    fn search_never_invents_a_move() {
        let generator = MoveGenerator::new();
        let mut engine = engine();
        for seed in 0..30 {
            let board = seeded_board(seed);
            let legal = generator.generate_moves_for_color(&board, board.color_to_move());
            match engine.compute_move(&board, 2) {
                Some((mv, _)) => assert!(legal.contains(&mv), "seed {seed} {mv}"),
                None => assert!(legal.is_empty(), "seed {seed}"),
            }
        }
    }

    #[test]
    fn pruned_search_matches_exhaustive_on_small_boards() {
        for seed in 0..15 {
            let mut rng = StdRng::seed_from_u64(seed);
            let board = Board::random(4, 4, &mut rng);
            for depth in 1..=3 {
                let mut engine = engine();
                let pruned = engine.compute_move(&board, depth).map(|(_, s)| s.score);
                assert_eq!(pruned, engine.exhaustive_score(&board, depth), "seed {seed} depth {depth}");
            }
        }
    }
}
