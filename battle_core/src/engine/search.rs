use crate::engine::config::{EngineConfig, TieBreak};
use crate::engine::eval::MaterialEvaluator;
use crate::engine::{Evaluator, Move, SearchStats, Searcher};
use crate::logic::board::{Board, Color, PieceKind, Position};
use crate::logic::eval_constants::INF;
use crate::logic::generator::MoveGenerator;
use crate::logic::rules::{apply_move, undo_move};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::cmp::Reverse;
use std::sync::Arc;

/// Fixed-depth negamax with alpha-beta pruning. Each branch plays its move on
/// a shared scratch board and undoes it before the next sibling.
pub struct AlphaBetaEngine {
    config: Arc<EngineConfig>,
    evaluator: MaterialEvaluator,
    generator: MoveGenerator,
    rng: StdRng,
    nodes_searched: u64,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: MaterialEvaluator::new(&config),
            generator: MoveGenerator::new(),
            rng: StdRng::seed_from_u64(config.seed),
            nodes_searched: 0,
            config,
        }
    }

    /// Swaps in new tuning and reseeds the tie-break RNG from it.
    pub fn update_config(&mut self, config: Arc<EngineConfig>) {
        self.evaluator = MaterialEvaluator::new(&config);
        self.rng = StdRng::seed_from_u64(config.seed);
        self.config = config;
    }

    fn now() -> f64 {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            if let Some(window) = web_sys::window() {
                return window.performance().map(|p| p.now()).unwrap_or(0.0);
            }
            let global = js_sys::global();
            if let Ok(worker) = global.dyn_into::<web_sys::WorkerGlobalScope>() {
                return worker.performance().map(|p| p.now()).unwrap_or(0.0);
            }
            0.0
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::time::{SystemTime, UNIX_EPOCH};
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            #[allow(clippy::cast_precision_loss)]
            let time_ms = (since_the_epoch.as_secs() as f64).mul_add(
                1000.0,
                f64::from(since_the_epoch.subsec_nanos()) / 1_000_000.0,
            );
            time_ms
        }
    }

    /// Best move for the side to move at `depth` plies (0 counts as 1), or
    /// `None` when that side has no legal move.
    pub fn compute_move(&mut self, board: &Board, depth: u8) -> Option<(Move, SearchStats)> {
        let start_time = Self::now();
        self.nodes_searched = 0;
        let depth = depth.max(1);
        let color = board.color_to_move();
        if !self.generator.has_moves(board, color) {
            log::debug!("no legal move for {color:?} at turn {}", board.turn);
            return None;
        }

        let mut scratch = board.clone();
        let moves = self.ordered_moves(&scratch, color);

        let random_ties = self.config.tie_break == TieBreak::Random;
        let mut best_score = -INF;
        let mut best_moves: Vec<Move> = Vec::new();

        for mv in moves {
            // Drawing among ties needs their scores exact, not upper bounds.
            let alpha = if random_ties {
                best_score.saturating_sub(1)
            } else {
                best_score
            };

            let undo = apply_move(&mut scratch, mv, &mut ());
            let score = -self.negamax(&mut scratch, color.opposite(), depth - 1, -INF, -alpha);
            undo_move(&mut scratch, &undo);
            log::trace!("root {mv} scored {score}");

            if score > best_score {
                best_score = score;
                best_moves.clear();
                best_moves.push(mv);
            } else if random_ties && score == best_score {
                best_moves.push(mv);
            }
        }

        let picked = if random_ties {
            best_moves.choose(&mut self.rng)
        } else {
            best_moves.first()
        };
        let chosen = picked.copied()?;

        let elapsed = Self::now() - start_time;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let stats = SearchStats {
            depth,
            nodes: self.nodes_searched,
            time_ms: elapsed.max(0.0) as u64,
            score: best_score,
        };
        log::debug!(
            "{color:?} plays {chosen}: depth {} nodes {} time {}ms score {}",
            stats.depth,
            stats.nodes,
            stats.time_ms,
            stats.score
        );
        Some((chosen, stats))
    }

    fn negamax(
        &mut self,
        board: &mut Board,
        color: Color,
        depth: u8,
        mut alpha: i64,
        beta: i64,
    ) -> i64 {
        self.nodes_searched += 1;
        if depth == 0 {
            return self.evaluator.evaluate(board, color);
        }
        let moves = self.ordered_moves(board, color);
        if moves.is_empty() {
            return self.evaluator.evaluate(board, color);
        }

        let mut best = -INF;
        for mv in moves {
            let undo = apply_move(board, mv, &mut ());
            let score = -self.negamax(board, color.opposite(), depth - 1, -beta, -alpha);
            undo_move(board, &undo);

            best = best.max(score);
            alpha = alpha.max(best);
            if alpha >= beta {
                break;
            }
        }
        best
    }

    /// Root score of a full-width search with no pruning. Slow; used to check
    /// that pruning never changes the result.
    pub fn exhaustive_score(&mut self, board: &Board, depth: u8) -> Option<i64> {
        self.nodes_searched = 0;
        let color = board.color_to_move();
        let mut scratch = board.clone();
        let moves = self.generator.generate_moves_for_color(&scratch, color);

        let mut best = None;
        for mv in moves {
            let undo = apply_move(&mut scratch, mv, &mut ());
            let score = -self.minimax(&mut scratch, color.opposite(), depth.max(1) - 1);
            undo_move(&mut scratch, &undo);
            best = Some(best.map_or(score, |b: i64| b.max(score)));
        }
        best
    }

    fn minimax(&mut self, board: &mut Board, color: Color, depth: u8) -> i64 {
        self.nodes_searched += 1;
        let moves = if depth == 0 {
            Vec::new()
        } else {
            self.generator.generate_moves_for_color(board, color)
        };
        if moves.is_empty() {
            return self.evaluator.evaluate(board, color);
        }

        let mut best = -INF;
        for mv in moves {
            let undo = apply_move(board, mv, &mut ());
            best = best.max(-self.minimax(board, color.opposite(), depth - 1));
            undo_move(board, &undo);
        }
        best
    }

    pub const fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    // Generation order, optionally with captures moved to the front, most
    // valuable victim first. The sort is stable so ties keep generation order.
    fn ordered_moves(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = self.generator.generate_moves_for_color(board, color);
        if self.config.order_captures_first {
            moves.sort_by_cached_key(|mv| Reverse(self.capture_value(board, mv)));
        }
        moves
    }

    fn capture_value(&self, board: &Board, mv: &Move) -> i64 {
        let mover = board.get(mv.from);
        let victim = |cell: Position| -> i64 {
            if mover.kind == PieceKind::BigOrigin && Board::footprint_contains(mv.from, cell) {
                return 0;
            }
            if !board.get(cell).is_enemy_of(mover.color) {
                return 0;
            }
            let owner = board.origin_of(cell).unwrap_or(cell);
            self.evaluator.values().tile(board.get(owner))
        };

        if mover.kind == PieceKind::BigOrigin {
            Board::footprint(mv.to)
                .into_iter()
                .filter(|&cell| board.contains(cell))
                .map(victim)
                .max()
                .unwrap_or(0)
        } else {
            victim(mv.to)
        }
    }
}

impl Searcher for AlphaBetaEngine {
    fn search(&mut self, board: &Board, depth: u8) -> Option<(Move, SearchStats)> {
        self.compute_move(board, depth)
    }
}
