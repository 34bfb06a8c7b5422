use anyhow::{ensure, Context, Result};
use battle_core::engine::config::{EngineConfig, TieBreak};
use battle_core::engine::search::AlphaBetaEngine;
use battle_core::logic::board::{Board, Color, PieceKind, Position, Tile};
use battle_core::logic::game::{GameState, GameStatus};
use battle_core::logic::rules::spawn_piece_at;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Headless self-play: the engine moves for both sides until a king flag is
/// captured, a side is stuck, or the turn limit runs out.
#[derive(Debug, Parser)]
#[command(name = "chess_battles", version, about)]
struct Args {
    #[arg(long, default_value_t = 8)]
    width: usize,
    #[arg(long, default_value_t = 8)]
    height: usize,
    /// Search depth in plies; defaults to the engine config's.
    #[arg(long)]
    depth: Option<u8>,
    /// Seeds both the random layout and random tie-breaks. Without it the
    /// config file's seed is kept.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 200)]
    max_turns: u32,
    /// Engine config as JSON with absolute values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Starting layout such as "8/4P3/8/8/8/8/8/4k!3 w"; replaces the random fill.
    #[arg(long)]
    layout: Option<String>,
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieBreakArg {
    First,
    Random,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::First => Self::FirstFound,
            TieBreakArg::Random => Self::Random,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let board = match &args.layout {
        Some(layout) => Board::from_fen(layout).with_context(|| format!("invalid layout {layout:?}"))?,
        None => random_layout(args.width, args.height, &mut rng)?,
    };

    let mut game = GameState::new(board);
    game.search_depth = config.search_depth;
    let mut engine = AlphaBetaEngine::new(Arc::new(config));

    tracing::info!(
        fen = %game.board.to_fen_string(),
        depth = game.search_depth,
        "starting match"
    );

    for _ in 0..args.max_turns {
        let mover = game.turn();
        let outcome = game.make_turn(&mut engine)?;
        let Some(mv) = outcome.played else {
            tracing::info!(color = ?mover, "no legal move, match stalls");
            break;
        };
        tracing::info!(
            turn = game.board.turn,
            color = ?mover,
            %mv,
            events = ?outcome.events,
            "move played"
        );

        if let GameStatus::Ended { winner } = game.status {
            tracing::info!(?winner, turns = game.board.turn, "match over");
            break;
        }
    }

    tracing::info!(fen = %game.board.to_fen_string(), "final position");
    Ok(())
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("loading engine config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.search_depth = depth;
    }
    if let Some(tie_break) = args.tie_break {
        config.tie_break = tie_break.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

/// Random fill with one king-flagged piece per side.
fn random_layout(width: usize, height: usize, rng: &mut StdRng) -> Result<Board> {
    ensure!(width >= 2 && height >= 2, "board must be at least 2x2");
    let mut board = Board::random(width, height, rng);

    for color in [Color::White, Color::Black] {
        let owned: Vec<Position> = board
            .positions()
            .filter(|&pos| board.get(pos).is_friend_of(color))
            .collect();
        if let Some(&pos) = owned.choose(rng) {
            board.set_king_flag(pos, true);
            continue;
        }

        let free: Vec<Position> = board.positions().filter(|&pos| !board.get(pos).king).collect();
        let pos = free.choose(rng).copied().context("no room for a king")?;
        spawn_piece_at(&mut board, pos, Tile::king(PieceKind::King, color), &mut ())?;
    }
    Ok(board)
}
