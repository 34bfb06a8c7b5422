use crate::engine::{Move, SearchStats, Searcher};
use crate::logic::board::{Board, Color, Position};
use crate::logic::eval_constants::DEFAULT_SEARCH_DEPTH;
use crate::logic::event::{BoardCommand, BoardEvent};
use crate::logic::rules::{
    apply_move, is_valid_move, remove_piece_at, spawn_piece_at, undo_move, MoveError, MoveUndo,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    InProgress,
    Ended {
        winner: Color,
    },
}

/// Result of one turn. `played` is `None` when the side to move was stuck,
/// in which case nothing changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub played: Option<Move>,
    pub stats: Option<SearchStats>,
    pub events: Vec<BoardEvent>,
    /// Set when this turn removed a king-flagged tile.
    pub winner: Option<Color>,
}

impl TurnOutcome {
    pub const fn match_over(&self) -> bool {
        self.winner.is_some()
    }
}

/// Lets the engine choose a move for the side to move and plays it.
pub fn make_turn(board: &mut Board, engine: &mut impl Searcher, depth: u8) -> TurnOutcome {
    match engine.search(board, depth) {
        Some((mv, stats)) => play(board, mv, Some(stats)).0,
        None => TurnOutcome::default(),
    }
}

fn play(board: &mut Board, mv: Move, stats: Option<SearchStats>) -> (TurnOutcome, MoveUndo) {
    let mover = board.color_to_move();
    let mut events: Vec<BoardEvent> = Vec::new();
    let undo = apply_move(board, mv, &mut events);
    let winner = events
        .iter()
        .any(BoardEvent::removed_king)
        .then_some(mover);

    let outcome = TurnOutcome {
        played: Some(mv),
        stats,
        events,
        winner,
    };
    (outcome, undo)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub mv: Move,
    pub color: Color,
    pub events: Vec<BoardEvent>,
    /// Search summary when the engine chose the move.
    pub note: Option<String>,
    undo: MoveUndo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub status: GameStatus,
    pub history: Vec<MoveRecord>,
    pub search_depth: u8,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl GameState {
    #[must_use]
    pub const fn new(board: Board) -> Self {
        Self {
            board,
            status: GameStatus::InProgress,
            history: Vec::new(),
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    pub const fn turn(&self) -> Color {
        self.board.color_to_move()
    }

    /// Computer turn at `search_depth`.
    pub fn make_turn(&mut self, engine: &mut impl Searcher) -> Result<TurnOutcome, MoveError> {
        self.ensure_in_progress()?;
        let Some((mv, stats)) = engine.search(&self.board, self.search_depth) else {
            log::debug!("{:?} has no legal move, turn passes unplayed", self.turn());
            return Ok(TurnOutcome::default());
        };
        let note = format!(
            "depth {} nodes {} time {}ms score {}",
            stats.depth, stats.nodes, stats.time_ms, stats.score
        );
        Ok(self.commit(mv, Some(stats), Some(note)))
    }

    /// Move requested from outside the engine, e.g. a click or a remote peer.
    pub fn make_move(&mut self, from: Position, to: Position) -> Result<TurnOutcome, MoveError> {
        self.ensure_in_progress()?;
        let mv = is_valid_move(&self.board, from, to)?;
        Ok(self.commit(mv, None, None))
    }

    fn ensure_in_progress(&self) -> Result<(), MoveError> {
        match self.status {
            GameStatus::InProgress => Ok(()),
            GameStatus::Ended { .. } => Err(MoveError::GameOver),
        }
    }

    fn commit(&mut self, mv: Move, stats: Option<SearchStats>, note: Option<String>) -> TurnOutcome {
        let color = self.turn();
        let (outcome, undo) = play(&mut self.board, mv, stats);

        if let Some(winner) = outcome.winner {
            log::info!("{winner:?} captured the king flag with {mv}");
            self.status = GameStatus::Ended { winner };
        }
        self.history.push(MoveRecord {
            mv,
            color,
            events: outcome.events.clone(),
            note,
            undo,
        });
        outcome
    }

    pub fn undo_move(&mut self) -> bool {
        if let Some(record) = self.history.pop() {
            undo_move(&mut self.board, &record.undo);
            // Only a played move ends a match, so undoing one reopens it.
            self.status = GameStatus::InProgress;
            true
        } else {
            false
        }
    }

    /// Applies an edit forwarded by a collaborator. Edits are not undoable and
    /// clear the move history.
    pub fn apply_command(&mut self, command: BoardCommand) -> Result<Vec<BoardEvent>, MoveError> {
        let mut events: Vec<BoardEvent> = Vec::new();
        let result = match command {
            BoardCommand::Spawn { at, tile } => spawn_piece_at(&mut self.board, at, tile, &mut events),
            BoardCommand::Delete { at } => {
                if self.board.contains(at) {
                    remove_piece_at(&mut self.board, at, &mut events);
                    Ok(())
                } else {
                    Err(MoveError::OutOfBounds)
                }
            }
        };

        if let Err(err) = result {
            log::warn!("rejected {command:?}: {err}");
            return Err(err);
        }
        self.history.clear();
        Ok(events)
    }
}
