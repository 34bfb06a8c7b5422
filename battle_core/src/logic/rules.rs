use crate::engine::Move;
use crate::logic::board::{Board, Color, PieceKind, Position, Tile};
use crate::logic::event::{BoardEvent, EventSink};
use crate::logic::generator::{is_self_capture, MoveGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("position is outside the board")]
    OutOfBounds,
    #[error("no piece at the source cell")]
    NoPieceAtSource,
    #[error("piece belongs to the side not on move")]
    NotYourTurn,
    #[error("big units are moved and spawned through their origin cell")]
    CompanionCell,
    #[error("piece cannot reach that cell")]
    IllegalMove,
    #[error("the match has already ended")]
    GameOver,
}

/// Prior contents of every cell a move touched, plus the turn counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveUndo {
    changed: Vec<(Position, Tile)>,
    turn: u32,
}

impl MoveUndo {
    const fn new(turn: u32) -> Self {
        Self {
            changed: Vec::new(),
            turn,
        }
    }

    // Only the first write per cell is recorded, which is the pre-move value.
    fn write(&mut self, board: &mut Board, pos: Position, tile: Tile) {
        if !self.changed.iter().any(|(p, _)| *p == pos) {
            self.changed.push((pos, board.get(pos)));
        }
        board.set(pos, tile);
    }
}

/// Checks a move arriving from outside the engine against the side to move and
/// the piece's legal destinations.
pub fn is_valid_move(board: &Board, from: Position, to: Position) -> Result<Move, MoveError> {
    if !board.contains(from) || !board.contains(to) {
        return Err(MoveError::OutOfBounds);
    }
    let tile = board.get(from);
    if tile.is_empty() {
        return Err(MoveError::NoPieceAtSource);
    }
    if tile.kind.is_companion() {
        return Err(MoveError::CompanionCell);
    }
    if tile.color != board.color_to_move() {
        return Err(MoveError::NotYourTurn);
    }

    let mv = Move::new(from, to);
    if MoveGenerator::new().get_moves(board, from).contains(&mv) {
        Ok(mv)
    } else {
        Err(MoveError::IllegalMove)
    }
}

/// Plays `mv` on `board`, reporting captures, promotion and warps to `sink`.
///
/// `mv` must come from the generator: its origin is occupied and it is not a
/// self-capture. The returned record lets [`undo_move`] restore the board.
pub fn apply_move(board: &mut Board, mv: Move, sink: &mut impl EventSink) -> MoveUndo {
    let mut undo = MoveUndo::new(board.turn);
    let mover = board.get(mv.from);
    debug_assert!(!mover.is_empty(), "move {mv} starts on an empty cell");
    debug_assert!(!mover.kind.is_companion(), "move {mv} starts on a companion cell");
    debug_assert!(!is_self_capture(board, &mv), "move {mv} captures its own piece");

    if mover.kind == PieceKind::BigOrigin {
        move_big_unit(board, mv, mover, sink, &mut undo);
    } else {
        clear_occupant(board, mv.to, sink, &mut undo);

        let far_rank = match mover.color {
            Color::White => board.height() - 1,
            Color::Black => 0,
        };
        let promoted = mover.kind == PieceKind::Pawn && mv.to.y == far_rank;
        let mut moved = mover;
        if promoted {
            moved.kind = PieceKind::Queen;
        }

        undo.write(board, mv.to, moved);
        undo.write(board, mv.from, Tile::EMPTY);
        if promoted {
            sink.push(BoardEvent::Promoted { at: mv.to });
        }
    }

    board.turn += 1;
    undo
}

fn move_big_unit(
    board: &mut Board,
    mv: Move,
    origin: Tile,
    sink: &mut impl EventSink,
    undo: &mut MoveUndo,
) {
    for cell in Board::footprint(mv.from) {
        undo.write(board, cell, Tile::EMPTY);
    }
    for cell in Board::footprint(mv.to) {
        if !Board::footprint_contains(mv.from, cell) {
            clear_occupant(board, cell, sink, undo);
        }
    }
    write_big_unit(board, mv.to, origin, undo);

    if mv.from.x.abs_diff(mv.to.x) > 1 || mv.from.y.abs_diff(mv.to.y) > 1 {
        sink.push(BoardEvent::Warped {
            from: mv.from,
            to: mv.to,
        });
    }
}

fn write_big_unit(board: &mut Board, at: Position, origin: Tile, undo: &mut MoveUndo) {
    let kinds = [
        PieceKind::BigOrigin,
        PieceKind::BigTR,
        PieceKind::BigBL,
        PieceKind::BigBR,
    ];
    for (cell, kind) in Board::footprint(at).into_iter().zip(kinds) {
        let tile = if kind == PieceKind::BigOrigin {
            origin
        } else {
            Tile::new(kind, origin.color)
        };
        undo.write(board, cell, tile);
    }
}

/// Restores the board to its state before the move that produced `undo`.
pub fn undo_move(board: &mut Board, undo: &MoveUndo) {
    for &(pos, tile) in undo.changed.iter().rev() {
        board.set(pos, tile);
    }
    board.turn = undo.turn;
}

/// Clears the occupant of `pos`. A cell of a big unit clears the whole unit.
/// Returns the removed tile (the origin tile for a big unit).
pub fn remove_piece_at(board: &mut Board, pos: Position, sink: &mut impl EventSink) -> Option<Tile> {
    let mut scratch = MoveUndo::new(board.turn);
    clear_occupant(board, pos, sink, &mut scratch)
}

fn clear_occupant(
    board: &mut Board,
    pos: Position,
    sink: &mut impl EventSink,
    undo: &mut MoveUndo,
) -> Option<Tile> {
    let tile = board.get(pos);
    if tile.is_empty() {
        return None;
    }

    match board.origin_of(pos) {
        Some(origin) => {
            let origin_tile = board.get(origin);
            for cell in Board::footprint(origin) {
                if board.contains(cell) {
                    undo.write(board, cell, Tile::EMPTY);
                }
            }
            sink.push(BoardEvent::Removed {
                at: origin,
                tile: origin_tile,
            });
            Some(origin_tile)
        }
        None => {
            undo.write(board, pos, Tile::EMPTY);
            sink.push(BoardEvent::Removed { at: pos, tile });
            Some(tile)
        }
    }
}

/// Places `tile` at `at`, first removing everything under it. A big origin
/// claims its full 2x2 footprint.
pub fn spawn_piece_at(
    board: &mut Board,
    at: Position,
    tile: Tile,
    sink: &mut impl EventSink,
) -> Result<(), MoveError> {
    if !board.contains(at) {
        return Err(MoveError::OutOfBounds);
    }
    if tile.kind.is_companion() {
        return Err(MoveError::CompanionCell);
    }

    let mut scratch = MoveUndo::new(board.turn);
    if tile.kind == PieceKind::BigOrigin {
        let cells = Board::footprint(at);
        if !cells.iter().all(|&cell| board.contains(cell)) {
            return Err(MoveError::OutOfBounds);
        }
        for cell in cells {
            clear_occupant(board, cell, sink, &mut scratch);
        }
        write_big_unit(board, at, tile, &mut scratch);
    } else {
        clear_occupant(board, at, sink, &mut scratch);
        board.set(at, tile);
    }
    Ok(())
}
