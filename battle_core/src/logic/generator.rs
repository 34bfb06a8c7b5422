use crate::engine::Move;
use crate::logic::board::{Board, Color, PieceKind, Position};
use crate::logic::lookup::{
    BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, PAWN_CAPTURE_COLUMNS, ROOK_DIRECTIONS,
};

/// Raw candidate generator for one piece kind. Output is filtered for
/// self-captures by [`MoveGenerator::get_moves`].
pub type MoveRule = fn(&Board, Position, &mut Vec<Move>);

// Indexed by `PieceKind::index()`. Companion cells move with their origin.
const RULES: [Option<MoveRule>; PieceKind::COUNT] = [
    None,
    Some(pawn_moves as MoveRule),
    Some(knight_moves as MoveRule),
    Some(bishop_moves as MoveRule),
    Some(rook_moves as MoveRule),
    Some(queen_moves as MoveRule),
    Some(king_moves as MoveRule),
    Some(big_moves as MoveRule),
    None,
    None,
    None,
];

pub fn rule_for(kind: PieceKind) -> Option<MoveRule> {
    RULES.get(kind.index()).copied().flatten()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Legal moves of the piece standing on `from`.
    pub fn get_moves(&self, board: &Board, from: Position) -> Vec<Move> {
        let mut moves = Vec::new();
        if let Some(rule) = rule_for(board.get(from).kind) {
            rule(board, from, &mut moves);
        }
        filter_self_captures(board, moves)
    }

    /// Every legal move for `color`, visiting cells with y ascending, then x.
    pub fn generate_moves_for_color(&self, board: &Board, color: Color) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        for pos in board.positions() {
            if board.get(pos).is_friend_of(color) {
                moves.extend(self.get_moves(board, pos));
            }
        }
        moves
    }

    /// Returns `true` as soon as one legal move for `color` is found.
    pub fn has_moves(&self, board: &Board, color: Color) -> bool {
        board
            .positions()
            .filter(|&pos| board.get(pos).is_friend_of(color))
            .any(|pos| !self.get_moves(board, pos).is_empty())
    }
}

/// Drops moves whose destination holds a piece of the mover's own color.
pub fn filter_self_captures(board: &Board, moves: Vec<Move>) -> Vec<Move> {
    moves
        .into_iter()
        .filter(|mv| !is_self_capture(board, mv))
        .collect()
}

pub fn is_self_capture(board: &Board, mv: &Move) -> bool {
    let mover = board.get(mv.from);
    if !board.get(mv.to).is_friend_of(mover.color) {
        return false;
    }
    // A big unit may slide over cells it already covers.
    !(mover.kind == PieceKind::BigOrigin && Board::footprint_contains(mv.from, mv.to))
}

fn pawn_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    let color = board.get(from).color;
    let dy = color.advance();

    // Straight ahead onto anything but an own piece; the filter drops those.
    if let Some(ahead) = board.offset(from, 0, dy) {
        out.push(Move::new(from, ahead));
    }
    for dx in PAWN_CAPTURE_COLUMNS {
        if let Some(target) = board.offset(from, dx, dy) {
            if board.get(target).is_enemy_of(color) {
                out.push(Move::new(from, target));
            }
        }
    }
}

fn knight_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    leap(board, from, &KNIGHT_OFFSETS, out);
}

fn king_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    leap(board, from, &KING_OFFSETS, out);
}

fn bishop_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    slide(board, from, &BISHOP_DIRECTIONS, out);
}

fn rook_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    slide(board, from, &ROOK_DIRECTIONS, out);
}

fn queen_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    rook_moves(board, from, out);
    bishop_moves(board, from, out);
}

fn leap(board: &Board, from: Position, offsets: &[(isize, isize)], out: &mut Vec<Move>) {
    for &(dx, dy) in offsets {
        if let Some(to) = board.offset(from, dx, dy) {
            out.push(Move::new(from, to));
        }
    }
}

/// Casts rays; each ray includes the first occupied cell and stops there.
fn slide(board: &Board, from: Position, directions: &[(isize, isize)], out: &mut Vec<Move>) {
    for &(dx, dy) in directions {
        let mut current = from;
        while let Some(next) = board.offset(current, dx, dy) {
            out.push(Move::new(from, next));
            if !board.get(next).is_empty() {
                break;
            }
            current = next;
        }
    }
}

fn big_moves(board: &Board, from: Position, out: &mut Vec<Move>) {
    let color = board.get(from).color;
    for (dx, dy) in KING_OFFSETS {
        let to = Position::new(
            wrap_axis(from.x, dx, board.width()),
            wrap_axis(from.y, dy, board.height()),
        );
        let mv = Move::new(from, to);
        // Narrow boards can wrap back onto the origin or onto a repeat.
        if to == from || out.contains(&mv) {
            continue;
        }
        if can_place_big(board, from, to, color) {
            out.push(mv);
        }
    }
}

/// Next origin coordinate of a two-cell-wide unit along one axis. A unit that
/// would hang off either edge reappears flush against the opposite edge.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn wrap_axis(origin: usize, delta: isize, len: usize) -> usize {
    let next = origin as isize + delta;
    if next < 0 {
        len.saturating_sub(2)
    } else if next as usize + 1 >= len {
        0
    } else {
        next as usize
    }
}

fn can_place_big(board: &Board, from: Position, to: Position, color: Color) -> bool {
    Board::footprint(to)
        .into_iter()
        .all(|cell| Board::footprint_contains(from, cell) || !board.get(cell).is_friend_of(color))
}
