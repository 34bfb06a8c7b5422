// Offsets are (dx, dy). Order matters: it fixes generation order, which in
// turn fixes tie-breaking in the search.

pub const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Unit steps used by the king and by big units.
pub const KING_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Up, down, left, right.
pub const ROOK_DIRECTIONS: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

pub const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

/// Pawn capture columns relative to the pawn.
pub const PAWN_CAPTURE_COLUMNS: [isize; 2] = [-1, 1];
