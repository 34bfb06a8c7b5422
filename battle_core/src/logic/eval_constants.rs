// Piece values in thousandths of a pawn, so the mobility bonus stays integral.
pub const VAL_PAWN: i64 = 1_000;
pub const VAL_KNIGHT: i64 = 3_000;
pub const VAL_BISHOP: i64 = 3_000;
pub const VAL_ROOK: i64 = 5_000;
pub const VAL_QUEEN: i64 = 10_000;
pub const VAL_KING: i64 = 900_000_000;

// Replaces the kind value of any tile carrying the king flag.
pub const VAL_KING_FLAG: i64 = 900_000_000;

// Counted once, on the unit's origin.
pub const VAL_BIG: i64 = 10_000;

pub const MOBILITY_WEIGHT: i64 = 1;

// Search window bound; far above any reachable material sum.
pub const INF: i64 = 1 << 60;

pub const DEFAULT_SEARCH_DEPTH: u8 = 4;
