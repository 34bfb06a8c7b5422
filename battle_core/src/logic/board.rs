use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_WIDTH: usize = 8;
pub const DEFAULT_HEIGHT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Direction of travel along y for this color's pawns.
    pub const fn advance(self) -> isize {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PieceKind {
    #[default]
    Empty = 0,
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
    BigOrigin = 7,
    BigTR = 8,
    BigBL = 9,
    BigBR = 10,
}

impl PieceKind {
    pub const COUNT: usize = 11;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_big(self) -> bool {
        matches!(
            self,
            Self::BigOrigin | Self::BigTR | Self::BigBL | Self::BigBR
        )
    }

    pub const fn is_companion(self) -> bool {
        matches!(self, Self::BigTR | Self::BigBL | Self::BigBR)
    }

    /// Offset of a big-unit cell from the unit's origin.
    pub const fn footprint_offset(self) -> Option<(usize, usize)> {
        match self {
            Self::BigOrigin => Some((0, 0)),
            Self::BigTR => Some((1, 0)),
            Self::BigBL => Some((0, 1)),
            Self::BigBR => Some((1, 1)),
            _ => None,
        }
    }

    const fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
            Self::BigOrigin => 'g',
            Self::BigTR | Self::BigBL | Self::BigBR => 'h',
        }
    }
}

/// Occupant descriptor of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: PieceKind,
    pub color: Color,
    pub king: bool,
}

impl Tile {
    pub const EMPTY: Self = Self {
        kind: PieceKind::Empty,
        color: Color::White,
        king: false,
    };

    #[must_use]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            king: false,
        }
    }

    /// A tile carrying the flag whose capture ends the match.
    #[must_use]
    pub const fn king(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            king: true,
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self.kind, PieceKind::Empty)
    }

    pub fn is_enemy_of(self, color: Color) -> bool {
        !self.is_empty() && self.color != color
    }

    pub fn is_friend_of(self, color: Color) -> bool {
        !self.is_empty() && self.color == color
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no ranks")]
    Empty,
    #[error("board must be at least 2x2, got {width}x{height}")]
    TooSmall { width: usize, height: usize },
    #[error("rank {rank} has {found} cells, expected {expected}")]
    RaggedRank {
        rank: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown layout symbol {0:?}")]
    UnknownSymbol(char),
    #[error("king flag marker without a piece in rank {0}")]
    DanglingKingFlag(usize),
    #[error("unknown side to move {0:?}")]
    UnknownTurn(char),
    #[error("broken big unit at ({x},{y})")]
    BrokenBigUnit { x: usize, y: usize },
}

const RANDOM_KINDS: [PieceKind; 7] = [
    PieceKind::Empty,
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::King,
    PieceKind::Queen,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    // Row-major: index = y * width + x
    tiles: Vec<Tile>,
    pub turn: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    /// An empty board with White to move.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(width >= 2 && height >= 2, "board smaller than a big unit");
        Self {
            width,
            height,
            tiles: vec![Tile::EMPTY; width * height],
            turn: 0,
        }
    }

    /// Fills every cell with a random classic piece of a random color.
    pub fn random<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let mut board = Self::new(width, height);
        for tile in &mut board.tiles {
            let kind = RANDOM_KINDS.choose(rng).copied().unwrap_or_default();
            let color = if rng.gen_bool(0.5) {
                Color::White
            } else {
                Color::Black
            };
            *tile = if kind == PieceKind::Empty {
                Tile::EMPTY
            } else {
                Tile::new(kind, color)
            };
        }
        board
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Even turn counter means White moves, odd means Black.
    pub const fn color_to_move(&self) -> Color {
        if self.turn % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub const fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub const fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// `pos` shifted by `(dx, dy)`, or `None` when that leaves the board.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn offset(&self, pos: Position, dx: isize, dy: isize) -> Option<Position> {
        let x = pos.x as isize + dx;
        let y = pos.y as isize + dy;
        if self.in_bounds(x, y) {
            Some(Position::new(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Reads a cell; anything off the board reads as empty.
    pub fn get(&self, pos: Position) -> Tile {
        if !self.contains(pos) {
            return Tile::EMPTY;
        }
        self.tiles
            .get(pos.y * self.width + pos.x)
            .copied()
            .unwrap_or(Tile::EMPTY)
    }

    pub(crate) fn set(&mut self, pos: Position, tile: Tile) {
        debug_assert!(self.contains(pos), "write outside the board at {pos}");
        if !self.contains(pos) {
            return;
        }
        let idx = pos.y * self.width + pos.x;
        if let Some(slot) = self.tiles.get_mut(idx) {
            *slot = tile;
        }
    }

    /// All cells, y ascending then x ascending.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Cells of a big unit whose origin is `origin`: origin, TR, BL, BR.
    pub const fn footprint(origin: Position) -> [Position; 4] {
        [
            origin,
            Position::new(origin.x + 1, origin.y),
            Position::new(origin.x, origin.y + 1),
            Position::new(origin.x + 1, origin.y + 1),
        ]
    }

    pub const fn footprint_contains(origin: Position, pos: Position) -> bool {
        pos.x >= origin.x && pos.x <= origin.x + 1 && pos.y >= origin.y && pos.y <= origin.y + 1
    }

    /// Origin of the big unit covering `pos`, if `pos` holds one of its cells.
    pub fn origin_of(&self, pos: Position) -> Option<Position> {
        let (dx, dy) = self.get(pos).kind.footprint_offset()?;
        if pos.x < dx || pos.y < dy {
            return None;
        }
        Some(Position::new(pos.x - dx, pos.y - dy))
    }

    /// Sets or clears the king flag; on a big unit the flag lives on its origin.
    pub fn set_king_flag(&mut self, pos: Position, king: bool) {
        let target = self.origin_of(pos).unwrap_or(pos);
        let mut tile = self.get(target);
        if tile.is_empty() {
            return;
        }
        tile.king = king;
        self.set(target, tile);
    }

    pub fn count_kings(&self, color: Color) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.king && t.is_friend_of(color))
            .count()
    }

    /// Checks that every big unit is whole and every companion has its origin.
    pub fn validate(&self) -> Result<(), LayoutError> {
        for pos in self.positions() {
            let tile = self.get(pos);
            let broken = LayoutError::BrokenBigUnit { x: pos.x, y: pos.y };
            match tile.kind {
                PieceKind::BigOrigin => {
                    if pos.x + 1 >= self.width || pos.y + 1 >= self.height {
                        return Err(broken);
                    }
                    let expected = [PieceKind::BigTR, PieceKind::BigBL, PieceKind::BigBR];
                    for (cell, kind) in Self::footprint(pos).into_iter().skip(1).zip(expected) {
                        let companion = self.get(cell);
                        if companion.kind != kind || companion.color != tile.color {
                            return Err(broken);
                        }
                    }
                }
                kind if kind.is_companion() => {
                    let origin = self.origin_of(pos).ok_or(broken)?;
                    let owner = self.get(origin);
                    if owner.kind != PieceKind::BigOrigin || owner.color != tile.color {
                        return Err(broken);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Parses a layout such as `"8/4P3/8/8/8/8/8/8 w"`.
    ///
    /// Ranks run from `y = 0` (drawn at the top) to `y = height - 1`. Upper case
    /// is White, lower case Black, digits are runs of empty cells, `G`/`H` mark
    /// a big unit's origin and companion cells and `!` after a piece sets its
    /// king flag.
    pub fn from_fen(fen: &str) -> Result<Self, LayoutError> {
        let mut parts = fen.split_whitespace();
        let placement = parts.next().ok_or(LayoutError::Empty)?;
        let ranks: Vec<&str> = placement.split('/').collect();
        let height = ranks.len();

        let mut rows: Vec<Vec<Tile>> = Vec::with_capacity(height);
        for (rank_idx, rank) in ranks.iter().enumerate() {
            rows.push(parse_rank(rank, rank_idx)?);
        }
        let width = rows.first().map_or(0, Vec::len);
        if width < 2 || height < 2 {
            return Err(LayoutError::TooSmall { width, height });
        }
        for (rank, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(LayoutError::RaggedRank {
                    rank,
                    expected: width,
                    found: row.len(),
                });
            }
        }

        let mut board = Self::new(width, height);
        for (y, row) in rows.into_iter().enumerate() {
            for (x, tile) in row.into_iter().enumerate() {
                board.set(Position::new(x, y), tile);
            }
        }
        board.resolve_companions()?;

        if let Some(side) = parts.next() {
            board.turn = match side {
                "w" => 0,
                "b" => 1,
                other => {
                    return Err(LayoutError::UnknownTurn(
                        other.chars().next().unwrap_or(' '),
                    ))
                }
            };
        }

        board.validate()?;
        Ok(board)
    }

    // Companion cells are parsed as BigBR placeholders and tagged here
    // according to their offset from the origin that claims them.
    fn resolve_companions(&mut self) -> Result<(), LayoutError> {
        let mut claimed = vec![false; self.tiles.len()];
        let origins: Vec<Position> = self
            .positions()
            .filter(|&p| self.get(p).kind == PieceKind::BigOrigin)
            .collect();

        for origin in origins {
            let color = self.get(origin).color;
            let broken = LayoutError::BrokenBigUnit {
                x: origin.x,
                y: origin.y,
            };
            let tags = [PieceKind::BigTR, PieceKind::BigBL, PieceKind::BigBR];
            for (cell, tag) in Self::footprint(origin).into_iter().skip(1).zip(tags) {
                if !self.contains(cell) {
                    return Err(broken);
                }
                let idx = cell.y * self.width + cell.x;
                let tile = self.get(cell);
                let already = claimed.get(idx).copied().unwrap_or(true);
                if tile.kind != PieceKind::BigBR || tile.color != color || already {
                    return Err(broken);
                }
                if let Some(flag) = claimed.get_mut(idx) {
                    *flag = true;
                }
                self.set(cell, Tile::new(tag, color));
            }
        }

        for pos in self.positions() {
            let idx = pos.y * self.width + pos.x;
            let is_claimed = claimed.get(idx).copied().unwrap_or(false);
            if self.get(pos).kind == PieceKind::BigBR && !is_claimed {
                return Err(LayoutError::BrokenBigUnit { x: pos.x, y: pos.y });
            }
        }
        Ok(())
    }

    /// Inverse of [`Board::from_fen`]; the turn is written as its parity.
    pub fn to_fen_string(&self) -> String {
        let mut fen = String::new();
        for y in 0..self.height {
            let mut empty_count = 0;
            for x in 0..self.width {
                let tile = self.get(Position::new(x, y));
                if tile.is_empty() {
                    empty_count += 1;
                    continue;
                }
                if empty_count > 0 {
                    fen.push_str(&empty_count.to_string());
                    empty_count = 0;
                }
                let symbol = tile.kind.symbol();
                fen.push(if tile.color == Color::White {
                    symbol.to_ascii_uppercase()
                } else {
                    symbol
                });
                if tile.king {
                    fen.push('!');
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if y + 1 < self.height {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.color_to_move() == Color::White {
            'w'
        } else {
            'b'
        });
        fen
    }
}

fn parse_rank(rank: &str, rank_idx: usize) -> Result<Vec<Tile>, LayoutError> {
    let mut row = Vec::new();
    let mut run = 0usize;
    for ch in rank.chars() {
        if let Some(digit) = ch.to_digit(10) {
            run = run * 10 + digit as usize;
            continue;
        }
        if run > 0 {
            row.extend(std::iter::repeat(Tile::EMPTY).take(run));
            run = 0;
        }
        if ch == '!' {
            match row.last_mut() {
                Some(tile) if !tile.is_empty() => tile.king = true,
                _ => return Err(LayoutError::DanglingKingFlag(rank_idx)),
            }
            continue;
        }
        let color = if ch.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match ch.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            'g' => PieceKind::BigOrigin,
            // Placeholder, tagged once the owning origin is known.
            'h' => PieceKind::BigBR,
            _ => return Err(LayoutError::UnknownSymbol(ch)),
        };
        row.push(Tile::new(kind, color));
    }
    if run > 0 {
        row.extend(std::iter::repeat(Tile::EMPTY).take(run));
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_turn_parity() {
        let mut board = Board::default();
        assert_eq!(board.color_to_move(), Color::White);
        board.turn = 3;
        assert_eq!(board.color_to_move(), Color::Black);
    }

    #[test]
    fn test_fen_coordinates() {
        let board = Board::from_fen("8/4P3/4p3/8/8/8/8/8 w").unwrap();
        assert_eq!(board.width(), 8);
        assert_eq!(board.height(), 8);
        assert_eq!(
            board.get(Position::new(4, 1)),
            Tile::new(PieceKind::Pawn, Color::White)
        );
        assert_eq!(
            board.get(Position::new(4, 2)),
            Tile::new(PieceKind::Pawn, Color::Black)
        );
        assert!(board.get(Position::new(4, 0)).is_empty());
    }

    #[test]
    fn test_fen_round_trip() {
        let fen = "R3K!3/8/1Q6/8/6gh/6hh/8/4k!3 b";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(board.to_fen_string(), fen);
        assert_eq!(board.color_to_move(), Color::Black);
        assert!(board.get(Position::new(4, 0)).king);
        assert!(board.get(Position::new(4, 7)).king);
        assert_eq!(board.count_kings(Color::White), 1);
    }

    #[test]
    fn test_fen_tags_big_unit() {
        let board = Board::from_fen("8/8/6GH/6HH/8/8/8/8 w").unwrap();
        assert_eq!(board.get(Position::new(6, 2)).kind, PieceKind::BigOrigin);
        assert_eq!(board.get(Position::new(7, 2)).kind, PieceKind::BigTR);
        assert_eq!(board.get(Position::new(6, 3)).kind, PieceKind::BigBL);
        assert_eq!(board.get(Position::new(7, 3)).kind, PieceKind::BigBR);
    }

    #[test]
    fn test_fen_rejects_broken_layouts() {
        assert_eq!(
            Board::from_fen("8/7/8/8/8/8/8/8"),
            Err(LayoutError::RaggedRank {
                rank: 1,
                expected: 8,
                found: 7
            })
        );
        assert_eq!(
            Board::from_fen("7x/8/8/8/8/8/8/8"),
            Err(LayoutError::UnknownSymbol('x'))
        );
        assert!(matches!(
            Board::from_fen("7G/8/8/8/8/8/8/8"),
            Err(LayoutError::BrokenBigUnit { .. })
        ));
        assert!(matches!(
            Board::from_fen("7H/8/8/8/8/8/8/8"),
            Err(LayoutError::BrokenBigUnit { .. })
        ));
        assert_eq!(
            Board::from_fen("!7/8"),
            Err(LayoutError::DanglingKingFlag(0))
        );
    }

    #[test]
    fn test_origin_of_companions() {
        let board = Board::from_fen("4/1gh1/1hh1/4 w").unwrap();
        let origin = Position::new(1, 1);
        assert_eq!(board.get(origin).kind, PieceKind::BigOrigin);
        for cell in Board::footprint(origin) {
            assert_eq!(board.origin_of(cell), Some(origin));
        }
        assert_eq!(board.origin_of(Position::new(0, 0)), None);
    }

    #[test]
    fn test_validate_catches_partial_unit() {
        let mut board = Board::from_fen("4/1GH1/1HH1/4 w").unwrap();
        assert!(board.validate().is_ok());
        board.set(Position::new(2, 2), Tile::EMPTY);
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_random_board_is_seeded_and_valid() {
        let a = Board::random(8, 8, &mut StdRng::seed_from_u64(7));
        let b = Board::random(8, 8, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.validate().is_ok());
        assert!(a.positions().all(|p| !a.get(p).kind.is_big() && !a.get(p).king));
    }

    #[test]
    fn test_set_king_flag_on_companion_marks_origin() {
        let mut board = Board::from_fen("4/1gh1/1hh1/4 w").unwrap();
        board.set_king_flag(Position::new(2, 1), true);
        assert!(board.get(Position::new(1, 1)).king);
        assert!(!board.get(Position::new(2, 1)).king);
    }
}
