use crate::engine::config::EngineConfig;
use crate::engine::Evaluator;
use crate::logic::board::{Board, Color, PieceKind, Tile};
use crate::logic::generator::MoveGenerator;

/// Point values compiled from an [`EngineConfig`], indexed by piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceValues {
    by_kind: [i64; PieceKind::COUNT],
    king_flag: i64,
    mobility_weight: i64,
    // Mobility never reaches the smallest material step.
    mobility_cap: i64,
}

impl PieceValues {
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut by_kind = [0; PieceKind::COUNT];
        let table = [
            (PieceKind::Pawn, config.val_pawn),
            (PieceKind::Knight, config.val_knight),
            (PieceKind::Bishop, config.val_bishop),
            (PieceKind::Rook, config.val_rook),
            (PieceKind::Queen, config.val_queen),
            (PieceKind::King, config.val_king),
            // Companion cells stay at zero so a unit counts once.
            (PieceKind::BigOrigin, config.val_big),
        ];
        for (kind, value) in table {
            if let Some(slot) = by_kind.get_mut(kind.index()) {
                *slot = value;
            }
        }

        // Any nonzero material difference is a multiple of this step.
        let step = by_kind
            .iter()
            .copied()
            .chain(std::iter::once(config.val_king_flag))
            .filter(|&v| v > 0)
            .fold(0, gcd);

        Self {
            by_kind,
            king_flag: config.val_king_flag,
            mobility_weight: config.mobility_weight,
            mobility_cap: step.max(1) - 1,
        }
    }

    /// Worth of a single cell's occupant, regardless of its color.
    pub fn tile(&self, tile: Tile) -> i64 {
        if tile.is_empty() {
            return 0;
        }
        if tile.king {
            return self.king_flag;
        }
        self.kind(tile.kind)
    }

    pub fn kind(&self, kind: PieceKind) -> i64 {
        self.by_kind.get(kind.index()).copied().unwrap_or(0)
    }
}

const fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Material balance plus a small mobility bonus for the side asked about.
pub struct MaterialEvaluator {
    values: PieceValues,
    generator: MoveGenerator,
}

impl MaterialEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            values: PieceValues::from_config(config),
            generator: MoveGenerator::new(),
        }
    }

    pub const fn values(&self) -> &PieceValues {
        &self.values
    }

    fn material(&self, board: &Board, perspective: Color) -> i64 {
        board
            .positions()
            .map(|pos| board.get(pos))
            .filter(|tile| !tile.is_empty())
            .map(|tile| {
                let value = self.values.tile(tile);
                if tile.color == perspective {
                    value
                } else {
                    -value
                }
            })
            .sum()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mobility(&self, board: &Board, perspective: Color) -> i64 {
        let weight = self.values.mobility_weight;
        if weight == 0 {
            return 0;
        }
        let moves = self.generator.generate_moves_for_color(board, perspective).len() as i64;
        let cap = self.values.mobility_cap;
        moves.saturating_mul(weight).clamp(-cap, cap)
    }
}

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, board: &Board, perspective: Color) -> i64 {
        self.material(board, perspective) + self.mobility(board, perspective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> EngineConfig {
        EngineConfig {
            mobility_weight: 0,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_material_is_antisymmetric() {
        let board = Board::from_fen("R3/1n2/2p1/3q w").unwrap();
        let eval = MaterialEvaluator::new(&quiet_config());
        let white = eval.evaluate(&board, Color::White);
        assert_eq!(white, 5_000 - 3_000 - 1_000 - 10_000);
        assert_eq!(eval.evaluate(&board, Color::Black), -white);
    }

    #[test]
    fn test_big_unit_counted_once() {
        let board = Board::from_fen("GH2/HH2/4/4 w").unwrap();
        let eval = MaterialEvaluator::new(&quiet_config());
        assert_eq!(eval.evaluate(&board, Color::White), 10_000);
    }

    #[test]
    fn test_king_flag_replaces_kind_value() {
        let board = Board::from_fen("P!3/4/4/3k w").unwrap();
        let eval = MaterialEvaluator::new(&quiet_config());
        assert_eq!(eval.evaluate(&board, Color::White), 900_000_000 - 900_000_000);

        let flagged_big = Board::from_fen("G!H2/HH2/4/4 w").unwrap();
        assert_eq!(eval.evaluate(&flagged_big, Color::White), 900_000_000);
    }

    #[test]
    fn test_mobility_breaks_ties_only() {
        let eval = MaterialEvaluator::new(&EngineConfig::default());
        // Same material, the centralised knight has more moves.
        let corner = Board::from_fen("N4/5/5/5/4n w").unwrap();
        let centre = Board::from_fen("5/5/2N2/5/4n w").unwrap();
        assert!(eval.evaluate(&centre, Color::White) > eval.evaluate(&corner, Color::White));

        let heavy = EngineConfig {
            mobility_weight: 1_000_000,
            ..EngineConfig::default()
        };
        let eval = MaterialEvaluator::new(&heavy);
        let lopsided = Board::from_fen("P4/5/5/5/4n w").unwrap();
        // Down a knight for a pawn; one pawn push cannot close the gap.
        assert_eq!(eval.evaluate(&lopsided, Color::White), -2_000 + 999);
        assert_eq!(eval.values().mobility_cap, 999);
    }

    #[test]
    fn test_mobility_cap_follows_finest_material_step() {
        let config = EngineConfig {
            val_bishop: 3_500,
            mobility_weight: 1_000_000,
            ..EngineConfig::default()
        };
        let eval = MaterialEvaluator::new(&config);
        assert_eq!(eval.values().mobility_cap, 499);

        // Bishop and pawn, nothing to move.
        let stuck = Board::from_fen("B1/1P w").unwrap();
        // Knight and pawn, the pawn can still push.
        let mobile = Board::from_fen("NP/2 w").unwrap();
        let richer = eval.evaluate(&stuck, Color::White);
        let poorer = eval.evaluate(&mobile, Color::White);
        assert_eq!(richer, 4_500);
        assert_eq!(poorer, 4_000 + 499);
        assert!(richer > poorer);
    }

    #[test]
    fn test_mobility_cap_without_material() {
        let config = EngineConfig {
            val_pawn: 0,
            val_knight: 0,
            val_bishop: 0,
            val_rook: 0,
            val_queen: 0,
            val_king: 0,
            val_king_flag: 0,
            val_big: 0,
            ..EngineConfig::default()
        };
        assert_eq!(PieceValues::from_config(&config).mobility_cap, 0);
    }

    #[test]
    fn test_piece_values_from_config() {
        let config = EngineConfig {
            val_bishop: 5_000,
            ..EngineConfig::default()
        };
        let values = PieceValues::from_config(&config);
        assert_eq!(values.kind(PieceKind::Bishop), 5_000);
        assert_eq!(values.kind(PieceKind::BigTR), 0);
        assert_eq!(values.tile(Tile::king(PieceKind::Pawn, Color::Black)), 900_000_000);
        assert_eq!(values.tile(Tile::EMPTY), 0);
    }
}
