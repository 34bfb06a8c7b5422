use crate::logic::eval_constants::{
    DEFAULT_SEARCH_DEPTH, MOBILITY_WEIGHT, VAL_BIG, VAL_BISHOP, VAL_KING, VAL_KING_FLAG,
    VAL_KNIGHT, VAL_PAWN, VAL_QUEEN, VAL_ROOK,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// How the root picks among moves that reach the same best score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First move in search order.
    #[default]
    FirstFound,
    /// Uniform among tied moves, drawn from an RNG seeded with `seed`.
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i64,
    pub val_knight: i64,
    pub val_bishop: i64,
    pub val_rook: i64,
    pub val_queen: i64,
    pub val_king: i64,
    pub val_king_flag: i64,
    pub val_big: i64,
    pub mobility_weight: i64,

    // Search Parameters
    pub search_depth: u8,
    pub order_captures_first: bool,
    pub tie_break: TieBreak,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_knight: VAL_KNIGHT,
            val_bishop: VAL_BISHOP,
            val_rook: VAL_ROOK,
            val_queen: VAL_QUEEN,
            val_king: VAL_KING,
            val_king_flag: VAL_KING_FLAG,
            val_big: VAL_BIG,
            mobility_weight: MOBILITY_WEIGHT,

            search_depth: DEFAULT_SEARCH_DEPTH,
            order_captures_first: true,
            tie_break: TieBreak::FirstFound,
            seed: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read engine config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed engine config: {0}")]
    Json(#[from] serde_json::Error),
}

// Piece values here are multipliers over the defaults; everything else is
// taken as is.
#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f64>,
    val_knight: Option<f64>,
    val_bishop: Option<f64>,
    val_rook: Option<f64>,
    val_queen: Option<f64>,
    val_king: Option<f64>,
    val_king_flag: Option<f64>,
    val_big: Option<f64>,
    mobility_weight: Option<i64>,

    search_depth: Option<u8>,
    order_captures_first: Option<bool>,
    tie_break: Option<TieBreak>,
    seed: Option<u64>,
}

impl EngineConfig {
    /// Reads a tuning file where piece values are scale factors, e.g.
    /// `{"val_bishop": 1.5}` makes bishops worth 1.5 times the default.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        Ok(Self {
            val_pawn: apply_scale(default.val_pawn, json_config.val_pawn),
            val_knight: apply_scale(default.val_knight, json_config.val_knight),
            val_bishop: apply_scale(default.val_bishop, json_config.val_bishop),
            val_rook: apply_scale(default.val_rook, json_config.val_rook),
            val_queen: apply_scale(default.val_queen, json_config.val_queen),
            val_king: apply_scale(default.val_king, json_config.val_king),
            val_king_flag: apply_scale(default.val_king_flag, json_config.val_king_flag),
            val_big: apply_scale(default.val_big, json_config.val_big),
            mobility_weight: json_config
                .mobility_weight
                .unwrap_or(default.mobility_weight),

            search_depth: json_config.search_depth.unwrap_or(default.search_depth),
            order_captures_first: json_config
                .order_captures_first
                .unwrap_or(default.order_captures_first),
            tie_break: json_config.tie_break.unwrap_or(default.tie_break),
            seed: json_config.seed.unwrap_or(default.seed),
        })
    }

    /// Reads a config file holding absolute values.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i64, scale: Option<f64>) -> i64 {
    scale.map_or(default_val, |s| (default_val as f64 * s) as i64)
}
