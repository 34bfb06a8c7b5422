use crate::logic::board::{Board, Color, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod eval;
pub mod search;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    #[must_use]
    pub const fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
    /// Score of the chosen move from the mover's perspective.
    pub score: i64,
}

pub trait Evaluator {
    /// Static score of `board` as seen by `perspective`; higher is better.
    fn evaluate(&self, board: &Board, perspective: Color) -> i64;
}

pub trait Searcher {
    /// Best move for the side to move, or `None` when it has no legal move.
    fn search(&mut self, board: &Board, depth: u8) -> Option<(Move, SearchStats)>;
}
