//! Board model, move generation and adversarial search for chess battles.
//!
//! `logic` owns the board and the rules that mutate it, `engine` owns the
//! evaluator and the negamax search that picks the computer's move.

pub mod engine;
pub mod logic;
pub mod worker;
