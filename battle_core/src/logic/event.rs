use crate::logic::board::{Position, Tile};
use serde::{Deserialize, Serialize};

/// Transient notification fired by the rules for the presentation layer.
///
/// Exactly one event is fired per qualifying state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// An occupant left the board. For a big unit this is reported once, at its
    /// origin, carrying the origin tile.
    Removed { at: Position, tile: Tile },
    /// A pawn reached the far rank and became a queen.
    Promoted { at: Position },
    /// A big unit relocated by more than one step (edge wraparound).
    Warped { from: Position, to: Position },
}

impl BoardEvent {
    /// Whether this event removed a tile carrying the king flag.
    pub fn removed_king(&self) -> bool {
        matches!(self, Self::Removed { tile, .. } if tile.king)
    }
}

/// Receiver for [`BoardEvent`]s. The search passes `()` and drops them.
pub trait EventSink {
    fn push(&mut self, event: BoardEvent);
}

impl EventSink for () {
    fn push(&mut self, _event: BoardEvent) {}
}

impl EventSink for Vec<BoardEvent> {
    fn push(&mut self, event: BoardEvent) {
        Vec::push(self, event);
    }
}

/// Board edits requested from outside the rules: arrangement clicks, shop
/// placements and peers forwarding their own edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardCommand {
    Spawn { at: Position, tile: Tile },
    Delete { at: Position },
}
