//! Contract between the bot and an external xiangqi search engine.
//!
//! The engine owns positions, move generation and evaluation. The bot only
//! asks it for the canonical opening, for the legal moves and successors of
//! a position, and for a lazily deepening sequence of best-move estimates,
//! which [`EngineAdapter`] consumes under a wall-clock budget.

pub mod adapter;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use adapter::{think, EngineAdapter};
pub use xiangqi::{Move, Square};

/// Score thresholds signalling a forced result.
///
/// A position whose score is at or below `-lower` has lost its general;
/// an estimate scoring exactly `upper` mates on the spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MateBounds {
    pub lower: i32,
    pub upper: i32,
}

/// An immutable board snapshot, always seen from the side to move.
pub trait Position: Clone + Send + Sync + 'static {
    /// Every move the side to move may play.
    fn legal_moves(&self) -> Vec<Move>;

    /// Play `mv` and return the successor, rotated so the opponent is to move.
    fn play(&self, mv: Move) -> Self;

    /// The same position seen from the other side.
    fn rotate(&self) -> Self;

    /// Evaluation from the side to move's perspective.
    fn score(&self) -> i32;

    /// FEN-style placement, ranks 9 down to 0, uppercase for the side to move.
    fn placement(&self) -> String;
}

/// One completed iteration of the engine's deepening search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub depth: u32,
    pub mv: Move,
    pub score: i32,
}

pub trait Engine: Send + Sync + 'static {
    type Position: Position;

    /// The canonical opening position, player to move.
    fn initial_position(&self) -> Self::Position;

    fn mate_bounds(&self) -> MateBounds;

    /// Iterative deepening from `position`. Each item is a finished estimate
    /// one ply deeper than the last; the sequence may be unbounded.
    /// `history` is oldest first and ends with `position`.
    fn search<'a>(
        &'a self,
        position: &'a Self::Position,
        history: &'a [Self::Position],
    ) -> Box<dyn Iterator<Item = Estimate> + 'a>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Engine produced no estimate")]
    NoEstimate,
    #[error("Search task failed: {0}")]
    Join(String),
}
