use uuid::Uuid;

use crate::event::UserId;

use super::state::GamePhase;

/// Immutable view of a session, for callers outside the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub creator_id: UserId,
    pub phase: GamePhase,
    pub history_len: usize,
    /// Placement of the current position, side to move uppercase.
    pub placement: String,
    pub score: i32,
}
