use engine::Position;
use uuid::Uuid;

use crate::event::UserId;

use super::snapshot::SessionSnapshot;

/// Where a session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    AwaitingPlayerMove,
    EngineThinking,
    PlayerWon,
    PlayerLost,
}

/// One channel's game. Owned by the session actor; no locks.
///
/// `history` is oldest first and never empty. Positions alternate between
/// the player to move (even offsets from the start) and the engine to move.
pub struct SessionRecord<P> {
    session_id: Uuid,
    creator_id: UserId,
    history: Vec<P>,
    phase: GamePhase,
}

impl<P: Position> SessionRecord<P> {
    pub fn new(creator_id: UserId, initial: P) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            creator_id,
            history: vec![initial],
            phase: GamePhase::AwaitingPlayerMove,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn history(&self) -> &[P] {
        &self.history
    }

    pub fn current(&self) -> &P {
        &self.history[self.history.len() - 1]
    }

    /// At least one full player and engine turn to take back.
    pub fn can_undo(&self) -> bool {
        self.history.len() > 2
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
    }

    pub(crate) fn push(&mut self, position: P) {
        self.history.push(position);
    }

    /// Drop the last player move and engine reply.
    pub(crate) fn pop_turn(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.history.truncate(self.history.len() - 2);
        true
    }

    /// Take back a player move whose engine reply never arrived.
    pub(crate) fn rollback_player_move(&mut self) {
        if self.phase == GamePhase::EngineThinking && self.history.len() > 1 {
            self.history.pop();
            self.phase = GamePhase::AwaitingPlayerMove;
        }
    }

    /// Drop the oldest turns until at most `cap` positions remain. Whole
    /// turns go together so the oldest position keeps the player to move.
    pub(crate) fn trim(&mut self, cap: usize) {
        let excess = self.history.len().saturating_sub(cap);
        let drop = excess + excess % 2;
        if drop > 0 && drop < self.history.len() {
            self.history.drain(..drop);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            creator_id: self.creator_id.clone(),
            phase: self.phase,
            history_len: self.history.len(),
            placement: self.current().placement(),
            score: self.current().score(),
        }
    }
}
