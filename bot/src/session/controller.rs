//! Turn logic for one session.
//!
//! A turn is `apply_player_move` followed by `engine_respond`. Every
//! operation either completes or leaves the record exactly as it found it.

use std::future::Future;

use engine::{Engine, EngineAdapter, Position};
use xiangqi::{DisplayBoard, Move};

use crate::event::UserId;
use crate::messages;

use super::commands::SessionError;
use super::state::{GamePhase, SessionRecord};

/// Positions kept after each completed turn; enough for one undo.
pub const HISTORY_CAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    PlayerWon,
    PlayerLost,
}

/// What the engine has to say after the player's move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub outcome: TurnOutcome,
    pub text: String,
}

impl EngineReply {
    pub fn is_terminal(&self) -> bool {
        self.outcome != TurnOutcome::Continue
    }
}

/// Render `position` with its side to move at the bottom.
pub fn render_board<P: Position>(position: &P) -> Result<String, SessionError> {
    DisplayBoard::from_placement(&position.placement())
        .map(|board| board.to_string())
        .map_err(|e| SessionError::Internal(format!("Engine placement: {}", e)))
}

/// The current position as the player sees it.
pub fn player_board<P: Position>(record: &SessionRecord<P>) -> Result<String, SessionError> {
    // Even offsets have the player to move; trimming keeps that parity.
    if record.history().len() % 2 == 1 {
        render_board(record.current())
    } else {
        render_board(&record.current().rotate())
    }
}

/// Play the player's move. Returns the board as the player now sees it.
pub fn apply_player_move<P: Position>(
    record: &mut SessionRecord<P>,
    notation: &str,
) -> Result<String, SessionError> {
    if record.phase() != GamePhase::AwaitingPlayerMove {
        return Err(SessionError::GameOver);
    }

    let mv = Move::parse(notation).map_err(|_| SessionError::MalformedMove(notation.to_string()))?;
    let current = record.current();
    if !current.legal_moves().contains(&mv) {
        return Err(SessionError::IllegalMove(mv.to_string()));
    }

    // The successor has the engine to move; rotate it back for the player.
    let next = current.play(mv);
    let board = render_board(&next.rotate())?;

    tracing::debug!(%mv, "Player moved");
    record.push(next);
    record.set_phase(GamePhase::EngineThinking);
    Ok(board)
}

/// Let the engine answer the player's move.
pub async fn engine_respond<E: Engine>(
    record: &mut SessionRecord<E::Position>,
    adapter: &EngineAdapter<E>,
) -> Result<EngineReply, SessionError> {
    if record.phase() != GamePhase::EngineThinking {
        return Err(SessionError::Internal(format!(
            "Engine asked to move in phase {:?}",
            record.phase()
        )));
    }

    let bounds = adapter.mate_bounds();

    // The player's move already took the engine's general.
    if record.current().score() <= -bounds.lower {
        record.set_phase(GamePhase::PlayerWon);
        return Ok(EngineReply {
            outcome: TurnOutcome::PlayerWon,
            text: messages::PLAYER_WON.to_string(),
        });
    }

    let estimate = adapter
        .best_move(record.current(), record.history())
        .await?;
    let next = record.current().play(estimate.mv);
    let board = render_board(&next)?;

    let mut text = String::new();
    if estimate.score == bounds.upper {
        text.push_str(messages::CHECK);
        text.push('\n');
    }
    text.push_str(messages::acknowledgement());
    text.push('\n');
    // The engine searched with its own pieces at the bottom.
    text.push_str(&messages::engine_move(&estimate.mv.rotate().to_string()));
    text.push('\n');
    text.push_str(&board);

    record.push(next);
    record.trim(HISTORY_CAP);

    let outcome = if record.current().score() <= -bounds.lower {
        text.push_str(messages::PLAYER_LOST);
        record.set_phase(GamePhase::PlayerLost);
        TurnOutcome::PlayerLost
    } else {
        record.set_phase(GamePhase::AwaitingPlayerMove);
        TurnOutcome::Continue
    };

    tracing::debug!(
        depth = estimate.depth,
        score = estimate.score,
        ?outcome,
        "Engine moved"
    );
    Ok(EngineReply { outcome, text })
}

/// Take back the last full turn, returning the restored board.
pub fn undo<P: Position>(record: &mut SessionRecord<P>) -> Result<String, SessionError> {
    if record.phase() != GamePhase::AwaitingPlayerMove {
        return Err(SessionError::GameOver);
    }
    if !record.can_undo() {
        return Ok(messages::NOTHING_TO_UNDO.to_string());
    }

    let history = record.history();
    let restored = render_board(&history[history.len() - 3])?;
    record.pop_turn();
    Ok(format!("{}\n\n{}", messages::UNDO_DONE, restored))
}

/// Only the creator or a privileged user may end a game early. The
/// privilege check is skipped for the creator.
pub async fn is_surrenderable<F, Fut>(
    creator_id: &UserId,
    requester_id: &UserId,
    privilege_check: F,
) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = bool>,
{
    creator_id == requester_id || privilege_check().await
}
