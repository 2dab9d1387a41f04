use tokio::sync::oneshot;

use super::controller::EngineReply;
use super::snapshot::SessionSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Malformed move: {0}")]
    MalformedMove(String),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("A game is already running in this channel")]
    Conflict,
    #[error("No game is running in this channel")]
    NotFound,
    #[error("Game is not ongoing")]
    GameOver,
    #[error("Engine failed: {0}")]
    Engine(#[from] engine::EngineError),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Commands sent to the session actor. Each embeds a oneshot for the reply.
pub enum SessionCommand {
    /// A full turn. The player's board is answered before the engine starts
    /// thinking; no other command runs until the engine has replied.
    PlayTurn {
        notation: String,
        player_reply: oneshot::Sender<Result<String, SessionError>>,
        engine_reply: oneshot::Sender<Result<EngineReply, SessionError>>,
    },
    Undo {
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    GetBoard {
        reply: oneshot::Sender<Result<String, SessionError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}
