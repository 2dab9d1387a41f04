use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::event::UserId;

use super::commands::{SessionCommand, SessionError};
use super::controller::EngineReply;
use super::snapshot::SessionSnapshot;

/// Cheap, cloneable handle to a session actor.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    creator_id: UserId,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

/// A turn whose player move has been accepted. The engine is already
/// thinking; await [`PendingTurn::engine_reply`] for its answer.
pub struct PendingTurn {
    pub board: String,
    engine_reply: oneshot::Receiver<Result<EngineReply, SessionError>>,
}

impl PendingTurn {
    pub async fn engine_reply(self) -> Result<EngineReply, SessionError> {
        self.engine_reply
            .await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))?
    }
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: Uuid,
        creator_id: UserId,
        cmd_tx: mpsc::Sender<SessionCommand>,
    ) -> Self {
        Self {
            session_id,
            creator_id,
            cmd_tx,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    /// Submit the player's move. Resolves as soon as the move is accepted or
    /// rejected; the engine's reply arrives through the returned turn.
    pub async fn play_turn(&self, notation: &str) -> Result<PendingTurn, SessionError> {
        let (player_tx, player_rx) = oneshot::channel();
        let (engine_tx, engine_rx) = oneshot::channel();
        self.send(SessionCommand::PlayTurn {
            notation: notation.to_string(),
            player_reply: player_tx,
            engine_reply: engine_tx,
        })
        .await?;
        let board = player_rx
            .await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))??;
        Ok(PendingTurn {
            board,
            engine_reply: engine_rx,
        })
    }

    pub async fn undo(&self) -> Result<String, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::Undo { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))?
    }

    pub async fn board(&self) -> Result<String, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetBoard { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.send(SessionCommand::GetSnapshot { reply: tx }).await?;
        rx.await
            .map_err(|_| SessionError::Internal("Reply dropped".into()))
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(SessionCommand::Shutdown).await;
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| SessionError::Internal("Session actor closed".into()))
    }
}
