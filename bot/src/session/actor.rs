use engine::{Engine, EngineAdapter};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::event::ChannelId;

use super::commands::SessionCommand;
use super::controller;
use super::state::SessionRecord;

/// The session actor loop.
/// Owns the record and processes commands one at a time, so a channel's
/// turns never interleave.
pub(crate) async fn run_session_actor<E: Engine>(
    record: SessionRecord<E::Position>,
    adapter: EngineAdapter<E>,
    channel: ChannelId,
    cmd_rx: mpsc::Receiver<SessionCommand>,
) {
    let session_id = record.session_id();
    run_session_actor_inner(record, adapter, cmd_rx)
        .instrument(tracing::info_span!("session", id = %session_id, %channel))
        .await;
}

async fn run_session_actor_inner<E: Engine>(
    mut record: SessionRecord<E::Position>,
    adapter: EngineAdapter<E>,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
) {
    tracing::info!(creator = %record.creator_id(), "Session actor started");

    loop {
        match cmd_rx.recv().await {
            Some(SessionCommand::Shutdown) | None => {
                tracing::info!("Session actor shutting down");
                break;
            }
            Some(cmd) => handle_command(&mut record, &adapter, cmd).await,
        }
    }

    tracing::info!(
        phase = ?record.phase(),
        positions = record.history().len(),
        "Session actor exited"
    );
}

async fn handle_command<E: Engine>(
    record: &mut SessionRecord<E::Position>,
    adapter: &EngineAdapter<E>,
    cmd: SessionCommand,
) {
    match cmd {
        SessionCommand::PlayTurn {
            notation,
            player_reply,
            engine_reply,
        } => {
            let board = match controller::apply_player_move(record, &notation) {
                Ok(board) => board,
                Err(e) => {
                    tracing::debug!("Rejected move {:?}: {}", notation, e);
                    let _ = player_reply.send(Err(e));
                    return;
                }
            };
            let _ = player_reply.send(Ok(board));

            let result = controller::engine_respond(record, adapter).await;
            if let Err(ref e) = result {
                tracing::warn!("Engine failed, taking back the player's move: {}", e);
                record.rollback_player_move();
            }
            let _ = engine_reply.send(result);
        }
        SessionCommand::Undo { reply } => {
            let _ = reply.send(controller::undo(record));
        }
        SessionCommand::GetBoard { reply } => {
            let _ = reply.send(controller::player_board(record));
        }
        SessionCommand::GetSnapshot { reply } => {
            let _ = reply.send(record.snapshot());
        }
        SessionCommand::Shutdown => {}
    }
}
