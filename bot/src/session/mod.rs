pub mod actor;
pub mod commands;
pub mod controller;
pub mod handle;
pub mod snapshot;
pub mod state;

use std::collections::HashMap;
use std::future::Future;

use engine::{Engine, EngineAdapter};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::event::{ChannelId, UserId};
use actor::run_session_actor;
pub use commands::SessionError;
pub use controller::{EngineReply, TurnOutcome, HISTORY_CAP};
pub use handle::{PendingTurn, SessionHandle};
pub use snapshot::SessionSnapshot;
pub use state::{GamePhase, SessionRecord};

const MAILBOX_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrenderOutcome {
    Surrendered,
    Forbidden,
}

/// Live sessions, at most one per channel. Spawns an actor task per session.
pub struct SessionManager<E: Engine> {
    sessions: RwLock<HashMap<ChannelId, SessionHandle>>,
    adapter: EngineAdapter<E>,
}

impl<E: Engine> SessionManager<E> {
    pub fn new(adapter: EngineAdapter<E>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            adapter,
        }
    }

    pub async fn get(&self, channel: &ChannelId) -> Option<SessionHandle> {
        self.sessions.read().await.get(channel).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Open a session for `channel` from the engine's opening position.
    /// An existing session is left untouched.
    pub async fn create(
        &self,
        channel: &ChannelId,
        creator: &UserId,
    ) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(channel) {
            return Err(SessionError::Conflict);
        }

        let record = SessionRecord::new(creator.clone(), self.adapter.initial_position());
        let (cmd_tx, cmd_rx) = mpsc::channel(MAILBOX_SIZE);
        let handle = SessionHandle::new(record.session_id(), creator.clone(), cmd_tx);

        tokio::spawn(run_session_actor(
            record,
            self.adapter.clone(),
            channel.clone(),
            cmd_rx,
        ));

        sessions.insert(channel.clone(), handle.clone());
        tracing::info!(%channel, %creator, session_id = %handle.session_id(), "Session created");
        Ok(handle)
    }

    /// Close the channel's session, if any. Returns whether one was closed.
    pub async fn remove(&self, channel: &ChannelId) -> bool {
        let removed = self.sessions.write().await.remove(channel);
        match removed {
            Some(handle) => {
                handle.shutdown().await;
                tracing::info!(%channel, session_id = %handle.session_id(), "Session removed");
                true
            }
            None => false,
        }
    }

    /// Close the channel's session only if it is still `session_id`. A turn
    /// that finishes a game uses this so it cannot close a newer session.
    pub async fn end(&self, channel: &ChannelId, session_id: Uuid) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            match sessions.get(channel) {
                Some(handle) if handle.session_id() == session_id => sessions.remove(channel),
                _ => None,
            }
        };
        match removed {
            Some(handle) => {
                handle.shutdown().await;
                tracing::info!(%channel, %session_id, "Session ended");
                true
            }
            None => false,
        }
    }

    /// End the channel's session on behalf of `requester`. No lock is held
    /// while `privilege_check` runs; the removal only applies to the session
    /// that was checked.
    pub async fn surrender<F, Fut>(
        &self,
        channel: &ChannelId,
        requester: &UserId,
        privilege_check: F,
    ) -> Result<SurrenderOutcome, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        let (session_id, creator) = self
            .get(channel)
            .await
            .map(|handle| (handle.session_id(), handle.creator_id().clone()))
            .ok_or(SessionError::NotFound)?;

        if !controller::is_surrenderable(&creator, requester, privilege_check).await {
            tracing::info!(%channel, %requester, "Surrender refused");
            return Ok(SurrenderOutcome::Forbidden);
        }

        if !self.end(channel, session_id).await {
            tracing::debug!(%channel, %session_id, "Session already closed before surrender");
        }
        tracing::info!(%channel, %requester, "Session surrendered");
        Ok(SurrenderOutcome::Surrendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::mock::MockEngine;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_manager(engine: MockEngine) -> SessionManager<MockEngine> {
        SessionManager::new(EngineAdapter::new(Arc::new(engine), Duration::from_secs(5)))
    }

    fn channel() -> ChannelId {
        ChannelId::from("c1")
    }

    #[tokio::test]
    async fn test_create_and_remove_session() {
        let mgr = test_manager(MockEngine::new());
        let handle = mgr.create(&channel(), &UserId::from("alice")).await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.history_len, 1);
        assert_eq!(snapshot.creator_id.as_str(), "alice");
        assert!(mgr.get(&channel()).await.is_some());

        assert!(mgr.remove(&channel()).await);
        assert!(mgr.get(&channel()).await.is_none());
        assert!(!mgr.remove(&channel()).await);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts_and_keeps_session() {
        let mgr = test_manager(MockEngine::new());
        let first = mgr.create(&channel(), &UserId::from("alice")).await.unwrap();
        first.play_turn("h2e2").await.unwrap().engine_reply().await.unwrap();

        let err = mgr.create(&channel(), &UserId::from("bob")).await.err().unwrap();
        assert!(matches!(err, SessionError::Conflict));

        let current = mgr.get(&channel()).await.unwrap();
        assert_eq!(current.session_id(), first.session_id());
        assert_eq!(current.snapshot().await.unwrap().history_len, 3);
    }

    #[tokio::test]
    async fn test_concurrent_create_yields_one_session() {
        let mgr = Arc::new(test_manager(MockEngine::new()));
        let attempts = (0..8).map(|i| {
            let mgr = Arc::clone(&mgr);
            tokio::spawn(async move {
                mgr.create(&channel(), &UserId::from(format!("user{}", i)))
                    .await
                    .is_ok()
            })
        });

        let results = futures::future::join_all(attempts).await;
        let created = results.into_iter().filter(|r| matches!(r, Ok(true))).count();
        assert_eq!(created, 1);
        assert_eq!(mgr.len().await, 1);
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let mgr = test_manager(MockEngine::new());
        let a = mgr.create(&ChannelId::from("a"), &UserId::from("alice")).await.unwrap();
        mgr.create(&ChannelId::from("b"), &UserId::from("bob")).await.unwrap();

        a.play_turn("h2e2").await.unwrap().engine_reply().await.unwrap();

        let b = mgr.get(&ChannelId::from("b")).await.unwrap();
        assert_eq!(b.snapshot().await.unwrap().history_len, 1);
        assert_eq!(mgr.len().await, 2);
    }

    #[tokio::test]
    async fn test_end_ignores_stale_session() {
        let mgr = test_manager(MockEngine::new());
        let old = mgr.create(&channel(), &UserId::from("alice")).await.unwrap();
        mgr.remove(&channel()).await;
        let new = mgr.create(&channel(), &UserId::from("bob")).await.unwrap();

        assert!(!mgr.end(&channel(), old.session_id()).await);
        assert!(mgr.get(&channel()).await.is_some());
        assert!(mgr.end(&channel(), new.session_id()).await);
        assert!(mgr.is_empty().await);
    }

    #[tokio::test]
    async fn test_surrender_rules() {
        let mgr = test_manager(MockEngine::new());
        let alice = UserId::from("alice");
        let bob = UserId::from("bob");

        let err = mgr.surrender(&channel(), &alice, || async { true }).await;
        assert!(matches!(err, Err(SessionError::NotFound)));

        mgr.create(&channel(), &alice).await.unwrap();
        let outcome = mgr.surrender(&channel(), &bob, || async { false }).await.unwrap();
        assert_eq!(outcome, SurrenderOutcome::Forbidden);
        assert!(mgr.get(&channel()).await.is_some());

        let outcome = mgr.surrender(&channel(), &bob, || async { true }).await.unwrap();
        assert_eq!(outcome, SurrenderOutcome::Surrendered);
        assert!(mgr.get(&channel()).await.is_none());

        mgr.create(&channel(), &alice).await.unwrap();
        let outcome = mgr.surrender(&channel(), &alice, || async { false }).await.unwrap();
        assert_eq!(outcome, SurrenderOutcome::Surrendered);
    }

    #[tokio::test]
    async fn test_removed_session_actor_stops() {
        let mgr = test_manager(MockEngine::new());
        let handle = mgr.create(&channel(), &UserId::from("alice")).await.unwrap();
        mgr.remove(&channel()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_surrender_check_does_not_block_other_channels() {
        let mgr = Arc::new(test_manager(MockEngine::new()));
        let a = ChannelId::from("a");
        let b = ChannelId::from("b");
        mgr.create(&a, &UserId::from("alice")).await.unwrap();
        mgr.create(&b, &UserId::from("bob")).await.unwrap();

        let surrender = {
            let mgr = Arc::clone(&mgr);
            let a = a.clone();
            tokio::spawn(async move {
                mgr.surrender(&a, &UserId::from("carol"), || async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    true
                })
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = std::time::Instant::now();
        assert!(mgr.get(&b).await.is_some());
        assert!(started.elapsed() < Duration::from_millis(200));

        let outcome = surrender.await.unwrap().unwrap();
        assert_eq!(outcome, SurrenderOutcome::Surrendered);
        assert!(mgr.get(&a).await.is_none());
        assert!(mgr.get(&b).await.is_some());
    }

    #[tokio::test]
    async fn test_surrender_leaves_newer_session_alone() {
        let mgr = Arc::new(test_manager(MockEngine::new()));
        let old = mgr.create(&channel(), &UserId::from("alice")).await.unwrap();

        let (checked_tx, checked_rx) = tokio::sync::oneshot::channel();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let surrender = {
            let mgr = Arc::clone(&mgr);
            tokio::spawn(async move {
                mgr.surrender(&channel(), &UserId::from("bob"), || async move {
                    let _ = checked_tx.send(());
                    let _ = release_rx.await;
                    true
                })
                .await
            })
        };

        checked_rx.await.unwrap();
        mgr.remove(&channel()).await;
        let new = mgr.create(&channel(), &UserId::from("dave")).await.unwrap();
        release_tx.send(()).unwrap();

        let outcome = surrender.await.unwrap().unwrap();
        assert_eq!(outcome, SurrenderOutcome::Surrendered);
        assert_ne!(old.session_id(), new.session_id());
        let current = mgr.get(&channel()).await.unwrap();
        assert_eq!(current.session_id(), new.session_id());
    }
}
