//! Chat commands on top of the session store.

use std::future::Future;
use std::sync::Arc;

use engine::{Engine, EngineAdapter};
use xiangqi::Move;

use crate::config::BotConfig;
use crate::event::{GuildId, InboundEvent, UserId};
use crate::gateway::{self, GuildDirectory, MessageGateway};
use crate::messages;
use crate::router::{Command, CommandFailure, CommandRouter};
use crate::session::{SessionError, SessionManager, SurrenderOutcome, TurnOutcome};

/// Everything a command handler needs, shared by every in-flight event.
pub struct BotContext<E: Engine> {
    config: BotConfig,
    sessions: SessionManager<E>,
    gateway: Arc<dyn MessageGateway>,
    directory: Arc<dyn GuildDirectory>,
}

impl<E: Engine> BotContext<E> {
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager<E> {
        &self.sessions
    }

    fn prefix(&self) -> &str {
        &self.config.command_prefix
    }

    async fn send(&self, event: &InboundEvent, content: impl Into<String>) -> anyhow::Result<()> {
        gateway::reply(self.gateway.as_ref(), event, content)
            .await
            .map_err(|e| {
                tracing::error!(event_id = %event.id, "Failed to deliver reply: {}", e);
                e.into()
            })
    }

    /// What the player is told when a session operation is refused.
    fn describe(&self, err: &SessionError) -> String {
        match err {
            SessionError::MalformedMove(_) => messages::notation_hint(self.prefix()),
            SessionError::IllegalMove(_) => messages::illegal_move(self.prefix()),
            SessionError::Conflict => messages::already_started(self.prefix()),
            SessionError::NotFound => messages::not_started(self.prefix()),
            SessionError::GameOver => messages::GAME_OVER.to_string(),
            SessionError::Engine(_) => messages::ENGINE_FAILED.to_string(),
            SessionError::Internal(_) => messages::INTERNAL_ERROR.to_string(),
        }
    }

    pub async fn start_game(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let text = match self.sessions.create(&event.channel_id, &event.author_id).await {
            Ok(handle) => handle.board().await?,
            Err(e @ SessionError::Conflict) => self.describe(&e),
            Err(e) => return Err(e.into()),
        };
        self.send(event, text).await
    }

    pub async fn ask_menu(&self, event: &InboundEvent) -> anyhow::Result<()> {
        self.send(event, messages::menu(self.prefix())).await
    }

    pub async fn surrender(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let outcome = self
            .sessions
            .surrender(&event.channel_id, &event.author_id, || {
                self.is_privileged(event.guild_id(), &event.author_id)
            })
            .await;
        let text = match outcome {
            Ok(SurrenderOutcome::Surrendered) => messages::SURRENDERED.to_string(),
            Ok(SurrenderOutcome::Forbidden) => messages::SURRENDER_FORBIDDEN.to_string(),
            Err(e @ SessionError::NotFound) => self.describe(&e),
            Err(e) => return Err(e.into()),
        };
        self.send(event, text).await
    }

    pub async fn undo(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let Some(handle) = self.sessions.get(&event.channel_id).await else {
            return self.send(event, self.describe(&SessionError::NotFound)).await;
        };
        let text = match handle.undo().await {
            Ok(text) => text,
            Err(e @ SessionError::GameOver) => self.describe(&e),
            Err(e) => return Err(e.into()),
        };
        self.send(event, text).await
    }

    /// Play the player's move and the engine's answer, replying after each.
    pub async fn do_move(&self, notation: &str, event: &InboundEvent) -> anyhow::Result<()> {
        let channel = &event.channel_id;
        let Some(handle) = self.sessions.get(channel).await else {
            return self.send(event, self.describe(&SessionError::NotFound)).await;
        };

        let turn = match handle.play_turn(notation).await {
            Ok(turn) => turn,
            Err(e) => {
                tracing::debug!(%channel, "Move {:?} refused: {}", notation, e);
                return self.send(event, self.describe(&e)).await;
            }
        };
        // The engine keeps thinking even if this reply is lost.
        let _ = self.send(event, turn.board.clone()).await;

        let reply = match turn.engine_reply().await {
            Ok(reply) => reply,
            Err(e) => return self.send(event, self.describe(&e)).await,
        };
        let finish = async {
            if reply.is_terminal() {
                self.sessions.end(channel, handle.session_id()).await;
                tracing::info!(%channel, outcome = ?reply.outcome, "Game finished");
            }
        };
        let eligible = async {
            reply.outcome == TurnOutcome::PlayerWon && self.honor_eligible(event).await
        };
        let ((), honor) = tokio::join!(finish, eligible);

        let mut text = reply.text;
        if honor {
            text.push_str(&messages::honor_granted(&self.config.honor.role.name));
        }
        self.send(event, text).await?;

        if honor {
            self.spawn_honor_grant(event);
        }
        Ok(())
    }

    /// Messages no command claimed: a bare move is played, anything else
    /// gets the menu.
    pub async fn fallback(&self, event: &InboundEvent) -> anyhow::Result<()> {
        let token = event.content.split_whitespace().next().unwrap_or_default();
        if Move::parse(token).is_ok() {
            return self.do_move(token, event).await;
        }
        self.send(event, messages::not_understood(self.prefix())).await
    }

    /// Directory failures count as unprivileged.
    async fn is_privileged(&self, guild_id: &GuildId, user_id: &UserId) -> bool {
        match self.directory.is_privileged(guild_id, user_id).await {
            Ok(privileged) => privileged,
            Err(e) => {
                tracing::warn!(%guild_id, %user_id, "Privilege lookup failed: {}", e);
                false
            }
        }
    }

    /// Whether a win in `event` earns the honor role. Gives up after the
    /// configured lookup timeout.
    async fn honor_eligible(&self, event: &InboundEvent) -> bool {
        if !self.config.honor.enabled || event.is_direct() {
            return false;
        }
        let lookup = async {
            match self.directory.current_user().await {
                Ok(me) => self.is_privileged(event.guild_id(), &me).await,
                Err(e) => {
                    tracing::warn!("Could not look up the bot's own user: {}", e);
                    false
                }
            }
        };
        match tokio::time::timeout(self.config.honor.lookup_timeout, lookup).await {
            Ok(eligible) => eligible,
            Err(_) => {
                tracing::warn!(event_id = %event.id, "Honor lookup timed out");
                false
            }
        }
    }

    /// Grant the honor role in the background; the outcome is only logged.
    fn spawn_honor_grant(&self, event: &InboundEvent) {
        let directory = Arc::clone(&self.directory);
        let guild_id = event.guild_id().clone();
        let user_id = event.author_id.clone();
        let role = self.config.honor.role.clone();
        tokio::spawn(async move {
            match gateway::grant_role(directory.as_ref(), &guild_id, &user_id, &role).await {
                Ok(()) => tracing::info!(%guild_id, %user_id, "Granted honor role"),
                Err(e) => tracing::warn!(%guild_id, %user_id, "Failed to grant honor role: {}", e),
            }
        });
    }

    async fn report_failure(&self, failure: CommandFailure, params: &str, event: &InboundEvent) {
        let text = match failure {
            CommandFailure::CheckFailed => messages::notation_hint(self.prefix()),
            CommandFailure::Handler(ref cause) | CommandFailure::Panicked(ref cause) => {
                tracing::warn!(event_id = %event.id, params, "Command failed: {}", cause);
                messages::INTERNAL_ERROR.to_string()
            }
        };
        let _ = self.send(event, text).await;
    }
}

/// The xiangqi bot: a command router over shared [`BotContext`].
pub struct XiangqiBot<E: Engine> {
    context: Arc<BotContext<E>>,
    router: CommandRouter,
}

impl<E: Engine> XiangqiBot<E> {
    pub fn new(
        config: BotConfig,
        engine: Arc<E>,
        gateway: Arc<dyn MessageGateway>,
        directory: Arc<dyn GuildDirectory>,
    ) -> Self {
        let adapter = EngineAdapter::new(engine, config.think_time);
        let context = Arc::new(BotContext {
            sessions: SessionManager::new(adapter),
            config,
            gateway,
            directory,
        });

        let mut router = CommandRouter::new(context.config.command_prefix.clone());
        router.register(bind("start", &context, |ctx, _params, event| async move {
            ctx.start_game(&event).await
        }));
        router.register(bind("menu", &context, |ctx, _params, event| async move {
            ctx.ask_menu(&event).await
        }));
        router.register(
            bind("move", &context, |ctx, params, event| async move {
                ctx.do_move(&params, &event).await
            })
            .with_validator(|params| Move::parse(params).is_ok()),
        );
        router.register(bind("undo", &context, |ctx, _params, event| async move {
            ctx.undo(&event).await
        }));
        router.register(bind("surrender", &context, |ctx, _params, event| async move {
            ctx.surrender(&event).await
        }));

        Self { context, router }
    }

    pub fn context(&self) -> &Arc<BotContext<E>> {
        &self.context
    }

    /// Handle one inbound chat event from start to finish.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(event_id = %event.id, channel = %event.channel_id)
    )]
    pub async fn handle_event(&self, event: &InboundEvent) {
        tracing::debug!(author = %event.author_id, content = %event.content, "Received message");
        if self.router.dispatch(event).await {
            return;
        }
        if let Err(e) = self.context.fallback(event).await {
            tracing::warn!("Unhandled message failed: {:#}", e);
        }
    }
}

/// A command whose handler and error handler run against `context`.
fn bind<E, F, Fut>(name: &str, context: &Arc<BotContext<E>>, handler: F) -> Command
where
    E: Engine,
    F: Fn(Arc<BotContext<E>>, String, InboundEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let for_handler = Arc::clone(context);
    let for_errors = Arc::clone(context);
    Command::new(name, move |params, event| {
        handler(Arc::clone(&for_handler), params, event)
    })
    .on_error(move |failure, params, event| {
        let ctx = Arc::clone(&for_errors);
        async move { ctx.report_failure(failure, &params, &event).await }
    })
}
