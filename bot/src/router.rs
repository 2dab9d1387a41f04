//! Prefix command dispatch.
//!
//! A message `"{prefix}{name} {params}"` runs the command registered under
//! `name` with the trimmed `params`. Failures, panics included, go to the
//! command's error handler when it has one.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::event::InboundEvent;

type Handler =
    Arc<dyn Fn(String, InboundEvent) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;
type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type ErrorHandler =
    Arc<dyn Fn(CommandFailure, String, InboundEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Why a matched command did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandFailure {
    #[error("Parameters rejected")]
    CheckFailed,
    #[error("Handler failed: {0}")]
    Handler(String),
    #[error("Handler panicked: {0}")]
    Panicked(String),
}

pub struct Command {
    name: String,
    handler: Handler,
    validator: Option<Validator>,
    error_handler: Option<ErrorHandler>,
}

impl Command {
    pub fn new<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(String, InboundEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(move |params, event| handler(params, event).boxed()),
            validator: None,
            error_handler: None,
        }
    }

    /// Only run the handler when `validator` accepts the parameters.
    pub fn with_validator<V>(mut self, validator: V) -> Self
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn on_error<F, Fut>(mut self, error_handler: F) -> Self
    where
        F: Fn(CommandFailure, String, InboundEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.error_handler = Some(Arc::new(move |failure, params, event| {
            error_handler(failure, params, event).boxed()
        }));
        self
    }
}

pub struct CommandRouter {
    prefix: String,
    commands: HashMap<String, Command>,
}

impl CommandRouter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Register `command`, replacing any earlier command with the same name.
    pub fn register(&mut self, command: Command) {
        let name = command.name.clone();
        if self.commands.insert(name.clone(), command).is_some() {
            tracing::warn!(command = %name, "Command registered twice, keeping the latest");
        }
    }

    /// Split `content` into command name and parameters, if it carries the
    /// prefix.
    fn parse<'a>(&self, content: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = content.trim_start().strip_prefix(self.prefix.as_str())?;
        let (name, params) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        if name.is_empty() {
            return None;
        }
        Some((name, params.trim()))
    }

    /// Run the command `event` names. Returns whether a command took
    /// ownership of the event.
    #[tracing::instrument(level = "debug", skip_all, fields(event_id = %event.id))]
    pub async fn dispatch(&self, event: &InboundEvent) -> bool {
        let Some((name, params)) = self.parse(&event.content) else {
            return false;
        };
        let Some(command) = self.commands.get(name) else {
            tracing::debug!(command = name, "No such command");
            return false;
        };
        tracing::debug!(command = name, params, "Dispatching");

        if let Some(validator) = &command.validator {
            if !validator(params) {
                let Some(error_handler) = &command.error_handler else {
                    tracing::debug!(command = name, "Parameters rejected, skipping");
                    return false;
                };
                let params = params.to_string();
                error_handler(CommandFailure::CheckFailed, params, event.clone()).await;
                return true;
            }
        }

        let handler = Arc::clone(&command.handler);
        let call = {
            let params = params.to_string();
            let event = event.clone();
            async move { handler(params, event).await }
        };
        let failure = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => CommandFailure::Handler(format!("{:#}", e)),
            Err(panic) => CommandFailure::Panicked(panic_message(panic.as_ref())),
        };

        match &command.error_handler {
            Some(error_handler) => {
                error_handler(failure, params.to_string(), event.clone()).await;
            }
            None => tracing::warn!(command = name, "{}", failure),
        }
        true
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChannelId, EventKind, GuildId, MessageId, UserId};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn event(content: &str) -> InboundEvent {
        InboundEvent {
            id: MessageId::from("m1"),
            kind: EventKind::Channel {
                guild_id: GuildId::from("g1"),
            },
            author_id: UserId::from("u1"),
            channel_id: ChannelId::from("c1"),
            content: content.to_string(),
        }
    }

    fn recording(name: &str, log: &Log) -> Command {
        let log = Arc::clone(log);
        let tag = name.to_string();
        Command::new(name, move |params, _event| {
            let log = Arc::clone(&log);
            let tag = tag.clone();
            async move {
                log.lock().unwrap().push(format!("{}({})", tag, params));
                Ok(())
            }
        })
    }

    fn error_log(
        log: &Log,
    ) -> impl Fn(CommandFailure, String, InboundEvent) -> BoxFuture<'static, ()> {
        let log = Arc::clone(log);
        move |failure, params, _event| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(format!("error[{:?}]({})", failure, params));
            }
            .boxed()
        }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_dispatch_strips_prefix_and_trims_params() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(recording("move", &log));

        assert!(router.dispatch(&event("/move   h2e2  ")).await);
        assert!(router.dispatch(&event("  /move")).await);
        assert_eq!(entries(&log), vec!["move(h2e2)", "move()"]);
    }

    #[tokio::test]
    async fn test_unknown_or_unprefixed_is_unhandled() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(recording("start", &log));

        assert!(!router.dispatch(&event("/stop")).await);
        assert!(!router.dispatch(&event("start")).await);
        assert!(!router.dispatch(&event("/")).await);
        assert!(!router.dispatch(&event("/starts")).await);
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(recording("start", &log));

        assert!(!router.dispatch(&event("/Start")).await);
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn test_validator_rejection_goes_to_error_handler() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(
            recording("move", &log)
                .with_validator(|params| params.len() == 4)
                .on_error(error_log(&log)),
        );

        assert!(router.dispatch(&event("/move h2")).await);
        assert_eq!(entries(&log), vec!["error[CheckFailed](h2)"]);
    }

    #[tokio::test]
    async fn test_validator_rejection_without_error_handler_falls_through() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(recording("move", &log).with_validator(|params| !params.is_empty()));

        assert!(!router.dispatch(&event("/move")).await);
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_is_forwarded() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(
            Command::new("undo", |_params, _event| async { anyhow::bail!("nothing to undo") })
                .on_error(error_log(&log)),
        );

        assert!(router.dispatch(&event("/undo")).await);
        assert_eq!(
            entries(&log),
            vec!["error[Handler(\"nothing to undo\")]()"]
        );
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let log = Log::default();
        let mut router = CommandRouter::new("/");
        router.register(
            Command::new("menu", |_params, _event| async { panic!("boom") })
                .on_error(error_log(&log)),
        );
        router.register(recording("start", &log));

        assert!(router.dispatch(&event("/menu")).await);
        assert!(router.dispatch(&event("/start")).await);
        assert_eq!(
            entries(&log),
            vec!["error[Panicked(\"boom\")]()", "start()"]
        );
    }

    #[tokio::test]
    async fn test_failure_without_error_handler_is_still_handled() {
        let mut router = CommandRouter::new("/");
        router.register(Command::new("undo", |_params, _event| async {
            anyhow::bail!("nothing to undo")
        }));

        assert!(router.dispatch(&event("/undo")).await);
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let log = Log::default();
        let mut router = CommandRouter::new("!");
        router.register(recording("start", &log));
        router.register(recording("start", &log).with_validator(|params| params == "now"));

        assert!(!router.dispatch(&event("!start")).await);
        assert!(router.dispatch(&event("!start now")).await);
        assert_eq!(entries(&log), vec!["start(now)"]);
        assert!(router.contains("start"));
    }
}
