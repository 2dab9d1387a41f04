#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use engine::mock::MockEngine;
use xiangqi_bot::{
    BotConfig, ChannelId, EventKind, GatewayError, GuildDirectory, GuildId, InboundEvent,
    MessageGateway, MessageId, OutboundMessage, RoleId, RoleSpec, UserId, XiangqiBot,
};

pub const BOT_USER: &str = "bot";

/// Where a reply was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Channel(ChannelId),
    Direct(GuildId),
}

#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(Route, OutboundMessage)>>,
    panic_on: Option<ChannelId>,
    fail_on: Option<ChannelId>,
}

impl RecordingGateway {
    /// A gateway that panics when posting to `channel`.
    pub fn panicking_on(channel: &str) -> Self {
        Self {
            panic_on: Some(ChannelId::from(channel)),
            ..Self::default()
        }
    }

    /// A gateway that reports a transport error when posting to `channel`.
    pub fn failing_on(channel: &str) -> Self {
        Self {
            fail_on: Some(ChannelId::from(channel)),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(Route, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, m)| m.content).collect()
    }

    pub fn last_text(&self) -> String {
        self.texts().pop().unwrap_or_default()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessageGateway for RecordingGateway {
    async fn post_channel_message(
        &self,
        channel_id: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), GatewayError> {
        if self.panic_on.as_ref() == Some(channel_id) {
            panic!("gateway crashed on {}", channel_id);
        }
        if self.fail_on.as_ref() == Some(channel_id) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((Route::Channel(channel_id.clone()), message));
        Ok(())
    }

    async fn post_direct_message(
        &self,
        guild_id: &GuildId,
        message: OutboundMessage,
    ) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((Route::Direct(guild_id.clone()), message));
        Ok(())
    }
}

/// In-memory guild roles. Users listed in `admins` are privileged.
#[derive(Default)]
pub struct FakeDirectory {
    admins: Mutex<HashSet<UserId>>,
    roles: Mutex<HashMap<String, RoleId>>,
    members: Mutex<Vec<(RoleId, UserId)>>,
    fail_lookups: bool,
    lookup_delay: Duration,
}

impl FakeDirectory {
    /// A directory whose privilege lookups always fail.
    pub fn failing() -> Self {
        Self {
            fail_lookups: true,
            ..Self::default()
        }
    }

    pub fn with_admins<'a>(admins: impl IntoIterator<Item = &'a str>) -> Self {
        let dir = Self::default();
        dir.admins
            .lock()
            .unwrap()
            .extend(admins.into_iter().map(UserId::from));
        dir
    }

    /// Make every `current_user` lookup take `delay`.
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn role(&self, name: &str) -> Option<RoleId> {
        self.roles.lock().unwrap().get(name).cloned()
    }

    pub fn members(&self) -> Vec<(RoleId, UserId)> {
        self.members.lock().unwrap().clone()
    }
}

#[async_trait]
impl GuildDirectory for FakeDirectory {
    async fn is_privileged(
        &self,
        _guild_id: &GuildId,
        user_id: &UserId,
    ) -> Result<bool, GatewayError> {
        if self.fail_lookups {
            return Err(GatewayError::Transport("directory offline".into()));
        }
        Ok(self.admins.lock().unwrap().contains(user_id))
    }

    async fn current_user(&self) -> Result<UserId, GatewayError> {
        if !self.lookup_delay.is_zero() {
            tokio::time::sleep(self.lookup_delay).await;
        }
        Ok(UserId::from(BOT_USER))
    }

    async fn find_role(
        &self,
        _guild_id: &GuildId,
        name: &str,
    ) -> Result<Option<RoleId>, GatewayError> {
        Ok(self.role(name))
    }

    async fn create_role(
        &self,
        _guild_id: &GuildId,
        spec: &RoleSpec,
    ) -> Result<RoleId, GatewayError> {
        let mut roles = self.roles.lock().unwrap();
        let id = RoleId::from(format!("role-{}", roles.len() + 1));
        roles.insert(spec.name.clone(), id.clone());
        Ok(id)
    }

    async fn add_role_member(
        &self,
        _guild_id: &GuildId,
        role_id: &RoleId,
        user_id: &UserId,
    ) -> Result<(), GatewayError> {
        self.members
            .lock()
            .unwrap()
            .push((role_id.clone(), user_id.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub bot: XiangqiBot<MockEngine>,
    pub engine: Arc<MockEngine>,
    pub gateway: Arc<RecordingGateway>,
    pub directory: Arc<FakeDirectory>,
}

impl Harness {
    pub fn new(engine: MockEngine) -> Self {
        Self::with(engine, BotConfig::default(), FakeDirectory::default())
    }

    pub fn with(engine: MockEngine, mut config: BotConfig, directory: FakeDirectory) -> Self {
        config.think_time = Duration::from_secs(5);
        let engine = Arc::new(engine);
        let gateway = Arc::new(RecordingGateway::default());
        let directory = Arc::new(directory);
        let bot = XiangqiBot::new(config, engine.clone(), gateway.clone(), directory.clone());
        Self {
            bot,
            engine,
            gateway,
            directory,
        }
    }

    /// Deliver `content` as a channel message from `author` in channel `c1`.
    pub async fn say(&self, author: &str, content: &str) {
        self.bot.handle_event(&channel_event(author, "c1", content)).await;
    }
}

pub fn channel_event(author: &str, channel: &str, content: &str) -> InboundEvent {
    InboundEvent {
        id: MessageId::from(format!("msg-{}", content)),
        kind: EventKind::Channel {
            guild_id: GuildId::from("g1"),
        },
        author_id: UserId::from(author),
        channel_id: ChannelId::from(channel),
        content: content.to_string(),
    }
}

pub fn direct_event(author: &str, content: &str) -> InboundEvent {
    InboundEvent {
        id: MessageId::from(format!("dm-{}", content)),
        kind: EventKind::Direct {
            guild_id: GuildId::from("dm-guild"),
        },
        author_id: UserId::from(author),
        channel_id: ChannelId::from("dm-channel"),
        content: content.to_string(),
    }
}
