//! Seams to the chat transport.
//!
//! The transport implements [`MessageGateway`] for delivery and
//! [`GuildDirectory`] for roles. [`reply`] is the only place that looks at
//! the kind of an event to pick a delivery route.

use async_trait::async_trait;

use crate::event::{ChannelId, EventKind, GuildId, InboundEvent, MessageId, RoleId, UserId};

#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),
}

/// A passive reply: the transport threads it under `reply_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub content: String,
    pub reply_to: MessageId,
}

/// Role created on demand for the honor reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: String,
    pub color: u32,
    /// Show members of this role separately in the member list.
    pub hoist: bool,
}

#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn post_channel_message(
        &self,
        channel_id: &ChannelId,
        message: OutboundMessage,
    ) -> Result<(), GatewayError>;

    async fn post_direct_message(
        &self,
        guild_id: &GuildId,
        message: OutboundMessage,
    ) -> Result<(), GatewayError>;
}

#[async_trait]
pub trait GuildDirectory: Send + Sync {
    /// Whether `user_id` holds an administrative role in `guild_id`.
    async fn is_privileged(&self, guild_id: &GuildId, user_id: &UserId)
        -> Result<bool, GatewayError>;

    /// The bot's own user id.
    async fn current_user(&self) -> Result<UserId, GatewayError>;

    async fn find_role(&self, guild_id: &GuildId, name: &str)
        -> Result<Option<RoleId>, GatewayError>;

    async fn create_role(&self, guild_id: &GuildId, spec: &RoleSpec)
        -> Result<RoleId, GatewayError>;

    async fn add_role_member(
        &self,
        guild_id: &GuildId,
        role_id: &RoleId,
        user_id: &UserId,
    ) -> Result<(), GatewayError>;
}

/// Send `content` back to wherever `event` came from.
pub async fn reply(
    gateway: &dyn MessageGateway,
    event: &InboundEvent,
    content: impl Into<String>,
) -> Result<(), GatewayError> {
    let message = OutboundMessage {
        content: content.into(),
        reply_to: event.id.clone(),
    };
    match &event.kind {
        EventKind::Direct { guild_id } => gateway.post_direct_message(guild_id, message).await,
        EventKind::Channel { .. } => {
            gateway
                .post_channel_message(&event.channel_id, message)
                .await
        }
    }
}

/// Give `user_id` the role described by `spec`, creating the role first if
/// the guild does not have it yet.
#[tracing::instrument(level = "info", skip(directory, spec), fields(role = %spec.name))]
pub async fn grant_role(
    directory: &dyn GuildDirectory,
    guild_id: &GuildId,
    user_id: &UserId,
    spec: &RoleSpec,
) -> Result<(), GatewayError> {
    let role_id = match directory.find_role(guild_id, &spec.name).await? {
        Some(role_id) => role_id,
        None => {
            tracing::info!("Creating missing role");
            directory.create_role(guild_id, spec).await?
        }
    };
    directory.add_role_member(guild_id, &role_id, user_id).await
}
