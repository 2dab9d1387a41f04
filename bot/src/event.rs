//! Inbound chat events as delivered by the transport.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

id_type!(
    /// A text channel; at most one game runs per channel.
    ChannelId
);
id_type!(GuildId);
id_type!(UserId);
id_type!(MessageId);
id_type!(RoleId);

/// Where an event came from, which decides how replies are delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The bot was mentioned in a guild channel.
    Channel { guild_id: GuildId },
    /// A private message. `guild_id` identifies the direct-message session.
    Direct { guild_id: GuildId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub id: MessageId,
    pub kind: EventKind,
    pub author_id: UserId,
    pub channel_id: ChannelId,
    /// Message text with any bot mention already removed by the transport.
    pub content: String,
}

impl InboundEvent {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn guild_id(&self) -> &GuildId {
        match &self.kind {
            EventKind::Channel { guild_id } | EventKind::Direct { guild_id } => guild_id,
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.kind, EventKind::Direct { .. })
    }
}
