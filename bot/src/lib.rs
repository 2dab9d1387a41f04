//! A xiangqi chat bot: one game per channel against a time-boxed engine.

pub mod bot;
pub mod config;
pub mod event;
pub mod gateway;
pub mod messages;
pub mod router;
pub mod runtime;
pub mod session;

pub use bot::{BotContext, XiangqiBot};
pub use config::BotConfig;
pub use event::{ChannelId, EventKind, GuildId, InboundEvent, MessageId, RoleId, UserId};
pub use gateway::{GatewayError, GuildDirectory, MessageGateway, OutboundMessage, RoleSpec};
pub use router::{Command, CommandFailure, CommandRouter};
pub use runtime::{init_tracing, serve};
pub use session::{SessionError, SessionManager};
