//! Configuration for the xiangqi bot.
//!
//! Every value has a compile-time default and can be overridden through a
//! dedicated environment variable. The configuration is read once at startup
//! and never changes afterwards.

use std::fmt;
use std::time::Duration;

use crate::gateway::RoleSpec;

/// Default prefix in front of every command name.
const DEFAULT_COMMAND_PREFIX: &str = "/";

/// Default engine thinking budget (in milliseconds).
const DEFAULT_THINK_TIME_MS: u64 = 3_000;

/// Default name of the role handed to players who beat the bot.
const DEFAULT_HONOR_ROLE_NAME: &str = "Xiangqi Master";

/// Default ARGB color of the honor role.
const DEFAULT_HONOR_ROLE_COLOR: u32 = 4_294_917_376;

/// Default bound on the directory lookups deciding the honor reward (in
/// milliseconds).
const DEFAULT_HONOR_LOOKUP_MS: u64 = 2_000;

pub const ENV_COMMAND_PREFIX: &str = "XQBOT_COMMAND_PREFIX";
pub const ENV_THINK_TIME_MS: &str = "XQBOT_THINK_TIME_MS";
pub const ENV_HONOR_ENABLED: &str = "XQBOT_HONOR_ENABLED";
pub const ENV_HONOR_ROLE_NAME: &str = "XQBOT_HONOR_ROLE_NAME";
pub const ENV_HONOR_ROLE_COLOR: &str = "XQBOT_HONOR_ROLE_COLOR";
pub const ENV_HONOR_LOOKUP_MS: &str = "XQBOT_HONOR_LOOKUP_MS";
pub const ENV_APP_ID: &str = "XQBOT_APP_ID";
pub const ENV_TOKEN: &str = "XQBOT_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub command_prefix: String,
    pub think_time: Duration,
    pub honor: HonorConfig,
    pub credentials: Credentials,
}

/// Optional role reward for beating the bot in a guild channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HonorConfig {
    pub enabled: bool,
    pub role: RoleSpec,
    /// Past this, the winner is told the result without the reward.
    pub lookup_timeout: Duration,
}

/// Transport credentials, passed through untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            think_time: Duration::from_millis(DEFAULT_THINK_TIME_MS),
            honor: HonorConfig {
                enabled: false,
                role: RoleSpec {
                    name: DEFAULT_HONOR_ROLE_NAME.to_string(),
                    color: DEFAULT_HONOR_ROLE_COLOR,
                    hoist: true,
                },
                lookup_timeout: Duration::from_millis(DEFAULT_HONOR_LOOKUP_MS),
            },
            credentials: Credentials::default(),
        }
    }
}

impl BotConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through `lookup`, falling back to the default
    /// for every variable that is missing or cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let think_time_ms = parse_or(&lookup, ENV_THINK_TIME_MS, DEFAULT_THINK_TIME_MS, |v| {
            v.parse().ok()
        });
        let enabled = parse_or(&lookup, ENV_HONOR_ENABLED, false, parse_flag);
        let color = parse_or(&lookup, ENV_HONOR_ROLE_COLOR, DEFAULT_HONOR_ROLE_COLOR, |v| {
            v.parse().ok()
        });
        let lookup_ms = parse_or(&lookup, ENV_HONOR_LOOKUP_MS, DEFAULT_HONOR_LOOKUP_MS, |v| {
            v.parse().ok()
        });

        Self {
            command_prefix: lookup(ENV_COMMAND_PREFIX).unwrap_or(defaults.command_prefix),
            think_time: Duration::from_millis(think_time_ms),
            honor: HonorConfig {
                enabled,
                role: RoleSpec {
                    name: lookup(ENV_HONOR_ROLE_NAME).unwrap_or(defaults.honor.role.name),
                    color,
                    hoist: true,
                },
                lookup_timeout: Duration::from_millis(lookup_ms),
            },
            credentials: Credentials {
                app_id: lookup(ENV_APP_ID).unwrap_or_default(),
                token: lookup(ENV_TOKEN).unwrap_or_default(),
            },
        }
    }
}

fn parse_or<F, T, P>(lookup: &F, key: &str, default: T, parse: P) -> T
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    match lookup(key) {
        None => default,
        Some(raw) => parse(raw.trim()).unwrap_or_else(|| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
