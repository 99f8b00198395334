//! Process configuration from the environment

use crate::state_machine::state::{OptionalStep, DEFAULT_CITY, DEFAULT_FEED_LIMIT};
use crate::state_machine::{Flow, FlowContext};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 20;
const DEFAULT_STATE_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    pub api_base_url: String,
    pub port: u16,
    pub city: String,
    pub feed_limit: u32,
    pub flow: Flow,
    pub backend_timeout: Duration,
    pub state_timeout: Duration,
}

// The token grants full control of the bot
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("port", &self.port)
            .field("city", &self.city)
            .field("feed_limit", &self.feed_limit)
            .field("flow", &self.flow)
            .field("backend_timeout", &self.backend_timeout)
            .field("state_timeout", &self.state_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let api_base_url = var("API_BASE_URL").ok_or(ConfigError::Missing("API_BASE_URL"))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "API_BASE_URL",
                value: api_base_url,
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let port = parse_number("PORT", var("PORT"), DEFAULT_PORT)?;
        let feed_limit = parse_number("FEED_LIMIT", var("FEED_LIMIT"), DEFAULT_FEED_LIMIT)?;
        if feed_limit == 0 {
            return Err(ConfigError::Invalid {
                name: "FEED_LIMIT",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let flow = match var("SEARCH_FLOW") {
            Some(value) => parse_flow(&value)?,
            None => Flow::full(),
        };

        let backend_timeout = parse_number(
            "BACKEND_TIMEOUT_SECS",
            var("BACKEND_TIMEOUT_SECS"),
            DEFAULT_BACKEND_TIMEOUT_SECS,
        )?;
        let state_timeout = parse_number(
            "STATE_TIMEOUT_SECS",
            var("STATE_TIMEOUT_SECS"),
            DEFAULT_STATE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            bot_token,
            api_base_url,
            port,
            city: var("SEARCH_CITY").unwrap_or_else(|| DEFAULT_CITY.to_string()),
            feed_limit,
            flow,
            backend_timeout: Duration::from_secs(backend_timeout),
            state_timeout: Duration::from_secs(state_timeout),
        })
    }

    pub fn flow_context(&self) -> FlowContext {
        FlowContext::new(self.city.clone(), self.feed_limit, self.flow.clone())
    }
}

fn parse_number<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// `full`, `minimal`, or a comma list of optional step names
fn parse_flow(value: &str) -> Result<Flow, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "full" => return Ok(Flow::full()),
        "minimal" => return Ok(Flow::minimal()),
        _ => {}
    }

    let mut steps = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let step = OptionalStep::from_name(&name.to_ascii_lowercase()).ok_or_else(|| {
            ConfigError::Invalid {
                name: "SEARCH_FLOW",
                value: value.to_string(),
                reason: format!("unknown step {name:?}"),
            }
        })?;
        steps.push(step);
    }
    Ok(Flow::with_steps(steps))
}
