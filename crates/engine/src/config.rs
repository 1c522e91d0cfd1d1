//! Consumer configuration read from the environment.

use std::{fmt, str::FromStr, time::Duration};

use oembed_api::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, FetchOptions, default_user_agent};
use oembed_types::ResponseFormat;
use oembed_util::non_empty_env;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const TIMEOUT_ENV: &str = "OEMBED_HTTP_TIMEOUT";
pub const MAX_REDIRECTS_ENV: &str = "OEMBED_MAX_REDIRECTS";
pub const USER_AGENT_ENV: &str = "OEMBED_USER_AGENT";
pub const TIE_BREAK_ENV: &str = "OEMBED_DISCOVERY_TIE_BREAK";

/// Which discovered link wins when none matches the preferred format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    First,
    #[default]
    Last,
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Last => "last",
        })
    }
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(format!("invalid tie-break '{other}'; expected 'first' or 'last'")),
        }
    }
}

/// Transport and discovery settings for a [`crate::Consumer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
    /// Format preferred when a page advertises several discovery links.
    pub preferred_format: ResponseFormat,
    pub tie_break: TieBreak,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: default_user_agent(),
            preferred_format: ResponseFormat::Json,
            tie_break: TieBreak::Last,
        }
    }
}

impl ConsumerConfig {
    /// Defaults overridden by `OEMBED_*` environment variables. Invalid values
    /// are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(raw) = non_empty_env(TIMEOUT_ENV) {
            match raw.parse::<f64>() {
                Ok(secs) if secs.is_finite() && secs > 0.0 => config.timeout = Duration::from_secs_f64(secs),
                _ => warn!(var = TIMEOUT_ENV, value = %raw, "ignoring invalid timeout"),
            }
        }
        if let Some(raw) = non_empty_env(MAX_REDIRECTS_ENV) {
            match raw.parse::<usize>() {
                Ok(limit) => config.max_redirects = limit,
                Err(error) => warn!(var = MAX_REDIRECTS_ENV, value = %raw, %error, "ignoring invalid redirect limit"),
            }
        }
        if let Some(agent) = non_empty_env(USER_AGENT_ENV) {
            config.user_agent = agent;
        }
        if let Some(raw) = non_empty_env(TIE_BREAK_ENV) {
            match raw.parse::<TieBreak>() {
                Ok(tie_break) => config.tie_break = tie_break,
                Err(error) => warn!(var = TIE_BREAK_ENV, %error, "ignoring invalid discovery tie-break"),
            }
        }

        config
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: self.timeout,
            max_redirects: self.max_redirects,
            user_agent: Some(self.user_agent.clone()),
        }
    }
}
