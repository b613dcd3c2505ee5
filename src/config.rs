//! Embedding configuration and environment overrides.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use widget_api::{ChatApiConfig, DEFAULT_LOOKUP_URL};

use crate::context::ADDRESS_LOOKUP_TIMEOUT;

pub const DEFAULT_GREETING: &str = "👋 Hello! I'm your AI assistant. How can I help you today?";

pub const DEFAULT_PRIMARY: &str = "#4f46e5";
pub const DEFAULT_SECONDARY: &str = "#7c3aed";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_TEXT: &str = "#1f2937";
pub const DEFAULT_ACCENT: &str = "#10b981";

/// Corner of the host page the widget is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl WidgetPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        }
    }
}

impl fmt::Display for WidgetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown widget position `{0}`")]
pub struct UnknownPosition(pub String);

impl FromStr for WidgetPosition {
    type Err = UnknownPosition;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "bottom-right" => Ok(Self::BottomRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "top-right" => Ok(Self::TopRight),
            "top-left" => Ok(Self::TopLeft),
            other => Err(UnknownPosition(other.to_string())),
        }
    }
}

/// Color slots; unset slots resolve to the built-in palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatTheme {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub background: Option<String>,
    pub text: Option<String>,
    pub accent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTheme {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub text: String,
    pub accent: String,
}

impl ChatTheme {
    pub fn resolve(&self) -> ResolvedTheme {
        fn slot(value: &Option<String>, fallback: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
                .to_string()
        }

        ResolvedTheme {
            primary: slot(&self.primary, DEFAULT_PRIMARY),
            secondary: slot(&self.secondary, DEFAULT_SECONDARY),
            background: slot(&self.background, DEFAULT_BACKGROUND),
            text: slot(&self.text, DEFAULT_TEXT),
            accent: slot(&self.accent, DEFAULT_ACCENT),
        }
    }
}

/// What the embedding shell may configure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    pub initial_message: Option<String>,
    pub position: WidgetPosition,
    pub theme: ChatTheme,
    /// Replaces the tab-scoped session id until the next reset.
    pub session_id: Option<String>,
}

impl WidgetConfig {
    pub fn with_initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = Some(message.into());
        self
    }

    pub fn with_position(mut self, position: WidgetPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_theme(mut self, theme: ChatTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Welcome text installed when there is no history to show.
    pub fn greeting(&self) -> &str {
        self.initial_message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(DEFAULT_GREETING)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOOKUP_URL.to_string(),
            timeout: ADDRESS_LOOKUP_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub base_url: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub initial_message: Option<String>,
    pub position: WidgetPosition,
    pub request_timeout: Option<Duration>,
    pub log_filter: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_opt("CHAT_WIDGET_BASE_URL"),
            store_dir: env_string_opt("CHAT_WIDGET_STORE_DIR").map(PathBuf::from),
            initial_message: env_string_opt("CHAT_WIDGET_INITIAL_MESSAGE"),
            position: env_string_opt("CHAT_WIDGET_POSITION")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            request_timeout: env_string_opt("CHAT_WIDGET_REQUEST_TIMEOUT_SEC")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            log_filter: env_string_opt("CHAT_WIDGET_LOG"),
        }
    }

    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            initial_message: self.initial_message.clone(),
            position: self.position,
            ..WidgetConfig::default()
        }
    }

    pub fn api_config(&self) -> ChatApiConfig {
        let config = ChatApiConfig::new(self.base_url.clone().unwrap_or_default());
        match self.request_timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
