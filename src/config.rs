use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::widget::WidgetSettings;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "ai-sidebar.yaml";

/// Prefix of environment overrides, e.g. `AI_SIDEBAR_SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "AI_SIDEBAR";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", global = true)]
    pub port: Option<u16>,

    /// Server base URL used by the terminal chat
    #[arg(long, env = "AI_SIDEBAR_URL", global = true)]
    pub server_url: Option<String>,

    /// Gemini API key; selects the Gemini backend when set
    #[arg(long, env = "GOOGLE_GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub gemini_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Chat with a running server from the terminal
    Chat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub security: SecurityConfig,
    pub widget: WidgetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssistantProvider {
    Simulated,
    Gemini,
}

#[derive(Deserialize, Clone)]
pub struct AssistantConfig {
    pub provider: AssistantProvider,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    pub csrf_cookie_name: String,
    pub csrf_header_name: String,
    pub csrf_field_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub server_url: String,
    pub focus_delay_ms: u64,
    pub welcome_message: String,
}

impl WidgetConfig {
    #[must_use]
    pub fn settings(&self) -> WidgetSettings {
        WidgetSettings {
            welcome_message: self.welcome_message.clone(),
            focus_delay: Duration::from_millis(self.focus_delay_ms),
        }
    }
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Priority: CLI flag (or its env var) > `AI_SIDEBAR_*` env > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let defaults = WidgetSettings::default();

        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.static_dir", "static")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("assistant.provider", "simulated")?
            .set_default("assistant.model", "gemini-1.5-pro")?
            .set_default(
                "assistant.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("security.csrf_cookie_name", "csrftoken")?
            .set_default("security.csrf_header_name", "X-CSRFToken")?
            .set_default("security.csrf_field_name", "csrfmiddlewaretoken")?
            .set_default("widget.server_url", "http://127.0.0.1:8000")?
            .set_default(
                "widget.focus_delay_ms",
                i64::try_from(defaults.focus_delay.as_millis()).unwrap_or(300),
            )?
            .set_default("widget.welcome_message", defaults.welcome_message)?;

        match &cli.config {
            Some(path) => builder = builder.add_source(File::with_name(path)),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(url) = &cli.server_url {
            builder = builder.set_override("widget.server_url", url.as_str())?;
        }
        if let Some(key) = cli.gemini_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            builder = builder
                .set_override("assistant.api_key", key)?
                .set_override("assistant.provider", "gemini")?;
        }

        builder.build()?.try_deserialize()
    }
}
