use crate::chat::Theme;
use crate::llm::{LlmSettings, Provider};
use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

/// Prefix of environment variables mapped onto config keys, e.g. `CHATBOT_SERVER__PORT`.
pub const ENV_PREFIX: &str = "CHATBOT";

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat service answering `POST /chat/`
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, env = "PORT")]
        port: Option<u16>,
    },
    /// Open the terminal chat client (default)
    Chat {
        /// Chat endpoint URL
        #[arg(long, env = "CHAT_ENDPOINT")]
        endpoint: Option<String>,

        /// Start in the light theme
        #[arg(long)]
        light: bool,
    },
}

impl Cli {
    /// The requested command, falling back to the chat client.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat {
            endpoint: None,
            light: false,
        })
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Whole-request deadline for `POST /chat/`.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub theme: Theme,
    /// Where `chat` mode writes its logs; the terminal belongs to the UI.
    pub log_file: String,
}

#[derive(Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("system_prompt", &self.system_prompt)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .finish()
    }
}

impl LlmConfig {
    /// Driver settings for the upstream API.
    ///
    /// Fails when no API key is configured, since every supported provider
    /// rejects anonymous requests.
    pub fn settings(&self) -> Result<LlmSettings, ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Message("llm.base_url cannot be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Message("llm.model cannot be empty".to_string()));
        }
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Message(
                    "Missing API key: set GROQ_API_KEY or llm.api_key".to_string(),
                )
            })?;

        Ok(LlmSettings {
            base_url: self.base_url.clone(),
            api_key: Some(api_key),
            model: self.model.clone(),
            provider: Provider::detect_from_url(&self.base_url),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        })
    }
}

impl AppConfig {
    /// Parse `args` as a command line and build the configuration from it.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the layered configuration.
    ///
    /// Priority: CLI flag > `CHATBOT_` env var > config file > provider key env var > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Defaults
        builder = builder
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.request_timeout_secs", 60)?
            .set_default("client.endpoint", crate::chat::client::DEFAULT_ENDPOINT)?
            .set_default("client.theme", "dark")?
            .set_default("client.log_file", "ai-chatbot.log")?
            .set_default("llm.base_url", "https://api.groq.com/openai")?
            .set_default("llm.model", "llama-3.1-8b-instant")?
            .set_default("llm.system_prompt", "You are a useful AI assistant.")?
            .set_default("llm.temperature", 1.0)?
            .set_default("llm.max_tokens", 1024)?
            .set_default("llm.top_p", 1.0)?;

        // 2. Conventional provider key variables, lowest priority after defaults
        for var in ["GROQ_API_KEY", "LLM_API_KEY"] {
            if let Ok(key) = env::var(var) {
                if !key.trim().is_empty() {
                    builder = builder.set_default("llm.api_key", key)?;
                    break;
                }
            }
        }

        // 3. Config file: explicit path, else ./config.yaml when present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(
                File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false),
            ),
        };

        // 4. Prefixed environment variables, e.g. CHATBOT_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 5. CLI overrides (clap already folded in PORT / CHAT_ENDPOINT)
        match &cli.command {
            Some(Command::Serve { host, port }) => {
                if let Some(host) = host {
                    builder = builder.set_override("server.host", host.as_str())?;
                }
                if let Some(port) = port {
                    builder = builder.set_override("server.port", i64::from(*port))?;
                }
            }
            Some(Command::Chat { endpoint, light }) => {
                if let Some(endpoint) = endpoint {
                    builder = builder.set_override("client.endpoint", endpoint.as_str())?;
                }
                if *light {
                    builder = builder.set_override("client.theme", "light")?;
                }
            }
            None => {}
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }
}
