//! Configuration file support for starsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STARSYNC_`, e.g., `STARSYNC_DATABASE_URL`)
//! 3. Config file (./starsync.toml, then ~/.config/starsync/config.toml)
//! 4. Unprefixed variables understood for compatibility (`GITHUB_TOKEN`,
//!    `OPENAI_API_KEY`, ...), used only where nothing above set a value
//! 5. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/starsync/starsync.db"  # optional, this is the default
//!
//! [github]
//! token = "ghp_..."  # or use STARSYNC_GITHUB_TOKEN env var
//! user = "octocat"   # sync someone else's stars
//!
//! [llm]
//! key = "sk-..."
//! url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! language = "English"
//!
//! [sync]
//! concurrency = 5
//! archive = true
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use starsync::summarize::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use starsync::sync::{DEFAULT_CONCURRENCY, DEFAULT_TARGET_LANGUAGE};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Summarizer configuration.
    pub llm: LlmConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    pub token: Option<String>,
    /// Whose stars to sync. Defaults to the token owner.
    pub user: Option<String>,
}

/// OpenAI-compatible summarizer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key.
    pub key: Option<String>,
    /// Base URL of the chat completions API.
    pub url: String,
    /// Model name.
    pub model: String,
    /// Language summaries are written in.
    pub language: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            key: None,
            url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: DEFAULT_TARGET_LANGUAGE.to_string(),
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Maximum concurrent summarizer calls and writes.
    pub concurrency: usize,
    /// Whether records that disappeared from the stars are archived.
    pub archive: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            archive: true,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/starsync/config.toml)
    /// 3. Local config file (./starsync.toml)
    /// 4. Environment variables with STARSYNC_ prefix
    ///
    /// Unprefixed compatibility variables then fill whatever is still unset.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("starsync.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./starsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., STARSYNC_LLM_MODEL -> llm.model
        builder = builder.add_source(
            Environment::with_prefix("STARSYNC")
                .separator("_")
                .try_parsing(true),
        );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_compat_env(|name| std::env::var(name).ok());
        config
    }

    /// Fill unset values from the unprefixed variables.
    ///
    /// Values with a built-in default count as unset while they still hold it.
    pub fn apply_compat_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.github.token.is_none() {
            self.github.token = lookup("GITHUB_TOKEN");
        }
        if self.github.user.is_none() {
            self.github.user = lookup("GITHUB_USERNAME");
        }
        if self.llm.key.is_none() {
            self.llm.key = lookup("OPENAI_API_KEY");
        }
        if self.llm.url == DEFAULT_BASE_URL
            && let Some(url) = lookup("OPENAI_BASE_URL")
        {
            self.llm.url = url;
        }
        if self.llm.model == DEFAULT_MODEL
            && let Some(model) = lookup("OPENAI_MODEL")
        {
            self.llm.model = model;
        }
        if self.llm.language == DEFAULT_TARGET_LANGUAGE
            && let Some(language) = lookup("SUMMARY_LANGUAGE")
        {
            self.llm.language = language;
        }
        if self.sync.concurrency == DEFAULT_CONCURRENCY
            && let Some(concurrency) = lookup("SYNC_CONCURRENCY")
        {
            match concurrency.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.sync.concurrency = n,
                _ => tracing::warn!(value = %concurrency, "Ignoring invalid SYNC_CONCURRENCY"),
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("starsync.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "starsync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/starsync` or `~/.local/state/starsync`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "starsync").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
