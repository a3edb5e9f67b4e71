use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Immutable application settings, loaded once at startup.
///
/// Sources, later ones winning: built-in defaults, `appsettings.json`,
/// `appsettings.{environment}.json`, `APP__*` environment variables,
/// then the plain `HOST` / `PORT` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub connection_strings: HashMap<String, String>,
    pub health: HealthSettings,
    pub diagnostics: DiagnosticsSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Upper bound for a single health check.
    pub timeout_ms: u64,
}

impl HealthSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self { timeout_ms: 5_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Largest request body the exception guard will buffer.
    pub max_buffered_body_bytes: usize,
    /// How much of the request body is attached to a fault log entry.
    pub max_logged_body_bytes: usize,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            max_buffered_body_bytes: 10 * 1024 * 1024,
            max_logged_body_bytes: 4 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Where uploaded files land. Falls back to the system temp directory.
    pub directory: Option<PathBuf>,
}

impl UploadSettings {
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl Settings {
    /// Loads settings from the content root and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let content_root = content_root(std::env::var("APP_CONTENT_ROOT").ok());
        let environment = environment_name(std::env::var("APP_ENVIRONMENT").ok());

        let mut settings = Self::from_sources(&content_root, &environment, app_environment())?;
        settings.apply_overrides(std::env::var("HOST").ok(), std::env::var("PORT").ok())?;
        Ok(settings)
    }

    /// Plain `HOST` / `PORT` variables win over every other source.
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port.parse().context("PORT must be a valid number")?;
        }
        Ok(())
    }

    /// Builds settings from explicit sources; `load` wires in the real ones.
    pub fn from_sources(
        content_root: &Path,
        environment: &str,
        env_source: Environment,
    ) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Settings::default())
            .context("failed to build default settings")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(content_root.join("appsettings.json")).required(true))
            .add_source(
                File::from(content_root.join(format!("appsettings.{environment}.json")))
                    .required(false),
            )
            .add_source(env_source)
            .build()
            .with_context(|| {
                format!(
                    "failed to load configuration from {} \
                     (set APP_CONTENT_ROOT to the directory holding appsettings.json)",
                    content_root.display()
                )
            })?;

        config
            .try_deserialize()
            .context("configuration has an invalid shape")
    }
}

/// Directory holding the `appsettings*.json` files; the working directory by default.
fn content_root(configured: Option<String>) -> PathBuf {
    configured
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn environment_name(configured: Option<String>) -> String {
    configured.unwrap_or_else(|| "Production".to_string())
}

/// `APP__SECTION__KEY` style variables, e.g. `APP__CONNECTION_STRINGS__DEFAULT`.
fn app_environment() -> Environment {
    Environment::with_prefix("APP")
        .prefix_separator("__")
        .separator("__")
}
