//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and `TRACKER__*` environment variables, e.g.
//! `TRACKER__SERVER__PORT=8080`.
//!
//! ```toml
//! [app]
//! level = "debug"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "tracker.db" }
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("TRACKER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
