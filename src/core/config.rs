use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use sqlx::mysql::MySqlConnectOptions;
use sqlx::ConnectOptions;

/// `db` selects the MySQL engine; any other value selects the file engine.
const STORAGE_TYPE_VAR: &str = "HBNB_TYPE_STORAGE";

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub mysql: Option<MySqlConfig>,
}

impl AppConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| config::ConfigError::Message(format!("Failed to find the current dir: {}", e)))?;
        let config_dir = base_path.join("src/core/configurations");

        let app_environment: Environment = std::env::var("HBNB_APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(config::ConfigError::Message)?;

        let configurations = config::Config::builder()
            .add_source(
                config::File::from(config_dir.join(app_environment.as_str())).required(true),
            )
            .add_source(
                config::Environment::with_prefix("HBNB")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "storage.engine",
                engine_override(std::env::var(STORAGE_TYPE_VAR).ok()),
            )?
            .build()?;

        configurations.try_deserialize()
    }
}

/// Maps the raw `HBNB_TYPE_STORAGE` value to an engine name, if it is set.
fn engine_override(value: Option<String>) -> Option<&'static str> {
    value.map(|v| if v == "db" { "db" } else { "file" })
}

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngine {
    #[default]
    File,
    Db,
}

#[derive(Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub engine: StorageEngine,
    #[serde(default = "default_file_path")]
    pub file_path: String,
}

fn default_file_path() -> String {
    "file.json".to_string()
}

#[derive(Deserialize, Clone)]
pub struct MySqlConfig {
    pub username: String,
    pub password: Secret<String>,
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl MySqlConfig {
    pub fn connect(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .database(&self.database_name);

        options.log_statements(tracing::log::LevelFilter::Trace)
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not supported environment. Use either `local` or `production` ",
                other
            )),
        }
    }
}
