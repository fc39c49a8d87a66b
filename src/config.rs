use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::{deserialize_bool_from_anything, deserialize_number_from_string};
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub name: String,
    pub require_ssl: bool,
}

/// Mail provider selection. `api-based` posts to an HTTP mail API;
/// `smtp` drives a pooled SMTP session directly.
#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EmailProvider {
    ApiBased,
    Smtp,
}

impl Default for EmailProvider {
    fn default() -> Self {
        EmailProvider::Smtp
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailSettings {
    #[serde(default)]
    pub provider: EmailProvider,
    /// Origin address; falls back to `smtp.user` when unset.
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub smtp: SmtpSettings,
    #[serde(
        default = "default_connection_timeout_ms",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub connection_timeout_ms: u64,
    #[serde(
        default = "default_greeting_timeout_ms",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub greeting_timeout_ms: u64,
    #[serde(
        default = "default_socket_timeout_ms",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub socket_timeout_ms: u64,
    #[serde(
        default = "default_pool",
        deserialize_with = "deserialize_bool_from_anything"
    )]
    pub pool: bool,
    #[serde(
        default = "default_max_connections",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub max_connections: u32,
    #[serde(
        default = "default_max_messages",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub max_messages: u32,
    #[serde(
        default = "default_retry_count",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub retry_count: u32,
    #[serde(
        default = "default_retry_base_delay_ms",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub retry_base_delay_ms: u64,
}

#[derive(serde::Deserialize, Clone, Default)]
pub struct SmtpSettings {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(
        default = "default_smtp_port",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub port: u16,
    /// Implicit TLS. Defaults to true iff the port is 465.
    #[serde(default, deserialize_with = "deserialize_option_bool_from_anything")]
    pub secure: Option<bool>,
    /// Named provider preset overriding host, port and TLS mode.
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<Secret<String>>,
}

fn default_api_base_url() -> String {
    String::from("https://api.sendgrid.com/v3")
}

fn default_smtp_port() -> u16 {
    587
}

fn default_connection_timeout_ms() -> u64 {
    15000
}

fn default_greeting_timeout_ms() -> u64 {
    10000
}

fn default_socket_timeout_ms() -> u64 {
    20000
}

fn default_pool() -> bool {
    true
}

fn default_max_connections() -> u32 {
    3
}

fn default_max_messages() -> u32 {
    50
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    750
}

// Environment variables arrive as strings, so Option<bool> needs the same
// treatment serde-aux gives plain bools.
fn deserialize_option_bool_from_anything<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_bool_from_anything")] bool);

    let wrapped: Option<Wrapper> = serde::Deserialize::deserialize(deserializer)?;

    Ok(wrapped.map(|Wrapper(value)| value))
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_db_options(&self) -> PgConnectOptions {
        self.database.get_db_options()
    }

    pub fn email(&self) -> &EmailSettings {
        &self.email
    }

    pub fn get_db_name(&self) -> String {
        self.database.get_name()
    }

    pub fn get_db_username(&self) -> String {
        self.database.get_username()
    }

    pub fn set_db_name(&mut self, db_name: String) {
        self.database.set_name(db_name)
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }

    pub fn set_email_api_base_url(&mut self, new_base_url: String) {
        self.email.api_base_url = new_base_url
    }
}

impl DatabaseSettings {
    pub fn get_db_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let mut db_options = PgConnectOptions::new()
            .host(&self.host)
            .password(&self.password.expose_secret())
            .username(&self.username)
            .port(self.port)
            .database(&self.name)
            .ssl_mode(ssl_mode);

        db_options.log_statements(tracing::log::LevelFilter::Trace);

        db_options
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    pub fn set_name(&mut self, new_db_name: String) {
        self.name = new_db_name
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl EmailSettings {
    pub fn get_from_address(&self) -> Option<String> {
        self.from_address.clone().or_else(|| self.smtp.user.clone())
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().expect("Failed to determine the current directory");
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_EMAIL__RETRY_COUNT would set Settings.email.retry_count
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
