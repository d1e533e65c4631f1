use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

const JWT_SECRET_ENV: &str = "TUNEHUB_JWT_SECRET";
const STRIPE_WEBHOOK_SECRET_ENV: &str = "STRIPE_WEBHOOK_SECRET";
const MAIL_API_KEY_ENV: &str = "TUNEHUB_MAIL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    database_path: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub premium: PremiumConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Public URL of the API, used to build links in outgoing email.
    pub base_url: String,
    /// Allowed CORS origin for release builds.
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl: String,
    pub bcrypt_cost: u32,
    pub verification_ttl: String,
    pub require_verified_email: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumConfig {
    /// Length of one paid premium period.
    pub period: String,
    pub stripe_webhook_secret: Option<String>,
    /// Maximum age of a signed webhook before it is rejected.
    pub webhook_tolerance: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailMode {
    Log,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub mode: MailMode,
    pub relay_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

fn default_database_path() -> String {
    "~/.local/share/tunehub/tunehub.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            premium: PremiumConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cors_origin: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: "7d".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            verification_ttl: "24h".to_string(),
            require_verified_email: false,
        }
    }
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            period: "30days".to_string(),
            stripe_webhook_secret: None,
            webhook_tolerance: "5m".to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            mode: MailMode::Log,
            relay_url: None,
            api_key: None,
            from: "no-reply@tunehub.local".to_string(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("tunehub").join("config.toml"))
    }

    /// Load config from the default location, or built-in defaults if there is no file.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to `path` (or the default location) unless a file is already there.
    pub fn create_default(path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path().ok_or(eyre!("No config directory on this platform"))?,
        };
        if path.exists() {
            tracing::info!("Config already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .context(format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    fn validate(&self) -> Result<()> {
        Url::parse(&self.server.base_url)
            .context(format!("Invalid server.base_url: {}", self.server.base_url))?;
        if let Some(relay_url) = &self.mail.relay_url {
            Url::parse(relay_url).context(format!("Invalid mail.relay_url: {relay_url}"))?;
        }
        if self.mail.mode == MailMode::Http && self.mail.relay_url.is_none() {
            return Err(eyre!("mail.relay_url is required when mail.mode = \"http\""));
        }
        self.auth.token_ttl()?;
        self.auth.verification_ttl()?;
        self.premium.period()?;
        self.premium.webhook_tolerance()?;
        Ok(())
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database_path)
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value).context(format!("Invalid duration for {field}: {value:?}"))
}

fn secret_or_env(configured: &Option<String>, env_var: &str) -> Option<String> {
    configured
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .filter(|secret| !secret.is_empty())
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Result<Duration> {
        parse_duration("auth.token_ttl", &self.token_ttl)
    }

    pub fn verification_ttl(&self) -> Result<Duration> {
        parse_duration("auth.verification_ttl", &self.verification_ttl)
    }

    /// JWT signing secret from the file, falling back to `TUNEHUB_JWT_SECRET`.
    pub fn jwt_secret(&self) -> Result<String> {
        let secret = secret_or_env(&self.jwt_secret, JWT_SECRET_ENV).ok_or(eyre!(
            "No JWT secret configured. Set auth.jwt_secret or {JWT_SECRET_ENV}"
        ))?;
        if secret.len() < 32 {
            return Err(eyre!("JWT secret must be at least 32 bytes"));
        }
        Ok(secret)
    }
}

impl PremiumConfig {
    pub fn period(&self) -> Result<Duration> {
        parse_duration("premium.period", &self.period)
    }

    pub fn webhook_tolerance(&self) -> Result<Duration> {
        parse_duration("premium.webhook_tolerance", &self.webhook_tolerance)
    }

    /// Stripe signing secret from the file, falling back to `STRIPE_WEBHOOK_SECRET`.
    pub fn stripe_webhook_secret(&self) -> Option<String> {
        secret_or_env(&self.stripe_webhook_secret, STRIPE_WEBHOOK_SECRET_ENV)
    }
}

impl MailConfig {
    pub fn api_key(&self) -> Option<String> {
        secret_or_env(&self.api_key, MAIL_API_KEY_ENV)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.mail.mode, MailMode::Log);
        assert_eq!(
            config.auth.token_ttl().unwrap(),
            Duration::from_secs(7 * 24 * 3600)
        );
        assert_eq!(
            config.premium.period().unwrap(),
            Duration::from_secs(30 * 24 * 3600)
        );
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            database_path = "/tmp/tunehub.db"

            [server]
            port = 8080

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            token_ttl = "2h"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/tunehub.db"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.auth.token_ttl().unwrap(), Duration::from_secs(7200));
        assert_eq!(config.auth.verification_ttl().unwrap(), Duration::from_secs(86400));
        assert_eq!(
            config.auth.jwt_secret().unwrap(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let result = Config::from_toml(
            r#"
            [premium]
            period = "a while"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_http_mail_requires_relay_url() {
        let result = Config::from_toml(
            r#"
            [mail]
            mode = "http"
            "#,
        );
        assert!(result.is_err());

        let config = Config::from_toml(
            r#"
            [mail]
            mode = "http"
            relay_url = "https://mail.example.com/send"
            "#,
        )
        .unwrap();
        assert_eq!(config.mail.mode, MailMode::Http);
    }

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let config = Config::from_toml(
            r#"
            [auth]
            jwt_secret = "short"
            "#,
        )
        .unwrap();
        assert!(config.auth.jwt_secret().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbase_url = \"https://api.example.com\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.base_url, "https://api.example.com");
    }

    #[test]
    fn test_create_default_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let written = Config::create_default(Some(&path)).unwrap();
        assert_eq!(written, path);
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.auth.bcrypt_cost, bcrypt::DEFAULT_COST);

        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();
        Config::create_default(Some(&path)).unwrap();
        assert_eq!(Config::from_file(&path).unwrap().server.port, 9000);
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let serialized = toml::to_string_pretty(&Config::default()).unwrap();
        let config = Config::from_toml(&serialized).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
