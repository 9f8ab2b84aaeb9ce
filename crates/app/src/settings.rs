//! Handles settings for the application.
//!
//! Values come from the optional `config/settings.toml` and are overridden by
//! the environment (`BOT_TOKEN`, `ALLOWED_USER_IDS`, `DATABASE_URL`,
//! `SERVER_USERNAME`, `SERVER_PASSWORD`, `TZ`, `LOG_LEVEL`).
use chrono_tz::Tz;
use config::{Config, ConfigBuilder, ConfigError, File, builder::DefaultState};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings";

/// Environment variable to settings key.
const ENV_OVERRIDES: [(&str, &str); 7] = [
    ("BOT_TOKEN", "telegram.token"),
    ("ALLOWED_USER_IDS", "telegram.allowed_users"),
    ("DATABASE_URL", "database.url"),
    ("SERVER_USERNAME", "server.username"),
    ("SERVER_PASSWORD", "server.password"),
    ("TZ", "timezone"),
    ("LOG_LEVEL", "app.level"),
];

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    /// Comma-separated Telegram user ids. Empty lets everybody in.
    pub allowed_users: String,
    pub server_url: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub telegram: Telegram,
    pub timezone: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false));
        Self::build(builder, |name| std::env::var(name).ok())
    }

    fn build(
        builder: ConfigBuilder<DefaultState>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = builder
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.username", "admin")?
            .set_default("server.password", "")?
            .set_default("database.url", "sqlite:./financeiro.db?mode=rwc")?
            .set_default("telegram.token", "")?
            .set_default("telegram.allowed_users", "")?
            .set_default("telegram.server_url", "http://127.0.0.1:3000")?
            .set_default("timezone", "America/Fortaleza")?;
        for (variable, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, lookup(variable))?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Message(
                "BOT_TOKEN is not configured".to_string(),
            ));
        }
        if self.server.password.is_empty() {
            return Err(ConfigError::Message(
                "SERVER_PASSWORD is not configured".to_string(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| ConfigError::Message(format!("invalid timezone {}: {err}", self.timezone)))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use config::FileFormat;

    use super::*;

    fn load(toml: &str, env: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Settings::build(builder, |name| env.get(name).cloned())
    }

    #[test]
    fn defaults_with_required_values() {
        let settings = load("", &[("BOT_TOKEN", "123:abc"), ("SERVER_PASSWORD", "s3cret")])
            .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.address(), "127.0.0.1:3000");
        assert_eq!(settings.server.username, "admin");
        assert_eq!(settings.database.url, "sqlite:./financeiro.db?mode=rwc");
        assert_eq!(settings.telegram.server_url, "http://127.0.0.1:3000");
        assert_eq!(settings.timezone().unwrap(), chrono_tz::America::Fortaleza);
    }

    #[test]
    fn environment_overrides_file() {
        let toml = r#"
            timezone = "Europe/Lisbon"

            [server]
            port = 8080
            password = "from-file"

            [telegram]
            token = "file-token"
            allowed_users = "1"
        "#;
        let settings = load(
            toml,
            &[
                ("BOT_TOKEN", "env-token"),
                ("ALLOWED_USER_IDS", "10,20"),
                ("TZ", "America/Recife"),
            ],
        )
        .unwrap();
        assert_eq!(settings.telegram.token, "env-token");
        assert_eq!(settings.telegram.allowed_users, "10,20");
        assert_eq!(settings.server.password, "from-file");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::America::Recife);
    }

    #[test]
    fn missing_token_or_password_fails() {
        assert!(load("", &[("SERVER_PASSWORD", "s3cret")]).is_err());
        assert!(load("", &[("BOT_TOKEN", "123:abc")]).is_err());
    }

    #[test]
    fn unknown_timezone_fails() {
        let result = load(
            "",
            &[
                ("BOT_TOKEN", "123:abc"),
                ("SERVER_PASSWORD", "s3cret"),
                ("TZ", "Mars/Olympus"),
            ],
        );
        assert!(result.is_err());
    }
}
