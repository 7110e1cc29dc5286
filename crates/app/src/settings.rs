//! Handles settings for the application.
//!
//! Sources, lowest priority first:
//!
//! - the TOML file (`config/settings.toml` unless `--config` says otherwise);
//! - `GASTOS_*` environment variables, `__` between nested keys
//!   (e.g. `GASTOS_TELEGRAM__TOKEN`);
//! - `TELEGRAM_TOKEN` for the bot token;
//! - command line flags.
use std::time::Duration;

use clap::Parser;
use config::{Config, ConfigError, Environment, File, Map, Value};
use serde::{Deserialize, Deserializer};

const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";
const TOKEN_ENV: &str = "TELEGRAM_TOKEN";
const ENV_PREFIX: &str = "GASTOS";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Telegram {
    pub token: String,
    #[serde(deserialize_with = "one_or_many_ids")]
    pub allowed_users: Vec<u64>,
    pub session_ttl_secs: u64,
}

impl Default for Telegram {
    fn default() -> Self {
        Self {
            token: String::new(),
            allowed_users: Vec::new(),
            session_ttl_secs: 15 * 60,
        }
    }
}

/// `GASTOS_TELEGRAM__ALLOWED_USERS=5` arrives as a single number, `=1,2` as
/// a list of strings.
fn one_or_many_ids<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value.clone().into_array() {
        Ok(items) => items,
        Err(_) => vec![value],
    };
    items
        .into_iter()
        .map(|item| item.into_uint().map_err(serde::de::Error::custom))
        .collect()
}

impl Telegram {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub path: String,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            path: "data.json".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub telegram: Telegram,
    pub ledger: Ledger,
}

#[derive(Debug, Parser)]
#[command(name = "gastos", version, about = "Shared expense tracker bot")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the ledger file path.
    #[arg(long)]
    data: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        Self::from_sources(
            config_path,
            None,
            std::env::var(TOKEN_ENV).ok(),
            args.data,
        )
    }

    /// `env` replaces the process environment when set.
    fn from_sources(
        config_path: &str,
        env: Option<Map<String, String>>,
        token: Option<String>,
        data: Option<String>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_users")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("telegram.token", token.filter(|t| !t.trim().is_empty()))?
            .set_override_option("ledger.path", data)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.trim().is_empty() {
            return Err(ConfigError::Message(format!(
                "missing telegram token: set {TOKEN_ENV} or telegram.token in the settings file"
            )));
        }
        if self.telegram.session_ttl_secs == 0 {
            return Err(ConfigError::Message(
                "telegram.session_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.ledger.path.trim().is_empty() {
            return Err(ConfigError::Message("ledger.path is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn write_config(name: &str, body: &str) -> String {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_settings");
        std::fs::create_dir_all(&root).unwrap();
        let path = root.join(format!("{name}.toml"));
        std::fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    #[test]
    fn missing_token_fails_fast() {
        let err = Settings::from_sources("does/not/exist.toml", None, None, None).unwrap_err();
        assert!(err.to_string().contains("missing telegram token"));
    }

    #[test]
    fn token_from_environment_is_enough() {
        let settings =
            Settings::from_sources("does/not/exist.toml", None, Some("123:abc".to_string()), None)
                .unwrap();
        assert_eq!(settings.telegram.token, "123:abc");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.ledger.path, "data.json");
        assert_eq!(settings.telegram.session_ttl(), Duration::from_secs(900));
        assert!(settings.telegram.allowed_users.is_empty());
    }

    #[test]
    fn file_values_are_read_and_overridden() {
        let path = write_config(
            "full",
            r#"
[app]
level = "debug"

[telegram]
token = "from-file"
allowed_users = [1, 2]
session_ttl_secs = 60

[ledger]
path = "state/ledger.json"
"#,
        );

        let settings = Settings::from_sources(&path, None, None, None).unwrap();
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.telegram.token, "from-file");
        assert_eq!(settings.telegram.allowed_users, vec![1, 2]);
        assert_eq!(settings.ledger.path, "state/ledger.json");

        let settings = Settings::from_sources(
            &path,
            None,
            Some("from-env".to_string()),
            Some("other.json".to_string()),
        )
        .unwrap();
        assert_eq!(settings.telegram.token, "from-env");
        assert_eq!(settings.ledger.path, "other.json");
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn prefixed_environment_variables_are_read() {
        let settings = Settings::from_sources(
            "does/not/exist.toml",
            env(&[
                ("GASTOS_TELEGRAM__TOKEN", "from-env"),
                ("GASTOS_TELEGRAM__ALLOWED_USERS", "1,2"),
                ("GASTOS_TELEGRAM__SESSION_TTL_SECS", "60"),
                ("GASTOS_LEDGER__PATH", "env/ledger.json"),
                ("GASTOS_APP__LEVEL", "debug"),
            ]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(settings.telegram.token, "from-env");
        assert_eq!(settings.telegram.allowed_users, vec![1, 2]);
        assert_eq!(settings.telegram.session_ttl(), Duration::from_secs(60));
        assert_eq!(settings.ledger.path, "env/ledger.json");
        assert_eq!(settings.app.level, "debug");
    }

    #[test]
    fn single_allowed_user_from_environment() {
        let settings = Settings::from_sources(
            "does/not/exist.toml",
            env(&[
                ("GASTOS_TELEGRAM__TOKEN", "t"),
                ("GASTOS_TELEGRAM__ALLOWED_USERS", "5"),
            ]),
            None,
            None,
        )
        .unwrap();
        assert_eq!(settings.telegram.allowed_users, vec![5]);
    }

    #[test]
    fn double_underscore_after_prefix_is_not_read() {
        let err = Settings::from_sources(
            "does/not/exist.toml",
            env(&[("GASTOS__TELEGRAM__TOKEN", "t")]),
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing telegram token"));
    }

    #[test]
    fn telegram_token_beats_prefixed_variable() {
        let settings = Settings::from_sources(
            "does/not/exist.toml",
            env(&[("GASTOS_TELEGRAM__TOKEN", "prefixed")]),
            Some("plain".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(settings.telegram.token, "plain");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let path = write_config(
            "zero_ttl",
            "[telegram]\ntoken = \"t\"\nsession_ttl_secs = 0\n",
        );
        assert!(Settings::from_sources(&path, None, None, None).is_err());
    }
}
