use config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;
use std::fmt;

/// Runtime settings, read from the process environment (and `.env` when present).
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_ssl_require: bool,
    pub db_pool_max_size: u32,
    pub run_migrations: bool,
    pub admin_key: Option<String>,
    pub host: String,
    pub port: u16,
    pub static_dir: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Self::from_env(Environment::default())
    }

    /// Builds the config from an explicit environment source so tests never touch process env.
    ///
    /// Values stay strings until serde asks for a typed field, so a secret such as `007`
    /// is never reinterpreted as a number.
    pub fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("db_ssl_require", false)?
            .set_default("db_pool_max_size", 10)?
            .set_default("run_migrations", true)?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    /// Connection string handed to the pool, with `sslmode=require` appended when asked for
    /// and the URL does not already pick a mode.
    pub fn connection_url(&self) -> String {
        if !self.db_ssl_require || self.database_url.contains("sslmode=") {
            return self.database_url.clone();
        }
        let sep = if self.database_url.contains('?') { '&' } else { '?' };
        format!("{}{}sslmode=require", self.database_url, sep)
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"<redacted>")
            .field("db_ssl_require", &self.db_ssl_require)
            .field("db_pool_max_size", &self.db_pool_max_size)
            .field("run_migrations", &self.run_migrations)
            .field("admin_key", &self.admin_key.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = AppConfig::from_env(env(&[("DATABASE_URL", "postgres://localhost/listings")])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_pool_max_size, 10);
        assert!(config.run_migrations);
        assert!(!config.db_ssl_require);
        assert!(config.admin_key.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = AppConfig::from_env(env(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("PORT", "8081"),
            ("ADMIN_KEY", "s3cret"),
            ("RUN_MIGRATIONS", "false"),
            ("STATIC_DIR", "public"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8081);
        assert_eq!(config.admin_key.as_deref(), Some("s3cret"));
        assert!(!config.run_migrations);
        assert_eq!(config.static_dir.as_deref(), Some("public"));
    }

    #[test]
    fn numeric_looking_secrets_are_kept_verbatim() {
        let config = AppConfig::from_env(env(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("ADMIN_KEY", "007"),
            ("STATIC_DIR", "2024"),
        ]))
        .unwrap();
        assert_eq!(config.admin_key.as_deref(), Some("007"));
        assert_eq!(config.static_dir.as_deref(), Some("2024"));
    }

    #[test]
    fn typed_fields_still_parse_from_strings() {
        let config = AppConfig::from_env(env(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("PORT", "8080"),
            ("DB_POOL_MAX_SIZE", "4"),
            ("DB_SSL_REQUIRE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_pool_max_size, 4);
        assert!(config.db_ssl_require);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(AppConfig::from_env(env(&[("PORT", "5000")])).is_err());
    }

    #[test]
    fn ssl_mode_is_appended_once() {
        let mut config = AppConfig::from_env(env(&[
            ("DATABASE_URL", "postgres://localhost/listings"),
            ("DB_SSL_REQUIRE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.connection_url(), "postgres://localhost/listings?sslmode=require");

        config.database_url = "postgres://localhost/listings?application_name=api".to_string();
        assert_eq!(
            config.connection_url(),
            "postgres://localhost/listings?application_name=api&sslmode=require"
        );

        config.database_url = "postgres://localhost/listings?sslmode=disable".to_string();
        assert_eq!(config.connection_url(), "postgres://localhost/listings?sslmode=disable");
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = AppConfig::from_env(env(&[
            ("DATABASE_URL", "postgres://user:pw@localhost/listings"),
            ("ADMIN_KEY", "s3cret"),
        ]))
        .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("pw@"));
    }
}
