//! [`Config`]-related definitions.

use common::Currency;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, Source};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
///
/// Every field has a default, so an empty configuration is a valid one.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: Server,

    /// Booking rules configuration.
    pub service: Service,

    /// Postgres connection configuration.
    pub postgres: Postgres,

    /// Logging configuration.
    pub log: Log,
}

impl Config {
    /// Loads a [`Config`] from the TOML file at the provided `path`, if it
    /// exists, overridden by the `CONF.`-prefixed environment variables
    /// (`CONF.server.port=80`, for example).
    ///
    /// # Errors
    ///
    /// If any of the sources has a malformed value.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let file: Box<dyn Source + Send + Sync> =
            Box::new(config::File::with_name(path.as_ref()).required(false));
        let env: Box<dyn Source + Send + Sync> =
            Box::new(config::Environment::with_prefix("CONF").separator("."));
        Self::from_sources([file, env])
    }

    /// Loads a [`Config`] from the provided sources, the latter ones
    /// overriding the former ones.
    fn from_sources(
        sources: impl IntoIterator<Item = Box<dyn Source + Send + Sync>>,
    ) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(sources.into_iter().collect::<Vec<_>>())
            .build()?
            .try_deserialize()
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Address to listen on.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to listen on.
    #[default(8080)]
    pub port: u16,

    /// Cross-origin requests configuration.
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// Origins allowed to call the API, `*` allowing any.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Booking rules configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Number of random booking codes to draw before giving up on a
    /// reservation.
    #[default(5)]
    pub booking_code_attempts: u8,

    /// [`Currency`] of the payments coming without one.
    #[default(Currency::Inr)]
    pub default_currency: Currency,
}

impl From<Service> for service::Config {
    fn from(conf: Service) -> Self {
        Self {
            booking_code_attempts: conf.booking_code_attempts,
            default_currency: conf.default_currency,
        }
    }
}

/// Postgres connection configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host of the Postgres server.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port of the Postgres server.
    #[default(5432)]
    pub port: u16,

    /// Role to log in as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password of the [`Postgres::user`].
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Database holding the boats and the bookings.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(conf: Postgres) -> Self {
        Self {
            password: Some(conf.password.expose_secret().to_owned()),
            host: Some(conf.host),
            port: Some(conf.port),
            user: Some(conf.user),
            dbname: Some(conf.dbname),
            ..Self::default()
        }
    }
}

/// Logging configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Log {
    /// Maximum level of the logged events, case-insensitive.
    #[default(tracing::Level::INFO)]
    #[serde(deserialize_with = "level")]
    pub level: tracing::Level,
}

/// Deserializes a [`tracing::Level`] from its name.
fn level<'de, D>(deserializer: D) -> Result<tracing::Level, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer)?
        .parse()
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod spec {
    use common::Currency;
    use config::{File, FileFormat, Source};
    use secrecy::ExposeSecret as _;

    use super::Config;

    fn toml(content: &'static str) -> Box<dyn Source + Send + Sync> {
        Box::new(File::from_str(content, FileFormat::Toml))
    }

    #[test]
    fn defaults_when_empty() {
        let conf = Config::from_sources([toml("")]).unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.cors.origins, ["*"]);
        assert_eq!(conf.service.booking_code_attempts, 5);
        assert_eq!(conf.service.default_currency, Currency::Inr);
        assert_eq!(conf.postgres.password.expose_secret(), "postgres");
        assert_eq!(conf.log.level, tracing::Level::INFO);
    }

    #[test]
    fn later_sources_override() {
        let conf = Config::from_sources([
            toml(
                r#"
                [server]
                port = 9000

                [service]
                default_currency = "USD"

                [log]
                level = "debug"
                "#,
            ),
            toml("[server]\nport = 9100"),
        ])
        .unwrap();

        assert_eq!(conf.server.port, 9100);
        assert_eq!(conf.server.host, "0.0.0.0");
        assert_eq!(conf.service.default_currency, Currency::Usd);
        assert_eq!(conf.log.level, tracing::Level::DEBUG);
    }

    #[test]
    fn missing_file_is_optional() {
        let conf = Config::new("missing/config.toml").unwrap();

        assert_eq!(conf.service.booking_code_attempts, 5);
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(Config::from_sources([toml("[log]\nlevel = \"loud\"")])
            .is_err());
    }
}
