//! Random demographic lookups against the data-synthesis database.
//!
//! Each lookup picks one random row from a pre-populated table; the queries live in `sql/`.

use sqlx_core::pool::PoolOptions;
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnectOptions, PgPool, Postgres};
use std::time::Duration;

const FIRST_NAME_SQL: &str = include_str!("../sql/firstname.sql");
const LAST_NAME_SQL: &str = include_str!("../sql/lastname.sql");
const ZIPCODE_SQL: &str = include_str!("../sql/zipcode.sql");
const ADDRESS_SQL: &str = include_str!("../sql/address.sql");
const PHONE_NUMBER_SQL: &str = include_str!("../sql/phonenumber.sql");
const DATE_OF_BIRTH_SQL: &str = include_str!("../sql/dateofbirth.sql");
const SSN_SQL: &str = include_str!("../sql/ssn.sql");

const DEFAULT_PORT: u16 = 5432;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("DS_DB_PORT '{0}' is not a valid port")]
    InvalidPort(String),

    #[error("lookup database error: {0}")]
    Database(#[from] sqlx_core::Error),

    #[error("lookup '{0}' returned no rows")]
    EmptyLookup(&'static str),
}

/// Connection settings for the lookup database (`DS_DB_*`).
#[derive(Clone)]
pub struct LookupConfig {
    pub host: String,
    pub user: String,
    pub database: String,
    pub password: Option<String>,
    pub port: u16,
}

impl std::fmt::Debug for LookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl LookupConfig {
    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::MissingEnv`] if host, user or database is unset, and
    /// [`SeedError::InvalidPort`] for a malformed port.
    pub fn from_env() -> Result<Self, SeedError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from an arbitrary key lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// As [`LookupConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(SeedError::MissingEnv(key));

        let port = match get("DS_DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| SeedError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: require("DS_DB_HOST")?,
            user: require("DS_DB_USER")?,
            database: require("DS_DB_DATABASE")?,
            password: get("DS_DB_PASSWORD"),
            port,
        })
    }
}

/// A postal address drawn from the lookup tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostalAddress {
    pub street: String,
    pub street2: Option<String>,
    pub city: String,
    pub state_code: String,
    pub zip_code: String,
}

/// A synthetic person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    /// `M` or `F` as stored in the name table.
    pub gender_code: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: String,
    /// E.164, e.g. `+14045551234`.
    pub phone: String,
    pub ssn: Option<String>,
    pub address: PostalAddress,
}

impl Person {
    /// `{first initial}{last name}@example.com`, lower-cased.
    pub fn email(&self) -> String {
        let initial: String = self
            .first_name
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
            .unwrap_or_default();
        format!("{initial}{}@example.com", self.last_name.to_lowercase())
    }

    pub fn is_male(&self) -> bool {
        self.gender_code.as_deref() == Some("M")
    }
}

/// Format a US phone number as E.164 (`+1` followed by the digits without dashes).
pub fn format_phone(area_code: &str, number: &str) -> String {
    format!("+1{}{}", area_code.trim(), number.trim().replace('-', ""))
}

/// Handle to the lookup database.
pub struct LookupDb {
    pool: PgPool,
}

impl LookupDb {
    /// Connect to the lookup database.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Database`] if the connection cannot be established.
    pub async fn connect(config: &LookupConfig) -> Result<Self, SeedError> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database);
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        tracing::info!(host = %config.host, database = %config.database, "connecting to lookup database");
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Draw one random person.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Database`] on query failure and [`SeedError::EmptyLookup`] if a table
    /// has no rows.
    pub async fn random_person(&self) -> Result<Person, SeedError> {
        let (first_name, gender_code): (String, Option<String>) =
            self.one("first name", FIRST_NAME_SQL).await?;
        let (last_name,): (String,) = self.one("last name", LAST_NAME_SQL).await?;
        let (street, street2): (String, Option<String>) = self.one("address", ADDRESS_SQL).await?;
        let (zip_code, city, state_code): (String, String, String) =
            self.one("zip code", ZIPCODE_SQL).await?;
        let (area_code, number): (String, String) =
            self.one("phone number", PHONE_NUMBER_SQL).await?;
        let (birth_date,): (String,) = self.one("date of birth", DATE_OF_BIRTH_SQL).await?;
        let (ssn,): (Option<String>,) = self.one("ssn", SSN_SQL).await?;

        Ok(Person {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            gender_code: gender_code.map(|g| g.trim().to_uppercase()),
            birth_date,
            phone: format_phone(&area_code, &number),
            ssn,
            address: PostalAddress {
                street,
                street2: street2.filter(|s| !s.trim().is_empty()),
                city,
                state_code,
                zip_code,
            },
        })
    }

    async fn one<T>(&self, what: &'static str, sql: &'static str) -> Result<T, SeedError>
    where
        T: for<'r> sqlx_core::from_row::FromRow<'r, sqlx_postgres::PgRow> + Send + Unpin,
    {
        query_as(sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(SeedError::EmptyLookup(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<LookupConfig, SeedError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LookupConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn lookup_config_defaults_port() {
        let config = config_from(&[
            ("DS_DB_HOST", "db"),
            ("DS_DB_USER", "synth"),
            ("DS_DB_DATABASE", "datasynthesis"),
            ("DS_DB_PASSWORD", "pw"),
        ])
        .expect("config");
        assert_eq!(config.port, 5432);
        assert_eq!(config.password.as_deref(), Some("pw"));
        assert!(!format!("{config:?}").contains("pw"));
    }

    #[test]
    fn lookup_config_requires_host() {
        let err = config_from(&[("DS_DB_USER", "u"), ("DS_DB_DATABASE", "d")]).expect_err("host");
        assert!(matches!(err, SeedError::MissingEnv("DS_DB_HOST")));
    }

    #[test]
    fn lookup_config_rejects_bad_port() {
        let err = config_from(&[
            ("DS_DB_HOST", "db"),
            ("DS_DB_USER", "u"),
            ("DS_DB_DATABASE", "d"),
            ("DS_DB_PORT", "postgres"),
        ])
        .expect_err("port");
        assert!(matches!(err, SeedError::InvalidPort(_)));
    }

    #[test]
    fn phone_numbers_are_e164() {
        assert_eq!(format_phone("404", "555-1234"), "+14045551234");
        assert_eq!(format_phone("678", "55-51-234"), "+16785551234");
    }

    #[test]
    fn email_uses_initial_and_last_name() {
        let person = Person {
            first_name: "Mary Ann".into(),
            last_name: "O'Neil".into(),
            gender_code: Some("F".into()),
            birth_date: "1980-01-01".into(),
            phone: "+14045551234".into(),
            ssn: None,
            address: PostalAddress {
                street: "1 Main St".into(),
                street2: None,
                city: "Atlanta".into(),
                state_code: "GA".into(),
                zip_code: "30303".into(),
            },
        };
        assert_eq!(person.email(), "mo'neil@example.com");
        assert!(!person.is_male());
    }
}
