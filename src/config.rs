use anyhow::Context;
use hyper::header::HeaderValue;
use std::env;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_PG_PORT: u16 = 5432;

/// Server settings read from the environment.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    /// Origin allowed to make cross-origin requests.
    pub frontend_url: Option<HeaderValue>,
    /// `None` runs on the in-memory store.
    pub postgres: Option<Postgres>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Postgres {
    pub host: String,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
    pub port: u16,
}

impl Postgres {
    pub fn to_config(&self) -> db::Config {
        let mut config = db::Config::new();
        config.host(&self.host).user(&self.user).dbname(&self.dbname).port(self.port);
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `var`. Empty values count as unset.
    pub fn from_lookup(mut var: impl FnMut(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut var = move |key: &str| var(key).filter(|value| !value.is_empty());

        let port = match var("PORT") {
            Some(port) => port.parse().with_context(|| format!("invalid PORT {port:?}"))?,
            None => DEFAULT_PORT,
        };

        let frontend_url = match var("FRONTEND_URL") {
            Some(url) => Some(HeaderValue::try_from(url).context("invalid FRONTEND_URL")?),
            None => None,
        };

        let postgres = match var("PG_HOSTNAME") {
            Some(host) => {
                let user = var("PG_USERNAME").context("PG_USERNAME is required with PG_HOSTNAME")?;
                let dbname = var("PG_DATABASE").context("PG_DATABASE is required with PG_HOSTNAME")?;
                let password = var("PG_PASSWORD");
                let port = match var("PG_PORT") {
                    Some(port) => port.parse().with_context(|| format!("invalid PG_PORT {port:?}"))?,
                    None => DEFAULT_PG_PORT,
                };
                Some(Postgres { host, user, password, dbname, port })
            }
            None => None,
        };

        Ok(Self { port, frontend_url, postgres })
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Postgres};
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<_, _> = pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = lookup(&[("FRONTEND_URL", "")]).unwrap();
        assert_eq!(config.port, 5000);
        assert!(config.frontend_url.is_none());
        assert!(config.postgres.is_none());
    }

    #[test]
    fn postgres_settings() {
        let config = lookup(&[
            ("PORT", "8080"),
            ("FRONTEND_URL", "http://localhost:5173"),
            ("PG_HOSTNAME", "db"),
            ("PG_USERNAME", "quiz"),
            ("PG_DATABASE", "mocktest"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.frontend_url.unwrap(), "http://localhost:5173");
        let expected =
            Postgres { host: "db".into(), user: "quiz".into(), password: None, dbname: "mocktest".into(), port: 5432 };
        assert_eq!(config.postgres.unwrap(), expected);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(lookup(&[("PORT", "http")]).is_err());
        assert!(lookup(&[("PG_HOSTNAME", "db")]).is_err());
        assert!(lookup(&[("PG_HOSTNAME", "db"), ("PG_USERNAME", "u"), ("PG_DATABASE", "d"), ("PG_PORT", "-1")]).is_err());
    }
}
