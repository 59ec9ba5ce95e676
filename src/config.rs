use std::env;
use std::env::VarError;
use std::str::FromStr;

use anyhow::{bail, Context, Error, Result};
use derive_more::Display;

/// Process configuration, read once from the environment on startup.
///
/// Database settings are read by [tracker_common::database] and only when the postgres store is used.
#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) bind_address: String,
    pub(crate) store: StoreBackend,
}

impl Config {
    pub(crate) fn from_env() -> Result<Config> {
        let bind_address = env::var("BIND_ADDRESS").context("Unable to read mandatory BIND_ADDRESS environment variable")?;

        let store = match env::var("ISSUE_STORE") {
            Ok(value) => value.parse().context("Unable to parse ISSUE_STORE environment variable")?,
            Err(VarError::NotPresent) => StoreBackend::default(),
            Err(VarError::NotUnicode(_)) => bail!("ISSUE_STORE environment variable is not a valid unicode string")
        };

        Ok(Config { bind_address, store })
    }
}

#[derive(Display, Debug, Default, Copy, Clone, Eq, PartialEq)]
pub(crate) enum StoreBackend {
    #[default]
    #[display(fmt = "postgres")]
    Postgres,
    #[display(fmt = "memory")]
    Memory,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Ok(match input.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            _ => bail!("Unknown issue store `{}`, expected `postgres` or `memory`", input)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_backends() {
        assert_eq!("postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert_eq!("Memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongodb".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn defaults_to_postgres() {
        assert_eq!(StoreBackend::default(), StoreBackend::Postgres);
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
    }
}
