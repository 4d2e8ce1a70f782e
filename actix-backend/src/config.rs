use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

/// How bearer tokens from the identity provider are checked.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub secret: String,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub identity: IdentityConfig,
    pub billing_secret: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(var("PORT"), "PORT", 8080)?;
        let max_connections = parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;

        let storage = match var("STORAGE").as_deref() {
            None | Some("postgres") => StorageKind::Postgres,
            Some("memory") => StorageKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "STORAGE", value: other.to_string() });
            }
        };

        let database_url = var("DATABASE_URL");
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let identity = IdentityConfig {
            secret: var("IDENTITY_JWT_SECRET").ok_or(ConfigError::Missing("IDENTITY_JWT_SECRET"))?,
            issuer: var("IDENTITY_JWT_ISSUER"),
        };

        Ok(Self {
            host,
            port,
            storage,
            database_url,
            max_connections,
            identity,
            billing_secret: var("BILLING_SECRET"),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_for_memory_storage() {
        let config = load(&[("STORAGE", "memory"), ("IDENTITY_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.identity.issuer, None);
        assert_eq!(config.billing_secret, None);
    }

    #[test]
    fn postgres_needs_a_database_url() {
        assert!(matches!(
            load(&[("IDENTITY_JWT_SECRET", "s3cret")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        let config = load(&[
            ("IDENTITY_JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/playground"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageKind::Postgres);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn rejects_missing_secret_and_bad_values() {
        assert!(matches!(
            load(&[("STORAGE", "memory"), ("IDENTITY_JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("IDENTITY_JWT_SECRET"))
        ));
        assert!(matches!(
            load(&[("STORAGE", "memory"), ("IDENTITY_JWT_SECRET", "s"), ("PORT", "http")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("STORAGE", "sqlite"), ("IDENTITY_JWT_SECRET", "s")]),
            Err(ConfigError::Invalid { name: "STORAGE", .. })
        ));
    }
}
