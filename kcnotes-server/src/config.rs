use std::{env, fmt::Display, str::FromStr};

use anyhow::{bail, Context};
use tracing::{debug, info};

/// Durata di default dei token: 7 giorni.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_DATABASE_URL: &str = "kcnotes.db";

/// Configurazione del server, letta dall'ambiente all'avvio.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path del file SQLite, URL `sqlite://...` oppure `sqlite::memory:`
    pub database_url: String,
    /// Chiave HMAC per firmare e verificare i token
    pub secret: String,
    pub token_ttl: i64,
}

impl Config {
    /// Carica `.env` (fuori da produzione) e poi legge le variabili d'ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        load_dotenv()?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Solo DATABASE_URL: al runner delle migrazioni non serve il secret.
    pub fn database_url_from_env() -> anyhow::Result<String> {
        load_dotenv()?;
        try_load(&|key: &str| env::var(key).ok(), "DATABASE_URL", DEFAULT_DATABASE_URL.to_string())
    }

    /// Costruisce la config da una funzione di lookup: separata da `from_env`
    /// così i test non devono toccare l'ambiente del processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup("SECRET") {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => bail!("SECRET must be set to a non-empty value"),
        };

        let token_ttl: i64 = try_load(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl <= 0 {
            bail!("TOKEN_TTL_SECS must be positive, got {token_ttl}");
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", "127.0.0.1".to_string())?,
            port: try_load(&lookup, "PORT", 3000)?,
            database_url: try_load(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL.to_string())?,
            secret,
            token_ttl,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Carica `.env` nell'ambiente del processo, tranne quando APP_ENV=production.
fn load_dotenv() -> anyhow::Result<()> {
    if env::var("APP_ENV").is_ok_and(|v| v == "production") {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => return Err(e).context("load .env file"),
    }
    Ok(())
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} value {raw:?}: {e}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
