use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use kcnotes_core::now_timestamp;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

pub const MEMORY_URL: &str = "sqlite::memory:";

/// Una migrazione: nome univoco registrato nella tabella `migrations` e DDL da applicare.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS migrations (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        name       TEXT NOT NULL UNIQUE,
        applied_at TEXT NOT NULL
    );"#;

/// Migrazioni in ordine di applicazione. Non riordinare: il nome è la chiave di tracking.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "0001_create_users",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT NOT NULL UNIQUE,
            password   TEXT NOT NULL,
            created_at TEXT NOT NULL
        );"#,
    },
    Migration {
        name: "0002_create_notes",
        sql: r#"
        CREATE TABLE IF NOT EXISTS notes (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            title      TEXT NOT NULL,
            content    TEXT NOT NULL,
            user_id    INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        );"#,
    },
    Migration {
        name: "0003_index_notes_user_id",
        sql: "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes(user_id);",
    },
];

// Dato un percorso di file, restituisce un URL SQLite valido. Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite://{}", s))
}

/// Normalizza il valore di DATABASE_URL: path nudo, URL `sqlite://` oppure database in memoria.
pub fn build_sqlite_url(raw: &str) -> anyhow::Result<String> {
    if raw == MEMORY_URL {
        return Ok(raw.to_string());
    }
    // Rimuovi il prefisso "sqlite://" se presente, per ottenere il percorso del file.
    let path_part = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    sqlite_url_for_path(&PathBuf::from(path_part))
}

/// Apre l'unico handle condiviso verso il database.
///
/// Il pool è limitato a una connessione: tutte le richieste concorrenti passano dallo
/// stesso handle, e un database in memoria resta vivo finché il pool non viene chiuso.
pub async fn connect_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parse sqlite url {}", db_url))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("connect to sqlite via {}", db_url))?;
    Ok(pool)
}

/// Applica le migrazioni non ancora registrate e restituisce i nomi di quelle applicate.
///
/// Ogni migrazione gira in una transazione insieme alla sua riga di tracking, quindi una
/// seconda esecuzione non fa nulla. Un errore qui è fatale per il chiamante.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<Vec<&'static str>> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("create migrations table")?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        let done: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations WHERE name = ?")
            .bind(m.name)
            .fetch_one(pool)
            .await
            .with_context(|| format!("check migration {}", m.name))?;
        if done > 0 {
            debug!("migration {} already applied", m.name);
            continue;
        }

        let mut tx = pool.begin().await.context("begin migration transaction")?;
        sqlx::query(m.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("apply migration {}", m.name))?;
        sqlx::query("INSERT INTO migrations (name, applied_at) VALUES (?, ?)")
            .bind(m.name)
            .bind(now_timestamp())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("record migration {}", m.name))?;
        tx.commit()
            .await
            .with_context(|| format!("commit migration {}", m.name))?;

        info!("Applied migration {}", m.name);
        applied.push(m.name);
    }
    Ok(applied)
}
