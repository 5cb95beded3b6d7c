use kcnotes_core::{now_timestamp, Note, User};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Riga della tabella `users` con l'hash della password; non va mai serializzata verso il client.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// Accesso al database, costruito sull'handle condiviso aperto all'avvio.
///
/// Nessuna transazione avvolge le sequenze check-then-write: due signup concorrenti con
/// lo stesso username possono correre, e il vincolo UNIQUE fa fallire il secondo insert.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

const NOTE_COLUMNS: &str = "id, title, content, user_id, created_at";

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        created_at: row.try_get("created_at")?,
    })
}

fn note_from_row(row: &SqliteRow) -> Result<Note, sqlx::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ----- users -----

    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, sqlx::Error> {
        let created_at = now_timestamp();
        let id = sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(password_hash)
            .bind(&created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(User { id, username: username.to_string(), created_at })
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        let row = sqlx::query("SELECT id, username, password, created_at FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| -> Result<UserRecord, sqlx::Error> {
            Ok(UserRecord {
                user: user_from_row(&r)?,
                password_hash: r.try_get("password")?,
            })
        })
        .transpose()
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query("SELECT id, username, created_at FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|r| user_from_row(&r))
            .transpose()
    }

    pub async fn count_users_named(&self, username: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
    }

    // ----- notes -----

    /// Tutte le note di tutti gli utenti.
    pub async fn list_notes(&self) -> Result<Vec<Note>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(note_from_row).collect()
    }

    pub async fn notes_for_user(&self, user_id: i64) -> Result<Vec<Note>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY id"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(note_from_row).collect()
    }

    pub async fn create_note(&self, user_id: i64, title: &str, content: &str) -> Result<Note, sqlx::Error> {
        let id = sqlx::query("INSERT INTO notes (title, content, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(title)
            .bind(content)
            .bind(user_id)
            .bind(now_timestamp())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        // rileggo la riga per restituire esattamente quello che è stato salvato
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        note_from_row(&row)
    }

    /// La nota `id` solo se appartiene a `user_id`.
    pub async fn find_note_for_user(&self, id: i64, user_id: i64) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"))
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|r| note_from_row(&r))
            .transpose()
    }

    /// Aggiorna i campi presenti; `None` se la nota non esiste o non è del chiamante.
    pub async fn update_note_for_user(
        &self,
        id: i64,
        user_id: i64,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Note>, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE notes SET title = COALESCE(?, title), content = COALESCE(?, content) \
             WHERE id = ? AND user_id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_note_for_user(id, user_id).await
    }

    /// `true` se la nota esisteva ed era del chiamante.
    pub async fn delete_note_for_user(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let res = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
