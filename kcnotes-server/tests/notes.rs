mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn create_note_then_list_includes_it() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.signup("alice", "secret1").await?;
    let user_id = app.user_id("alice").await?;

    let resp = app
        .post("/notes", Some(&token), json!({ "title": "T", "content": "C" }))
        .await?;
    assert_eq!(resp.status, StatusCode::CREATED);
    let body = resp.json();
    assert_eq!(body["success"], true);
    let note = &body["data"]["note"];
    assert!(note["id"].as_i64().is_some_and(|id| id > 0));
    assert_eq!(note["title"], "T");
    assert_eq!(note["content"], "C");
    assert_eq!(note["user_id"], user_id);
    assert!(note["created_at"].as_str().is_some_and(|s| !s.is_empty()));

    let resp = app.get("/notes", None).await?;
    assert_eq!(resp.status, StatusCode::OK);
    let notes = resp.json()["data"]["notes"].clone();
    assert_eq!(notes.as_array().map(Vec::len), Some(1));
    assert_eq!(notes[0]["id"], note["id"]);

    // e compare anche in /auth/me
    let resp = app.get("/auth/me", Some(&token)).await?;
    assert_eq!(resp.json()["data"]["notes"][0]["id"], note["id"]);
    Ok(())
}

#[tokio::test]
async fn create_note_requires_auth_and_fields() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.signup("alice", "secret1").await?;

    let resp = app.post("/notes", None, json!({ "title": "T", "content": "C" })).await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    // il gate viene prima del body: senza token anche un body malformato è un 401
    let resp = app
        .send_raw(Method::POST, "/notes", None, Some("{oops".to_string()))
        .await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .send_raw(Method::POST, "/notes", Some(&token), Some("{oops".to_string()))
        .await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Invalid JSON body.");

    for payload in [json!({ "title": "T" }), json!({ "content": "C" }), json!({ "title": " ", "content": "C" })] {
        let resp = app.post("/notes", Some(&token), payload).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.json()["message"], "All fields required");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes").fetch_one(&app.pool).await?;
    assert_eq!(count, 0);
    Ok(())
}

// GET /notes è pubblico e non filtra per utente, a differenza di GET /notes/:id.
// L'asimmetria è voluta finché non viene deciso diversamente.
#[tokio::test]
async fn list_is_public_and_unfiltered_unlike_get_by_id() -> Result<()> {
    let app = spawn_app().await?;
    let alice = app.signup("alice", "secret1").await?;
    let bob = app.signup("bob", "secret2").await?;

    app.post("/notes", Some(&alice), json!({ "title": "a", "content": "from alice" })).await?;
    let resp = app.post("/notes", Some(&bob), json!({ "title": "b", "content": "from bob" })).await?;
    let bob_note = resp.json()["data"]["note"]["id"].as_i64().expect("note id");

    let resp = app.get("/notes", None).await?;
    let notes = resp.json()["data"]["notes"].clone();
    assert_eq!(notes.as_array().map(Vec::len), Some(2));

    let resp = app.get(&format!("/notes/{bob_note}"), Some(&alice)).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    let resp = app.get(&format!("/notes/{bob_note}"), None).await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    // /auth/me invece restituisce solo le note del chiamante
    let resp = app.get("/auth/me", Some(&alice)).await?;
    let mine = resp.json()["data"]["notes"].clone();
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["content"], "from alice");
    Ok(())
}

#[tokio::test]
async fn note_by_id_is_owner_only() -> Result<()> {
    let app = spawn_app().await?;
    let alice = app.signup("alice", "secret1").await?;
    let bob = app.signup("bob", "secret2").await?;

    let resp = app.post("/notes", Some(&alice), json!({ "title": "T", "content": "C" })).await?;
    let id = resp.json()["data"]["note"]["id"].as_i64().expect("note id");
    let path = format!("/notes/{id}");

    let resp = app.get(&path, Some(&alice)).await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"]["note"]["title"], "T");

    // bob non vede, non modifica e non cancella le note di alice
    let resp = app.send(Method::PATCH, &path, Some(&bob), Some(json!({ "title": "hijack" }))).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["message"], "Note not found.");
    let resp = app.send(Method::DELETE, &path, Some(&bob), None).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.send(Method::PATCH, &path, Some(&alice), Some(json!({ "title": "T2" }))).await?;
    assert_eq!(resp.status, StatusCode::OK);
    let note = resp.json()["data"]["note"].clone();
    assert_eq!(note["title"], "T2");
    assert_eq!(note["content"], "C");

    let resp = app.send(Method::PATCH, &path, Some(&alice), Some(json!({ "title": "" }))).await?;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["message"], "Nothing to update.");

    let resp = app.send(Method::DELETE, &path, Some(&alice), None).await?;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["message"], "Note deleted.");
    assert!(body["data"].is_null());

    let resp = app.get(&path, Some(&alice)).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn note_paths_keep_prefix_semantics() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.signup("alice", "secret1").await?;

    // tutto quello sotto /notes/ arriva agli handler per id, che validano l'id
    // anche la coda vuota e gli escape non UTF-8 ricevono l'envelope JSON
    for path in ["/notes/abc", "/notes/1/extra", "/notes/0", "/notes/", "/notes/%FF"] {
        let resp = app.get(path, Some(&token)).await?;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "path {path}");
        assert_eq!(resp.content_type.as_deref(), Some("application/json"), "path {path}");
        let body = resp.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid note id.");
        assert!(body["data"].is_null());
    }

    // il gate viene prima della validazione dell'id
    for path in ["/notes/", "/notes/%FF"] {
        let resp = app.send(Method::DELETE, path, None, None).await?;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "path {path}");
    }

    let resp = app.send(Method::PUT, "/notes", Some(&token), Some(json!({}))).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["message"], "Notes route not found.");

    let resp = app.send(Method::POST, "/notes/1", Some(&token), Some(json!({}))).await?;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["message"], "Notes route not found.");
    Ok(())
}

#[tokio::test]
async fn deleting_a_user_cascades_to_notes() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.signup("alice", "secret1").await?;
    app.post("/notes", Some(&token), json!({ "title": "T", "content": "C" })).await?;

    sqlx::query("DELETE FROM users WHERE username = 'alice'").execute(&app.pool).await?;

    let resp = app.get("/notes", None).await?;
    assert_eq!(resp.json()["data"]["notes"], json!([]));
    Ok(())
}

// Token ancora valido ma utente rimosso: come /auth/me, la creazione di una nota è un 401
#[tokio::test]
async fn create_note_for_deleted_user_is_unauthorized() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.signup("alice", "secret1").await?;
    sqlx::query("DELETE FROM users WHERE username = 'alice'").execute(&app.pool).await?;

    let resp = app.post("/notes", Some(&token), json!({ "title": "T", "content": "C" })).await?;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.json()["message"], "Unauthorized.");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notes").fetch_one(&app.pool).await?;
    assert_eq!(count, 0);
    Ok(())
}
