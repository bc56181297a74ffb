use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use notepad::{db::DB, NoteStore, SqliteNoteStore};
use serde_json::json;

use crate::{auth, config::config, notes, state::AppState, Result};

pub fn create_app(db: DB) -> Router {
    let state = AppState::new(db);

    Router::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .with_state(state.clone())
        .merge(auth::router(state.clone()))
        .merge(notes::router(state))
}

async fn version() -> impl IntoResponse {
    let config = config();
    Json(json!({
        "source" : config.source,
        "version": config.version,
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

/// Touches the database so keep-alive pings keep the store warm.
async fn heartbeat(State(store): State<SqliteNoteStore>) -> Result<impl IntoResponse> {
    store.ping().await?;

    Ok(Json(json!({ "status": "ok" })))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use notepad::db::init_test_db;
    use serde_json::Value;

    use super::*;

    #[tokio::test]
    async fn service_endpoints() {
        let server = TestServer::new(create_app(init_test_db().await.unwrap())).unwrap();

        let response = server.get("/__heartbeat__").await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Value>()["status"], "ok");

        let response = server.get("/__lbheartbeat__").await;
        assert_eq!(response.status_code(), 200);

        let response = server.get("/__version__").await;
        assert!(response.json::<Value>().get("version").is_some());
    }
}
