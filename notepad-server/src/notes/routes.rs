use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use notepad::{NoteId, SqliteNoteStore};

use crate::{ctx::Ctx, state::AppState};

use super::{handlers, CreateNote, UpdateNote};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rest/v1/notes", get(find_notes).post(create_note))
        .route(
            "/rest/v1/notes/{note_id}",
            get(get_note).patch(update_note).delete(delete_note),
        )
        .with_state(state)
}

async fn find_notes(ctx: Ctx, State(store): State<SqliteNoteStore>) -> impl IntoResponse {
    handlers::find_notes(&ctx, &store).await.map(Json)
}

async fn create_note(ctx: Ctx, State(store): State<SqliteNoteStore>, Json(args): Json<CreateNote>) -> impl IntoResponse {
    handlers::create_note(args, &ctx, &store)
        .await
        .map(|note| (StatusCode::CREATED, Json(note)))
}

async fn get_note(Path(note_id): Path<NoteId>, ctx: Ctx, State(store): State<SqliteNoteStore>) -> impl IntoResponse {
    handlers::get_note(note_id, &ctx, &store).await.map(Json)
}

async fn update_note(
    Path(note_id): Path<NoteId>,
    ctx: Ctx,
    State(store): State<SqliteNoteStore>,
    Json(args): Json<UpdateNote>,
) -> impl IntoResponse {
    handlers::update_note(note_id, args, &ctx, &store).await.map(Json)
}

async fn delete_note(Path(note_id): Path<NoteId>, ctx: Ctx, State(store): State<SqliteNoteStore>) -> impl IntoResponse {
    handlers::delete_note(note_id, &ctx, &store).await.map(Json)
}
