use notepad::{
    notes::{NewNote, NoteChanges},
    Note, NoteId, NoteStore, SqliteNoteStore,
};

use crate::{ctx::Ctx, Error, Result};

use super::{CreateNote, DeleteNoteResponse, UpdateNote};

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::Validation("Please enter a title for your note".into()));
    }
    Ok(())
}

pub async fn find_notes(ctx: &Ctx, store: &SqliteNoteStore) -> Result<Vec<Note>> {
    let user = ctx.require_user()?;
    Ok(store.list(user.id).await?)
}

pub async fn get_note(note_id: NoteId, ctx: &Ctx, store: &SqliteNoteStore) -> Result<Note> {
    let user = ctx.require_user()?;
    store
        .find(note_id, user.id)
        .await?
        .ok_or_else(|| Error::NotFound("Note not found".into()))
}

pub async fn create_note(CreateNote { title, content }: CreateNote, ctx: &Ctx, store: &SqliteNoteStore) -> Result<Note> {
    let user = ctx.require_user()?;
    validate_title(&title)?;

    Ok(store.insert(NewNote::new(user.id, title, content)).await?)
}

pub async fn update_note(
    note_id: NoteId,
    UpdateNote { title, content }: UpdateNote,
    ctx: &Ctx,
    store: &SqliteNoteStore,
) -> Result<Note> {
    let user = ctx.require_user()?;
    validate_title(&title)?;

    store
        .update(note_id, user.id, NoteChanges::new(title, content))
        .await?
        .ok_or_else(|| Error::NotFound("Note not found".into()))
}

pub async fn delete_note(note_id: NoteId, ctx: &Ctx, store: &SqliteNoteStore) -> Result<DeleteNoteResponse> {
    let user = ctx.require_user()?;
    let deleted = store.delete(note_id, user.id).await?;

    Ok(DeleteNoteResponse { deleted })
}
