use async_trait::async_trait;
use rusqlite::{named_params, params, OptionalExtension, Row};

use crate::{
    db::DB,
    notes::{NewNote, Note, NoteChanges, NoteId},
    users::UserId,
};

use super::{NoteStore, Result};

const NOTE_COLUMNS: &str = "id, title, content, owner_id, created_at, updated_at";

impl<'a> TryFrom<&Row<'a>> for Note {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            owner_id: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

/// Notes table living in a local SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteNoteStore {
    db: DB,
}

impl SqliteNoteStore {
    pub fn new(db: DB) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Note>> {
        tracing::debug!(%owner, "listing notes");
        let notes = self
            .db
            .call(move |conn| {
                let notes = conn
                    .prepare(&format!(
                        "SELECT {NOTE_COLUMNS} FROM notes WHERE owner_id = ? ORDER BY updated_at DESC, id DESC"
                    ))?
                    .query_map(params![owner], |row| Note::try_from(row))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?;

        Ok(notes)
    }

    async fn find(&self, id: NoteId, owner: UserId) -> Result<Option<Note>> {
        tracing::debug!(%id, %owner, "fetching note");
        let note = self
            .db
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND owner_id = ? LIMIT 1"),
                    params![id, owner],
                    |row| Note::try_from(row),
                )
                .optional()
                .map_err(|e| e.into())
            })
            .await?;

        Ok(note)
    }

    async fn insert(&self, note: NewNote) -> Result<Note> {
        tracing::debug!(owner = %note.owner_id, "inserting note");
        let note = self
            .db
            .call(move |conn| {
                conn.query_row(
                    &format!(
                        r#"INSERT INTO notes (title, content, owner_id, created_at, updated_at)
                        VALUES (:title, :content, :owner_id, :created_at, :updated_at)
                        RETURNING {NOTE_COLUMNS}"#
                    ),
                    named_params! {
                        ":title": note.title,
                        ":content": note.content,
                        ":owner_id": note.owner_id,
                        ":created_at": note.created_at,
                        ":updated_at": note.updated_at,
                    },
                    |row| Note::try_from(row),
                )
                .map_err(|e| e.into())
            })
            .await?;

        Ok(note)
    }

    async fn update(&self, id: NoteId, owner: UserId, changes: NoteChanges) -> Result<Option<Note>> {
        tracing::debug!(%id, %owner, "updating note");
        let note = self
            .db
            .call(move |conn| {
                conn.query_row(
                    &format!(
                        r#"UPDATE notes SET title = :title, content = :content, updated_at = :updated_at
                        WHERE id = :id AND owner_id = :owner_id
                        RETURNING {NOTE_COLUMNS}"#
                    ),
                    named_params! {
                        ":title": changes.title,
                        ":content": changes.content,
                        ":updated_at": changes.updated_at,
                        ":id": id,
                        ":owner_id": owner,
                    },
                    |row| Note::try_from(row),
                )
                .optional()
                .map_err(|e| e.into())
            })
            .await?;

        Ok(note)
    }

    async fn delete(&self, id: NoteId, owner: UserId) -> Result<u64> {
        tracing::debug!(%id, %owner, "deleting note");
        let deleted = self
            .db
            .call(move |conn| {
                conn.execute("DELETE FROM notes WHERE id = ? AND owner_id = ?", params![id, owner])
                    .map_err(|e| e.into())
            })
            .await?;

        Ok(deleted as u64)
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .call(|conn| {
                conn.query_row("SELECT count(*) FROM notes", [], |r| r.get::<_, i64>(0))
                    .map_err(|e| e.into())
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::db::init_test_db;

    async fn store() -> SqliteNoteStore {
        SqliteNoteStore::new(init_test_db().await.unwrap())
    }

    #[tokio::test]
    async fn insert_returns_row() -> Result<()> {
        let store = store().await;
        let owner = Uuid::now_v7();

        let note = store.insert(NewNote::new(owner, "Groceries", "milk, eggs")).await?;

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(note.owner_id, owner);
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.id.is_nil());
        Ok(())
    }

    #[tokio::test]
    async fn list_is_scoped_and_ordered() -> Result<()> {
        let store = store().await;
        let owner = Uuid::now_v7();
        let other = Uuid::now_v7();
        let now = Utc::now();

        for (title, age) in [("old", 3), ("newest", 0), ("middle", 1)] {
            let mut note = NewNote::new(owner, title, "");
            note.created_at = now - Duration::minutes(age);
            note.updated_at = note.created_at;
            store.insert(note).await?;
        }
        store.insert(NewNote::new(other, "foreign", "")).await?;

        let titles = store
            .list(owner)
            .await?
            .into_iter()
            .map(|n| n.title)
            .collect::<Vec<_>>();

        assert_eq!(titles, vec!["newest", "middle", "old"]);
        Ok(())
    }

    #[tokio::test]
    async fn find_respects_owner() -> Result<()> {
        let store = store().await;
        let owner = Uuid::now_v7();
        let note = store.insert(NewNote::new(owner, "mine", "")).await?;

        assert_eq!(store.find(note.id, owner).await?, Some(note.clone()));
        assert_eq!(store.find(note.id, Uuid::now_v7()).await?, None);
        assert_eq!(store.find(Uuid::now_v7(), owner).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn update_respects_owner() -> Result<()> {
        let store = store().await;
        let owner = Uuid::now_v7();
        let note = store.insert(NewNote::new(owner, "first", "1")).await?;

        let foreign = store
            .update(note.id, Uuid::now_v7(), NoteChanges::new("hijacked", ""))
            .await?;
        assert_eq!(foreign, None);

        let updated = store
            .update(note.id, owner, NoteChanges::new("second", "2"))
            .await?
            .unwrap();
        assert_eq!(updated.title, "second");
        assert_eq!(updated.content, "2");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> Result<()> {
        let store = store().await;
        let owner = Uuid::now_v7();
        let note = store.insert(NewNote::new(owner, "first", "1")).await?;

        assert_eq!(store.delete(note.id, Uuid::now_v7()).await?, 0);
        assert_eq!(store.delete(note.id, owner).await?, 1);
        assert_eq!(store.delete(note.id, owner).await?, 0);
        assert!(store.list(owner).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn ping() -> Result<()> {
        store().await.ping().await
    }
}
