use notepad::db::DB;
use rand::{distributions::Alphanumeric, Rng};
use rusqlite::{named_params, params, OptionalExtension, Row};

use crate::{Error, Result};

mod password;

pub use notepad::users::UserId;
pub use password::{hash_password, verify_password};

const USER_COLUMNS: &str = "id, email, password, display_name, avatar_url, created_at, updated_at";
const TOKEN_LENGTH: usize = 48;

#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl<'a> TryFrom<&Row<'a>> for User {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            display_name: row.get(3)?,
            avatar_url: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl User {
    /// What clients get to see.
    pub fn profile(&self) -> notepad::User {
        notepad::User {
            id: self.id,
            email: Some(self.email.clone()),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUpParameters {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

pub async fn sign_up(db: DB, args: SignUpParameters) -> Result<User> {
    let email = args.email.trim().to_lowercase();
    if email.is_empty() || args.password.is_empty() {
        return Err(Error::Validation("Please fill in all fields".into()));
    }

    let password = hash_password(&args.password)?;
    let display_name = args.name.filter(|n| !n.trim().is_empty());

    let user = db
        .call({
            let email = email.clone();
            move |conn| {
                conn.query_row(
                    &format!(
                        r#"INSERT INTO users (email, password, display_name) VALUES (:email, :password, :display_name)
                        ON CONFLICT(email) DO NOTHING
                        RETURNING {USER_COLUMNS}"#
                    ),
                    named_params! {
                        ":email": email,
                        ":password": password,
                        ":display_name": display_name,
                    },
                    |r| User::try_from(r),
                )
                .optional()
                .map_err(|e| e.into())
            }
        })
        .await?
        .ok_or_else(|| Error::Conflict(format!("User '{email}' already registered")))?;

    tracing::info!("{email} signed up");

    Ok(user)
}

/// Checks the credentials and opens a session; returns the user with a fresh access token.
pub async fn sign_in(db: DB, email: &str, password: &str) -> Result<(User, String)> {
    let user = find_one_by_email(db.clone(), email.trim().to_lowercase())
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&user.password, password) {
        return Err(Error::InvalidCredentials);
    }

    let token = new_token();
    db.call({
        let token = token.clone();
        let user_id = user.id;
        move |conn| {
            conn.execute("INSERT INTO sessions (token, user_id) VALUES (?, ?)", params![token, user_id])?;
            Ok(())
        }
    })
    .await?;

    tracing::info!("{} logged in", user.email);

    Ok((user, token))
}

pub async fn sign_out(db: DB, token: String) -> Result<()> {
    db.call(move |conn| {
        conn.execute("DELETE FROM sessions WHERE token = ?", params![token])?;
        Ok(())
    })
    .await?;

    Ok(())
}

pub async fn find_one_by_token(db: DB, token: String) -> Result<Option<User>> {
    let user = db
        .call(move |conn| {
            conn.query_row(
                r#"SELECT u.id, u.email, u.password, u.display_name, u.avatar_url, u.created_at, u.updated_at
                FROM sessions s JOIN users u ON u.id = s.user_id
                WHERE s.token = ?"#,
                params![token],
                |r| User::try_from(r),
            )
            .optional()
            .map_err(|e| e.into())
        })
        .await?;

    Ok(user)
}

pub async fn find_one_by_email(db: DB, email: String) -> Result<Option<User>> {
    let user = db
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"),
                params![email],
                |r| User::try_from(r),
            )
            .optional()
            .map_err(|e| e.into())
        })
        .await?;

    Ok(user)
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use notepad::db::init_test_db;

    use super::*;

    fn params(email: &str) -> SignUpParameters {
        SignUpParameters {
            email: email.into(),
            password: "password".into(),
            name: Some("Test User".into()),
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user() {
        let db = init_test_db().await.unwrap();

        let user = sign_up(db, params("Test@Mail.com ")).await.unwrap();

        assert_eq!(user.email, "test@mail.com");
        assert_eq!(user.display_name, Some("Test User".into()));
        assert_ne!(user.password, "password");
    }

    #[tokio::test]
    async fn sign_up_twice_conflicts() {
        let db = init_test_db().await.unwrap();

        sign_up(db.clone(), params("test@mail.com")).await.unwrap();
        let again = sign_up(db, params("test@mail.com")).await;

        assert!(matches!(again, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn sign_up_requires_fields() {
        let db = init_test_db().await.unwrap();

        let result = sign_up(
            db,
            SignUpParameters {
                email: "  ".into(),
                password: "password".into(),
                name: None,
            },
        )
        .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn sign_in_and_out() {
        let db = init_test_db().await.unwrap();
        let created = sign_up(db.clone(), params("test@mail.com")).await.unwrap();

        let (user, token) = sign_in(db.clone(), "test@mail.com", "password").await.unwrap();
        assert_eq!(user.id, created.id);
        assert_eq!(token.len(), TOKEN_LENGTH);

        let found = find_one_by_token(db.clone(), token.clone()).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        sign_out(db.clone(), token.clone()).await.unwrap();
        assert!(find_one_by_token(db, token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_in_rejects_bad_credentials() {
        let db = init_test_db().await.unwrap();
        sign_up(db.clone(), params("test@mail.com")).await.unwrap();

        let wrong_password = sign_in(db.clone(), "test@mail.com", "nope").await;
        assert!(matches!(wrong_password, Err(Error::InvalidCredentials)));

        let unknown = sign_in(db, "other@mail.com", "password").await;
        assert!(matches!(unknown, Err(Error::InvalidCredentials)));
    }

    #[test]
    fn debug_redacts_password() {
        let user = User {
            id: UserId::now_v7(),
            email: "test@mail.com".into(),
            password: "$argon2id$secret".into(),
            display_name: None,
            avatar_url: None,
            created_at: chrono::Utc::now(),
            updated_at: None,
        };

        assert!(!format!("{user:?}").contains("secret"));
    }
}
