use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use notepad::{auth::TokenResponse, db::DB};
use serde::Deserialize;

use crate::{
    ctx::Ctx,
    state::AppState,
    users::{self, SignUpParameters},
    Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/v1/signup", post(sign_up))
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/logout", post(logout))
        .route("/auth/v1/user", get(current_user))
        .with_state(state)
}

async fn sign_up(State(db): State<DB>, Json(SignUp { email, password, name }): Json<SignUp>) -> Result<impl IntoResponse> {
    let user = users::sign_up(db, SignUpParameters { email, password, name }).await?;

    Ok((StatusCode::CREATED, Json(user.profile())))
}

async fn token(State(db): State<DB>, Json(Credentials { email, password }): Json<Credentials>) -> Result<Json<TokenResponse>> {
    let (user, access_token) = users::sign_in(db, &email, &password).await?;

    Ok(Json(TokenResponse {
        access_token,
        user: user.profile(),
    }))
}

async fn logout(ctx: Ctx, State(db): State<DB>) -> Result<StatusCode> {
    let token = ctx.token.ok_or(Error::Unauthorized)?;
    users::sign_out(db, token).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn current_user(ctx: Ctx) -> Result<Json<notepad::User>> {
    Ok(Json(ctx.require_user()?.profile()))
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use axum_test::TestServer;
    use notepad::db::init_test_db;
    use serde_json::{json, Value};

    use crate::app::create_app;

    async fn test_server() -> TestServer {
        let db = init_test_db().await.unwrap();
        TestServer::new(create_app(db)).unwrap()
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    #[tokio::test]
    async fn sign_up_returns_profile() {
        let server = test_server().await;

        let response = server
            .post("/auth/v1/signup")
            .json(&json!({ "email": "Test@Mail.com", "password": "password", "name": "Test" }))
            .await;

        assert_eq!(response.status_code(), 201);
        let body = response.json::<Value>();
        assert_eq!(body["email"], "test@mail.com");
        assert_eq!(body["display_name"], "Test");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn sign_up_conflict_and_validation() {
        let server = test_server().await;
        let body = json!({ "email": "test@mail.com", "password": "password" });

        server.post("/auth/v1/signup").json(&body).await;
        let response = server.post("/auth/v1/signup").json(&body).await;
        assert_eq!(response.status_code(), 409);
        assert_eq!(response.json::<Value>()["error"], "conflict");

        let response = server
            .post("/auth/v1/signup")
            .json(&json!({ "email": "", "password": "" }))
            .await;
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>()["message"], "Please fill in all fields");
    }

    #[tokio::test]
    async fn token_user_logout() {
        let server = test_server().await;
        let credentials = json!({ "email": "test@mail.com", "password": "password" });
        server.post("/auth/v1/signup").json(&credentials).await;

        let response = server.post("/auth/v1/token").json(&credentials).await;
        assert_eq!(response.status_code(), 200);
        let body = response.json::<Value>();
        let token = body["access_token"].as_str().unwrap().to_owned();
        assert_eq!(body["user"]["email"], "test@mail.com");

        let response = server
            .get("/auth/v1/user")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.json::<Value>()["id"], body["user"]["id"]);

        let response = server
            .post("/auth/v1/logout")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        assert_eq!(response.status_code(), 204);

        let response = server
            .get("/auth/v1/user")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let server = test_server().await;
        server
            .post("/auth/v1/signup")
            .json(&json!({ "email": "test@mail.com", "password": "password" }))
            .await;

        let response = server
            .post("/auth/v1/token")
            .json(&json!({ "email": "test@mail.com", "password": "wrong" }))
            .await;

        assert_eq!(response.status_code(), 401);
        assert_eq!(response.json::<Value>()["message"], "Invalid login credentials");
    }

    #[tokio::test]
    async fn logout_requires_token() {
        let server = test_server().await;

        let response = server.post("/auth/v1/logout").await;

        assert_eq!(response.status_code(), 401);
    }
}
