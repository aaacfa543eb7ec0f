use std::path::PathBuf;
use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::Response};
use jsonwebtoken::{EncodingKey, Header, encode};

use parley_chat::{KeywordClassifier, MessagePipeline};
use parley_db::Database;
use parley_types::api::{ApiResponse, Claims, LoginData, LoginRequest, RegisterRequest};

use crate::response::{envelope, failure};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// The pipeline owns the database; other handlers reach it through
    /// `pipeline.store()`.
    pub pipeline: MessagePipeline<Database, KeywordClassifier>,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
}

impl AppStateInner {
    pub fn db(&self) -> &Database {
        self.pipeline.store()
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, StatusCode> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Ok(failure(StatusCode::BAD_REQUEST, "Invalid username"));
    }
    if req.password.len() < 8 {
        return Ok(failure(StatusCode::BAD_REQUEST, "Password too short"));
    }

    // Check if the email is taken
    if state
        .db()
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some()
    {
        return Ok(failure(StatusCode::BAD_REQUEST, "Email already exists"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    state
        .db()
        .create_user(&req.username, &req.email, &password_hash, "OFFLINE")
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(envelope(
        StatusCode::CREATED,
        ApiResponse::<()>::ok_empty("User registered successfully"),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, StatusCode> {
    let Some(user) = state
        .db()
        .get_user_by_email(&req.email)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    else {
        return Ok(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    };

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Ok(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    state
        .db()
        .update_status(user.id, "ONLINE")
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok(
            "Login successful",
            LoginData {
                token,
                email: req.email,
            },
        ),
    ))
}

pub fn create_token(secret: &str, user_id: i64, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
