use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};

use parley_db::models::UserRow;
use parley_types::api::{ApiResponse, Claims, StatusQuery, UpdateUsernameRequest, UserDto};

use crate::auth::AppState;
use crate::response::{envelope, failure};

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<Response, StatusCode> {
    match state
        .db()
        .get_user_by_id(id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        Some(user) => Ok(envelope(
            StatusCode::OK,
            ApiResponse::ok("User retrieved successfully", to_dto(user)),
        )),
        None => Ok(not_found()),
    }
}

pub async fn update_username(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<UpdateUsernameRequest>,
) -> Result<Response, StatusCode> {
    let updated = state
        .db()
        .update_username(id, &req.username)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !updated {
        return Ok(not_found());
    }

    let user = state
        .db()
        .get_user_by_id(id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok("Username updated successfully", to_dto(user)),
    ))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<Response, StatusCode> {
    let updated = state
        .db()
        .update_status(id, &query.status)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !updated {
        return Ok(not_found());
    }

    let user = state
        .db()
        .get_user_by_id(id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(envelope(
        StatusCode::OK,
        ApiResponse::ok("Status updated successfully", to_dto(user)),
    ))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(_claims): Extension<Claims>,
) -> Result<Response, StatusCode> {
    match state
        .db()
        .get_user_by_id(id)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        Some(user) => Ok(envelope(
            StatusCode::OK,
            ApiResponse::ok("Status retrieved successfully", user.status),
        )),
        None => Ok(not_found()),
    }
}

fn not_found() -> Response {
    failure(StatusCode::NOT_FOUND, "User not found")
}

fn to_dto(user: UserRow) -> UserDto {
    UserDto {
        id: user.id,
        username: user.username,
        email: user.email,
        status: user.status,
        created_at: user
            .created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .or_else(|_| {
                // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
                // timezone. Parse as naive UTC and convert.
                chrono::NaiveDateTime::parse_from_str(&user.created_at, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .unwrap_or_default(),
    }
}
