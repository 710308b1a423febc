//! HTTP surface of the query API.
//!
//! Public routes: service info and token issuance. Everything under the
//! protected router requires a valid bearer token (see [`crate::auth`]).

use crate::auth::{self, jwt_auth, CredentialVerifier, CurrentUser, JwtConfig};
use crate::user_directory::UserDirectory;
use crate::user_record::FilteredUser;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::middleware as axum_mw;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Build the full router with all routes and middleware.
pub fn build_router(
    directory: Arc<UserDirectory>,
    verifier: Arc<dyn CredentialVerifier>,
    jwt: JwtConfig,
) -> Router {
    let protected = Router::new()
        .route("/users", get(list_users))
        .route("/users/search", get(search_users))
        .route("/users/{login}", get(get_user_by_login))
        .route("/protected", get(protected_probe))
        .layer(axum_mw::from_fn(jwt_auth));

    let public = Router::new()
        .route("/", get(root))
        .route("/token", post(issue_token));

    public
        .merge(protected)
        .layer(Extension(directory))
        .layer(Extension(verifier))
        .layer(Extension(jwt))
}

async fn root(Extension(directory): Extension<Arc<UserDirectory>>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "User aggregator API",
        "users": directory.len(),
    }))
}

#[derive(Debug, Deserialize)]
struct TokenRequest {
    username: String,
    password: String,
}

async fn issue_token(
    Extension(verifier): Extension<Arc<dyn CredentialVerifier>>,
    Extension(jwt): Extension<JwtConfig>,
    Form(request): Form<TokenRequest>,
) -> Response {
    if !verifier.verify(&request.username, &request.password) {
        return auth::unauthorized("Invalid credentials");
    }

    match jwt.issue_token(&request.username) {
        Ok(token) => Json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in_minutes": jwt.ttl_minutes,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to issue token: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Token issuance failed" })),
            )
                .into_response()
        }
    }
}

async fn list_users(
    Extension(directory): Extension<Arc<UserDirectory>>,
) -> Json<Vec<FilteredUser>> {
    Json(directory.all().to_vec())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_users(
    Extension(directory): Extension<Arc<UserDirectory>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<FilteredUser>> {
    let matches = directory.search(&params.q).into_iter().cloned().collect();
    Json(matches)
}

async fn get_user_by_login(
    Extension(directory): Extension<Arc<UserDirectory>>,
    Path(login): Path<String>,
) -> Response {
    match directory.find(&login) {
        Some(user) => Json(user.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "User not found" })),
        )
            .into_response(),
    }
}

async fn protected_probe(Extension(user): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(json!({ "message": format!("Welcome {}, you are authenticated", user.0) }))
}
