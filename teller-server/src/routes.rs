//! Route definitions for the Teller portal.
//!
//! Provides HTTP endpoints for authentication, user and role administration,
//! the warehouse chatbot, and health checks.

use crate::auth::{auth_middleware, AuthState, AuthUser};
use crate::chat::ChatService;
use crate::db;
use crate::generate::GenerationClient;
use crate::role::{Role, RoleStore};
use crate::user::{CreateUserRequest, UpdateUserRequest, User, UserStore};
use crate::warehouse::Warehouse;
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use teller_common::config::Config;
use teller_common::rbac::{check_permission, Permission, ADMIN_ROLE};
use teller_common::Error;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub users: Arc<UserStore>,
    pub roles: Arc<RoleStore>,
    pub chat: ChatService,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Error response for admin endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// User response (sanitized user data with the role embedded).
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            enabled: user.enabled,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
            last_login_at: user.last_login_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// List users response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// Role rename request.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: String,
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "sessionId")]
    pub session_id: String,
}

/// Chat response body. Failures reuse this shape with an apology string.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Build the portal router.
///
/// The warehouse and generation client are injected so tests can substitute
/// stubs; production wiring happens in `build_router`.
pub fn build_routes(
    config: &Config,
    db_path: PathBuf,
    warehouse: Arc<dyn Warehouse>,
    generator: Arc<dyn GenerationClient>,
) -> Router {
    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("TELLER_JWT_SECRET").ok())
        .unwrap_or_else(|| "teller-portal-default-secret-change-me!".to_string());

    let auth_state = AuthState::new(&jwt_secret, config.auth.token_expiry_secs);

    let db = db::open(&db_path).expect("Failed to open portal database");
    let roles = Arc::new(RoleStore::new(db.clone()).expect("Failed to initialize role store"));
    let users =
        Arc::new(UserStore::new(db, &roles).expect("Failed to initialize user store"));

    let chat = ChatService::new(warehouse, generator, config.warehouse.row_limit);

    let app_state = AppState {
        auth: auth_state.clone(),
        users,
        roles,
        chat,
    };

    let app_routes = Router::new()
        // Auth routes (public)
        .route("/api/v1/auth/login", post(login_handler))
        // Everything below requires a valid token
        .route(
            "/api/v1/auth/refresh",
            post(refresh_handler).layer(middleware::from_fn_with_state(
                auth_state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/api/v1/auth/me",
            get(me_handler).layer(middleware::from_fn_with_state(
                auth_state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/api/v1/users",
            get(list_users_handler)
                .post(create_user_handler)
                .layer(middleware::from_fn_with_state(
                    auth_state.clone(),
                    auth_middleware,
                )),
        )
        .route(
            "/api/v1/users/:id",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler)
                .layer(middleware::from_fn_with_state(
                    auth_state.clone(),
                    auth_middleware,
                )),
        )
        .route(
            "/api/v1/roles",
            get(list_roles_handler).layer(middleware::from_fn_with_state(
                auth_state.clone(),
                auth_middleware,
            )),
        )
        .route(
            "/api/v1/roles/:id",
            axum::routing::put(update_role_handler)
                .delete(delete_role_handler)
                .layer(middleware::from_fn_with_state(
                    auth_state.clone(),
                    auth_middleware,
                )),
        )
        .route(
            "/api/v1/chat",
            post(chat_handler).layer(middleware::from_fn_with_state(
                auth_state.clone(),
                auth_middleware,
            )),
        )
        .with_state(app_state);

    Router::new().merge(app_routes).merge(health_routes())
}

/// Build health check routes.
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
}

fn forbidden() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: "Insufficient permissions".into(),
            code: "FORBIDDEN".into(),
        }),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Login handler with password verification against the user store.
async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.username.is_empty() || request.password.is_empty() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid credentials".into(),
                code: "AUTH_INVALID_CREDENTIALS".into(),
            }),
        ));
    }

    let user = state
        .users
        .verify_password(&request.username, &request.password)
        .map_err(|e| {
            tracing::error!(error = %e, "Password verification error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Authentication error".into(),
                    code: "AUTH_ERROR".into(),
                }),
            )
        })?;

    let Some(user) = user else {
        tracing::warn!(username = %request.username, "Failed login attempt");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid credentials".into(),
                code: "AUTH_INVALID_CREDENTIALS".into(),
            }),
        ));
    };

    let token = state
        .auth
        .generate_token(&user.id, &user.role.name)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to generate token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to generate token".into(),
                    code: "AUTH_TOKEN_ERROR".into(),
                }),
            )
        })?;

    Ok(Json(LoginResponse {
        token,
        expires_in: state.auth.token_expiry_secs,
        user: user.into(),
    }))
}

/// Token refresh handler.
async fn refresh_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .users
        .get(&auth_user.user_id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to refresh token".into(),
                    code: "AUTH_TOKEN_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "User not found".into(),
                    code: "AUTH_USER_NOT_FOUND".into(),
                }),
            )
        })?;

    if !user.enabled {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "User is disabled".into(),
                code: "AUTH_USER_DISABLED".into(),
            }),
        ));
    }

    let token = state
        .auth
        .generate_token(&user.id, &user.role.name)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to refresh token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to refresh token".into(),
                    code: "AUTH_TOKEN_ERROR".into(),
                }),
            )
        })?;

    Ok(Json(LoginResponse {
        token,
        expires_in: state.auth.token_expiry_secs,
        user: user.into(),
    }))
}

/// Get current user info.
async fn me_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user = state
        .users
        .get(&auth_user.user_id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get user".into(),
                    code: "USER_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".into(),
                    code: "USER_NOT_FOUND".into(),
                }),
            )
        })?;

    Ok(Json(user.into()))
}

// ─────────────────────────────────────────────────────────────────────────────
// User Management Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// List all users (requires UserRead permission).
async fn list_users_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ListUsersResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::UserRead) {
        return Err(forbidden());
    }

    let users = state
        .users
        .list(pagination.limit, pagination.offset)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list users");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to list users".into(),
                    code: "USER_ERROR".into(),
                }),
            )
        })?;

    let total = state.users.count().unwrap_or(0);

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(Into::into).collect(),
        total,
    }))
}

/// Create a new user (requires UserWrite permission).
async fn create_user_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::UserWrite) {
        return Err(forbidden());
    }

    let user = state.users.create(&request).map_err(|e| {
        let error_msg = e.to_string();
        tracing::error!(error = %e, "Failed to create user");

        if error_msg.contains("UNIQUE constraint") {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Username already exists".into(),
                    code: "USER_EXISTS".into(),
                }),
            );
        }

        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: error_msg,
                code: "USER_CREATE_ERROR".into(),
            }),
        )
    })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a user by ID (requires UserRead permission, or own user).
async fn get_user_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, (StatusCode, Json<ErrorResponse>)> {
    let is_own_profile = auth_user.user_id == id;

    if !is_own_profile && !check_permission(&auth_user.role, Permission::UserRead) {
        return Err(forbidden());
    }

    let user = state
        .users
        .get(&id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get user".into(),
                    code: "USER_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".into(),
                    code: "USER_NOT_FOUND".into(),
                }),
            )
        })?;

    Ok(Json(user.into()))
}

/// Update a user (requires UserWrite permission; users may change their own
/// password).
async fn update_user_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, (StatusCode, Json<ErrorResponse>)> {
    let is_own_profile = auth_user.user_id == id;
    let has_write_permission = check_permission(&auth_user.role, Permission::UserWrite);

    if !is_own_profile && !has_write_permission {
        return Err(forbidden());
    }

    // Only admins can change roles or enabled status
    if !has_write_permission && (request.role_id.is_some() || request.enabled.is_some()) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Cannot modify role or enabled status".into(),
                code: "FORBIDDEN".into(),
            }),
        ));
    }

    if request.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Missing role ID or password".into(),
                code: "USER_UPDATE_EMPTY".into(),
            }),
        ));
    }

    let user = state
        .users
        .update(&id, &request)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to update user");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: "USER_UPDATE_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".into(),
                    code: "USER_NOT_FOUND".into(),
                }),
            )
        })?;

    Ok(Json(user.into()))
}

/// Delete a user (requires UserAdmin permission).
async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::UserAdmin) {
        return Err(forbidden());
    }

    // Prevent self-deletion
    if auth_user.user_id == id {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Cannot delete your own account".into(),
                code: "SELF_DELETE".into(),
            }),
        ));
    }

    let deleted = state.users.delete(&id).map_err(|e| {
        tracing::error!(error = %e, "Failed to delete user");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to delete user".into(),
                code: "USER_DELETE_ERROR".into(),
            }),
        )
    })?;

    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "User not found".into(),
                code: "USER_NOT_FOUND".into(),
            }),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Role Management Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// List all roles (requires UserRead permission).
async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<Role>>, (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::UserRead) {
        return Err(forbidden());
    }

    let roles = state.roles.list().map_err(|e| {
        tracing::error!(error = %e, "Failed to list roles");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to list roles".into(),
                code: "ROLE_ERROR".into(),
            }),
        )
    })?;

    Ok(Json(roles))
}

/// Rename a role (requires RoleAdmin permission).
///
/// The seeded admin role is pinned: rename requests against it succeed but
/// leave the name untouched.
async fn update_role_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Role>, (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::RoleAdmin) {
        return Err(forbidden());
    }

    let role = state
        .roles
        .get(&id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get role");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get role".into(),
                    code: "ROLE_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Role not found".into(),
                    code: "ROLE_NOT_FOUND".into(),
                }),
            )
        })?;

    if role.name == ADMIN_ROLE {
        tracing::warn!(role_id = %id, "Ignoring rename of the admin role");
        return Ok(Json(role));
    }

    let renamed = state
        .roles
        .rename(&id, &request.name)
        .map_err(|e| {
            let error_msg = e.to_string();
            tracing::error!(error = %e, "Failed to rename role");

            if error_msg.contains("UNIQUE constraint") {
                return (
                    StatusCode::CONFLICT,
                    Json(ErrorResponse {
                        error: "Role name already exists".into(),
                        code: "ROLE_EXISTS".into(),
                    }),
                );
            }

            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: error_msg,
                    code: "ROLE_UPDATE_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Role not found".into(),
                    code: "ROLE_NOT_FOUND".into(),
                }),
            )
        })?;

    Ok(Json(renamed))
}

/// Delete a role (requires RoleAdmin permission). Refused for the admin role
/// and for roles still assigned to users.
async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if !check_permission(&auth_user.role, Permission::RoleAdmin) {
        return Err(forbidden());
    }

    let role = state
        .roles
        .get(&id)
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to get role");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get role".into(),
                    code: "ROLE_ERROR".into(),
                }),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Role not found".into(),
                    code: "ROLE_NOT_FOUND".into(),
                }),
            )
        })?;

    if role.name == ADMIN_ROLE {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "The admin role cannot be deleted".into(),
                code: "ROLE_PROTECTED".into(),
            }),
        ));
    }

    let in_use = state.roles.user_count(&id).map_err(|e| {
        tracing::error!(error = %e, "Failed to count role users");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to delete role".into(),
                code: "ROLE_ERROR".into(),
            }),
        )
    })?;

    if in_use > 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Role is assigned to {} user(s)", in_use),
                code: "ROLE_IN_USE".into(),
            }),
        ));
    }

    state.roles.delete(&id).map_err(|e| {
        tracing::error!(error = %e, "Failed to delete role");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to delete role".into(),
                code: "ROLE_DELETE_ERROR".into(),
            }),
        )
    })?;

    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Chatbot handler. All failures become a user-safe apology string.
async fn chat_handler(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatResponse>)> {
    if !check_permission(&auth_user.role, Permission::ChatAccess) {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ChatResponse {
                response: "You don't have access to the assistant.".into(),
            }),
        ));
    }

    tracing::info!(user_id = %auth_user.user_id, "Processing chat message");

    match state
        .chat
        .handle(&request.message, &request.session_id)
        .await
    {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => Err(chat_error_response(e)),
    }
}

/// Map a pipeline error onto an HTTP status and apology string.
fn chat_error_response(err: Error) -> (StatusCode, Json<ChatResponse>) {
    let response = match &err {
        Error::Config(_) => "I'm sorry, but I'm currently unable to process your request due to a configuration issue. Please try again later.".to_string(),
        Error::InvalidInput(_) => "Invalid request format. Please try again.".to_string(),
        Error::DataUnavailable(cause) => format!(
            "I'm sorry, I couldn't retrieve the necessary data: {}. Please try again.",
            cause
        ),
        Error::RateLimited(_) => "I'm currently experiencing high demand. Please try again in a few moments.".to_string(),
        Error::Generation(cause) => format!(
            "I'm sorry, I encountered an error while analyzing the data: {}. Please try again.",
            cause
        ),
        other => format!("I'm sorry, I encountered an error: {}. Please try again.", other),
    };

    let status = StatusCode::from_u16(err.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, Json(ChatResponse { response }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Handler
// ─────────────────────────────────────────────────────────────────────────────

/// Health check handler.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        service: "teller-server".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_map_to_statuses_and_apologies() {
        let (status, body) = chat_error_response(Error::Config("no key".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.response.contains("configuration issue"));

        let (status, body) = chat_error_response(Error::InvalidInput("bad".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.response.contains("Invalid request format"));

        let (status, body) =
            chat_error_response(Error::DataUnavailable("Database error: down".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.response.contains("Database error: down"));

        let (status, body) = chat_error_response(Error::RateLimited("429".into()));
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body.response.contains("high demand"));

        let (status, body) = chat_error_response(Error::Generation("overloaded".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.response.contains("overloaded"));
    }
}
