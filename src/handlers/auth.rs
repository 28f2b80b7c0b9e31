// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{
            AuthResponse, EmailOnlyPayload, LoginUserPayload, RegisterUserPayload,
            ResetPasswordPayload, SessionResponse, VerifyMagicLinkPayload,
        },
        roles::RoleContext,
    },
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado (sem papel)", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .register_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(AuthResponse { token })))
}

// GET /api/auth/session
#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário, perfil e papel atuais", body = SessionResponse),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn session(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    role: RoleContext,
) -> Result<impl IntoResponse, ApiError> {
    let session = app_state
        .auth_service
        .session(user, &role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(session)))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Todas as sessões do usuário foram encerradas"),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .logout(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/auth/password-reset
#[utoipa::path(
    post,
    path = "/api/auth/password-reset",
    tag = "Auth",
    request_body = EmailOnlyPayload,
    responses(
        (status = 202, description = "Se o e-mail existir, o link foi enviado"),
        (status = 400, description = "E-mail inválido")
    )
)]
pub async fn request_password_reset(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<EmailOnlyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .request_password_reset(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::ACCEPTED)
}

// POST /api/auth/password-reset/confirm
#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    tag = "Auth",
    request_body = ResetPasswordPayload,
    responses(
        (status = 204, description = "Senha redefinida; sessões anteriores encerradas"),
        (status = 400, description = "Token inválido, expirado ou já usado")
    )
)]
pub async fn reset_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .reset_password(payload.token, &payload.new_password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/auth/magic-link
#[utoipa::path(
    post,
    path = "/api/auth/magic-link",
    tag = "Auth",
    request_body = EmailOnlyPayload,
    responses(
        (status = 202, description = "Se o e-mail existir, o link foi enviado"),
        (status = 400, description = "E-mail inválido")
    )
)]
pub async fn request_magic_link(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<EmailOnlyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .request_magic_link(&payload.email)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::ACCEPTED)
}

// POST /api/auth/magic-link/verify
#[utoipa::path(
    post,
    path = "/api/auth/magic-link/verify",
    tag = "Auth",
    request_body = VerifyMagicLinkPayload,
    responses(
        (status = 200, description = "Link trocado por um token de acesso", body = AuthResponse),
        (status = 400, description = "Link inválido, expirado ou já usado")
    )
)]
pub async fn verify_magic_link(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<VerifyMagicLinkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let token = app_state
        .auth_service
        .verify_magic_link(payload.token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(AuthResponse { token })))
}
