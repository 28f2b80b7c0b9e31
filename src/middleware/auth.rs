// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::User, roles::RoleContext},
};

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// O guard de autenticação: valida o JWT, confere a versão da sessão e
// resolve o papel do usuário (ausência de papel não é erro).
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(to_api(AppError::InvalidToken));
    };

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Token rejeitado"))
        .map_err(to_api)?;

    let role = app_state
        .auth_service
        .load_role(user.id)
        .await
        .map_err(to_api)?;

    // Insere o usuário e o papel nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user));
    request.extensions_mut().insert(role);

    Ok(next.run(request).await)
}

// Rejeição traduzida para extratores que rodam fora do guard
pub(crate) fn reject<S>(parts: &Parts, state: &S, error: AppError) -> ApiError
where
    AppState: FromRef<S>,
{
    let app_state = AppState::from_ref(state);
    let locale = Locale::from_headers(&parts.headers);
    error.to_api_error(&locale, &app_state.i18n_store)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthenticatedUser>() {
            Some(user) => Ok(user.clone()),
            None => Err(reject(parts, state, AppError::InvalidToken)),
        }
    }
}

impl<S> FromRequestParts<S> for RoleContext
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<RoleContext>() {
            Some(role) => Ok(role.clone()),
            None => Err(reject(parts, state, AppError::InvalidToken)),
        }
    }
}
