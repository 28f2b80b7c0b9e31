// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::roles::{AppRole, Profile};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "ops@acme.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    // Incrementado no logout e na troca de senha: invalida os tokens antigos
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub session_version: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(email(message = "validation.email"))]
    #[schema(example = "ops@acme.com")]
    pub email: String,
    #[validate(length(min = 6, message = "validation.password_length"))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
    #[validate(length(min = 1, message = "validation.required"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub ver: i32,   // Versão da sessão no momento da emissão
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// --- Recuperação de acesso ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "auth_token_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuthTokenKind {
    PasswordReset,
    MagicLink,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub token: Uuid,
    pub user_id: Uuid,
    pub kind: AuthTokenKind,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && self.expires_at > now
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EmailOnlyPayload {
    #[validate(email(message = "validation.email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    pub token: Uuid,
    #[validate(length(min = 6, message = "validation.password_length"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyMagicLinkPayload {
    pub token: Uuid,
}

// --- Sessão ---

/// O que o cliente web consulta ao carregar e a cada mudança de autenticação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub profile: Option<Profile>,
    pub role: Option<AppRole>,
    pub customer_id: Option<Uuid>,
    pub is_admin: bool,
    pub is_customer: bool,
    #[schema(example = "/admin")]
    pub redirect_to: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(expires_in: Duration, consumed: bool) -> AuthToken {
        let now = Utc::now();
        AuthToken {
            token: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: AuthTokenKind::PasswordReset,
            expires_at: now + expires_in,
            consumed_at: consumed.then_some(now),
            created_at: now,
        }
    }

    #[test]
    fn recovery_tokens_are_single_use_and_expire() {
        let now = Utc::now();
        assert!(token(Duration::minutes(30), false).is_usable(now));
        assert!(!token(Duration::minutes(30), true).is_usable(now));
        assert!(!token(Duration::minutes(-1), false).is_usable(now));
    }

    #[test]
    fn password_must_have_six_characters() {
        let payload = RegisterUserPayload {
            email: "ops@acme.com".into(),
            password: "12345".into(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
