// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::Config,
    db::{RoleRepository, UserRepository},
    models::{
        auth::{AuthTokenKind, Claims, SessionResponse, User},
        roles::RoleContext,
    },
    services::mailer::{Mailer, RecoveryEmail},
};

// ---
// Funções puras de JWT (testáveis sem banco)
// ---

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    session_version: i32,
    now: DateTime<Utc>,
    ttl: Duration,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        ver: session_version,
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Assinatura e expiração. A versão da sessão é conferida depois, contra o banco.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims)
}

// bcrypt é CPU-bound: roda fora do runtime async
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    mailer: Arc<dyn Mailer>,
    pool: PgPool,
    jwt_secret: String,
    jwt_ttl: Duration,
    recovery_ttl: Duration,
    portal_base_url: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        mailer: Arc<dyn Mailer>,
        pool: PgPool,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            role_repo,
            mailer,
            pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_ttl: Duration::hours(config.jwt_ttl_hours),
            recovery_ttl: Duration::minutes(config.auth_token_ttl_minutes),
            portal_base_url: config.portal_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Cadastro aberto. O usuário nasce sem papel: entra, mas não acessa nenhum portal.
    pub async fn register_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let hashed_password = hash_password(password).await?;
        let new_user = self.user_repo.create_user(&self.pool, email, &hashed_password).await?;
        tracing::info!(user_id = %new_user.id, "Novo usuário registrado");
        self.create_token(&new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Tentativa de login com senha incorreta");
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Decodifica o JWT e confere se a sessão ainda é a vigente.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if user.session_version != claims.ver {
            return Err(AppError::InvalidToken);
        }
        Ok(user)
    }

    pub async fn load_role(&self, user_id: Uuid) -> Result<RoleContext, AppError> {
        let row = self.role_repo.find_role(user_id).await?;
        Ok(RoleContext::from_row(row))
    }

    pub async fn session(&self, user: User, role: &RoleContext) -> Result<SessionResponse, AppError> {
        let profile = self.role_repo.find_profile(user.id).await?;
        Ok(SessionResponse {
            user,
            profile,
            role: role.role,
            customer_id: role.customer_id,
            is_admin: role.is_admin(),
            is_customer: role.is_customer(),
            redirect_to: role.landing_path().to_string(),
        })
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<(), AppError> {
        self.user_repo.bump_session_version(user_id).await?;
        tracing::info!(user_id = %user_id, "Sessões encerradas");
        Ok(())
    }

    // ---
    // Recuperação de acesso
    // ---

    pub async fn request_password_reset(&self, email: &str) -> Result<(), AppError> {
        self.send_recovery(email, AuthTokenKind::PasswordReset).await
    }

    pub async fn request_magic_link(&self, email: &str) -> Result<(), AppError> {
        self.send_recovery(email, AuthTokenKind::MagicLink).await
    }

    // E-mail desconhecido não é erro: a resposta não pode revelar quem tem conta
    async fn send_recovery(&self, email: &str, kind: AuthTokenKind) -> Result<(), AppError> {
        let Some(user) = self.user_repo.find_by_email(email).await? else {
            tracing::debug!(?kind, "Recuperação pedida para e-mail sem conta");
            return Ok(());
        };

        let token = self
            .user_repo
            .create_auth_token(user.id, kind, Utc::now() + self.recovery_ttl)
            .await?;

        let (subject, path) = match kind {
            AuthTokenKind::PasswordReset => ("Redefinição de senha", "reset-password"),
            AuthTokenKind::MagicLink => ("Link de acesso", "magic-link"),
        };

        self.mailer
            .send(RecoveryEmail {
                to: user.email.clone(),
                subject,
                link: format!("{}/{}?token={}", self.portal_base_url, path, token.token),
            })
            .await
    }

    pub async fn reset_password(&self, token: Uuid, new_password: &str) -> Result<(), AppError> {
        let hashed_password = hash_password(new_password).await?;

        let mut tx = self.pool.begin().await?;

        let auth_token = self
            .user_repo
            .find_auth_token_for_update(&mut *tx, token, AuthTokenKind::PasswordReset)
            .await?
            .filter(|t| t.is_usable(Utc::now()))
            .ok_or(AppError::AuthTokenInvalid)?;

        self.user_repo
            .update_password(&mut *tx, auth_token.user_id, &hashed_password)
            .await?;
        self.user_repo.consume_auth_token(&mut *tx, token).await?;

        tx.commit().await?;

        tracing::info!(user_id = %auth_token.user_id, "Senha redefinida");
        Ok(())
    }

    /// Troca um magic link válido por um JWT.
    pub async fn verify_magic_link(&self, token: Uuid) -> Result<String, AppError> {
        let mut tx = self.pool.begin().await?;

        let auth_token = self
            .user_repo
            .find_auth_token_for_update(&mut *tx, token, AuthTokenKind::MagicLink)
            .await?
            .filter(|t| t.is_usable(Utc::now()))
            .ok_or(AppError::AuthTokenInvalid)?;

        self.user_repo.consume_auth_token(&mut *tx, token).await?;
        tx.commit().await?;

        let user = self
            .user_repo
            .find_by_id(auth_token.user_id)
            .await?
            .ok_or(AppError::AuthTokenInvalid)?;

        self.create_token(&user)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        issue_token(
            &self.jwt_secret,
            user.id,
            user.session_version,
            Utc::now(),
            self.jwt_ttl,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn issued_token_round_trips_with_session_version() {
        let user_id = Uuid::new_v4();
        let token = issue_token(SECRET, user_id, 3, Utc::now(), Duration::hours(1)).unwrap();

        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.ver, 3);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_or_foreign_tokens_are_rejected() {
        let user_id = Uuid::new_v4();
        let expired = issue_token(
            SECRET,
            user_id,
            0,
            Utc::now() - Duration::days(2),
            Duration::hours(1),
        )
        .unwrap();
        assert!(matches!(decode_token(SECRET, &expired), Err(AppError::InvalidToken)));

        let other = issue_token("outro-segredo", user_id, 0, Utc::now(), Duration::hours(1)).unwrap();
        assert!(matches!(decode_token(SECRET, &other), Err(AppError::InvalidToken)));

        assert!(matches!(decode_token(SECRET, "lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}
