// src/db/user_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{constraint_name, AppError},
    models::auth::{AuthToken, AuthTokenKind, User},
};

const USER_COLUMNS: &str = "id, email, password_hash, session_version, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (comparação sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let maybe_user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES (lower($1), $2) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .fetch_one(executor)
            .await
            .map_err(|e| match constraint_name(&e).as_deref() {
                Some("users_email_key") => AppError::EmailAlreadyExists,
                _ => e.into(),
            })
    }

    /// Troca a senha e invalida todas as sessões abertas.
    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, session_version = session_version + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Logout: tokens emitidos com a versão anterior deixam de valer.
    pub async fn bump_session_version(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET session_version = session_version + 1, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---
    // Tokens de recuperação (reset de senha e magic link)
    // ---

    pub async fn create_auth_token(
        &self,
        user_id: Uuid,
        kind: AuthTokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthToken, AppError> {
        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, kind, expires_at)
            VALUES ($1, $2, $3)
            RETURNING token, user_id, kind, expires_at, consumed_at, created_at
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(token)
    }

    /// Busca e trava o token para consumo dentro de uma transação.
    pub async fn find_auth_token_for_update<'e, E>(
        &self,
        executor: E,
        token: Uuid,
        kind: AuthTokenKind,
    ) -> Result<Option<AuthToken>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = sqlx::query_as::<_, AuthToken>(
            r#"
            SELECT token, user_id, kind, expires_at, consumed_at, created_at
            FROM auth_tokens
            WHERE token = $1 AND kind = $2
            FOR UPDATE
            "#,
        )
        .bind(token)
        .bind(kind)
        .fetch_optional(executor)
        .await?;
        Ok(found)
    }

    pub async fn consume_auth_token<'e, E>(&self, executor: E, token: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE auth_tokens SET consumed_at = now() WHERE token = $1")
            .bind(token)
            .execute(executor)
            .await?;
        Ok(())
    }
}
