// src/db/role_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{is_foreign_key_violation, AppError},
    models::roles::{AppRole, Profile, UserRole, UserSummary},
};

// Papéis (user_roles) e perfis (profiles). Nenhuma das duas tabelas usa RLS:
// o guard de autenticação lê o papel antes de existir qualquer contexto.
#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Linha de papel do usuário. `None` quando ainda não foi atribuído.
    pub async fn find_role(&self, user_id: Uuid) -> Result<Option<UserRole>, AppError> {
        let role = sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role, customer_id, created_at FROM user_roles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, first_name, last_name, phone, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, first_name, last_name, phone, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_one(executor)
        .await?;
        Ok(profile)
    }

    pub async fn assign_role<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role: AppRole,
        customer_id: Option<Uuid>,
    ) -> Result<UserRole, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserRole>(
            r#"
            INSERT INTO user_roles (user_id, role, customer_id)
            VALUES ($1, $2, $3)
            RETURNING user_id, role, customer_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(role)
        .bind(customer_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // customer_id que não existe
            if is_foreign_key_violation(&e) {
                return AppError::NotFound("customer");
            }
            e.into()
        })
    }

    /// Listagem do portal administrativo: usuário + perfil + papel + nome do cliente.
    /// O nome do cliente vem de `customers`, que tem RLS; por isso recebe o executor
    /// da transação do administrador.
    pub async fn list_users<'e, E>(&self, executor: E) -> Result<Vec<UserSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT
                u.id, u.email,
                p.first_name, p.last_name, p.phone,
                r.role, r.customer_id,
                c.name AS customer_name,
                u.created_at
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            LEFT JOIN user_roles r ON r.user_id = u.id
            LEFT JOIN customers c ON c.id = r.customer_id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(users)
    }
}
