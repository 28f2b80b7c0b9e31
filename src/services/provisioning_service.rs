// src/services/provisioning_service.rs

use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    db::{RoleRepository, UserRepository},
    models::roles::{AppRole, ProvisionUserPayload, ProvisionedUser, UserSummary},
    services::auth::hash_password,
};

/// Regras de vínculo entre papel e cliente, conferidas antes de qualquer escrita.
pub fn check_role_assignment(payload: &ProvisionUserPayload) -> Result<(), AppError> {
    match (payload.role, payload.customer_id) {
        (AppRole::CustomerAdmin, None) => Err(AppError::InvalidRoleAssignment("customer_required")),
        (AppRole::SuperAdmin, Some(_)) => Err(AppError::InvalidRoleAssignment("customer_forbidden")),
        (role, _) if role.is_legacy() => Err(AppError::InvalidRoleAssignment("legacy")),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct ProvisioningService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
}

impl ProvisioningService {
    pub fn new(user_repo: UserRepository, role_repo: RoleRepository) -> Self {
        Self { user_repo, role_repo }
    }

    /// Cria identidade, perfil e papel numa única transação: se qualquer passo falhar,
    /// nada fica gravado.
    pub async fn provision_user<'e, E>(
        &self,
        executor: E,
        payload: &ProvisionUserPayload,
    ) -> Result<ProvisionedUser, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        check_role_assignment(payload)?;

        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = executor.begin().await?;

        // 1. Identidade
        let user = self
            .user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password)
            .await
            .inspect_err(|e| tracing::warn!(step = "user", error = %e, "Falha no provisionamento"))?;

        // 2. Perfil
        self.role_repo
            .create_profile(
                &mut *tx,
                user.id,
                &payload.first_name,
                &payload.last_name,
                payload.phone.as_deref(),
            )
            .await
            .inspect_err(|e| tracing::error!(step = "profile", user_id = %user.id, error = %e, "Falha no provisionamento"))?;

        // 3. Papel
        self.role_repo
            .assign_role(&mut *tx, user.id, payload.role, payload.customer_id)
            .await
            .inspect_err(|e| tracing::error!(step = "role", user_id = %user.id, error = %e, "Falha no provisionamento"))?;

        tx.commit().await?;

        tracing::info!(user_id = %user.id, role = ?payload.role, customer_id = ?payload.customer_id, "Usuário provisionado");

        Ok(ProvisionedUser { id: user.id, email: user.email })
    }

    pub async fn list_users<'e, E>(&self, executor: E) -> Result<Vec<UserSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.role_repo.list_users(executor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payload(role: AppRole, customer_id: Option<Uuid>) -> ProvisionUserPayload {
        ProvisionUserPayload {
            email: "novo@acme.com".into(),
            password: "segredo".into(),
            customer_id,
            role,
            first_name: "Ana".into(),
            last_name: "Souza".into(),
            phone: None,
        }
    }

    #[test]
    fn customer_admin_needs_a_customer() {
        let err = check_role_assignment(&payload(AppRole::CustomerAdmin, None)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRoleAssignment("customer_required")));
        assert!(check_role_assignment(&payload(AppRole::CustomerAdmin, Some(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn super_admin_cannot_be_linked_to_a_customer() {
        let err = check_role_assignment(&payload(AppRole::SuperAdmin, Some(Uuid::new_v4()))).unwrap_err();
        assert!(matches!(err, AppError::InvalidRoleAssignment("customer_forbidden")));
        assert!(check_role_assignment(&payload(AppRole::SuperAdmin, None)).is_ok());
    }

    #[test]
    fn legacy_roles_are_not_assignable() {
        for role in [AppRole::Admin, AppRole::CustomerUser, AppRole::WarehouseStaff] {
            assert!(check_role_assignment(&payload(role, None)).is_err());
        }
    }
}
