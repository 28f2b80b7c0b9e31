// src/models/roles.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Papel de um usuário. Só `SuperAdmin` e `CustomerAdmin` concedem acesso;
/// os demais existem em linhas antigas e continuam legíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    SuperAdmin,
    CustomerAdmin,
    Admin,
    CustomerUser,
    WarehouseStaff,
}

impl AppRole {
    pub fn is_legacy(self) -> bool {
        !matches!(self, AppRole::SuperAdmin | AppRole::CustomerAdmin)
    }
}

// Linha da tabela user_roles: o único vínculo de autorização
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: AppRole,
    pub customer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    #[schema(example = "Maria")]
    pub first_name: Option<String>,
    #[schema(example = "Silva")]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Papel resolvido para a requisição atual. Ausência de linha em `user_roles`
/// resulta em `role: None` (sem acesso elevado), nunca em erro.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleContext {
    pub role: Option<AppRole>,
    pub customer_id: Option<Uuid>,
}

impl RoleContext {
    pub fn from_row(row: Option<UserRole>) -> Self {
        match row {
            Some(r) => Self { role: Some(r.role), customer_id: r.customer_id },
            None => Self::default(),
        }
    }

    // Comparação exata: nenhum papel (ou papel legado) não vira admin.
    pub fn is_admin(&self) -> bool {
        self.role == Some(AppRole::SuperAdmin)
    }

    pub fn is_customer(&self) -> bool {
        self.role == Some(AppRole::CustomerAdmin)
    }

    /// Para onde o cliente web deve mandar o usuário após o login.
    pub fn landing_path(&self) -> &'static str {
        if self.is_admin() {
            "/admin"
        } else if self.is_customer() {
            "/portal"
        } else {
            "/login"
        }
    }

    /// Cliente cujas linhas o usuário pode ver no portal. Só existe para `customer_admin`.
    pub fn portal_customer(&self) -> Option<Uuid> {
        if self.is_customer() { self.customer_id } else { None }
    }
}

// --- Provisionamento de usuários ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionUserPayload {
    #[validate(email(message = "validation.email"))]
    #[schema(example = "cliente@acme.com")]
    pub email: String,

    #[validate(length(min = 6, message = "validation.password_length"))]
    pub password: String,

    pub customer_id: Option<Uuid>,

    #[schema(example = "customer_admin")]
    pub role: AppRole,

    #[validate(length(min = 1, message = "validation.required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub last_name: String,

    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionedUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionUserResponse {
    pub success: bool,
    pub user: ProvisionedUser,
}

/// Linha da listagem de usuários no portal administrativo.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<AppRole>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Option<AppRole>, customer_id: Option<Uuid>) -> RoleContext {
        RoleContext { role, customer_id }
    }

    #[test]
    fn user_without_role_row_is_neither_admin_nor_customer() {
        let context = RoleContext::from_row(None);
        assert!(!context.is_admin());
        assert!(!context.is_customer());
        assert_eq!(context.landing_path(), "/login");
    }

    #[test]
    fn legacy_roles_grant_nothing() {
        for legacy in [AppRole::Admin, AppRole::CustomerUser, AppRole::WarehouseStaff] {
            let context = ctx(Some(legacy), Some(Uuid::new_v4()));
            assert!(legacy.is_legacy());
            assert!(!context.is_admin(), "{:?} não pode ser admin", legacy);
            assert!(!context.is_customer(), "{:?} não pode ser cliente", legacy);
            assert_eq!(context.portal_customer(), None);
        }
    }

    #[test]
    fn exact_roles_route_to_their_portal() {
        let admin = ctx(Some(AppRole::SuperAdmin), None);
        assert!(admin.is_admin() && !admin.is_customer());
        assert_eq!(admin.landing_path(), "/admin");
        assert_eq!(admin.portal_customer(), None);

        let customer_id = Uuid::new_v4();
        let customer = ctx(Some(AppRole::CustomerAdmin), Some(customer_id));
        assert!(customer.is_customer() && !customer.is_admin());
        assert_eq!(customer.landing_path(), "/portal");
        assert_eq!(customer.portal_customer(), Some(customer_id));
    }

    #[test]
    fn roles_use_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_string(&AppRole::CustomerAdmin).unwrap(), "\"customer_admin\"");
        let parsed: AppRole = serde_json::from_str("\"super_admin\"").unwrap();
        assert_eq!(parsed, AppRole::SuperAdmin);
    }
}
