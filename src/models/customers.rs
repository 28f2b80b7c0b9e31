// src/models/customers.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{validate_code, validate_not_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "customer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

// --- CLIENTE (dono do estoque e dos pedidos) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    #[schema(example = "ACME")]
    pub code: String,
    #[schema(example = "Acme Distribuição Ltda")]
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub billing_email: Option<String>,
    pub status: CustomerStatus,
    // Prazo de pagamento em dias (ex: 30 = "30 dias")
    #[schema(example = 30)]
    pub credit_terms_days: Option<i32>,
    pub credit_limit: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usado tanto na criação quanto na edição (PUT substitui o cadastro inteiro).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    #[validate(custom(function = "validate_code"))]
    #[schema(example = "ACME")]
    pub code: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,

    pub contact_name: Option<String>,

    #[validate(email(message = "validation.email"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    #[validate(email(message = "validation.email"))]
    pub billing_email: Option<String>,

    #[serde(default)]
    pub status: CustomerStatus,

    #[validate(range(min = 0, message = "validation.not_negative"))]
    pub credit_terms_days: Option<i32>,

    #[validate(custom(function = "validate_not_negative"))]
    pub credit_limit: Option<Decimal>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerFilter {
    pub status: Option<CustomerStatus>,
    /// Busca por nome ou código
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CustomerPayload {
        serde_json::from_value(serde_json::json!({
            "code": "ACME",
            "name": "Acme",
            "email": "ops@acme.com",
            "creditTermsDays": 30
        }))
        .unwrap()
    }

    #[test]
    fn status_defaults_to_active() {
        let p = payload();
        assert_eq!(p.status, CustomerStatus::Active);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_bad_code_email_and_negative_terms() {
        let mut p = payload();
        p.code = "AC ME".into();
        p.email = Some("not-an-email".into());
        p.credit_terms_days = Some(-5);
        p.credit_limit = Some(Decimal::new(-100, 0));

        let errors = p.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["code", "email", "credit_terms_days", "credit_limit"] {
            assert!(fields.contains_key(field), "esperava erro em {}", field);
        }
    }
}
