// src/models/warehouses.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{validate_code, validate_positive};

// O local físico onde o estoque dos clientes fica guardado
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    #[schema(example = "WH-SP1")]
    pub code: String,
    #[schema(example = "Armazém São Paulo 1")]
    pub name: String,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    // Capacidade em unidades de estoque
    #[schema(example = "25000")]
    pub capacity: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehousePayload {
    #[validate(custom(function = "validate_code"))]
    pub code: String,

    #[validate(length(min = 1, message = "validation.required"))]
    pub name: String,

    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    #[validate(custom(function = "validate_positive"))]
    pub capacity: Option<Decimal>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
