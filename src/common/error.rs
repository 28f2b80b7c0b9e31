use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::{common::i18n::I18nStore, middleware::i18n::Locale, models::orders::OrderStatus};

// Nosso tipo de erro, agora com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário sem cliente vinculado")]
    PortalCustomerMissing,

    // O &'static str é o sufixo da chave de tradução (ex: "customer")
    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Código de cliente duplicado: {0}")]
    CustomerCodeAlreadyExists(String),

    #[error("Código de armazém duplicado: {0}")]
    WarehouseCodeAlreadyExists(String),

    #[error("Registro ainda referenciado: {0}")]
    RecordInUse(&'static str),

    #[error("Quantidade em estoque maior que a total")]
    QuantityExceedsTotal,

    #[error("Quantidade solicitada ({requested}) maior que a disponível ({available}) para {sku}")]
    QuantityExceedsAvailable {
        sku: String,
        requested: i32,
        available: i32,
    },

    #[error("Item repetido no pedido: {0}")]
    DuplicateOrderLine(String),

    #[error("Item não pode ser pedido: {0}")]
    InventoryNotOrderable(String),

    #[error("Etapa do rascunho bloqueada: {0}")]
    DraftStageLocked(&'static str),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Não foi possível gerar um número de pedido único")]
    OrderNumberExhausted,

    #[error("Token de recuperação inválido ou expirado")]
    AuthTokenInvalid,

    #[error("Atribuição de papel inválida: {0}")]
    InvalidRoleAssignment(&'static str),

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// A resposta de erro que sai para o cliente HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::QuantityExceedsTotal
            | AppError::QuantityExceedsAvailable { .. }
            | AppError::DuplicateOrderLine(_)
            | AppError::InventoryNotOrderable(_)
            | AppError::DraftStageLocked(_)
            | AppError::AuthTokenInvalid
            | AppError::InvalidRoleAssignment(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::Forbidden | AppError::PortalCustomerMissing => StatusCode::FORBIDDEN,

            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists
            | AppError::CustomerCodeAlreadyExists(_)
            | AppError::WarehouseCodeAlreadyExists(_)
            | AppError::RecordInUse(_)
            | AppError::InvalidStatusTransition { .. }
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,

            AppError::OrderNumberExhausted => StatusCode::SERVICE_UNAVAILABLE,

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro interno em resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        if let AppError::ValidationError(errors) = self {
            let mut details = BTreeMap::new();
            collect_validation_messages(errors, None, lang, store, &mut details);
            return ApiError {
                status,
                error: store.translate(lang, "error.validation", &[]),
                details: Some(json!(details)),
            };
        }

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let (key, args): (String, Vec<(&str, String)>) = match self {
            AppError::EmailAlreadyExists => ("error.email_already_exists".into(), vec![]),
            AppError::InvalidCredentials => ("error.invalid_credentials".into(), vec![]),
            AppError::InvalidToken => ("error.invalid_token".into(), vec![]),
            AppError::Forbidden => ("error.forbidden".into(), vec![]),
            AppError::PortalCustomerMissing => ("error.portal_customer_missing".into(), vec![]),
            AppError::NotFound(resource) => (format!("error.not_found.{}", resource), vec![]),
            AppError::CustomerCodeAlreadyExists(code) => {
                ("error.customer_code_exists".into(), vec![("code", code.clone())])
            }
            AppError::WarehouseCodeAlreadyExists(code) => {
                ("error.warehouse_code_exists".into(), vec![("code", code.clone())])
            }
            AppError::RecordInUse(resource) => (format!("error.record_in_use.{}", resource), vec![]),
            AppError::QuantityExceedsTotal => ("error.quantity_exceeds_total".into(), vec![]),
            AppError::QuantityExceedsAvailable { sku, requested, available } => (
                "error.quantity_exceeds_available".into(),
                vec![
                    ("sku", sku.clone()),
                    ("requested", requested.to_string()),
                    ("available", available.to_string()),
                ],
            ),
            AppError::DuplicateOrderLine(sku) => {
                ("error.duplicate_order_line".into(), vec![("sku", sku.clone())])
            }
            AppError::InventoryNotOrderable(sku) => {
                ("error.inventory_not_orderable".into(), vec![("sku", sku.clone())])
            }
            AppError::DraftStageLocked(stage) => (format!("error.draft_stage_locked.{}", stage), vec![]),
            AppError::InvalidStatusTransition { from, to } => (
                "error.invalid_status_transition".into(),
                vec![("from", from.to_string()), ("to", to.to_string())],
            ),
            AppError::OrderNumberExhausted => ("error.order_number_exhausted".into(), vec![]),
            AppError::AuthTokenInvalid => ("error.auth_token_invalid".into(), vec![]),
            AppError::InvalidRoleAssignment(reason) => {
                (format!("error.role_assignment.{}", reason), vec![])
            }
            AppError::UniqueConstraintViolation(_) => ("error.unique_violation".into(), vec![]),
            _ => ("error.internal".into(), vec![]),
        };

        ApiError {
            status,
            error: store.translate(lang, &key, &args),
            details: None,
        }
    }

    /// Cria um erro de validação para um único campo (regras que o `validator` não expressa).
    pub fn field(field: &'static str, code: &'static str, message_key: &'static str) -> Self {
        let mut error = validator::ValidationError::new(code);
        error.message = Some(message_key.into());
        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        AppError::ValidationError(errors)
    }
}

// Achata os erros (inclusive de listas aninhadas) em "campo -> [mensagens]".
// Ex: items[0].quantity
fn collect_validation_messages(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    lang: &str,
    store: &I18nStore,
    out: &mut BTreeMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                    let args: Vec<(&str, String)> = e
                        .params
                        .iter()
                        .filter(|(name, _)| name.as_ref() != "value")
                        .map(|(name, value)| (name.as_ref(), param_to_string(value)))
                        .collect();
                    store.translate(lang, key, &args)
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_validation_messages(inner, Some(&path), lang, store, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let item_path = format!("{}[{}]", path, index);
                    collect_validation_messages(inner, Some(&item_path), lang, store, out);
                }
            }
        }
    }
}

fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extrai o nome da constraint de um erro do Postgres, quando houver.
pub(crate) fn constraint_name(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Line {
        #[validate(range(min = 1, message = "validation.quantity_min"))]
        quantity: i32,
    }

    #[derive(Debug, Validate)]
    struct Draft {
        #[validate(length(min = 1, message = "validation.required"))]
        name: String,
        #[validate(nested)]
        items: Vec<Line>,
    }

    fn store() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn validation_details_flatten_nested_lists() {
        let draft = Draft {
            name: String::new(),
            items: vec![Line { quantity: 2 }, Line { quantity: 0 }],
        };
        let errors = draft.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["name"][0], "This field is required.");
        assert!(details["items[1].quantity"][0]
            .as_str()
            .unwrap()
            .starts_with("The quantity must be at least 1"));
        assert!(details.get("items[0].quantity").is_none());
    }

    #[test]
    fn domain_errors_are_translated_with_arguments() {
        let err = AppError::QuantityExceedsAvailable {
            sku: "SKU-1".into(),
            requested: 5,
            available: 3,
        };
        let api = err.to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Solicitado 5 de 'SKU-1', mas apenas 3 disponível.");
    }

    #[test]
    fn status_codes_follow_the_error_kind() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("order").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::RecordInUse("warehouse").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending
            }
            .status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
    }
}
