// src/models/validation.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::ValidationError;

// ---
// Validações customizadas compartilhadas pelos payloads
// ---

/// Maior valor que cabe numa coluna NUMERIC(12, 2).
// 999_999_999_999 com escala 2 (Decimal::new não é const).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Todo valor decimal é gravado em NUMERIC(12, 2): no máximo 2 casas e 10 dígitos inteiros.
pub fn check_amount(val: &Decimal) -> Result<(), ValidationError> {
    if val.normalize().scale() > 2 {
        let mut err = ValidationError::new("decimal_places");
        err.add_param("max".into(), &2);
        err.message = Some("validation.decimal_places".into());
        return Err(err);
    }
    if val.abs() > MAX_AMOUNT {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.amount_too_large".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0);
        err.message = Some("validation.not_negative".into());
        return Err(err);
    }
    check_amount(val)
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("validation.positive".into());
        return Err(err);
    }
    check_amount(val)
}

/// Códigos de cliente/armazém: 1 a 20 caracteres, letras, dígitos ou hífen.
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    let valid_len = (1..=20).contains(&code.chars().count());
    let valid_chars = code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid_len || !valid_chars {
        let mut err = ValidationError::new("code_format");
        err.message = Some("validation.code_format".into());
        return Err(err);
    }
    Ok(())
}

/// Regra central do estoque: 0 <= quantity <= total_quantity.
pub fn check_quantity_bounds(quantity: i32, total_quantity: i32) -> Result<(), ValidationError> {
    if quantity > total_quantity {
        let mut err = ValidationError::new("quantity_exceeds_total");
        err.message = Some("validation.quantity_exceeds_total".into());
        return Err(err);
    }
    Ok(())
}

pub fn check_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<(), ValidationError> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            let mut err = ValidationError::new("date_range");
            err.message = Some("validation.date_range".into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_accept_letters_digits_and_dashes_only() {
        assert!(validate_code("ACME-01").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("ACME 01").is_err());
        assert!(validate_code("A23456789012345678901").is_err());
    }

    #[test]
    fn money_checks() {
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(1500, 0)).is_ok());
    }

    #[test]
    fn amounts_fit_numeric_12_2() {
        assert!(validate_not_negative(&Decimal::new(1050, 2)).is_ok());
        // 10.500 normaliza para 10.5
        assert!(validate_not_negative(&Decimal::new(10500, 3)).is_ok());

        let err = validate_not_negative(&Decimal::new(5, 3)).unwrap_err();
        assert_eq!(err.code, "decimal_places");
        assert!(validate_positive(&Decimal::new(1001, 3)).is_err());

        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
        assert!(check_amount(&MAX_AMOUNT).is_ok());
        let err = check_amount(&(MAX_AMOUNT + Decimal::new(1, 2))).unwrap_err();
        assert_eq!(err.code, "range");
    }

    #[test]
    fn on_hand_may_equal_but_not_exceed_total() {
        assert!(check_quantity_bounds(10, 10).is_ok());
        assert!(check_quantity_bounds(12, 10).is_err());
    }

    #[test]
    fn date_range_must_be_ordered() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        assert!(check_date_range(Some(d(1)), Some(d(31))).is_ok());
        assert!(check_date_range(Some(d(1)), Some(d(1))).is_ok());
        assert!(check_date_range(Some(d(2)), Some(d(1))).is_err());
        assert!(check_date_range(None, Some(d(1))).is_ok());
    }
}
