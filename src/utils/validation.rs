use crate::error::{AppError, AppResult};
use crate::utils::MonthYear;
use uuid::Uuid;

pub fn parse_subscription_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError("invalid subscription id".into()))
}

pub fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::ValidationError("invalid user_id format".into()))
}

/// `message` is returned verbatim so callers can name the offending field.
pub fn parse_month_year(raw: &str, message: &str) -> AppResult<MonthYear> {
    raw.parse()
        .map_err(|_| AppError::ValidationError(message.to_string()))
}

/// Rejects blank names. A valid name is kept exactly as submitted.
pub fn validate_service_name(name: &str) -> AppResult<String> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "service_name is required".to_string(),
        ));
    }
    Ok(name.to_string())
}

pub fn validate_price(price: i32) -> AppResult<i32> {
    if price <= 0 {
        return Err(AppError::ValidationError(
            "price must be greater than 0".to_string(),
        ));
    }
    Ok(price)
}

/// Query strings send `?user_id=` for unset fields; those count as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
