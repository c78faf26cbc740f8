pub mod health;
pub mod subscription;

pub use health::health_config;
pub use subscription::subscription_config;

use crate::error::AppError;
use actix_web::web;

/// Undecodable JSON bodies become 400 validation errors.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Invalid request body: {err}");
        AppError::ValidationError(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        log::warn!("Invalid query string: {err}");
        AppError::ValidationError(err.to_string()).into()
    })
}

/// Everything served under `/api/v1`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .configure(subscription_config)
        .configure(health_config);
}
