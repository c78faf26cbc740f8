use crate::models::HealthResponse;
use actix_web::{HttpResponse, Result, web};
use chrono::{SecondsFormat, Utc};

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
