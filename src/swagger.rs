use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::list_subscriptions,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::get_total_cost,
        handlers::health::health_check,
    ),
    components(
        schemas(
            CreateSubscriptionRequest,
            CreateSubscriptionResponse,
            UpdateSubscriptionRequest,
            SubscriptionResponse,
            TotalCostResponse,
            MessageResponse,
            HealthResponse,
            ApiError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "subscription", description = "Subscription records API"),
        (name = "health", description = "Liveness check"),
    ),
    info(
        title = "Subscription Service API",
        version = "1.0.0",
        description = "CRUD and cost aggregation over user subscriptions"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_subscription_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/subscriptions"));
        assert!(paths.contains_key("/subscriptions/{id}"));
        assert!(paths.contains_key("/subscriptions/total-cost"));
        assert!(paths.contains_key("/health"));
    }
}
