use crate::error::AppError;
use crate::models::*;
use crate::services::SubscriptionService;
use crate::utils::parse_subscription_id;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = CreateSubscriptionResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let new = match request.into_inner().validate() {
        Ok(new) => new,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.create(new).await {
        Ok(created) => {
            log::info!("Subscription {} created", created.id);
            Ok(HttpResponse::Created().json(CreateSubscriptionResponse {
                id: created.id,
                created_at: created.created_at,
            }))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription UUID")
    ),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn get_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.get_by_id(id).await {
        Ok(Some(model)) => Ok(HttpResponse::Ok().json(SubscriptionResponse::from(model))),
        Ok(None) => Ok(AppError::NotFound("subscription not found".to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscription",
    params(
        ("user_id" = Option<String>, Query, description = "Exact user UUID"),
        ("service_name" = Option<String>, Query, description = "Case-insensitive substring"),
        ("start_date" = Option<String>, Query, description = "Lower bound on start month (MM-YYYY)"),
        ("end_date" = Option<String>, Query, description = "Upper bound on end month (MM-YYYY), active subscriptions always match")
    ),
    responses(
        (status = 200, description = "Subscriptions, newest first", body = [SubscriptionResponse]),
        (status = 400, description = "Malformed user_id, start_date or end_date filter. Rejected before querying, where only 200 and 500 would otherwise be possible", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionQuery>,
) -> Result<HttpResponse> {
    let filter = match query.into_inner().into_filter() {
        Ok(filter) => filter,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.list(&filter).await {
        Ok(rows) => {
            let items: Vec<SubscriptionResponse> =
                rows.into_iter().map(SubscriptionResponse::from).collect();
            Ok(HttpResponse::Ok().json(items))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription UUID")
    ),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription updated", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn update_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };
    let changes = match request.into_inner().validate() {
        Ok(changes) => changes,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.update(id, changes).await {
        Ok(()) => {
            log::info!("Subscription {id} updated");
            Ok(HttpResponse::Ok().json(MessageResponse::new("subscription updated successfully")))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscription",
    params(
        ("id" = String, Path, description = "Subscription UUID")
    ),
    responses(
        (status = 200, description = "Subscription deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn delete_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = match parse_subscription_id(&path) {
        Ok(id) => id,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.delete(id).await {
        Ok(()) => {
            log::info!("Subscription {id} deleted");
            Ok(HttpResponse::Ok().json(MessageResponse::new("subscription deleted successfully")))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscriptions/total-cost",
    tag = "subscription",
    params(
        ("start_date" = String, Query, description = "First month of the window (MM-YYYY)"),
        ("end_date" = String, Query, description = "Last month of the window (MM-YYYY)"),
        ("user_id" = Option<String>, Query, description = "Exact user UUID"),
        ("service_name" = Option<String>, Query, description = "Exact service name")
    ),
    responses(
        (status = 200, description = "Total cost of overlapping subscriptions", body = TotalCostResponse),
        (status = 400, description = "Missing or malformed bounds", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn get_total_cost(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> Result<HttpResponse> {
    let window = match query.into_inner().into_window() {
        Ok(window) => window,
        Err(e) => return Ok(e.error_response()),
    };

    match subscription_service.total_cost(&window).await {
        Ok((total_cost, count)) => {
            Ok(HttpResponse::Ok().json(TotalCostResponse::new(total_cost, count)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::post().to(create_subscription))
            .route("", web::get().to(list_subscriptions))
            // must precede "/{id}"
            .route("/total-cost", web::get().to(get_total_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::patch().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
