use crate::entities::subscription_entity;
use crate::error::{AppError, AppResult};
use crate::utils::{
    MonthYear, non_empty, parse_month_year, parse_user_id, validate_price, validate_service_name,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const CURRENCY: &str = "RUB";

const INVALID_START_DATE: &str = "invalid start date format, expected MM-YYYY";
const INVALID_END_DATE: &str = "invalid end date format, expected MM-YYYY";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: String,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// A create request that passed validation; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: MonthYear,
    pub end_date: Option<MonthYear>,
}

impl CreateSubscriptionRequest {
    pub fn validate(self) -> AppResult<NewSubscription> {
        let service_name = validate_service_name(&self.service_name)?;
        let price = validate_price(self.price)?;
        let start_date = parse_month_year(&self.start_date, INVALID_START_DATE)?;
        let end_date = self
            .end_date
            .as_deref()
            .map(|raw| parse_month_year(raw, INVALID_END_DATE))
            .transpose()?;
        let user_id = parse_user_id(&self.user_id)?;

        Ok(NewSubscription {
            service_name,
            price,
            user_id,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubscriptionRequest {
    #[schema(example = "Yandex Plus")]
    pub service_name: Option<String>,
    #[schema(example = 450)]
    pub price: Option<i32>,
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

/// Fields to overwrite on update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionChanges {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub end_date: Option<MonthYear>,
}

impl SubscriptionChanges {
    pub fn is_empty(&self) -> bool {
        self.service_name.is_none() && self.price.is_none() && self.end_date.is_none()
    }
}

impl UpdateSubscriptionRequest {
    pub fn validate(self) -> AppResult<SubscriptionChanges> {
        Ok(SubscriptionChanges {
            service_name: self
                .service_name
                .as_deref()
                .map(validate_service_name)
                .transpose()?,
            price: self.price.map(validate_price).transpose()?,
            end_date: self
                .end_date
                .as_deref()
                .map(|raw| parse_month_year(raw, INVALID_END_DATE))
                .transpose()?,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionQuery {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Optional criteria shared by listing and cost aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start_date: Option<MonthYear>,
    pub end_date: Option<MonthYear>,
}

impl SubscriptionQuery {
    pub fn into_filter(self) -> AppResult<SubscriptionFilter> {
        Ok(SubscriptionFilter {
            user_id: non_empty(self.user_id)
                .as_deref()
                .map(parse_user_id)
                .transpose()?,
            service_name: non_empty(self.service_name),
            start_date: non_empty(self.start_date)
                .as_deref()
                .map(|raw| parse_month_year(raw, INVALID_START_DATE))
                .transpose()?,
            end_date: non_empty(self.end_date)
                .as_deref()
                .map(|raw| parse_month_year(raw, INVALID_END_DATE))
                .transpose()?,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct TotalCostQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub service_name: Option<String>,
}

/// Inclusive month window for cost aggregation plus exact-match filters.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalCostWindow {
    pub start: MonthYear,
    pub end: MonthYear,
    pub filter: SubscriptionFilter,
}

impl TotalCostQuery {
    pub fn into_window(self) -> AppResult<TotalCostWindow> {
        let (Some(start), Some(end)) = (non_empty(self.start_date), non_empty(self.end_date))
        else {
            return Err(AppError::ValidationError(
                "start_date and end_date are required".to_string(),
            ));
        };
        let start = parse_month_year(&start, "invalid start_date format, expected MM-YYYY")?;
        let end = parse_month_year(&end, "invalid end_date format, expected MM-YYYY")?;

        Ok(TotalCostWindow {
            start,
            end,
            filter: SubscriptionFilter {
                user_id: non_empty(self.user_id)
                    .as_deref()
                    .map(parse_user_id)
                    .transpose()?,
                service_name: non_empty(self.service_name),
                ..Default::default()
            },
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    #[schema(value_type = String, example = "07-2025")]
    pub start_date: MonthYear,
    #[schema(value_type = Option<String>, example = "12-2025")]
    pub end_date: Option<MonthYear>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<subscription_entity::Model> for SubscriptionResponse {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            id: m.id,
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: MonthYear::from_date(m.start_date),
            end_date: m.end_date.map(MonthYear::from_date),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalCostResponse {
    pub total_cost: i64,
    #[schema(example = "RUB")]
    pub currency: String,
    pub count: i64,
}

impl TotalCostResponse {
    pub fn new(total_cost: i64, count: i64) -> Self {
        Self {
            total_cost,
            currency: CURRENCY.to_string(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

    fn create_request() -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            service_name: "Yandex Plus".into(),
            price: 400,
            user_id: USER.into(),
            start_date: "07-2023".into(),
            end_date: None,
        }
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::ValidationError(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_request_validates() {
        let new = create_request().validate().unwrap();
        assert_eq!(new.service_name, "Yandex Plus");
        assert_eq!(new.user_id.to_string(), USER);
        assert_eq!(new.start_date.to_string(), "07-2023");
        assert_eq!(new.end_date, None);
    }

    #[test]
    fn test_create_keeps_service_name_as_sent() {
        let req = CreateSubscriptionRequest {
            service_name: " Yandex Plus ".into(),
            ..create_request()
        };
        assert_eq!(req.validate().unwrap().service_name, " Yandex Plus ");

        let req = CreateSubscriptionRequest {
            service_name: " \t".into(),
            ..create_request()
        };
        assert_eq!(validation_message(req.validate().unwrap_err()), "service_name is required");
    }

    #[test]
    fn test_create_rejects_wrong_start_format() {
        let req = CreateSubscriptionRequest {
            start_date: "2023-07".into(),
            ..create_request()
        };
        assert_eq!(validation_message(req.validate().unwrap_err()), INVALID_START_DATE);
    }

    #[test]
    fn test_create_rejects_wrong_end_format() {
        let req = CreateSubscriptionRequest {
            end_date: Some("12/2023".into()),
            ..create_request()
        };
        assert_eq!(validation_message(req.validate().unwrap_err()), INVALID_END_DATE);
    }

    #[test]
    fn test_create_rejects_bad_user_id_and_price() {
        let req = CreateSubscriptionRequest {
            user_id: "42".into(),
            ..create_request()
        };
        assert_eq!(validation_message(req.validate().unwrap_err()), "invalid user_id format");

        let req = CreateSubscriptionRequest {
            price: 0,
            ..create_request()
        };
        assert_eq!(
            validation_message(req.validate().unwrap_err()),
            "price must be greater than 0"
        );
    }

    #[test]
    fn test_end_date_before_start_is_accepted() {
        let req = CreateSubscriptionRequest {
            start_date: "07-2023".into(),
            end_date: Some("01-2023".into()),
            ..create_request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_validates_supplied_fields_only() {
        let changes = UpdateSubscriptionRequest::default().validate().unwrap();
        assert!(changes.is_empty());

        let changes = UpdateSubscriptionRequest {
            price: Some(500),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(changes.price, Some(500));
        assert!(changes.service_name.is_none() && changes.end_date.is_none());

        let err = UpdateSubscriptionRequest {
            end_date: Some("2024-01".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(validation_message(err), INVALID_END_DATE);
    }

    #[test]
    fn test_list_query_treats_empty_as_absent() {
        let filter = SubscriptionQuery {
            user_id: Some(String::new()),
            service_name: Some(String::new()),
            start_date: None,
            end_date: Some(String::new()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter, SubscriptionFilter::default());
    }

    #[test]
    fn test_list_query_parses_fields() {
        let filter = SubscriptionQuery {
            user_id: Some(USER.into()),
            service_name: Some("plus".into()),
            start_date: Some("01-2023".into()),
            end_date: Some("12-2023".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.service_name.as_deref(), Some("plus"));
        assert_eq!(filter.start_date.unwrap().to_string(), "01-2023");
        assert_eq!(filter.end_date.unwrap().to_string(), "12-2023");
    }

    #[test]
    fn test_total_cost_requires_both_bounds() {
        let err = TotalCostQuery {
            start_date: Some("01-2023".into()),
            ..Default::default()
        }
        .into_window()
        .unwrap_err();
        assert_eq!(validation_message(err), "start_date and end_date are required");

        let err = TotalCostQuery {
            start_date: Some("01-2023".into()),
            end_date: Some("2023-12".into()),
            ..Default::default()
        }
        .into_window()
        .unwrap_err();
        assert_eq!(
            validation_message(err),
            "invalid end_date format, expected MM-YYYY"
        );
    }

    #[test]
    fn test_total_cost_window_drops_date_filters() {
        let window = TotalCostQuery {
            start_date: Some("01-2023".into()),
            end_date: Some("12-2023".into()),
            user_id: None,
            service_name: Some("Netflix".into()),
        }
        .into_window()
        .unwrap();
        assert_eq!(window.start.to_string(), "01-2023");
        assert_eq!(window.end.to_string(), "12-2023");
        assert_eq!(window.filter.service_name.as_deref(), Some("Netflix"));
        assert!(window.filter.start_date.is_none() && window.filter.end_date.is_none());
    }

    #[test]
    fn test_total_cost_response_currency() {
        let resp = TotalCostResponse::new(350, 2);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, serde_json::json!({"total_cost": 350, "currency": "RUB", "count": 2}));
    }
}
