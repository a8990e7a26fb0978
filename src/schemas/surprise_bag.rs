use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct BagContentRequest {
    pub food_item_id: i32,
    #[serde(default = "one")]
    pub min_quantity: i32,
    #[serde(default = "one")]
    pub max_quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Deserialize, ToSchema)]
pub struct SurpriseBagCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub original_value: f64,
    pub discounted_price: f64,
    pub quantity_available: i32,
    pub pickup_start_time: DateTime<Utc>,
    pub pickup_end_time: DateTime<Utc>,
    #[serde(default)]
    pub contents: Vec<BagContentRequest>,
}

#[derive(Deserialize, IntoParams)]
pub struct BagListQuery {
    pub store_id: Option<i32>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct BookingRequest {
    pub quantity: i32,
    pub notes: Option<String>,
}
