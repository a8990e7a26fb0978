use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::surprise_bags)]
#[diesel(primary_key(surprise_bag_id))]
pub struct SurpriseBag {
    pub surprise_bag_id: i32,
    pub store_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub original_value: f64,
    pub discounted_price: f64,
    pub quantity_available: i32,
    pub pickup_start_time: DateTime<Utc>,
    pub pickup_end_time: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SurpriseBag {
    /// A bag can be booked while its pickup window has not closed.
    pub fn booking_window_open(&self, now: DateTime<Utc>) -> bool {
        self.pickup_end_time > now
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::surprise_bags)]
pub struct NewSurpriseBag {
    pub store_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub original_value: f64,
    pub discounted_price: f64,
    pub quantity_available: i32,
    pub pickup_start_time: DateTime<Utc>,
    pub pickup_end_time: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Default, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::surprise_bags)]
pub struct UpdateSurpriseBag {
    pub name: Option<String>,
    pub description: Option<String>,
    pub original_value: Option<f64>,
    pub discounted_price: Option<f64>,
    pub quantity_available: Option<i32>,
    pub pickup_start_time: Option<DateTime<Utc>>,
    pub pickup_end_time: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug)]
#[diesel(table_name = crate::db::schema::surprise_bag_items)]
#[diesel(primary_key(bag_item_id))]
pub struct SurpriseBagItem {
    pub bag_item_id: i32,
    pub surprise_bag_id: i32,
    pub food_item_id: i32,
    pub min_quantity: i32,
    pub max_quantity: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::surprise_bag_items)]
pub struct NewSurpriseBagItem {
    pub surprise_bag_id: i32,
    pub food_item_id: i32,
    pub min_quantity: i32,
    pub max_quantity: i32,
}
