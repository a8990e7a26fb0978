use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::food_items)]
#[diesel(primary_key(food_item_id))]
pub struct FoodItem {
    pub food_item_id: i32,
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub standard_price: f64,
    pub surplus_price: Option<f64>,
    pub surplus_discount: Option<f64>,
    pub total_quantity: i32,
    pub reserved_quantity: i32,
    pub surplus_quantity: i32,
    pub available_quantity: i32,
    pub is_marked_for_surplus: bool,
    pub marked_surplus_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_available: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodItem {
    /// Unit price an order line pays: the surplus price while the item is
    /// marked for surplus, the standard price otherwise.
    pub fn effective_price(&self) -> f64 {
        if self.is_marked_for_surplus {
            self.surplus_price.unwrap_or(self.standard_price)
        } else {
            self.standard_price
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::food_items)]
pub struct NewFoodItem {
    pub store_id: i32,
    pub category_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub standard_price: f64,
    pub total_quantity: i32,
    pub available_quantity: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(AsChangeset, Debug, Default, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::food_items)]
pub struct UpdateFoodItem {
    pub category_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub standard_price: Option<f64>,
    pub is_available: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug)]
#[diesel(table_name = crate::db::schema::inventory_logs)]
#[diesel(primary_key(log_id))]
pub struct InventoryLog {
    pub log_id: i32,
    pub food_item_id: i32,
    pub change_type: String,
    pub quantity_change: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::inventory_logs)]
pub struct NewInventoryLog {
    pub food_item_id: i32,
    pub change_type: String,
    pub quantity_change: i32,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    pub reason: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::categories)]
#[diesel(primary_key(category_id))]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub parent_category_id: Option<i32>,
    pub is_active: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::categories)]
pub struct NewCategory {
    pub name: String,
    pub parent_category_id: Option<i32>,
}
