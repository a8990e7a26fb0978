use crate::models::food_item::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct FoodItemCreateRequest {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub standard_price: f64,
    #[serde(default)]
    pub total_quantity: i32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, IntoParams)]
pub struct FoodItemListQuery {
    pub store_id: Option<i32>,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub surplus_only: bool,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Deserialize, ToSchema)]
pub struct InventoryUpdateRequest {
    pub new_total_quantity: i32,
    pub change_type: String,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SurplusMarkingRequest {
    pub surplus_quantity: i32,
    pub discount_percentage: f64,
}

/// A top-level category with its direct children.
#[derive(Serialize, ToSchema)]
pub struct CategoryTree {
    pub category_id: i32,
    pub name: String,
    pub subcategories: Vec<Category>,
}

impl From<(Category, Vec<Category>)> for CategoryTree {
    fn from((root, subcategories): (Category, Vec<Category>)) -> Self {
        Self {
            category_id: root.category_id,
            name: root.name,
            subcategories,
        }
    }
}
