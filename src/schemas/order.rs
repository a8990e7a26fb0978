use crate::db::OrderLine;
use crate::models::order::{Order, OrderItem, OrderStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inbound order line carrying two optional references; exactly one must
/// be set. `into_line` is the only place that inspects the pair; the rest
/// of the crate works with the `OrderLine` union.
#[derive(Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub surprise_bag_id: Option<i32>,
    pub food_item_id: Option<i32>,
    pub quantity: i32,
}

impl OrderLineRequest {
    pub fn into_line(self) -> Result<OrderLine, String> {
        match (self.surprise_bag_id, self.food_item_id) {
            (Some(id), None) => Ok(OrderLine::SurpriseBag {
                id,
                quantity: self.quantity,
            }),
            (None, Some(id)) => Ok(OrderLine::FoodItem {
                id,
                quantity: self.quantity,
            }),
            (Some(_), Some(_)) => {
                Err("order line must reference either a surprise bag or a food item, not both"
                    .to_string())
            }
            (None, None) => {
                Err("order line must reference a surprise bag or a food item".to_string())
            }
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct OrderCreateRequest {
    pub items: Vec<OrderLineRequest>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct OrderPublic {
    pub order_id: i32,
    pub customer_id: i32,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl From<(Order, Vec<OrderItem>)> for OrderPublic {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        Self {
            order_id: order.order_id,
            customer_id: order.customer_id,
            status: order.status,
            total_amount: order.total_amount,
            delivery_address: order.delivery_address,
            notes: order.notes,
            created_at: order.created_at,
            items,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct OrderStatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewCreateRequest {
    pub rating: i32,
    pub comment: Option<String>,
}
