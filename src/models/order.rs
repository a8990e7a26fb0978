use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    AwaitingPickup,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::AwaitingPickup => "awaiting_pickup",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "awaiting_pickup" => Some(OrderStatus::AwaitingPickup),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Forward progression plus cancellation from any non-terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, OrderStatus::Cancelled) => true,
            (OrderStatus::Pending, OrderStatus::Confirmed) => true,
            (OrderStatus::Confirmed, OrderStatus::AwaitingPickup) => true,
            (OrderStatus::Confirmed, OrderStatus::Completed) => true,
            (OrderStatus::AwaitingPickup, OrderStatus::Completed) => true,
            _ => false,
        }
    }

    /// Pickup may only be confirmed once the vendor has accepted the order.
    pub fn pickup_confirmable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::AwaitingPickup)
    }
}

impl ToSql<Text, Pg> for OrderStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        <str as ToSql<Text, Pg>>::to_sql(self.as_str(), &mut out.reborrow())
    }
}

impl FromSql<Text, Pg> for OrderStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        OrderStatus::from_str(&value)
            .ok_or_else(|| format!("unrecognized order status: {value}").into())
    }
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::orders)]
#[diesel(primary_key(order_id))]
pub struct Order {
    pub order_id: i32,
    pub customer_id: i32,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::orders)]
pub struct NewOrder {
    pub customer_id: i32,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::order_items)]
#[diesel(primary_key(order_item_id))]
pub struct OrderItem {
    pub order_item_id: i32,
    pub order_id: i32,
    pub surprise_bag_id: Option<i32>,
    pub food_item_id: Option<i32>,
    pub quantity: i32,
    pub price_per_item: f64,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub surprise_bag_id: Option<i32>,
    pub food_item_id: Option<i32>,
    pub quantity: i32,
    pub price_per_item: f64,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug)]
#[diesel(table_name = crate::db::schema::reviews)]
#[diesel(primary_key(review_id))]
pub struct Review {
    pub review_id: i32,
    pub user_id: i32,
    pub order_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::reviews)]
pub struct NewReview {
    pub user_id: i32,
    pub order_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
}
