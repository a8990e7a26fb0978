use crate::models::transaction::{TransactionKind, TransactionMethod};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct TransactionCreateRequest {
    pub order_id: i32,
    pub amount: f64,
    pub payment_method: TransactionMethod,
}

#[derive(Deserialize, ToSchema)]
pub struct RefundRequest {
    pub transaction_id: i32,
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ConfirmPickupRequest {
    pub payment_method: TransactionMethod,
}

#[derive(Deserialize, IntoParams)]
pub struct TransactionListQuery {
    pub kind: Option<TransactionKind>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
