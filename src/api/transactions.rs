use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::AuthedUser;
use crate::db::TransactionOperations;
use crate::models::transaction::Transaction;
use crate::schemas::transaction::{RefundRequest, TransactionCreateRequest, TransactionListQuery};
use crate::schemas::{PageQuery, PaginationResponse};
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};
use log::info;

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/transactions")
            .app_data(web::Data::new(state.transaction_ops.clone()))
            .service(refund_transaction)
            .service(my_transactions)
            .service(create_transaction)
            .service(get_transaction),
    );
}

#[utoipa::path(
    tag = "Transactions",
    request_body = TransactionCreateRequest,
    responses(
        (status = 201, description = "Payment recorded", body = Transaction),
        (status = 400, description = "Already paid or amount mismatch", body = ErrorBody),
        (status = 403, description = "Order owned by someone else", body = ErrorBody)
    ),
    summary = "Pay for an order"
)]
#[post("")]
pub(super) async fn create_transaction(
    transaction_ops: web::Data<TransactionOperations>,
    authed: AuthedUser,
    req_data: web::Json<TransactionCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let TransactionCreateRequest {
        order_id,
        amount,
        payment_method,
    } = req_data.into_inner();
    if amount <= 0.0 {
        return Err(ApiError::validation("amount must be positive"));
    }

    let ops = transaction_ops.get_ref().clone();
    let customer = authed.user_id();
    let transaction =
        blocking(move || ops.create_payment(order_id, customer, amount, payment_method)).await?;
    info!(
        "create_transaction: payment {} recorded for order {}",
        transaction.transaction_id, order_id
    );
    Ok(HttpResponse::Created().json(transaction))
}

#[utoipa::path(
    tag = "Transactions",
    request_body = RefundRequest,
    responses(
        (status = 201, description = "Refund recorded", body = Transaction),
        (status = 400, description = "Original not refundable", body = ErrorBody)
    ),
    summary = "Refund a transaction"
)]
#[post("/refund")]
pub(super) async fn refund_transaction(
    transaction_ops: web::Data<TransactionOperations>,
    authed: AuthedUser,
    req_data: web::Json<RefundRequest>,
) -> Result<HttpResponse, ApiError> {
    let RefundRequest { transaction_id, .. } = req_data.into_inner();
    let ops = transaction_ops.get_ref().clone();
    let requester = authed.user_id();
    let refund = blocking(move || ops.create_refund(transaction_id, requester)).await?;
    Ok(HttpResponse::Created().json(refund))
}

#[utoipa::path(
    tag = "Transactions",
    params(TransactionListQuery),
    responses((status = 200, description = "Own transactions, newest first")),
    summary = "List own transactions"
)]
#[get("/me")]
pub(super) async fn my_transactions(
    transaction_ops: web::Data<TransactionOperations>,
    authed: AuthedUser,
    query: web::Query<TransactionListQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };
    let (skip, limit) = (page.skip(), page.limit());
    let kind = query.kind;

    let ops = transaction_ops.get_ref().clone();
    let user = authed.user_id();
    let data = blocking(move || ops.list_user_transactions(user, kind, skip, limit)).await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Transactions",
    responses(
        (status = 200, description = "Transaction details", body = Transaction),
        (status = 403, description = "Neither payer nor payee", body = ErrorBody),
        (status = 404, description = "Unknown transaction", body = ErrorBody)
    ),
    summary = "Get a transaction"
)]
#[get("/{transaction_id}")]
pub(super) async fn get_transaction(
    transaction_ops: web::Data<TransactionOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let transaction_id = path.into_inner();
    let ops = transaction_ops.get_ref().clone();
    let user = authed.user_id();
    let transaction = blocking(move || {
        let transaction = ops.get_transaction(transaction_id)?;
        if transaction.payer_id != user && transaction.payee_id != user {
            return Err(crate::db::RepositoryError::Forbidden(
                "not a party to this transaction".to_string(),
            ));
        }
        Ok(transaction)
    })
    .await?;
    Ok(HttpResponse::Ok().json(transaction))
}
