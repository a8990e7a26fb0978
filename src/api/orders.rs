use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::{AuthedUser, VendorUser};
use crate::db::{OrderOperations, StoreOperations};
use crate::models::order::{OrderStatus, Review};
use crate::models::transaction::Transaction;
use crate::models::user::UserRole;
use crate::schemas::order::{
    OrderCreateRequest, OrderPublic, OrderStatusUpdateRequest, ReviewCreateRequest,
};
use crate::schemas::transaction::ConfirmPickupRequest;
use crate::schemas::{PageQuery, PaginationResponse};
use crate::services::{Notifier, OrderEvent};
use crate::AppState;
use actix_web::{get, patch, post, web, HttpResponse};
use log::debug;

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/orders")
            .app_data(web::Data::new(state.order_ops.clone()))
            .app_data(web::Data::new(state.store_ops.clone()))
            .app_data(web::Data::new(state.notifier.clone()))
            .service(my_orders)
            .service(vendor_orders)
            .service(store_orders)
            .service(create_order)
            .service(update_order_status)
            .service(confirm_pickup)
            .service(cancel_order)
            .service(cancel_order_patch)
            .service(review_order)
            .service(get_order),
    );
}

#[utoipa::path(
    tag = "Orders",
    request_body = OrderCreateRequest,
    responses(
        (status = 201, description = "Order created, stock decremented", body = OrderPublic),
        (status = 400, description = "Insufficient quantity", body = ErrorBody),
        (status = 404, description = "Referenced sellable missing", body = ErrorBody),
        (status = 422, description = "Malformed order line", body = ErrorBody)
    ),
    summary = "Create an order"
)]
#[post("")]
pub(super) async fn create_order(
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    req_data: web::Json<OrderCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let OrderCreateRequest {
        items,
        delivery_address,
        notes,
    } = req_data.into_inner();

    let lines = items
        .into_iter()
        .map(|line| line.into_line())
        .collect::<Result<Vec<_>, String>>()
        .map_err(ApiError::validation)?;

    let ops = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let created = blocking(move || ops.create_order(customer, lines, delivery_address, notes)).await?;

    debug!(
        "create_order: order {} created for customer {} (total {:.2})",
        created.order.order_id, customer, created.order.total_amount
    );
    notifier.send(OrderEvent::Placed {
        order_id: created.order.order_id,
        store_id: created.store_id,
        total_amount: created.order.total_amount,
    });
    Ok(HttpResponse::Created().json(OrderPublic::from((created.order, created.items))))
}

#[utoipa::path(
    tag = "Orders",
    params(PageQuery),
    responses((status = 200, description = "Own orders, newest first")),
    summary = "List own orders"
)]
#[get("/me")]
pub(super) async fn my_orders(
    order_ops: web::Data<OrderOperations>,
    authed: AuthedUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (skip, limit) = (page.skip(), page.limit());
    let ops = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let data = blocking(move || ops.list_customer_orders(customer, skip, limit)).await?;
    let data: Vec<OrderPublic> = data.into_iter().map(OrderPublic::from).collect();
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Orders",
    params(PageQuery),
    responses((status = 200, description = "Incoming orders for the vendor's store")),
    summary = "List orders for own store"
)]
#[get("/vendor/me")]
pub(super) async fn vendor_orders(
    order_ops: web::Data<OrderOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (skip, limit) = (page.skip(), page.limit());
    let ops = order_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let data = blocking(move || {
        let store = stores.get_store_by_owner(owner)?;
        ops.list_store_orders(store.store_id, skip, limit)
    })
    .await?;
    let data: Vec<OrderPublic> = data.into_iter().map(OrderPublic::from).collect();
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Orders",
    params(PageQuery),
    responses(
        (status = 200, description = "Orders for the given store"),
        (status = 403, description = "Store owned by another vendor", body = ErrorBody)
    ),
    summary = "List orders for a specific store"
)]
#[get("/store/{store_id}")]
pub(super) async fn store_orders(
    order_ops: web::Data<OrderOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let store_id = path.into_inner();
    let (skip, limit) = (page.skip(), page.limit());
    let ops = order_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let data = blocking(move || {
        let own = stores.get_store_by_owner(owner)?;
        if own.store_id != store_id {
            return Err(crate::db::RepositoryError::Forbidden(
                "not authorized to view orders for this store".to_string(),
            ));
        }
        ops.list_store_orders(store_id, skip, limit)
    })
    .await?;
    let data: Vec<OrderPublic> = data.into_iter().map(OrderPublic::from).collect();
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Orders",
    responses(
        (status = 200, description = "Order with its lines", body = OrderPublic),
        (status = 403, description = "Neither the customer nor the vendor", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody)
    ),
    summary = "Get an order"
)]
#[get("/{order_id}")]
pub(super) async fn get_order(
    order_ops: web::Data<OrderOperations>,
    store_ops: web::Data<StoreOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let ops = order_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let principal = authed.0;
    let (order, items) = blocking(move || {
        let (order, items) = ops.get_order(order_id)?;
        if order.customer_id == principal.user_id {
            return Ok((order, items));
        }
        if principal.role == UserRole::Vendor {
            let own = stores.get_store_by_owner(principal.user_id)?;
            if ops.order_store_id(order_id)? == own.store_id {
                return Ok((order, items));
            }
        }
        Err(crate::db::RepositoryError::Forbidden(
            "not authorized to view this order".to_string(),
        ))
    })
    .await?;
    Ok(HttpResponse::Ok().json(OrderPublic::from((order, items))))
}

#[utoipa::path(
    tag = "Orders",
    request_body = OrderStatusUpdateRequest,
    responses(
        (status = 200, description = "Order after the transition", body = OrderPublic),
        (status = 400, description = "Transition not allowed", body = ErrorBody)
    ),
    summary = "Advance an order's status"
)]
#[patch("/{order_id}/status")]
pub(super) async fn update_order_status(
    order_ops: web::Data<OrderOperations>,
    store_ops: web::Data<StoreOperations>,
    notifier: web::Data<Notifier>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<OrderStatusUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let next = req_data.into_inner().status;
    let ops = order_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let (order, items, store_id) = blocking(move || {
        let store = stores.get_store_by_owner(owner)?;
        let order = ops.update_status(order_id, store.store_id, next)?;
        let (order, items) = ops.get_order(order.order_id)?;
        Ok((order, items, store.store_id))
    })
    .await?;

    match order.status {
        OrderStatus::Confirmed => notifier.send(OrderEvent::Confirmed {
            order_id,
            store_id,
            customer_id: order.customer_id,
        }),
        OrderStatus::Cancelled => notifier.send(OrderEvent::Cancelled { order_id, store_id }),
        _ => {}
    }
    Ok(HttpResponse::Ok().json(OrderPublic::from((order, items))))
}

#[utoipa::path(
    tag = "Orders",
    request_body = ConfirmPickupRequest,
    responses(
        (status = 200, description = "Payment recorded, order completed", body = Transaction),
        (status = 400, description = "Order not awaiting pickup", body = ErrorBody)
    ),
    summary = "Confirm a customer picked up an order"
)]
#[post("/{order_id}/confirm-pickup")]
pub(super) async fn confirm_pickup(
    order_ops: web::Data<OrderOperations>,
    store_ops: web::Data<StoreOperations>,
    notifier: web::Data<Notifier>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<ConfirmPickupRequest>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let method = req_data.into_inner().payment_method;
    let ops = order_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let (order, transaction) = blocking(move || {
        let store = stores.get_store_by_owner(owner)?;
        ops.confirm_pickup(order_id, store.store_id, owner, method)
    })
    .await?;

    notifier.send(OrderEvent::Completed {
        order_id,
        customer_id: order.customer_id,
        total_amount: order.total_amount,
    });
    Ok(HttpResponse::Ok().json(transaction))
}

#[utoipa::path(
    tag = "Orders",
    responses(
        (status = 200, description = "Order cancelled, bag stock restored", body = OrderPublic),
        (status = 400, description = "Order already terminal", body = ErrorBody)
    ),
    summary = "Cancel own order"
)]
#[post("/{order_id}/cancel")]
pub(super) async fn cancel_order(
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    cancel_order_inner(order_ops, notifier, authed, path.into_inner()).await
}

#[patch("/{order_id}/cancel")]
pub(super) async fn cancel_order_patch(
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    cancel_order_inner(order_ops, notifier, authed, path.into_inner()).await
}

async fn cancel_order_inner(
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    order_id: i32,
) -> Result<HttpResponse, ApiError> {
    let ops = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let (order, items, store_id) = blocking(move || {
        let order = ops.cancel_order(order_id, customer)?;
        let store_id = ops.order_store_id(order_id)?;
        let (order, items) = ops.get_order(order.order_id)?;
        Ok((order, items, store_id))
    })
    .await?;

    notifier.send(OrderEvent::Cancelled { order_id, store_id });
    Ok(HttpResponse::Ok().json(OrderPublic::from((order, items))))
}

#[utoipa::path(
    tag = "Orders",
    request_body = ReviewCreateRequest,
    responses(
        (status = 201, description = "Review stored", body = Review),
        (status = 400, description = "Order not completed or already reviewed", body = ErrorBody),
        (status = 422, description = "Rating out of range", body = ErrorBody)
    ),
    summary = "Review a completed order"
)]
#[post("/{order_id}/review")]
pub(super) async fn review_order(
    order_ops: web::Data<OrderOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
    req_data: web::Json<ReviewCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let ReviewCreateRequest { rating, comment } = req_data.into_inner();
    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation("rating must be between 1 and 5"));
    }

    let ops = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let review = blocking(move || ops.create_review(order_id, customer, rating, comment)).await?;
    Ok(HttpResponse::Created().json(review))
}
