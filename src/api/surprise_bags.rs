use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::{AuthedUser, VendorUser};
use crate::db::{
    BagContent, OrderLine, OrderOperations, RepositoryError, StoreOperations,
    SurpriseBagOperations,
};
use crate::models::surprise_bag::{NewSurpriseBag, SurpriseBag, UpdateSurpriseBag};
use crate::schemas::order::OrderPublic;
use crate::schemas::surprise_bag::{BagListQuery, BookingRequest, SurpriseBagCreateRequest};
use crate::schemas::{PageQuery, PaginationResponse};
use crate::services::{Notifier, OrderEvent};
use crate::AppState;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/surprise-bags")
            .app_data(web::Data::new(state.surprise_bag_ops.clone()))
            .app_data(web::Data::new(state.store_ops.clone()))
            .app_data(web::Data::new(state.order_ops.clone()))
            .app_data(web::Data::new(state.notifier.clone()))
            .service(cancel_booking)
            .service(list_bags)
            .service(create_bag)
            .service(book_bag)
            .service(get_bag)
            .service(update_bag)
            .service(delete_bag),
    );
}

#[utoipa::path(
    tag = "Surprise Bags",
    params(BagListQuery),
    responses((status = 200, description = "Bookable bags, soonest pickup first")),
    summary = "List active surprise bags"
)]
#[get("")]
pub(super) async fn list_bags(
    bag_ops: web::Data<SurpriseBagOperations>,
    query: web::Query<BagListQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };
    let (skip, limit) = (page.skip(), page.limit());
    let store_filter = query.store_id;

    let ops = bag_ops.get_ref().clone();
    let data = blocking(move || ops.list_active_bags(store_filter, skip, limit)).await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Surprise Bags",
    request_body = SurpriseBagCreateRequest,
    responses(
        (status = 201, description = "Bag created", body = SurpriseBag),
        (status = 422, description = "Pricing or pickup window invalid", body = ErrorBody)
    ),
    summary = "Create a surprise bag"
)]
#[post("")]
pub(super) async fn create_bag(
    bag_ops: web::Data<SurpriseBagOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    req_data: web::Json<SurpriseBagCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let SurpriseBagCreateRequest {
        name,
        description,
        original_value,
        discounted_price,
        quantity_available,
        pickup_start_time,
        pickup_end_time,
        contents,
    } = req_data.into_inner();

    if quantity_available < 0 {
        return Err(ApiError::validation(
            "quantity_available must not be negative",
        ));
    }

    let ops = bag_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let bag = blocking(move || {
        let store_id = stores.get_store_by_owner(owner)?.store_id;
        ops.create_surprise_bag(
            NewSurpriseBag {
                store_id,
                name,
                description,
                original_value,
                discounted_price,
                quantity_available,
                pickup_start_time,
                pickup_end_time,
            },
            contents
                .into_iter()
                .map(|c| BagContent {
                    food_item_id: c.food_item_id,
                    min_quantity: c.min_quantity,
                    max_quantity: c.max_quantity,
                })
                .collect(),
        )
    })
    .await?;
    Ok(HttpResponse::Created().json(bag))
}

#[utoipa::path(
    tag = "Surprise Bags",
    responses(
        (status = 200, description = "Bag details", body = SurpriseBag),
        (status = 404, description = "Unknown bag", body = ErrorBody)
    ),
    summary = "Get a surprise bag"
)]
#[get("/{bag_id}")]
pub(super) async fn get_bag(
    bag_ops: web::Data<SurpriseBagOperations>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let bag_id = path.into_inner();
    let ops = bag_ops.get_ref().clone();
    let bag = blocking(move || ops.get_surprise_bag(bag_id)).await?;
    Ok(HttpResponse::Ok().json(bag))
}

#[utoipa::path(
    tag = "Surprise Bags",
    request_body = UpdateSurpriseBag,
    responses((status = 200, description = "Updated bag", body = SurpriseBag)),
    summary = "Partially update a surprise bag"
)]
#[patch("/{bag_id}")]
pub(super) async fn update_bag(
    bag_ops: web::Data<SurpriseBagOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<UpdateSurpriseBag>,
) -> Result<HttpResponse, ApiError> {
    let bag_id = path.into_inner();
    let changes = req_data.into_inner();
    let ops = bag_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let bag = blocking(move || {
        let store_id = stores.get_store_by_owner(owner)?.store_id;
        ops.update_surprise_bag(bag_id, store_id, changes)
    })
    .await?;
    Ok(HttpResponse::Ok().json(bag))
}

#[utoipa::path(
    tag = "Surprise Bags",
    responses((status = 204, description = "Bag deactivated")),
    summary = "Deactivate a surprise bag"
)]
#[delete("/{bag_id}")]
pub(super) async fn delete_bag(
    bag_ops: web::Data<SurpriseBagOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let bag_id = path.into_inner();
    let ops = bag_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    blocking(move || {
        let store_id = stores.get_store_by_owner(owner)?.store_id;
        ops.delete_surprise_bag(bag_id, store_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    tag = "Surprise Bags",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Order created for the booked bag", body = OrderPublic),
        (status = 400, description = "Insufficient quantity or closed window", body = ErrorBody)
    ),
    summary = "Book a surprise bag"
)]
#[post("/{bag_id}/book")]
pub(super) async fn book_bag(
    bag_ops: web::Data<SurpriseBagOperations>,
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    path: web::Path<i32>,
    req_data: web::Json<BookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let bag_id = path.into_inner();
    let BookingRequest { quantity, notes } = req_data.into_inner();
    if quantity <= 0 {
        return Err(ApiError::validation("quantity must be positive"));
    }

    let bags = bag_ops.get_ref().clone();
    let orders = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let created = blocking(move || {
        let bag = bags.get_surprise_bag(bag_id)?;
        if !bag.is_active {
            return Err(RepositoryError::InvalidState(
                "surprise bag is no longer available".to_string(),
            ));
        }
        if !bag.booking_window_open(Utc::now()) {
            return Err(RepositoryError::InvalidState(
                "booking window has expired".to_string(),
            ));
        }
        orders.create_order(
            customer,
            vec![OrderLine::SurpriseBag {
                id: bag_id,
                quantity,
            }],
            None,
            notes,
        )
    })
    .await?;

    notifier.send(OrderEvent::Placed {
        order_id: created.order.order_id,
        store_id: created.store_id,
        total_amount: created.order.total_amount,
    });
    Ok(HttpResponse::Created().json(OrderPublic::from((created.order, created.items))))
}

#[utoipa::path(
    tag = "Surprise Bags",
    responses(
        (status = 200, description = "Booking cancelled, stock restored", body = OrderPublic),
        (status = 400, description = "Order already terminal", body = ErrorBody)
    ),
    summary = "Cancel a surprise bag booking"
)]
#[post("/booking/{order_id}/cancel")]
pub(super) async fn cancel_booking(
    order_ops: web::Data<OrderOperations>,
    notifier: web::Data<Notifier>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let orders = order_ops.get_ref().clone();
    let customer = authed.user_id();
    let (order, items, store_id) = blocking(move || {
        let order = orders.cancel_order(order_id, customer)?;
        let store_id = orders.order_store_id(order_id)?;
        let (order, items) = orders.get_order(order.order_id)?;
        Ok((order, items, store_id))
    })
    .await?;

    notifier.send(OrderEvent::Cancelled { order_id, store_id });
    Ok(HttpResponse::Ok().json(OrderPublic::from((order, items))))
}
