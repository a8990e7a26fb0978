use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::VendorUser;
use crate::db::{OrderOperations, StoreOperations};
use crate::models::store::{NewStore, Store, UpdateStore};
use crate::schemas::store::{NearbyQuery, StoreCreateRequest, StoreWithDistance};
use crate::schemas::{PageQuery, PaginationResponse};
use crate::AppState;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/stores")
            .app_data(web::Data::new(state.store_ops.clone()))
            .app_data(web::Data::new(state.order_ops.clone()))
            .service(nearby_stores)
            .service(get_my_store)
            .service(update_my_store)
            .service(delete_my_store)
            .service(list_stores)
            .service(create_store)
            .service(store_rating)
            .service(get_store),
    );
}

#[utoipa::path(
    tag = "Stores",
    params(PageQuery),
    responses((status = 200, description = "Paginated store list")),
    summary = "List stores"
)]
#[get("")]
pub(super) async fn list_stores(
    store_ops: web::Data<StoreOperations>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (skip, limit) = (page.skip(), page.limit());
    let ops = store_ops.get_ref().clone();
    let data = blocking(move || ops.list_stores(skip, limit)).await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Stores",
    params(NearbyQuery),
    responses((status = 200, description = "Stores within the radius, nearest first")),
    summary = "Find stores near a point"
)]
#[get("/nearby")]
pub(super) async fn nearby_stores(
    store_ops: web::Data<StoreOperations>,
    query: web::Query<NearbyQuery>,
) -> Result<HttpResponse, ApiError> {
    let radius_km = query.radius_km();
    if !(0.0..=500.0).contains(&radius_km) {
        return Err(ApiError::validation("radius_km must be within (0, 500]"));
    }
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };
    let (skip, limit) = (page.skip(), page.limit());
    let (lat, lon) = (query.lat, query.lon);

    let ops = store_ops.get_ref().clone();
    let data = blocking(move || ops.find_nearby(lat, lon, radius_km, skip, limit)).await?;
    let data: Vec<StoreWithDistance> = data.into_iter().map(StoreWithDistance::from).collect();
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Stores",
    responses(
        (status = 200, description = "Vendor's own store", body = Store),
        (status = 404, description = "Vendor has no store yet", body = ErrorBody)
    ),
    summary = "Get own store"
)]
#[get("/me")]
pub(super) async fn get_my_store(
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
) -> Result<HttpResponse, ApiError> {
    let ops = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let store = blocking(move || ops.get_store_by_owner(owner)).await?;
    Ok(HttpResponse::Ok().json(store))
}

#[utoipa::path(
    tag = "Stores",
    request_body = UpdateStore,
    responses((status = 200, description = "Updated store", body = Store)),
    summary = "Partially update own store"
)]
#[patch("/me")]
pub(super) async fn update_my_store(
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    req_data: web::Json<UpdateStore>,
) -> Result<HttpResponse, ApiError> {
    let ops = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let changes = req_data.into_inner();
    let store = blocking(move || {
        let store = ops.get_store_by_owner(owner)?;
        ops.update_store(store.store_id, changes)
    })
    .await?;
    Ok(HttpResponse::Ok().json(store))
}

#[utoipa::path(
    tag = "Stores",
    responses((status = 204, description = "Store deleted")),
    summary = "Delete own store"
)]
#[delete("/me")]
pub(super) async fn delete_my_store(
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
) -> Result<HttpResponse, ApiError> {
    let ops = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    blocking(move || {
        let store = ops.get_store_by_owner(owner)?;
        ops.delete_store(store.store_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    tag = "Stores",
    request_body = StoreCreateRequest,
    responses(
        (status = 201, description = "Store created", body = Store),
        (status = 400, description = "Vendor already owns a store", body = ErrorBody)
    ),
    summary = "Create own store"
)]
#[post("")]
pub(super) async fn create_store(
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    req_data: web::Json<StoreCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let StoreCreateRequest {
        name,
        address,
        description,
        logo_url,
        latitude,
        longitude,
    } = req_data.into_inner();

    let ops = store_ops.get_ref().clone();
    let owner_id = vendor.user_id();
    let store = blocking(move || {
        ops.create_store(NewStore {
            owner_id,
            name,
            address,
            description,
            logo_url,
            latitude,
            longitude,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(store))
}

#[utoipa::path(
    tag = "Stores",
    responses(
        (status = 200, description = "Store details", body = Store),
        (status = 404, description = "Unknown store", body = ErrorBody)
    ),
    summary = "Get a store by id"
)]
#[get("/{store_id}")]
pub(super) async fn get_store(
    store_ops: web::Data<StoreOperations>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let store_id = path.into_inner();
    let ops = store_ops.get_ref().clone();
    let store = blocking(move || ops.get_store_by_id(store_id)).await?;
    Ok(HttpResponse::Ok().json(store))
}

#[utoipa::path(
    tag = "Stores",
    responses((status = 200, description = "Average review rating, null when unreviewed")),
    summary = "Get a store's average rating"
)]
#[get("/{store_id}/rating")]
pub(super) async fn store_rating(
    store_ops: web::Data<StoreOperations>,
    order_ops: web::Data<OrderOperations>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let store_id = path.into_inner();
    let stores = store_ops.get_ref().clone();
    let orders = order_ops.get_ref().clone();
    let average = blocking(move || {
        // 404 for unknown stores rather than a null rating.
        stores.get_store_by_id(store_id)?;
        orders.store_average_rating(store_id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "store_id": store_id, "average_rating": average })))
}
