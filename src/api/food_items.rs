use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::VendorUser;
use crate::db::{FoodItemOperations, StoreOperations};
use crate::models::food_item::{Category, FoodItem, NewFoodItem, UpdateFoodItem};
use crate::schemas::food_item::{
    CategoryTree, FoodItemCreateRequest, FoodItemListQuery, InventoryUpdateRequest, SearchQuery,
    SurplusMarkingRequest,
};
use crate::schemas::{PageQuery, PaginationResponse};
use crate::AppState;
use actix_web::{delete, get, patch, post, web, HttpResponse};

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/food-items")
            .app_data(web::Data::new(state.food_item_ops.clone()))
            .app_data(web::Data::new(state.store_ops.clone()))
            .service(search_food_items)
            .service(list_categories)
            .service(category_hierarchy)
            .service(my_food_items)
            .service(list_food_items)
            .service(create_food_item)
            .service(update_inventory)
            .service(mark_surplus)
            .service(inventory_history)
            .service(get_food_item)
            .service(update_food_item)
            .service(delete_food_item),
    );
}

/// Resolves the calling vendor's store id for ownership-scoped mutations.
fn vendor_store(store_ops: &StoreOperations, owner: i32) -> Result<i32, crate::db::RepositoryError> {
    Ok(store_ops.get_store_by_owner(owner)?.store_id)
}

#[utoipa::path(
    tag = "Food Items",
    params(FoodItemListQuery),
    responses((status = 200, description = "Paginated food item list")),
    summary = "List food items"
)]
#[get("")]
pub(super) async fn list_food_items(
    item_ops: web::Data<FoodItemOperations>,
    query: web::Query<FoodItemListQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    };
    let (skip, limit) = (page.skip(), page.limit());
    let (store_filter, category_filter, surplus_only) =
        (query.store_id, query.category_id, query.surplus_only);

    let ops = item_ops.get_ref().clone();
    let data = blocking(move || {
        ops.list_food_items(store_filter, category_filter, surplus_only, skip, limit)
    })
    .await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Food Items",
    params(SearchQuery),
    responses((status = 200, description = "Items ranked by name similarity")),
    summary = "Fuzzy-search food items by name"
)]
#[get("/search")]
pub(super) async fn search_food_items(
    item_ops: web::Data<FoodItemOperations>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, ApiError> {
    let q = query.into_inner().q;
    if q.trim().is_empty() {
        return Err(ApiError::validation("search query must not be empty"));
    }
    let ops = item_ops.get_ref().clone();
    let data = blocking(move || ops.search_food_items(&q)).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    tag = "Food Items",
    responses((status = 200, description = "Active categories", body = [Category])),
    summary = "List categories"
)]
#[get("/categories")]
pub(super) async fn list_categories(
    item_ops: web::Data<FoodItemOperations>,
) -> Result<HttpResponse, ApiError> {
    let ops = item_ops.get_ref().clone();
    let data = blocking(move || ops.list_categories()).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    tag = "Food Items",
    responses((status = 200, description = "Categories with their children", body = [CategoryTree])),
    summary = "List categories as a hierarchy"
)]
#[get("/categories/hierarchy")]
pub(super) async fn category_hierarchy(
    item_ops: web::Data<FoodItemOperations>,
) -> Result<HttpResponse, ApiError> {
    let ops = item_ops.get_ref().clone();
    let data = blocking(move || ops.category_hierarchy()).await?;
    let data: Vec<CategoryTree> = data.into_iter().map(CategoryTree::from).collect();
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    tag = "Food Items",
    params(PageQuery),
    responses((status = 200, description = "Vendor's own items, inactive included")),
    summary = "List own food items"
)]
#[get("/my-items")]
pub(super) async fn my_food_items(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (skip, limit) = (page.skip(), page.limit());
    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let data = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.list_store_food_items(store_id, skip, limit)
    })
    .await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Food Items",
    request_body = FoodItemCreateRequest,
    responses(
        (status = 201, description = "Item created with opening inventory", body = FoodItem),
        (status = 404, description = "Vendor store or category missing", body = ErrorBody)
    ),
    summary = "Create a food item"
)]
#[post("")]
pub(super) async fn create_food_item(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    req_data: web::Json<FoodItemCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let FoodItemCreateRequest {
        name,
        description,
        image_url,
        category_id,
        standard_price,
        total_quantity,
        expires_at,
    } = req_data.into_inner();

    if standard_price < 0.0 {
        return Err(ApiError::validation("standard_price must not be negative"));
    }
    if total_quantity < 0 {
        return Err(ApiError::validation("total_quantity must not be negative"));
    }

    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let item = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.create_food_item(NewFoodItem {
            store_id,
            category_id,
            name,
            description,
            image_url,
            standard_price,
            total_quantity,
            available_quantity: total_quantity,
            expires_at,
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(item))
}

#[utoipa::path(
    tag = "Food Items",
    responses(
        (status = 200, description = "Item details", body = FoodItem),
        (status = 404, description = "Unknown item", body = ErrorBody)
    ),
    summary = "Get a food item"
)]
#[get("/{item_id}")]
pub(super) async fn get_food_item(
    item_ops: web::Data<FoodItemOperations>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let ops = item_ops.get_ref().clone();
    let item = blocking(move || ops.get_food_item(item_id)).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    tag = "Food Items",
    request_body = UpdateFoodItem,
    responses((status = 200, description = "Updated item", body = FoodItem)),
    summary = "Partially update a food item"
)]
#[patch("/{item_id}")]
pub(super) async fn update_food_item(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<UpdateFoodItem>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let changes = req_data.into_inner();
    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let item = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.update_food_item(item_id, store_id, changes)
    })
    .await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    tag = "Food Items",
    responses((status = 204, description = "Item retired from the catalogue")),
    summary = "Soft-delete a food item"
)]
#[delete("/{item_id}")]
pub(super) async fn delete_food_item(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.delete_food_item(item_id, store_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    tag = "Food Items",
    request_body = InventoryUpdateRequest,
    responses((status = 200, description = "Item with recomputed availability", body = FoodItem)),
    summary = "Replace an item's total quantity"
)]
#[post("/{item_id}/inventory")]
pub(super) async fn update_inventory(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<InventoryUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let InventoryUpdateRequest {
        new_total_quantity,
        change_type,
        reason,
    } = req_data.into_inner();

    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let item = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.update_inventory(item_id, store_id, new_total_quantity, &change_type, reason)
    })
    .await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    tag = "Food Items",
    request_body = SurplusMarkingRequest,
    responses(
        (status = 200, description = "Item with surplus pricing applied", body = FoodItem),
        (status = 400, description = "Surplus exceeds availability", body = ErrorBody)
    ),
    summary = "Mark part of an item's stock as surplus"
)]
#[post("/{item_id}/surplus")]
pub(super) async fn mark_surplus(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
    req_data: web::Json<SurplusMarkingRequest>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let SurplusMarkingRequest {
        surplus_quantity,
        discount_percentage,
    } = req_data.into_inner();

    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let item = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.mark_surplus(item_id, store_id, surplus_quantity, discount_percentage)
    })
    .await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    tag = "Food Items",
    responses((status = 200, description = "Inventory ledger, newest first")),
    summary = "Get an item's inventory history"
)]
#[get("/{item_id}/inventory-history")]
pub(super) async fn inventory_history(
    item_ops: web::Data<FoodItemOperations>,
    store_ops: web::Data<StoreOperations>,
    vendor: VendorUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let item_id = path.into_inner();
    let ops = item_ops.get_ref().clone();
    let stores = store_ops.get_ref().clone();
    let owner = vendor.user_id();
    let logs = blocking(move || {
        let store_id = vendor_store(&stores, owner)?;
        ops.inventory_history(item_id, store_id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(logs))
}
