mod auth;
mod chat;
mod errors;
mod food_items;
mod notifications;
mod orders;
mod stores;
mod surprise_bags;
mod transactions;
mod users;

use crate::db::RepositoryError;
use crate::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use log::error;
use utoipa::OpenApi;

pub use errors::{default_error_handler, ApiError, ErrorBody};

#[get("/")]
async fn root_endpoint() -> impl Responder {
    HttpResponse::Ok().body("Server up!")
}

#[get("/health")]
async fn health_endpoint() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[derive(OpenApi)]
#[openapi(
    info(title = "WiseBite API", description = "Surplus-food marketplace backend"),
    paths(
        auth::signup,
        auth::login,
        users::get_me,
        users::update_me,
        users::delete_me,
        stores::list_stores,
        stores::nearby_stores,
        stores::get_my_store,
        stores::update_my_store,
        stores::create_store,
        stores::get_store,
        stores::store_rating,
        food_items::list_food_items,
        food_items::search_food_items,
        food_items::list_categories,
        food_items::category_hierarchy,
        food_items::my_food_items,
        food_items::create_food_item,
        food_items::get_food_item,
        food_items::update_food_item,
        food_items::delete_food_item,
        food_items::update_inventory,
        food_items::mark_surplus,
        food_items::inventory_history,
        surprise_bags::list_bags,
        surprise_bags::create_bag,
        surprise_bags::get_bag,
        surprise_bags::update_bag,
        surprise_bags::delete_bag,
        surprise_bags::book_bag,
        surprise_bags::cancel_booking,
        orders::create_order,
        orders::my_orders,
        orders::vendor_orders,
        orders::store_orders,
        orders::get_order,
        orders::update_order_status,
        orders::confirm_pickup,
        orders::cancel_order,
        orders::review_order,
        transactions::create_transaction,
        transactions::refund_transaction,
        transactions::my_transactions,
        transactions::get_transaction,
        notifications::create_notification,
        notifications::my_notifications,
        notifications::mark_notification_read,
        chat::create_conversation,
        chat::my_conversations,
        chat::send_message,
        chat::conversation_messages,
        chat::mark_conversation_read,
    )
)]
struct ApiDoc;

#[get("/api-docs/openapi.json")]
async fn openapi_doc() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(root_endpoint)
        .service(health_endpoint)
        .service(openapi_doc)
        .service(
            web::scope("/api/v1")
                .configure(|cfg| auth::config(cfg, state))
                .configure(|cfg| users::config(cfg, state))
                .configure(|cfg| stores::config(cfg, state))
                .configure(|cfg| food_items::config(cfg, state))
                .configure(|cfg| surprise_bags::config(cfg, state))
                .configure(|cfg| orders::config(cfg, state))
                .configure(|cfg| transactions::config(cfg, state))
                .configure(|cfg| notifications::config(cfg, state))
                .configure(|cfg| chat::config(cfg, state)),
        );
}

/// Runs a blocking repository call on the blocking pool and folds both the
/// blocking failure and the repository error into an `ApiError`.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, RepositoryError> + Send + 'static,
    T: Send + 'static,
{
    match web::block(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            error!("blocking task failed: {}", e);
            Err(ApiError::internal())
        }
    }
}
