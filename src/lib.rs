pub mod api;
pub mod auth;
pub mod db;
pub mod models;
pub mod schemas;
pub mod services;
pub mod test_utils;

use crate::auth::AuthConfig;
use crate::db::{
    establish_connection_pool, run_db_migrations, ChatOperations, FoodItemOperations,
    NotificationOperations, OrderOperations, StoreOperations, SurpriseBagOperations,
    TransactionOperations, UserOperations,
};
use crate::services::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub user_ops: UserOperations,
    pub store_ops: StoreOperations,
    pub food_item_ops: FoodItemOperations,
    pub surprise_bag_ops: SurpriseBagOperations,
    pub order_ops: OrderOperations,
    pub transaction_ops: TransactionOperations,
    pub notification_ops: NotificationOperations,
    pub chat_ops: ChatOperations,
    pub notifier: Notifier,
    pub auth_cfg: AuthConfig,
}

impl AppState {
    pub async fn new(url: &str) -> Self {
        let db = establish_connection_pool(url);
        run_db_migrations(db.clone()).expect("Unable to run migrations");

        let auth_cfg = AuthConfig::from_env();
        let user_ops = UserOperations::new(db.clone());
        let store_ops = StoreOperations::new(db.clone());
        let food_item_ops = FoodItemOperations::new(db.clone());
        let surprise_bag_ops = SurpriseBagOperations::new(db.clone());
        let order_ops = OrderOperations::new(db.clone());
        let transaction_ops = TransactionOperations::new(db.clone());
        let notification_ops = NotificationOperations::new(db.clone());
        let chat_ops = ChatOperations::new(db);
        let notifier = Notifier::spawn(notification_ops.clone(), store_ops.clone());

        AppState {
            user_ops,
            store_ops,
            food_item_ops,
            surprise_bag_ops,
            order_ops,
            transaction_ops,
            notification_ops,
            chat_ops,
            notifier,
            auth_cfg,
        }
    }
}
