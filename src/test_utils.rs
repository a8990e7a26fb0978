use crate::auth::password::hash_password;
use crate::db::{establish_connection_pool, run_db_migrations, DbConnection, RepositoryError};
use crate::models::food_item::NewFoodItem;
use crate::models::store::NewStore;
use crate::models::surprise_bag::NewSurpriseBag;
use crate::models::user::{NewUser, UserRole};
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use std::sync::Once;

// Fixture strategy:
// - Build users/stores/items/bags via the helpers below.
// - Every seeded account uses TEST_PASSWORD so api tests can log in.
pub const TEST_PASSWORD: &str = "test-password-1";
const TEST_JWT_SECRET: &str = "test-jwt-secret";
static TEST_THREADS_GUARD: Once = Once::new();

fn ensure_single_threaded_tests() {
    TEST_THREADS_GUARD.call_once(|| {
        let threads = test_threads_from_args().or_else(|| std::env::var("RUST_TEST_THREADS").ok());
        if threads.as_deref() != Some("1") {
            panic!(
                "Tests must run with --test-threads=1 or RUST_TEST_THREADS=1 because init_test_env mutates environment variables."
            );
        }
    });
}

fn test_threads_from_args() -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == "--test-threads" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--test-threads=") {
            return Some(value.to_string());
        }
    }
    None
}

fn set_env_if_unset(key: &str, value: &str) {
    if std::env::var_os(key).is_none() {
        std::env::set_var(key, value);
    }
}

pub fn init_test_env() {
    ensure_single_threaded_tests();
    set_env_if_unset("JWT_SECRET", TEST_JWT_SECRET);
}

pub fn build_test_pool(database_url: &str) -> Pool<ConnectionManager<PgConnection>> {
    let pool = establish_connection_pool(database_url);
    run_db_migrations(pool.clone()).expect("Unable to run migrations");
    pool
}

pub fn reset_db(pool: &Pool<ConnectionManager<PgConnection>>) -> Result<(), RepositoryError> {
    let mut conn = DbConnection::new(pool)?;
    diesel::sql_query(
        "TRUNCATE TABLE messages, conversation_members, conversations, \
         notification_recipients, notifications, reviews, inventory_logs, transactions, \
         order_items, orders, surprise_bag_items, surprise_bags, food_items, categories, \
         stores, users RESTART IDENTITY CASCADE",
    )
    .execute(conn.connection())
    .map_err(RepositoryError::DatabaseError)?;
    Ok(())
}

pub struct TestFixtures {
    pub customer_id: i32,
    pub vendor_id: i32,
    pub store_id: i32,
    pub food_item_id: i32,
    pub surprise_bag_id: i32,
}

pub fn seed_basic_fixtures(
    pool: &Pool<ConnectionManager<PgConnection>>,
) -> Result<TestFixtures, RepositoryError> {
    let mut conn = DbConnection::new(pool)?;

    let customer_id = insert_user(
        conn.connection(),
        "Customer One",
        "customer1@example.com",
        "0900000001",
        UserRole::Customer,
    )?;
    let vendor_id = insert_user(
        conn.connection(),
        "Vendor One",
        "vendor1@example.com",
        "0900000002",
        UserRole::Vendor,
    )?;
    let store_id = insert_store(
        conn.connection(),
        vendor_id,
        "Test Store",
        Some((10.7769, 106.7009)),
    )?;
    let food_item_id = seed_food_item(conn.connection(), store_id, "Banh Mi", 100_000.0, 10)?;
    let surprise_bag_id = seed_surprise_bag(conn.connection(), store_id, "Morning Bag", 5)?;

    Ok(TestFixtures {
        customer_id,
        vendor_id,
        store_id,
        food_item_id,
        surprise_bag_id,
    })
}

pub fn insert_user(
    conn: &mut PgConnection,
    name: &str,
    email_addr: &str,
    phone: &str,
    role_val: UserRole,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::users::dsl::*;
    let password_hash_val = hash_password(TEST_PASSWORD)
        .map_err(|e| RepositoryError::Validation(format!("fixture password hash: {e}")))?;
    diesel::insert_into(users)
        .values(&NewUser {
            full_name: name.to_string(),
            phone_number: phone.to_string(),
            email: email_addr.to_string(),
            password_hash: password_hash_val,
            role: role_val,
            avatar_url: None,
        })
        .returning(user_id)
        .get_result::<i32>(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn insert_store(
    conn: &mut PgConnection,
    owner: i32,
    name_val: &str,
    coords: Option<(f64, f64)>,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::stores::dsl::*;
    diesel::insert_into(stores)
        .values(&NewStore {
            owner_id: owner,
            name: name_val.to_string(),
            address: "1 Test Street".to_string(),
            description: None,
            logo_url: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
        })
        .returning(store_id)
        .get_result::<i32>(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn seed_food_item(
    conn: &mut PgConnection,
    store: i32,
    name_val: &str,
    price: f64,
    quantity: i32,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::food_items::dsl::*;
    diesel::insert_into(food_items)
        .values(&NewFoodItem {
            store_id: store,
            category_id: None,
            name: name_val.to_string(),
            description: None,
            image_url: None,
            standard_price: price,
            total_quantity: quantity,
            available_quantity: quantity,
            expires_at: None,
        })
        .returning(food_item_id)
        .get_result::<i32>(conn)
        .map_err(RepositoryError::DatabaseError)
}

pub fn seed_surprise_bag(
    conn: &mut PgConnection,
    store: i32,
    name_val: &str,
    quantity: i32,
) -> Result<i32, RepositoryError> {
    use crate::db::schema::surprise_bags::dsl::*;
    let now = Utc::now();
    diesel::insert_into(surprise_bags)
        .values(&NewSurpriseBag {
            store_id: store,
            name: name_val.to_string(),
            description: None,
            original_value: 150_000.0,
            discounted_price: 49_000.0,
            quantity_available: quantity,
            pickup_start_time: now + Duration::hours(1),
            pickup_end_time: now + Duration::hours(4),
        })
        .returning(surprise_bag_id)
        .get_result::<i32>(conn)
        .map_err(RepositoryError::DatabaseError)
}
