mod common;

use wisebite::db::{NotificationOperations, RepositoryError, UserOperations};
use wisebite::models::notification::NewNotification;
use wisebite::models::user::{NewUser, UserRole};
use wisebite::test_utils::TEST_PASSWORD;

#[actix_rt::test]
async fn fanout_to_listed_recipients_with_read_state() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let ops = NotificationOperations::new(pool.clone());
    let notification = ops
        .create_notification(
            NewNotification {
                title: "Pickup reminder".to_string(),
                message: "Your bag closes at 20:00".to_string(),
                is_important: false,
            },
            vec![fixtures.customer_id],
        )
        .expect("create notification");

    let customer_feed = ops
        .list_user_notifications(fixtures.customer_id, 0, 20)
        .expect("customer feed");
    assert_eq!(customer_feed.len(), 1);
    assert!(!customer_feed[0].is_read);

    let vendor_feed = ops
        .list_user_notifications(fixtures.vendor_id, 0, 20)
        .expect("vendor feed");
    assert!(vendor_feed.is_empty());

    ops.mark_as_read(notification.notification_id, fixtures.customer_id)
        .expect("mark read");
    let customer_feed = ops
        .list_user_notifications(fixtures.customer_id, 0, 20)
        .expect("customer feed");
    assert!(customer_feed[0].is_read);

    // Reading someone else's join row is a 404.
    let foreign = ops.mark_as_read(notification.notification_id, fixtures.vendor_id);
    assert!(matches!(foreign, Err(RepositoryError::NotFound(_))));
}

#[actix_rt::test]
async fn empty_recipient_list_broadcasts_to_everyone() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let ops = NotificationOperations::new(pool.clone());
    ops.create_notification(
        NewNotification {
            title: "Maintenance".to_string(),
            message: "Back at midnight".to_string(),
            is_important: false,
        },
        vec![],
    )
    .expect("broadcast");

    for user in [fixtures.customer_id, fixtures.vendor_id] {
        let feed = ops.list_user_notifications(user, 0, 20).expect("feed");
        assert_eq!(feed.len(), 1);
    }
}

#[actix_rt::test]
async fn new_users_inherit_important_notifications() {
    let (pool, _fixtures) = common::setup_pool_with_fixtures();

    let notification_ops = NotificationOperations::new(pool.clone());
    notification_ops
        .create_notification(
            NewNotification {
                title: "Welcome".to_string(),
                message: "Terms of service".to_string(),
                is_important: true,
            },
            vec![],
        )
        .expect("important notification");

    let user_ops = UserOperations::new(pool.clone());
    let hash = wisebite::auth::password::hash_password(TEST_PASSWORD).expect("hash");
    let newcomer = user_ops
        .create_user(NewUser {
            full_name: "Late Joiner".to_string(),
            phone_number: "0900000050".to_string(),
            email: "late@example.com".to_string(),
            password_hash: hash,
            role: UserRole::Customer,
            avatar_url: None,
        })
        .expect("create user");

    let feed = notification_ops
        .list_user_notifications(newcomer.user_id, 0, 20)
        .expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "Welcome");
}

#[actix_rt::test]
async fn vendor_signup_creates_default_store() {
    let (pool, _fixtures) = common::setup_pool_with_fixtures();

    let user_ops = UserOperations::new(pool.clone());
    let hash = wisebite::auth::password::hash_password(TEST_PASSWORD).expect("hash");
    let vendor = user_ops
        .create_user(NewUser {
            full_name: "New Vendor".to_string(),
            phone_number: "0900000051".to_string(),
            email: "newvendor@example.com".to_string(),
            password_hash: hash,
            role: UserRole::Vendor,
            avatar_url: None,
        })
        .expect("create vendor");

    let store_ops = wisebite::db::StoreOperations::new(pool.clone());
    let store = store_ops
        .get_store_by_owner(vendor.user_id)
        .expect("default store");
    assert_eq!(store.name, "Store of New Vendor");
}

#[actix_rt::test]
async fn duplicate_email_is_a_conflict() {
    let (pool, _fixtures) = common::setup_pool_with_fixtures();

    let user_ops = UserOperations::new(pool.clone());
    let hash = wisebite::auth::password::hash_password(TEST_PASSWORD).expect("hash");
    let result = user_ops.create_user(NewUser {
        full_name: "Copycat".to_string(),
        phone_number: "0900000052".to_string(),
        email: "customer1@example.com".to_string(),
        password_hash: hash,
        role: UserRole::Customer,
        avatar_url: None,
    });
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}
