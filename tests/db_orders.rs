mod common;

use diesel::prelude::*;
use diesel::PgConnection;
use wisebite::db::{
    DbConnection, OrderLine, OrderOperations, RepositoryError, TransactionOperations,
};
use wisebite::models::order::OrderStatus;
use wisebite::models::transaction::{TransactionMethod, TransactionStatus};

fn bag_quantity(conn: &mut PgConnection, bag_id: i32) -> i32 {
    use wisebite::db::schema::surprise_bags::dsl::*;
    surprise_bags
        .filter(surprise_bag_id.eq(bag_id))
        .select(quantity_available)
        .first::<i32>(conn)
        .expect("bag quantity")
}

fn item_counters(conn: &mut PgConnection, item_id: i32) -> (i32, i32, i32) {
    use wisebite::db::schema::food_items::dsl::*;
    food_items
        .filter(food_item_id.eq(item_id))
        .select((total_quantity, reserved_quantity, available_quantity))
        .first::<(i32, i32, i32)>(conn)
        .expect("item counters")
}

fn orders_count(conn: &mut PgConnection) -> i64 {
    wisebite::db::schema::orders::table
        .count()
        .get_result(conn)
        .expect("count orders")
}

#[actix_rt::test]
async fn create_order_decrements_stock_and_totals_lines() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let mut conn = DbConnection::new(&pool).expect("db connection");

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![
                OrderLine::SurpriseBag {
                    id: fixtures.surprise_bag_id,
                    quantity: 2,
                },
                OrderLine::FoodItem {
                    id: fixtures.food_item_id,
                    quantity: 3,
                },
            ],
            None,
            None,
        )
        .expect("create order");

    // 2 bags at 49_000 plus 3 items at 100_000.
    assert_eq!(created.order.total_amount, 2.0 * 49_000.0 + 3.0 * 100_000.0);
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.store_id, fixtures.store_id);
    assert_eq!(created.items.len(), 2);

    assert_eq!(bag_quantity(conn.connection(), fixtures.surprise_bag_id), 3);
    let (total, reserved, available) = item_counters(conn.connection(), fixtures.food_item_id);
    assert_eq!(total, 10);
    assert_eq!(reserved, 3);
    assert_eq!(available, 7);
}

#[actix_rt::test]
async fn create_order_insufficient_stock_rolls_everything_back() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let mut conn = DbConnection::new(&pool).expect("db connection");

    let order_ops = OrderOperations::new(pool.clone());
    let result = order_ops.create_order(
        fixtures.customer_id,
        vec![
            // First line would succeed on its own.
            OrderLine::FoodItem {
                id: fixtures.food_item_id,
                quantity: 3,
            },
            // Bag only has 5 in stock.
            OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 10,
            },
        ],
        None,
        None,
    );

    match result {
        Err(RepositoryError::InsufficientStock {
            available,
            requested,
            ..
        }) => {
            assert_eq!(available, 5);
            assert_eq!(requested, 10);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // No order row and no partial stock mutation may survive.
    assert_eq!(orders_count(conn.connection()), 0);
    assert_eq!(bag_quantity(conn.connection(), fixtures.surprise_bag_id), 5);
    let (_, reserved, available) = item_counters(conn.connection(), fixtures.food_item_id);
    assert_eq!(reserved, 0);
    assert_eq!(available, 10);
}

#[actix_rt::test]
async fn create_order_unknown_sellable_is_not_found() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let result = order_ops.create_order(
        fixtures.customer_id,
        vec![OrderLine::SurpriseBag {
            id: 999_999,
            quantity: 1,
        }],
        None,
        None,
    );
    assert!(matches!(result, Err(RepositoryError::NotFound(_))));
}

#[actix_rt::test]
async fn cancel_restores_bag_stock_exactly_once() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let mut conn = DbConnection::new(&pool).expect("db connection");

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 2,
            }],
            None,
            None,
        )
        .expect("create order");
    assert_eq!(bag_quantity(conn.connection(), fixtures.surprise_bag_id), 3);

    let cancelled = order_ops
        .cancel_order(created.order.order_id, fixtures.customer_id)
        .expect("cancel order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(bag_quantity(conn.connection(), fixtures.surprise_bag_id), 5);

    // Second cancel must be rejected as terminal and must not double-restore.
    let again = order_ops.cancel_order(created.order.order_id, fixtures.customer_id);
    assert!(matches!(again, Err(RepositoryError::InvalidState(_))));
    assert_eq!(bag_quantity(conn.connection(), fixtures.surprise_bag_id), 5);
}

#[actix_rt::test]
async fn cancel_by_other_customer_is_forbidden() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 1,
            }],
            None,
            None,
        )
        .expect("create order");

    let result = order_ops.cancel_order(created.order.order_id, fixtures.vendor_id);
    assert!(matches!(result, Err(RepositoryError::Forbidden(_))));
}

#[actix_rt::test]
async fn status_transitions_enforce_the_state_machine() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 1,
            }],
            None,
            None,
        )
        .expect("create order");
    let order_id = created.order.order_id;

    // Pending cannot jump straight to awaiting pickup.
    let skip = order_ops.update_status(order_id, fixtures.store_id, OrderStatus::AwaitingPickup);
    assert!(matches!(skip, Err(RepositoryError::InvalidState(_))));

    // Completion is reserved for pickup confirmation.
    let complete = order_ops.update_status(order_id, fixtures.store_id, OrderStatus::Completed);
    assert!(matches!(complete, Err(RepositoryError::InvalidState(_))));

    let confirmed = order_ops
        .update_status(order_id, fixtures.store_id, OrderStatus::Confirmed)
        .expect("confirm order");
    assert_eq!(confirmed.status, OrderStatus::Confirmed);

    // Wrong store may not touch the order.
    let foreign = order_ops.update_status(order_id, fixtures.store_id + 1, OrderStatus::AwaitingPickup);
    assert!(matches!(
        foreign,
        Err(RepositoryError::Forbidden(_)) | Err(RepositoryError::NotFound(_))
    ));
}

#[actix_rt::test]
async fn confirm_pickup_creates_transaction_and_completes() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 2,
            }],
            None,
            None,
        )
        .expect("create order");
    let order_id = created.order.order_id;

    // Pickup before vendor confirmation is rejected.
    let early = order_ops.confirm_pickup(
        order_id,
        fixtures.store_id,
        fixtures.vendor_id,
        TransactionMethod::Cash,
    );
    assert!(matches!(early, Err(RepositoryError::InvalidState(_))));

    order_ops
        .update_status(order_id, fixtures.store_id, OrderStatus::Confirmed)
        .expect("confirm order");

    let (completed, transaction) = order_ops
        .confirm_pickup(
            order_id,
            fixtures.store_id,
            fixtures.vendor_id,
            TransactionMethod::Cash,
        )
        .expect("confirm pickup");

    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(transaction.status, TransactionStatus::Successful);
    assert_eq!(transaction.amount, completed.total_amount);
    assert_eq!(transaction.payer_id, fixtures.customer_id);
    assert_eq!(transaction.payee_id, fixtures.vendor_id);

    // A second confirmation finds the order terminal.
    let twice = order_ops.confirm_pickup(
        order_id,
        fixtures.store_id,
        fixtures.vendor_id,
        TransactionMethod::Cash,
    );
    assert!(matches!(twice, Err(RepositoryError::InvalidState(_))));
}

#[actix_rt::test]
async fn review_requires_completion_and_happens_once() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 1,
            }],
            None,
            None,
        )
        .expect("create order");
    let order_id = created.order.order_id;

    let premature = order_ops.create_review(order_id, fixtures.customer_id, 5, None);
    assert!(matches!(premature, Err(RepositoryError::InvalidState(_))));

    order_ops
        .update_status(order_id, fixtures.store_id, OrderStatus::Confirmed)
        .expect("confirm");
    order_ops
        .confirm_pickup(
            order_id,
            fixtures.store_id,
            fixtures.vendor_id,
            TransactionMethod::Cash,
        )
        .expect("pickup");

    let review = order_ops
        .create_review(order_id, fixtures.customer_id, 4, Some("great bag".into()))
        .expect("review");
    assert_eq!(review.rating, 4);

    let duplicate = order_ops.create_review(order_id, fixtures.customer_id, 5, None);
    assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));

    let average = order_ops
        .store_average_rating(fixtures.store_id)
        .expect("average");
    assert_eq!(average, Some(4.0));
}

#[actix_rt::test]
async fn payment_checks_ownership_amount_and_single_payment() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let order_ops = OrderOperations::new(pool.clone());
    let tx_ops = TransactionOperations::new(pool.clone());
    let created = order_ops
        .create_order(
            fixtures.customer_id,
            vec![OrderLine::SurpriseBag {
                id: fixtures.surprise_bag_id,
                quantity: 1,
            }],
            None,
            None,
        )
        .expect("create order");
    let order_id = created.order.order_id;
    let total = created.order.total_amount;

    let foreign = tx_ops.create_payment(order_id, fixtures.vendor_id, total, TransactionMethod::Wallet);
    assert!(matches!(foreign, Err(RepositoryError::Forbidden(_))));

    let mismatch =
        tx_ops.create_payment(order_id, fixtures.customer_id, total + 1.0, TransactionMethod::Wallet);
    assert!(matches!(mismatch, Err(RepositoryError::InvalidState(_))));

    let payment = tx_ops
        .create_payment(order_id, fixtures.customer_id, total, TransactionMethod::Wallet)
        .expect("payment");
    assert_eq!(payment.payee_id, fixtures.vendor_id);

    let twice =
        tx_ops.create_payment(order_id, fixtures.customer_id, total, TransactionMethod::Wallet);
    assert!(matches!(twice, Err(RepositoryError::InvalidState(_))));

    // Refund flows back from payee to payer.
    let refund = tx_ops
        .create_refund(payment.transaction_id, fixtures.customer_id)
        .expect("refund");
    assert_eq!(refund.payer_id, fixtures.vendor_id);
    assert_eq!(refund.payee_id, fixtures.customer_id);
    assert_eq!(refund.amount, payment.amount);

    // A refund itself cannot be refunded by the customer.
    let re_refund = tx_ops.create_refund(refund.transaction_id, fixtures.customer_id);
    assert!(matches!(
        re_refund,
        Err(RepositoryError::Forbidden(_)) | Err(RepositoryError::InvalidState(_))
    ));
}
