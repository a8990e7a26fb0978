use crate::db::{DbConnection, RepositoryError};
use crate::models::order::Order;
use crate::models::transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionMethod, TransactionStatus,
};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

#[derive(Clone)]
pub struct TransactionOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl TransactionOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Customer pays for their own order ahead of pickup. One successful
    /// payment per order; the amount must match the order total to the
    /// cent.
    pub fn create_payment(
        &self,
        order_id_val: i32,
        customer: i32,
        amount_val: f64,
        method_val: TransactionMethod,
    ) -> Result<Transaction, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_payment: failed to acquire DB connection for order {}: {}",
                order_id_val, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order: Order = {
                use crate::db::schema::orders::dsl::*;
                orders
                    .find(order_id_val)
                    .for_update()
                    .get_result(conn)
                    .map_err(|e| match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("order {order_id_val}"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    })?
            };
            if order.customer_id != customer {
                return Err(RepositoryError::Forbidden(
                    "not authorized to pay for this order".to_string(),
                ));
            }

            let already_paid: i64 = {
                use crate::db::schema::transactions::dsl::*;
                transactions
                    .filter(order_id.eq(Some(order_id_val)))
                    .filter(kind.eq(TransactionKind::Payment))
                    .filter(status.eq(TransactionStatus::Successful))
                    .count()
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };
            if already_paid > 0 {
                return Err(RepositoryError::InvalidState(
                    "order is already paid".to_string(),
                ));
            }

            if (amount_val - order.total_amount).abs() > 0.01 {
                return Err(RepositoryError::InvalidState(
                    "amount mismatch with order total".to_string(),
                ));
            }

            let payee = Self::order_vendor(conn, order.order_id)?;

            use crate::db::schema::transactions::dsl::*;
            diesel::insert_into(transactions)
                .values(&NewTransaction {
                    order_id: Some(order.order_id),
                    payer_id: order.customer_id,
                    payee_id: payee,
                    amount: amount_val,
                    method: method_val,
                    status: TransactionStatus::Successful,
                    kind: TransactionKind::Payment,
                })
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    /// Refund of a successful transaction, money flowing back from payee
    /// to payer.
    pub fn create_refund(
        &self,
        original_id: i32,
        requester: i32,
    ) -> Result<Transaction, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_refund: failed to acquire DB connection for transaction {}: {}",
                original_id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let original: Transaction = {
                use crate::db::schema::transactions::dsl::*;
                transactions
                    .find(original_id)
                    .get_result(conn)
                    .map_err(|e| match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("transaction {original_id}"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    })?
            };
            if original.payer_id != requester {
                return Err(RepositoryError::Forbidden(
                    "not authorized to refund this transaction".to_string(),
                ));
            }
            if original.status != TransactionStatus::Successful {
                return Err(RepositoryError::InvalidState(
                    "can only refund successful transactions".to_string(),
                ));
            }
            if original.kind != TransactionKind::Payment {
                return Err(RepositoryError::InvalidState(
                    "can only refund payment transactions".to_string(),
                ));
            }

            use crate::db::schema::transactions::dsl::*;
            diesel::insert_into(transactions)
                .values(&NewTransaction {
                    order_id: original.order_id,
                    payer_id: original.payee_id,
                    payee_id: original.payer_id,
                    amount: original.amount,
                    method: original.method,
                    status: TransactionStatus::Successful,
                    kind: TransactionKind::Refund,
                })
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    pub fn get_transaction(&self, id: i32) -> Result<Transaction, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::transactions::dsl::*;
        transactions
            .find(id)
            .get_result::<Transaction>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("transaction {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    /// Transactions a user took part in, on either side of the money.
    pub fn list_user_transactions(
        &self,
        user: i32,
        kind_filter: Option<TransactionKind>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::transactions::dsl::*;
        let mut query = transactions
            .filter(payer_id.eq(user).or(payee_id.eq(user)))
            .into_boxed();
        if let Some(k) = kind_filter {
            query = query.filter(kind.eq(k));
        }
        query
            .order_by(transaction_date.desc())
            .offset(skip)
            .limit(limit)
            .load::<Transaction>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    fn order_vendor(conn: &mut PgConnection, order: i32) -> Result<i32, RepositoryError> {
        use crate::db::schema::{food_items, order_items, stores, surprise_bags};

        let refs: Vec<(Option<i32>, Option<i32>)> = order_items::table
            .filter(order_items::order_id.eq(order))
            .select((order_items::surprise_bag_id, order_items::food_item_id))
            .load(conn)
            .map_err(RepositoryError::DatabaseError)?;
        let Some((bag_ref, item_ref)) = refs.into_iter().next() else {
            return Err(RepositoryError::NotFound(format!("order {order}")));
        };

        let store: i32 = if let Some(bag_id) = bag_ref {
            surprise_bags::table
                .find(bag_id)
                .select(surprise_bags::store_id)
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError)?
        } else if let Some(item_id) = item_ref {
            food_items::table
                .find(item_id)
                .select(food_items::store_id)
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError)?
        } else {
            return Err(RepositoryError::NotFound(format!("order {order}")));
        };

        stores::table
            .find(store)
            .select(stores::owner_id)
            .get_result(conn)
            .map_err(RepositoryError::DatabaseError)
    }
}
