use crate::db::{DbConnection, RepositoryError};
use crate::models::order::{NewOrder, NewOrderItem, NewReview, Order, OrderItem, OrderStatus, Review};
use crate::models::transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionMethod, TransactionStatus,
};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

/// One requested order line. Exactly one sellable kind per line; the two
/// nullable foreign keys only exist at the schema boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderLine {
    SurpriseBag { id: i32, quantity: i32 },
    FoodItem { id: i32, quantity: i32 },
}

impl OrderLine {
    pub fn quantity(&self) -> i32 {
        match self {
            OrderLine::SurpriseBag { quantity, .. } | OrderLine::FoodItem { quantity, .. } => {
                *quantity
            }
        }
    }
}

/// A freshly created order together with its lines and the store they
/// came from.
#[derive(Debug)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub store_id: i32,
}

#[derive(Clone)]
pub struct OrderOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl OrderOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Creates an order for a customer. All line validations and stock
    /// decrements happen inside one transaction; the referenced sellable
    /// rows are locked for the duration so concurrent orders cannot both
    /// consume the same stock.
    pub fn create_order(
        &self,
        customer_id_val: i32,
        lines: Vec<OrderLine>,
        delivery_address_val: Option<String>,
        notes_val: Option<String>,
    ) -> Result<CreatedOrder, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_order: failed to acquire DB connection: {}", e);
            e
        })?;

        if lines.is_empty() {
            return Err(RepositoryError::Validation(format!(
                "order is empty for customer {customer_id_val}"
            )));
        }
        for line in &lines {
            if line.quantity() <= 0 {
                return Err(RepositoryError::Validation(
                    "line quantity must be positive".to_string(),
                ));
            }
        }

        conn.connection().transaction(|conn| {
            let mut total_amount_val = 0.0_f64;
            let mut pending_items: Vec<(OrderLine, f64)> = Vec::with_capacity(lines.len());
            let mut order_store: Option<i32> = None;

            for line in &lines {
                let (line_store, unit_price) = match *line {
                    OrderLine::SurpriseBag { id, quantity } => {
                        Self::consume_surprise_bag(conn, id, quantity)?
                    }
                    OrderLine::FoodItem { id, quantity } => {
                        Self::consume_food_item(conn, id, quantity)?
                    }
                };

                match order_store {
                    None => order_store = Some(line_store),
                    Some(existing) if existing != line_store => {
                        return Err(RepositoryError::Validation(
                            "order contains items from multiple stores".to_string(),
                        ));
                    }
                    Some(_) => {}
                }

                total_amount_val += unit_price * f64::from(line.quantity());
                pending_items.push((*line, unit_price));
            }

            let order: Order = {
                use crate::db::schema::orders::dsl::*;
                diesel::insert_into(orders)
                    .values(&NewOrder {
                        customer_id: customer_id_val,
                        status: OrderStatus::Pending,
                        total_amount: total_amount_val,
                        delivery_address: delivery_address_val.clone(),
                        notes: notes_val.clone(),
                    })
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            let new_items: Vec<NewOrderItem> = pending_items
                .iter()
                .map(|(line, unit_price)| match *line {
                    OrderLine::SurpriseBag { id, quantity } => NewOrderItem {
                        order_id: order.order_id,
                        surprise_bag_id: Some(id),
                        food_item_id: None,
                        quantity,
                        price_per_item: *unit_price,
                    },
                    OrderLine::FoodItem { id, quantity } => NewOrderItem {
                        order_id: order.order_id,
                        surprise_bag_id: None,
                        food_item_id: Some(id),
                        quantity,
                        price_per_item: *unit_price,
                    },
                })
                .collect();

            let items: Vec<OrderItem> = {
                use crate::db::schema::order_items::dsl::*;
                diesel::insert_into(order_items)
                    .values(&new_items)
                    .get_results(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            Ok(CreatedOrder {
                order,
                items,
                // Non-empty lines guarantee the store was recorded.
                store_id: order_store.unwrap(),
            })
        })
    }

    pub fn get_order(&self, id: i32) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        let order = {
            use crate::db::schema::orders::dsl::*;
            orders
                .find(id)
                .get_result::<Order>(conn.connection())
                .map_err(|e| match e {
                    Error::NotFound => RepositoryError::NotFound(format!("order {id}")),
                    other => RepositoryError::DatabaseError(other),
                })?
        };
        let items = {
            use crate::db::schema::order_items::dsl::*;
            order_items
                .filter(order_id.eq(id))
                .load::<OrderItem>(conn.connection())
                .map_err(RepositoryError::DatabaseError)?
        };
        Ok((order, items))
    }

    /// Store the order's lines were sold from, resolved through either
    /// sellable reference.
    pub fn order_store_id(&self, id: i32) -> Result<i32, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;
        Self::store_of_order(conn.connection(), id)
    }

    pub fn list_customer_orders(
        &self,
        customer: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        let page: Vec<Order> = {
            use crate::db::schema::orders::dsl::*;
            orders
                .filter(customer_id.eq(customer))
                .order_by(created_at.desc())
                .offset(skip)
                .limit(limit)
                .load(conn.connection())
                .map_err(RepositoryError::DatabaseError)?
        };
        Self::attach_items(conn.connection(), page)
    }

    pub fn list_store_orders(
        &self,
        store: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        let order_ids: Vec<i32> = {
            use crate::db::schema::{food_items, order_items, surprise_bags};
            let bag_ids = surprise_bags::table
                .filter(surprise_bags::store_id.eq(store))
                .select(surprise_bags::surprise_bag_id.nullable());
            let item_ids = food_items::table
                .filter(food_items::store_id.eq(store))
                .select(food_items::food_item_id.nullable());
            order_items::table
                .filter(
                    order_items::surprise_bag_id
                        .eq_any(bag_ids)
                        .or(order_items::food_item_id.eq_any(item_ids)),
                )
                .select(order_items::order_id)
                .distinct()
                .load(conn.connection())
                .map_err(RepositoryError::DatabaseError)?
        };

        let page: Vec<Order> = {
            use crate::db::schema::orders::dsl::*;
            orders
                .filter(order_id.eq_any(order_ids))
                .order_by(created_at.desc())
                .offset(skip)
                .limit(limit)
                .load(conn.connection())
                .map_err(RepositoryError::DatabaseError)?
        };
        Self::attach_items(conn.connection(), page)
    }

    /// Vendor-driven forward transition. Completion is reserved for pickup
    /// confirmation; cancellation restores stock like a customer cancel.
    pub fn update_status(
        &self,
        id: i32,
        vendor_store_id: i32,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_status: failed to acquire DB connection for order {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, id)?;
            Self::ensure_store_owns_order(conn, &order, vendor_store_id)?;

            if next == OrderStatus::Completed {
                return Err(RepositoryError::InvalidState(
                    "orders are completed through pickup confirmation".to_string(),
                ));
            }
            if !order.status.can_transition_to(next) {
                return Err(RepositoryError::InvalidState(format!(
                    "cannot move order from {} to {}",
                    order.status.as_str(),
                    next.as_str()
                )));
            }

            if next == OrderStatus::Cancelled {
                Self::restore_bag_stock(conn, order.order_id)?;
            }
            Self::set_status(conn, order.order_id, next)
        })
    }

    /// Customer cancellation of a non-terminal order. Restores the
    /// surprise-bag quantities the order consumed; food-item lines are
    /// left untouched.
    pub fn cancel_order(&self, id: i32, customer: i32) -> Result<Order, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "cancel_order: failed to acquire DB connection for order {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, id)?;
            if order.customer_id != customer {
                return Err(RepositoryError::Forbidden(
                    "order belongs to another customer".to_string(),
                ));
            }
            if order.status.is_terminal() {
                return Err(RepositoryError::InvalidState(format!(
                    "order is already {}",
                    order.status.as_str()
                )));
            }

            Self::restore_bag_stock(conn, order.order_id)?;
            Self::set_status(conn, order.order_id, OrderStatus::Cancelled)
        })
    }

    /// Vendor confirms the customer picked the order up: records the
    /// successful payment and completes the order. The order row is locked
    /// so two concurrent confirmations cannot both create a transaction.
    pub fn confirm_pickup(
        &self,
        id: i32,
        vendor_store_id: i32,
        vendor_user_id: i32,
        method: TransactionMethod,
    ) -> Result<(Order, Transaction), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "confirm_pickup: failed to acquire DB connection for order {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order = Self::lock_order(conn, id)?;
            Self::ensure_store_owns_order(conn, &order, vendor_store_id)?;

            if !order.status.pickup_confirmable() {
                return Err(RepositoryError::InvalidState(format!(
                    "order is in an invalid state for pickup: {}",
                    order.status.as_str()
                )));
            }

            let transaction: Transaction = {
                use crate::db::schema::transactions;
                diesel::insert_into(transactions::table)
                    .values(&NewTransaction {
                        order_id: Some(order.order_id),
                        payer_id: order.customer_id,
                        payee_id: vendor_user_id,
                        amount: order.total_amount,
                        method,
                        status: TransactionStatus::Successful,
                        kind: TransactionKind::Payment,
                    })
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            let completed = Self::set_status(conn, order.order_id, OrderStatus::Completed)?;
            Ok((completed, transaction))
        })
    }

    /// A completed order may be reviewed exactly once by its customer.
    pub fn create_review(
        &self,
        id: i32,
        customer: i32,
        rating_val: i32,
        comment_val: Option<String>,
    ) -> Result<Review, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_review: failed to acquire DB connection for order {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let order: Order = {
                use crate::db::schema::orders::dsl::*;
                orders
                    .find(id)
                    .get_result(conn)
                    .map_err(|e| match e {
                        Error::NotFound => RepositoryError::NotFound(format!("order {id}")),
                        other => RepositoryError::DatabaseError(other),
                    })?
            };
            if order.customer_id != customer {
                return Err(RepositoryError::NotFound(format!("order {id}")));
            }
            if order.status != OrderStatus::Completed {
                return Err(RepositoryError::InvalidState(
                    "can only review completed orders".to_string(),
                ));
            }

            use crate::db::schema::reviews::dsl::*;
            diesel::insert_into(reviews)
                .values(&NewReview {
                    user_id: customer,
                    order_id: id,
                    rating: rating_val,
                    comment: comment_val,
                })
                .get_result(conn)
                .map_err(|e| {
                    RepositoryError::DatabaseError(e)
                        .on_unique_violation("order has already been reviewed")
                })
        })
    }

    /// Average rating across the completed, reviewed orders of one store's
    /// vendor.
    pub fn store_average_rating(&self, store: i32) -> Result<Option<f64>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        let ratings: Vec<(i32, i32)> = {
            use crate::db::schema::{order_items, reviews, surprise_bags};
            reviews::table
                .inner_join(
                    order_items::table.on(reviews::order_id.eq(order_items::order_id)),
                )
                .inner_join(
                    surprise_bags::table.on(order_items::surprise_bag_id
                        .eq(surprise_bags::surprise_bag_id.nullable())),
                )
                .filter(surprise_bags::store_id.eq(store))
                .select((reviews::review_id, reviews::rating))
                .distinct()
                .load(conn.connection())
                .map_err(RepositoryError::DatabaseError)?
        };
        if ratings.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            ratings.iter().map(|(_, r)| f64::from(*r)).sum::<f64>() / ratings.len() as f64,
        ))
    }

    fn consume_surprise_bag(
        conn: &mut PgConnection,
        id: i32,
        requested: i32,
    ) -> Result<(i32, f64), RepositoryError> {
        use crate::db::schema::surprise_bags::dsl::*;
        let bag = surprise_bags
            .find(id)
            .for_update()
            .get_result::<crate::models::surprise_bag::SurpriseBag>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("surprise bag {id}")),
                other => RepositoryError::DatabaseError(other),
            })?;

        if bag.quantity_available < requested {
            return Err(RepositoryError::InsufficientStock {
                name: bag.name,
                available: bag.quantity_available,
                requested,
            });
        }

        diesel::update(surprise_bags.find(id))
            .set(quantity_available.eq(quantity_available - requested))
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;

        Ok((bag.store_id, bag.discounted_price))
    }

    fn consume_food_item(
        conn: &mut PgConnection,
        id: i32,
        requested: i32,
    ) -> Result<(i32, f64), RepositoryError> {
        use crate::db::schema::food_items::dsl::*;
        let item = food_items
            .find(id)
            .for_update()
            .get_result::<crate::models::food_item::FoodItem>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food item {id}")),
                other => RepositoryError::DatabaseError(other),
            })?;

        if item.available_quantity < requested {
            return Err(RepositoryError::InsufficientStock {
                name: item.name.clone(),
                available: item.available_quantity,
                requested,
            });
        }

        // Ordered stock moves to reserved; available stays derived from
        // total - reserved - surplus.
        diesel::update(food_items.find(id))
            .set((
                reserved_quantity.eq(reserved_quantity + requested),
                available_quantity.eq(available_quantity - requested),
                updated_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;

        Ok((item.store_id, item.effective_price()))
    }

    fn lock_order(conn: &mut PgConnection, id: i32) -> Result<Order, RepositoryError> {
        use crate::db::schema::orders::dsl::*;
        orders
            .find(id)
            .for_update()
            .get_result::<Order>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("order {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    fn set_status(
        conn: &mut PgConnection,
        id: i32,
        next: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        use crate::db::schema::orders::dsl::*;
        diesel::update(orders.find(id))
            .set((status.eq(next), updated_at.eq(diesel::dsl::now)))
            .get_result::<Order>(conn)
            .map_err(RepositoryError::DatabaseError)
    }

    fn store_of_order(conn: &mut PgConnection, id: i32) -> Result<i32, RepositoryError> {
        use crate::db::schema::{food_items, order_items, surprise_bags};

        let refs: Vec<(Option<i32>, Option<i32>)> = order_items::table
            .filter(order_items::order_id.eq(id))
            .select((order_items::surprise_bag_id, order_items::food_item_id))
            .load(conn)
            .map_err(RepositoryError::DatabaseError)?;
        let Some((bag_ref, item_ref)) = refs.into_iter().next() else {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        };

        if let Some(bag_id) = bag_ref {
            return surprise_bags::table
                .find(bag_id)
                .select(surprise_bags::store_id)
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError);
        }
        if let Some(item_id) = item_ref {
            return food_items::table
                .find(item_id)
                .select(food_items::store_id)
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError);
        }
        Err(RepositoryError::NotFound(format!("order {id}")))
    }

    fn ensure_store_owns_order(
        conn: &mut PgConnection,
        order: &Order,
        vendor_store_id: i32,
    ) -> Result<(), RepositoryError> {
        let owning_store = Self::store_of_order(conn, order.order_id)?;
        if owning_store != vendor_store_id {
            return Err(RepositoryError::Forbidden(
                "order belongs to another store".to_string(),
            ));
        }
        Ok(())
    }

    fn restore_bag_stock(conn: &mut PgConnection, id: i32) -> Result<(), RepositoryError> {
        use crate::db::schema::order_items;

        let bag_lines: Vec<(Option<i32>, i32)> = order_items::table
            .filter(order_items::order_id.eq(id))
            .filter(order_items::surprise_bag_id.is_not_null())
            .select((order_items::surprise_bag_id, order_items::quantity))
            .load(conn)
            .map_err(RepositoryError::DatabaseError)?;

        use crate::db::schema::surprise_bags::dsl::*;
        for (bag_ref, qty) in bag_lines {
            let Some(bag_id) = bag_ref else { continue };
            diesel::update(surprise_bags.find(bag_id))
                .set(quantity_available.eq(quantity_available + qty))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
        }
        Ok(())
    }

    fn attach_items(
        conn: &mut PgConnection,
        page: Vec<Order>,
    ) -> Result<Vec<(Order, Vec<OrderItem>)>, RepositoryError> {
        use crate::db::schema::order_items::dsl::*;
        let ids: Vec<i32> = page.iter().map(|o| o.order_id).collect();
        let all_items: Vec<OrderItem> = order_items
            .filter(order_id.eq_any(&ids))
            .load(conn)
            .map_err(RepositoryError::DatabaseError)?;

        Ok(page
            .into_iter()
            .map(|o| {
                let own: Vec<OrderItem> = all_items
                    .iter()
                    .filter(|i| i.order_id == o.order_id)
                    .cloned()
                    .collect();
                (o, own)
            })
            .collect())
    }
}
