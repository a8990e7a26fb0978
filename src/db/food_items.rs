use crate::db::{DbConnection, RepositoryError};
use crate::models::food_item::{
    Category, FoodItem, InventoryLog, NewFoodItem, NewInventoryLog, UpdateFoodItem,
};
use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::sql_types::{Bool, Text};
use diesel::PgConnection;
use log::{debug, error};

#[derive(Clone)]
pub struct FoodItemOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl FoodItemOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Creates an item with its whole quantity available and writes the
    /// opening `initial_stock` ledger row in the same transaction.
    pub fn create_food_item(&self, mut new_item: NewFoodItem) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_food_item: failed to acquire DB connection: {}", e);
            e
        })?;

        new_item.available_quantity = new_item.total_quantity;

        conn.connection().transaction(|conn| {
            if let Some(cat_id) = new_item.category_id {
                use crate::db::schema::categories::dsl::*;
                let active: bool = categories
                    .find(cat_id)
                    .select(is_active)
                    .get_result(conn)
                    .map_err(|e| match e {
                        Error::NotFound => {
                            RepositoryError::NotFound(format!("category {cat_id}"))
                        }
                        other => RepositoryError::DatabaseError(other),
                    })?;
                if !active {
                    return Err(RepositoryError::NotFound(format!("category {cat_id}")));
                }
            }

            let item: FoodItem = {
                use crate::db::schema::food_items::dsl::*;
                diesel::insert_into(food_items)
                    .values(&new_item)
                    .get_result(conn)
                    .map_err(|e| {
                        error!(
                            "create_food_item: error inserting item '{}': {}",
                            new_item.name, e
                        );
                        RepositoryError::DatabaseError(e)
                    })?
            };

            {
                use crate::db::schema::inventory_logs::dsl::*;
                diesel::insert_into(inventory_logs)
                    .values(&NewInventoryLog {
                        food_item_id: item.food_item_id,
                        change_type: "initial_stock".to_string(),
                        quantity_change: item.total_quantity,
                        previous_quantity: 0,
                        new_quantity: item.total_quantity,
                        reason: Some("Initial product creation".to_string()),
                    })
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(item)
        })
    }

    pub fn get_food_item(&self, id: i32) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::food_items::dsl::*;
        food_items
            .find(id)
            .get_result::<FoodItem>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food item {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn list_food_items(
        &self,
        store_filter: Option<i32>,
        category_filter: Option<i32>,
        surplus_only: bool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FoodItem>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::food_items::dsl::*;
        let mut query = food_items.filter(is_active.eq(true)).into_boxed();
        if let Some(sid) = store_filter {
            query = query.filter(store_id.eq(sid));
        }
        if let Some(cid) = category_filter {
            query = query.filter(category_id.eq(cid));
        }
        if surplus_only {
            query = query.filter(is_marked_for_surplus.eq(true));
        }
        query
            .order_by(name.asc())
            .offset(skip)
            .limit(limit)
            .load::<FoodItem>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Vendor view of their own catalogue, inactive items included.
    pub fn list_store_food_items(
        &self,
        store_id_val: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<FoodItem>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::food_items::dsl::*;
        food_items
            .filter(store_id.eq(store_id_val))
            .order_by(name.asc())
            .offset(skip)
            .limit(limit)
            .load::<FoodItem>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Performs a fuzzy search on the food_items table using the pg_trgm
    /// extension. Returns up to 10 items ordered by descending similarity.
    pub fn search_food_items(&self, search_query: &str) -> Result<Vec<FoodItem>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "search_food_items: failed to acquire DB connection for query '{}': {}",
                search_query, e
            );
            e
        })?;
        debug!(
            "search_food_items: executing fuzzy search for query '{}'",
            search_query
        );
        use crate::db::schema::food_items::dsl::*;
        food_items
            .filter(is_active.eq(true))
            .filter(sql::<Bool>("name % ").bind::<Text, _>(search_query))
            .order_by(
                sql::<Text>("similarity (name, ")
                    .bind::<Text, _>(search_query)
                    .sql(")")
                    .desc(),
            )
            .limit(10)
            .load::<FoodItem>(conn.connection())
            .map_err(|e| {
                error!(
                    "search_food_items: error performing search for query '{}': {}",
                    search_query, e
                );
                RepositoryError::DatabaseError(e)
            })
    }

    pub fn update_food_item(
        &self,
        id: i32,
        owner_store_id: i32,
        changes: UpdateFoodItem,
    ) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_food_item: failed to acquire DB connection for item {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let item = Self::load_owned(conn, id, owner_store_id)?;

            use crate::db::schema::food_items::dsl::*;
            diesel::update(food_items.find(item.food_item_id))
                .set((&changes, updated_at.eq(diesel::dsl::now)))
                .get_result::<FoodItem>(conn)
                .map_err(|e| {
                    error!("update_food_item: error updating item {}: {}", id, e);
                    RepositoryError::DatabaseError(e)
                })
        })
    }

    /// Soft delete: the item stays for existing order lines but leaves the
    /// catalogue.
    pub fn delete_food_item(&self, id: i32, owner_store_id: i32) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        conn.connection().transaction(|conn| {
            let item = Self::load_owned(conn, id, owner_store_id)?;

            use crate::db::schema::food_items::dsl::*;
            diesel::update(food_items.find(item.food_item_id))
                .set((
                    is_active.eq(false),
                    is_available.eq(false),
                    updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
            Ok(())
        })
    }

    /// Replaces the total quantity, recomputes availability and appends the
    /// ledger row, all in one transaction.
    pub fn update_inventory(
        &self,
        id: i32,
        owner_store_id: i32,
        new_total: i32,
        change_type_val: &str,
        reason_val: Option<String>,
    ) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_inventory: failed to acquire DB connection for item {}: {}",
                id, e
            );
            e
        })?;

        if new_total < 0 {
            return Err(RepositoryError::Validation(
                "total quantity must not be negative".to_string(),
            ));
        }

        conn.connection().transaction(|conn| {
            let item = Self::load_owned_for_update(conn, id, owner_store_id)?;

            let delta = new_total - item.total_quantity;
            let new_available =
                (new_total - item.reserved_quantity - item.surplus_quantity).max(0);

            let updated: FoodItem = {
                use crate::db::schema::food_items::dsl::*;
                diesel::update(food_items.find(item.food_item_id))
                    .set((
                        total_quantity.eq(new_total),
                        available_quantity.eq(new_available),
                        updated_at.eq(diesel::dsl::now),
                    ))
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            {
                use crate::db::schema::inventory_logs::dsl::*;
                diesel::insert_into(inventory_logs)
                    .values(&NewInventoryLog {
                        food_item_id: item.food_item_id,
                        change_type: change_type_val.to_string(),
                        quantity_change: delta,
                        previous_quantity: item.total_quantity,
                        new_quantity: new_total,
                        reason: reason_val,
                    })
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(updated)
        })
    }

    /// Marks part of the available quantity as surplus at a discounted
    /// price. Marking zero clears the surplus flag.
    pub fn mark_surplus(
        &self,
        id: i32,
        owner_store_id: i32,
        surplus_qty: i32,
        discount: f64,
    ) -> Result<FoodItem, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "mark_surplus: failed to acquire DB connection for item {}: {}",
                id, e
            );
            e
        })?;

        if surplus_qty < 0 {
            return Err(RepositoryError::Validation(
                "surplus quantity must not be negative".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&discount) {
            return Err(RepositoryError::Validation(
                "discount percentage must be within [0, 1)".to_string(),
            ));
        }

        conn.connection().transaction(|conn| {
            let item = Self::load_owned_for_update(conn, id, owner_store_id)?;

            if surplus_qty > item.available_quantity {
                return Err(RepositoryError::InvalidState(format!(
                    "surplus quantity cannot exceed available quantity ({})",
                    item.available_quantity
                )));
            }

            let marked = surplus_qty > 0;
            let new_surplus_price = item.standard_price * (1.0 - discount);
            let new_available =
                (item.total_quantity - item.reserved_quantity - surplus_qty).max(0);
            let now = Utc::now();

            let updated: FoodItem = {
                use crate::db::schema::food_items::dsl::*;
                diesel::update(food_items.find(item.food_item_id))
                    .set((
                        surplus_quantity.eq(surplus_qty),
                        surplus_discount.eq(Some(discount)),
                        surplus_price.eq(Some(new_surplus_price)),
                        is_marked_for_surplus.eq(marked),
                        marked_surplus_at.eq(if marked { Some(now) } else { None }),
                        available_quantity.eq(new_available),
                        updated_at.eq(diesel::dsl::now),
                    ))
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            let surplus_change = surplus_qty - item.surplus_quantity;
            {
                use crate::db::schema::inventory_logs::dsl::*;
                diesel::insert_into(inventory_logs)
                    .values(&NewInventoryLog {
                        food_item_id: item.food_item_id,
                        change_type: if surplus_change > 0 {
                            "surplus_marked".to_string()
                        } else {
                            "surplus_removed".to_string()
                        },
                        quantity_change: surplus_change,
                        previous_quantity: item.surplus_quantity,
                        new_quantity: surplus_qty,
                        reason: Some(format!(
                            "Marked for surplus with {:.1}% discount",
                            discount * 100.0
                        )),
                    })
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(updated)
        })
    }

    pub fn inventory_history(
        &self,
        id: i32,
        owner_store_id: i32,
    ) -> Result<Vec<InventoryLog>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        conn.connection().transaction(|conn| {
            let item = Self::load_owned(conn, id, owner_store_id)?;

            use crate::db::schema::inventory_logs::dsl::*;
            inventory_logs
                .filter(food_item_id.eq(item.food_item_id))
                .order_by(created_at.desc())
                .load::<InventoryLog>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::categories::dsl::*;
        categories
            .filter(is_active.eq(true))
            .order_by(name.asc())
            .load::<Category>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Top-level categories paired with their direct children.
    pub fn category_hierarchy(&self) -> Result<Vec<(Category, Vec<Category>)>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::categories::dsl::*;
        let all: Vec<Category> = categories
            .filter(is_active.eq(true))
            .order_by(name.asc())
            .load(conn.connection())
            .map_err(RepositoryError::DatabaseError)?;

        let (roots, children): (Vec<Category>, Vec<Category>) = all
            .into_iter()
            .partition(|c| c.parent_category_id.is_none());

        Ok(roots
            .into_iter()
            .map(|root| {
                let subs = children
                    .iter()
                    .filter(|c| c.parent_category_id == Some(root.category_id))
                    .cloned()
                    .collect();
                (root, subs)
            })
            .collect())
    }

    fn load_owned(
        conn: &mut PgConnection,
        id: i32,
        owner_store_id: i32,
    ) -> Result<FoodItem, RepositoryError> {
        use crate::db::schema::food_items::dsl::*;
        let item = food_items
            .find(id)
            .get_result::<FoodItem>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food item {id}")),
                other => RepositoryError::DatabaseError(other),
            })?;
        if item.store_id != owner_store_id {
            return Err(RepositoryError::Forbidden(
                "food item belongs to another store".to_string(),
            ));
        }
        Ok(item)
    }

    fn load_owned_for_update(
        conn: &mut PgConnection,
        id: i32,
        owner_store_id: i32,
    ) -> Result<FoodItem, RepositoryError> {
        use crate::db::schema::food_items::dsl::*;
        let item = food_items
            .find(id)
            .for_update()
            .get_result::<FoodItem>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("food item {id}")),
                other => RepositoryError::DatabaseError(other),
            })?;
        if item.store_id != owner_store_id {
            return Err(RepositoryError::Forbidden(
                "food item belongs to another store".to_string(),
            ));
        }
        Ok(item)
    }
}
