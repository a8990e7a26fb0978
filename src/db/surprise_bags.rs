use crate::db::{DbConnection, RepositoryError};
use crate::models::surprise_bag::{
    NewSurpriseBag, NewSurpriseBagItem, SurpriseBag, SurpriseBagItem, UpdateSurpriseBag,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

/// Contents line for a new bag: a food item with the quantity range a
/// customer may receive.
#[derive(Debug)]
pub struct BagContent {
    pub food_item_id: i32,
    pub min_quantity: i32,
    pub max_quantity: i32,
}

#[derive(Clone)]
pub struct SurpriseBagOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl SurpriseBagOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn create_surprise_bag(
        &self,
        new_bag: NewSurpriseBag,
        contents: Vec<BagContent>,
    ) -> Result<SurpriseBag, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_surprise_bag: failed to acquire DB connection: {}", e);
            e
        })?;

        Self::validate_pricing(new_bag.original_value, new_bag.discounted_price)?;
        if new_bag.pickup_start_time >= new_bag.pickup_end_time {
            return Err(RepositoryError::Validation(
                "pickup_start_time must be before pickup_end_time".to_string(),
            ));
        }
        for content in &contents {
            if content.min_quantity < 1 || content.max_quantity < content.min_quantity {
                return Err(RepositoryError::Validation(
                    "bag content quantity range is invalid".to_string(),
                ));
            }
        }

        conn.connection().transaction(|conn| {
            let bag: SurpriseBag = {
                use crate::db::schema::surprise_bags::dsl::*;
                diesel::insert_into(surprise_bags)
                    .values(&new_bag)
                    .get_result(conn)
                    .map_err(|e| {
                        error!(
                            "create_surprise_bag: error inserting bag '{}': {}",
                            new_bag.name, e
                        );
                        RepositoryError::DatabaseError(e)
                    })?
            };

            if !contents.is_empty() {
                // Contents must come from the same store as the bag.
                let item_ids: Vec<i32> = contents.iter().map(|c| c.food_item_id).collect();
                let owned: i64 = {
                    use crate::db::schema::food_items::dsl::*;
                    food_items
                        .filter(food_item_id.eq_any(&item_ids))
                        .filter(store_id.eq(bag.store_id))
                        .count()
                        .get_result(conn)
                        .map_err(RepositoryError::DatabaseError)?
                };
                if owned != item_ids.len() as i64 {
                    return Err(RepositoryError::Validation(
                        "bag contents reference food items outside the store".to_string(),
                    ));
                }

                use crate::db::schema::surprise_bag_items::dsl::*;
                let rows: Vec<NewSurpriseBagItem> = contents
                    .iter()
                    .map(|c| NewSurpriseBagItem {
                        surprise_bag_id: bag.surprise_bag_id,
                        food_item_id: c.food_item_id,
                        min_quantity: c.min_quantity,
                        max_quantity: c.max_quantity,
                    })
                    .collect();
                diesel::insert_into(surprise_bag_items)
                    .values(&rows)
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(bag)
        })
    }

    pub fn get_surprise_bag(&self, id: i32) -> Result<SurpriseBag, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::surprise_bags::dsl::*;
        surprise_bags
            .find(id)
            .get_result::<SurpriseBag>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("surprise bag {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn get_bag_contents(&self, id: i32) -> Result<Vec<SurpriseBagItem>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::surprise_bag_items::dsl::*;
        surprise_bag_items
            .filter(surprise_bag_id.eq(id))
            .load::<SurpriseBagItem>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Bags customers can still book: active, in stock, pickup window open.
    pub fn list_active_bags(
        &self,
        store_filter: Option<i32>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<SurpriseBag>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::surprise_bags::dsl::*;
        let mut query = surprise_bags
            .filter(is_active.eq(true))
            .filter(quantity_available.gt(0))
            .filter(pickup_end_time.gt(Utc::now()))
            .into_boxed();
        if let Some(sid) = store_filter {
            query = query.filter(store_id.eq(sid));
        }
        query
            .order_by(pickup_start_time.asc())
            .offset(skip)
            .limit(limit)
            .load::<SurpriseBag>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn list_store_bags(
        &self,
        store_id_val: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<SurpriseBag>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::surprise_bags::dsl::*;
        surprise_bags
            .filter(store_id.eq(store_id_val))
            .order_by(pickup_start_time.asc())
            .offset(skip)
            .limit(limit)
            .load::<SurpriseBag>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn update_surprise_bag(
        &self,
        id: i32,
        owner_store_id: i32,
        changes: UpdateSurpriseBag,
    ) -> Result<SurpriseBag, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_surprise_bag: failed to acquire DB connection for bag {}: {}",
                id, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let bag = Self::load_owned(conn, id, owner_store_id)?;

            let next_original = changes.original_value.unwrap_or(bag.original_value);
            let next_discounted = changes.discounted_price.unwrap_or(bag.discounted_price);
            Self::validate_pricing(next_original, next_discounted)?;

            let next_start = changes.pickup_start_time.unwrap_or(bag.pickup_start_time);
            let next_end = changes.pickup_end_time.unwrap_or(bag.pickup_end_time);
            if next_start >= next_end {
                return Err(RepositoryError::Validation(
                    "pickup_start_time must be before pickup_end_time".to_string(),
                ));
            }
            if let Some(qty) = changes.quantity_available {
                if qty < 0 {
                    return Err(RepositoryError::Validation(
                        "quantity_available must not be negative".to_string(),
                    ));
                }
            }

            use crate::db::schema::surprise_bags::dsl::*;
            diesel::update(surprise_bags.find(bag.surprise_bag_id))
                .set((&changes, updated_at.eq(diesel::dsl::now)))
                .get_result::<SurpriseBag>(conn)
                .map_err(|e| {
                    error!("update_surprise_bag: error updating bag {}: {}", id, e);
                    RepositoryError::DatabaseError(e)
                })
        })
    }

    pub fn delete_surprise_bag(
        &self,
        id: i32,
        owner_store_id: i32,
    ) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        conn.connection().transaction(|conn| {
            let bag = Self::load_owned(conn, id, owner_store_id)?;

            use crate::db::schema::surprise_bags::dsl::*;
            diesel::update(surprise_bags.find(bag.surprise_bag_id))
                .set((is_active.eq(false), updated_at.eq(diesel::dsl::now)))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
            Ok(())
        })
    }

    fn validate_pricing(original: f64, discounted: f64) -> Result<(), RepositoryError> {
        if original <= 0.0 || discounted < 0.0 {
            return Err(RepositoryError::Validation(
                "prices must be positive".to_string(),
            ));
        }
        if discounted >= original {
            return Err(RepositoryError::Validation(
                "discounted_price must be lower than original_value".to_string(),
            ));
        }
        Ok(())
    }

    fn load_owned(
        conn: &mut PgConnection,
        id: i32,
        owner_store_id: i32,
    ) -> Result<SurpriseBag, RepositoryError> {
        use crate::db::schema::surprise_bags::dsl::*;
        let bag = surprise_bags
            .find(id)
            .get_result::<SurpriseBag>(conn)
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("surprise bag {id}")),
                other => RepositoryError::DatabaseError(other),
            })?;
        if bag.store_id != owner_store_id {
            return Err(RepositoryError::Forbidden(
                "surprise bag belongs to another store".to_string(),
            ));
        }
        Ok(bag)
    }
}
