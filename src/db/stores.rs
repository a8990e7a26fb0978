use crate::db::{DbConnection, RepositoryError};
use crate::models::store::{NewStore, Store, UpdateStore};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::sql_types::{BigInt, Double};
use diesel::PgConnection;
use log::{error, warn};

/// Distance reported by the degraded nearby lookup when the spatial
/// extension is unavailable.
pub const SENTINEL_DISTANCE_KM: f64 = -1.0;

#[derive(QueryableByName, Debug)]
struct NearbyRow {
    #[diesel(embed)]
    store: Store,
    #[diesel(sql_type = Double)]
    distance_km: f64,
}

#[derive(Clone)]
pub struct StoreOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl StoreOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    pub fn create_store(&self, new_store: NewStore) -> Result<Store, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_store: failed to acquire DB connection: {}", e);
            e
        })?;

        use crate::db::schema::stores::dsl::*;
        diesel::insert_into(stores)
            .values(&new_store)
            .get_result(conn.connection())
            .map_err(|e| {
                error!(
                    "create_store: error inserting store for owner {}: {}",
                    new_store.owner_id, e
                );
                RepositoryError::DatabaseError(e)
                    .on_unique_violation("vendor already owns a store")
            })
    }

    pub fn get_store_by_id(&self, id: i32) -> Result<Store, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::stores::dsl::*;
        stores
            .find(id)
            .get_result::<Store>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("store {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn get_store_by_owner(&self, owner: i32) -> Result<Store, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::stores::dsl::*;
        stores
            .filter(owner_id.eq(owner))
            .limit(1)
            .get_result::<Store>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => {
                    RepositoryError::NotFound(format!("store owned by user {owner}"))
                }
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn update_store(
        &self,
        store_id_val: i32,
        changes: UpdateStore,
    ) -> Result<Store, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_store: failed to acquire DB connection for store_id {}: {}",
                store_id_val, e
            );
            e
        })?;

        // diesel rejects an all-None changeset; an empty patch is a no-op.
        if changes.name.is_none()
            && changes.address.is_none()
            && changes.description.is_none()
            && changes.logo_url.is_none()
            && changes.latitude.is_none()
            && changes.longitude.is_none()
        {
            drop(conn);
            return self.get_store_by_id(store_id_val);
        }

        use crate::db::schema::stores::dsl::*;
        diesel::update(stores.find(store_id_val))
            .set(&changes)
            .get_result::<Store>(conn.connection())
            .map_err(|e| {
                error!(
                    "update_store: error updating store_id {}: {}",
                    store_id_val, e
                );
                match e {
                    Error::NotFound => RepositoryError::NotFound(format!("store {store_id_val}")),
                    other => RepositoryError::DatabaseError(other),
                }
            })
    }

    pub fn delete_store(&self, store_id_val: i32) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::stores::dsl::*;
        let deleted = diesel::delete(stores.find(store_id_val))
            .execute(conn.connection())
            .map_err(RepositoryError::DatabaseError)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound(format!("store {store_id_val}")));
        }
        Ok(())
    }

    pub fn list_stores(&self, skip: i64, limit: i64) -> Result<Vec<Store>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::stores::dsl::*;
        stores
            .order_by(name.asc())
            .offset(skip)
            .limit(limit)
            .load::<Store>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    /// Stores within `radius_km` of the given point, nearest first, each
    /// annotated with its spherical distance. Falls back to an unordered
    /// page with a sentinel distance when the earthdistance extension is
    /// missing; degraded, never failing.
    pub fn find_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_km: f64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<(Store, f64)>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("find_nearby: failed to acquire DB connection: {}", e);
            e
        })?;

        let spatial = diesel::sql_query(
            "SELECT s.*, \
                    earth_distance(ll_to_earth($1, $2), ll_to_earth(s.latitude, s.longitude)) / 1000.0 \
                        AS distance_km \
             FROM stores s \
             WHERE s.latitude IS NOT NULL AND s.longitude IS NOT NULL \
               AND earth_distance(ll_to_earth($1, $2), ll_to_earth(s.latitude, s.longitude)) \
                       <= $3 * 1000.0 \
             ORDER BY distance_km ASC \
             OFFSET $4 LIMIT $5",
        )
        .bind::<Double, _>(lat)
        .bind::<Double, _>(lon)
        .bind::<Double, _>(radius_km)
        .bind::<BigInt, _>(skip)
        .bind::<BigInt, _>(limit)
        .load::<NearbyRow>(conn.connection());

        match spatial {
            Ok(rows) => Ok(rows
                .into_iter()
                .map(|row| (row.store, row.distance_km))
                .collect()),
            Err(e) => {
                warn!(
                    "find_nearby: spatial query unavailable, serving unordered page: {}",
                    e
                );
                use crate::db::schema::stores::dsl::*;
                let page = stores
                    .offset(skip)
                    .limit(limit)
                    .load::<Store>(conn.connection())
                    .map_err(RepositoryError::DatabaseError)?;
                Ok(page
                    .into_iter()
                    .map(|s| (s, SENTINEL_DISTANCE_KM))
                    .collect())
            }
        }
    }
}
