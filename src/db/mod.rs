use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{r2d2, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

mod chat;
mod errors;
mod food_items;
pub(crate) mod notifications;
mod orders;
pub mod schema;
mod stores;
mod surprise_bags;
mod transactions;
mod users;

pub use chat::ChatOperations;
pub use errors::RepositoryError;
pub use food_items::FoodItemOperations;
pub use notifications::NotificationOperations;
pub use orders::{CreatedOrder, OrderLine, OrderOperations};
pub use stores::{StoreOperations, SENTINEL_DISTANCE_KM};
pub use surprise_bags::{BagContent, SurpriseBagOperations};
pub use transactions::TransactionOperations;
pub use users::UserOperations;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn establish_connection_pool(database_url: &str) -> Pool<ConnectionManager<PgConnection>> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder().max_size(20).build(manager).unwrap()
}

pub fn run_db_migrations(
    pool: Pool<ConnectionManager<PgConnection>>,
) -> Result<(), RepositoryError> {
    let mut conn = DbConnection::new(&pool)?;
    conn.connection()
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| RepositoryError::Validation(format!("migration failure: {e}")))?;
    Ok(())
}

// Connection Guard - Manages pool
pub struct DbConnection<'a> {
    conn: r2d2::PooledConnection<ConnectionManager<PgConnection>>,
    _lifetime: std::marker::PhantomData<&'a ()>,
}

impl DbConnection<'_> {
    pub fn new(pool: &Pool<ConnectionManager<PgConnection>>) -> Result<Self, RepositoryError> {
        Ok(Self {
            conn: pool.get().map_err(RepositoryError::ConnectionPoolError)?,
            _lifetime: std::marker::PhantomData,
        })
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }
}
