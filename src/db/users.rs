use crate::db::{DbConnection, RepositoryError};
use crate::models::notification::NewNotificationRecipient;
use crate::models::store::NewStore;
use crate::models::user::{NewUser, User, UserChanges, UserRole};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;

#[derive(Clone)]
pub struct UserOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl UserOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Registers a user. A vendor signup also creates the 1:1 default store
    /// and subscribes the new user to every important notification.
    pub fn create_user(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!("create_user: failed to acquire DB connection: {}", e);
            e
        })?;

        conn.connection().transaction(|conn| {
            let user: User = {
                use crate::db::schema::users::dsl::*;
                diesel::insert_into(users)
                    .values(&new_user)
                    .get_result(conn)
                    .map_err(|e| {
                        error!(
                            "create_user: error inserting user with email '{}': {}",
                            new_user.email, e
                        );
                        RepositoryError::DatabaseError(e).on_unique_violation(
                            "a user with this email or phone number already exists",
                        )
                    })?
            };

            if user.role == UserRole::Vendor {
                use crate::db::schema::stores::dsl::*;
                diesel::insert_into(stores)
                    .values(&NewStore {
                        owner_id: user.user_id,
                        name: format!("Store of {}", user.full_name),
                        address: "Default Address".to_string(),
                        description: None,
                        logo_url: None,
                        latitude: None,
                        longitude: None,
                    })
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            let important_ids: Vec<i32> = {
                use crate::db::schema::notifications::dsl::*;
                notifications
                    .filter(is_important.eq(true))
                    .select(notification_id)
                    .load::<i32>(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };
            if !important_ids.is_empty() {
                use crate::db::schema::notification_recipients::dsl::*;
                let rows: Vec<NewNotificationRecipient> = important_ids
                    .into_iter()
                    .map(|nid| NewNotificationRecipient {
                        notification_id: nid,
                        user_id: user.user_id,
                    })
                    .collect();
                diesel::insert_into(notification_recipients)
                    .values(&rows)
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(user)
        })
    }

    pub fn get_user_by_id(&self, id: i32) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::users::dsl::*;
        users
            .find(id)
            .get_result::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("user {id}")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn get_user_by_email(&self, email_addr: &str) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::users::dsl::*;
        users
            .filter(email.eq(email_addr))
            .limit(1)
            .get_result::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("user '{email_addr}'")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn get_user_by_phone(&self, phone: &str) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::users::dsl::*;
        users
            .filter(phone_number.eq(phone))
            .limit(1)
            .get_result::<User>(conn.connection())
            .map_err(|e| match e {
                Error::NotFound => RepositoryError::NotFound(format!("user '{phone}'")),
                other => RepositoryError::DatabaseError(other),
            })
    }

    pub fn update_user(&self, id: i32, changes: UserChanges) -> Result<User, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "update_user: failed to acquire DB connection for user_id {}: {}",
                id, e
            );
            e
        })?;

        use crate::db::schema::users::dsl::*;
        diesel::update(users.find(id))
            .set((&changes, updated_at.eq(diesel::dsl::now)))
            .get_result::<User>(conn.connection())
            .map_err(|e| {
                error!("update_user: error updating user_id {}: {}", id, e);
                match e {
                    Error::NotFound => RepositoryError::NotFound(format!("user {id}")),
                    other => RepositoryError::DatabaseError(other)
                        .on_unique_violation("a user with this email or phone number already exists"),
                }
            })
    }

    pub fn delete_user(&self, id: i32) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "delete_user: failed to acquire DB connection for user_id {}: {}",
                id, e
            );
            e
        })?;

        use crate::db::schema::users::dsl::*;
        let deleted = diesel::delete(users.find(id))
            .execute(conn.connection())
            .map_err(RepositoryError::DatabaseError)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound(format!("user {id}")));
        }
        Ok(())
    }
}
