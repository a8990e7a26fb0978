use crate::db::{DbConnection, RepositoryError};
use crate::models::notification::{
    NewNotification, NewNotificationRecipient, Notification, UserNotification,
};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;
use log::error;

#[derive(Clone)]
pub struct NotificationOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl NotificationOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Creates a notification and fans it out to the given recipients, or
    /// to every user when the list is empty.
    pub fn create_notification(
        &self,
        new_notification: NewNotification,
        recipient_ids: Vec<i32>,
    ) -> Result<Notification, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_notification: failed to acquire DB connection: {}",
                e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            let notification: Notification = {
                use crate::db::schema::notifications::dsl::*;
                diesel::insert_into(notifications)
                    .values(&new_notification)
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            let targets: Vec<i32> = if recipient_ids.is_empty() {
                use crate::db::schema::users::dsl::*;
                users
                    .select(user_id)
                    .load(conn)
                    .map_err(RepositoryError::DatabaseError)?
            } else {
                recipient_ids
            };

            if !targets.is_empty() {
                use crate::db::schema::notification_recipients::dsl::*;
                let rows: Vec<NewNotificationRecipient> = targets
                    .into_iter()
                    .map(|uid| NewNotificationRecipient {
                        notification_id: notification.notification_id,
                        user_id: uid,
                    })
                    .collect();
                diesel::insert_into(notification_recipients)
                    .values(&rows)
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(notification)
        })
    }

    pub fn list_user_notifications(
        &self,
        user: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UserNotification>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::{notification_recipients, notifications};
        notifications::table
            .inner_join(notification_recipients::table)
            .filter(notification_recipients::user_id.eq(user))
            .order_by(notification_recipients::created_at.desc())
            .offset(skip)
            .limit(limit)
            .select((
                notifications::notification_id,
                notifications::title,
                notifications::message,
                notification_recipients::is_read,
                notification_recipients::created_at,
            ))
            .load::<UserNotification>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn mark_as_read(&self, notification: i32, user: i32) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::notification_recipients::dsl::*;
        let updated = diesel::update(
            notification_recipients
                .filter(notification_id.eq(notification))
                .filter(user_id.eq(user)),
        )
        .set(is_read.eq(true))
        .execute(conn.connection())
        .map_err(RepositoryError::DatabaseError)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!(
                "notification {notification}"
            )));
        }
        Ok(())
    }

    pub(crate) fn pool(&self) -> &Pool<ConnectionManager<PgConnection>> {
        &self.pool
    }
}

/// Writes a notification for a single user on an already-acquired
/// connection; used by the outbound event worker.
pub(crate) fn notify_user(
    conn: &mut PgConnection,
    target: i32,
    title_val: &str,
    message_val: &str,
) -> Result<(), RepositoryError> {
    conn.transaction(|conn| {
        let notification: Notification = {
            use crate::db::schema::notifications::dsl::*;
            diesel::insert_into(notifications)
                .values(&NewNotification {
                    title: title_val.to_string(),
                    message: message_val.to_string(),
                    is_important: false,
                })
                .get_result(conn)
                .map_err(RepositoryError::DatabaseError)?
        };

        use crate::db::schema::notification_recipients::dsl::*;
        diesel::insert_into(notification_recipients)
            .values(&NewNotificationRecipient {
                notification_id: notification.notification_id,
                user_id: target,
            })
            .execute(conn)
            .map_err(RepositoryError::DatabaseError)?;
        Ok(())
    })
}
