use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::notifications)]
#[diesel(primary_key(notification_id))]
pub struct Notification {
    pub notification_id: i32,
    pub title: String,
    pub message: String,
    pub is_important: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::notifications)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub is_important: bool,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::notification_recipients)]
pub struct NewNotificationRecipient {
    pub notification_id: i32,
    pub user_id: i32,
}

/// One notification joined with the recipient's read state.
#[derive(Queryable, Serialize, ToSchema, Debug)]
pub struct UserNotification {
    pub notification_id: i32,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
