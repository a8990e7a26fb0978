use chrono::{DateTime, Utc};
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::conversations)]
#[diesel(primary_key(conversation_id))]
pub struct Conversation {
    pub conversation_id: i32,
    pub name: Option<String>,
    pub kind: String,
    pub last_message_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::conversations)]
pub struct NewConversation {
    pub name: Option<String>,
    pub kind: String,
}

#[derive(Queryable, Selectable, Serialize, ToSchema, Debug)]
#[diesel(table_name = crate::db::schema::conversation_members)]
pub struct ConversationMember {
    pub conversation_id: i32,
    pub user_id: i32,
    pub unread_count: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::conversation_members)]
pub struct NewConversationMember {
    pub conversation_id: i32,
    pub user_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, ToSchema, Debug, Clone)]
#[diesel(table_name = crate::db::schema::messages)]
#[diesel(primary_key(message_id))]
pub struct Message {
    pub message_id: i32,
    pub conversation_id: i32,
    pub sender_id: i32,
    pub content: String,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::messages)]
pub struct NewMessage {
    pub conversation_id: i32,
    pub sender_id: i32,
    pub content: String,
}
