use crate::db::{DbConnection, RepositoryError};
use crate::models::chat::{
    Conversation, Message, NewConversation, NewConversationMember, NewMessage,
};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error;
use diesel::PgConnection;
use log::error;
use std::collections::HashSet;

#[derive(Clone)]
pub struct ChatOperations {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl ChatOperations {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }

    /// Creates a thread; the creator is always a member.
    pub fn create_conversation(
        &self,
        creator: i32,
        name_val: Option<String>,
        member_ids: Vec<i32>,
    ) -> Result<Conversation, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_conversation: failed to acquire DB connection: {}",
                e
            );
            e
        })?;

        let mut members: HashSet<i32> = member_ids.into_iter().collect();
        members.insert(creator);
        let kind_val = if members.len() > 2 { "group" } else { "private" };

        conn.connection().transaction(|conn| {
            let conversation: Conversation = {
                use crate::db::schema::conversations::dsl::*;
                diesel::insert_into(conversations)
                    .values(&NewConversation {
                        name: name_val.clone(),
                        kind: kind_val.to_string(),
                    })
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            use crate::db::schema::conversation_members::dsl::*;
            let rows: Vec<NewConversationMember> = members
                .iter()
                .map(|uid| NewConversationMember {
                    conversation_id: conversation.conversation_id,
                    user_id: *uid,
                })
                .collect();
            diesel::insert_into(conversation_members)
                .values(&rows)
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;

            Ok(conversation)
        })
    }

    /// Posts a message, moves the conversation to the top of everyone's
    /// list and bumps the other members' unread counters.
    pub fn create_message(
        &self,
        sender: i32,
        conversation: i32,
        content_val: String,
    ) -> Result<Message, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool).map_err(|e| {
            error!(
                "create_message: failed to acquire DB connection for conversation {}: {}",
                conversation, e
            );
            e
        })?;

        conn.connection().transaction(|conn| {
            Self::ensure_member(conn, conversation, sender)?;

            let message: Message = {
                use crate::db::schema::messages::dsl::*;
                diesel::insert_into(messages)
                    .values(&NewMessage {
                        conversation_id: conversation,
                        sender_id: sender,
                        content: content_val.clone(),
                    })
                    .get_result(conn)
                    .map_err(RepositoryError::DatabaseError)?
            };

            {
                use crate::db::schema::conversations::dsl::*;
                diesel::update(conversations.find(conversation))
                    .set((
                        last_message_id.eq(Some(message.message_id)),
                        updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .map_err(RepositoryError::DatabaseError)?;
            }

            {
                use crate::db::schema::conversation_members::dsl::*;
                diesel::update(
                    conversation_members
                        .filter(conversation_id.eq(conversation))
                        .filter(user_id.ne(sender)),
                )
                .set(unread_count.eq(unread_count + 1))
                .execute(conn)
                .map_err(RepositoryError::DatabaseError)?;
            }

            Ok(message)
        })
    }

    pub fn list_user_conversations(
        &self,
        user: i32,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::{conversation_members, conversations};
        conversations::table
            .inner_join(conversation_members::table)
            .filter(conversation_members::user_id.eq(user))
            .order_by(conversations::updated_at.desc())
            .select(Conversation::as_select())
            .load::<Conversation>(conn.connection())
            .map_err(RepositoryError::DatabaseError)
    }

    pub fn list_messages(
        &self,
        conversation: i32,
        user: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        conn.connection().transaction(|conn| {
            Self::ensure_member(conn, conversation, user)?;

            use crate::db::schema::messages::dsl::*;
            messages
                .filter(conversation_id.eq(conversation))
                .filter(is_deleted.eq(false))
                .order_by(created_at.asc())
                .offset(skip)
                .limit(limit)
                .load::<Message>(conn)
                .map_err(RepositoryError::DatabaseError)
        })
    }

    /// Resets the caller's unread counter after they catch up.
    pub fn mark_conversation_read(
        &self,
        conversation: i32,
        user: i32,
    ) -> Result<(), RepositoryError> {
        let mut conn = DbConnection::new(&self.pool)?;

        use crate::db::schema::conversation_members::dsl::*;
        let updated = diesel::update(
            conversation_members
                .filter(conversation_id.eq(conversation))
                .filter(user_id.eq(user)),
        )
        .set(unread_count.eq(0))
        .execute(conn.connection())
        .map_err(RepositoryError::DatabaseError)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!(
                "conversation {conversation}"
            )));
        }
        Ok(())
    }

    fn ensure_member(
        conn: &mut PgConnection,
        conversation: i32,
        user: i32,
    ) -> Result<(), RepositoryError> {
        use crate::db::schema::conversation_members::dsl::*;
        let membership: Result<i32, Error> = conversation_members
            .filter(conversation_id.eq(conversation))
            .filter(user_id.eq(user))
            .select(user_id)
            .get_result(conn);
        match membership {
            Ok(_) => Ok(()),
            Err(Error::NotFound) => Err(RepositoryError::Forbidden(
                "not a member of this conversation".to_string(),
            )),
            Err(other) => Err(RepositoryError::DatabaseError(other)),
        }
    }
}
