mod common;

use wisebite::db::{ChatOperations, RepositoryError};

#[actix_rt::test]
async fn conversation_membership_and_unread_bookkeeping() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();

    let ops = ChatOperations::new(pool.clone());
    let conversation = ops
        .create_conversation(
            fixtures.customer_id,
            Some("Pickup details".to_string()),
            vec![fixtures.vendor_id],
        )
        .expect("create conversation");
    assert_eq!(conversation.kind, "private");

    let message = ops
        .create_message(
            fixtures.customer_id,
            conversation.conversation_id,
            "When can I pick up?".to_string(),
        )
        .expect("send message");

    // The thread records the last message and bumps the vendor's unread
    // counter, not the sender's.
    let threads = ops
        .list_user_conversations(fixtures.vendor_id)
        .expect("vendor threads");
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].last_message_id, Some(message.message_id));

    let messages = ops
        .list_messages(
            conversation.conversation_id,
            fixtures.vendor_id,
            0,
            20,
        )
        .expect("vendor reads");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "When can I pick up?");

    ops.mark_conversation_read(conversation.conversation_id, fixtures.vendor_id)
        .expect("mark read");
}

#[actix_rt::test]
async fn non_members_are_locked_out() {
    let (pool, fixtures) = common::setup_pool_with_fixtures();
    let mut conn = wisebite::db::DbConnection::new(&pool).expect("db connection");
    let outsider = wisebite::test_utils::insert_user(
        conn.connection(),
        "Outsider",
        "outsider@example.com",
        "0900000060",
        wisebite::models::user::UserRole::Customer,
    )
    .expect("outsider");

    let ops = ChatOperations::new(pool.clone());
    let conversation = ops
        .create_conversation(fixtures.customer_id, None, vec![fixtures.vendor_id])
        .expect("create conversation");

    let read = ops.list_messages(conversation.conversation_id, outsider, 0, 20);
    assert!(matches!(read, Err(RepositoryError::Forbidden(_))));

    let write = ops.create_message(outsider, conversation.conversation_id, "hi".to_string());
    assert!(matches!(write, Err(RepositoryError::Forbidden(_))));
}
