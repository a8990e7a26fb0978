use crate::api::{blocking, ApiError, ErrorBody};
use crate::auth::AuthedUser;
use crate::db::ChatOperations;
use crate::models::chat::{Conversation, Message};
use crate::schemas::chat::{ConversationCreateRequest, MessageCreateRequest};
use crate::schemas::{PageQuery, PaginationResponse};
use crate::AppState;
use actix_web::{get, post, web, HttpResponse};

pub(super) fn config(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/chat")
            .app_data(web::Data::new(state.chat_ops.clone()))
            .service(my_conversations)
            .service(create_conversation)
            .service(send_message)
            .service(conversation_messages)
            .service(mark_conversation_read),
    );
}

#[utoipa::path(
    tag = "Chat",
    request_body = ConversationCreateRequest,
    responses((status = 201, description = "Thread created", body = Conversation)),
    summary = "Start a conversation"
)]
#[post("/conversations")]
pub(super) async fn create_conversation(
    chat_ops: web::Data<ChatOperations>,
    authed: AuthedUser,
    req_data: web::Json<ConversationCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let ConversationCreateRequest { name, member_ids } = req_data.into_inner();
    let ops = chat_ops.get_ref().clone();
    let creator = authed.user_id();
    let conversation =
        blocking(move || ops.create_conversation(creator, name, member_ids)).await?;
    Ok(HttpResponse::Created().json(conversation))
}

#[utoipa::path(
    tag = "Chat",
    responses((status = 200, description = "Own threads, most recently active first", body = [Conversation])),
    summary = "List own conversations"
)]
#[get("/conversations")]
pub(super) async fn my_conversations(
    chat_ops: web::Data<ChatOperations>,
    authed: AuthedUser,
) -> Result<HttpResponse, ApiError> {
    let ops = chat_ops.get_ref().clone();
    let user = authed.user_id();
    let data = blocking(move || ops.list_user_conversations(user)).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[utoipa::path(
    tag = "Chat",
    request_body = MessageCreateRequest,
    responses(
        (status = 201, description = "Message delivered", body = Message),
        (status = 403, description = "Sender is not a member", body = ErrorBody)
    ),
    summary = "Send a message"
)]
#[post("/messages")]
pub(super) async fn send_message(
    chat_ops: web::Data<ChatOperations>,
    authed: AuthedUser,
    req_data: web::Json<MessageCreateRequest>,
) -> Result<HttpResponse, ApiError> {
    let MessageCreateRequest {
        conversation_id,
        content,
    } = req_data.into_inner();
    if content.trim().is_empty() {
        return Err(ApiError::validation("message content must not be empty"));
    }

    let ops = chat_ops.get_ref().clone();
    let sender = authed.user_id();
    let message = blocking(move || ops.create_message(sender, conversation_id, content)).await?;
    Ok(HttpResponse::Created().json(message))
}

#[utoipa::path(
    tag = "Chat",
    params(PageQuery),
    responses(
        (status = 200, description = "Messages, oldest first"),
        (status = 403, description = "Caller is not a member", body = ErrorBody)
    ),
    summary = "List a conversation's messages"
)]
#[get("/conversations/{conversation_id}/messages")]
pub(super) async fn conversation_messages(
    chat_ops: web::Data<ChatOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
    page: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let conversation_id = path.into_inner();
    let (skip, limit) = (page.skip(), page.limit());
    let ops = chat_ops.get_ref().clone();
    let user = authed.user_id();
    let data =
        blocking(move || ops.list_messages(conversation_id, user, skip, limit)).await?;
    Ok(HttpResponse::Ok().json(PaginationResponse::new(data, skip, limit)))
}

#[utoipa::path(
    tag = "Chat",
    responses((status = 204, description = "Unread counter reset")),
    summary = "Mark a conversation as read"
)]
#[post("/conversations/{conversation_id}/read")]
pub(super) async fn mark_conversation_read(
    chat_ops: web::Data<ChatOperations>,
    authed: AuthedUser,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let conversation_id = path.into_inner();
    let ops = chat_ops.get_ref().clone();
    let user = authed.user_id();
    blocking(move || ops.mark_conversation_read(conversation_id, user)).await?;
    Ok(HttpResponse::NoContent().finish())
}
