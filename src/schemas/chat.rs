use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ConversationCreateRequest {
    pub name: Option<String>,
    pub member_ids: Vec<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct MessageCreateRequest {
    pub conversation_id: i32,
    pub content: String,
}
