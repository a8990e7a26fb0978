use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct NotificationCreateRequest {
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_important: bool,
    /// Target users; empty broadcasts to everyone.
    #[serde(default)]
    pub user_ids: Vec<i32>,
}
