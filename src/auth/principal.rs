use crate::models::user::UserRole;

/// Authenticated identity attached to the request by the auth middleware.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: i32,
    pub role: UserRole,
}
