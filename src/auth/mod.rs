mod config;
mod extractors;
mod jwt;
mod middleware;
pub mod password;
mod principal;

pub use config::AuthConfig;
pub use extractors::{AdminUser, AuthedUser, VendorUser};
pub use jwt::{issue_token, verify_token, JwtError};
pub use middleware::AuthLayer;
pub use principal::Principal;
