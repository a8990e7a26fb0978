use crate::auth::principal::Principal;
use crate::models::user::UserRole;
use actix_web::dev::Payload;
use actix_web::{error::ErrorForbidden, error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

/// Any authenticated user.
pub struct AuthedUser(pub Principal);

impl AuthedUser {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

impl FromRequest for AuthedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(p) = req.extensions().get::<Principal>() {
            return ready(Ok(AuthedUser(p.clone())));
        }
        ready(Err(ErrorUnauthorized("missing principal")))
    }
}

/// Authenticated user with the vendor role.
pub struct VendorUser(pub Principal);

impl VendorUser {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

impl FromRequest for VendorUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(p) = req.extensions().get::<Principal>() {
            if p.role == UserRole::Vendor {
                return ready(Ok(VendorUser(p.clone())));
            }
            return ready(Err(ErrorForbidden("vendor role required")));
        }
        ready(Err(ErrorUnauthorized("missing principal")))
    }
}

/// Authenticated user with the admin role.
pub struct AdminUser(pub Principal);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(p) = req.extensions().get::<Principal>() {
            if p.role == UserRole::Admin {
                return ready(Ok(AdminUser(p.clone())));
            }
            return ready(Err(ErrorForbidden("admin role required")));
        }
        ready(Err(ErrorUnauthorized("missing principal")))
    }
}
