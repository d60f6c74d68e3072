//! Caller identity handed down by the external auth gateway.
//!
//! The gateway verifies credentials upstream and forwards the result as
//! `x-user-id` / `x-user-role` headers; nothing here checks passwords. Core
//! handlers receive an [`AuthUser`] and never look up roles themselves.

use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::entity::Role;
use crate::error::AppError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// Verified caller context: who is asking, and with which role.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .ok_or(AppError::Unauthorized)
        };

        let id: Uuid = header(USER_ID_HEADER)?
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        let role: Role = header(USER_ROLE_HEADER)?
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser { id, role })
    }
}

/// Route-layer gate for the `/admin` subtree. Rejects non-admin callers
/// before any handler runs.
pub async fn admin_only(
    auth: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !auth.is_admin() {
        return Err(AppError::Forbidden);
    }
    Ok(next.run(request).await)
}
