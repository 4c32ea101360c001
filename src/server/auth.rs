//! Bearer-token authentication for the admin routes.

use super::state::ServerState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};

/// Capabilities an authenticated caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Modify settings for sending club contracts and trigger the sweep.
    ManageClubSettings,
}

/// An authenticated admin request.
///
/// Extraction fails with 401 unless the request carries
/// `Authorization: Bearer <admin_token>`. The admin token grants all
/// permissions; handlers still declare the one they need via [`require`].
///
/// [`require`]: AdminSession::require
pub struct AdminSession {
    permissions: Vec<Permission>,
}

impl AdminSession {
    pub fn require(&self, permission: Permission) -> Result<(), StatusCode> {
        if self.permissions.contains(&permission) {
            Ok(())
        } else {
            Err(StatusCode::FORBIDDEN)
        }
    }
}

impl FromRequestParts<ServerState> for AdminSession {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.admin_token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        if token != state.config.admin_token {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AdminSession {
            permissions: vec![Permission::ManageClubSettings],
        })
    }
}
