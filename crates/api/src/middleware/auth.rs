//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use knowmaint_core::error::CoreError;
use knowmaint_core::policy::Actor;
use knowmaint_core::roles::UserRole;
use knowmaint_core::types::DbId;
use knowmaint_db::repositories::UserRepo;

use crate::auth::jwt::{validate_token, Claims, TokenKind};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a Bearer access token.
///
/// Role and group come from the `users` row loaded on every request, not
/// from the token, so a role change or group move takes effect immediately.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     policy::require(&auth.actor(), Action::ManageCatalog, Resource::None)?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: UserRole,
    pub group_id: Option<DbId>,
    /// Claims of the presented access token (needed to revoke it on logout).
    pub claims: Claims,
}

impl AuthUser {
    /// The identity the authorization policy sees.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            group_id: self.group_id,
        }
    }
}

/// Validate `token` as a token of kind `expected`.
///
/// Checks signature, expiry, kind and the revocation list, in that order.
/// Every failure except an unreachable revocation store is the same 401.
pub async fn verify_token(state: &AppState, token: &str, expected: TokenKind) -> AppResult<Claims> {
    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| unauthorized("Invalid or expired token"))?;

    if claims.kind != expected {
        return Err(unauthorized("Invalid or expired token"));
    }

    if state.revocation.is_revoked(&claims.jti).await? {
        return Err(unauthorized("Token has been revoked"));
    }

    Ok(claims)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = verify_token(state, token, TokenKind::Access).await?;

        let user = UserRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| unauthorized("User no longer exists"))?;

        Ok(AuthUser {
            user_id: user.id,
            role: user.role,
            group_id: user.group_id,
            claims,
        })
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.to_string()))
}
