//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                       -> list (admin)
/// POST   /                       -> create (admin)
/// GET    /me                     -> me
/// GET    /{id}                   -> get_by_id (admin)
/// PUT    /{id}                   -> update (admin)
/// DELETE /{id}                   -> delete (admin)
/// POST   /{id}/reset-password    -> reset_password (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list).post(users::create))
        .route("/me", get(users::me))
        .route(
            "/{id}",
            get(users::get_by_id)
                .put(users::update)
                .delete(users::delete),
        )
        .route("/{id}/reset-password", post(users::reset_password))
}
