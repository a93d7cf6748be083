//! Route definitions for the `/info-categories` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::info_categories;
use crate::state::AppState;

/// Routes mounted at `/info-categories`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create (admin)
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update (admin)
/// DELETE /{id}   -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(info_categories::list).post(info_categories::create),
        )
        .route(
            "/{id}",
            get(info_categories::get_by_id)
                .put(info_categories::update)
                .delete(info_categories::delete),
        )
}
