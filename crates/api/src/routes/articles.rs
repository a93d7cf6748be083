//! Route definitions for the `/articles` resource (keyed by external code).

use axum::routing::get;
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Routes mounted at `/articles`.
///
/// ```text
/// GET    /         -> list
/// POST   /         -> create (admin)
/// GET    /{code}   -> get_by_code
/// PUT    /{code}   -> update (admin)
/// DELETE /{code}   -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::list).post(articles::create))
        .route(
            "/{code}",
            get(articles::get_by_code)
                .put(articles::update)
                .delete(articles::delete),
        )
}
