pub mod auth;
pub mod password;
pub mod users;
pub mod admin;
pub mod orders;
pub mod order_statuses;
pub mod categories;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::middleware::auth_gate;
use crate::state::SharedState;

/// The full API surface in three slices: public, bearer-gated, and
/// bearer-plus-admin-gated. `require_auth` is the inner layer on the gated
/// slices so it always runs before `require_admin`.
pub fn api_routes(state: SharedState) -> Router<SharedState> {
    let public = Router::new()
        .route("/api/v1/user/create", post(auth::register))
        .route("/api/v1/user/login", post(auth::login))
        .route("/api/v1/user/forgot-password", post(password::forgot_password))
        .route(
            "/api/v1/user/reset-password-token",
            post(password::reset_password),
        )
        .route("/api/v1/admin/login", post(auth::login))
        .route("/api/v1/categories", get(categories::list))
        .route("/api/v1/categories/{id}", get(categories::get));

    let user = Router::new()
        .route(
            "/api/v1/user",
            get(users::get_current).delete(users::delete_current),
        )
        .route("/api/v1/user/edit", put(users::edit_current))
        .route("/api/v1/user/logout", get(auth::logout))
        .route("/api/v1/user/orders", get(orders::list_for_current))
        .route_layer(from_fn_with_state(state.clone(), auth_gate::require_auth));

    let admin = Router::new()
        .route("/api/v1/admin/create", post(auth::register_admin))
        .route("/api/v1/admin/logout", get(auth::logout))
        .route("/api/v1/admin/user-listing", get(admin::list_users))
        .route("/api/v1/admin/user-edit/{id}", put(admin::edit_user))
        .route("/api/v1/admin/user-delete/{id}", delete(admin::delete_user))
        .route("/api/v1/order-statuses", get(order_statuses::list))
        .route("/api/v1/order-status", get(order_statuses::list))
        .route("/api/v1/order-status/create", post(order_statuses::create))
        .route(
            "/api/v1/order-status/{id}",
            get(order_statuses::get)
                .put(order_statuses::update)
                .delete(order_statuses::delete),
        )
        .route("/api/v1/category/create", post(categories::create))
        .route(
            "/api/v1/category/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route_layer(from_fn(auth_gate::require_admin))
        .route_layer(from_fn_with_state(state, auth_gate::require_auth));

    public.merge(user).merge(admin)
}

pub(crate) struct Page {
    pub number: i64,
    pub limit: i64,
    pub offset: i64,
}

pub(crate) fn page_params(page: Option<i64>, limit: Option<i64>) -> Page {
    let number = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(15).clamp(1, 100);
    Page {
        number,
        limit,
        offset: (number - 1) * limit,
    }
}

/// Listings sort descending unless the query says `desc=false`.
pub(crate) fn wants_desc(desc: Option<&str>) -> bool {
    desc != Some("false")
}

pub(crate) fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        let page = page_params(None, None);
        assert_eq!((page.number, page.limit, page.offset), (1, 15, 0));

        let page = page_params(Some(0), Some(500));
        assert_eq!((page.number, page.limit), (1, 100));

        let page = page_params(Some(3), Some(10));
        assert_eq!(page.offset, 20);
    }

    #[test]
    fn desc_defaults_to_true() {
        assert!(wants_desc(None));
        assert!(wants_desc(Some("true")));
        assert!(wants_desc(Some("anything")));
        assert!(!wants_desc(Some("false")));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 15), 0);
        assert_eq!(total_pages(15, 15), 1);
        assert_eq!(total_pages(16, 15), 2);
    }
}
