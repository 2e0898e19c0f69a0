use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::orders::ListParams;
use crate::error::AppError;
use crate::state::SharedState;

use super::{page_params, total_pages, wants_desc};

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub desc: Option<String>,
}

/// Orders belonging to the authenticated user, newest first by default.
pub async fn list_for_current(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = page_params(query.page, query.limit);
    let params = ListParams {
        user_id: auth.uuid(),
        limit: page.limit,
        offset: page.offset,
        sort_by: query.sort_by.unwrap_or_else(|| "created_at".to_string()),
        desc: wants_desc(query.desc.as_deref()),
    };

    let orders = db::orders::list_for_user(&state.pool, &params).await?;
    let total = db::orders::count_for_user(&state.pool, auth.uuid()).await?;

    Ok(Json(json!({
        "orders": orders,
        "total": total,
        "page": page.number,
        "limit": page.limit,
        "total_pages": total_pages(total, page.limit),
    })))
}
