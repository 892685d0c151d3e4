use axum::{Json, extract::{Query, State}};
use serde::{Deserialize, Serialize};
use shoply_db::models::CatalogEntry;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub name: String,
    pub barcode: Option<String>,
    pub icon: Option<String>,
    pub use_count: u64,
}

/// Prefix suggestions from the caller's own item history, most used
/// first.
pub async fn suggest(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<SuggestParams>,
) -> Result<Json<Vec<SuggestionResponse>>, ApiError> {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let entries = state.catalog.suggest(auth.user_id, &params.q, limit).await?;

    Ok(Json(entries.into_iter().map(to_response).collect()))
}

fn to_response(entry: CatalogEntry) -> SuggestionResponse {
    SuggestionResponse {
        name: entry.name,
        barcode: entry.barcode,
        icon: entry.icon,
        use_count: entry.use_count,
    }
}
