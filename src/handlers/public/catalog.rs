// handlers/public/catalog.rs - Catalog listing, details and genres

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::catalog::{self, CatalogSort};
use crate::database::models::{Genre, ManhwaDetails, ManhwaSummary};
use crate::middleware::{ApiResponse, ApiResult, PathParam, QueryParams};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// `rating`, `views` (default) or `new`.
    pub sort: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub manhwa: Vec<ManhwaSummary>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub chapter_id: Option<i32>,
}

/// GET /manhwa - List titles with genre and chapter counts
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<CatalogQuery>) -> ApiResult<CatalogResponse> {
    let limit = state.config.list_limit(query.limit);
    let sort = CatalogSort::from_param(query.sort.as_deref());
    let search = query.search.as_deref().map(str::trim);

    let manhwa = catalog::list_manhwa(&state.db, search, sort, limit).await?;
    Ok(ApiResponse::success(CatalogResponse { manhwa }))
}

/// GET /genres
pub async fn genres(State(state): State<AppState>) -> ApiResult<GenresResponse> {
    let genres = catalog::list_genres(&state.db).await?;
    Ok(ApiResponse::success(GenresResponse { genres }))
}

/// GET /manhwa/:id - Title details, its chapters, and the pages of one chapter when asked
pub async fn details(
    State(state): State<AppState>,
    PathParam(manhwa_id): PathParam<i32>,
    QueryParams(query): QueryParams<DetailsQuery>,
) -> ApiResult<ManhwaDetails> {
    let details = catalog::manhwa_details(&state.db, manhwa_id, query.chapter_id).await?;
    Ok(ApiResponse::success(details))
}
