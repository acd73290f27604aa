//! Graduates page endpoint.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use super::{parse_filter, success, ApiResult};
use crate::db::load_collection;
use crate::listing::{filter_by_year, graduate_years, YearFilter};
use crate::models::Graduate;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GraduatesQuery {
    pub year: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraduateView {
    #[serde(flatten)]
    pub graduate: Graduate,
    pub display_image: String,
}

#[derive(Debug, Serialize)]
pub struct GraduatesPage {
    pub graduates: Vec<GraduateView>,
    /// Every year present in the collection, regardless of the filter.
    pub years: Vec<i32>,
}

/// GET /api/graduates?year= - Graduates of one year, or all of them.
pub async fn list_graduates(
    State(state): State<AppState>,
    Query(query): Query<GraduatesQuery>,
) -> ApiResult<GraduatesPage> {
    let filter: YearFilter = parse_filter(query.year.as_deref())?;
    let all: Vec<Graduate> = load_collection(state.store.as_ref()).await?;

    let graduates = filter_by_year(&all, filter)
        .into_iter()
        .map(|graduate| GraduateView {
            display_image: graduate.display_image().to_string(),
            graduate,
        })
        .collect();

    success(GraduatesPage {
        graduates,
        years: graduate_years(&all),
    })
}
