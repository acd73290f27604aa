//! Home page endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::db::load_home;
use crate::models::HomeContent;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    #[serde(flatten)]
    pub content: HomeContent,
    pub display_image: String,
}

impl From<HomeContent> for HomeView {
    fn from(content: HomeContent) -> Self {
        let display_image = content.display_image().to_string();
        Self {
            content,
            display_image,
        }
    }
}

/// GET /api/home - Home page copy, with defaults when nothing was saved.
pub async fn get_home(State(state): State<AppState>) -> ApiResult<HomeView> {
    let content = load_home(state.store.as_ref()).await?;
    success(content.into())
}
