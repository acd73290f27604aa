//! Gallery page and viewer endpoints.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{parse_filter, success, ApiResult};
use crate::db::load_collection;
use crate::errors::AppError;
use crate::lightbox::{Lightbox, LightboxState};
use crate::listing::{category_chips, filter_gallery, CategoryChip, GalleryFilter, KindFilter};
use crate::models::GalleryItem;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub search: Option<String>,
    pub kind: Option<String>,
    /// Category chip clicked on top of the current search.
    pub chip: Option<String>,
}

impl GalleryQuery {
    fn filter(&self) -> Result<GalleryFilter, AppError> {
        let kind: KindFilter = parse_filter(self.kind.as_deref())?;
        let mut filter = GalleryFilter {
            search_text: self.search.clone().unwrap_or_default(),
            kind,
        };
        if let Some(label) = self.chip.as_deref() {
            filter.select_chip(&CategoryChip::from_label(label));
        }
        Ok(filter)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemView {
    #[serde(flatten)]
    pub item: GalleryItem,
    pub display_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
}

impl From<GalleryItem> for GalleryItemView {
    fn from(item: GalleryItem) -> Self {
        Self {
            display_image: item.display_image(),
            embed_url: item.embed_url(),
            item,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GalleryPage {
    /// Search text in effect after any chip click.
    pub search: String,
    pub items: Vec<GalleryItemView>,
    /// Chips are built from the whole collection, not the filtered list.
    pub categories: Vec<CategoryChip>,
}

/// GET /api/gallery?search=&kind=&chip= - Filtered gallery plus category chips.
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<GalleryPage> {
    let filter = query.filter()?;
    let all: Vec<GalleryItem> = load_collection(state.store.as_ref()).await?;

    success(GalleryPage {
        search: filter.search_text.clone(),
        items: filter_gallery(&all, &filter)
            .into_iter()
            .map(GalleryItemView::from)
            .collect(),
        categories: category_chips(&all),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerPage {
    pub viewer: LightboxState,
    pub item: GalleryItemView,
    pub total: usize,
    /// Absent when the filtered list has a single item.
    pub prev: Option<GalleryItemView>,
    pub next: Option<GalleryItemView>,
}

/// GET /api/gallery/{id}/viewer?search=&kind= - Viewer opened on one item of
/// the filtered list, with its wrap-around neighbours.
pub async fn open_viewer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<ViewerPage> {
    let filter = query.filter()?;
    let all: Vec<GalleryItem> = load_collection(state.store.as_ref()).await?;
    let items = filter_gallery(&all, &filter);

    let Some(index) = items.iter().position(|item| item.id == id) else {
        return Err(AppError::NotFound(format!(
            "Gallery item {} not in the current selection",
            id
        )));
    };
    let item = &items[index];

    let mut lightbox = Lightbox::new(());
    lightbox.open(item, index);
    let viewer = lightbox.state().clone();
    let next = lightbox.next(&items).cloned();
    lightbox.open(item, index);
    let prev = lightbox.prev(&items).cloned();
    lightbox.close();

    success(ViewerPage {
        viewer,
        item: item.clone().into(),
        total: items.len(),
        prev: prev.map(GalleryItemView::from),
        next: next.map(GalleryItemView::from),
    })
}
