//! Events page endpoint.

use axum::extract::{Query, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{parse_filter, success, ApiResult};
use crate::db::load_collection;
use crate::listing::{filter_events, rank, EventFilter, EventStatus};
use crate::models::Event;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub status: EventStatus,
    pub display_image: String,
}

/// GET /api/events?filter=all|upcoming|past - Upcoming soonest first, then
/// past most recent first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Vec<EventView>> {
    let mode: EventFilter = parse_filter(query.filter.as_deref())?;
    let events: Vec<Event> = load_collection(state.store.as_ref()).await?;

    let now = Utc::now().naive_utc();
    let ranked = rank(filter_events(&events, mode, now), now);

    let views = ranked
        .events
        .into_iter()
        .map(|(event, status)| EventView {
            display_image: event.display_image().to_string(),
            event,
            status,
        })
        .collect();
    success(views)
}
