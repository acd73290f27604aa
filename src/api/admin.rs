//! Admin panel endpoints. Mounted behind `require_session`.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{success, ApiResult};
use crate::admin::{save_home, AdminEntity, AdminForm, Removal};
use crate::auth::Session;
use crate::errors::AppError;
use crate::models::HomeContent;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// PUT /api/admin/home - Replace the home page copy.
pub async fn update_home(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(content): Json<HomeContent>,
) -> ApiResult<HomeContent> {
    let saved = save_home(state.store.as_ref(), content).await?;
    tracing::info!(admin = %session.identifier, "Home content updated");
    success(saved)
}

/// GET /api/admin/{collection} - Admin listing in admin order.
pub async fn admin_list<E>(State(state): State<AppState>) -> ApiResult<Vec<E>>
where
    E: AdminEntity + Serialize + 'static,
{
    let form: AdminForm<E> = AdminForm::load(state.store.clone()).await?;
    success(form.into_items())
}

/// POST /api/admin/{collection} - Validate and store a new entity.
pub async fn admin_create<E>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(draft): Json<E::Draft>,
) -> ApiResult<E>
where
    E: AdminEntity + Serialize + 'static,
    E::Draft: DeserializeOwned + 'static,
{
    let mut form: AdminForm<E> = AdminForm::new(state.store.clone(), Vec::new());
    let created = form.add(draft).await?;
    tracing::info!(
        admin = %session.identifier,
        collection = E::COLLECTION,
        id = %created.id(),
        "Entity created"
    );
    success(created)
}

/// DELETE /api/admin/{collection}/{id}?confirm=true - Remove an entity.
/// Without `confirm=true` nothing is sent to the store.
pub async fn admin_delete<E>(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<()>
where
    E: AdminEntity + Serialize + 'static,
{
    let mut form: AdminForm<E> = AdminForm::new(state.store.clone(), Vec::new());
    match form.remove(&id, &query.confirm).await? {
        Removal::Removed => {
            tracing::info!(
                admin = %session.identifier,
                collection = E::COLLECTION,
                id = %id,
                "Entity deleted"
            );
            success(())
        }
        Removal::Declined => Err(AppError::ConfirmationRequired(
            "Deletion must be confirmed with confirm=true".to_string(),
        )),
    }
}
