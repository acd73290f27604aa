//! Admin form controllers.
//!
//! Each controller owns a local copy of one collection. Writes always go to
//! the store first; the local list is patched only after the store confirms,
//! so a failed write leaves it exactly as it was. Nothing is re-fetched
//! after a write and nothing is retried.

use std::sync::Arc;

use serde::Serialize;

use crate::db::{load_collection, ContentStore, Created};
use crate::errors::{AdminError, DataFetchError, OperationError, StoreError, ValidationError};
use crate::models::{
    Event, EventDraft, Fields, FromDocument, GalleryDraft, GalleryItem, Graduate, GraduateDraft,
    HomeContent, NewEvent, NewGalleryItem, NewGraduate, HOME_DOCUMENT_ID,
};

/// An entity the admin panel can add and remove.
pub trait AdminEntity: FromDocument + Clone + Send + Sync {
    /// Raw form input.
    type Draft: Send;
    /// Validated fields as written to the store.
    type New: Serialize + Send;

    fn validate(draft: Self::Draft) -> Result<Self::New, ValidationError>;

    fn assemble(new: Self::New, created: Created) -> Self;

    fn id(&self) -> &str;

    /// Order used by the admin lists.
    fn admin_order(_items: &mut [Self]) {}
}

impl AdminEntity for Event {
    type Draft = EventDraft;
    type New = NewEvent;

    fn validate(draft: EventDraft) -> Result<NewEvent, ValidationError> {
        draft.validate()
    }

    fn assemble(new: NewEvent, created: Created) -> Self {
        new.into_event(created.id, created.created_at)
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// Latest event date first; events with unreadable dates sink.
    fn admin_order(items: &mut [Self]) {
        items.sort_by_key(|e| std::cmp::Reverse(e.date().ok()));
    }
}

impl AdminEntity for Graduate {
    type Draft = GraduateDraft;
    type New = NewGraduate;

    fn validate(draft: GraduateDraft) -> Result<NewGraduate, ValidationError> {
        draft.validate()
    }

    fn assemble(new: NewGraduate, created: Created) -> Self {
        new.into_graduate(created.id, created.created_at)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn admin_order(items: &mut [Self]) {
        items.sort_by_key(|g| std::cmp::Reverse(g.year));
    }
}

impl AdminEntity for GalleryItem {
    type Draft = GalleryDraft;
    type New = NewGalleryItem;

    fn validate(draft: GalleryDraft) -> Result<NewGalleryItem, ValidationError> {
        draft.validate()
    }

    fn assemble(new: NewGalleryItem, created: Created) -> Self {
        new.into_item(created.id, created.created_at)
    }

    fn id(&self) -> &str {
        &self.id
    }

    /// Newest uploads first.
    fn admin_order(items: &mut [Self]) {
        items.sort_by_key(|i| std::cmp::Reverse(i.created_at));
    }
}

/// Guard asked before a destructive action is dispatched.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A pre-recorded answer, e.g. an explicit `confirm=true` on a request.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Outcome of [`AdminForm::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// The confirmation guard said no; nothing was sent to the store.
    Declined,
}

/// Add/remove controller for one collection.
pub struct AdminForm<E: AdminEntity> {
    store: Arc<dyn ContentStore>,
    items: Vec<E>,
}

impl<E: AdminEntity> AdminForm<E> {
    pub fn new(store: Arc<dyn ContentStore>, items: Vec<E>) -> Self {
        Self { store, items }
    }

    /// Load the collection in admin order.
    pub async fn load(store: Arc<dyn ContentStore>) -> Result<Self, DataFetchError> {
        let mut items: Vec<E> = load_collection(store.as_ref()).await?;
        E::admin_order(&mut items);
        Ok(Self { store, items })
    }

    #[cfg(test)]
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_items(self) -> Vec<E> {
        self.items
    }

    /// Validate, write, then prepend the stored entity to the local list.
    pub async fn add(&mut self, draft: E::Draft) -> Result<E, AdminError> {
        let new = E::validate(draft)?;

        let fields =
            to_fields(&new).map_err(|source| operation_error("create", E::COLLECTION, source))?;
        let created = self
            .store
            .create_document(E::COLLECTION, fields)
            .await
            .map_err(|source| operation_error("create", E::COLLECTION, source))?;

        let entity = E::assemble(new, created);
        self.items.insert(0, entity.clone());
        tracing::info!(
            collection = E::COLLECTION,
            id = %entity.id(),
            "Admin added document"
        );
        Ok(entity)
    }

    /// Ask `confirm`, delete, then drop the entity from the local list.
    pub async fn remove<C: Confirm + ?Sized>(
        &mut self,
        id: &str,
        confirm: &C,
    ) -> Result<Removal, AdminError> {
        let prompt = format!("Remove {} from {}?", id, E::COLLECTION);
        if !confirm.confirm(&prompt) {
            return Ok(Removal::Declined);
        }

        self.store
            .delete_document(E::COLLECTION, id)
            .await
            .map_err(|source| operation_error("delete", E::COLLECTION, source))?;

        self.items.retain(|item| item.id() != id);
        tracing::info!(collection = E::COLLECTION, id, "Admin removed document");
        Ok(Removal::Removed)
    }
}

/// Replace the home page singleton.
pub async fn save_home(
    store: &dyn ContentStore,
    content: HomeContent,
) -> Result<HomeContent, AdminError> {
    let content = content.validate()?;

    let fields = to_fields(&content)
        .map_err(|source| operation_error("upsert", HomeContent::COLLECTION, source))?;
    store
        .upsert_document(HomeContent::COLLECTION, HOME_DOCUMENT_ID, fields)
        .await
        .map_err(|source| operation_error("upsert", HomeContent::COLLECTION, source))?;

    tracing::info!("Home content saved");
    Ok(content)
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Unavailable(format!(
            "expected an object to store, got {}",
            other
        ))),
    }
}

fn operation_error(action: &'static str, collection: &str, source: StoreError) -> AdminError {
    AdminError::Operation(OperationError {
        action,
        collection: collection.to_string(),
        source,
    })
}
