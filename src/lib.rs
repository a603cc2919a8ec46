pub mod catalog;
mod cli;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod forms;
pub mod models;
pub mod storage;
pub mod store;
pub mod utils;

use std::path::Path;

use clock::Clock;
use config::StorageBackend;
use dashboard::DashboardStats;
use error::StoreError;
use filter::{DashboardFilter, SortKey};
use forms::NewEventForm;
use models::{Event, EventPatch, EventStatus, Listing};
use storage::{FileStorage, SlotStorage, SqliteStorage};
use store::EventStore;

pub use cli::run;

pub type DynStorage = Box<dyn SlotStorage + Send>;

pub fn open_storage(backend: StorageBackend, data_root: &Path) -> Result<DynStorage, StoreError> {
    let storage: DynStorage = match backend {
        StorageBackend::File => Box::new(FileStorage::new(utils::slots_dir(data_root))),
        StorageBackend::Sqlite => Box::new(SqliteStorage::open(&utils::database_path(data_root))?),
    };
    Ok(storage)
}

pub fn browse_events<S: SlotStorage, C: Clock>(
    store: &EventStore<S, C>,
    query: &str,
    category: &str,
    sort: Option<SortKey>,
) -> Vec<Listing> {
    let catalog = catalog::build_catalog(store);
    let mut listings = filter::filter(&catalog, query, category);
    if let Some(key) = sort {
        filter::sort_listings(&mut listings, key);
    }
    listings
}

pub fn create_event<S: SlotStorage, C: Clock>(
    store: &mut EventStore<S, C>,
    form: NewEventForm,
) -> Result<Event, String> {
    let fields = form.into_new_event()?;
    store
        .create(fields)
        .map_err(|e| format!("failed to save event: {e}"))
}

/// Returns the updated record, or `None` when `id` is unknown.
pub fn update_event<S: SlotStorage, C: Clock>(
    store: &mut EventStore<S, C>,
    id: &str,
    patch: EventPatch,
) -> Result<Option<Event>, String> {
    if let Some(title) = &patch.title {
        if title.trim().is_empty() {
            return Err("Event title cannot be empty".into());
        }
    }
    let matched = store
        .update(id, patch)
        .map_err(|e| format!("failed to save event {id}: {e}"))?;
    Ok(if matched { store.get(id).cloned() } else { None })
}

pub fn publish_event<S: SlotStorage, C: Clock>(
    store: &mut EventStore<S, C>,
    id: &str,
) -> Result<Option<Event>, String> {
    update_event(store, id, EventPatch::status(EventStatus::Published))
}

pub fn unpublish_event<S: SlotStorage, C: Clock>(
    store: &mut EventStore<S, C>,
    id: &str,
) -> Result<Option<Event>, String> {
    update_event(store, id, EventPatch::status(EventStatus::Draft))
}

pub fn delete_event<S: SlotStorage, C: Clock>(
    store: &mut EventStore<S, C>,
    id: &str,
) -> Result<bool, String> {
    store
        .delete(id)
        .map_err(|e| format!("failed to delete event {id}: {e}"))
}

pub fn my_events<'a, S: SlotStorage, C: Clock>(
    store: &'a EventStore<S, C>,
    filter: &DashboardFilter,
) -> Vec<&'a Event> {
    filter.apply(store.events())
}

pub fn dashboard_stats<S: SlotStorage, C: Clock>(store: &EventStore<S, C>) -> DashboardStats {
    DashboardStats::from_events(store.events())
}
