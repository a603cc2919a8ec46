//! The organizer's event collection and its durable mirror.
//!
//! The whole collection lives in one slot and every mutation rewrites the
//! full snapshot. Reads never touch storage after the initial load.

use std::collections::HashSet;

use chrono::SecondsFormat;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::models::{Event, EventPatch, EventStatus, NewEvent};
use crate::storage::SlotStorage;

pub const STORAGE_KEY: &str = "mapMyParty_events";

/// Store-issued ids carry this prefix so they never clash with the
/// numeric ids of the built-in sample catalog.
pub const ID_PREFIX: &str = "evt-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Created(String),
    Updated(String),
    Deleted(String),
}

type Listener = Box<dyn FnMut(&StoreChange) + Send>;

pub struct EventStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    events: Vec<Event>,
    last_issued: i64,
    revision: u64,
    listeners: Vec<Listener>,
}

impl<S: SlotStorage> EventStore<S, SystemClock> {
    pub fn open(storage: S) -> Self {
        Self::open_with_clock(storage, SystemClock)
    }
}

impl<S: SlotStorage, C: Clock> EventStore<S, C> {
    /// Loads the collection from `storage`. A missing, unreadable or
    /// malformed slot yields an empty store.
    pub fn open_with_clock(storage: S, clock: C) -> Self {
        let events = load_events(&storage);
        info!(count = events.len(), "event store opened");
        Self {
            storage,
            clock,
            events,
            last_issued: 0,
            revision: 0,
            listeners: Vec::new(),
        }
    }

    pub fn create(&mut self, fields: NewEvent) -> Result<Event, StoreError> {
        let id = self.next_id();
        let created_at = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let event = fields.into_event(id, created_at);
        self.events.insert(0, event.clone());
        info!(id = %event.id, status = %event.status, "event created");

        let persisted = self.commit(StoreChange::Created(event.id.clone()));
        persisted.map(|_| event)
    }

    /// Merges `patch` into the record with `id`. Returns `false` and leaves
    /// the collection untouched when no record matches.
    pub fn update(&mut self, id: &str, patch: EventPatch) -> Result<bool, StoreError> {
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            debug!(id, "update skipped: no such event");
            self.persist()?;
            return Ok(false);
        };
        patch.apply_to(event);
        info!(id, "event updated");
        self.commit(StoreChange::Updated(id.to_string()))?;
        Ok(true)
    }

    /// Removes the record with `id`. Returns `false` when none matched.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        if self.events.len() == before {
            debug!(id, "delete skipped: no such event");
            self.persist()?;
            return Ok(false);
        }
        info!(id, "event deleted");
        self.commit(StoreChange::Deleted(id.to_string()))?;
        Ok(true)
    }

    pub fn list_published(&self) -> Vec<&Event> {
        self.with_status(EventStatus::Published)
    }

    pub fn list_drafts(&self) -> Vec<&Event> {
        self.with_status(EventStatus::Draft)
    }

    fn with_status(&self, status: EventStatus) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|event| event.status == status)
            .collect()
    }

    /// Every record, newest first.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Incremented once per effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&StoreChange) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn next_id(&mut self) -> String {
        let mut candidate = self.clock.now().timestamp_millis().max(self.last_issued + 1);
        loop {
            let id = format!("{ID_PREFIX}{candidate}");
            if self.get(&id).is_none() {
                self.last_issued = candidate;
                return id;
            }
            candidate += 1;
        }
    }

    // The in-memory change stands even if the write fails; the next
    // successful write carries it to disk.
    fn commit(&mut self, change: StoreChange) -> Result<(), StoreError> {
        self.revision += 1;
        let persisted = self.persist();
        for listener in &mut self.listeners {
            listener(&change);
        }
        persisted
    }

    fn persist(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.events)?;
        self.storage.write(STORAGE_KEY, &payload).map_err(|err| {
            warn!("failed to persist events: {err}");
            err
        })?;
        debug!(count = self.events.len(), "event snapshot written");
        Ok(())
    }
}

fn load_events<S: SlotStorage>(storage: &S) -> Vec<Event> {
    let raw = match storage.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!("failed to read event slot, starting empty: {err}");
            return Vec::new();
        }
    };

    let events: Vec<Event> = match serde_json::from_str(&raw) {
        Ok(events) => events,
        Err(err) => {
            warn!("event slot is not valid JSON, starting empty: {err}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    events
        .into_iter()
        .filter(|event| {
            let fresh = seen.insert(event.id.clone());
            if !fresh {
                warn!(id = %event.id, "dropping duplicate event id from slot");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;

    const NOW_MILLIS: i64 = 1_718_000_000_000;

    fn clock() -> FixedClock {
        FixedClock(Utc.timestamp_millis_opt(NOW_MILLIS).unwrap())
    }

    fn new_event(title: &str, status: EventStatus) -> NewEvent {
        NewEvent {
            title: title.to_string(),
            date: "Coming Soon".to_string(),
            location: "Warehouse 9, Austin".to_string(),
            image: "cover.jpg".to_string(),
            category: "Music".to_string(),
            attendees: None,
            price: Some("Free".to_string()),
            status,
        }
    }

    fn store() -> EventStore<MemoryStorage, FixedClock> {
        EventStore::open_with_clock(MemoryStorage::new(), clock())
    }

    #[test]
    fn ids_are_unique_even_when_the_clock_stands_still() {
        let mut store = store();
        let mut ids = HashSet::new();
        for n in 0..25 {
            let event = store
                .create(new_event(&format!("Night {n}"), EventStatus::Published))
                .expect("create");
            assert!(event.id.starts_with(ID_PREFIX));
            assert!(ids.insert(event.id), "duplicate id issued");
        }
        assert_eq!(store.len(), 25);
    }

    #[test]
    fn ids_skip_values_already_on_disk() {
        let existing = format!(
            r#"[{{"id":"evt-{NOW_MILLIS}","title":"Old","date":"d","location":"l","image":"i",
                "category":"c","status":"draft","createdAt":"2024-01-01T00:00:00.000Z"}}]"#
        );
        let storage = MemoryStorage::with_slot(STORAGE_KEY, &existing);
        let mut store = EventStore::open_with_clock(storage, clock());

        let event = store
            .create(new_event("New", EventStatus::Draft))
            .expect("create");
        assert_eq!(event.id, format!("evt-{}", NOW_MILLIS + 1));
    }

    #[test]
    fn create_stamps_time_and_prepends() {
        let mut store = store();
        store
            .create(new_event("First", EventStatus::Draft))
            .expect("create");
        let second = store
            .create(new_event("Second", EventStatus::Draft))
            .expect("create");

        assert_eq!(second.created_at, "2024-06-10T06:13:20.000Z");
        assert_eq!(store.list_drafts()[0].id, second.id);
        assert_eq!(store.events()[1].title, "First");
    }

    #[test]
    fn create_surfaces_first_in_matching_list() {
        let mut store = store();
        store
            .create(new_event("Older", EventStatus::Published))
            .expect("create");
        let newest = store
            .create(new_event("Newest", EventStatus::Published))
            .expect("create");

        assert_eq!(store.list_published()[0], &newest);
        assert!(store.list_drafts().is_empty());
    }

    #[test]
    fn status_update_moves_between_lists() {
        let mut store = store();
        let event = store
            .create(new_event("Gala", EventStatus::Published))
            .expect("create");

        assert!(store
            .update(&event.id, EventPatch::status(EventStatus::Draft))
            .expect("update"));
        assert!(store.list_published().is_empty());
        assert_eq!(store.list_drafts()[0].id, event.id);

        store
            .update(&event.id, EventPatch::status(EventStatus::Published))
            .expect("update");
        assert!(store.list_drafts().is_empty());
        assert_eq!(store.list_published()[0].id, event.id);
    }

    #[test]
    fn update_keeps_id_and_created_at() {
        let mut store = store();
        let event = store
            .create(new_event("Gala", EventStatus::Draft))
            .expect("create");
        store
            .update(
                &event.id,
                EventPatch {
                    title: Some("Winter Gala".into()),
                    attendees: Some(Some(120)),
                    ..EventPatch::default()
                },
            )
            .expect("update");

        let updated = store.get(&event.id).expect("still present");
        assert_eq!(updated.title, "Winter Gala");
        assert_eq!(updated.attendees, Some(120));
        assert_eq!(updated.created_at, event.created_at);
        assert_eq!(updated.location, event.location);
    }

    #[test]
    fn delete_removes_regardless_of_status() {
        let mut store = store();
        let draft = store
            .create(new_event("Draft", EventStatus::Draft))
            .expect("create");
        let live = store
            .create(new_event("Live", EventStatus::Published))
            .expect("create");

        assert!(store.delete(&draft.id).expect("delete"));
        assert!(store.delete(&live.id).expect("delete"));
        assert!(store.list_drafts().is_empty());
        assert!(store.list_published().is_empty());
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut store = store();
        store
            .create(new_event("Keep", EventStatus::Published))
            .expect("create");
        let before = store.events().to_vec();
        let revision = store.revision();

        assert!(!store
            .update("evt-404", EventPatch::status(EventStatus::Draft))
            .expect("update"));
        assert!(!store.delete("evt-404").expect("delete"));

        assert_eq!(store.events(), before.as_slice());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn every_mutation_rewrites_the_full_snapshot() {
        let mut store = store();
        let a = store
            .create(new_event("A", EventStatus::Published))
            .expect("create");
        store
            .create(new_event("B", EventStatus::Draft))
            .expect("create");
        store.delete(&a.id).expect("delete");

        let raw = store.storage().get(STORAGE_KEY).expect("slot written");
        let persisted: Vec<Event> = serde_json::from_str(&raw).expect("valid snapshot");
        assert_eq!(persisted, store.events());
    }

    #[test]
    fn malformed_slot_loads_empty() {
        let storage = MemoryStorage::with_slot(STORAGE_KEY, "{not json");
        let store = EventStore::open_with_clock(storage, clock());
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_ids_on_disk_keep_the_first() {
        let raw = r#"[
            {"id":"evt-1","title":"One","date":"d","location":"l","image":"i","category":"c","status":"draft","createdAt":"t"},
            {"id":"evt-1","title":"Copy","date":"d","location":"l","image":"i","category":"c","status":"draft","createdAt":"t"}
        ]"#;
        let store = EventStore::open_with_clock(MemoryStorage::with_slot(STORAGE_KEY, raw), clock());
        assert_eq!(store.len(), 1);
        assert_eq!(store.events()[0].title, "One");
    }

    #[test]
    fn reopening_yields_the_same_collection() {
        let storage = MemoryStorage::new();
        let snapshot = {
            let mut store = EventStore::open_with_clock(&storage, clock());
            store
                .create(new_event("One", EventStatus::Published))
                .expect("create");
            store
                .create(new_event("Two", EventStatus::Draft))
                .expect("create");
            store.events().to_vec()
        };

        let reopened = EventStore::open_with_clock(&storage, clock());
        assert_eq!(reopened.events(), snapshot.as_slice());
    }

    #[test]
    fn listeners_hear_effective_changes_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = store();
        let sink = Arc::clone(&seen);
        store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        let event = store
            .create(new_event("Heard", EventStatus::Draft))
            .expect("create");
        store.update("missing", EventPatch::default()).expect("update");
        store
            .update(&event.id, EventPatch::status(EventStatus::Published))
            .expect("update");
        store.delete(&event.id).expect("delete");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StoreChange::Created(event.id.clone()),
                StoreChange::Updated(event.id.clone()),
                StoreChange::Deleted(event.id.clone()),
            ]
        );
        assert_eq!(store.revision(), 3);
    }
}
