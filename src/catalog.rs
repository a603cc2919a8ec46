//! The browsable catalog: organizer events first, then the built-in samples.

use crate::clock::Clock;
use crate::models::Listing;
use crate::storage::SlotStorage;
use crate::store::EventStore;

pub const MUSIC_IMAGE: &str = "/assets/event-music.jpg";
pub const CONFERENCE_IMAGE: &str = "/assets/event-conference.jpg";
pub const FOOD_IMAGE: &str = "/assets/event-food.jpg";

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    title: &str,
    date: &str,
    location: &str,
    image: &str,
    category: &str,
    attendees: u32,
    price: &str,
) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        date: date.to_string(),
        location: location.to_string(),
        image: image.to_string(),
        category: category.to_string(),
        attendees: Some(attendees),
        price: Some(price.to_string()),
    }
}

pub fn built_in_samples() -> Vec<Listing> {
    vec![
        sample(
            "1",
            "Summer Music Festival 2024",
            "July 15, 2024",
            "Central Park, New York",
            MUSIC_IMAGE,
            "Music",
            5000,
            "From $49",
        ),
        sample(
            "2",
            "Tech Innovation Conference",
            "August 22, 2024",
            "Convention Center, San Francisco",
            CONFERENCE_IMAGE,
            "Conference",
            2000,
            "From $199",
        ),
        sample(
            "3",
            "Food & Wine Tasting Festival",
            "September 10, 2024",
            "Riverside Park, Chicago",
            FOOD_IMAGE,
            "Food & Drink",
            3500,
            "From $75",
        ),
        sample(
            "4",
            "Electronic Music Night",
            "July 20, 2024",
            "Arena Stadium, Los Angeles",
            MUSIC_IMAGE,
            "Music",
            8000,
            "From $65",
        ),
        sample(
            "5",
            "Business Leadership Summit",
            "August 5, 2024",
            "Grand Hotel, Boston",
            CONFERENCE_IMAGE,
            "Conference",
            1500,
            "From $299",
        ),
        sample(
            "6",
            "Street Food Festival",
            "September 18, 2024",
            "Downtown Square, Austin",
            FOOD_IMAGE,
            "Food & Drink",
            4000,
            "From $35",
        ),
    ]
}

/// Published organizer events followed by the samples. Recomputed on every
/// call.
pub fn build_catalog<S: SlotStorage, C: Clock>(store: &EventStore<S, C>) -> Vec<Listing> {
    store
        .list_published()
        .into_iter()
        .map(Listing::from)
        .chain(built_in_samples())
        .collect()
}

/// Holds the last built catalog and rebuilds it only when the store has
/// changed since.
#[derive(Debug, Default)]
pub struct CatalogView {
    built_at: Option<u64>,
    listings: Vec<Listing>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listings<S: SlotStorage, C: Clock>(&mut self, store: &EventStore<S, C>) -> &[Listing] {
        let revision = store.revision();
        if self.built_at != Some(revision) {
            tracing::debug!(revision, "rebuilding catalog");
            self.listings = build_catalog(store);
            self.built_at = Some(revision);
        }
        &self.listings
    }

    pub fn is_stale<S: SlotStorage, C: Clock>(&self, store: &EventStore<S, C>) -> bool {
        self.built_at != Some(store.revision())
    }
}
