//! Search and category filtering over catalog listings and organizer events.
//!
//! Filters never reorder their input. Sorting is a separate, stable step.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Event, EventStatus, Listing};

pub const ALL: &str = "all";

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)").expect("valid price regex"));

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

fn is_all(selector: &str) -> bool {
    let selector = selector.trim();
    selector.is_empty() || selector.eq_ignore_ascii_case(ALL)
}

/// Listings whose title or location contains `query` and whose category is
/// `category`, both case-insensitive. An empty query and a category of
/// `"all"` match everything.
pub fn filter(catalog: &[Listing], query: &str, category: &str) -> Vec<Listing> {
    let query = query.to_lowercase();
    let category = category.trim();
    let any_category = is_all(category);
    let category = category.to_lowercase();

    catalog
        .iter()
        .filter(|listing| {
            contains_ci(&listing.title, &query) || contains_ci(&listing.location, &query)
        })
        .filter(|listing| any_category || listing.category.to_lowercase() == category)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Price,
    Popularity,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "price" => Ok(SortKey::Price),
            "popularity" => Ok(SortKey::Popularity),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

/// Display dates look like `July 15, 2024`; anything else (`Coming Soon`)
/// has no calendar position.
pub fn parse_display_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%B %d, %Y").ok()
}

/// First number in a display price such as `From $49` or `From ₹1,200`.
pub fn parse_display_price(price: &str) -> Option<f64> {
    if price.trim().eq_ignore_ascii_case("free") {
        return Some(0.0);
    }
    let captures = PRICE_RE.captures(price)?;
    captures.get(1)?.as_str().replace(',', "").parse().ok()
}

// Entries without a key sort after those with one.
fn missing_last<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort: earliest date first, cheapest first, or most attendees first.
pub fn sort_listings(listings: &mut [Listing], key: SortKey) {
    match key {
        SortKey::Date => listings.sort_by(|a, b| {
            missing_last(
                parse_display_date(&a.date),
                parse_display_date(&b.date),
                |a, b| a.cmp(&b),
            )
        }),
        SortKey::Price => listings.sort_by(|a, b| {
            missing_last(
                a.price.as_deref().and_then(parse_display_price),
                b.price.as_deref().and_then(parse_display_price),
                |a, b| a.total_cmp(&b),
            )
        }),
        SortKey::Popularity => {
            listings.sort_by(|a, b| missing_last(a.attendees, b.attendees, |a, b| b.cmp(&a)))
        }
    }
}

/// The organizer dashboard's event table filter. Searches titles only and
/// matches category exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilter {
    pub query: String,
    pub status: Option<EventStatus>,
    pub category: String,
}

impl Default for DashboardFilter {
    fn default() -> Self {
        Self {
            query: String::new(),
            status: None,
            category: ALL.to_string(),
        }
    }
}

impl DashboardFilter {
    pub fn matches(&self, event: &Event) -> bool {
        let query = self.query.to_lowercase();
        let matches_search = contains_ci(&event.title, &query);
        let matches_status = self.status.map_or(true, |status| event.status == status);
        let matches_category = self.category == ALL || event.category == self.category;
        matches_search && matches_status && matches_category
    }

    pub fn apply<'a, I>(&self, events: I) -> Vec<&'a Event>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        events.into_iter().filter(|event| self.matches(event)).collect()
    }
}

/// Parses a dashboard status selector: `all`, `published` or `draft`.
pub fn parse_status_selector(selector: &str) -> Result<Option<EventStatus>, String> {
    if is_all(selector) {
        Ok(None)
    } else {
        selector.parse().map(Some)
    }
}
