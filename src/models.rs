use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Published,
    Draft,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Published => "published",
            EventStatus::Draft => "draft",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "published" => Ok(EventStatus::Published),
            "draft" => Ok(EventStatus::Draft),
            _ => Err(format!("unknown event status: {s}")),
        }
    }
}

/// A persisted event record. Field names serialize in camelCase so the slot
/// keeps the same JSON shape as the browser build wrote.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String, // evt-<unix millis>, never reassigned
    pub title: String,
    pub date: String,
    pub location: String,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub status: EventStatus,
    pub created_at: String,
}

/// Caller-supplied fields for a new record; the store assigns `id` and
/// `created_at`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub location: String,
    pub image: String,
    pub category: String,
    pub attendees: Option<u32>,
    pub price: Option<String>,
    pub status: EventStatus,
}

impl NewEvent {
    pub(crate) fn into_event(self, id: String, created_at: String) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            location: self.location,
            image: self.image,
            category: self.category,
            attendees: self.attendees,
            price: self.price,
            status: self.status,
            created_at,
        }
    }
}

/// Shallow partial update. `None` leaves a field untouched; for the optional
/// fields `Some(None)` clears the value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub attendees: Option<Option<u32>>,
    pub price: Option<Option<String>>,
    pub status: Option<EventStatus>,
}

impl EventPatch {
    pub fn status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, event: &mut Event) {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(image) = self.image {
            event.image = image;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(attendees) = self.attendees {
            event.attendees = attendees;
        }
        if let Some(price) = self.price {
            event.price = price;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

/// The presentable card shape shared by organizer events and the built-in
/// samples.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub date: String,
    pub location: String,
    pub image: String,
    pub category: String,
    pub attendees: Option<u32>,
    pub price: Option<String>,
}

impl From<&Event> for Listing {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: event.date.clone(),
            location: event.location.clone(),
            image: event.image.clone(),
            category: event.category.clone(),
            attendees: event.attendees,
            price: event.price.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Event {
        Event {
            id: "evt-1".into(),
            title: "Rooftop Social".into(),
            date: "Coming Soon".into(),
            location: "TBD, Pune".into(),
            image: "/assets/event-music.jpg".into(),
            category: "Music".into(),
            attendees: Some(40),
            price: Some("From ₹49".into()),
            status: EventStatus::Published,
            created_at: "2024-06-01T10:00:00+00:00".into(),
        }
    }

    #[test]
    fn serializes_with_browser_field_names() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["createdAt"], "2024-06-01T10:00:00+00:00");
        assert_eq!(json["status"], "published");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let raw = r#"{"id":"evt-9","title":"Quiz","date":"Soon","location":"Pub",
            "image":"x.jpg","category":"Social","status":"draft","createdAt":"2024-01-01T00:00:00Z"}"#;
        let event: Event = serde_json::from_str(raw).expect("parse legacy record");
        assert_eq!(event.attendees, None);
        assert_eq!(event.price, None);
        assert_eq!(event.status, EventStatus::Draft);
    }

    #[test]
    fn rejects_unknown_status() {
        let raw = r#"{"id":"evt-9","title":"Quiz","date":"Soon","location":"Pub",
            "image":"x.jpg","category":"Social","status":"archived","createdAt":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Event>(raw).is_err());
    }

    #[test]
    fn patch_overwrites_only_provided_fields() {
        let mut event = sample();
        EventPatch {
            title: Some("Rooftop Social II".into()),
            price: Some(None),
            ..EventPatch::default()
        }
        .apply_to(&mut event);

        assert_eq!(event.title, "Rooftop Social II");
        assert_eq!(event.price, None);
        assert_eq!(event.attendees, Some(40));
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.created_at, "2024-06-01T10:00:00+00:00");
    }

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!("Draft".parse::<EventStatus>(), Ok(EventStatus::Draft));
        assert!("pending".parse::<EventStatus>().is_err());
    }
}
