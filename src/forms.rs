use serde::Deserialize;

use crate::catalog::MUSIC_IMAGE;
use crate::models::{EventStatus, NewEvent};

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// What the organizer's create-event flow collects before submitting.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewEventForm {
    pub title: String,
    pub categories: Vec<String>,
    pub venue_name: String,
    pub city: String,
    pub state: String,
    pub ticket_price: String,
    pub cover_image: Option<String>,
    pub draft: bool,
}

impl NewEventForm {
    /// Title and at least one category are required.
    pub fn validate(&self) -> Result<(), String> {
        let has_category = self.categories.iter().any(|c| !c.trim().is_empty());
        if self.title.trim().is_empty() || !has_category {
            return Err(REQUIRED_FIELDS_MESSAGE.to_string());
        }
        Ok(())
    }

    pub fn into_new_event(self) -> Result<NewEvent, String> {
        self.validate()?;

        let location = format!(
            "{}, {}{}",
            or_tbd(&self.venue_name),
            or_tbd(&self.city),
            match self.state.trim() {
                "" => String::new(),
                state => format!(", {state}"),
            }
        );
        let category = self
            .categories
            .iter()
            .map(|c| c.trim())
            .find(|c| !c.is_empty())
            .unwrap_or("General")
            .to_string();
        let price = match self.ticket_price.trim() {
            "" => "Free".to_string(),
            price => format!("From ₹{price}"),
        };

        Ok(NewEvent {
            title: self.title.trim().to_string(),
            date: "Coming Soon".to_string(),
            location,
            image: self
                .cover_image
                .filter(|image| !image.trim().is_empty())
                .unwrap_or_else(|| MUSIC_IMAGE.to_string()),
            category,
            attendees: None,
            price: Some(price),
            status: if self.draft {
                EventStatus::Draft
            } else {
                EventStatus::Published
            },
        })
    }
}

fn or_tbd(value: &str) -> &str {
    match value.trim() {
        "" => "TBD",
        value => value,
    }
}
