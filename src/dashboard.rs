use serde::Serialize;

use crate::models::{Event, EventStatus};

/// Headline numbers for the organizer dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_events: usize,
    pub published: usize,
    pub drafts: usize,
    pub total_attendees: u64,
}

impl DashboardStats {
    pub fn from_events(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |mut stats, event| {
            stats.total_events += 1;
            match event.status {
                EventStatus::Published => stats.published += 1,
                EventStatus::Draft => stats.drafts += 1,
            }
            stats.total_attendees += u64::from(event.attendees.unwrap_or(0));
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: EventStatus, attendees: Option<u32>) -> Event {
        Event {
            id: format!("evt-{attendees:?}"),
            title: "Show".into(),
            date: "Coming Soon".into(),
            location: "TBD, TBD".into(),
            image: String::new(),
            category: "Music".into(),
            attendees,
            price: None,
            status,
            created_at: "2024-06-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn counts_by_status_and_sums_known_attendees() {
        let stats = DashboardStats::from_events(&[
            event(EventStatus::Published, Some(300)),
            event(EventStatus::Draft, None),
            event(EventStatus::Published, Some(u32::MAX)),
        ]);
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.published, 2);
        assert_eq!(stats.drafts, 1);
        assert_eq!(stats.total_attendees, 300 + u64::from(u32::MAX));
    }

    #[test]
    fn empty_dashboard_is_zeroed() {
        assert_eq!(DashboardStats::from_events(&[]), DashboardStats::default());
    }
}
