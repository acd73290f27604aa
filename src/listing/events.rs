//! Event filtering and upcoming/past ordering.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::UnknownFilter;
use crate::models::Event;

/// Which events the events page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Upcoming,
    Past,
}

impl FromStr for EventFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(EventFilter::All),
            "upcoming" => Ok(EventFilter::Upcoming),
            "past" => Ok(EventFilter::Past),
            other => Err(UnknownFilter {
                what: "event",
                value: other.to_string(),
            }),
        }
    }
}

/// Position of an event relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Past,
}

impl EventStatus {
    /// An event happening exactly now still counts as upcoming.
    pub fn of(date: NaiveDateTime, now: NaiveDateTime) -> Self {
        if date >= now {
            EventStatus::Upcoming
        } else {
            EventStatus::Past
        }
    }
}

/// Apply the page filter. `All` is the identity; the other modes drop
/// events whose date cannot be parsed.
pub fn filter_events(events: &[Event], mode: EventFilter, now: NaiveDateTime) -> Vec<Event> {
    let wanted = match mode {
        EventFilter::All => return events.to_vec(),
        EventFilter::Upcoming => EventStatus::Upcoming,
        EventFilter::Past => EventStatus::Past,
    };

    events
        .iter()
        .filter(|e| {
            e.date()
                .map(|d| EventStatus::of(d, now) == wanted)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Result of [`rank`].
#[derive(Debug, Clone, Default)]
pub struct RankedEvents {
    /// Upcoming events soonest first, then past events most recent first.
    pub events: Vec<(Event, EventStatus)>,
    /// Ids of events left out because their date did not parse.
    pub malformed: Vec<String>,
}

impl RankedEvents {
    #[cfg(test)]
    pub fn into_events(self) -> Vec<Event> {
        self.events.into_iter().map(|(e, _)| e).collect()
    }
}

/// Order events: every upcoming event before every past one, upcoming
/// ascending by date, past descending. Equal dates keep their input order.
pub fn rank(events: Vec<Event>, now: NaiveDateTime) -> RankedEvents {
    let mut malformed = Vec::new();
    let mut dated: Vec<(NaiveDateTime, Event)> = Vec::with_capacity(events.len());

    for event in events {
        match event.date() {
            Ok(date) => dated.push((date, event)),
            Err(e) => {
                tracing::warn!(id = %event.id, "Event left out of listing: {}", e);
                malformed.push(event.id);
            }
        }
    }

    dated.sort_by(|(a, _), (b, _)| compare_dates(*a, *b, now));

    RankedEvents {
        events: dated
            .into_iter()
            .map(|(date, event)| (event, EventStatus::of(date, now)))
            .collect(),
        malformed,
    }
}

fn compare_dates(a: NaiveDateTime, b: NaiveDateTime, now: NaiveDateTime) -> Ordering {
    match (EventStatus::of(a, now), EventStatus::of(b, now)) {
        (EventStatus::Upcoming, EventStatus::Upcoming) => a.cmp(&b),
        (EventStatus::Past, EventStatus::Past) => b.cmp(&a),
        (EventStatus::Upcoming, EventStatus::Past) => Ordering::Less,
        (EventStatus::Past, EventStatus::Upcoming) => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_calendar_date;
    use chrono::Utc;

    fn event(id: &str, date: &str) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            event_date: date.to_string(),
            location: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_calendar_date(s).unwrap()
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_rank_mixed_scenario() {
        let events = vec![
            event("A", "2025-01-10"),
            event("B", "2024-06-01"),
            event("C", "2025-03-01"),
        ];
        let ranked = rank(events, at("2025-02-01")).into_events();
        assert_eq!(ids(&ranked), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_rank_empty() {
        let ranked = rank(Vec::new(), at("2025-02-01"));
        assert!(ranked.events.is_empty());
        assert!(ranked.malformed.is_empty());
    }

    #[test]
    fn test_rank_all_future_is_ascending() {
        let events = vec![
            event("late", "2026-05-01"),
            event("soon", "2026-01-02"),
            event("mid", "2026-03-01T10:00"),
        ];
        let ranked = rank(events, at("2026-01-01"));
        let dates: Vec<_> = ranked.events.iter().map(|(e, _)| e.date().unwrap()).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        assert!(ranked
            .events
            .iter()
            .all(|(_, s)| *s == EventStatus::Upcoming));
    }

    #[test]
    fn test_rank_all_past_is_descending() {
        let events = vec![
            event("old", "2019-05-01"),
            event("recent", "2024-12-20"),
            event("older", "2015-01-01"),
        ];
        let ranked = rank(events, at("2025-01-01")).into_events();
        assert_eq!(ids(&ranked), vec!["recent", "old", "older"]);
    }

    #[test]
    fn test_rank_equal_dates_keep_input_order() {
        let events = vec![
            event("p1", "2020-01-01"),
            event("f1", "2030-01-01"),
            event("p2", "2020-01-01"),
            event("f2", "2030-01-01"),
        ];
        let ranked = rank(events, at("2025-01-01")).into_events();
        assert_eq!(ids(&ranked), vec!["f1", "f2", "p1", "p2"]);
    }

    #[test]
    fn test_rank_is_a_permutation() {
        let events = vec![
            event("a", "2025-01-01"),
            event("b", "2023-01-01"),
            event("c", "2027-01-01"),
            event("d", "2025-01-01"),
        ];
        let mut before: Vec<_> = events.iter().map(|e| e.id.clone()).collect();
        let mut after: Vec<_> = rank(events, at("2025-01-01"))
            .into_events()
            .into_iter()
            .map(|e| e.id)
            .collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_event_at_now_is_upcoming() {
        let now = at("2025-02-01T12:00");
        assert_eq!(EventStatus::of(now, now), EventStatus::Upcoming);
    }

    #[test]
    fn test_malformed_dates_fail_closed() {
        let events = vec![event("ok", "2030-01-01"), event("bad", "tomorrow-ish")];
        let now = at("2025-01-01");

        let ranked = rank(events.clone(), now);
        assert_eq!(ranked.malformed, vec!["bad".to_string()]);
        assert_eq!(ranked.events.len(), 1);

        assert_eq!(ids(&filter_events(&events, EventFilter::Upcoming, now)), vec!["ok"]);
        assert!(filter_events(&events, EventFilter::Past, now).is_empty());
    }

    #[test]
    fn test_filter_modes() {
        let events = vec![event("past", "2024-01-01"), event("next", "2026-01-01")];
        let now = at("2025-01-01");

        assert_eq!(filter_events(&events, EventFilter::All, now), events);
        assert_eq!(ids(&filter_events(&events, EventFilter::Upcoming, now)), vec!["next"]);
        assert_eq!(ids(&filter_events(&events, EventFilter::Past, now)), vec!["past"]);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("upcoming".parse::<EventFilter>(), Ok(EventFilter::Upcoming));
        assert_eq!("".parse::<EventFilter>(), Ok(EventFilter::All));
        assert!("later".parse::<EventFilter>().is_err());
    }
}
