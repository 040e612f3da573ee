use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::error::ScheduleError;

/// An externally committed publish slot. Fetched, never created, by this
/// tool; treated as read-only ground truth.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: String,
    pub title: String,
    pub publish_instant: DateTime<Utc>,
    pub is_published: bool,
}

pub trait ReservationSource {
    fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError>;
}

impl ReservationSource for Box<dyn ReservationSource> {
    fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError> {
        self.as_ref().fetch()
    }
}

/// Wire format of the hosting platform's listing endpoint. The listing is
/// filtered upstream to private videos with a future publish time, or videos
/// published today.
#[derive(Debug, Deserialize)]
struct ReservationListing {
    items: Vec<ReservationItem>,
}

#[derive(Debug, Deserialize)]
struct ReservationItem {
    id: String,
    #[serde(default)]
    title: String,
    scheduled_instant: String,
    #[serde(default)]
    is_published: bool,
}

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpReservationSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpReservationSource {
    pub fn new(endpoint: String) -> Result<Self, ScheduleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| ScheduleError::FetchUnavailable(err.to_string()))?;
        Ok(Self { endpoint, client })
    }
}

impl ReservationSource for HttpReservationSource {
    fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError> {
        let listing: ReservationListing = self
            .client
            .get(&self.endpoint)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| ScheduleError::FetchUnavailable(err.to_string()))?
            .json()
            .map_err(|err| ScheduleError::FetchUnavailable(err.to_string()))?;

        convert_listing(listing)
    }
}

fn convert_listing(listing: ReservationListing) -> Result<Vec<Reservation>, ScheduleError> {
    let mut reservations = Vec::with_capacity(listing.items.len());
    for item in listing.items {
        let publish_instant = DateTime::parse_from_rfc3339(&item.scheduled_instant)
            .map_err(|err| {
                ScheduleError::MalformedReservation(format!(
                    "bad scheduled_instant '{}' for {}: {err}",
                    item.scheduled_instant, item.id
                ))
            })?
            .with_timezone(&Utc);
        reservations.push(Reservation {
            id: item.id,
            title: item.title,
            publish_instant,
            is_published: item.is_published,
        });
    }
    reservations.sort_by_key(|r| r.publish_instant);
    Ok(reservations)
}

/// A fixed reservation set. Used when no external calendar is configured,
/// and for deterministic tests.
#[derive(Debug, Clone, Default)]
pub struct StaticReservationSource {
    reservations: Vec<Reservation>,
}

impl StaticReservationSource {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(reservations: Vec<Reservation>) -> Self {
        Self { reservations }
    }
}

impl ReservationSource for StaticReservationSource {
    fn fetch(&self) -> Result<Vec<Reservation>, ScheduleError> {
        Ok(self.reservations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_parsed_and_sorted() {
        let raw = r#"{
            "items": [
                {"id": "b", "title": "Later", "scheduled_instant": "2026-09-02T14:30:00Z", "is_published": false},
                {"id": "a", "title": "Sooner", "scheduled_instant": "2026-09-01T14:30:00+00:00", "is_published": true}
            ]
        }"#;
        let listing: ReservationListing = serde_json::from_str(raw).unwrap();
        let reservations = convert_listing(listing).unwrap();

        assert_eq!(reservations.len(), 2);
        assert_eq!(reservations[0].id, "a");
        assert!(reservations[0].is_published);
        assert_eq!(reservations[1].id, "b");
    }

    #[test]
    fn malformed_instant_is_reported_with_its_id() {
        let raw = r#"{"items": [{"id": "x", "scheduled_instant": "next tuesday"}]}"#;
        let listing: ReservationListing = serde_json::from_str(raw).unwrap();
        let err = convert_listing(listing).unwrap_err();
        match err {
            ScheduleError::MalformedReservation(message) => assert!(message.contains("x")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
