//! Trip destinations and country resolution.
//!
//! The calculator never owns location data. It asks a [`LocationDirectory`]
//! which country a cost item's destination belongs to, and items whose
//! destination cannot be resolved simply drop out of the per-country view.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tripbudget_shared::types::DestinationId;

/// A country name as supplied by reference data.
///
/// Countries are an open set, so unlike [`CostCategory`](crate::budget::CostCategory)
/// this is a plain string wrapper.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    /// Creates a country from its display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the country name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Country {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Country {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A stop on the trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    /// Destination ID.
    pub id: DestinationId,
    /// Display name (usually the city).
    pub name: String,
    /// Country the destination is in.
    pub country: Country,
    /// Arrival date, if planned.
    #[serde(default)]
    pub arrival_date: Option<NaiveDate>,
    /// Departure date, if planned.
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
}

impl Destination {
    /// Number of nights spent at this destination.
    ///
    /// Zero when either date is missing or departure is not after arrival.
    #[must_use]
    pub fn nights(&self) -> u32 {
        match (self.arrival_date, self.departure_date) {
            (Some(arrival), Some(departure)) => {
                u32::try_from((departure - arrival).num_days()).unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// Resolves a destination reference to its country.
pub trait LocationDirectory {
    /// Returns the country of `destination_id`, or `None` if it is unknown.
    fn resolve_country(&self, destination_id: &DestinationId) -> Option<&Country>;
}

impl LocationDirectory for HashMap<DestinationId, Country> {
    fn resolve_country(&self, destination_id: &DestinationId) -> Option<&Country> {
        self.get(destination_id)
    }
}

/// In-memory directory of a trip's destinations.
#[derive(Debug, Clone, Default)]
pub struct DestinationDirectory {
    destinations: HashMap<DestinationId, Destination>,
}

impl DestinationDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a destination.
    pub fn insert(&mut self, destination: Destination) {
        self.destinations.insert(destination.id, destination);
    }

    /// Looks up a destination.
    #[must_use]
    pub fn get(&self, id: &DestinationId) -> Option<&Destination> {
        self.destinations.get(id)
    }

    /// Number of destinations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    /// Returns true if the directory holds no destinations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    /// Total nights per country across all destinations.
    ///
    /// Every country with a destination appears, even with zero nights
    /// (a same-day stop).
    #[must_use]
    pub fn nights_by_country(&self) -> BTreeMap<Country, u32> {
        let mut nights: BTreeMap<Country, u32> = BTreeMap::new();
        for destination in self.destinations.values() {
            let entry = nights.entry(destination.country.clone()).or_default();
            *entry = entry.saturating_add(destination.nights());
        }
        nights
    }
}

impl LocationDirectory for DestinationDirectory {
    fn resolve_country(&self, destination_id: &DestinationId) -> Option<&Country> {
        self.destinations.get(destination_id).map(|d| &d.country)
    }
}

impl FromIterator<Destination> for DestinationDirectory {
    fn from_iter<I: IntoIterator<Item = Destination>>(iter: I) -> Self {
        Self {
            destinations: iter.into_iter().map(|d| (d.id, d)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(country: &str, arrival: Option<&str>, departure: Option<&str>) -> Destination {
        Destination {
            id: DestinationId::new(),
            name: format!("Somewhere in {country}"),
            country: Country::new(country),
            arrival_date: arrival.map(|d| d.parse().unwrap()),
            departure_date: departure.map(|d| d.parse().unwrap()),
        }
    }

    #[test]
    fn test_nights_between_dates() {
        let d = destination("Japan", Some("2026-03-01"), Some("2026-03-08"));
        assert_eq!(d.nights(), 7);
    }

    #[test]
    fn test_nights_missing_or_inverted_dates() {
        assert_eq!(destination("Japan", None, Some("2026-03-08")).nights(), 0);
        assert_eq!(destination("Japan", Some("2026-03-01"), None).nights(), 0);
        assert_eq!(
            destination("Japan", Some("2026-03-08"), Some("2026-03-01")).nights(),
            0
        );
    }

    #[test]
    fn test_resolve_country() {
        let tokyo = destination("Japan", None, None);
        let id = tokyo.id;
        let directory: DestinationDirectory = [tokyo].into_iter().collect();

        assert_eq!(directory.resolve_country(&id), Some(&Country::new("Japan")));
        assert_eq!(directory.resolve_country(&DestinationId::new()), None);
    }

    #[test]
    fn test_nights_by_country_sums_stops() {
        let directory: DestinationDirectory = [
            destination("Japan", Some("2026-03-01"), Some("2026-03-05")),
            destination("Japan", Some("2026-03-05"), Some("2026-03-08")),
            destination("Korea", Some("2026-03-08"), Some("2026-03-08")),
        ]
        .into_iter()
        .collect();

        let nights = directory.nights_by_country();
        assert_eq!(nights[&Country::new("Japan")], 7);
        assert_eq!(nights[&Country::new("Korea")], 0);
        assert_eq!(directory.len(), 3);
    }

    #[test]
    fn test_hash_map_directory() {
        let id = DestinationId::new();
        let map = HashMap::from([(id, Country::new("Peru"))]);
        assert_eq!(map.resolve_country(&id).map(Country::as_str), Some("Peru"));
    }
}
