use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Named location that can be used as a route endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Case-insensitive lookup of place names.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    places: Vec<Place>,
    by_name: HashMap<String, usize>,
}

impl Gazetteer {
    pub fn new(places: Vec<Place>) -> Self {
        let by_name = places
            .iter()
            .enumerate()
            .map(|(index, place)| (normalize(&place.name), index))
            .collect();
        Self { places, by_name }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn lookup(&self, name: &str) -> Option<&Place> {
        self.by_name
            .get(&normalize(name))
            .map(|&index| &self.places[index])
    }

    /// Resolve a name, failing with close matches when it is unknown.
    pub fn resolve(&self, name: &str) -> Result<Coordinate> {
        self.lookup(name)
            .map(Place::coordinate)
            .ok_or_else(|| Error::UnknownPlace {
                name: name.to_string(),
                suggestions: self.suggestions(name, 3),
            })
    }

    /// Up to `limit` known names similar to `name`, best match first.
    pub fn suggestions(&self, name: &str, limit: usize) -> Vec<String> {
        let query = normalize(name);
        let mut scored: Vec<(f64, &str)> = self
            .places
            .iter()
            .map(|place| {
                (
                    strsim::jaro_winkler(&query, &normalize(&place.name)),
                    place.name.as_str(),
                )
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
