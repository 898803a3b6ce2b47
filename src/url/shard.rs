//! Per-country city catalog for location sharding
//!
//! A broad search is capped by the site's own result-count ceiling; splitting
//! it into one sub-search per major city recovers results the single search
//! would never surface. The catalog is a static lookup table; countries not
//! listed here simply fall back to the single-location path.

/// City catalog keyed by lowercase, hyphenated country name
const CITY_CATALOG: &[(&str, &[&str])] = &[
    (
        "united-states",
        &[
            "New York", "San Francisco", "Seattle", "Austin", "Boston", "Chicago", "Los Angeles",
            "Denver", "Atlanta", "Washington DC",
        ],
    ),
    (
        "united-kingdom",
        &[
            "London",
            "Manchester",
            "Edinburgh",
            "Birmingham",
            "Bristol",
            "Leeds",
            "Cambridge",
        ],
    ),
    (
        "germany",
        &[
            "Berlin",
            "Munich",
            "Hamburg",
            "Frankfurt",
            "Cologne",
            "Stuttgart",
        ],
    ),
    (
        "france",
        &["Paris", "Lyon", "Toulouse", "Bordeaux", "Nantes", "Lille"],
    ),
    (
        "canada",
        &["Toronto", "Vancouver", "Montreal", "Ottawa", "Calgary"],
    ),
    (
        "australia",
        &["Sydney", "Melbourne", "Brisbane", "Perth", "Adelaide"],
    ),
    (
        "netherlands",
        &["Amsterdam", "Rotterdam", "The Hague", "Utrecht", "Eindhoven"],
    ),
    (
        "india",
        &[
            "Bangalore",
            "Mumbai",
            "Delhi",
            "Hyderabad",
            "Pune",
            "Chennai",
        ],
    ),
];

/// One per-city sub-search of a broader search
#[derive(Debug, Clone, PartialEq)]
pub struct LocationShard {
    /// Human-readable label for logging ("rust engineer @ Berlin")
    pub label: String,
    /// The location string the shard searches in
    pub location: String,
}

/// Looks up the city list for a country key
///
/// The key is matched case-insensitively with spaces treated as hyphens,
/// so "United States" and "united-states" both resolve.
pub fn cities_for(country: &str) -> Option<&'static [&'static str]> {
    let normalized = country.trim().to_lowercase().replace(' ', "-");

    CITY_CATALOG
        .iter()
        .find(|(key, _)| *key == normalized)
        .map(|(_, cities)| *cities)
}

/// Splits a keyword search into one shard per catalog city
///
/// Returns None when no catalog exists for `country`; the caller then uses
/// the single-location path instead.
pub fn shard_by_location(keywords: &str, country: &str) -> Option<Vec<LocationShard>> {
    let cities = cities_for(country)?;

    Some(
        cities
            .iter()
            .map(|city| LocationShard {
                label: format!("{} @ {}", keywords, city),
                location: (*city).to_string(),
            })
            .collect(),
    )
}
