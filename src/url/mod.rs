//! Search URL construction
//!
//! Pure functions that turn (keywords, location, pagination offset, filters)
//! into fetchable search URLs, normalize user-supplied search-page URLs into
//! their paginated API-style equivalents, and shard a search by city.

mod builder;
mod shard;

pub use builder::{build_search_pages, to_canonical_fetch_form, SearchPage, PAGE_SIZE};
pub use shard::{cities_for, shard_by_location, LocationShard};
