//! Configuration loading and validation
//!
//! Configuration is a TOML file with three sections: what to search for,
//! how the crawler behaves, and where output goes.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig, SearchConfig};
pub use validation::validate;
