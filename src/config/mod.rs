//! Test-definition loading and shared value parsers.
mod duration;
mod loader;


pub use duration::parse_duration_value;
pub use loader::load_test_definition;
