//! Command line arguments.
mod cli;
mod parsers;

#[cfg(test)]
mod test_support;

pub use cli::{LoadforgeArgs, OutputFormat};
