pub mod adapters;
pub mod application;
pub mod domain;
pub mod infra;

// In-memory doubles and fixtures for unit and HTTP tests
#[cfg(test)]
pub mod test_utils;

// Re-exports for shorter use statements.
pub use application::*;
pub use domain::*;
