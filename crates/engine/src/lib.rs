//! Everdice Engine library.
//!
//! All server-side code for the Everdice tabletop backend.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over repository ports
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// Shared helpers for unit tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
