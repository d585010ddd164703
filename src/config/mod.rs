//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! settings file (TOML) + CLI/env overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → WatchConfig (validated, immutable for the process lifetime)
//!
//! Service documents (JSON) are not settings:
//!     source/ lists and fetches them
//!     → registry/ decodes them
//!
//! On change in the document directory:
//!     watcher.rs sees a filesystem event
//!     → requests a reload from the scheduler
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; only service documents reload
//! - All fields have defaults to allow minimal settings files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::ObservabilityConfig;
pub use schema::ProbeConfig;
pub use schema::ScheduleConfig;
pub use schema::SourceConfig;
pub use schema::WatchConfig;
