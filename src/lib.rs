//! Personal productivity data layer
//!
//! This library keeps projects with stopwatch timers, a calendar journal,
//! blog posts and whiteboard items, each collection persisted whole to a
//! string-keyed store after every change.

mod blog;
mod cli;
mod config;
mod errors;
mod helper;
mod journal;
mod persistence;
mod project;
mod project_store;
mod time_format;
mod timer;
mod types;
mod whiteboard;

// Re-export key components
pub use blog::*;
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use journal::*;
pub use persistence::*;
pub use project::*;
pub use project_store::*;
pub use time_format::*;
pub use timer::*;
pub use types::*;
pub use whiteboard::*;
