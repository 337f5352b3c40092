//! Error types for the workdesk application.
//!
//! This module defines the error type shared by every store, the persistence
//! adapter and the CLI.

use std::{io, path::PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the workdesk application.
#[derive(Error, Debug)]
pub enum WorkdeskError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Project was not found when performing an operation.
    #[error("Project not found: {id}")]
    ProjectNotFound { id: u64 },

    /// Timer was not found in the given project's timer list.
    #[error("Timer {timer_id} not found in project {project_id}")]
    TimerNotFound { project_id: u64, timer_id: u64 },

    /// Blog post was not found.
    #[error("Blog post not found: {id}")]
    BlogNotFound { id: u64 },

    /// Whiteboard item was not found.
    #[error("Whiteboard item not found: {id}")]
    ItemNotFound { id: u64 },

    /// Todo was not found on the given journal day.
    #[error("Todo {id} not found on {date}")]
    TodoNotFound { date: NaiveDate, id: u64 },

    /// A status string that is not one of the known project statuses.
    #[error("Invalid project status: {value} (expected not-started, in-progress or completed)")]
    InvalidStatus { value: String },

    /// A date string that is not in YYYY-MM-DD form.
    #[error("Invalid date: {value} (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    #[error("{message}")]
    EditorError { message: String },
}
