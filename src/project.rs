//! Project records and their stored form.
//!
//! Records written by older versions may lack `status` or `content`. They
//! are read through [`StoredProject`], which fills every optional field in
//! one place, and then converted to the canonical [`Project`].
use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::WorkdeskError;

/// Progress of a project. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::NotStarted,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not-started",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = WorkdeskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase().replace(['_', ' '], "-");
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| WorkdeskError::InvalidStatus {
                value: value.to_string(),
            })
    }
}

/// Represents a single project in the tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier, assigned as one past the highest existing id
    pub id: u64,
    /// Project title
    pub title: String,
    /// Day the project was created
    pub create_date: NaiveDate,
    /// Rich-text body (HTML)
    pub content: String,
    /// Timer shown on the project card, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_timer_id: Option<u64>,
    /// Progress of the project
    pub status: ProjectStatus,
}

impl Project {
    /// Creates a new, empty project
    pub fn new(id: u64, title: String, create_date: NaiveDate) -> Self {
        Project {
            id,
            title,
            create_date,
            content: String::new(),
            active_timer_id: None,
            status: ProjectStatus::NotStarted,
        }
    }
}

/// A project record as found in storage, before defaults are applied
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProject {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub active_timer_id: Option<u64>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
}

impl StoredProject {
    /// Maps the stored record to a [`Project`], using `fallback_date` when
    /// the creation date is missing or unreadable.
    pub fn into_project(self, fallback_date: NaiveDate) -> Project {
        let create_date = match self.create_date.as_deref() {
            Some(raw) => parse_stored_date(raw).unwrap_or_else(|| {
                warn!(
                    "Project {} has unreadable createDate {:?}, using {}",
                    self.id, raw, fallback_date
                );
                fallback_date
            }),
            None => {
                warn!("Project {} has no createDate, using {}", self.id, fallback_date);
                fallback_date
            }
        };

        Project {
            id: self.id,
            title: self.title,
            create_date,
            content: self.content.unwrap_or_default(),
            active_timer_id: self.active_timer_id,
            status: self.status.unwrap_or_default(),
        }
    }
}

/// Accepts plain dates as well as full ISO timestamps
fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
