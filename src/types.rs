//! Shared types for the workdesk application.
//!
//! This module contains the crate-wide Result alias and the CLI command
//! tree.
use std::path::PathBuf;

use clap::Subcommand;

use crate::WorkdeskError;

/// A specialized Result type for workdesk operations.
pub type Result<T> = std::result::Result<T, WorkdeskError>;

/// Available subcommands for the workdesk application
#[derive(Subcommand)]
pub enum Commands {
    /// Project tracker
    #[clap(subcommand)]
    Project(ProjectCommand),

    /// Stopwatch timers attached to projects
    #[clap(subcommand)]
    Timer(TimerCommand),

    /// Calendar journal
    #[clap(subcommand)]
    Journal(JournalCommand),

    /// Blog posts
    #[clap(subcommand)]
    Blog(BlogCommand),

    /// Whiteboard text blocks
    #[clap(subcommand)]
    Board(BoardCommand),

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a new project
    Add {
        /// Title of the project
        title: String,
    },

    /// List all projects with their active timer
    List {
        /// Only show projects with this status
        #[clap(short, long)]
        status: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Show a project and its timers
    Show {
        id: u64,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Change the title of a project
    Rename { id: u64, title: String },

    /// Set the status (not-started, in-progress, completed)
    Status { id: u64, status: String },

    /// Replace the content of a project
    Content {
        id: u64,

        /// New content, HTML
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Open the project content in an editor
    Edit { id: u64 },

    /// Delete a project and all its timers
    Delete {
        id: u64,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Choose the timer shown on the project card
    Active {
        id: u64,

        /// Timer to show; omit to clear
        timer: Option<u64>,
    },

    /// Search projects by title or content
    Find {
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum TimerCommand {
    /// Add a stopped timer to a project
    Add { project: u64, name: String },

    /// Rename a timer
    Rename {
        project: u64,
        timer: u64,
        name: String,
    },

    /// Start a stopped timer or stop a running one
    Toggle { project: u64, timer: u64 },

    /// Delete a timer
    Delete { project: u64, timer: u64 },

    /// List the timers of a project
    List { project: u64 },
}

#[derive(Subcommand)]
pub enum JournalCommand {
    /// Show a day (default today)
    Show { date: Option<String> },

    /// List the days that have entries
    Days,

    /// Replace the text of a day
    Write {
        content: String,

        /// Day to write to (YYYY-MM-DD, default today)
        #[clap(short, long)]
        date: Option<String>,
    },

    /// Add a todo to a day
    Todo {
        text: String,

        #[clap(short, long)]
        date: Option<String>,
    },

    /// Mark a todo done, or open again
    Done {
        id: u64,

        #[clap(short, long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum BlogCommand {
    /// List posts with their summaries
    List,

    /// Create a post
    New {
        /// Title of the post
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Path to a Markdown file with the body
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// Write the body in an editor
        #[clap(short, long)]
        edit: bool,
    },

    /// Change title and body of a post
    Edit {
        id: u64,

        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Path to a Markdown file with the new body
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a post
    Delete {
        id: u64,

        #[clap(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum BoardCommand {
    /// List whiteboard items
    List,

    /// Place a text block
    Add {
        #[clap(allow_hyphen_values = true)]
        x: f64,
        #[clap(allow_hyphen_values = true)]
        y: f64,

        /// Text of the block
        #[clap(short, long)]
        text: Option<String>,
    },

    /// Move a block
    Move {
        id: u64,
        #[clap(allow_hyphen_values = true)]
        x: f64,
        #[clap(allow_hyphen_values = true)]
        y: f64,
    },

    /// Change the text of a block
    Text { id: u64, text: String },

    /// Remove a block
    Remove { id: u64 },

    /// Remove every block
    Clear {
        #[clap(short, long)]
        force: bool,
    },
}
