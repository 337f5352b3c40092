use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Projects with timers, a journal, a blog and a whiteboard, kept in local JSON files"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the data files (overrides the configuration)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the workdesk application
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardCommand, ProjectCommand, TimerCommand};

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "workdesk", "--data-dir", "/tmp/d", "timer", "toggle", "3", "17",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/d")));
        assert!(matches!(
            cli.command,
            Commands::Timer(TimerCommand::Toggle { project: 3, timer: 17 })
        ));
    }

    #[test]
    fn active_timer_is_optional() {
        let cli = Cli::try_parse_from(["workdesk", "project", "active", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Project(ProjectCommand::Active { id: 2, timer: None })
        ));
    }

    #[test]
    fn board_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["workdesk", "board", "move", "5", "-10", "2.5"]).unwrap();
        match cli.command {
            Commands::Board(BoardCommand::Move { id, x, y }) => {
                assert_eq!((id, x, y), (5, -10.0, 2.5));
            }
            _ => panic!("expected board move"),
        }
    }
}
