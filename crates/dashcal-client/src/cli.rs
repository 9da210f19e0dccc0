//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// dashcal - Your calendar as a plain agenda
#[derive(Debug, Parser)]
#[command(name = "dashcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "DASHCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Maximum number of events to display
    #[arg(long)]
    pub limit: Option<usize>,

    /// Days before now to keep occurrences
    #[arg(long)]
    pub lookbehind_days: Option<u32>,

    /// Days after now to expand recurring events
    #[arg(long)]
    pub lookahead_days: Option<u32>,

    /// Calendar URL (http/https) or path to a local .ics file
    #[arg(env = "DASHCAL_SOURCE")]
    pub source: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_agenda_flags() {
        let cli = Cli::try_parse_from([
            "dashcal",
            "--json",
            "--limit",
            "5",
            "--lookahead-days",
            "30",
            "https://example.com/team.ics",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.limit, Some(5));
        assert_eq!(cli.lookahead_days, Some(30));
        assert_eq!(cli.lookbehind_days, None);
        assert_eq!(cli.source.as_deref(), Some("https://example.com/team.ics"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_config_subcommand() {
        let cli = Cli::try_parse_from(["dashcal", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));
    }
}
