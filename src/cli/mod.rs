//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// imgtag - assign labels to a folder of images
#[derive(Parser, Debug)]
#[command(name = "imgtag", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.imgtag/config.json)
    #[arg(long, global = true, env = "IMGTAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON (one object per line)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start labeling a folder with a fresh set of labels
    New {
        /// Folder containing the images
        #[arg(long)]
        folder: PathBuf,

        /// Comma-separated labels, e.g. cat,dog,bird
        #[arg(long)]
        labels: String,

        /// What labeling does on disk (csv, copy, move)
        #[arg(long, default_value = "csv")]
        mode: String,

        /// Move to the next image after each toggle
        #[arg(long)]
        advance: bool,
    },

    /// Resume labeling from a previously exported table
    Open {
        /// Folder containing the images
        #[arg(long)]
        folder: PathBuf,

        /// Table exported by an earlier session
        #[arg(long)]
        table: PathBuf,

        /// What labeling does on disk (csv, copy, move)
        #[arg(long, default_value = "csv")]
        mode: String,

        /// Move to the next image after each toggle
        #[arg(long)]
        advance: bool,
    },

    /// List the images a session over this folder would see
    Scan {
        /// Folder containing the images
        #[arg(long)]
        folder: PathBuf,
    },

    /// Summarize an exported table
    Show {
        /// Table to read
        #[arg(long)]
        table: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new() {
        let cli = Cli::try_parse_from([
            "imgtag", "new", "--folder", "/data", "--labels", "cat,dog", "--mode", "copy",
            "--advance",
        ])
        .unwrap();
        match cli.command {
            Commands::New {
                folder,
                labels,
                mode,
                advance,
            } => {
                assert_eq!(folder, PathBuf::from("/data"));
                assert_eq!(labels, "cat,dog");
                assert_eq!(mode, "copy");
                assert!(advance);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_open_defaults_to_csv_mode() {
        let cli = Cli::try_parse_from([
            "imgtag", "open", "--folder", "/data", "--table", "/data/output/a.csv", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Open { mode, advance, .. } => {
                assert_eq!(mode, "csv");
                assert!(!advance);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_new_requires_labels() {
        assert!(Cli::try_parse_from(["imgtag", "new", "--folder", "/data"]).is_err());
    }
}
