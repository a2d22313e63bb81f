//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Hierarchical selection and inclusion engine: tri-state checkbox trees over snapshot files
#[derive(Parser, Debug)]
#[command(name = "seltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Snapshot file (default: `default_snapshot` from config)
    #[arg(short = 'f', long = "file", global = true, value_hint = ValueHint::FilePath)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Selected nodes, as label paths from the root (e.g. `Group/FileA/D1`).
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Label path of a selected node (repeatable)
    #[arg(short, long = "select", value_name = "PATH")]
    pub select: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the tree with checkbox states and item counts
    Tree,

    /// List the items a selection stands for
    Resolve {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Order sibling items by source position (last first)
        #[arg(long)]
        by_position: bool,
    },

    /// Count the items covered by a selection
    Count {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Show the checkbox state of one node
    Status {
        /// Label path of the node
        path: String,
    },

    /// List the elements under a selection confined to one tool
    Elements {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Check the selected items (all items if none selected) and save
    Include {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Uncheck the selected items (all items if none selected) and save
    Exclude {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Toggle the selected items (all items if none selected) and save
    Toggle {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
