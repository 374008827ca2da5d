use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(about = "Sync files between named environments, with backups and history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file with the environment paths (defaults to ./.env)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send files from one environment to one or more targets
    Push {
        /// Relative paths to transfer
        #[arg(required = true, num_args = 1..)]
        files: Vec<String>,

        /// Target environment (repeatable)
        #[arg(short, long = "to", required = true)]
        to: Vec<String>,

        /// Source environment
        #[arg(long, default_value = "local")]
        from: String,

        /// Skip the pre-overwrite backup
        #[arg(long)]
        no_backup: bool,

        /// Skip conflict checking and overwrite regardless of mtimes
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch files from a remote environment into the local one
    Pull {
        /// Relative paths to transfer
        #[arg(required = true, num_args = 1..)]
        files: Vec<String>,

        /// Source environment
        #[arg(long, required = true)]
        from: String,

        /// Target environment
        #[arg(long, default_value = "local")]
        to: String,

        /// Skip the pre-overwrite backup
        #[arg(long)]
        no_backup: bool,

        /// Skip conflict checking and overwrite regardless of mtimes
        #[arg(short, long)]
        force: bool,
    },

    /// Extract a backup archive into an environment
    Restore {
        /// Backup archive filename (see `backups`)
        backup: String,

        /// Target environment
        #[arg(long, required = true)]
        to: String,
    },

    /// Compare file contents between two environments
    Compare {
        /// Relative paths to compare
        #[arg(required = true, num_args = 1..)]
        files: Vec<String>,

        /// Source environment
        #[arg(long, default_value = "local")]
        from: String,

        /// Target environment
        #[arg(long, required = true)]
        to: String,
    },

    /// Preview what a transfer would block on, without transferring
    Conflicts {
        /// Relative paths to check
        #[arg(required = true, num_args = 1..)]
        files: Vec<String>,

        /// Source environment
        #[arg(long, default_value = "local")]
        from: String,

        /// Target environment
        #[arg(long, required = true)]
        to: String,
    },

    /// List files in an environment
    Ls {
        /// Environment name
        env: String,

        /// Folder within the environment
        #[arg(long, default_value = "")]
        folder: String,

        /// Recurse into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// List the configured environments
    Envs,

    /// List backup archives, newest first
    Backups,

    /// Show the operation history
    History {
        /// Maximum number of entries
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Only entries by this user
        #[arg(long)]
        user: Option<String>,

        /// Only entries with this action (push, pull, restore)
        #[arg(long)]
        action: Option<String>,
    },

    /// Show aggregate operation statistics
    Stats,
}
