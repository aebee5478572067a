//! Root CLI structure for creature-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "creature-rs")]
#[command(about = "Drive skeletal creature animation and boid flocks from the command line", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Skinned object operations
    Object {
        #[command(subcommand)]
        command: crate::commands::object::ObjectCommands,
    },

    /// Flock simulation
    Flock {
        #[command(subcommand)]
        command: crate::commands::flock::FlockCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
