//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// AVL/BST trees and graph/network analyses from the command line
#[derive(Parser, Debug)]
#[command(name = "arborgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree from integer keys and print it
    Tree {
        /// Plain binary search tree instead of AVL
        #[arg(long)]
        plain: bool,
        /// One node per key; repeated keys replace the stored one
        #[arg(long)]
        unique: bool,
        /// Keys, inserted in the given order
        #[arg(required = true, allow_negative_numbers = true)]
        keys: Vec<i64>,
    },

    /// Run an analysis over a graph snapshot (JSON)
    Analyze {
        /// Snapshot file: {"nodes": [...], "edges": [...], "state": ...}
        #[arg(value_hint = ValueHint::FilePath)]
        snapshot: PathBuf,
        /// Analysis to run
        #[arg(value_enum)]
        analysis: AnalysisArg,
        /// Start node (traversals, prim) or source (shortest-path)
        #[arg(long)]
        from: Option<String>,
        /// Target node (shortest-path)
        #[arg(long)]
        to: Option<String>,
        /// Write the report to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
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

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisArg {
    Bfs,
    Dfs,
    Connected,
    Cycles,
    Bridges,
    DirectedBridges,
    Topo,
    Bipartite,
    Hamiltonian,
    ShortestPath,
    Mst,
    Prim,
    Pert,
    Cpm,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Write the template to the global config path
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
