//! Shared CLI definitions for npl-dash.
//!
//! Used by the main application and by the build script (manpage).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Dashboard tab to open on startup (or to print with `--print-view`).
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum TabArg {
    /// Run scorers, strike rates, boundaries
    #[default]
    Batting,
    /// Wicket takers, economy, bowling averages
    Bowling,
    /// Catches
    Fielding,
    /// Highest partnerships
    Partnerships,
    /// Ball-by-ball analysis of the final
    Final,
}

impl TabArg {
    /// Parse a tab name as written in the config file (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "batting" => Some(Self::Batting),
            "bowling" => Some(Self::Bowling),
            "fielding" => Some(Self::Fielding),
            "partnerships" | "partnership" => Some(Self::Partnerships),
            "final" | "final-match" | "final_match" => Some(Self::Final),
            _ => None,
        }
    }
}

/// Command-line arguments for npl-dash
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "npl-dash",
    version,
    about = "Nepal Premier League 2024 statistics dashboard in the terminal",
    long_about = "Interactive terminal dashboard over the NPL 2024 batting, bowling, fielding, \
partnership and final-match CSV records. Dataset paths are resolved relative to the data \
directory, which defaults to the current working directory."
)]
pub struct Args {
    /// Directory the dataset paths are resolved against (default: current working directory)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Start with this player selected in the batting filter (exact label)
    #[arg(long = "player", value_name = "NAME")]
    pub player: Option<String>,

    /// Tab to show on startup
    #[arg(long = "tab", value_enum)]
    pub tab: Option<TabArg>,

    /// Print the selected tab's render description as JSON and exit (no terminal UI)
    #[arg(long = "print-view", action)]
    pub print_view: bool,

    /// Enable debug mode: debug-level log file and an on-screen status line
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data (log file) and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/npl-dash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}
