//! CLI - Command Line Interface for anitui
//!
//! Every TUI action is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Search the catalog
//! anitui search "fullmetal" --json
//!
//! # Episode listings and playable sources
//! anitui episodes "One Piece" --mal-id 21
//! anitui resolve "One Piece" --mal-id 21 --episode 1 --dub
//!
//! # Run the local API proxy
//! anitui serve --port 3001
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// No episodes available for the title
    NoEpisodes = 4,
    /// No playable source found
    NoSource = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// anitui - Terminal browser for anime discovery and streaming
///
/// Run without arguments to launch interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "anitui",
    version,
    author = "Gorka & Hermes",
    about = "Terminal browser for anime discovery and streaming",
    long_about = "A terminal interface for browsing seasonal and trending anime, \
                  reading details, and resolving playable episode streams.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  anitui                              Launch interactive TUI\n\
                  anitui search \"cowboy bebop\"        Search the catalog\n\
                  anitui resolve \"One Piece\" -e 1     Resolve episode 1 stream\n\
                  anitui serve --port 3001            Run the local API proxy"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search the anime catalog
    #[command(visible_alias = "s")]
    Search(SearchCmd),

    /// Get currently-airing trending anime
    #[command(visible_alias = "tr")]
    Trending(TrendingCmd),

    /// Get all-time popular TV anime
    #[command(visible_alias = "pop")]
    Popular(TrendingCmd),

    /// Get the latest seasonal anime
    #[command(visible_alias = "new")]
    Latest(TrendingCmd),

    /// Get details for a title by MAL id
    #[command(visible_alias = "i")]
    Info(InfoCmd),

    /// List playable episodes for a title
    #[command(visible_alias = "ep")]
    Episodes(EpisodesCmd),

    /// Resolve a playable stream URL for an episode
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),

    /// Resolve an episode and hand it to a local player
    #[command(visible_alias = "w")]
    Watch(WatchCmd),

    /// Run the local API proxy server
    Serve(ServeCmd),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Search the anime catalog by query
#[derive(Args, Debug)]
pub struct SearchCmd {
    /// Search query (title, keywords)
    #[arg(required = true)]
    pub query: String,

    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "24")]
    pub limit: usize,
}

/// List-style commands (trending, popular, latest)
#[derive(Args, Debug)]
pub struct TrendingCmd {
    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "18")]
    pub limit: usize,
}

/// Get detailed information about a title
#[derive(Args, Debug)]
pub struct InfoCmd {
    /// MyAnimeList numeric id
    #[arg(required = true)]
    pub mal_id: u64,
}

/// List playable episodes for a title
#[derive(Args, Debug)]
pub struct EpisodesCmd {
    /// Title to look up on the streaming side
    #[arg(required = true)]
    pub title: String,

    /// MyAnimeList id for cross-referencing search hits
    #[arg(long, short = 'm')]
    pub mal_id: Option<u64>,

    /// Only list dubbed episodes
    #[arg(long)]
    pub dub: bool,
}

/// Resolve a playable stream for a single episode
#[derive(Args, Debug)]
pub struct ResolveCmd {
    /// Title to look up on the streaming side
    #[arg(required = true)]
    pub title: String,

    /// MyAnimeList id for cross-referencing search hits
    #[arg(long, short = 'm')]
    pub mal_id: Option<u64>,

    /// Episode number
    #[arg(long, short = 'e', default_value = "1")]
    pub episode: u32,

    /// Prefer the dubbed variant
    #[arg(long)]
    pub dub: bool,

    /// Mirror server to pull sources from
    #[arg(long, short = 's')]
    pub server: Option<String>,
}

/// Resolve an episode and play it locally
#[derive(Args, Debug)]
pub struct WatchCmd {
    #[command(flatten)]
    pub resolve: ResolveCmd,

    /// Player to use (mpv or vlc)
    #[arg(long, short = 'p', value_enum, default_value = "mpv")]
    pub player: PlayerChoice,
}

/// Local player selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerChoice {
    /// mpv media player (default)
    #[default]
    Mpv,
    /// VLC media player
    Vlc,
}

/// Run the local API proxy server
#[derive(Args, Debug)]
pub struct ServeCmd {
    /// Port to listen on
    #[arg(long, short = 'p', default_value = "3001")]
    pub port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            // For non-JSON, caller should handle formatting
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
