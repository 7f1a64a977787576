//! NOTE: Always use singular names for commands and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// Defaults to `config.toml` under the platform configuration directory
    /// (`~/.config/quill` on Linux) when it exists.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output.
    #[arg(long, default_value_t = false, global = true)]
    pub verbose: bool,

    /// Command that reads diagram source on stdin and writes a graphic to
    /// stdout, e.g. `mmdc -i - -o - -e svg`.
    ///
    /// Without it diagrams render as an error placeholder.
    #[arg(long, global = true)]
    pub diagram_command: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a Markdown file and print the resulting HTML.
    Render {
        /// File to render.
        path: PathBuf,
    },

    /// Stream a JSON-lines transcript through the pipeline, one message per
    /// frame, and print the final HTML of every region.
    Replay {
        /// Transcript with one `{"id": "...", "text": "..."}` object per line.
        path: PathBuf,

        /// Print the scroll debug log as JSON after the replay.
        #[arg(long, default_value_t = false)]
        debug_log: bool,
    },
}
