use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "figpaste", about = "Paste clipboard images into documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Paste the clipboard into a document, saving images under the assets directory
    Paste {
        /// Document to paste into
        document: PathBuf,

        /// Cursor byte offset (repeatable; only the first receives an image reference)
        #[arg(long = "cursor", value_name = "OFFSET")]
        cursors: Vec<usize>,

        /// Image name, skipping the interactive prompt
        #[arg(long)]
        name: Option<String>,

        /// Override the document's syntax scope (e.g. "text.html.markdown")
        #[arg(long)]
        scope: Option<String>,

        /// Assets directory created next to the document
        #[arg(long, default_value = "figs")]
        assets_dir: String,

        #[command(flatten)]
        clipboard: ClipboardArgs,

        /// Print the updated document instead of saving it
        #[arg(long)]
        stdout: bool,
    },

    /// Exit 0 if the clipboard holds an image, 1 otherwise
    Probe {
        #[command(flatten)]
        clipboard: ClipboardArgs,
    },
}

#[derive(clap::Args)]
pub struct ClipboardArgs {
    /// Clipboard tool family
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    pub backend: BackendArg,

    /// Per-invocation timeout for clipboard tools, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Auto,
    Xclip,
    WlPaste,
    Pngpaste,
}
