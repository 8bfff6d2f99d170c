mod assets;
mod cli;
mod clipboard;
mod host;
mod paste;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cli::{BackendArg, ClipboardArgs, Cli, Command};
use tracing_subscriber::EnvFilter;

use assets::AssetLayout;
use clipboard::{Backend, ToolClipboard};
use host::{DocumentBuffer, FixedPrompt, TerminalPrompt};
use paste::{ImageSource, PasteError, PasteOutcome};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Paste {
            document,
            cursors,
            name,
            scope,
            assets_dir,
            clipboard,
            stdout,
        } => {
            let request = PasteRequest {
                document,
                cursors,
                name,
                scope,
                layout: AssetLayout {
                    dir_name: assets_dir,
                    ..AssetLayout::default()
                },
                clipboard: tool_clipboard(&clipboard),
                stdout,
            };
            if let Err(e) = run_paste(request).await {
                tracing::error!(error = %e, "paste failed");
                eprintln!("figpaste paste: {e}");
                std::process::exit(1);
            }
        }
        Command::Probe { clipboard } => {
            let clipboard = tool_clipboard(&clipboard);
            let has_image = clipboard.probe().await;
            tracing::info!(backend = ?clipboard.backend(), has_image, "probe");
            std::process::exit(if has_image { 0 } else { 1 });
        }
    }
}

struct PasteRequest {
    document: PathBuf,
    cursors: Vec<usize>,
    name: Option<String>,
    scope: Option<String>,
    layout: AssetLayout,
    clipboard: ToolClipboard,
    stdout: bool,
}

fn tool_clipboard(args: &ClipboardArgs) -> ToolClipboard {
    let backend = match args.backend {
        BackendArg::Auto => Backend::detect(),
        BackendArg::Xclip => Backend::Xclip,
        BackendArg::WlPaste => Backend::WlPaste,
        BackendArg::Pngpaste => Backend::Pngpaste,
    };
    ToolClipboard::new(backend, Duration::from_millis(args.timeout_ms))
}

/// Paste into a file-backed document, then save it or print it.
async fn run_paste(req: PasteRequest) -> Result<(), PasteError> {
    let mut buffer = DocumentBuffer::open(&req.document, &req.cursors, req.scope).await?;

    let outcome = match req.name {
        Some(name) => {
            let mut prompt = FixedPrompt::new(name);
            paste::execute(&mut buffer, &req.clipboard, &mut prompt, &req.layout).await?
        }
        None => {
            paste::execute(&mut buffer, &req.clipboard, &mut TerminalPrompt, &req.layout).await?
        }
    };

    if req.stdout {
        let mut out = io::stdout().lock();
        out.write_all(buffer.text().as_bytes())
            .and_then(|()| out.flush())
            .map_err(|source| host::HostError::Io {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
    } else if buffer.is_dirty() {
        buffer.save().await?;
    }

    match outcome {
        PasteOutcome::PastedText => eprintln!("Pasted text"),
        PasteOutcome::Cancelled => eprintln!("Cancelled"),
        PasteOutcome::Inserted(image) => {
            tracing::info!(relative_path = %image.relative_path, "image pasted");
            if let ImageSource::CopiedPath(from) = &image.source {
                eprintln!("Copied {}", from.display());
            }
            eprintln!(
                "Saved {} -> inserted {}",
                image.absolute_path.display(),
                image.payload
            );
        }
    }

    Ok(())
}
