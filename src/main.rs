use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio_util::sync::CancellationToken;

use plcreator::{
    cli::{self, CreateOptions, Target},
    config, error, logs, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a playlist from a file with one song per line
    Create(CreateArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Streaming service to create the playlist on
    #[clap(value_enum)]
    pub target: Target,

    /// Text file with one song query per line
    pub file: PathBuf,

    /// Playlist name (defaults to the file name without extension)
    #[clap(long)]
    pub name: Option<String>,

    /// Append a random suffix to the playlist name
    #[clap(long)]
    pub random_suffix: bool,

    /// Maximum number of searches running at the same time
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Don't ask for confirmation before creating the playlist
    #[clap(long, short)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let log_path = match logs::init() {
        Ok(path) => Some(path),
        Err(e) => {
            warning!("Logging disabled. Err: {}", e);
            None
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let result = match cli.command {
        Command::Create(args) => {
            let opts = CreateOptions {
                target: args.target,
                file: args.file,
                name: args.name,
                random_suffix: args.random_suffix,
                concurrency: args.concurrency,
                yes: args.yes,
            };
            cli::create(opts, cancel).await
        }
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        if e.is_provider_failure() {
            if let Some(path) = log_path {
                warning!("Details were written to {}", path.display());
            }
        }
        error!("{}", e);
    }
}
