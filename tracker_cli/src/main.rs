mod cli;
mod host;
mod render;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracker_client::{telemetry, CdnIdentityResolver, Page, Services, TrackerClient, TrackerConfig};

use host::TerminalVoice;

#[derive(Parser)]
#[command(author, version, about = "Browse tracked profiles, servers and comments")]
struct Args {
    /// Path to a TOML config file (defaults to the per-user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load one user's overlay, print a page and exit
    Show {
        user_id: String,
        #[arg(long, value_enum, default_value_t = PageArg::Profile)]
        page: PageArg,
        /// Keep loading comment pages until the last one
        #[arg(long)]
        all_comments: bool,
    },
    /// Open an interactive overlay session
    Browse { user_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum PageArg {
    Profile,
    Guilds,
}

impl From<PageArg> for Page {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::Profile => Page::Profile,
            PageArg::Guilds => Page::Guilds,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    let config = TrackerConfig::load(args.config.as_deref())
        .context("failed to load tracker configuration")?;
    tracing::debug!(
        api = %config.api_base_url,
        relay = %config.relay_url,
        "configuration loaded"
    );
    let client = TrackerClient::new(&config).context("failed to build tracker client")?;
    let services = Services::new(
        Arc::new(client),
        Arc::new(CdnIdentityResolver),
        Arc::new(TerminalVoice),
        tokio::runtime::Handle::current(),
    );

    match args.command {
        Command::Show {
            user_id,
            page,
            all_comments,
        } => cli::run_show(services, &user_id, page.into(), all_comments).await,
        Command::Browse { user_id } => cli::run_browse(services, &user_id).await,
    }
}
