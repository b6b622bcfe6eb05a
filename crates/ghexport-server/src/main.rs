// SPDX-License-Identifier: Apache-2.0

//! Binary entry point for the ghexport HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ghexport_core::{GitHubClientFactory, load_config};
use ghexport_server::{AppState, logging, run_http};

/// Export a local project to a new GitHub repository over HTTP.
#[derive(Debug, Parser)]
#[command(name = "ghexport-server", version, about)]
struct Args {
    /// Interface to bind (overrides `server.host`)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(long)]
    port: Option<u16>,

    /// Project directory to export (overrides `export.project_root`)
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_logging();

    let mut config = load_config()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(root) = args.root {
        config.export.project_root = root;
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let clients = Arc::new(GitHubClientFactory::new(config.github.clone()));

    run_http(&host, port, AppState::new(config, clients)).await
}
