//! # CLI Behavior
//!
//! This is **one possible UI client** for msgbatch. It is the only place that
//! knows about terminal I/O, exit codes and output formatting.
//!
//! Running `msgbatch` opens the main menu. There are no subcommands; the only
//! flags are `--verbose`, `--no-color`, `--help` and `--version`.
//!
//! ## Startup
//!
//! 1. Parse flags and install the `tracing` subscriber (stderr).
//! 2. Load [`BatchConfig`] from the environment and `.env`. A missing API key
//!    stops here with exit status 1.
//! 3. Build the HTTP gateway and hand it to the API facade.
//! 4. Run the menu loop until the operator quits.
//!
//! ## Module Structure
//!
//! - `setup`: clap flags and logging
//! - `menu`: session loop and handlers
//! - `prompt`: prompt abstraction over `inquire`
//! - `render`: tables and messages
//! - `styles`: terminal styling

mod menu;
mod prompt;
mod render;
pub mod setup;
mod styles;

use clap::Parser;
use menu::{Session, SessionSettings};
use msgbatch::api::BatchApi;
use msgbatch::config::BatchConfig;
use msgbatch::error::Result;
use msgbatch::gateway::http::HttpGateway;
use prompt::InquirePrompter;
use tracing::debug;

pub fn run() -> Result<()> {
    let cli = setup::Cli::parse();
    setup::init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
        console::set_colors_enabled(false);
    }
    let use_color = !cli.no_color && console::colors_enabled();

    let config = BatchConfig::from_env()?;
    debug!(base_url = %config.base_url, "configuration loaded");

    let gateway = HttpGateway::new(&config)?;
    let api = BatchApi::new(gateway);
    let settings = SessionSettings::from_config(&config, use_color);

    let mut session = Session::new(api, InquirePrompter, std::io::stdout(), settings);
    session.run()
}
