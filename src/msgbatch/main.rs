//! # msgbatch CLI
//!
//! The binary is intentionally thin: the interactive client lives in `cli/`,
//! while this file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (src/msgbatch/cli/)                              │
//! │  - clap flags and logging setup (setup.rs)                  │
//! │  - Menu loop and handlers (menu.rs)                         │
//! │  - Prompt abstraction over inquire (prompt.rs)              │
//! │  - Tables and messages (render.rs, styles.rs)               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (msgbatch::api)                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors inside the menu are rendered and the loop continues. Only failures
//! before the loop starts (missing API key, bad configuration) reach `main`
//! and exit with status 1.

mod cli;

use colored::Colorize;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
