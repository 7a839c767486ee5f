use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "msgbatch", bin_name = "msgbatch", version)]
#[command(
    about = "Draft, submit and monitor message batches",
    long_about = None,
    after_help = "Requires ANTHROPIC_API_KEY in the environment or a .env file."
)]
pub struct Cli {
    /// Debug logging on stderr
    #[arg(short, long, help_heading = "Options")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help_heading = "Options")]
    pub no_color: bool,
}

/// Logs go to stderr so they never interleave with menu output on stdout.
/// `RUST_LOG` wins unless `--verbose` is given.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("msgbatch=debug,warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_off() {
        let cli = Cli::try_parse_from(["msgbatch"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.no_color);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["msgbatch", "-v", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
    }

    #[test]
    fn rejects_subcommands() {
        assert!(Cli::try_parse_from(["msgbatch", "submit"]).is_err());
    }
}
