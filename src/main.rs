use clap::Parser;
use tracing_subscriber::EnvFilter;

use treasurer::cli::{self, Cli, Commands};

fn init_logging(verbose: bool) {
    // Logs go to stderr so the report on stdout stays clean.
    let default = if verbose {
        "treasurer=debug"
    } else {
        "treasurer=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report(args) => cli::report::run(args),
        Commands::Init { force } => cli::init::run(force),
        Commands::Label { text } => cli::label::run(&text),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
