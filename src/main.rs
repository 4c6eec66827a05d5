//! Enjambre CLI — HAR traces in, Locust scenarios out.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "enjambre",
    version,
    about = "Rust-native load-test script generation — HAR traces in, Locust scenarios out"
)]
struct Cli {
    #[command(subcommand)]
    command: enjambre::cli::Commands,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = enjambre::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
