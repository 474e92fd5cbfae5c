use clap::Parser;
use grpc_egress::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Load .env file if it exists; must happen before any settings are read
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    run(Cli::parse())
}
