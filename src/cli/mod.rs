//! # Command Line Interface
//!
//! Renders the outbound listener for inspection or static delivery to Envoy.

pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::{ObservabilityConfig, OutboundSettings};
use crate::observability::{init_logging, log_settings_info};
use crate::xds::{build_routes, listener_resource, OutboundBuilder};
use output::{render, render_route_table, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "grpc-egress")]
#[command(about = "Build the outbound gRPC listener for the local Envoy proxy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (YAML, TOML or JSON)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Outbound port override
    #[arg(long, global = true)]
    pub port: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the outbound listener descriptor
    Render {
        /// Output format (json or yaml)
        #[arg(short, long, default_value = "yaml")]
        output: String,
    },

    /// Print the expanded outbound routes in evaluation order
    Routes {
        /// Output format (json, yaml or table)
        #[arg(short, long, default_value = "table")]
        output: String,
    },

    /// Write the protobuf-encoded listener resource to a file
    Encode {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Load settings, applying the command line port override
pub fn load_settings(cli: &Cli) -> Result<OutboundSettings> {
    let mut settings = OutboundSettings::load(cli.config.as_deref())
        .context("Failed to load outbound settings")?;
    if let Some(port) = &cli.port {
        settings.outbound_port = port.clone();
    }
    Ok(settings)
}

pub fn run(cli: Cli) -> Result<()> {
    let mut observability = ObservabilityConfig::from_env();
    if cli.verbose {
        observability.log_level = "debug".to_string();
    }
    init_logging(&observability)?;

    execute(&cli)
}

/// Run the selected command against the loaded settings
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    log_settings_info(&settings);

    let builder =
        OutboundBuilder::from_settings(&settings).context("Invalid outbound route table")?;

    match &cli.command {
        Commands::Render { output } => {
            let format: OutputFormat = output.parse()?;
            let listener = builder
                .build_outbound_listener(&settings.outbound_port)
                .context("Failed to build outbound listener")?;
            println!("{}", render(&listener, format)?);
        }
        Commands::Routes { output } => {
            let routes = build_routes(builder.table());
            match output.parse::<OutputFormat>()? {
                OutputFormat::Table => print!("{}", render_route_table(&routes)),
                format => println!("{}", render(&routes, format)?),
            }
        }
        Commands::Encode { output } => {
            let listener = builder
                .build_outbound_listener(&settings.outbound_port)
                .context("Failed to build outbound listener")?;
            let resource = listener_resource(&listener);
            let bytes = resource.encode_to_vec();
            std::fs::write(output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!(
                resource = %resource.name,
                type_url = %resource.type_url(),
                bytes = bytes.len(),
                path = %output.display(),
                "Wrote listener resource"
            );
        }
    }

    Ok(())
}
