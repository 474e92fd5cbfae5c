//! Output formatting for rendered configuration
//!
//! Descriptors are written as JSON or YAML; the expanded route table can also
//! be shown as a plain text table.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

use crate::xds::RouteMatchRule;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "table" => Ok(OutputFormat::Table),
            _ => anyhow::bail!(
                "Unsupported output format: '{}'. Use 'json', 'yaml', or 'table'.",
                s
            ),
        }
    }
}

/// Serialize data as JSON or YAML
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).context("Failed to serialize to JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to serialize to YAML"),
        OutputFormat::Table => {
            anyhow::bail!("Table format is only available for the route listing")
        }
    }
}

/// Render routes in evaluation order. The prefix and cluster columns grow to
/// fit the longest value.
pub fn render_route_table(routes: &[RouteMatchRule]) -> String {
    let prefix_width =
        routes.iter().map(|r| r.prefix.len()).chain([PREFIX_MIN_WIDTH]).max().unwrap_or(0);
    let cluster_width =
        routes.iter().map(|r| r.cluster.len()).chain([CLUSTER_MIN_WIDTH]).max().unwrap_or(0);

    let mut out = String::new();
    let header = format!(
        "{:<3} {:<prefix_width$} {:<cluster_width$} {}",
        "#", "PREFIX", "CLUSTER", "TIMEOUTS (REQ/IDLE)"
    );
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for (index, route) in routes.iter().enumerate() {
        let line = format!(
            "{:<3} {:<prefix_width$} {:<cluster_width$} {}/{}",
            index + 1,
            route.prefix,
            route.cluster,
            route.request_timeout,
            route.idle_timeout
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

const PREFIX_MIN_WIDTH: usize = 40;
const CLUSTER_MIN_WIDTH: usize = 30;
