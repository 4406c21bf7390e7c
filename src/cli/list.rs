use std::path::PathBuf;

use clap::ValueEnum;
use rolematrix::{ConformityRequest, Status, Workspace};
use tracing::instrument;

use super::{
    parse_status,
    terminal::{Colorize, is_narrow, status_label, truncate},
};

const GROUPS_WIDTH: usize = 40;

/// Command arguments for `rmx list`.
#[derive(Debug, clap::Parser)]
#[command(about = "List conformity requests")]
pub struct Command {
    /// Only show requests in this status
    #[arg(long, short, value_parser = parse_status)]
    status: Option<Status>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Print identifiers only, one per line.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let requests = select(workspace.requests.all(), self.status);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&requests)?),
            OutputFormat::Table if self.quiet => {
                for request in &requests {
                    println!("{}", request.id());
                }
            }
            OutputFormat::Table => print_table(&requests),
        }

        Ok(())
    }
}

fn select(requests: &[ConformityRequest], status: Option<Status>) -> Vec<&ConformityRequest> {
    requests
        .iter()
        .filter(|request| status.is_none_or(|status| request.status() == status))
        .collect()
}

fn print_table(requests: &[&ConformityRequest]) {
    if requests.is_empty() {
        println!("No requests found. Create one with 'rmx create'.");
        return;
    }

    if is_narrow() {
        for request in requests {
            println!("{}", request.id());
            println!("  {}", status_label(request.status()));
            println!("  {}", request.network_groups().join(", ").dim());
        }
        return;
    }

    println!(
        "{:<24} {:<30} {:<12} {:<GROUPS_WIDTH$}",
        "ID", "Status", "Ticket", "Groups"
    );
    for request in requests {
        // escape codes would skew `{:<30}`, so pad by hand
        let padding = 30_usize.saturating_sub(request.status().as_str().chars().count());
        println!(
            "{:<24} {}{} {:<12} {}",
            request.id(),
            status_label(request.status()),
            " ".repeat(padding),
            request.helpdesk_ticket().unwrap_or("–"),
            truncate(&request.network_groups().join(", "), GROUPS_WIDTH),
        );
    }
    println!();
    println!("{}", format!("{} request(s)", requests.len()).dim());
}
