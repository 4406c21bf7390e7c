use std::path::PathBuf;

use clap::Parser;
use rolematrix::{ConformityRequest, Workspace};
use tracing::instrument;

use super::terminal::{Colorize, status_label};

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a request")]
pub struct Command {
    /// The request identifier, e.g. SOL_20250101_100000_001
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;

        let Some(request) = workspace.requests.get(&self.id) else {
            anyhow::bail!("Request {} not found", self.id);
        };

        match self.output {
            OutputFormat::Pretty => output_pretty(request),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(request)?),
        }

        Ok(())
    }
}

fn output_pretty(request: &ConformityRequest) {
    println!("# {}", request.id());
    println!("{}\n", status_label(request.status()));

    println!("{}", "Metadata".dim());
    println!(
        "  Created:   {}",
        request.created_at().format("%Y-%m-%d %H:%M:%S")
    );
    if let Some(ticket) = request.helpdesk_ticket() {
        println!("  Ticket:    {ticket}");
    }
    if let Some(closed) = request.closed_at() {
        println!("  Closed:    {}", closed.format("%Y-%m-%d %H:%M:%S"));
    }

    println!("\n{}", "Network groups".dim());
    for group in request.network_groups() {
        println!("  • {group}");
    }

    println!("\n{}", "Authorizers".dim());
    if request.authorizers().is_empty() {
        println!("  {}", "none".warning());
    }
    for assignment in request.authorizers() {
        println!(
            "  • {}  {} <{}>",
            assignment.code, assignment.name, assignment.email
        );
    }

    if let Some(notes) = request.notes().filter(|notes| !notes.is_empty()) {
        println!("\n{}", "Notes".dim());
        println!("{notes}");
    }
}
